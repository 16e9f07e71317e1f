//! Background reception of encoded video frames.
//!
//! A [`FrameStream`] owns one receive thread. The thread pulls encoded images
//! from a [`FrameSource`], decodes them and overwrites the latest frame in a
//! shared [`FrameSlot`]. The render thread clones the latest frame whenever it
//! wants to draw it; frames it never saw are dropped.

use std::io::{ErrorKind, Read};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::Mutex;

use crate::frame::ImageFrame;

/// Largest encoded frame accepted by default.
pub const DEFAULT_MAX_FRAME_SIZE: u32 = 64 * 1024 * 1024;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, thiserror::Error)]
pub enum FrameStreamError {
    #[error("frame stream I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode frame: {0}")]
    Decode(#[from] image::ImageError),

    #[error("frame of {size} bytes exceeds the {max} byte limit")]
    FrameTooLarge { size: u32, max: u32 },

    #[error("frame source closed")]
    Closed,
}

/// Produces encoded (PNG or JPEG) frames.
pub trait FrameSource: Send + 'static {
    /// The next complete frame, or `None` if none arrived within the poll interval.
    fn next_frame(&mut self) -> Result<Option<Vec<u8>>, FrameStreamError>;
}

/// Reads frames framed as a big-endian `u32` byte length followed by the
/// encoded image.
///
/// Timeouts on the underlying reader are not errors: partial frames are kept
/// and completed by later calls.
pub struct LengthPrefixedSource<R> {
    reader: R,
    max_frame_size: u32,
    header: [u8; 4],
    header_filled: usize,
    body: Vec<u8>,
    body_filled: usize,
    in_body: bool,
}

pub type TcpFrameSource = LengthPrefixedSource<TcpStream>;

impl TcpFrameSource {
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self, FrameStreamError> {
        let stream = TcpStream::connect(addr)?;
        Self::from_stream(stream)
    }

    pub fn from_stream(stream: TcpStream) -> Result<Self, FrameStreamError> {
        stream.set_read_timeout(Some(POLL_INTERVAL))?;
        Ok(Self::new(stream))
    }
}

impl<R: Read> LengthPrefixedSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            header: [0; 4],
            header_filled: 0,
            body: Vec::new(),
            body_filled: 0,
            in_body: false,
        }
    }

    pub fn with_max_frame_size(mut self, max: u32) -> Self {
        self.max_frame_size = max;
        self
    }

    /// Fill `buf[*filled..]`. Returns `false` when the reader timed out first.
    fn fill(reader: &mut R, buf: &mut [u8], filled: &mut usize) -> Result<bool, FrameStreamError> {
        while *filled < buf.len() {
            match reader.read(&mut buf[*filled..]) {
                Ok(0) => return Err(FrameStreamError::Closed),
                Ok(n) => *filled += n,
                Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    return Ok(false);
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(true)
    }
}

impl<R: Read + Send + 'static> FrameSource for LengthPrefixedSource<R> {
    fn next_frame(&mut self) -> Result<Option<Vec<u8>>, FrameStreamError> {
        if !self.in_body {
            if !Self::fill(&mut self.reader, &mut self.header, &mut self.header_filled)? {
                return Ok(None);
            }
            let size = u32::from_be_bytes(self.header);
            if size > self.max_frame_size {
                return Err(FrameStreamError::FrameTooLarge {
                    size,
                    max: self.max_frame_size,
                });
            }
            self.body = vec![0; size as usize];
            self.body_filled = 0;
            self.in_body = true;
        }

        if !Self::fill(&mut self.reader, &mut self.body, &mut self.body_filled)? {
            return Ok(None);
        }

        self.in_body = false;
        self.header_filled = 0;
        Ok(Some(std::mem::take(&mut self.body)))
    }
}

#[derive(Default)]
struct SlotState {
    frame: Option<ImageFrame>,
    sequence: u64,
}

/// Single-frame mailbox between the receive thread and the render thread.
#[derive(Default)]
pub struct FrameSlot {
    state: Mutex<SlotState>,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored frame.
    pub fn publish(&self, frame: ImageFrame) {
        let mut state = self.state.lock();
        state.frame = Some(frame);
        state.sequence += 1;
    }

    /// A copy of the latest frame.
    pub fn latest(&self) -> Option<ImageFrame> {
        self.state.lock().frame.clone()
    }

    /// Number of frames published so far.
    pub fn sequence(&self) -> u64 {
        self.state.lock().sequence
    }
}

/// Decode one encoded image.
pub fn decode_frame(bytes: &[u8]) -> Result<ImageFrame, FrameStreamError> {
    Ok(ImageFrame::from(image::load_from_memory(bytes)?))
}

/// A running receive thread. Stopped and joined on drop.
pub struct FrameStream {
    slot: Arc<FrameSlot>,
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl FrameStream {
    /// Connect to a TCP frame publisher and start receiving.
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self, FrameStreamError> {
        let source = TcpFrameSource::connect(addr)?;
        Ok(Self::spawn(source)?)
    }

    pub fn spawn(source: impl FrameSource) -> std::io::Result<Self> {
        let slot = Arc::new(FrameSlot::new());
        let running = Arc::new(AtomicBool::new(true));

        let thread = std::thread::Builder::new()
            .name("arcane-frame-stream".to_owned())
            .spawn({
                let slot = slot.clone();
                let running = running.clone();
                move || receive_loop(source, &slot, &running)
            })?;

        tracing::info!("Started frame stream");
        Ok(Self {
            slot,
            running,
            thread: Some(thread),
        })
    }

    pub fn latest_frame(&self) -> Option<ImageFrame> {
        self.slot.latest()
    }

    pub fn slot(&self) -> &Arc<FrameSlot> {
        &self.slot
    }

    /// `false` once the source closed or failed, or after [`FrameStream::stop`].
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            tracing::error!("frame stream thread panicked");
        }
    }
}

impl Drop for FrameStream {
    fn drop(&mut self) {
        self.stop();
    }
}

fn receive_loop(mut source: impl FrameSource, slot: &FrameSlot, running: &AtomicBool) {
    while running.load(Ordering::Acquire) {
        match source.next_frame() {
            Ok(Some(bytes)) => match decode_frame(&bytes) {
                Ok(frame) => slot.publish(frame),
                Err(err) => tracing::warn!("Dropping frame: {}", err),
            },
            Ok(None) => {}
            Err(FrameStreamError::Closed) => {
                tracing::info!("Frame source closed");
                break;
            }
            Err(err) => {
                tracing::error!("Frame stream error: {}", err);
                break;
            }
        }
    }
    running.store(false, Ordering::Release);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn framed(payloads: &[&[u8]]) -> Vec<u8> {
        let mut out = Vec::new();
        for payload in payloads {
            out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
            out.extend_from_slice(payload);
        }
        out
    }

    #[test]
    fn test_reads_consecutive_frames() {
        let mut source = LengthPrefixedSource::new(Cursor::new(framed(&[b"abc", b"defgh"])));
        assert_eq!(source.next_frame().unwrap(), Some(b"abc".to_vec()));
        assert_eq!(source.next_frame().unwrap(), Some(b"defgh".to_vec()));
        assert!(matches!(source.next_frame(), Err(FrameStreamError::Closed)));
    }

    #[test]
    fn test_rejects_oversized_frame() {
        let mut source =
            LengthPrefixedSource::new(Cursor::new(framed(&[&[0; 16]]))).with_max_frame_size(8);
        assert!(matches!(
            source.next_frame(),
            Err(FrameStreamError::FrameTooLarge { size: 16, max: 8 })
        ));
    }

    /// Yields one byte per read, timing out between bytes.
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
        timed_out: bool,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.timed_out = !self.timed_out;
            if self.timed_out {
                return Err(ErrorKind::WouldBlock.into());
            }
            if self.pos == self.data.len() {
                return Ok(0);
            }
            buf[0] = self.data[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    #[test]
    fn test_partial_reads_resume() {
        let mut source = LengthPrefixedSource::new(Trickle {
            data: framed(&[b"xy"]),
            pos: 0,
            timed_out: false,
        });

        let mut polls = 0;
        let frame = loop {
            polls += 1;
            if let Some(frame) = source.next_frame().unwrap() {
                break frame;
            }
        };
        assert_eq!(frame, b"xy".to_vec());
        assert!(polls > 1);
    }

    #[test]
    fn test_slot_keeps_latest() {
        use crate::frame::PixelFormat;

        let slot = FrameSlot::new();
        assert!(slot.latest().is_none());
        slot.publish(ImageFrame::new(1, 1, PixelFormat::Gray8, vec![1]));
        slot.publish(ImageFrame::new(1, 1, PixelFormat::Gray8, vec![2]));
        assert_eq!(slot.latest().map(|f| f.data), Some(vec![2]));
        assert_eq!(slot.sequence(), 2);
    }
}
