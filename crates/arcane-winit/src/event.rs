use arcane_core::geometry::{LogicalPosition, PhysicalSize};
pub use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent as WinitEvent};
pub use winit::keyboard::*;

use std::collections::VecDeque;

/// Per-window event queue.
///
/// Window lifecycle events are delivered first. Cursor movement, resizes and
/// scale factor changes are coalesced so that only the latest value survives
/// until the next drain.
pub struct EventQueue {
    pending: VecDeque<Event>,
    priority: VecDeque<Event>,

    latest_mouse_pos: Option<LogicalPosition<f64>>,
    latest_size: Option<PhysicalSize<u32>>,
    latest_scale_factor: Option<f64>,

    stats: EventStats,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::with_capacity(64),
            priority: VecDeque::with_capacity(8),
            latest_mouse_pos: None,
            latest_size: None,
            latest_scale_factor: None,
            stats: EventStats::default(),
        }
    }

    pub fn push(&mut self, event: Event) {
        self.stats.events_received += 1;

        match event {
            Event::CloseRequested | Event::Focused(_) => {
                self.priority.push_back(event);
            }
            Event::WindowResized(size) => {
                if self.latest_size.replace(size).is_some() {
                    self.stats.events_coalesced += 1;
                }
            }
            Event::MouseMoved(pos) => {
                if self.latest_mouse_pos.replace(pos).is_some() {
                    self.stats.events_coalesced += 1;
                }
            }
            Event::ScaleFactorChanged(scale) => {
                if self.latest_scale_factor.replace(scale).is_some() {
                    self.stats.events_coalesced += 1;
                }
            }
            _ => {
                self.pending.push_back(event);
            }
        }
    }

    /// Take every queued event, in delivery order.
    pub fn drain(&mut self) -> EventBatch {
        let mut events = Vec::with_capacity(self.priority.len() + self.pending.len() + 3);

        events.extend(self.priority.drain(..));

        if let Some(size) = self.latest_size.take() {
            events.push(Event::WindowResized(size));
        }
        if let Some(scale) = self.latest_scale_factor.take() {
            events.push(Event::ScaleFactorChanged(scale));
        }
        if let Some(pos) = self.latest_mouse_pos.take() {
            events.push(Event::MouseMoved(pos));
        }

        events.extend(self.pending.drain(..));

        self.stats.events_processed += events.len();

        EventBatch { events }
    }

    pub fn stats(&self) -> &EventStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = EventStats::default();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Events collected for one window during one frame.
#[derive(Debug, Default)]
pub struct EventBatch {
    events: Vec<Event>,
}

impl EventBatch {
    pub fn new(events: Vec<Event>) -> Self {
        Self { events }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Run `handler` over every event, removing the ones it consumes.
    pub fn dispatch<H>(&mut self, mut handler: H)
    where
        H: FnMut(&Event) -> HandleStatus,
    {
        self.events.retain(|event| {
            let status = handler(event);
            !status.is_consumed()
        });
    }
}

#[derive(Default, Debug, Clone)]
pub struct EventStats {
    pub events_received: usize,
    pub events_processed: usize,
    pub events_coalesced: usize,
}

#[derive(Debug, Clone)]
pub enum Event {
    /// Drawable area resized, in physical pixels. Zero on either axis while minimized.
    WindowResized(PhysicalSize<u32>),
    ScaleFactorChanged(f64),
    Focused(bool),
    CloseRequested,
    MouseButtonDown(MouseButton),
    MouseButtonUp(MouseButton),
    MouseScrolled(MouseScrollDelta),
    /// Cursor position in logical coordinates.
    MouseMoved(LogicalPosition<f64>),
    KeyInput(KeyEvent),
}

#[derive(Debug, Clone)]
pub struct KeyEvent {
    pub physical_key: PhysicalKey,
    pub logical_key: Key,
    pub text: Option<SmolStr>,
    pub state: ElementState,
    pub repeat: bool,
}

impl KeyEvent {
    /// Key code of the physical key, if it maps to one.
    pub fn key_code(&self) -> Option<KeyCode> {
        match self.physical_key {
            PhysicalKey::Code(code) => Some(code),
            PhysicalKey::Unidentified(_) => None,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.state == ElementState::Pressed
    }
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct HandleStatus: u8 {
        const HANDLED = 0b00000001;
        const CONSUMED = 0b00000010;
    }
}

impl HandleStatus {
    pub const fn is_consumed(&self) -> bool {
        self.contains(Self::CONSUMED)
    }

    pub const fn is_handled(&self) -> bool {
        self.contains(Self::HANDLED)
    }

    pub const fn consumed() -> Self {
        Self::from_bits_truncate(Self::HANDLED.bits() | Self::CONSUMED.bits())
    }

    pub const fn handled() -> Self {
        Self::from_bits_truncate(Self::HANDLED.bits())
    }

    pub const fn ignored() -> Self {
        Self::empty()
    }
}

impl Event {
    pub(crate) fn from_winit(event: WinitEvent, scale_factor: f64) -> Option<Self> {
        match event {
            WinitEvent::Resized(size) => {
                Some(Event::WindowResized(PhysicalSize::new(size.width, size.height)))
            }
            WinitEvent::ScaleFactorChanged { scale_factor, .. } => {
                Some(Event::ScaleFactorChanged(scale_factor))
            }
            WinitEvent::Focused(focus) => Some(Event::Focused(focus)),
            WinitEvent::CloseRequested => Some(Event::CloseRequested),
            WinitEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => Some(Event::MouseButtonDown(button)),
                ElementState::Released => Some(Event::MouseButtonUp(button)),
            },
            WinitEvent::MouseWheel { delta, .. } => Some(Event::MouseScrolled(delta)),
            WinitEvent::CursorMoved { position, .. } => Some(Event::MouseMoved(
                LogicalPosition::new(position.x / scale_factor, position.y / scale_factor),
            )),
            WinitEvent::KeyboardInput { event, .. } => Some(Event::KeyInput(KeyEvent {
                physical_key: event.physical_key,
                logical_key: event.logical_key,
                text: event.text,
                state: event.state,
                repeat: event.repeat,
            })),
            unknown => {
                tracing::trace!("ignoring window event: {:?}", unknown);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_events_first() {
        let mut queue = EventQueue::new();
        queue.push(Event::MouseButtonDown(MouseButton::Left));
        queue.push(Event::CloseRequested);

        let batch = queue.drain();
        let events: Vec<_> = batch.iter().collect();
        assert!(matches!(events[0], Event::CloseRequested));
        assert!(matches!(events[1], Event::MouseButtonDown(MouseButton::Left)));
    }

    #[test]
    fn test_resize_coalesced() {
        let mut queue = EventQueue::new();
        queue.push(Event::WindowResized(PhysicalSize::new(800, 600)));
        queue.push(Event::WindowResized(PhysicalSize::new(1024, 768)));

        let batch = queue.drain();
        assert_eq!(batch.len(), 1);
        match batch.iter().next() {
            Some(Event::WindowResized(size)) => assert_eq!(*size, PhysicalSize::new(1024, 768)),
            other => panic!("unexpected event {:?}", other),
        }
        assert_eq!(queue.stats().events_coalesced, 1);
    }

    #[test]
    fn test_drain_empties_queue() {
        let mut queue = EventQueue::new();
        queue.push(Event::MouseMoved(LogicalPosition::new(1.0, 2.0)));
        assert_eq!(queue.drain().len(), 1);
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_dispatch_removes_consumed() {
        let mut batch = EventBatch::new(vec![
            Event::Focused(true),
            Event::CloseRequested,
            Event::MouseButtonUp(MouseButton::Right),
        ]);

        batch.dispatch(|event| match event {
            Event::CloseRequested => HandleStatus::consumed(),
            Event::Focused(_) => HandleStatus::handled(),
            _ => HandleStatus::ignored(),
        });

        assert_eq!(batch.len(), 2);
        assert!(batch.iter().all(|e| !matches!(e, Event::CloseRequested)));
    }

    #[test]
    fn test_handle_status() {
        assert!(HandleStatus::consumed().is_handled());
        assert!(HandleStatus::consumed().is_consumed());
        assert!(!HandleStatus::handled().is_consumed());
        assert!(!HandleStatus::ignored().is_handled());
    }
}
