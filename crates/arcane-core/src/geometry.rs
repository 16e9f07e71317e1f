//! Window-space sizes and positions.
//!
//! Physical values are in device pixels, logical values are scaled by the
//! window's scale factor.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PhysicalSize<T> {
    pub width: T,
    pub height: T,
}

impl<T> PhysicalSize<T> {
    pub const fn new(width: T, height: T) -> Self {
        Self { width, height }
    }
}

impl PhysicalSize<u32> {
    /// A window reports a zero-sized surface while minimized.
    pub fn is_zero_area(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn to_logical(self, scale_factor: f64) -> LogicalSize<u32> {
        LogicalSize::new(
            (self.width as f64 / scale_factor) as u32,
            (self.height as f64 / scale_factor) as u32,
        )
    }

    /// Width divided by height, or 1.0 for degenerate sizes.
    pub fn aspect_ratio(&self) -> f32 {
        if self.is_zero_area() {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LogicalSize<T> {
    pub width: T,
    pub height: T,
}

impl<T> LogicalSize<T> {
    pub const fn new(width: T, height: T) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LogicalPosition<T> {
    pub x: T,
    pub y: T,
}

impl<T> LogicalPosition<T> {
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}
