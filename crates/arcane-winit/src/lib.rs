pub mod app;
pub mod event;
pub mod input;
pub mod time;
pub mod window;

pub use winit::window::WindowId;

pub use time::FrameTime;
