//! ARcane
//!
//! A small real-time rendering engine: a winit-driven application loop that
//! runs a stack of layers, each drawing through a batched 2D renderer on top of
//! wgpu.
//!
//! # Quick Start
//!
//! ```no_run
//! use arcane::prelude::*;
//!
//! struct Hello;
//!
//! impl Layer for Hello {
//!     fn on_update(&mut self, ctx: &mut LayerContext, _time: &FrameTime) {
//!         let camera = OrthographicCamera::new(-1.6, 1.6, -0.9, 0.9);
//!         ctx.graphics.renderer.set_clear_color(Color::rgb(0.1, 0.1, 0.1));
//!         ctx.graphics.renderer.clear();
//!
//!         let renderer2d = &mut ctx.graphics.renderer2d;
//!         renderer2d.begin_scene(&camera);
//!         renderer2d.draw_quad(Vec2::ZERO, Vec2::splat(0.5), Color::RED);
//!         renderer2d.end_scene();
//!     }
//! }
//!
//! fn main() -> Result<(), ApplicationError> {
//!     Application::run(EngineConfig::default(), |app| {
//!         app.push_layer(Box::new(Hello));
//!     })
//! }
//! ```

pub mod application;
pub mod camera_controller;
pub mod layer;

pub use arcane_core as core;
pub use arcane_render as render;
pub use arcane_winit as winit;

pub use application::{Application, ApplicationError};
pub use camera_controller::OrthographicCameraController;
pub use layer::{Graphics, Layer, LayerContext, LayerId, LayerStack};

pub mod prelude {
    pub use crate::application::{Application, ApplicationError};
    pub use crate::camera_controller::OrthographicCameraController;
    pub use crate::layer::{Graphics, Layer, LayerContext, LayerId, LayerStack};

    pub use arcane_core::config::{EngineConfig, ProfilingMode};
    pub use arcane_core::profiling::{profile_function, profile_scope};

    pub use arcane_render::{
        Camera, Color, ImageFrame, OrthographicCamera, PixelFormat, ProjectionCamera,
        RenderBackend, RenderError, Renderer, Renderer2D, Shader, Texture2D,
    };

    pub use arcane_winit::FrameTime;
    pub use arcane_winit::event::{Event, HandleStatus, KeyCode};
    pub use arcane_winit::input::InputState;

    pub use glam::{Mat4, Vec2, Vec3, Vec4};
}
