//! Test utilities for the ARcane engine.
//!
//! [`MockBackend`] implements [`arcane_render::RenderBackend`] without a GPU.
//! It keeps the bytes written to every buffer and records each call, so tests
//! can assert on draw counts, uploads, texture bindings and uniforms.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use arcane_render::RenderBackend;
//! use arcane_test_utils::MockBackend;
//!
//! let mock = Arc::new(MockBackend::new());
//! mock.draw_indexed(6);
//!
//! assert_eq!(mock.draw_calls(), vec![6]);
//! ```

pub mod mock_backend;

pub use mock_backend::*;
