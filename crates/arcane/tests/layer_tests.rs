//! Layers drawing through shared renderers on a recording backend.

use std::sync::Arc;
use std::time::Duration;

use arcane::prelude::*;
use arcane_test_utils::MockBackend;

struct QuadLayer {
    quads: usize,
    texture: Option<Arc<Texture2D>>,
    detached: bool,
}

impl QuadLayer {
    fn new(quads: usize) -> Self {
        Self {
            quads,
            texture: None,
            detached: false,
        }
    }
}

impl Layer for QuadLayer {
    fn name(&self) -> &str {
        "QuadLayer"
    }

    fn on_attach(&mut self, graphics: &mut Graphics) {
        let texture = Texture2D::from_rgba8(graphics.backend.clone(), 1, 1, &[255; 4]).unwrap();
        self.texture = Some(Arc::new(texture));
    }

    fn on_detach(&mut self) {
        self.detached = true;
    }

    fn on_update(&mut self, ctx: &mut LayerContext, _time: &FrameTime) {
        let camera = OrthographicCamera::new(-1.0, 1.0, -1.0, 1.0);
        let renderer2d = &mut ctx.graphics.renderer2d;
        renderer2d.begin_scene(&camera);
        for _ in 0..self.quads {
            renderer2d.draw_quad(Vec2::ZERO, Vec2::ONE, Color::GREEN);
        }
        if let Some(texture) = &self.texture {
            renderer2d.draw_textured_quad(Vec2::ZERO, Vec2::ONE, texture, 1.0, Color::WHITE);
        }
        renderer2d.end_scene();
    }
}

fn update(stack: &mut LayerStack, graphics: &mut Graphics) {
    let input = InputState::new();
    let mut ctx = LayerContext {
        graphics,
        input: &input,
    };
    stack.update(&mut ctx, &FrameTime::from_delta(Duration::from_millis(16)));
}

#[test]
fn test_each_layer_draws_its_own_batch() {
    let mock = Arc::new(MockBackend::new());
    let mut graphics = Graphics::new(mock.clone()).unwrap();
    let mut stack = LayerStack::new();

    for quads in [3, 7] {
        let mut layer = QuadLayer::new(quads);
        layer.on_attach(&mut graphics);
        stack.push_layer(Box::new(layer));
    }

    mock.clear_calls();
    update(&mut stack, &mut graphics);

    // Bottom layer first: 3 solid + 1 textured, then 7 + 1.
    assert_eq!(mock.draw_calls(), vec![4 * 6, 8 * 6]);
    assert_eq!(graphics.renderer2d.stats().quad_count, 8);
}

#[test]
fn test_popped_layer_stops_drawing() {
    let mock = Arc::new(MockBackend::new());
    let mut graphics = Graphics::new(mock.clone()).unwrap();
    let mut stack = LayerStack::new();

    let keep = stack.push_layer(Box::new(QuadLayer::new(1)));
    let drop_me = stack.push_overlay(Box::new(QuadLayer::new(2)));
    assert_ne!(keep, drop_me);

    assert!(stack.pop_overlay(drop_me).is_some());
    mock.clear_calls();
    update(&mut stack, &mut graphics);

    assert_eq!(mock.draw_calls(), vec![6]);
}

#[test]
fn test_camera_controller_as_layer_input() {
    let mut controller = OrthographicCameraController::new(2.0, false);
    controller.on_event(&Event::MouseScrolled(
        arcane::winit::event::MouseScrollDelta::LineDelta(0.0, 1.0),
    ));
    assert_eq!(controller.zoom_level(), 0.75);

    let mock = Arc::new(MockBackend::new());
    let mut graphics = Graphics::new(mock.clone()).unwrap();
    graphics.renderer2d.begin_scene(controller.camera());
    graphics.renderer2d.draw_quad(Vec2::ZERO, Vec2::ONE, Color::RED);
    graphics.renderer2d.end_scene();

    let shader = graphics.renderer2d.shader().handle();
    let uploaded = mock.uniform(shader, "u_ViewProjection");
    assert_eq!(
        uploaded,
        Some(arcane::render::UniformValue::Mat4(controller.camera().view_projection()))
    );
}
