//! 2D sandbox: a grid of colored quads, a rotating textured quad and,
//! when `ARCANE_FRAME_STREAM=host:port` is set, live video frames.
//!
//! Controls: WASD pans, Q/E rotates, scroll zooms.

use std::sync::Arc;

use arcane::prelude::*;
use arcane::render::FrameStream;

struct Sandbox2D {
    controller: OrthographicCameraController,
    checkerboard: Option<Arc<Texture2D>>,
    stream: Option<FrameStream>,
    square_color: Color,
}

impl Sandbox2D {
    fn new() -> Self {
        Self {
            controller: OrthographicCameraController::new(16.0 / 9.0, true),
            checkerboard: None,
            stream: None,
            square_color: Color::rgba(0.2, 0.3, 0.8, 1.0),
        }
    }
}

fn checkerboard_pixels(size: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let value = if (x / 8 + y / 8) % 2 == 0 { 230 } else { 40 };
            pixels.extend_from_slice(&[value, value, value, 255]);
        }
    }
    pixels
}

impl Layer for Sandbox2D {
    fn name(&self) -> &str {
        "Sandbox2D"
    }

    fn on_attach(&mut self, graphics: &mut Graphics) {
        match Texture2D::from_rgba8(graphics.backend.clone(), 64, 64, &checkerboard_pixels(64)) {
            Ok(texture) => self.checkerboard = Some(Arc::new(texture)),
            Err(err) => tracing::error!("Could not create checkerboard: {}", err),
        }

        if let Ok(addr) = std::env::var("ARCANE_FRAME_STREAM") {
            match FrameStream::connect(addr.as_str()) {
                Ok(stream) => self.stream = Some(stream),
                Err(err) => tracing::warn!("Frame stream at {} unavailable: {}", addr, err),
            }
        }
    }

    fn on_detach(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
        }
    }

    fn on_update(&mut self, ctx: &mut LayerContext, time: &FrameTime) {
        profile_function!();
        self.controller.on_update(ctx.input, time);

        let renderer = &ctx.graphics.renderer;
        renderer.set_clear_color(Color::rgb(0.1, 0.1, 0.1));
        renderer.clear();

        let renderer2d = &mut ctx.graphics.renderer2d;
        renderer2d.begin_scene(self.controller.camera());

        for y in -10..10 {
            for x in -10..10 {
                let color = Color::rgba((x + 10) as f32 / 20.0, 0.4, (y + 10) as f32 / 20.0, 0.7);
                renderer2d.draw_quad(
                    Vec2::new(x as f32 * 0.11, y as f32 * 0.11),
                    Vec2::splat(0.1),
                    color,
                );
            }
        }

        renderer2d.draw_rotated_quad(
            Vec3::new(0.5, -0.5, 0.1),
            Vec2::new(0.5, 0.75),
            time.elapsed_seconds(),
            self.square_color,
        );

        if let Some(checkerboard) = &self.checkerboard {
            renderer2d.draw_textured_quad(
                Vec3::new(-0.6, 0.4, 0.2),
                Vec2::splat(0.8),
                checkerboard,
                4.0,
                Color::rgb(1.0, 0.9, 0.9),
            );
        }

        if let Some(frame) = self.stream.as_ref().and_then(FrameStream::latest_frame) {
            let aspect = frame.width as f32 / frame.height.max(1) as f32;
            renderer2d.draw_image_frame(&frame, Vec3::new(0.0, 0.0, 0.3), Vec2::new(aspect, 1.0));
        }

        renderer2d.end_scene();
    }

    fn on_event(&mut self, event: &Event) -> HandleStatus {
        self.controller.on_event(event)
    }
}

fn main() -> Result<(), ApplicationError> {
    let config = EngineConfig::default()
        .with_title("ARcane Sandbox")
        .with_size(1600, 900);

    Application::run(config, |app| {
        app.push_layer(Box::new(Sandbox2D::new()));
    })
}
