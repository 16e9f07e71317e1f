use arcane_render::OrthographicCamera;
use arcane_winit::FrameTime;
use arcane_winit::event::{Event, HandleStatus, KeyCode, MouseScrollDelta};
use arcane_winit::input::InputState;
use glam::Vec3;

/// Scroll distance, in pixels, treated as one wheel notch.
const PIXELS_PER_LINE: f32 = 20.0;

/// Keyboard and mouse driven [`OrthographicCamera`].
///
/// WASD pans, Q/E rotate (when enabled) and the scroll wheel zooms. The view
/// always spans `2 * zoom` world units vertically; resizing the window keeps
/// that height and adjusts the width to the new aspect ratio.
#[derive(Debug, Clone)]
pub struct OrthographicCameraController {
    aspect_ratio: f32,
    zoom_level: f32,
    camera: OrthographicCamera,
    rotation_enabled: bool,
    position: Vec3,
    /// Degrees, anti-clockwise.
    rotation: f32,
    translation_speed: f32,
    rotation_speed: f32,
}

impl OrthographicCameraController {
    pub const MIN_ZOOM: f32 = 0.25;
    pub const ZOOM_STEP: f32 = 0.25;

    pub fn new(aspect_ratio: f32, rotation_enabled: bool) -> Self {
        let zoom_level = 1.0;
        Self {
            aspect_ratio,
            zoom_level,
            camera: OrthographicCamera::new(
                -aspect_ratio * zoom_level,
                aspect_ratio * zoom_level,
                -zoom_level,
                zoom_level,
            ),
            rotation_enabled,
            position: Vec3::ZERO,
            rotation: 0.0,
            translation_speed: 5.0,
            rotation_speed: 180.0,
        }
    }

    pub fn on_update(&mut self, input: &InputState, time: &FrameTime) {
        let dt = time.delta_seconds();
        let step = self.translation_speed * dt;

        if input.is_key_pressed(KeyCode::KeyA) {
            self.position.x -= step;
        } else if input.is_key_pressed(KeyCode::KeyD) {
            self.position.x += step;
        }

        if input.is_key_pressed(KeyCode::KeyW) {
            self.position.y += step;
        } else if input.is_key_pressed(KeyCode::KeyS) {
            self.position.y -= step;
        }

        if self.rotation_enabled {
            if input.is_key_pressed(KeyCode::KeyQ) {
                self.rotation += self.rotation_speed * dt;
            }
            if input.is_key_pressed(KeyCode::KeyE) {
                self.rotation -= self.rotation_speed * dt;
            }
            self.camera.set_rotation(self.rotation);
        }

        self.camera.set_position(self.position);
        // Pan at the same on-screen speed at every zoom.
        self.translation_speed = self.zoom_level;
    }

    pub fn on_event(&mut self, event: &Event) -> HandleStatus {
        match event {
            Event::MouseScrolled(delta) => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
                };
                self.zoom_level = (self.zoom_level - lines * Self::ZOOM_STEP).max(Self::MIN_ZOOM);
                self.update_projection();
            }
            Event::WindowResized(size) if !size.is_zero_area() => {
                self.aspect_ratio = size.aspect_ratio();
                self.update_projection();
            }
            _ => {}
        }
        HandleStatus::ignored()
    }

    pub fn camera(&self) -> &OrthographicCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut OrthographicCamera {
        &mut self.camera
    }

    pub fn zoom_level(&self) -> f32 {
        self.zoom_level
    }

    pub fn set_zoom_level(&mut self, level: f32) {
        self.zoom_level = level.max(Self::MIN_ZOOM);
        self.update_projection();
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    fn update_projection(&mut self) {
        let (ar, zoom) = (self.aspect_ratio, self.zoom_level);
        self.camera.set_projection(-ar * zoom, ar * zoom, -zoom, zoom);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcane_core::geometry::PhysicalSize;
    use arcane_render::Camera;
    use arcane_winit::event::{ElementState, Key, KeyEvent, NamedKey, PhysicalKey};
    use glam::{Mat4, Vec4};
    use std::time::Duration;

    fn press(input: &mut InputState, code: KeyCode) {
        input.on_event(&Event::KeyInput(KeyEvent {
            physical_key: PhysicalKey::Code(code),
            logical_key: Key::Named(NamedKey::Space),
            text: None,
            state: ElementState::Pressed,
            repeat: false,
        }));
    }

    fn half_second() -> FrameTime {
        FrameTime::from_delta(Duration::from_millis(500))
    }

    #[test]
    fn test_initial_projection() {
        let controller = OrthographicCameraController::new(16.0 / 9.0, false);
        let expected = Mat4::orthographic_rh(-16.0 / 9.0, 16.0 / 9.0, -1.0, 1.0, -1.0, 1.0);
        assert!(controller.camera().projection().abs_diff_eq(expected, 1e-6));
        assert_eq!(controller.zoom_level(), 1.0);
    }

    #[test]
    fn test_wasd_moves_camera() {
        let mut controller = OrthographicCameraController::new(1.0, false);
        let mut input = InputState::new();
        press(&mut input, KeyCode::KeyD);
        press(&mut input, KeyCode::KeyW);

        controller.on_update(&input, &half_second());
        let position = controller.camera().position();
        assert!((position.x - 2.5).abs() < 1e-5);
        assert!((position.y - 2.5).abs() < 1e-5);
    }

    #[test]
    fn test_rotation_only_when_enabled() {
        let mut input = InputState::new();
        press(&mut input, KeyCode::KeyQ);

        let mut fixed = OrthographicCameraController::new(1.0, false);
        fixed.on_update(&input, &half_second());
        assert_eq!(fixed.camera().rotation(), 0.0);

        let mut rotating = OrthographicCameraController::new(1.0, true);
        rotating.on_update(&input, &half_second());
        assert!((rotating.camera().rotation() - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_scroll_zoom_is_clamped() {
        let mut controller = OrthographicCameraController::new(1.0, false);

        controller.on_event(&Event::MouseScrolled(MouseScrollDelta::LineDelta(0.0, -2.0)));
        assert!((controller.zoom_level() - 1.5).abs() < 1e-6);

        controller.on_event(&Event::MouseScrolled(MouseScrollDelta::LineDelta(0.0, 10.0)));
        assert_eq!(controller.zoom_level(), OrthographicCameraController::MIN_ZOOM);

        // The top edge of the view sits at y = zoom.
        let top = controller.camera().view_projection() * Vec4::new(0.0, 0.25, 0.0, 1.0);
        assert!((top.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_resize_updates_aspect() {
        let mut controller = OrthographicCameraController::new(1.0, false);
        let status = controller.on_event(&Event::WindowResized(PhysicalSize::new(1600, 800)));
        assert!(!status.is_consumed());
        assert_eq!(controller.aspect_ratio(), 2.0);

        // Minimized windows keep the last aspect ratio.
        controller.on_event(&Event::WindowResized(PhysicalSize::new(0, 0)));
        assert_eq!(controller.aspect_ratio(), 2.0);

        let right = controller.camera().view_projection() * Vec4::new(2.0, 0.0, 0.0, 1.0);
        assert!((right.x - 1.0).abs() < 1e-5);
    }
}
