use std::collections::HashSet;

use glam::Vec2;

use crate::event::{ElementState, Event, KeyCode, MouseButton, MouseScrollDelta};

/// Pixels per scrolled line when the platform reports line deltas.
const LINE_SCROLL_DELTA: f32 = 1.0;

/// Polled input state, fed from window events.
///
/// Scroll and mouse deltas accumulate until [`InputState::new_frame`].
#[derive(Debug, Default)]
pub struct InputState {
    keys_pressed: HashSet<KeyCode>,
    buttons_pressed: HashSet<MouseButton>,
    scroll_delta: Vec2,
    mouse_pos: Vec2,
    mouse_delta: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_frame(&mut self) {
        self.scroll_delta = Vec2::ZERO;
        self.mouse_delta = Vec2::ZERO;
    }

    pub fn on_event(&mut self, event: &Event) {
        match event {
            Event::KeyInput(event) if !event.repeat => {
                if let Some(code) = event.key_code() {
                    match event.state {
                        ElementState::Pressed => self.keys_pressed.insert(code),
                        ElementState::Released => self.keys_pressed.remove(&code),
                    };
                }
            }
            Event::MouseButtonDown(button) => {
                self.buttons_pressed.insert(*button);
            }
            Event::MouseButtonUp(button) => {
                self.buttons_pressed.remove(button);
            }
            Event::MouseScrolled(delta) => match delta {
                MouseScrollDelta::LineDelta(x, y) => {
                    self.scroll_delta += Vec2::new(*x, *y) * LINE_SCROLL_DELTA
                }
                MouseScrollDelta::PixelDelta(delta) => {
                    self.scroll_delta += Vec2::new(delta.x as f32, delta.y as f32)
                }
            },
            Event::MouseMoved(pos) => {
                let new_pos = Vec2::new(pos.x as f32, pos.y as f32);
                self.mouse_delta += new_pos - self.mouse_pos;
                self.mouse_pos = new_pos;
            }
            // Keys held while focus is lost never report a release.
            Event::Focused(false) => {
                self.keys_pressed.clear();
                self.buttons_pressed.clear();
            }
            _ => {}
        }
    }

    pub fn is_key_pressed(&self, code: KeyCode) -> bool {
        self.keys_pressed.contains(&code)
    }

    pub fn is_mouse_button_pressed(&self, button: MouseButton) -> bool {
        self.buttons_pressed.contains(&button)
    }

    pub fn scroll_delta(&self) -> Vec2 {
        self.scroll_delta
    }

    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    pub fn mouse_pos(&self) -> Vec2 {
        self.mouse_pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Key, KeyEvent, NamedKey, PhysicalKey};
    use arcane_core::geometry::LogicalPosition;

    fn key(code: KeyCode, state: ElementState) -> Event {
        Event::KeyInput(KeyEvent {
            physical_key: PhysicalKey::Code(code),
            logical_key: Key::Named(NamedKey::Space),
            text: None,
            state,
            repeat: false,
        })
    }

    #[test]
    fn test_key_press_release() {
        let mut input = InputState::new();
        input.on_event(&key(KeyCode::KeyW, ElementState::Pressed));
        assert!(input.is_key_pressed(KeyCode::KeyW));
        input.on_event(&key(KeyCode::KeyW, ElementState::Released));
        assert!(!input.is_key_pressed(KeyCode::KeyW));
    }

    #[test]
    fn test_scroll_accumulates_until_new_frame() {
        let mut input = InputState::new();
        input.on_event(&Event::MouseScrolled(MouseScrollDelta::LineDelta(0.0, 1.0)));
        input.on_event(&Event::MouseScrolled(MouseScrollDelta::LineDelta(0.0, 2.0)));
        assert_eq!(input.scroll_delta(), Vec2::new(0.0, 3.0));
        input.new_frame();
        assert_eq!(input.scroll_delta(), Vec2::ZERO);
    }

    #[test]
    fn test_mouse_delta() {
        let mut input = InputState::new();
        input.on_event(&Event::MouseMoved(LogicalPosition::new(10.0, 5.0)));
        input.on_event(&Event::MouseMoved(LogicalPosition::new(12.0, 9.0)));
        assert_eq!(input.mouse_pos(), Vec2::new(12.0, 9.0));
        assert_eq!(input.mouse_delta(), Vec2::new(12.0, 9.0));
    }

    #[test]
    fn test_focus_loss_releases_keys() {
        let mut input = InputState::new();
        input.on_event(&key(KeyCode::KeyA, ElementState::Pressed));
        input.on_event(&Event::MouseButtonDown(MouseButton::Left));
        input.on_event(&Event::Focused(false));
        assert!(!input.is_key_pressed(KeyCode::KeyA));
        assert!(!input.is_mouse_button_pressed(MouseButton::Left));
    }
}
