
use smallvec::SmallVec;
use winit::event::{WindowEvent, ElementState, MouseButton, MouseScrollDelta, VirtualKeyCode};

use crate::utils::frame::FrameAction;

const SIMULTANEOUS_KEY_COUNT: usize = 12;
/// Pixels of a touchpad scroll counted as one wheel line.
const PIXELS_PER_LINE: f32 = 20.0;


/// Window input collected between two frames.
pub struct EventController {

    pub key: KeyHeap,
    pub cursor: CursorMotion,

    action: FrameAction,
    is_toggle_key: bool,
    is_toggle_cursor: bool,
    is_resized: bool,
}

impl Default for EventController {

    fn default() -> EventController {

        EventController {
            key: Default::default(),
            cursor: Default::default(),

            action: FrameAction::Rendering,
            is_toggle_key: false,
            is_toggle_cursor: false,
            is_resized: false,
        }
    }
}

impl EventController {

    pub(crate) fn record_event(&mut self, event: &WindowEvent) {

        match event {
            | WindowEvent::KeyboardInput { input, .. } => {
                if let Some(code) = input.virtual_keycode {
                    match input.state {
                        | ElementState::Pressed  => {
                            self.key.key_press(code);
                            self.is_toggle_key = true;
                        },
                        | ElementState::Released => {
                            self.key.key_release(code);
                        },
                    }
                }
            },
            | WindowEvent::CursorMoved { position, .. } => {
                self.cursor.record_position(position.x as f32, position.y as f32);
                self.is_toggle_cursor = true;
            },
            | WindowEvent::MouseInput { state, button, .. } => {
                self.cursor.record_button(*button, *state == ElementState::Pressed);
            },
            | WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    | MouseScrollDelta::LineDelta(_, y) => *y,
                    | MouseScrollDelta::PixelDelta(position) => position.y as f32 / PIXELS_PER_LINE,
                };
                self.cursor.scroll += lines;
                self.is_toggle_cursor = true;
            },
            | WindowEvent::Resized(size) => {
                // a minimized window reports a zero size, the swapchain is rebuilt once it comes back.
                if size.width > 0 && size.height > 0 {
                    self.is_resized = true;
                    self.action = FrameAction::SwapchainRecreate;
                }
            },
            | WindowEvent::CloseRequested => {
                self.action = FrameAction::Terminal;
            },
            | _ => (),
        }
    }

    pub fn is_key_active(&self) -> bool {
        self.is_toggle_key
    }

    pub fn is_cursor_active(&self) -> bool {
        self.is_toggle_cursor
    }

    pub fn is_resized(&self) -> bool {
        self.is_resized
    }

    pub(crate) fn tick_frame(&mut self) {

        self.key.tick_frame();
        self.cursor.tick_frame();
        self.is_toggle_key = false;
        self.is_toggle_cursor = false;
        self.is_resized = false;

        if self.action != FrameAction::Terminal {
            self.action = FrameAction::Rendering;
        }
    }

    pub(crate) fn current_action(&self) -> FrameAction {
        self.action
    }
}


pub struct KeyHeap {

    keys: SmallVec<[VirtualKeyCode; SIMULTANEOUS_KEY_COUNT]>,
    // keys went down since the last frame.
    pressed: SmallVec<[VirtualKeyCode; SIMULTANEOUS_KEY_COUNT]>,
}

impl Default for KeyHeap {

    fn default() -> KeyHeap {
        KeyHeap { keys: SmallVec::new(), pressed: SmallVec::new() }
    }
}

impl KeyHeap {

    fn key_press(&mut self, code: VirtualKeyCode) {

        // key repeat of a held key is not a new press.
        if self.keys.iter().any(|&key_code| key_code == code) {
            return
        }

        // and the key pool has been full, just ignore the input key.
        if self.keys.len() < SIMULTANEOUS_KEY_COUNT {
            self.keys.push(code);
            self.pressed.push(code);
        }
    }

    fn key_release(&mut self, code: VirtualKeyCode) {

        if let Some(index) = self.keys.iter().position(|&key_code| key_code == code) {
            self.keys.swap_remove(index);
        }
    }

    fn tick_frame(&mut self) {
        self.pressed.clear();
    }

    pub fn is_key_pressed(&self, code: VirtualKeyCode) -> bool {
        self.keys.iter().any(|&key_code| key_code == code)
    }

    /// Whether `code` went down during the last frame.
    pub fn is_key_just_pressed(&self, code: VirtualKeyCode) -> bool {
        self.pressed.iter().any(|&key_code| key_code == code)
    }
}


#[derive(Default)]
pub struct CursorMotion {

    position: Option<(f32, f32)>,
    delta_x: f32,
    delta_y: f32,

    /// Wheel lines scrolled since the last frame, positive away from the user.
    pub scroll: f32,

    pub left  : bool,
    pub right : bool,
    pub middle: bool,
}

impl CursorMotion {

    fn record_position(&mut self, x: f32, y: f32) {

        if let Some((last_x, last_y)) = self.position {
            self.delta_x += x - last_x;
            self.delta_y += y - last_y;
        }
        self.position = Some((x, y));
    }

    fn record_button(&mut self, button: MouseButton, is_pressed: bool) {

        match button {
            | MouseButton::Left   => self.left   = is_pressed,
            | MouseButton::Right  => self.right  = is_pressed,
            | MouseButton::Middle => self.middle = is_pressed,
            | MouseButton::Other(_) => {},
        }
    }

    fn tick_frame(&mut self) {
        self.delta_x = 0.0;
        self.delta_y = 0.0;
        self.scroll  = 0.0;
    }

    /// Cursor movement in pixels since the last frame.
    pub fn get_cursor_motion(&self) -> (f32, f32) {
        (self.delta_x, self.delta_y)
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn just_pressed_lasts_one_frame() {

        let mut keys = KeyHeap::default();
        keys.key_press(VirtualKeyCode::P);
        keys.key_press(VirtualKeyCode::P);

        assert!(keys.is_key_just_pressed(VirtualKeyCode::P));
        assert_eq!(keys.keys.len(), 1);

        keys.tick_frame();
        assert!(keys.is_key_pressed(VirtualKeyCode::P));
        assert!(!keys.is_key_just_pressed(VirtualKeyCode::P));

        keys.key_release(VirtualKeyCode::P);
        assert!(!keys.is_key_pressed(VirtualKeyCode::P));
    }

    #[test]
    fn cursor_motion_accumulates_until_tick() {

        let mut cursor = CursorMotion::default();
        cursor.record_position(10.0, 10.0);
        assert_eq!(cursor.get_cursor_motion(), (0.0, 0.0));

        cursor.record_position(13.0, 8.0);
        cursor.record_position(15.0, 9.0);
        assert_eq!(cursor.get_cursor_motion(), (5.0, -1.0));

        cursor.tick_frame();
        assert_eq!(cursor.get_cursor_motion(), (0.0, 0.0));
    }

    #[test]
    fn buttons_follow_press_state() {

        let mut cursor = CursorMotion::default();
        cursor.record_button(MouseButton::Right, true);
        assert!(cursor.right && !cursor.left);

        cursor.record_button(MouseButton::Right, false);
        assert!(!cursor.right);
    }
}
