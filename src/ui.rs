// On-canvas buttons, drawn in display space (never mirrored).
// Visual: SWITCH top-left, CLEAR top-right, DOWNLOAD bottom-centre, white pills with dark text.

use crate::draw::{BLACK, RED, WHITE, draw_text_5x7, fill_rect, text_width_5x7};
use crate::types::FrameBuffer;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    SwitchCamera,
    Clear,
    Download,
}

#[derive(Clone, Debug)]
pub struct Button {
    pub action: Action,
    pub label: &'static str,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Button {
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x as f32
            && px < (self.x + self.w) as f32
            && py >= self.y as f32
            && py < (self.y + self.h) as f32
    }
}

const BUTTON_H: i32 = 30;
const PADDING: i32 = 12;

#[derive(Clone, Debug)]
pub struct Toolbar {
    buttons: Vec<Button>,
    switching: bool,
}

impl Toolbar {
    /// Lay the buttons out for a canvas of this size.
    pub fn new(width: i32, height: i32) -> Self {
        let button = |action, label: &'static str, x, y| Button {
            action,
            label,
            x,
            y,
            w: text_width_5x7(label) + 2 * PADDING,
            h: BUTTON_H,
        };
        Self {
            buttons: vec![
                button(Action::SwitchCamera, "SWITCH", 20, 20),
                button(Action::Clear, "CLEAR", width - 100, 20),
                button(Action::Download, "DOWNLOAD", width / 2 - 75, height - 80),
            ],
            switching: false,
        }
    }

    /// Which button (if any) sits under a display-space point.
    pub fn hit(&self, x: f32, y: f32) -> Option<Action> {
        self.buttons.iter().find(|b| b.contains(x, y)).map(|b| b.action)
    }

    /// While a camera switch runs, the SWITCH button shows a busy label.
    pub fn set_switching(&mut self, switching: bool) {
        self.switching = switching;
    }

    #[cfg(test)]
    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    pub fn draw(&self, fb: &mut FrameBuffer) {
        for b in &self.buttons {
            fill_rect(fb, b.x, b.y, b.w, b.h, WHITE);
            let (label, color) = match b.action {
                Action::SwitchCamera if self.switching => ("...", BLACK),
                Action::Clear => (b.label, RED),
                _ => (b.label, BLACK),
            };
            let tx = b.x + (b.w - text_width_5x7(label)) / 2;
            let ty = b.y + (b.h - 7) / 2;
            draw_text_5x7(fb, tx, ty, label, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_corners() {
        let bar = Toolbar::new(640, 480);
        assert_eq!(bar.hit(25.0, 25.0), Some(Action::SwitchCamera));
        assert_eq!(bar.hit(545.0, 30.0), Some(Action::Clear));
        assert_eq!(bar.hit(250.0, 410.0), Some(Action::Download));
        assert_eq!(bar.hit(320.0, 240.0), None);
    }

    #[test]
    fn button_edges() {
        let bar = Toolbar::new(640, 480);
        let switch = &bar.buttons()[0];
        assert!(switch.contains(20.0, 20.0));
        assert!(!switch.contains((switch.x + switch.w) as f32, 20.0));
        assert_eq!(switch.w, 6 * 6 + 24);
    }

    #[test]
    fn draw_paints_buttons() {
        let bar = Toolbar::new(640, 480);
        let mut fb = FrameBuffer::filled(640, 480, 0x00222222);
        bar.draw(&mut fb);
        assert_eq!(fb.get(21, 21), Some(WHITE));
        assert_eq!(fb.get(320, 240), Some(0x00222222));
    }
}
