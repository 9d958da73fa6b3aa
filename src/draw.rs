// Window + software drawing utilities.
// Visual effects provided here:
// 1) A window that shows the live camera image with your tiles on top.
// 2) The pinch viewfinder: outline, red→green fade and a progress bar.
// 3) A tiny 5x7 bitmap font for the HUD and button labels.

use crate::engine::{GestureView, RenderState};
use crate::error::Error;
use crate::input::PointerEvent;
use crate::pixels::blit;
use crate::types::FrameBuffer;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

pub const WHITE: u32 = 0x00_FF_FF_FF;
pub const YELLOW: u32 = 0x00_FF_FF_00;
pub const RED: u32 = 0x00_FF_00_00;
pub const BLACK: u32 = 0x00_00_00_00;

pub struct Drawer {
    window: Window, // the on-screen window you see
    pointer: PointerTracker,
}

impl Drawer {
    /// Create a window sized to the canvas.
    /// Visual: a new empty window appears with your chosen title.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(60);
        Ok(Self { window, pointer: PointerTracker::default() })
    }

    /// Push the pixels for this frame to the screen.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// C: clear all tiles.
    pub fn c_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::C, KeyRepeat::No)
    }

    /// S: save the collage.
    pub fn s_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::S, KeyRepeat::No)
    }

    /// W: switch camera.
    pub fn w_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::W, KeyRepeat::No)
    }

    /// Left-button transitions since the last call, in display pixels.
    pub fn poll_pointer(&mut self) -> Vec<PointerEvent> {
        let down = self.window.get_mouse_down(MouseButton::Left);
        let pos = self.window.get_mouse_pos(MouseMode::Clamp);
        self.pointer.update(down, pos)
    }
}

/// Turns polled button state into start/move/end events.
#[derive(Debug, Default)]
pub struct PointerTracker {
    down: bool,
    last: Option<(f32, f32)>,
}

impl PointerTracker {
    pub fn update(&mut self, down: bool, pos: Option<(f32, f32)>) -> Vec<PointerEvent> {
        let mut events = Vec::new();
        match (self.down, down, pos.or(self.last)) {
            (false, true, Some((x, y))) => events.push(PointerEvent::Start { x, y }),
            (true, true, Some((x, y))) if pos != self.last => {
                events.push(PointerEvent::Move { x, y })
            }
            (true, false, Some((x, y))) => events.push(PointerEvent::End { x, y }),
            _ => {}
        }
        // A press we could not locate does not count as "down".
        self.down = down && pos.or(self.last).is_some();
        if pos.is_some() {
            self.last = pos;
        }
        events
    }
}

/* ---------- Software drawing: pixels, rectangles ---------- */

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
#[inline]
fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    fb.pixels[idx] = color;
}

/// Solid rectangle, clipped to the buffer.
pub fn fill_rect(fb: &mut FrameBuffer, x: i32, y: i32, w: i32, h: i32, color: u32) {
    for yy in y.max(0)..(y + h).min(fb.height as i32) {
        for xx in x.max(0)..(x + w).min(fb.width as i32) {
            put_pixel(fb, xx, yy, color);
        }
    }
}

/// Rectangle outline `weight` pixels thick, centred on the edge line.
/// Visual: a frame around a tile or around the viewfinder.
pub fn stroke_rect(fb: &mut FrameBuffer, x: i32, y: i32, w: i32, h: i32, weight: i32, color: u32) {
    let half = weight / 2;
    let (x0, y0) = (x - half, y - half);
    let (span_w, span_h) = (w + weight, h + weight);
    fill_rect(fb, x0, y0, span_w, weight, color); // top
    fill_rect(fb, x0, y + h - half, span_w, weight, color); // bottom
    fill_rect(fb, x0, y0, weight, span_h, color); // left
    fill_rect(fb, x + w - half, y0, weight, span_h, color); // right
}

/// Red at 0% progress, green at 100%.
pub fn progress_color(progress: f32) -> u32 {
    let p = progress.clamp(0.0, 1.0);
    let r = (255.0 * (1.0 - p)).round() as u32;
    let g = (255.0 * p).round() as u32;
    (r << 16) | (g << 8)
}

/* ---------- The collage, in content space ---------- */

/// Camera, tiles and viewfinder, all in unmirrored camera coordinates.
/// The caller flips the whole result when the feed is mirrored.
pub fn draw_collage(scene: &mut FrameBuffer, camera: &FrameBuffer, state: &RenderState<'_>) {
    if scene.same_size(camera) {
        scene.pixels.copy_from_slice(&camera.pixels);
    } else {
        scene.pixels.fill(BLACK);
        blit(scene, camera, 0, 0);
    }

    for tile in state.tiles {
        // Same rounding as the crop, so frozen pixels land where they were grabbed.
        let (x, y) = (tile.x.round() as i32, tile.y.round() as i32);
        let (w, h) = (tile.image.width as i32, tile.image.height as i32);
        // Visual: the tile you are dragging gets a thicker yellow frame.
        if Some(tile.id) == state.dragged {
            stroke_rect(scene, x, y, w, h, 5, YELLOW);
        } else {
            stroke_rect(scene, x, y, w, h, 3, WHITE);
        }
        blit(scene, &tile.image, x, y);
    }

    if let Some(gesture) = state.gesture {
        draw_viewfinder(scene, &gesture, state.dragged.is_some());
    }
}

fn draw_viewfinder(scene: &mut FrameBuffer, g: &GestureView, dragging: bool) {
    let r = g.rect;
    let (x, y, w, h) = (r.x as i32, r.y as i32, r.w as i32, r.h as i32);
    if g.hovering {
        // Visual: colour slides red→green; the bar above fills left-to-right.
        let color = progress_color(g.progress);
        stroke_rect(scene, x, y, w, h, 4, color);
        fill_rect(scene, x, y - 15, (r.w * g.progress) as i32, 8, color);
    } else if !dragging && r.has_area() {
        stroke_rect(scene, x, y, w, h, 1, RED);
    }
}

/* ---------- 5x7 bitmap font ---------- */

/// Return a 5x7 glyph bitmap. Lowercase letters render as uppercase.
/// Each u8 is a row; the low 5 bits are the pixels (bit 4 = leftmost).
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch.to_ascii_uppercase() {
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'H' => g!(0b10001,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'J' => g!(0b00111,0b00010,0b00010,0b00010,0b00010,0b10010,0b01100),
        'K' => g!(0b10001,0b10010,0b10100,0b11000,0b10100,0b10010,0b10001),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b10001,0b11001,0b10101,0b10011,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'Q' => g!(0b01110,0b10001,0b10001,0b10001,0b10101,0b10010,0b01101),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'V' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b10101,0b01010),
        'X' => g!(0b10001,0b10001,0b01010,0b00100,0b01010,0b10001,0b10001),
        'Y' => g!(0b10001,0b10001,0b01010,0b00100,0b00100,0b00100,0b00100),
        'Z' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b10000,0b11111),

        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),
        '-' => g!(0b00000,0b00000,0b00000,0b11111,0b00000,0b00000,0b00000),
        '/' => g!(0b00000,0b00001,0b00010,0b00100,0b01000,0b10000,0b00000),
        '%' => g!(0b11000,0b11001,0b00010,0b00100,0b01000,0b10011,0b00011),

        _ => None,
    }
}

/// Draw a single 5x7 character at (x,y).
/// Visual: a tiny glyph with a 1-pixel black shadow for contrast.
fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, color: u32) {
    if let Some(rows) = glyph5x7(ch) {
        for (shift, c) in [(1, BLACK), (0, color)] {
            for (ry, rowbits) in rows.iter().enumerate() {
                for rx in 0..5 {
                    if (rowbits & (1 << (4 - rx))) != 0 {
                        put_pixel(fb, x + rx + shift, y + ry as i32 + shift, c);
                    }
                }
            }
        }
    }
}

/// Draw a text string using 5x7 glyphs, 1 pixel apart.
pub fn draw_text_5x7(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, color: u32) {
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, color);
        x += 6;
    }
}

/// Pixel width of `text` as drawn by `draw_text_5x7`.
pub fn text_width_5x7(text: &str) -> i32 {
    text.chars().count() as i32 * 6
}
