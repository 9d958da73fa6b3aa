// Whole-buffer pixel operations: cut out a tile, flip the view, rescale a feed.

use crate::geometry::Rect;
use crate::types::FrameBuffer;

/// Copy the pixels under `rect` into a new buffer, clipped to `src`.
/// Edges round to the nearest pixel, so the result is never larger than the frame.
/// Visual: exactly what was inside the viewfinder.
pub fn crop(src: &FrameBuffer, rect: Rect) -> FrameBuffer {
    let (fw, fh) = (src.width as f32, src.height as f32);
    let x0 = rect.x.round().clamp(0.0, fw) as usize;
    let y0 = rect.y.round().clamp(0.0, fh) as usize;
    let x1 = (rect.x + rect.w).round().clamp(x0 as f32, fw) as usize;
    let y1 = (rect.y + rect.h).round().clamp(y0 as f32, fh) as usize;

    let mut out = Vec::with_capacity((x1 - x0) * (y1 - y0));
    for y in y0..y1 {
        let row = y * src.width;
        out.extend_from_slice(&src.pixels[row + x0..row + x1]);
    }
    FrameBuffer { width: x1 - x0, height: y1 - y0, pixels: out }
}

/// Write `src` flipped left-to-right into `dst` (same size).
/// Visual: the selfie-style view, your right hand appears on the right.
pub fn mirror_into(src: &FrameBuffer, dst: &mut FrameBuffer) {
    debug_assert!(src.same_size(dst));
    let w = src.width;
    if w == 0 {
        return;
    }
    for (src_row, dst_row) in src.pixels.chunks_exact(w).zip(dst.pixels.chunks_exact_mut(w)) {
        for (d, s) in dst_row.iter_mut().zip(src_row.iter().rev()) {
            *d = *s;
        }
    }
}

/// Nearest-neighbour rescale so a camera with another resolution still fills the canvas.
pub fn fit_to(src: &FrameBuffer, width: usize, height: usize) -> FrameBuffer {
    if src.width == width && src.height == height {
        return src.clone();
    }
    if src.width == 0 || src.height == 0 {
        return FrameBuffer::filled(width, height, 0);
    }
    let mut out = Vec::with_capacity(width * height);
    for y in 0..height {
        let sy = y * src.height / height;
        let row = sy * src.width;
        for x in 0..width {
            let sx = x * src.width / width;
            out.push(src.pixels[row + sx]);
        }
    }
    FrameBuffer { width, height, pixels: out }
}

/// Paint `src` with its top-left at (x,y), clipped to `dst`.
/// Visual: a captured tile appears at its current position.
pub fn blit(dst: &mut FrameBuffer, src: &FrameBuffer, x: i32, y: i32) {
    for sy in 0..src.height {
        let dy = y + sy as i32;
        if dy < 0 || dy >= dst.height as i32 {
            continue;
        }
        for sx in 0..src.width {
            let dx = x + sx as i32;
            if dx < 0 || dx >= dst.width as i32 {
                continue;
            }
            dst.pixels[dy as usize * dst.width + dx as usize] = src.pixels[sy * src.width + sx];
        }
    }
}
