// Save the composed canvas to disk.
// Visual: nothing changes on screen; a picture of what you see (minus buttons/HUD) lands in a file.

use crate::error::{Error, Result};
use crate::types::FrameBuffer;
use image::error::{ImageError, ParameterError, ParameterErrorKind};
use image::{ImageBuffer, Rgb, RgbImage};
use std::path::Path;
use tracing::info;

/// Unpack 0x00RRGGBB pixels into an RGB image.
pub fn to_rgb_image(fb: &FrameBuffer) -> Result<RgbImage> {
    let mut raw = Vec::with_capacity(fb.pixels.len() * 3);
    for px in &fb.pixels {
        raw.extend_from_slice(&[(px >> 16) as u8, (px >> 8) as u8, *px as u8]);
    }
    ImageBuffer::<Rgb<u8>, _>::from_raw(fb.width as u32, fb.height as u32, raw)
        .ok_or_else(|| {
            Error::Export(ImageError::Parameter(ParameterError::from_kind(
                ParameterErrorKind::DimensionMismatch,
            )))
        })
}

/// Write the canvas; the format follows the file extension (jpg, png, ...).
pub fn export_canvas(fb: &FrameBuffer, path: &Path) -> Result<()> {
    to_rgb_image(fb)?.save(path)?;
    info!("collage saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_conversion_keeps_channels() {
        let fb = FrameBuffer { width: 2, height: 1, pixels: vec![0x00102030, 0x00FFFFFF] };
        let img = to_rgb_image(&fb).unwrap();
        assert_eq!(img.get_pixel(0, 0).0, [0x10, 0x20, 0x30]);
        assert_eq!(img.get_pixel(1, 0).0, [0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn mismatched_buffer_is_an_error() {
        let fb = FrameBuffer { width: 3, height: 3, pixels: vec![0; 2] };
        assert!(to_rgb_image(&fb).is_err());
    }

    #[test]
    fn export_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("collage.png");
        let fb = FrameBuffer::filled(8, 6, 0x00FF8800);
        export_canvas(&fb, &path).unwrap();

        let back = image::open(&path).unwrap().to_rgb8();
        assert_eq!(back.dimensions(), (8, 6));
        assert_eq!(back.get_pixel(3, 3).0, [0xFF, 0x88, 0x00]);
    }

    #[test]
    fn unknown_extension_fails() {
        let dir = tempfile::tempdir().unwrap();
        let fb = FrameBuffer::filled(2, 2, 0);
        assert!(matches!(export_canvas(&fb, &dir.path().join("collage.nope")), Err(Error::Export(_))));
    }
}
