//! JPEG images, embedded unchanged as DCTDecode XObjects.

use crate::error::BookError;
use anyhow::{Context, Result};
use image::codecs::jpeg::JpegDecoder;
use image::{ExtendedColorType, ImageDecoder};
use std::io::Cursor;
use std::path::Path;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColourSpace {
    Gray,
    Rgb,
    Cmyk,
}

impl ColourSpace {
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ColourSpace::Gray => "DeviceGray",
            ColourSpace::Rgb => "DeviceRGB",
            ColourSpace::Cmyk => "DeviceCMYK",
        }
    }
}

/// A JPEG file read into memory along with what the PDF needs to know about it.
#[derive(Clone)]
pub struct JpegImage {
    pub width_px: u32,
    pub height_px: u32,
    pub colour_space: ColourSpace,
    pub data: Vec<u8>,
}

impl std::fmt::Debug for JpegImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JpegImage")
            .field("width_px", &self.width_px)
            .field("height_px", &self.height_px)
            .field("colour_space", &self.colour_space)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl JpegImage {
    pub fn new_from_disk(path: &Path) -> Result<JpegImage> {
        let data = std::fs::read(path).map_err(|e| BookError::io(path, e))?;
        JpegImage::from_bytes(data)
            .with_context(|| format!("Failed to read JPEG image {}", path.display()))
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<JpegImage> {
        let (width_px, height_px, colour_space) = {
            let decoder = JpegDecoder::new(Cursor::new(data.as_slice()))
                .map_err(|e| BookError::Render(format!("invalid JPEG data: {e}")))?;
            let (width, height) = decoder.dimensions();
            let colour_space = match decoder.original_color_type() {
                ExtendedColorType::L8 | ExtendedColorType::L16 => ColourSpace::Gray,
                ExtendedColorType::Cmyk8 => ColourSpace::Cmyk,
                _ => ColourSpace::Rgb,
            };
            (width, height, colour_space)
        };

        if width_px == 0 || height_px == 0 {
            return Err(BookError::Render("JPEG image has no pixels".to_string()).into());
        }

        Ok(JpegImage {
            width_px,
            height_px,
            colour_space,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 30, 30]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Jpeg)
            .expect("can encode jpeg");
        out.into_inner()
    }

    #[test]
    fn can_read_jpeg_dimensions() {
        let image = JpegImage::from_bytes(encode_jpeg(40, 20)).expect("can read jpeg");
        assert_eq!(image.width_px, 40);
        assert_eq!(image.height_px, 20);
        assert_eq!(image.colour_space, ColourSpace::Rgb);
    }

    #[test]
    fn can_reject_non_jpeg_bytes() {
        assert!(JpegImage::from_bytes(b"not a jpeg at all".to_vec()).is_err());
    }
}
