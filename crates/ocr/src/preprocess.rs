use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use std::io::Cursor;
use thiserror::Error;

/// Captures above this edge length are scaled down before recognition.
pub const MAX_EDGE: u32 = 2800;
/// Thumbnails below this edge length are scaled up; OCR misses small glyphs.
pub const MIN_EDGE: u32 = 800;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Failed to decode capture: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Failed to encode processed capture: {0}")]
    Encode(String),
}

/// Decode a camera capture or upload (JPEG / PNG / WEBP / …) and return
/// grayscale, contrast-stretched PNG bytes sized for OCR.
pub fn prepare_capture(data: &[u8]) -> Result<Vec<u8>, PreprocessError> {
    let img = image::load_from_memory(data)?;
    encode_as_png(normalize(img))
}

fn normalize(img: DynamicImage) -> DynamicImage {
    let long_edge = img.width().max(img.height());
    let img = if long_edge > MAX_EDGE {
        img.resize(MAX_EDGE, MAX_EDGE, FilterType::Lanczos3)
    } else if long_edge > 0 && long_edge < MIN_EDGE {
        img.resize(MIN_EDGE, MIN_EDGE, FilterType::CatmullRom)
    } else {
        img
    };

    stretch_contrast(img.to_luma8())
}

fn stretch_contrast(gray: GrayImage) -> DynamicImage {
    let (min_px, max_px) = gray
        .pixels()
        .fold((255u8, 0u8), |(mn, mx), p| (mn.min(p[0]), mx.max(p[0])));

    if max_px <= min_px {
        return DynamicImage::ImageLuma8(gray);
    }

    let range = (max_px - min_px) as u32;
    let stretched: GrayImage = ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
        let p = gray.get_pixel(x, y)[0];
        Luma([((p - min_px) as u32 * 255 / range) as u8])
    });

    DynamicImage::ImageLuma8(stretched)
}

fn encode_as_png(img: DynamicImage) -> Result<Vec<u8>, PreprocessError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PreprocessError::Encode(e.to_string()))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, value: u8) -> DynamicImage {
        DynamicImage::ImageLuma8(ImageBuffer::from_fn(width, height, |_, _| Luma([value])))
    }

    #[test]
    fn uniform_capture_keeps_gray_level() {
        let result = normalize(solid(MIN_EDGE, 10, 128));
        assert_eq!(result.width(), MIN_EDGE);
        assert!(result.to_luma8().pixels().all(|p| p[0] == 128));
    }

    #[test]
    fn gradient_stretches_to_full_range() {
        let img: GrayImage =
            ImageBuffer::from_fn(1000, 1, |x, _| Luma([(50 + x * 100 / 1000) as u8]));
        let gray = normalize(DynamicImage::ImageLuma8(img)).to_luma8();
        assert_eq!(gray.pixels().map(|p| p[0]).min().unwrap(), 0);
        assert_eq!(gray.pixels().map(|p| p[0]).max().unwrap(), 255);
    }

    #[test]
    fn thumbnail_is_upscaled() {
        let result = normalize(solid(200, 100, 90));
        assert_eq!(result.width(), MIN_EDGE);
        assert_eq!(result.height(), MIN_EDGE / 2);
    }

    #[test]
    fn large_capture_is_downscaled() {
        let result = normalize(solid(3000, 1500, 200));
        assert!(result.width() <= MAX_EDGE && result.height() <= MAX_EDGE);
    }

    #[test]
    fn prepare_capture_produces_png() {
        let mut png = Vec::new();
        solid(4, 4, 100)
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        let result = prepare_capture(&png).unwrap();
        assert_eq!(&result[..4], b"\x89PNG");
    }

    #[test]
    fn prepare_capture_rejects_garbage() {
        assert!(matches!(
            prepare_capture(b"not an image"),
            Err(PreprocessError::Decode(_))
        ));
    }
}
