//! Native dimension extraction.
//!
//! Images are probed here by reading the encoded header with the `image`
//! crate. Videos are decoded by the browser, so only the validation of the
//! reported metadata lives here; the element plumbing is in `pixiquad-io`.

use std::io::Cursor;

use crate::types::{Dimensions, ProbeError};

/// How long to wait for a video's `loadedmetadata` event before giving up.
pub const VIDEO_PROBE_TIMEOUT_MS: u32 = 10_000;

/// Read the intrinsic size of an encoded image.
///
/// Only the header is parsed; pixel data is not decoded.
///
/// # Errors
///
/// Returns [`ProbeError::EmptyInput`] if `bytes` is empty,
/// [`ProbeError::Decode`] if the format is unrecognized or the header is
/// corrupt, and [`ProbeError::ZeroSize`] if the header declares a zero
/// width or height.
pub fn image_dimensions(bytes: &[u8]) -> Result<Dimensions, ProbeError> {
    if bytes.is_empty() {
        return Err(ProbeError::EmptyInput);
    }

    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ProbeError::Decode(e.to_string()))?;
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| ProbeError::Decode(e.to_string()))?;

    Dimensions::new(width, height).ok_or(ProbeError::ZeroSize)
}

/// Validate the `videoWidth`/`videoHeight` pair reported by the browser.
///
/// Audio-only files load metadata successfully but report `0x0`.
///
/// # Errors
///
/// Returns [`ProbeError::ZeroSize`] if either side is zero.
pub const fn video_dimensions(width: u32, height: u32) -> Result<Dimensions, ProbeError> {
    match Dimensions::new(width, height) {
        Some(dimensions) => Ok(dimensions),
        None => Err(ProbeError::ZeroSize),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::ImageEncoder;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut buf = Vec::new();
        image::codecs::png::PngEncoder::new(&mut buf)
            .write_image(
                img.as_raw(),
                img.width(),
                img.height(),
                image::ExtendedColorType::Rgba8,
            )
            .unwrap();
        buf
    }

    fn jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 100, 50]));
        let mut buf = Vec::new();
        image::codecs::jpeg::JpegEncoder::new(&mut buf)
            .write_image(
                img.as_raw(),
                img.width(),
                img.height(),
                image::ExtendedColorType::Rgb8,
            )
            .unwrap();
        buf
    }

    #[test]
    fn empty_input_returns_error() {
        assert_eq!(image_dimensions(&[]), Err(ProbeError::EmptyInput));
    }

    #[test]
    fn corrupt_bytes_return_decode_error() {
        let result = image_dimensions(&[0xFF, 0xFE, 0x00, 0x01]);
        assert!(matches!(result, Err(ProbeError::Decode(_))));
    }

    #[test]
    fn png_reports_intrinsic_size() {
        let dims = image_dimensions(&png(17, 31)).unwrap();
        assert_eq!(
            dims,
            Dimensions {
                width: 17,
                height: 31
            }
        );
    }

    #[test]
    fn jpeg_reports_intrinsic_size() {
        let dims = image_dimensions(&jpeg(64, 9)).unwrap();
        assert_eq!(
            dims,
            Dimensions {
                width: 64,
                height: 9
            }
        );
    }

    #[test]
    fn every_decodable_type_reports_intrinsic_size() {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            17,
            31,
            image::Rgb([10, 20, 30]),
        ));
        for mime in crate::types::DECODABLE_IMAGE_TYPES {
            let format = image::ImageFormat::from_mime_type(mime).unwrap();
            let mut buf = std::io::Cursor::new(Vec::new());
            img.write_to(&mut buf, format).unwrap();
            assert_eq!(
                image_dimensions(buf.get_ref()),
                Ok(Dimensions {
                    width: 17,
                    height: 31
                }),
                "{mime}"
            );
        }
    }

    #[test]
    fn svg_is_not_decodable() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"/>"#;
        assert!(matches!(image_dimensions(svg), Err(ProbeError::Decode(_))));
    }

    #[test]
    fn video_metadata_must_have_a_picture() {
        assert_eq!(video_dimensions(0, 0), Err(ProbeError::ZeroSize));
        assert_eq!(
            video_dimensions(1920, 1080),
            Ok(Dimensions {
                width: 1920,
                height: 1080
            })
        );
    }
}
