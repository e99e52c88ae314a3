//! Image resizing to exact target dimensions.
//!
//! Decodes the uploaded image, resamples it to exactly the requested
//! width and height (aspect ratio is not preserved), and re-encodes the
//! result as PNG.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};

use crate::artifact::ImageArtifact;
use crate::types::{Dimensions, ResizeError};

/// Resampling filter used for every resize.
///
/// Bilinear, matching the default smoothing of a browser 2D canvas.
pub const RESIZE_FILTER: FilterType = FilterType::Triangle;

/// Peak memory a single resize may use, in bytes.
///
/// An allocation failure aborts a wasm32 module, so oversized work is
/// refused up front.
pub const MAX_RESIZE_BYTES: u64 = 1536 * 1024 * 1024;

/// Estimated peak allocation for resizing a decoded `source` to `target`.
///
/// Counts the decoded source, the `f32` RGBA buffer the separable filter
/// fills (`source_width * target_height`), the resampled output, and the
/// RGBA8 conversion when the output is not RGBA8 already.
#[must_use]
pub fn resize_cost(source: &DynamicImage, target: Dimensions) -> u64 {
    let decoded = source.as_bytes().len() as u64;
    let bytes_per_pixel = u64::from(source.color().bytes_per_pixel());
    let target_pixels = u64::from(target.width) * u64::from(target.height);
    let intermediate = u64::from(source.width()) * u64::from(target.height) * 16;
    let output = target_pixels * bytes_per_pixel;
    let conversion = if matches!(source, DynamicImage::ImageRgba8(_)) {
        0
    } else {
        target_pixels * 4
    };
    decoded + intermediate + output + conversion
}

/// Resize an encoded image to exactly `target` and encode it as PNG.
///
/// # Errors
///
/// Returns [`ResizeError::EmptyInput`] if `bytes` is empty,
/// [`ResizeError::Decode`] if the image cannot be decoded,
/// [`ResizeError::TooLarge`] if the resize would exceed
/// [`MAX_RESIZE_BYTES`], and [`ResizeError::Encode`] if PNG encoding
/// fails.
pub fn resize_image(bytes: &[u8], target: Dimensions) -> Result<ImageArtifact, ResizeError> {
    resize_image_within(bytes, target, MAX_RESIZE_BYTES)
}

fn resize_image_within(
    bytes: &[u8],
    target: Dimensions,
    limit: u64,
) -> Result<ImageArtifact, ResizeError> {
    if bytes.is_empty() {
        return Err(ResizeError::EmptyInput);
    }

    // `image` applies its default decode limits (512 MiB) here.
    let decoded = image::load_from_memory(bytes).map_err(ResizeError::Decode)?;
    let needed = resize_cost(&decoded, target);
    if needed > limit {
        return Err(ResizeError::TooLarge {
            source_width: decoded.width(),
            source_height: decoded.height(),
            target,
            needed,
            limit,
        });
    }

    let resized = decoded.resize_exact(target.width, target.height, RESIZE_FILTER);
    drop(decoded);

    // Rough estimate: one byte per pixel after compression.
    let estimate = (target.width as usize).saturating_mul(target.height as usize);
    let mut png = Cursor::new(Vec::with_capacity(estimate));
    // Always 8-bit RGBA: alpha survives, 16-bit and float sources do not.
    let rgba = if matches!(resized, DynamicImage::ImageRgba8(_)) {
        resized
    } else {
        DynamicImage::ImageRgba8(resized.into_rgba8())
    };
    rgba.write_to(&mut png, ImageFormat::Png)
        .map_err(ResizeError::Encode)?;

    Ok(ImageArtifact::new(png.into_inner(), target))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::ImageEncoder;

    fn checkerboard_png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                image::Rgba([0, 0, 0, 255])
            } else {
                image::Rgba([255, 255, 255, 128])
            }
        });
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

    fn decoded_size(png: &[u8]) -> (u32, u32) {
        let img = image::load_from_memory_with_format(png, ImageFormat::Png).unwrap();
        (img.width(), img.height())
    }

    #[test]
    fn empty_input_returns_error() {
        let target = Dimensions {
            width: 4,
            height: 4,
        };
        assert!(matches!(
            resize_image(&[], target),
            Err(ResizeError::EmptyInput)
        ));
    }

    #[test]
    fn corrupt_input_returns_decode_error() {
        let target = Dimensions {
            width: 4,
            height: 4,
        };
        assert!(matches!(
            resize_image(&[0x89, b'P', b'N', b'G'], target),
            Err(ResizeError::Decode(_))
        ));
    }

    #[test]
    fn output_matches_target_exactly() {
        let source = checkerboard_png(40, 30);
        for (w, h) in [(1, 1), (10, 10), (80, 15), (7, 300), (40, 30)] {
            let target = Dimensions {
                width: w,
                height: h,
            };
            let artifact = resize_image(&source, target).unwrap();
            assert_eq!(artifact.dimensions(), target);
            assert_eq!(decoded_size(artifact.png()), (w, h), "target {w}x{h}");
        }
    }

    #[test]
    fn output_is_png_with_alpha() {
        let source = checkerboard_png(8, 8);
        let target = Dimensions {
            width: 8,
            height: 8,
        };
        let artifact = resize_image(&source, target).unwrap();
        assert_eq!(
            image::guess_format(artifact.png()).unwrap(),
            ImageFormat::Png
        );
        let img = image::load_from_memory(artifact.png()).unwrap();
        assert!(img.color().has_alpha());
    }

    #[test]
    fn oversized_resize_is_refused_before_allocating() {
        let source = checkerboard_png(40, 30);
        let target = Dimensions {
            width: 1000,
            height: 1000,
        };
        // 40x30 RGBA8 source, 40x1000 f32 buffer, 1000x1000 RGBA8 output.
        let needed = 40 * 30 * 4 + 40 * 1000 * 16 + 1000 * 1000 * 4;
        let err = resize_image_within(&source, target, needed - 1).unwrap_err();
        assert!(
            matches!(
                err,
                ResizeError::TooLarge {
                    source_width: 40,
                    source_height: 30,
                    needed: n,
                    ..
                } if n == needed
            ),
            "{err}"
        );
        assert!(resize_image_within(&source, target, needed).is_ok());
    }

    #[test]
    fn cost_counts_rgba_conversion_for_other_layouts() {
        let rgb = DynamicImage::ImageRgb8(image::RgbImage::new(4000, 3000));
        let target = Dimensions {
            width: 10_000,
            height: 10_000,
        };
        let expected = 4000 * 3000 * 3 + 4000 * 10_000 * 16 + 10_000 * 10_000 * (3 + 4);
        assert_eq!(resize_cost(&rgb, target), expected);
        // The largest area the form accepts still fits for a 4000 px wide photo.
        assert!(resize_cost(&rgb, target) <= MAX_RESIZE_BYTES);
    }

    #[test]
    fn very_wide_source_with_tall_target_is_too_large() {
        let wide = DynamicImage::ImageRgba8(image::RgbaImage::new(16_000, 1));
        let target = Dimensions {
            width: 6000,
            height: 16_384,
        };
        assert!(resize_cost(&wide, target) > MAX_RESIZE_BYTES);
    }

    #[test]
    fn aspect_ratio_is_not_preserved() {
        let source = checkerboard_png(100, 100);
        let target = Dimensions {
            width: 50,
            height: 10,
        };
        let artifact = resize_image(&source, target).unwrap();
        assert_eq!(decoded_size(artifact.png()), (50, 10));
    }
}
