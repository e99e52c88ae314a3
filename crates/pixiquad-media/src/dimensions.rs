//! Validation of user-entered target dimensions.
//!
//! The resizer form has two free-text fields. Both must hold a positive
//! whole number no larger than [`MAX_TARGET_DIMENSION`], and together
//! they may not exceed [`MAX_TARGET_PIXELS`], before any resize work
//! starts.

use crate::types::{Axis, Dimensions, ValidationError};

/// Largest accepted width or height, in pixels.
///
/// Same as the per-side canvas limit in current browsers. A full
/// 16384×16384 RGBA buffer is 1 GiB.
pub const MAX_TARGET_DIMENSION: u32 = 16_384;

/// Largest accepted `width * height`.
///
/// 100 MP is 400 MB as RGBA8, which leaves room for the decoded source
/// and the resampling buffer inside a 4 GiB wasm32 address space.
pub const MAX_TARGET_PIXELS: u64 = 100_000_000;

/// Parse the width and height fields into target [`Dimensions`].
///
/// Surrounding whitespace is ignored. Everything else must be decimal
/// digits: empty input, signs, fractions, exponents, and zero are all
/// rejected.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidDimension`] for the first field
/// that is not a positive whole number, or
/// [`ValidationError::DimensionTooLarge`] if it exceeds
/// [`MAX_TARGET_DIMENSION`], then [`ValidationError::AreaTooLarge`] if
/// the total exceeds [`MAX_TARGET_PIXELS`].
pub fn parse_target(width: &str, height: &str) -> Result<Dimensions, ValidationError> {
    let width = parse_axis(Axis::Width, width)?;
    let height = parse_axis(Axis::Height, height)?;
    if u64::from(width) * u64::from(height) > MAX_TARGET_PIXELS {
        return Err(ValidationError::AreaTooLarge {
            width,
            height,
            max: MAX_TARGET_PIXELS,
        });
    }
    Ok(Dimensions { width, height })
}

fn parse_axis(axis: Axis, raw: &str) -> Result<u32, ValidationError> {
    let trimmed = raw.trim();
    let invalid = || ValidationError::InvalidDimension {
        axis,
        value: raw.to_owned(),
    };

    // `u32::from_str` accepts a leading `+`; the form should not.
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    // All digits, so the only parse failure left is overflow.
    let value = trimmed.parse::<u32>().map_err(|_| ValidationError::DimensionTooLarge {
        axis,
        value: u32::MAX,
        max: MAX_TARGET_DIMENSION,
    })?;

    if value == 0 {
        return Err(invalid());
    }
    if value > MAX_TARGET_DIMENSION {
        return Err(ValidationError::DimensionTooLarge {
            axis,
            value,
            max: MAX_TARGET_DIMENSION,
        });
    }
    Ok(value)
}
