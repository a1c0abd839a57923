//! Bitmap sizing policy
//!
//! Oversized source images are downsampled at decode time by a power-of-two
//! factor so peak memory stays bounded by the display budget, while images
//! already within budget are decoded as-is (upscaling small images would
//! only distort them).

use crate::host::DisplayOracle;

/// Fixed decode budget used in compatibility mode: twice the legacy
/// 360x420 canvas.
pub const COMPAT_MAX_WIDTH: u32 = 360 * 2;
pub const COMPAT_MAX_HEIGHT: u32 = 420 * 2;

/// Per-request decode parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    pub max_width: u32,
    pub max_height: u32,
    pub sample_factor: u32,
}

impl DecodeOptions {
    /// Budget and sample factor for an image of the given native size on the
    /// given display.
    pub fn for_image(display: &dyn DisplayOracle, native_width: u32, native_height: u32) -> Self {
        let (max_width, max_height) = decode_budget(display);
        DecodeOptions {
            max_width,
            max_height,
            sample_factor: sample_factor(native_width, native_height, max_width, max_height),
        }
    }
}

/// Decode budget for the display: the fixed legacy constants in
/// compatibility mode, otherwise the display size divided by its density
/// scale.
pub fn decode_budget(display: &dyn DisplayOracle) -> (u32, u32) {
    if display.compatibility_mode() {
        (COMPAT_MAX_WIDTH, COMPAT_MAX_HEIGHT)
    } else {
        let scale = display.density_scale();
        (
            (display.width() as f32 / scale) as u32,
            (display.height() as f32 / scale) as u32,
        )
    }
}

/// Smallest power-of-two factor that brings *either* dimension within its
/// budget. Doubles while both dimensions still exceed the budget, so an
/// image larger than the screen never ends up decoded smaller than it.
pub fn sample_factor(native_width: u32, native_height: u32, max_width: u32, max_height: u32) -> u32 {
    let mut factor = 1;
    while native_width / factor > max_width && native_height / factor > max_height {
        factor *= 2;
    }
    factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::FixedDisplay;

    #[test]
    fn oversized_image_samples_down_to_four() {
        assert_eq!(sample_factor(4000, 3000, 1000, 1000), 4);
    }

    #[test]
    fn small_image_is_not_sampled() {
        assert_eq!(sample_factor(500, 500, 1000, 1000), 1);
    }

    #[test]
    fn one_dimension_within_budget_stops_the_doubling() {
        // Height is already within budget, so width alone never forces a
        // factor.
        assert_eq!(sample_factor(4000, 900, 1000, 1000), 1);
    }

    #[test]
    fn exact_budget_is_within_budget() {
        assert_eq!(sample_factor(1000, 1000, 1000, 1000), 1);
        assert_eq!(sample_factor(2000, 2000, 1000, 1000), 2);
    }

    #[test]
    fn budget_follows_density_in_responsive_mode() {
        let display = FixedDisplay {
            width: 1280,
            height: 800,
            density_scale: 2.0,
            compatibility_mode: false,
        };
        assert_eq!(decode_budget(&display), (640, 400));
    }

    #[test]
    fn budget_is_fixed_in_compatibility_mode() {
        let display = FixedDisplay {
            width: 1280,
            height: 800,
            density_scale: 2.0,
            compatibility_mode: true,
        };
        assert_eq!(decode_budget(&display), (COMPAT_MAX_WIDTH, COMPAT_MAX_HEIGHT));
    }
}
