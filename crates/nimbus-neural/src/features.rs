// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Feature extraction
//!
//! Converts a raw colour frame into the exact tensor layout the accelerator
//! expects. Two layouts exist, selected by [`InputVariant`]:
//!
//! - **Luma**: `gray = round(0.29·R + 0.58·G + 0.11·B) − 128`, one signed
//!   byte per pixel, row-major.
//! - **Packed RGB**: `((B << 16) | (G << 8) | R) ^ 0x00808080`, one word per
//!   pixel. Flipping each channel's high bit is the same as subtracting 128
//!   from it while keeping the byte layout.
//!
//! The weights are fixed by the trained model and are not configurable. The
//! luma sum is computed in integer hundredths so rounding is exact.

use crate::types::{FeatureTensor, Frame, InputGeometry, InputVariant, Rgb};

/// Per-channel sign flip applied to packed pixels
pub const PACKED_BIAS_XOR: u32 = 0x0080_8080;

const LUMA_WEIGHT_R: u32 = 29;
const LUMA_WEIGHT_G: u32 = 58;
const LUMA_WEIGHT_B: u32 = 11;
const LUMA_WEIGHT_SCALE: u32 = 100;

/// `round(0.29·R + 0.58·G + 0.11·B)` in `0..=255`
#[inline]
pub(crate) fn luma_unbiased(px: Rgb) -> u8 {
    let weighted = LUMA_WEIGHT_R * u32::from(px.r)
        + LUMA_WEIGHT_G * u32::from(px.g)
        + LUMA_WEIGHT_B * u32::from(px.b);
    ((weighted + LUMA_WEIGHT_SCALE / 2) / LUMA_WEIGHT_SCALE).min(255) as u8
}

/// Signed luma for one pixel, saturated to the i8 range
///
/// # Example
/// ```
/// use nimbus_neural::{luma_pixel, Rgb};
///
/// assert_eq!(luma_pixel(Rgb::new(0, 0, 0)), -128);
/// assert_eq!(luma_pixel(Rgb::new(255, 255, 255)), 122);
/// ```
#[inline]
pub fn luma_pixel(px: Rgb) -> i8 {
    (i32::from(luma_unbiased(px)) - 128).clamp(i32::from(i8::MIN), i32::from(i8::MAX)) as i8
}

/// Packed, re-centred pixel word
///
/// # Example
/// ```
/// use nimbus_neural::{pack_pixel, Rgb};
///
/// assert_eq!(pack_pixel(Rgb::new(0, 0, 0)), 0x0080_8080);
/// assert_eq!(pack_pixel(Rgb::new(128, 128, 128)), 0);
/// ```
#[inline]
pub fn pack_pixel(px: Rgb) -> u32 {
    ((u32::from(px.b) << 16) | (u32::from(px.g) << 8) | u32::from(px.r)) ^ PACKED_BIAS_XOR
}

/// Stateless frame → tensor converter for one model input geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureExtractor {
    geometry: InputGeometry,
}

impl FeatureExtractor {
    pub fn new(geometry: InputGeometry) -> Self {
        Self { geometry }
    }

    pub fn geometry(&self) -> &InputGeometry {
        &self.geometry
    }

    pub fn variant(&self) -> InputVariant {
        self.geometry.variant
    }

    /// Tensor buffer to be reused for every cycle
    pub fn allocate(&self) -> FeatureTensor {
        FeatureTensor::zeroed(&self.geometry)
    }

    /// Overwrite `tensor` with the features of `frame`.
    ///
    /// The frame resolution and tensor length are trusted; they are checked
    /// once at startup (see [`Frame::check_against`]). Pixels beyond the
    /// shorter of the two are left untouched.
    pub fn extract(&self, frame: &Frame<'_>, tensor: &mut FeatureTensor) {
        debug_assert_eq!(tensor.variant(), self.geometry.variant);
        match tensor {
            FeatureTensor::Luma(out) => {
                for (slot, px) in out.iter_mut().zip(frame.pixels()) {
                    *slot = luma_pixel(px);
                }
            }
            FeatureTensor::PackedRgb(out) => {
                for (slot, px) in out.iter_mut().zip(frame.pixels()) {
                    *slot = pack_pixel(px);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_frame(px: Rgb, width: u32, height: u32) -> Vec<u8> {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for _ in 0..width * height {
            data.extend_from_slice(&[px.r, px.g, px.b]);
        }
        data
    }

    #[test]
    fn test_luma_white_pixel() {
        // 0.98 × 255 = 249.9 → 250 → 250 − 128
        assert_eq!(luma_pixel(Rgb::new(255, 255, 255)), 122);
    }

    #[test]
    fn test_luma_black_pixel_is_lower_bound() {
        assert_eq!(luma_pixel(Rgb::new(0, 0, 0)), -128);
    }

    #[test]
    fn test_luma_rounds_to_nearest() {
        // 0.29 × 10 = 2.9 → 3
        assert_eq!(luma_pixel(Rgb::new(10, 0, 0)), -125);
        // 0.11 × 4 = 0.44 → 0
        assert_eq!(luma_pixel(Rgb::new(0, 0, 4)), -128);
        // 0.58 × 1 + 0.11 × 1 + 0.29 × 1 = 0.98 → 1
        assert_eq!(luma_pixel(Rgb::new(1, 1, 1)), -127);
    }

    #[test]
    fn test_luma_crosses_zero_at_mid_gray() {
        // 0.98 × 131 = 128.38 → 128 → 0
        assert_eq!(luma_pixel(Rgb::new(131, 131, 131)), 0);
        assert_eq!(luma_pixel(Rgb::new(130, 130, 130)), -1);
    }

    #[test]
    fn test_luma_never_wraps() {
        let mut max = i8::MIN;
        for v in (0..=255u8).step_by(5) {
            let g = luma_pixel(Rgb::new(v, v, v));
            assert!(g >= max, "luma must be monotonic in gray level");
            max = g;
        }
        assert_eq!(max, 122);
    }

    #[test]
    fn test_pack_channel_order() {
        let word = pack_pixel(Rgb::new(0x11, 0x22, 0x33));
        assert_eq!(word ^ PACKED_BIAS_XOR, 0x0033_2211);
    }

    #[test]
    fn test_pack_is_minus_128_per_channel() {
        let word = pack_pixel(Rgb::new(200, 100, 0));
        let r = (word & 0xFF) as u8 as i8;
        let g = ((word >> 8) & 0xFF) as u8 as i8;
        let b = ((word >> 16) & 0xFF) as u8 as i8;
        assert_eq!((r, g, b), (72, -28, -128));
        assert_eq!(word >> 24, 0);
    }

    #[test]
    fn test_extract_luma_row_major() {
        let data = [
            0, 0, 0, /**/ 255, 255, 255, //
            131, 131, 131, /**/ 10, 0, 0,
        ];
        let frame = Frame::new(&data, 2, 2, 3);
        let extractor = FeatureExtractor::new(InputGeometry::new(2, 2, InputVariant::Luma));
        let mut tensor = extractor.allocate();
        extractor.extract(&frame, &mut tensor);
        assert_eq!(tensor.as_luma().unwrap(), &[-128, 122, 0, -125]);
    }

    #[test]
    fn test_extract_packed_from_streaming_stride() {
        let data = [0, 0, 0, 0xAA, 128, 128, 128, 0xAA];
        let frame = Frame::new(&data, 2, 1, 4);
        let extractor = FeatureExtractor::new(InputGeometry::new(2, 1, InputVariant::PackedRgb));
        let mut tensor = extractor.allocate();
        extractor.extract(&frame, &mut tensor);
        assert_eq!(tensor.as_packed().unwrap(), &[0x0080_8080, 0]);
    }

    #[test]
    fn test_extract_is_deterministic() {
        let data: Vec<u8> = (0..4 * 3 * 3).map(|i| (i * 37 % 256) as u8).collect();
        let frame = Frame::new(&data, 4, 3, 3);

        let luma = FeatureExtractor::new(InputGeometry::new(4, 3, InputVariant::Luma));
        let (mut first, mut second) = (luma.allocate(), luma.allocate());
        luma.extract(&frame, &mut first);
        luma.extract(&frame, &mut second);
        let values = first.as_luma().unwrap();
        assert_eq!(values, second.as_luma().unwrap());
        assert!(values.iter().any(|v| *v != values[0]));

        let packed = FeatureExtractor::new(InputGeometry::new(4, 3, InputVariant::PackedRgb));
        let (mut first, mut second) = (packed.allocate(), packed.allocate());
        packed.extract(&frame, &mut first);
        packed.extract(&frame, &mut second);
        let words = first.as_packed().unwrap();
        assert_eq!(words, second.as_packed().unwrap());
        assert!(words.iter().any(|w| *w != words[0]));
    }

    #[test]
    fn test_extract_overwrites_previous_cycle() {
        let geometry = InputGeometry::new(4, 4, InputVariant::Luma);
        let extractor = FeatureExtractor::new(geometry);
        let mut tensor = extractor.allocate();

        let bright = solid_frame(Rgb::new(255, 255, 255), 4, 4);
        extractor.extract(&Frame::new(&bright, 4, 4, 3), &mut tensor);
        let dark = solid_frame(Rgb::new(0, 0, 0), 4, 4);
        extractor.extract(&Frame::new(&dark, 4, 4, 3), &mut tensor);

        assert!(tensor.as_luma().unwrap().iter().all(|v| *v == -128));
    }
}
