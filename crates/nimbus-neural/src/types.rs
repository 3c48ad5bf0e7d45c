// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Core Types
//!
//! Data passed between the stages of one duty cycle.
//!
//! | type | produced by | consumed by |
//! |---|---|---|
//! | [`Frame`] | sensor driver (borrowed) | feature extractor |
//! | [`FeatureTensor`] | feature extractor | accelerator input FIFO |
//! | [`ScoreVector`] | accelerator unload | softmax |
//! | [`ProbabilityVector`] | softmax | argmax |
//! | [`ClassificationResult`] | argmax | radio payload, diagnostics |

use core::fmt;

use crate::error::{NeuralError, Result};

/// 1.0 in Q15
pub const Q15_ONE: i32 = 1 << 15;

/// One 8-bit-per-channel pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Raw interleaved colour frame, borrowed from the sensor's capture buffer.
///
/// Pixels are stored as `R, G, B` (3 bytes per pixel) or, for the streaming
/// capture path, as little-endian `0x00bbggrr` words (4 bytes per pixel, the
/// fourth byte is ignored). The borrow ends before the next capture starts.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
    bytes_per_pixel: u8,
}

impl<'a> Frame<'a> {
    pub fn new(data: &'a [u8], width: u32, height: u32, bytes_per_pixel: u8) -> Self {
        Self {
            data,
            width,
            height,
            bytes_per_pixel,
        }
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bytes_per_pixel(&self) -> u8 {
        self.bytes_per_pixel
    }

    /// Buffer length in bytes as reported by the driver
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Row-major pixel iterator
    pub fn pixels(&self) -> impl Iterator<Item = Rgb> + 'a {
        let stride = usize::from(self.bytes_per_pixel.max(3));
        self.data
            .chunks_exact(stride)
            .take(self.pixel_count())
            .map(|p| Rgb::new(p[0], p[1], p[2]))
    }

    /// Verify this frame can feed a model with the given input geometry.
    ///
    /// Called once when the sensor is first configured; the extraction path
    /// itself trusts the geometry.
    pub fn check_against(&self, geometry: &InputGeometry) -> Result<()> {
        if !matches!(self.bytes_per_pixel, 3 | 4) {
            return Err(NeuralError::UnsupportedPixelStride(self.bytes_per_pixel));
        }
        if self.width != geometry.width || self.height != geometry.height {
            return Err(NeuralError::ResolutionMismatch {
                expected_width: geometry.width,
                expected_height: geometry.height,
                actual_width: self.width,
                actual_height: self.height,
            });
        }
        let needed = self.pixel_count() * usize::from(self.bytes_per_pixel);
        if self.data.len() < needed {
            return Err(NeuralError::FrameTooShort {
                expected: needed,
                actual: self.data.len(),
            });
        }
        Ok(())
    }
}

/// Accelerator input layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputVariant {
    /// Single-channel signed 8-bit luma, row-major
    Luma,
    /// One `0x00BBGGRR ^ 0x00808080` word per pixel
    PackedRgb,
}

impl InputVariant {
    pub fn channels(self) -> u32 {
        match self {
            InputVariant::Luma => 1,
            InputVariant::PackedRgb => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            InputVariant::Luma => "luma",
            InputVariant::PackedRgb => "packed_rgb",
        }
    }
}

impl fmt::Display for InputVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Expected model input: capture resolution plus layout.
///
/// No resizing happens anywhere, so this is also the sensor resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputGeometry {
    pub width: u32,
    pub height: u32,
    pub variant: InputVariant,
}

impl InputGeometry {
    pub const fn new(width: u32, height: u32, variant: InputVariant) -> Self {
        Self {
            width,
            height,
            variant,
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Number of scalar elements: width × height × channels
    pub fn element_count(&self) -> usize {
        self.pixel_count() * self.variant.channels() as usize
    }

    /// Number of 32-bit words pushed through the accelerator input FIFO
    pub fn word_count(&self) -> usize {
        match self.variant {
            InputVariant::Luma => self.pixel_count().div_ceil(4),
            InputVariant::PackedRgb => self.pixel_count(),
        }
    }
}

/// Model input tensor.
///
/// Allocated once by the controller and overwritten in place each cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureTensor {
    Luma(Vec<i8>),
    PackedRgb(Vec<u32>),
}

impl FeatureTensor {
    /// All-zero tensor sized for `geometry`
    pub fn zeroed(geometry: &InputGeometry) -> Self {
        match geometry.variant {
            InputVariant::Luma => FeatureTensor::Luma(vec![0; geometry.pixel_count()]),
            InputVariant::PackedRgb => FeatureTensor::PackedRgb(vec![0; geometry.pixel_count()]),
        }
    }

    pub fn variant(&self) -> InputVariant {
        match self {
            FeatureTensor::Luma(_) => InputVariant::Luma,
            FeatureTensor::PackedRgb(_) => InputVariant::PackedRgb,
        }
    }

    /// Number of pixels held
    pub fn len(&self) -> usize {
        match self {
            FeatureTensor::Luma(v) => v.len(),
            FeatureTensor::PackedRgb(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_luma(&self) -> Option<&[i8]> {
        match self {
            FeatureTensor::Luma(v) => Some(v),
            FeatureTensor::PackedRgb(_) => None,
        }
    }

    pub fn as_packed(&self) -> Option<&[u32]> {
        match self {
            FeatureTensor::PackedRgb(v) => Some(v),
            FeatureTensor::Luma(_) => None,
        }
    }

    pub fn word_count(&self) -> usize {
        match self {
            FeatureTensor::Luma(v) => v.len().div_ceil(4),
            FeatureTensor::PackedRgb(v) => v.len(),
        }
    }

    /// 32-bit word `index` as written to accelerator memory.
    ///
    /// Luma bytes are packed four per word, little-endian, matching a byte
    /// copy into the accelerator's data SRAM. A trailing partial word is zero
    /// padded.
    pub fn word(&self, index: usize) -> u32 {
        match self {
            FeatureTensor::Luma(v) => {
                let mut bytes = [0u8; 4];
                let start = index * 4;
                for (slot, value) in bytes.iter_mut().zip(v.iter().skip(start).take(4)) {
                    *slot = *value as u8;
                }
                u32::from_le_bytes(bytes)
            }
            FeatureTensor::PackedRgb(v) => v[index],
        }
    }

    /// Words in FIFO order
    pub fn words(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.word_count()).map(move |i| self.word(i))
    }

    /// Unsigned 8-bit grayscale view, for diagnostic image dumps.
    ///
    /// Luma values are shifted back to `0..=255`; packed pixels have their
    /// bias removed and are reduced with the same luma weights.
    pub fn grayscale(&self) -> impl Iterator<Item = u8> + '_ {
        let (luma, packed): (&[i8], &[u32]) = match self {
            FeatureTensor::Luma(v) => (v.as_slice(), &[]),
            FeatureTensor::PackedRgb(v) => (&[], v.as_slice()),
        };
        luma.iter()
            .map(|v| (*v as u8) ^ 0x80)
            .chain(packed.iter().map(|w| {
                let raw = w ^ crate::features::PACKED_BIAS_XOR;
                let r = (raw & 0xFF) as u8;
                let g = ((raw >> 8) & 0xFF) as u8;
                let b = ((raw >> 16) & 0xFF) as u8;
                crate::features::luma_unbiased(Rgb::new(r, g, b))
            }))
    }

    /// Confirm the buffer matches the model input before the first cycle
    pub fn check_against(&self, geometry: &InputGeometry) -> Result<()> {
        if self.variant() != geometry.variant || self.len() != geometry.pixel_count() {
            return Err(NeuralError::TensorLengthMismatch {
                expected: geometry.pixel_count(),
                actual: self.len(),
            });
        }
        Ok(())
    }
}

/// Raw accelerator output, one Q17.14 score per class.
///
/// `N` is the model's class count; it cannot change at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreVector<const N: usize>(pub [i32; N]);

impl<const N: usize> Default for ScoreVector<N> {
    fn default() -> Self {
        Self([0; N])
    }
}

impl<const N: usize> ScoreVector<N> {
    pub const LEN: usize = N;

    pub fn as_slice(&self) -> &[i32] {
        &self.0
    }

    pub fn as_mut_slice(&mut self) -> &mut [i32] {
        &mut self.0
    }
}

/// Softmax output, one Q15 probability per class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbabilityVector<const N: usize>(pub [i16; N]);

impl<const N: usize> Default for ProbabilityVector<N> {
    fn default() -> Self {
        Self([0; N])
    }
}

impl<const N: usize> ProbabilityVector<N> {
    pub const LEN: usize = N;

    pub fn as_slice(&self) -> &[i16] {
        &self.0
    }

    pub fn as_mut_slice(&mut self) -> &mut [i16] {
        &mut self.0
    }

    /// Per-class confidences in class order
    pub fn confidences(&self) -> impl Iterator<Item = Confidence> + '_ {
        self.0.iter().map(|p| Confidence::from_q15(*p))
    }

    /// Sum of all probabilities in Q15 (≈ [`Q15_ONE`])
    pub fn total(&self) -> i32 {
        self.0.iter().map(|p| i32::from(*p)).sum()
    }
}

/// Confidence in tenths of a percent (`500` = `50.0%`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Confidence(u16);

impl Confidence {
    /// `(1000 × p + 0x4000) >> 15`, i.e. `p / 32768` in per-mille with
    /// round-to-nearest
    pub fn from_q15(probability: i16) -> Self {
        let permille = (1000 * i32::from(probability) + 0x4000) >> 15;
        Confidence(permille.clamp(0, 1000) as u16)
    }

    pub fn tenths_of_percent(self) -> u16 {
        self.0
    }

    pub fn whole_percent(self) -> u16 {
        self.0 / 10
    }

    pub fn tenth_digit(self) -> u16 {
        self.0 % 10
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}%", self.whole_percent(), self.tenth_digit())
    }
}

/// Winning class of one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationResult {
    pub class_index: usize,
    /// Q15 probability of the winning class
    pub probability: i16,
    pub confidence: Confidence,
}
