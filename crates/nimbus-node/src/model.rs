// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Compiled-in model constants and the one-time startup check against them
//!
//! The class count and input resolution are properties of the trained
//! network. They never change at run time; configuration, sensor and
//! accelerator are checked against them once before the first cycle.

use nimbus_config::InputLayout;
use nimbus_neural::{InputGeometry, InputVariant};

use crate::error::{NodeError, Result};
use crate::settings::NodeSettings;

/// Output classes of the cloud-type network
pub const NUM_CLASSES: usize = 4;

/// Single-channel 32x32 luma input
pub const LUMA_INPUT: InputGeometry = layout_geometry(InputLayout::Luma, InputVariant::Luma);

/// Three-channel 128x128 packed input
pub const PACKED_INPUT: InputGeometry =
    layout_geometry(InputLayout::PackedRgb, InputVariant::PackedRgb);

const fn layout_geometry(layout: InputLayout, variant: InputVariant) -> InputGeometry {
    let (width, height) = layout.input_window();
    InputGeometry::new(width, height, variant)
}

/// Model input geometry for a configured input layout
pub fn input_geometry(layout: InputLayout) -> InputGeometry {
    match layout {
        InputLayout::Luma => LUMA_INPUT,
        InputLayout::PackedRgb => PACKED_INPUT,
    }
}

/// What the accelerator driver reports about the network it carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceleratorShape {
    pub input_words: usize,
    pub output_len: usize,
}

/// Check configured labels, sensor window and accelerator against the
/// model.
///
/// Returns the input geometry every cycle will use. Any mismatch is fatal.
pub fn validate_model(
    settings: &NodeSettings,
    accelerator: AcceleratorShape,
) -> Result<InputGeometry> {
    let geometry = input_geometry(settings.input_layout);
    let capture = &settings.sensor.capture;

    if settings.labels.len() != NUM_CLASSES {
        return Err(NodeError::ModelMismatch(format!(
            "{} class labels configured, model has {} classes",
            settings.labels.len(),
            NUM_CLASSES
        )));
    }
    if capture.width != geometry.width || capture.height != geometry.height {
        return Err(NodeError::ModelMismatch(format!(
            "sensor captures {}x{}, {} model input is {}x{}",
            capture.width, capture.height, geometry.variant, geometry.width, geometry.height
        )));
    }
    if accelerator.output_len != NUM_CLASSES {
        return Err(NodeError::ModelMismatch(format!(
            "accelerator produces {} scores, model has {} classes",
            accelerator.output_len, NUM_CLASSES
        )));
    }
    if accelerator.input_words != geometry.word_count() {
        return Err(NodeError::ModelMismatch(format!(
            "accelerator consumes {} input words, {} input needs {}",
            accelerator.input_words,
            geometry.variant,
            geometry.word_count()
        )));
    }
    Ok(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nimbus_config::NimbusConfig;

    fn settings(width: u32, height: u32) -> NodeSettings {
        let mut settings = NodeSettings::from_config(&NimbusConfig::default()).unwrap();
        settings.sensor.capture.width = width;
        settings.sensor.capture.height = height;
        settings
    }

    fn luma_accelerator() -> AcceleratorShape {
        AcceleratorShape {
            input_words: 256,
            output_len: NUM_CLASSES,
        }
    }

    #[test]
    fn test_default_config_matches_luma_model() {
        let geometry = validate_model(&settings(32, 32), luma_accelerator()).unwrap();
        assert_eq!(geometry, LUMA_INPUT);
    }

    #[test]
    fn test_resolution_mismatch_is_fatal() {
        let err = validate_model(&settings(64, 64), luma_accelerator()).unwrap_err();
        assert!(matches!(err, NodeError::ModelMismatch(msg) if msg.contains("64x64")));
    }

    #[test]
    fn test_label_count_must_match_classes() {
        let mut settings = settings(32, 32);
        settings.labels.pop();
        assert!(matches!(
            validate_model(&settings, luma_accelerator()),
            Err(NodeError::ModelMismatch(_))
        ));
    }

    #[test]
    fn test_accelerator_shape_checked() {
        let wrong_outputs = AcceleratorShape {
            input_words: 256,
            output_len: 10,
        };
        assert!(validate_model(&settings(32, 32), wrong_outputs).is_err());

        let wrong_inputs = AcceleratorShape {
            input_words: 1024,
            output_len: NUM_CLASSES,
        };
        assert!(validate_model(&settings(32, 32), wrong_inputs).is_err());
    }

    #[test]
    fn test_packed_layout_needs_128_square() {
        let mut settings = settings(128, 128);
        settings.input_layout = InputLayout::PackedRgb;
        let accelerator = AcceleratorShape {
            input_words: 128 * 128,
            output_len: NUM_CLASSES,
        };
        assert_eq!(validate_model(&settings, accelerator).unwrap(), PACKED_INPUT);
    }

    #[test]
    fn test_geometry_tracks_configured_window() {
        for layout in [InputLayout::Luma, InputLayout::PackedRgb] {
            let geometry = input_geometry(layout);
            assert_eq!((geometry.width, geometry.height), layout.input_window());
        }
    }
}
