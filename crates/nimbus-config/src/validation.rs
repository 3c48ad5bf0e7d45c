// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Every problem is collected and reported together so one edit-run cycle
//! fixes them all. The sensor window is checked against the input layout
//! here; the accelerator itself is checked by the node at startup.

use crate::{ConfigError, ConfigResult, NimbusConfig};

/// LoRa spreading factors accepted by the transceiver
pub const SPREADING_FACTOR_RANGE: std::ops::RangeInclusive<u8> = 5..=12;
/// Transmit power the power amplifier supports
pub const TX_POWER_DBM_RANGE: std::ops::RangeInclusive<i8> = -9..=22;
/// Sub-GHz band covered by the transceiver
pub const FREQUENCY_HZ_RANGE: std::ops::RangeInclusive<u32> = 150_000_000..=960_000_000;
/// Largest sensor window in either dimension
pub const MAX_SENSOR_DIMENSION: u32 = 640;

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    OutOfRange { field: String, value: String, range: String },
    MissingRequired { field: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange { field, value, range } => {
                write!(f, "{} = {} is outside valid range ({})", field, value, range)
            }
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

fn check_range<T>(
    field: &str,
    value: T,
    range: &std::ops::RangeInclusive<T>,
    errors: &mut Vec<ConfigValidationError>,
) where
    T: PartialOrd + std::fmt::Display,
{
    if !range.contains(&value) {
        errors.push(ConfigValidationError::OutOfRange {
            field: field.to_string(),
            value: value.to_string(),
            range: format!("{}-{}", range.start(), range.end()),
        });
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every failed check
pub fn validate_config(config: &NimbusConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_sensor(config, &mut errors);
    validate_model(config, &mut errors);
    validate_accelerator(config, &mut errors);
    validate_radio(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_sensor(config: &NimbusConfig, errors: &mut Vec<ConfigValidationError>) {
    let sensor = &config.sensor;
    check_range("sensor.width", sensor.width, &(1..=MAX_SENSOR_DIMENSION), errors);
    check_range("sensor.height", sensor.height, &(1..=MAX_SENSOR_DIMENSION), errors);
    if sensor.clock_hz == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "sensor.clock_hz".to_string(),
            reason: "must be positive".to_string(),
        });
    }
}

fn validate_model(config: &NimbusConfig, errors: &mut Vec<ConfigValidationError>) {
    let (width, height) = config.model.input.input_window();
    if (config.sensor.width, config.sensor.height) != (width, height) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "model.input".to_string(),
            reason: format!(
                "{} needs a {}x{} sensor window, sensor is {}x{}",
                config.model.input, width, height, config.sensor.width, config.sensor.height
            ),
        });
    }

    let labels = &config.model.class_labels;
    if labels.is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "model.class_labels".to_string(),
        });
    }
    for (i, label) in labels.iter().enumerate() {
        if label.trim().is_empty() {
            errors.push(ConfigValidationError::InvalidValue {
                field: format!("model.class_labels[{}]", i),
                reason: "label must not be empty".to_string(),
            });
        }
    }
}

fn validate_accelerator(config: &NimbusConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.accelerator.clock_divider == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "accelerator.clock_divider".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
}

fn validate_radio(config: &NimbusConfig, errors: &mut Vec<ConfigValidationError>) {
    let radio = &config.radio;
    check_range("radio.frequency_hz", radio.frequency_hz, &FREQUENCY_HZ_RANGE, errors);
    check_range(
        "radio.spreading_factor",
        radio.spreading_factor,
        &SPREADING_FACTOR_RANGE,
        errors,
    );
    check_range("radio.tx_power_dbm", radio.tx_power_dbm, &TX_POWER_DBM_RANGE, errors);

    let suffix = radio.payload_suffix.as_bytes();
    if suffix.len() != 3 || !radio.payload_suffix.is_ascii() {
        errors.push(ConfigValidationError::InvalidValue {
            field: "radio.payload_suffix".to_string(),
            reason: format!(
                "must be exactly 3 ASCII characters, got {:?}",
                radio.payload_suffix
            ),
        });
    }
    if radio.max_ack_delay_ms == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "radio.max_ack_delay_ms".to_string(),
            reason: "must be positive".to_string(),
        });
    }
}
