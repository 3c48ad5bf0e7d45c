// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `nimbus_configuration.toml`. Every section and field is optional in the
//! file; missing values take the defaults below.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NimbusConfig {
    pub sensor: SensorConfig,
    pub model: ModelConfig,
    pub accelerator: AcceleratorConfig,
    pub radio: RadioConfig,
    pub diagnostics: DiagnosticsConfig,
    pub logging: LoggingConfig,
}

/// Defines a string-backed setting enum with serde names, `FromStr` and
/// `Display` kept in one place.
macro_rules! setting_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!(
                        "'{}' is not one of: {}",
                        other,
                        [$($text),+].join(", ")
                    )),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

setting_enum! {
    /// Sensor pixel format
    PixelFormatSetting { Rgb888 => "rgb888" }
}

setting_enum! {
    /// Sensor → memory transfer path
    TransferModeSetting {
        Dma => "dma",
        /// Line streaming with overflow accounting
        Streaming => "streaming",
    }
}

setting_enum! {
    /// Accelerator input layout the loaded model was trained with
    InputLayout {
        /// Signed 8-bit luma, one channel
        Luma => "luma",
        /// Biased `0x00BBGGRR` word per pixel
        PackedRgb => "packed_rgb",
    }
}

impl InputLayout {
    /// Sensor window (width, height) the network for this layout expects
    pub const fn input_window(self) -> (u32, u32) {
        match self {
            InputLayout::Luma => (32, 32),
            InputLayout::PackedRgb => (128, 128),
        }
    }
}

setting_enum! {
    /// Accelerator clock source
    AcceleratorClockSetting {
        Pclk => "pclk",
        Ipo => "ipo",
    }
}

setting_enum! {
    /// LoRa bandwidth
    BandwidthSetting {
        Khz7_8 => "7.8k",
        Khz10_4 => "10.4k",
        Khz15_6 => "15.6k",
        Khz20_8 => "20.8k",
        Khz31_25 => "31.25k",
        Khz41_7 => "41.7k",
        Khz62_5 => "62.5k",
        Khz125 => "125k",
        Khz250 => "250k",
        Khz500 => "500k",
    }
}

setting_enum! {
    /// LoRa coding rate
    CodingRateSetting {
        Cr4_5 => "4/5",
        Cr4_6 => "4/6",
        Cr4_7 => "4/7",
        Cr4_8 => "4/8",
    }
}

setting_enum! {
    /// LoRa header mode
    PacketLengthSetting {
        Variable => "variable",
        Fixed => "fixed",
    }
}

setting_enum! {
    /// What the diagnostic console prints for the winning class
    ReportMode {
        Index => "index",
        Label => "label",
    }
}

setting_enum! {
    /// Console log line format
    LogFormat {
        Text => "text",
        Json => "json",
    }
}

/// Image sensor configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Sensor interface clock
    pub clock_hz: u32,
    pub width: u32,
    pub height: u32,
    pub pixel_format: PixelFormatSetting,
    pub transfer_mode: TransferModeSetting,
    pub dma_channel: u8,
    /// Value for the sensor clock prescaler register (0x11), written after
    /// setup. Slowing the pixel clock avoids streaming overflows.
    pub clock_prescaler: Option<u8>,
    /// Settle time after sensor setup before the first capture
    pub power_up_delay_ms: u32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            clock_hz: 10_000_000,
            width: 32,
            height: 32,
            pixel_format: PixelFormatSetting::Rgb888,
            transfer_mode: TransferModeSetting::Dma,
            dma_channel: 0,
            clock_prescaler: None,
            power_up_delay_ms: 200,
        }
    }
}

/// Model input layout and class naming
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    pub input: InputLayout,
    /// One label per output class, in class-index order
    pub class_labels: Vec<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            input: InputLayout::Luma,
            class_labels: ["cirrus", "cumulus", "nimbostratus", "stratus"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Accelerator clocking
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AcceleratorConfig {
    pub clock_source: AcceleratorClockSetting,
    pub clock_divider: u8,
}

impl Default for AcceleratorConfig {
    fn default() -> Self {
        Self {
            clock_source: AcceleratorClockSetting::Pclk,
            clock_divider: 1,
        }
    }
}

/// LoRa transmit configuration and reset sequencing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RadioConfig {
    pub frequency_hz: u32,
    pub bandwidth: BandwidthSetting,
    pub spreading_factor: u8,
    pub coding_rate: CodingRateSetting,
    pub packet_length: PacketLengthSetting,
    pub sync_word: u8,
    pub tx_power_dbm: i8,
    pub ramp_time_us: u16,
    /// Wait after asserting the reset line before talking to the chip
    pub reset_settle_ms: u32,
    /// Chip-side transmit timeout, 0 = driver default
    pub tx_timeout_ms: u32,
    /// Upper bound on waiting for TX-done before moving on
    pub max_ack_delay_ms: u32,
    /// Three ASCII bytes appended to the class digit
    pub payload_suffix: String,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 868_000_000,
            bandwidth: BandwidthSetting::Khz500,
            spreading_factor: 7,
            coding_rate: CodingRateSetting::Cr4_5,
            packet_length: PacketLengthSetting::Variable,
            sync_word: 0x04,
            tx_power_dbm: 14,
            ramp_time_us: 200,
            reset_settle_ms: 1,
            tx_timeout_ms: 0,
            max_ack_delay_ms: 10,
            payload_suffix: "ING".to_string(),
        }
    }
}

/// Serial console output per cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    pub report: ReportMode,
    /// Print every class with its confidence
    pub print_scores: bool,
    /// Hex-dump the feature tensor as grayscale after the class line
    pub dump_features: bool,
}

impl Default for ReportMode {
    fn default() -> Self {
        ReportMode::Index
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}
