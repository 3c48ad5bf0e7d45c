// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Validated configuration translated into driver-level parameters

use nimbus_config::{
    validate_config, AcceleratorClockSetting, BandwidthSetting, CodingRateSetting, ConfigError,
    DiagnosticsConfig, InputLayout, NimbusConfig, PacketLengthSetting, PixelFormatSetting,
    TransferModeSetting,
};
use nimbus_hal::{
    AcceleratorClock, Bandwidth, CaptureConfig, CodingRate, PacketLength, PixelFormat, TransferMode,
    TxParams,
};

use crate::radio_reporter::RadioTiming;

/// Sensor bring-up parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorSettings {
    pub clock_hz: u32,
    pub capture: CaptureConfig,
    /// Written to sensor register 0x11 after setup
    pub clock_prescaler: Option<u8>,
    pub power_up_delay_ms: u32,
}

/// Everything the controller needs, in HAL types
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSettings {
    pub sensor: SensorSettings,
    pub input_layout: InputLayout,
    pub accelerator_clock: AcceleratorClock,
    pub accelerator_divider: u8,
    pub tx: TxParams,
    pub radio_timing: RadioTiming,
    pub payload_suffix: [u8; 3],
    pub labels: Vec<String>,
    pub diagnostics: DiagnosticsConfig,
}

impl NodeSettings {
    /// Validate `config` and convert it
    pub fn from_config(config: &NimbusConfig) -> Result<Self, ConfigError> {
        validate_config(config)?;

        let suffix = config.radio.payload_suffix.as_bytes();
        let payload_suffix: [u8; 3] = suffix.try_into().map_err(|_| {
            ConfigError::InvalidValue(format!(
                "radio.payload_suffix must be exactly 3 bytes, got {}",
                suffix.len()
            ))
        })?;

        Ok(Self {
            sensor: SensorSettings {
                clock_hz: config.sensor.clock_hz,
                capture: CaptureConfig {
                    width: config.sensor.width,
                    height: config.sensor.height,
                    pixel_format: pixel_format(config.sensor.pixel_format),
                    transfer_mode: transfer_mode(config.sensor.transfer_mode),
                    dma_channel: config.sensor.dma_channel,
                },
                clock_prescaler: config.sensor.clock_prescaler,
                power_up_delay_ms: config.sensor.power_up_delay_ms,
            },
            input_layout: config.model.input,
            accelerator_clock: accelerator_clock(config.accelerator.clock_source),
            accelerator_divider: config.accelerator.clock_divider,
            tx: TxParams {
                frequency_hz: config.radio.frequency_hz,
                bandwidth: bandwidth(config.radio.bandwidth),
                spreading_factor: config.radio.spreading_factor,
                coding_rate: coding_rate(config.radio.coding_rate),
                packet_length: packet_length(config.radio.packet_length),
                sync_word: config.radio.sync_word,
                power_dbm: config.radio.tx_power_dbm,
                ramp_time_us: config.radio.ramp_time_us,
            },
            radio_timing: RadioTiming {
                reset_settle_ms: config.radio.reset_settle_ms,
                tx_timeout_ms: config.radio.tx_timeout_ms,
                max_ack_delay_ms: config.radio.max_ack_delay_ms,
            },
            payload_suffix,
            labels: config.model.class_labels.clone(),
            diagnostics: config.diagnostics.clone(),
        })
    }
}

fn pixel_format(setting: PixelFormatSetting) -> PixelFormat {
    match setting {
        PixelFormatSetting::Rgb888 => PixelFormat::Rgb888,
    }
}

fn transfer_mode(setting: TransferModeSetting) -> TransferMode {
    match setting {
        TransferModeSetting::Dma => TransferMode::Dma,
        TransferModeSetting::Streaming => TransferMode::Streaming,
    }
}

fn accelerator_clock(setting: AcceleratorClockSetting) -> AcceleratorClock {
    match setting {
        AcceleratorClockSetting::Pclk => AcceleratorClock::Pclk,
        AcceleratorClockSetting::Ipo => AcceleratorClock::Ipo,
    }
}

fn bandwidth(setting: BandwidthSetting) -> Bandwidth {
    match setting {
        BandwidthSetting::Khz7_8 => Bandwidth::Khz7_8,
        BandwidthSetting::Khz10_4 => Bandwidth::Khz10_4,
        BandwidthSetting::Khz15_6 => Bandwidth::Khz15_6,
        BandwidthSetting::Khz20_8 => Bandwidth::Khz20_8,
        BandwidthSetting::Khz31_25 => Bandwidth::Khz31_25,
        BandwidthSetting::Khz41_7 => Bandwidth::Khz41_7,
        BandwidthSetting::Khz62_5 => Bandwidth::Khz62_5,
        BandwidthSetting::Khz125 => Bandwidth::Khz125,
        BandwidthSetting::Khz250 => Bandwidth::Khz250,
        BandwidthSetting::Khz500 => Bandwidth::Khz500,
    }
}

fn coding_rate(setting: CodingRateSetting) -> CodingRate {
    match setting {
        CodingRateSetting::Cr4_5 => CodingRate::Cr4_5,
        CodingRateSetting::Cr4_6 => CodingRate::Cr4_6,
        CodingRateSetting::Cr4_7 => CodingRate::Cr4_7,
        CodingRateSetting::Cr4_8 => CodingRate::Cr4_8,
    }
}

fn packet_length(setting: PacketLengthSetting) -> PacketLength {
    match setting {
        PacketLengthSetting::Variable => PacketLength::Variable,
        PacketLengthSetting::Fixed => PacketLength::Fixed,
    }
}
