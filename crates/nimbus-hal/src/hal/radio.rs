// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use core::fmt;

/// LoRa channel bandwidth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bandwidth {
    Khz7_8,
    Khz10_4,
    Khz15_6,
    Khz20_8,
    Khz31_25,
    Khz41_7,
    Khz62_5,
    Khz125,
    Khz250,
    Khz500,
}

impl Bandwidth {
    pub fn hz(self) -> u32 {
        match self {
            Bandwidth::Khz7_8 => 7_810,
            Bandwidth::Khz10_4 => 10_420,
            Bandwidth::Khz15_6 => 15_630,
            Bandwidth::Khz20_8 => 20_830,
            Bandwidth::Khz31_25 => 31_250,
            Bandwidth::Khz41_7 => 41_670,
            Bandwidth::Khz62_5 => 62_500,
            Bandwidth::Khz125 => 125_000,
            Bandwidth::Khz250 => 250_000,
            Bandwidth::Khz500 => 500_000,
        }
    }
}

/// Forward error correction rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodingRate {
    Cr4_5,
    Cr4_6,
    Cr4_7,
    Cr4_8,
}

impl fmt::Display for CodingRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let denominator = match self {
            CodingRate::Cr4_5 => 5,
            CodingRate::Cr4_6 => 6,
            CodingRate::Cr4_7 => 7,
            CodingRate::Cr4_8 => 8,
        };
        write!(f, "4/{}", denominator)
    }
}

/// LoRa header mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketLength {
    /// Explicit header carrying the payload length
    Variable,
    /// Implicit header; both ends agree on the length
    Fixed,
}

/// Transmit configuration, applied once after every radio reset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxParams {
    pub frequency_hz: u32,
    pub bandwidth: Bandwidth,
    pub spreading_factor: u8,
    pub coding_rate: CodingRate,
    pub packet_length: PacketLength,
    pub sync_word: u8,
    pub power_dbm: i8,
    pub ramp_time_us: u16,
}

/// Snapshot of the radio's status register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RadioStatus {
    /// Raw status byte as reported by the chip
    pub raw: u8,
    /// Transmission finished (TX-done interrupt flag)
    pub tx_done: bool,
    /// Transmission aborted by the chip's own timeout
    pub tx_timeout: bool,
}

/// LoRa transceiver driver
///
/// The reset line is an ordinary GPIO owned by the caller.
pub trait LoraRadio {
    /// Platform-specific error type
    type Error: std::error::Error + Send + Sync + 'static;

    /// Initialise the transceiver after reset
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Apply transmit parameters
    fn set_tx(&mut self, params: &TxParams) -> Result<(), Self::Error>;

    /// Queue `payload` for transmission. `timeout_ms == 0` uses the chip
    /// default. Returns once the chip has accepted the packet.
    fn send_payload(&mut self, payload: &[u8], timeout_ms: u32) -> Result<(), Self::Error>;

    /// Read the status register
    fn status(&mut self) -> Result<RadioStatus, Self::Error>;

    /// State of the chip's BUSY line
    fn is_busy(&self) -> bool;
}
