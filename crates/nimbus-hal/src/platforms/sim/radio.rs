// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use super::gpio::{PinLevels, SimPin};
use super::trace::{TraceEvent, TraceRecorder};
use super::SimError;
use crate::hal::{LoraRadio, RadioStatus, TxParams};

/// What the simulated transceiver has been asked to do
#[derive(Debug, Clone, Default)]
pub struct RadioLog {
    pub params: Option<TxParams>,
    pub packets: Vec<Vec<u8>>,
    pub status_polls: u32,
}

/// LoRa transceiver. Powered only while the reset line is high.
pub struct SimRadio {
    pins: PinLevels,
    trace: TraceRecorder,
    log: Arc<Mutex<RadioLog>>,
    /// Status polls after a send before TX-done is reported; `None` never
    ack_after_polls: Option<u32>,
    initialized: bool,
    polls_since_send: Option<u32>,
}

impl SimRadio {
    pub(crate) fn new(
        pins: PinLevels,
        trace: TraceRecorder,
        log: Arc<Mutex<RadioLog>>,
        ack_after_polls: Option<u32>,
    ) -> Self {
        Self {
            pins,
            trace,
            log,
            ack_after_polls,
            initialized: false,
            polls_since_send: None,
        }
    }

    fn powered(&self) -> Result<(), SimError> {
        if self.pins.lock()[SimPin::RadioReset as usize] {
            Ok(())
        } else {
            Err(SimError::PoweredDown("radio"))
        }
    }
}

impl LoraRadio for SimRadio {
    type Error = SimError;

    fn init(&mut self) -> Result<(), SimError> {
        self.powered()?;
        self.initialized = true;
        self.log.lock().params = None;
        self.trace.record(TraceEvent::RadioInit);
        Ok(())
    }

    fn set_tx(&mut self, params: &TxParams) -> Result<(), SimError> {
        self.powered()?;
        if !self.initialized {
            return Err(SimError::NotInitialized("radio"));
        }
        self.log.lock().params = Some(*params);
        self.trace.record(TraceEvent::RadioConfigured);
        Ok(())
    }

    fn send_payload(&mut self, payload: &[u8], timeout_ms: u32) -> Result<(), SimError> {
        self.powered()?;
        if self.log.lock().params.is_none() {
            return Err(SimError::NotInitialized("radio tx parameters"));
        }
        debug!(target: "nimbus-hal", "[SIM] radio send {:02X?} (timeout {} ms)", payload, timeout_ms);
        self.log.lock().packets.push(payload.to_vec());
        self.trace.record(TraceEvent::RadioSent(payload.to_vec()));
        self.polls_since_send = Some(0);
        Ok(())
    }

    fn status(&mut self) -> Result<RadioStatus, SimError> {
        self.powered()?;
        self.log.lock().status_polls += 1;
        let tx_done = match (self.polls_since_send.as_mut(), self.ack_after_polls) {
            (Some(polls), Some(limit)) => {
                *polls += 1;
                *polls >= limit
            }
            _ => false,
        };
        Ok(RadioStatus {
            raw: if tx_done { 0x01 } else { 0x00 },
            tx_done,
            tx_timeout: false,
        })
    }

    fn is_busy(&self) -> bool {
        false
    }
}

/// Read-only view of [`RadioLog`] for tests
#[derive(Debug, Clone)]
pub struct RadioMonitor {
    log: Arc<Mutex<RadioLog>>,
}

impl RadioMonitor {
    pub(crate) fn new(log: Arc<Mutex<RadioLog>>) -> Self {
        Self { log }
    }

    pub fn snapshot(&self) -> RadioLog {
        self.log.lock().clone()
    }
}
