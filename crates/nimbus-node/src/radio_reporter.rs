// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! LoRa reporting
//!
//! One report per cycle: raise the radio reset line, let it settle,
//! initialise and configure the transceiver, send the four-byte payload,
//! poll for the transmit acknowledgement for a bounded time, then drop the
//! reset line again. The radio is configured from scratch every time since
//! it loses state while held in reset.

use nimbus_hal::{GpioProvider, LoraRadio, RadioStatus, TimeProvider, TxParams};
use tracing::{debug, info, warn};

use crate::error::RadioError;

/// Bytes on the air per report
pub const PAYLOAD_LEN: usize = 4;

/// Report payload: ASCII class digit followed by a fixed three-byte suffix
///
/// # Example
/// ```
/// use nimbus_node::RadioPayload;
///
/// assert_eq!(RadioPayload::new(3, *b"ING").as_bytes(), b"3ING");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadioPayload([u8; PAYLOAD_LEN]);

impl RadioPayload {
    pub fn new(class_index: usize, suffix: [u8; 3]) -> Self {
        let digit = b'0'.wrapping_add(class_index as u8);
        Self([digit, suffix[0], suffix[1], suffix[2]])
    }

    pub fn as_bytes(&self) -> &[u8; PAYLOAD_LEN] {
        &self.0
    }
}

/// Timing around one transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadioTiming {
    /// Wait after raising the reset line
    pub reset_settle_ms: u32,
    /// Passed to the driver's send; 0 lets the driver pick
    pub tx_timeout_ms: u32,
    /// Longest wait for TX-done before moving on
    pub max_ack_delay_ms: u32,
}

/// How a send ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxOutcome {
    /// The radio reported TX-done after `waited_ms`
    Acknowledged { status: RadioStatus, waited_ms: u32 },
    /// No TX-done within the ack window, or the chip reported a TX timeout;
    /// the last status read is kept
    Unacknowledged { status: Option<RadioStatus> },
}

/// LoRa transceiver and the GPIO line that holds it in reset
pub struct RadioReporter<R: LoraRadio, P> {
    radio: R,
    reset_pin: P,
    params: TxParams,
    timing: RadioTiming,
}

impl<R: LoraRadio, P: Copy> RadioReporter<R, P> {
    pub fn new(radio: R, reset_pin: P, params: TxParams, timing: RadioTiming) -> Self {
        Self {
            radio,
            reset_pin,
            params,
            timing,
        }
    }

    pub fn params(&self) -> &TxParams {
        &self.params
    }

    /// Release the radio from reset and wait for it to settle
    pub fn reset<G, T>(&mut self, gpio: &mut G, time: &T) -> Result<(), RadioError>
    where
        G: GpioProvider<Pin = P>,
        T: TimeProvider,
    {
        gpio.set_high(self.reset_pin)
            .map_err(|e| RadioError::ResetLine(Box::new(e)))?;
        time.delay_ms(self.timing.reset_settle_ms);
        Ok(())
    }

    /// Initialise the transceiver and apply the transmit parameters
    pub fn configure(&mut self) -> Result<(), RadioError> {
        self.radio.init().map_err(driver)?;
        self.radio.set_tx(&self.params).map_err(driver)?;
        Ok(())
    }

    /// Send `payload` and poll for TX-done, at most `max_ack_delay_ms`.
    /// A TX-timeout status ends the wait early.
    pub fn send<T: TimeProvider>(
        &mut self,
        payload: &RadioPayload,
        time: &T,
    ) -> Result<TxOutcome, RadioError> {
        self.radio
            .send_payload(payload.as_bytes(), self.timing.tx_timeout_ms)
            .map_err(driver)?;

        let mut last = None;
        for waited_ms in 0..=self.timing.max_ack_delay_ms {
            if !self.radio.is_busy() {
                let status = self.radio.status().map_err(driver)?;
                if status.tx_done {
                    return Ok(TxOutcome::Acknowledged { status, waited_ms });
                }
                if status.tx_timeout {
                    return Ok(TxOutcome::Unacknowledged { status: Some(status) });
                }
                last = Some(status);
            }
            if waited_ms < self.timing.max_ack_delay_ms {
                time.delay_ms(1);
            }
        }
        Ok(TxOutcome::Unacknowledged { status: last })
    }

    /// Put the radio back into reset
    pub fn release<G>(&mut self, gpio: &mut G) -> Result<(), RadioError>
    where
        G: GpioProvider<Pin = P>,
    {
        gpio.set_low(self.reset_pin)
            .map_err(|e| RadioError::ResetLine(Box::new(e)))
    }

    /// Full report sequence. The reset line is always dropped afterwards,
    /// whatever happened in between.
    pub fn report<G, T>(
        &mut self,
        gpio: &mut G,
        time: &T,
        payload: &RadioPayload,
    ) -> Result<TxOutcome, RadioError>
    where
        G: GpioProvider<Pin = P>,
        T: TimeProvider,
    {
        let outcome = self
            .reset(gpio, time)
            .and_then(|()| self.configure())
            .and_then(|()| self.send(payload, time));

        match &outcome {
            Ok(TxOutcome::Acknowledged { status, waited_ms }) => {
                info!(
                    target: "nimbus-node",
                    "sent {:?} (status 0x{:02X}, ack after {} ms)",
                    String::from_utf8_lossy(payload.as_bytes()),
                    status.raw,
                    waited_ms
                );
            }
            Ok(TxOutcome::Unacknowledged { status }) => {
                warn!(
                    target: "nimbus-node",
                    "no TX-done within {} ms (last status {:?}), continuing",
                    self.timing.max_ack_delay_ms,
                    status.map(|s| s.raw)
                );
            }
            Err(e) => debug!(target: "nimbus-node", "report aborted: {}", e),
        }

        let released = self.release(gpio);
        let outcome = outcome?;
        released?;
        Ok(outcome)
    }
}

fn driver<E>(err: E) -> RadioError
where
    E: std::error::Error + Send + Sync + 'static,
{
    RadioError::Driver(Box::new(err))
}
