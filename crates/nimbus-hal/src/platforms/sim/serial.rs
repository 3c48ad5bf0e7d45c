// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;

use super::SimError;
use crate::hal::SerialIO;

/// Console that captures everything written; optionally mirrors to stdout
pub struct SimSerial {
    buffer: Arc<Mutex<Vec<u8>>>,
    echo: bool,
}

impl SimSerial {
    pub(crate) fn new(buffer: Arc<Mutex<Vec<u8>>>, echo: bool) -> Self {
        Self { buffer, echo }
    }
}

impl SerialIO for SimSerial {
    type Error = SimError;

    fn write(&mut self, data: &[u8]) -> Result<usize, SimError> {
        self.buffer.lock().extend_from_slice(data);
        if self.echo {
            std::io::stdout().write_all(data)?;
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), SimError> {
        if self.echo {
            std::io::stdout().flush()?;
        }
        Ok(())
    }
}

/// Everything written to the simulated console
#[derive(Debug, Clone)]
pub struct SerialCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl SerialCapture {
    pub(crate) fn new(buffer: Arc<Mutex<Vec<u8>>>) -> Self {
        Self { buffer }
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}
