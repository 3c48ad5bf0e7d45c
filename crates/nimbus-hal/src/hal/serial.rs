// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/// Line-oriented diagnostic console (UART on hardware)
pub trait SerialIO {
    /// Platform-specific error type
    type Error: std::error::Error + Send + Sync + 'static;

    /// Write bytes, returning how many were accepted
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Flush output buffer
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Write all of `data`, retrying short writes
    fn write_all(&mut self, mut data: &[u8]) -> Result<(), Self::Error> {
        while !data.is_empty() {
            let n = self.write(data)?;
            data = &data[n.min(data.len())..];
            if n == 0 {
                break;
            }
        }
        Ok(())
    }

    /// Write `line` followed by `\r\n`
    fn write_line(&mut self, line: &str) -> Result<(), Self::Error> {
        self.write_all(line.as_bytes())?;
        self.write_all(b"\r\n")
    }
}
