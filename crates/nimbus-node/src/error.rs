// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Node error types

use nimbus_neural::NeuralError;
use thiserror::Error;

/// Type-erased driver error
pub type DriverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that stop the node.
///
/// Every variant returned from the controller is a fault: the caller lights
/// the fault indicator and halts. Radio and diagnostic-console failures are
/// not in this list; the cycle logs them and carries on.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("sensor setup failed: {0}")]
    SensorSetup(#[source] DriverError),

    #[error("sensor power switch failed: {0}")]
    SensorPower(#[source] DriverError),

    #[error("streaming capture overflowed ({count} events)")]
    StreamingOverflow { count: u32 },

    #[error("accelerator bring-up failed: {0}")]
    Accelerator(#[source] DriverError),

    #[error("model mismatch: {0}")]
    ModelMismatch(String),

    #[error("input geometry check failed: {0}")]
    Geometry(#[from] NeuralError),
}

impl NodeError {
    pub(crate) fn sensor_setup<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        NodeError::SensorSetup(Box::new(err))
    }

    pub(crate) fn sensor_power<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        NodeError::SensorPower(Box::new(err))
    }

    pub(crate) fn accelerator<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        NodeError::Accelerator(Box::new(err))
    }
}

/// Non-fatal radio failure. Logged, then the cycle continues.
#[derive(Debug, Error)]
pub enum RadioError {
    #[error("radio reset line: {0}")]
    ResetLine(#[source] DriverError),

    #[error("radio driver: {0}")]
    Driver(#[source] DriverError),
}

/// Result type for node operations
pub type Result<T> = std::result::Result<T, NodeError>;
