// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/// CPU low-power waits
///
/// Both calls are the only places the node's single thread of control
/// suspends. Neither has a timeout.
pub trait PowerManager {
    /// Sleep until any interrupt fires (WFI).
    ///
    /// Returns immediately if an interrupt arrived since the previous call,
    /// so a flag set by an interrupt handler between the caller's check and
    /// this call is never missed.
    fn wait_for_interrupt(&self);

    /// Enter the low-power sleep state until a falling edge on the wake line.
    ///
    /// Edges that arrived while awake are latched and consumed one per call.
    fn sleep_until_wake(&self);
}
