// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use core::fmt;

/// Duty-cycle controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CycleState {
    Init,
    Capturing,
    Extracting,
    Inferring,
    Classifying,
    Transmitting,
    Sleeping,
}

impl CycleState {
    /// The states one full cycle passes through, in order
    pub const CYCLE: [CycleState; 6] = [
        CycleState::Capturing,
        CycleState::Extracting,
        CycleState::Inferring,
        CycleState::Classifying,
        CycleState::Transmitting,
        CycleState::Sleeping,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CycleState::Init => "INIT",
            CycleState::Capturing => "CAPTURING",
            CycleState::Extracting => "EXTRACTING",
            CycleState::Inferring => "INFERRING",
            CycleState::Classifying => "CLASSIFYING",
            CycleState::Transmitting => "TRANSMITTING",
            CycleState::Sleeping => "SLEEPING",
        }
    }

    /// Successor in the cycle. There is no terminal state.
    pub fn next(self) -> CycleState {
        match self {
            CycleState::Init => CycleState::Capturing,
            CycleState::Capturing => CycleState::Extracting,
            CycleState::Extracting => CycleState::Inferring,
            CycleState::Inferring => CycleState::Classifying,
            CycleState::Classifying => CycleState::Transmitting,
            CycleState::Transmitting => CycleState::Sleeping,
            CycleState::Sleeping => CycleState::Capturing,
        }
    }
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Hook called on every state entry
pub trait CycleObserver {
    fn on_state(&mut self, state: CycleState);
}

impl<F: FnMut(CycleState)> CycleObserver for F {
    fn on_state(&mut self, state: CycleState) {
        self(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_wraps_without_terminal_state() {
        let mut state = CycleState::Init;
        let mut seen = Vec::new();
        for _ in 0..13 {
            state = state.next();
            seen.push(state);
        }
        assert_eq!(&seen[..6], &CycleState::CYCLE);
        assert_eq!(&seen[6..12], &CycleState::CYCLE);
        assert_eq!(seen[12], CycleState::Capturing);
    }

    #[test]
    fn test_names() {
        assert_eq!(CycleState::Transmitting.to_string(), "TRANSMITTING");
        assert_eq!(CycleState::Init.name(), "INIT");
    }
}
