// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Shared setup for node integration tests

#![allow(dead_code)]

use nimbus_config::NimbusConfig;
use nimbus_hal::sim::{SimBoard, SimConfig, SimHandles, TraceEvent};
use nimbus_node::{CycleState, DutyCycleController, NodeSettings};

/// Solid gray 32x32 RGB888 frame
pub fn gray_frame(level: u8) -> Vec<u8> {
    vec![level; 32 * 32 * 3]
}

pub fn settings(config: &NimbusConfig) -> NodeSettings {
    NodeSettings::from_config(config).expect("default-derived config should validate")
}

/// Node on a fresh simulated board, with every state entry pushed to the
/// board trace as a marker
pub fn traced_node(
    sim: SimConfig,
    config: &NimbusConfig,
) -> (DutyCycleController<SimBoard>, SimHandles) {
    let (peripherals, handles) = SimBoard::build(sim);
    let mut node = DutyCycleController::new(peripherals, settings(config));
    let trace = handles.trace.clone();
    node.set_observer(move |state: CycleState| trace.marker(state.name()));
    (node, handles)
}

/// Trace split into one slice per cycle, each starting at its CAPTURING
/// marker. Events before the first cycle are dropped.
pub fn cycles(events: &[TraceEvent]) -> Vec<&[TraceEvent]> {
    let starts: Vec<usize> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| **e == TraceEvent::Marker("CAPTURING"))
        .map(|(i, _)| i)
        .collect();
    starts
        .iter()
        .enumerate()
        .map(|(n, &start)| {
            let end = starts.get(n + 1).copied().unwrap_or(events.len());
            &events[start..end]
        })
        .collect()
}

/// Position of the first event matching `pred`
pub fn position(events: &[TraceEvent], pred: impl Fn(&TraceEvent) -> bool) -> usize {
    events
        .iter()
        .position(pred)
        .unwrap_or_else(|| panic!("event missing from cycle trace: {:?}", events))
}
