// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! End-to-end duty cycles on the simulated board

mod common;

use common::{cycles, gray_frame, position, traced_node};
use nimbus_config::{NimbusConfig, ReportMode, TransferModeSetting};
use nimbus_hal::sim::{CameraBehavior, SimConfig, SimPin, TraceEvent};
use nimbus_node::{CycleState, NodeError};

#[test]
fn test_n_wakes_give_n_ordered_cycles() {
    let (mut node, handles) = traced_node(SimConfig::default(), &NimbusConfig::default());
    handles.wake.fire_n(3);

    let results = node.run_cycles(3).unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(node.cycles(), 3);
    assert_eq!(node.state(), CycleState::Sleeping);

    let mut expected = vec![CycleState::Init.name()];
    for _ in 0..3 {
        expected.extend(CycleState::CYCLE.iter().map(|s| s.name()));
    }
    assert_eq!(handles.trace.markers(), expected);

    let wakes = handles
        .trace
        .snapshot()
        .iter()
        .filter(|e| **e == TraceEvent::Wake)
        .count();
    assert_eq!(wakes, 3);
}

#[test]
fn test_sensor_is_off_before_accelerator_input() {
    let (mut node, handles) = traced_node(SimConfig::default(), &NimbusConfig::default());
    handles.wake.fire_n(2);
    node.run_cycles(2).unwrap();

    let events = handles.trace.snapshot();
    let per_cycle = cycles(&events);
    assert_eq!(per_cycle.len(), 2);
    for cycle in per_cycle {
        let off = position(cycle, |e| *e == TraceEvent::CameraPower(false));
        let input = position(cycle, |e| *e == TraceEvent::AcceleratorInputBegin);
        assert!(off < input, "sensor still powered during accelerator load");
        assert!(!cycle[off..input]
            .iter()
            .any(|e| *e == TraceEvent::CameraPower(true)));
    }
}

#[test]
fn test_completion_precedes_unload() {
    let (mut node, handles) = traced_node(SimConfig::default(), &NimbusConfig::default());
    handles.wake.fire_n(2);
    node.run_cycles(2).unwrap();

    let events = handles.trace.snapshot();
    for cycle in cycles(&events) {
        let start = position(cycle, |e| matches!(e, TraceEvent::AcceleratorStart { .. }));
        let complete = position(cycle, |e| *e == TraceEvent::AcceleratorComplete);
        let classifying = position(cycle, |e| *e == TraceEvent::Marker("CLASSIFYING"));
        let unload = position(cycle, |e| matches!(e, TraceEvent::AcceleratorUnload { .. }));

        assert!(start < complete);
        assert!(complete < classifying);
        assert!(classifying < unload);
        assert_eq!(cycle[unload], TraceEvent::AcceleratorUnload { completed: true });
        assert_eq!(cycle[start], TraceEvent::AcceleratorStart { words: 256 });
    }
}

#[test]
fn test_one_transmission_per_cycle_while_awake() {
    let (mut node, handles) = traced_node(SimConfig::default(), &NimbusConfig::default());
    handles.wake.fire_n(2);
    node.run_cycles(2).unwrap();

    let events = handles.trace.snapshot();
    for cycle in cycles(&events) {
        let transmitting = position(cycle, |e| *e == TraceEvent::Marker("TRANSMITTING"));
        let sent = position(cycle, |e| matches!(e, TraceEvent::RadioSent(_)));
        let sleeping = position(cycle, |e| *e == TraceEvent::Marker("SLEEPING"));
        let wake = position(cycle, |e| *e == TraceEvent::Wake);
        assert!(transmitting < sent && sent < sleeping && sleeping < wake);
        assert_eq!(
            cycle
                .iter()
                .filter(|e| matches!(e, TraceEvent::RadioSent(_)))
                .count(),
            1
        );
    }
    assert!(!handles.pins.is_high(SimPin::RadioReset));
}

#[test]
fn test_payload_follows_brightness_class() {
    let sim = SimConfig {
        frames: vec![gray_frame(0), gray_frame(100), gray_frame(160), gray_frame(255)],
        ..SimConfig::default()
    };
    let (mut node, handles) = traced_node(sim, &NimbusConfig::default());
    handles.wake.fire_n(4);

    let classes: Vec<usize> = node
        .run_cycles(4)
        .unwrap()
        .iter()
        .map(|r| r.class_index)
        .collect();
    assert_eq!(classes, vec![0, 1, 2, 3]);

    let packets = handles.radio.snapshot().packets;
    assert_eq!(
        packets,
        vec![
            b"0ING".to_vec(),
            b"1ING".to_vec(),
            b"2ING".to_vec(),
            b"3ING".to_vec()
        ]
    );
    assert_eq!(handles.serial.lines(), vec!["0", "1", "2", "3"]);
}

#[test]
fn test_missing_ack_does_not_stop_the_node() {
    let sim = SimConfig {
        radio_ack_after_polls: None,
        ..SimConfig::default()
    };
    let (mut node, handles) = traced_node(sim, &NimbusConfig::default());
    handles.wake.fire_n(2);

    assert_eq!(node.run_cycles(2).unwrap().len(), 2);
    assert_eq!(handles.radio.snapshot().packets.len(), 2);
    assert!(!handles.pins.is_high(SimPin::RadioReset));
    assert!(!handles.pins.is_high(SimPin::FaultLed));
}

#[test]
fn test_sensor_setup_failure_is_fatal() {
    let sim = SimConfig {
        camera: CameraBehavior {
            fail_setup: true,
            ..SimConfig::default().camera
        },
        ..SimConfig::default()
    };
    let (mut node, handles) = traced_node(sim, &NimbusConfig::default());
    handles.wake.fire();

    let fault = node.run_cycles(1).unwrap_err();
    assert!(matches!(fault, NodeError::SensorSetup(_)));
    assert_eq!(node.cycles(), 0);

    node.signal_fault(&fault);
    assert!(handles.pins.is_high(SimPin::FaultLed));
    assert!(!handles
        .trace
        .snapshot()
        .contains(&TraceEvent::AcceleratorInputBegin));
}

#[test]
fn test_streaming_overflow_stops_the_cycle() {
    let mut config = NimbusConfig::default();
    config.sensor.transfer_mode = TransferModeSetting::Streaming;
    let sim = SimConfig {
        camera: CameraBehavior {
            overflow_on_capture: Some(2),
            ..SimConfig::default().camera
        },
        ..SimConfig::default()
    };
    let (mut node, handles) = traced_node(sim, &config);
    handles.wake.fire_n(2);

    let fault = node.run_cycles(2).unwrap_err();
    assert!(matches!(fault, NodeError::StreamingOverflow { count: 1 }));
    assert_eq!(node.cycles(), 1);
    assert_eq!(node.state(), CycleState::Capturing);
    assert_eq!(handles.radio.snapshot().packets.len(), 1);
}

#[test]
fn test_feature_dump_framing() {
    let mut config = NimbusConfig::default();
    config.diagnostics.dump_features = true;
    config.diagnostics.report = ReportMode::Label;
    let sim = SimConfig {
        frames: vec![gray_frame(160)],
        ..SimConfig::default()
    };
    let (mut node, handles) = traced_node(sim, &config);
    handles.wake.fire();
    node.run_cycles(1).unwrap();

    let lines = handles.serial.lines();
    // Start, label, 1024 values at 16 per line, end
    assert_eq!(lines.len(), 1 + 1 + 64 + 1);
    assert_eq!(lines[0], "Start");
    assert_eq!(lines[1], "nimbostratus");
    assert!(lines[2].starts_with("9D, 9D, "));
    assert!(lines[2].ends_with(", "));
    assert_eq!(lines[65], vec!["9D"; 16].join(", "));
    assert_eq!(lines[66], "Create New File");
}
