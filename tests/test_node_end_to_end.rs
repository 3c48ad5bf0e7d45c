// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file → PNG frames → simulated node → radio and console

use std::fs;

use image::{Rgb, RgbImage};
use nimbus::config::{load_config, ConfigError};
use nimbus::hal::sim::{SimBoard, SimConfig, SimModel, TraceEvent};
use nimbus::node::{frames, input_geometry, DutyCycleController, NodeSettings, NUM_CLASSES};

const PACKED_CONFIG: &str = r#"
[sensor]
width = 128
height = 128
power_up_delay_ms = 5

[model]
input = "packed_rgb"

[radio]
payload_suffix = "CLD"

[diagnostics]
report = "label"
print_scores = true
"#;

#[test]
fn test_packed_rgb_node_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("nimbus_configuration.toml");
    fs::write(&config_path, PACKED_CONFIG).unwrap();

    let frame_dir = dir.path().join("frames");
    fs::create_dir(&frame_dir).unwrap();
    RgbImage::from_pixel(64, 64, Rgb([20, 20, 20]))
        .save(frame_dir.join("000_dark.png"))
        .unwrap();
    RgbImage::from_pixel(64, 64, Rgb([230, 230, 230]))
        .save(frame_dir.join("001_bright.png"))
        .unwrap();

    let config = load_config(Some(&config_path), None).unwrap();
    let settings = NodeSettings::from_config(&config).unwrap();
    let geometry = input_geometry(settings.input_layout);
    assert_eq!((geometry.width, geometry.height), (128, 128));

    let loaded = frames::load_frames(&frame_dir, 128, 128).unwrap();
    let (peripherals, handles) = SimBoard::build(SimConfig {
        frames: loaded,
        model: SimModel::brightness(geometry, NUM_CLASSES),
        ..SimConfig::default()
    });
    handles.wake.fire_n(2);

    let mut node = DutyCycleController::new(peripherals, settings);
    let results = node.run_cycles(2).unwrap();
    let classes: Vec<usize> = results.iter().map(|r| r.class_index).collect();
    assert_eq!(classes, vec![0, 3]);

    assert_eq!(
        handles.radio.snapshot().packets,
        vec![b"0CLD".to_vec(), b"3CLD".to_vec()]
    );
    assert!(handles
        .trace
        .snapshot()
        .contains(&TraceEvent::AcceleratorStart { words: 128 * 128 }));

    // Four score lines then the label, per cycle
    let lines = handles.serial.lines();
    assert_eq!(lines.len(), 2 * (NUM_CLASSES + 1));
    assert_eq!(lines[0], "[ 131072] -> Class 0 cirrus: 98.8%");
    assert_eq!(lines[1], "[      0] -> Class 1 cumulus: 0.4%");
    assert_eq!(lines[2], "[      0] -> Class 2 nimbostratus: 0.4%");
    assert_eq!(lines[3], "[      0] -> Class 3 stratus: 0.4%");
    assert_eq!(lines[4], "cirrus");
    assert_eq!(lines[9], "stratus");
}

#[test]
fn test_geometry_mismatch_is_caught_at_init() {
    let (_dir, config_path) = write_config("");
    let config = load_config(Some(&config_path), None).unwrap();
    let mut settings = NodeSettings::from_config(&config).unwrap();
    // Luma model with a packed-size window
    settings.sensor.capture.width = 128;
    settings.sensor.capture.height = 128;
    let (peripherals, handles) = SimBoard::build(SimConfig::default());
    handles.wake.fire();

    let mut node = DutyCycleController::new(peripherals, settings);
    let fault = node.run_cycles(1).unwrap_err();
    assert!(matches!(fault, nimbus::node::NodeError::ModelMismatch(_)));
    assert!(handles.radio.snapshot().packets.is_empty());
}

#[test]
fn test_window_layout_mismatch_rejected_by_settings() {
    let (_dir, config_path) = write_config("[sensor]\nwidth = 128\nheight = 128\n");
    let config = load_config(Some(&config_path), None).unwrap();
    let err = NodeSettings::from_config(&config).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(msg) if msg.contains("model.input")));
}

fn write_config(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("nimbus_configuration.toml");
    fs::write(&config_path, contents).unwrap();
    (dir, config_path)
}
