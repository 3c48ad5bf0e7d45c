// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Nimbus node on the simulated board
//!
//! Runs the full duty cycle against the host-side simulated platform: frames
//! come from a directory of PNGs (or synthetic gray frames), the accelerator
//! scores inputs by brightness, and the wake line is driven by a timer.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use nimbus_config::{
    apply_cli_overrides, apply_environment_overrides, load_config, ConfigError, NimbusConfig,
};
use nimbus_hal::sim::{SimBoard, SimConfig, SimModel};
use nimbus_node::{frames, input_geometry, DutyCycleController, NodeSettings, NUM_CLASSES};
use nimbus_observability::{debug_flags_help, init_logging, parse_debug_flags, LoggingOptions};
use tracing::{info, warn};

/// Nimbus sensing node - capture, infer and transmit on the simulated board
#[derive(Parser, Debug)]
#[command(name = "nimbus-node", version, author, long_about = None, after_help = debug_flags_help())]
struct Args {
    /// Path to nimbus_configuration.toml (searched for when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stop after this many cycles (default: run forever)
    #[arg(long)]
    cycles: Option<u64>,

    /// Directory of PNG frames fed to the simulated camera, in name order
    #[arg(long)]
    frames: Option<PathBuf>,

    /// Period of the simulated wake line in milliseconds (0 = no timer)
    #[arg(long, default_value_t = 1000)]
    wake_interval_ms: u64,

    /// Let delays advance a virtual clock instead of sleeping
    #[arg(long, default_value_t = false)]
    virtual_time: bool,

    /// Simulated inference time in milliseconds
    #[arg(long, default_value_t = 2)]
    inference_ms: u64,

    /// Report mode override (index, label)
    #[arg(long)]
    report: Option<String>,

    /// Print per-class scores after every cycle
    #[arg(long, default_value_t = false)]
    print_scores: bool,

    /// Dump the feature tensor as hex after every cycle
    #[arg(long, default_value_t = false)]
    dump_features: bool,

    /// Model input override (luma, packed_rgb); sensor window must be
    /// 32x32 for luma and 128x128 for packed_rgb
    #[arg(long)]
    model_input: Option<String>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Directory for per-run log files (file-logging feature)
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> HashMap<String, String> {
        let mut overrides = HashMap::new();
        if let Some(report) = &self.report {
            overrides.insert("report".to_string(), report.clone());
        }
        if self.print_scores {
            overrides.insert("print_scores".to_string(), "true".to_string());
        }
        if self.dump_features {
            overrides.insert("dump_features".to_string(), "true".to_string());
        }
        if let Some(input) = &self.model_input {
            overrides.insert("model_input".to_string(), input.clone());
        }
        if let Some(level) = &self.log_level {
            overrides.insert("log_level".to_string(), level.clone());
        }
        overrides
    }
}

fn main() -> Result<()> {
    // `--debug-<crate>` flags are read separately and hidden from clap
    let debug_flags = parse_debug_flags();
    let args = Args::parse_from(std::env::args().filter(|arg| !arg.starts_with("--debug-")));

    let overrides = args.overrides();
    let (config, config_found) = match load_config(args.config.as_deref(), Some(&overrides)) {
        Ok(config) => (config, true),
        Err(ConfigError::FileNotFound(_)) if args.config.is_none() => {
            let mut config = NimbusConfig::default();
            apply_environment_overrides(&mut config);
            apply_cli_overrides(&mut config, &overrides);
            (config, false)
        }
        Err(e) => return Err(e).context("Failed to load node configuration"),
    };

    let _logging = init_logging(
        &debug_flags,
        &LoggingOptions {
            level: config.logging.level.clone(),
            format: match config.logging.format {
                nimbus_config::LogFormat::Text => nimbus_observability::LogFormat::Text,
                nimbus_config::LogFormat::Json => nimbus_observability::LogFormat::Json,
            },
            log_dir: args.log_dir.clone(),
            ..LoggingOptions::default()
        },
    )?;

    print_banner();
    if !config_found {
        warn!(target: "nimbus-node", "no nimbus_configuration.toml found, using defaults");
    }

    let settings = NodeSettings::from_config(&config).context("Invalid node configuration")?;
    let geometry = input_geometry(settings.input_layout);

    let frames = match &args.frames {
        Some(dir) => {
            let capture = &settings.sensor.capture;
            frames::load_frames(dir, capture.width, capture.height)?
        }
        None => {
            info!(target: "nimbus-node", "no --frames given, camera produces synthetic gray frames");
            Vec::new()
        }
    };

    let (peripherals, handles) = SimBoard::build(SimConfig {
        realtime: !args.virtual_time,
        frames,
        model: SimModel::brightness(geometry, NUM_CLASSES),
        inference_latency: Duration::from_millis(args.inference_ms),
        echo_serial: true,
        ..SimConfig::default()
    });

    if args.wake_interval_ms > 0 {
        let _wake_timer = handles
            .wake
            .start_periodic(Duration::from_millis(args.wake_interval_ms));
        info!(target: "nimbus-node", "wake line fires every {} ms", args.wake_interval_ms);
    } else {
        warn!(target: "nimbus-node", "no wake timer: the node will sleep after its first cycle");
    }

    ctrlc::set_handler(|| {
        info!(target: "nimbus-node", "shutdown signal received");
        std::process::exit(0);
    })
    .context("Failed to install Ctrl+C handler")?;

    let mut node = DutyCycleController::new(peripherals, settings);
    let outcome = match args.cycles {
        Some(count) => node.run_cycles(count).map(|results| {
            info!(target: "nimbus-node", "completed {} cycles", results.len());
        }),
        None => node.run().map(|never| match never {}),
    };

    match outcome {
        Ok(()) => Ok(()),
        Err(fault) => node.halt(&fault),
    }
}

fn print_banner() {
    println!(
        r#"
╔═══════════════════════════════════════════════════════════════════╗
║                                                                   ║
║   Nimbus Sensing Node v{:<10}                                 ║
║   Capture → Infer → Transmit duty cycle (simulated board)        ║
║                                                                   ║
╚═══════════════════════════════════════════════════════════════════╝
"#,
        nimbus_node::VERSION
    );
}
