// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Loading `nimbus_configuration.toml`
//!
//! Later layers win: file, then `NIMBUS_*` environment variables, then the
//! key/value overrides a binary collected from its command line.

use crate::{ConfigError, ConfigResult, NimbusConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const CONFIG_FILE_NAME: &str = "nimbus_configuration.toml";

/// Find the node configuration file
///
/// Search order:
/// 1. `NIMBUS_CONFIG_PATH` environment variable
/// 2. Current working directory: `./nimbus_configuration.toml`
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// `ConfigError::FileNotFound` lists every path that was tried
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("NIMBUS_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by NIMBUS_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd.as_path();
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent;
                }
                None => break,
            }
        }
    }

    if let Some(path) = search_paths.iter().find(|p| p.exists()) {
        return Ok(path.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "Node configuration file '{}' not found in any of these locations:\n{}\n\nSet NIMBUS_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Read `config_path` (or the file [`find_config_file`] locates) and apply
/// environment and `cli_args` overrides.
///
/// Fails on a missing file or malformed TOML. Range checks are separate:
/// see [`crate::validate_config`].
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<NimbusConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: NimbusConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

/// Overwrite `target` when `value` parses; ignore it otherwise
fn set_parsed<T: FromStr>(target: &mut T, value: &str) {
    if let Ok(parsed) = value.trim().parse::<T>() {
        *target = parsed;
    }
}

fn parse_flag(value: &str) -> bool {
    let value = value.trim().to_lowercase();
    value == "true" || value == "1" || value == "yes"
}

/// Environment overrides; unparsable values are ignored
///
/// - `NIMBUS_SENSOR_WIDTH` -> `sensor.width`
/// - `NIMBUS_SENSOR_HEIGHT` -> `sensor.height`
/// - `NIMBUS_SENSOR_TRANSFER_MODE` -> `sensor.transfer_mode`
/// - `NIMBUS_SENSOR_CLOCK_PRESCALER` -> `sensor.clock_prescaler`
/// - `NIMBUS_MODEL_INPUT` -> `model.input`
/// - `NIMBUS_RADIO_FREQUENCY_HZ` -> `radio.frequency_hz`
/// - `NIMBUS_RADIO_SPREADING_FACTOR` -> `radio.spreading_factor`
/// - `NIMBUS_RADIO_TX_POWER_DBM` -> `radio.tx_power_dbm`
/// - `NIMBUS_DIAGNOSTICS_REPORT` -> `diagnostics.report`
/// - `NIMBUS_DIAGNOSTICS_PRINT_SCORES` -> `diagnostics.print_scores`
/// - `NIMBUS_DIAGNOSTICS_DUMP_FEATURES` -> `diagnostics.dump_features`
/// - `NIMBUS_LOG_LEVEL` -> `logging.level`
/// - `NIMBUS_LOG_FORMAT` -> `logging.format`
pub fn apply_environment_overrides(config: &mut NimbusConfig) {
    // Sensor settings
    if let Ok(value) = env::var("NIMBUS_SENSOR_WIDTH") {
        set_parsed(&mut config.sensor.width, &value);
    }
    if let Ok(value) = env::var("NIMBUS_SENSOR_HEIGHT") {
        set_parsed(&mut config.sensor.height, &value);
    }
    if let Ok(value) = env::var("NIMBUS_SENSOR_TRANSFER_MODE") {
        set_parsed(&mut config.sensor.transfer_mode, &value);
    }
    if let Ok(value) = env::var("NIMBUS_SENSOR_CLOCK_PRESCALER") {
        if let Ok(prescaler) = value.trim().parse::<u8>() {
            config.sensor.clock_prescaler = Some(prescaler);
        }
    }

    // Model settings
    if let Ok(value) = env::var("NIMBUS_MODEL_INPUT") {
        set_parsed(&mut config.model.input, &value);
    }

    // Radio settings
    if let Ok(value) = env::var("NIMBUS_RADIO_FREQUENCY_HZ") {
        set_parsed(&mut config.radio.frequency_hz, &value);
    }
    if let Ok(value) = env::var("NIMBUS_RADIO_SPREADING_FACTOR") {
        set_parsed(&mut config.radio.spreading_factor, &value);
    }
    if let Ok(value) = env::var("NIMBUS_RADIO_TX_POWER_DBM") {
        set_parsed(&mut config.radio.tx_power_dbm, &value);
    }

    // Diagnostics
    if let Ok(value) = env::var("NIMBUS_DIAGNOSTICS_REPORT") {
        set_parsed(&mut config.diagnostics.report, &value);
    }
    if let Ok(value) = env::var("NIMBUS_DIAGNOSTICS_PRINT_SCORES") {
        config.diagnostics.print_scores = parse_flag(&value);
    }
    if let Ok(value) = env::var("NIMBUS_DIAGNOSTICS_DUMP_FEATURES") {
        config.diagnostics.dump_features = parse_flag(&value);
    }

    // Logging
    if let Ok(value) = env::var("NIMBUS_LOG_LEVEL") {
        config.logging.level = value;
    }
    if let Ok(value) = env::var("NIMBUS_LOG_FORMAT") {
        set_parsed(&mut config.logging.format, &value);
    }
}

/// Overrides keyed by CLI option name, e.g. `{"spreading_factor": "9"}`
pub fn apply_cli_overrides(config: &mut NimbusConfig, cli_args: &HashMap<String, String>) {
    if let Some(value) = cli_args.get("transfer_mode") {
        set_parsed(&mut config.sensor.transfer_mode, value);
    }
    if let Some(value) = cli_args.get("model_input") {
        set_parsed(&mut config.model.input, value);
    }
    if let Some(value) = cli_args.get("frequency_hz") {
        set_parsed(&mut config.radio.frequency_hz, value);
    }
    if let Some(value) = cli_args.get("spreading_factor") {
        set_parsed(&mut config.radio.spreading_factor, value);
    }
    if let Some(value) = cli_args.get("tx_power_dbm") {
        set_parsed(&mut config.radio.tx_power_dbm, value);
    }
    if let Some(value) = cli_args.get("report") {
        set_parsed(&mut config.diagnostics.report, value);
    }
    if let Some(value) = cli_args.get("print_scores") {
        config.diagnostics.print_scores = parse_flag(value);
    }
    if let Some(value) = cli_args.get("dump_features") {
        config.diagnostics.dump_features = parse_flag(value);
    }
    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InputLayout, ReportMode, TransferModeSetting};
    use std::fs::File;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_find_config_file_env_var() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("custom_config.toml");
        File::create(&config_path).unwrap();

        env::set_var("NIMBUS_CONFIG_PATH", config_path.to_str().unwrap());
        let result = find_config_file();
        env::remove_var("NIMBUS_CONFIG_PATH");

        assert_eq!(result.unwrap(), config_path);
    }

    #[test]
    fn test_find_config_file_env_var_missing() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.toml");

        env::set_var("NIMBUS_CONFIG_PATH", missing.to_str().unwrap());
        let result = find_config_file();
        env::remove_var("NIMBUS_CONFIG_PATH");

        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_minimal_config() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let saved = env::var("NIMBUS_RADIO_SPREADING_FACTOR").ok();
        env::remove_var("NIMBUS_RADIO_SPREADING_FACTOR");
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[sensor]").unwrap();
        writeln!(file, "width = 128").unwrap();
        writeln!(file, "height = 128").unwrap();
        writeln!(file, "transfer_mode = \"streaming\"").unwrap();
        writeln!(file, "[model]").unwrap();
        writeln!(file, "input = \"packed_rgb\"").unwrap();
        writeln!(file, "[radio]").unwrap();
        writeln!(file, "spreading_factor = 10").unwrap();

        let config = load_config(Some(&config_path), None).unwrap();

        assert_eq!(config.sensor.width, 128);
        assert_eq!(config.sensor.transfer_mode, TransferModeSetting::Streaming);
        assert_eq!(config.radio.spreading_factor, 10);

        if let Some(value) = saved {
            env::set_var("NIMBUS_RADIO_SPREADING_FACTOR", value);
        }
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "[radio\nspreading_factor = ").unwrap();

        let result = load_config(Some(&config_path), None);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_unknown_enum_value_is_parse_error() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "[model]\ninput = \"rgb565\"\n").unwrap();

        let result = load_config(Some(&config_path), None);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_environment_overrides() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let mut config = NimbusConfig::default();

        env::set_var("NIMBUS_MODEL_INPUT", "packed_rgb");
        env::set_var("NIMBUS_RADIO_TX_POWER_DBM", "-3");
        env::set_var("NIMBUS_DIAGNOSTICS_DUMP_FEATURES", "yes");
        env::set_var("NIMBUS_RADIO_FREQUENCY_HZ", "not-a-number");

        apply_environment_overrides(&mut config);

        env::remove_var("NIMBUS_MODEL_INPUT");
        env::remove_var("NIMBUS_RADIO_TX_POWER_DBM");
        env::remove_var("NIMBUS_DIAGNOSTICS_DUMP_FEATURES");
        env::remove_var("NIMBUS_RADIO_FREQUENCY_HZ");

        assert_eq!(config.model.input, InputLayout::PackedRgb);
        assert_eq!(config.radio.tx_power_dbm, -3);
        assert!(config.diagnostics.dump_features);
        assert_eq!(config.radio.frequency_hz, 868_000_000, "unparsable values are ignored");
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = NimbusConfig::default();
        let mut cli_args = HashMap::new();
        cli_args.insert("report".to_string(), "label".to_string());
        cli_args.insert("print_scores".to_string(), "1".to_string());

        apply_cli_overrides(&mut config, &cli_args);

        assert_eq!(config.diagnostics.report, ReportMode::Label);
        assert!(config.diagnostics.print_scores);
    }

    #[test]
    fn test_override_precedence() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[radio]").unwrap();
        writeln!(file, "spreading_factor = 8").unwrap();
        writeln!(file, "tx_power_dbm = 10").unwrap();

        env::set_var("NIMBUS_RADIO_SPREADING_FACTOR", "9");
        env::set_var("NIMBUS_RADIO_TX_POWER_DBM", "12");

        let mut cli_args = HashMap::new();
        cli_args.insert("spreading_factor".to_string(), "11".to_string());

        let config = load_config(Some(&config_path), Some(&cli_args)).unwrap();

        env::remove_var("NIMBUS_RADIO_SPREADING_FACTOR");
        env::remove_var("NIMBUS_RADIO_TX_POWER_DBM");

        // CLI wins for SF, env wins for power (no CLI override)
        assert_eq!(config.radio.spreading_factor, 11);
        assert_eq!(config.radio.tx_power_dbm, 12);
    }
}
