// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use nimbus::config::{load_config, validate_config, NimbusConfig};

#[test]
fn test_shipped_config_matches_defaults() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("nimbus_configuration.toml");
    let config = load_config(Some(&path), None).unwrap();
    validate_config(&config).unwrap();
    assert_eq!(config, NimbusConfig::default());
}
