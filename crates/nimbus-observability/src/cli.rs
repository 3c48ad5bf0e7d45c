// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! `--debug-<crate>` flags
//!
//! `--debug-nimbus-node` raises that crate's log target to debug while the
//! rest of the workspace stays at the configured level.

use std::collections::BTreeSet;
use std::env;

use crate::KNOWN_CRATES;

/// Crates selected for debug-level logging
///
/// # Example
/// ```rust
/// use nimbus_observability::CrateDebugFlags;
///
/// let flags = CrateDebugFlags::from_args(vec!["--debug-nimbus-node".to_string()]);
/// assert!(flags.is_enabled("nimbus-node"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrateDebugFlags {
    pub enabled_crates: BTreeSet<String>,
}

impl CrateDebugFlags {
    /// Collect `--debug-<crate>` and `--debug-all` from `args`; anything
    /// else is left for clap.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut flags = CrateDebugFlags::default();
        for arg in args {
            if arg == "--debug-all" {
                flags.enable_all();
            } else if let Some(crate_name) = arg.strip_prefix("--debug-") {
                flags.enable(crate_name);
            }
        }
        flags
    }

    /// Enable one crate, ignoring blanks
    pub fn enable(&mut self, crate_name: &str) {
        let crate_name = crate_name.trim();
        if !crate_name.is_empty() {
            self.enabled_crates.insert(crate_name.to_string());
        }
    }

    pub fn enable_all(&mut self) {
        for crate_name in KNOWN_CRATES {
            self.enable(crate_name);
        }
    }

    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.enabled_crates.contains(crate_name)
    }

    pub fn any_enabled(&self) -> bool {
        !self.enabled_crates.is_empty()
    }

    /// DEBUG for selected crates, INFO otherwise
    pub fn log_level(&self, crate_name: &str) -> tracing::Level {
        if self.is_enabled(crate_name) {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// `EnvFilter` directive string with `default_level` for everything else.
    ///
    /// Each crate gets a directive for its hyphenated log target and for its
    /// underscored module path, so both `target: "nimbus-node"` events and
    /// plain module-path events are raised.
    pub fn to_filter_string_with(&self, default_level: &str) -> String {
        let mut filters: Vec<String> = self
            .enabled_crates
            .iter()
            .flat_map(|name| {
                let module = name.replace('-', "_");
                if module == *name {
                    vec![format!("{}=debug", name)]
                } else {
                    vec![format!("{}=debug", name), format!("{}=debug", module)]
                }
            })
            .collect();
        filters.push(default_level.to_string());
        filters.join(",")
    }

    /// Same as [`CrateDebugFlags::to_filter_string_with`] with `info` as the default
    pub fn to_filter_string(&self) -> String {
        self.to_filter_string_with("info")
    }

    /// Merge a `NIMBUS_DEBUG`-style value: `all` or comma-separated names
    pub fn merge_env_value(&mut self, value: &str) {
        if value.trim() == "all" {
            self.enable_all();
        } else {
            for crate_name in value.split(',') {
                self.enable(crate_name);
            }
        }
    }
}

/// Flags from the process arguments plus `NIMBUS_DEBUG`
/// (`all`, or names such as `nimbus-node,nimbus-hal`)
pub fn parse_debug_flags() -> CrateDebugFlags {
    let mut flags = CrateDebugFlags::from_args(env::args());
    if let Ok(env_var) = env::var("NIMBUS_DEBUG") {
        flags.merge_env_value(&env_var);
    }
    flags
}

/// Text appended to `--help`
pub fn debug_flags_help() -> String {
    format!(
        r#"Per-crate debug logging:
  --debug-all                    every workspace crate at debug
  --debug-<crate>                one crate at debug (repeatable)

Crates: {}

Or via NIMBUS_DEBUG:
  NIMBUS_DEBUG=nimbus-node,nimbus-hal
  NIMBUS_DEBUG=all
"#,
        KNOWN_CRATES.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_crate_selected() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-nimbus-node".to_string()]);
        assert!(flags.is_enabled("nimbus-node"));
        assert!(!flags.is_enabled("nimbus-hal"));
    }

    #[test]
    fn test_unrelated_args_ignored() {
        let flags = CrateDebugFlags::from_args(vec![
            "nimbus-node".to_string(),
            "--cycles".to_string(),
            "3".to_string(),
        ]);
        assert!(!flags.any_enabled());
    }

    #[test]
    fn test_debug_all_selects_every_crate() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-all".to_string()]);
        for crate_name in KNOWN_CRATES {
            assert!(flags.is_enabled(crate_name), "{} missing", crate_name);
        }
    }

    #[test]
    fn test_filter_covers_target_and_module_path() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-nimbus-hal".to_string()]);
        assert_eq!(
            flags.to_filter_string_with("warn"),
            "nimbus-hal=debug,nimbus_hal=debug,warn"
        );
        assert_eq!(CrateDebugFlags::default().to_filter_string(), "info");
    }

    #[test]
    fn test_env_value_merge() {
        let mut flags = CrateDebugFlags::default();
        flags.merge_env_value(" nimbus-node , ,nimbus-config");
        assert!(flags.is_enabled("nimbus-node"));
        assert!(flags.is_enabled("nimbus-config"));
        assert_eq!(flags.enabled_crates.len(), 2);

        flags.merge_env_value("all");
        assert_eq!(flags.enabled_crates.len(), KNOWN_CRATES.len());
    }

    #[test]
    fn test_per_crate_level() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-nimbus-node".to_string()]);
        assert_eq!(flags.log_level("nimbus-node"), tracing::Level::DEBUG);
        assert_eq!(flags.log_level("nimbus-hal"), tracing::Level::INFO);
    }
}
