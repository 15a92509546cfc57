// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Configuration file resolution.

use std::path::{Path, PathBuf};

use scanwerk_core::ScanConfig;
use scanwerk_core::error::Result;
use tracing::{debug, info};

/// Default location of `config.json`, if a base directory can be found.
pub fn default_config_path() -> Option<PathBuf> {
    config_path_from(
        std::env::var("XDG_CONFIG_HOME").ok(),
        std::env::var("HOME").ok(),
    )
}

fn config_path_from(xdg_config_home: Option<String>, home: Option<String>) -> Option<PathBuf> {
    // Try XDG config dir, then fallback to home
    let base = match (xdg_config_home, home) {
        (Some(xdg), _) if !xdg.is_empty() => PathBuf::from(xdg),
        (_, Some(home)) if !home.is_empty() => PathBuf::from(home).join(".config"),
        _ => return None,
    };
    Some(base.join("scanwerk").join("config.json"))
}

/// Load the configuration.
///
/// An explicit path must exist and parse. The default path is optional;
/// when it is missing the built-in defaults apply.
pub fn load_config(explicit: Option<&Path>, default_path: Option<&Path>) -> Result<ScanConfig> {
    if let Some(path) = explicit {
        info!(path = %path.display(), "Loading configuration");
        return ScanConfig::load(path);
    }
    match default_path {
        Some(path) if path.exists() => {
            info!(path = %path.display(), "Loading configuration");
            ScanConfig::load(path)
        }
        _ => {
            debug!("No configuration file; using defaults");
            Ok(ScanConfig::default())
        }
    }
}
