// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry configuration system

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default file looked up by [`GeometryConfig::load`]
pub const CONFIG_FILE: &str = "geometry.toml";

const DEGENERATE_TOLERANCE_VAR: &str = "GEOINDEX_DEGENERATE_TOLERANCE";
const WELD_TOLERANCE_VAR: &str = "GEOINDEX_WELD_TOLERANCE";
const GRID_CELL_SIZE_VAR: &str = "GEOINDEX_GRID_CELL_SIZE";

/// Tolerances and defaults consumed by the indexing core
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Relative tolerance under which areas and volumes count as collapsed
    pub degenerate_tolerance: f64,
    /// Distance under which two vertices are welded together
    pub weld_tolerance: f64,
    /// Cell size used by proximity helpers when the caller supplies none
    pub grid_cell_size: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            degenerate_tolerance: 1e-12,
            weld_tolerance: 1e-6,
            grid_cell_size: 1.0,
        }
    }
}

impl GeometryConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: GeometryConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load() -> Result<Self> {
        Self::load_from(CONFIG_FILE, |key| std::env::var(key).ok())
    }

    /// Read `path` if it exists (defaults otherwise), then apply the
    /// `GEOINDEX_*` overrides returned by `lookup`
    pub fn load_from(
        path: impl AsRef<Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut config = if path.as_ref().exists() {
            Self::from_file(path.as_ref())?
        } else {
            Self::default()
        };

        if let Some(value) = parse_override(&lookup, DEGENERATE_TOLERANCE_VAR)? {
            config.degenerate_tolerance = value;
        }
        if let Some(value) = parse_override(&lookup, WELD_TOLERANCE_VAR)? {
            config.weld_tolerance = value;
        }
        if let Some(value) = parse_override(&lookup, GRID_CELL_SIZE_VAR)? {
            config.grid_cell_size = value;
        }

        config.validate()?;
        log::debug!("loaded geometry config: {:?}", config);
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Every tolerance must be finite and strictly positive
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("degenerate_tolerance", self.degenerate_tolerance),
            ("weld_tolerance", self.weld_tolerance),
            ("grid_cell_size", self.grid_cell_size),
        ] {
            if !value.is_finite() || value <= 0.0 {
                bail!("{} must be finite and positive, got {}", name, value);
            }
        }
        Ok(())
    }
}

fn parse_override(lookup: impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<f64>> {
    match lookup(key) {
        Some(raw) => {
            let value = raw
                .trim()
                .parse::<f64>()
                .with_context(|| format!("{} is not a number: {:?}", key, raw))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::{tempdir, NamedTempFile};

    // Process environment is shared by every test thread
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_save_and_reload() -> Result<()> {
        let config = GeometryConfig {
            degenerate_tolerance: 1e-9,
            weld_tolerance: 0.25,
            grid_cell_size: 2.0,
        };
        let file = NamedTempFile::with_suffix(".toml")?;
        config.save(file.path())?;

        let loaded = GeometryConfig::from_file(file.path())?;
        assert_eq!(loaded, config);
        Ok(())
    }

    #[test]
    fn test_partial_file_uses_defaults() -> Result<()> {
        let file = NamedTempFile::with_suffix(".toml")?;
        std::fs::write(file.path(), "weld_tolerance = 0.5\n")?;

        let loaded = GeometryConfig::from_file(file.path())?;
        assert_eq!(loaded.weld_tolerance, 0.5);
        assert_eq!(loaded.grid_cell_size, GeometryConfig::default().grid_cell_size);
        Ok(())
    }

    #[test]
    fn test_rejects_non_positive_values() {
        let config = GeometryConfig {
            grid_cell_size: 0.0,
            ..GeometryConfig::default()
        };
        assert!(config.validate().is_err());

        let config = GeometryConfig {
            weld_tolerance: f64::NAN,
            ..GeometryConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file_then_overrides() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "weld_tolerance = 0.5\ngrid_cell_size = 4.0\n")?;

        let loaded = GeometryConfig::load_from(&path, vars(&[(GRID_CELL_SIZE_VAR, " 2.5 ")]))?;
        assert_eq!(loaded.weld_tolerance, 0.5);
        assert_eq!(loaded.grid_cell_size, 2.5);
        assert_eq!(
            loaded.degenerate_tolerance,
            GeometryConfig::default().degenerate_tolerance
        );
        Ok(())
    }

    #[test]
    fn test_missing_file_uses_defaults() -> Result<()> {
        let dir = tempdir()?;
        let loaded = GeometryConfig::load_from(dir.path().join(CONFIG_FILE), vars(&[]))?;
        assert_eq!(loaded, GeometryConfig::default());
        Ok(())
    }

    #[test]
    fn test_bad_overrides_are_rejected() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE);

        let err = GeometryConfig::load_from(&path, vars(&[(WELD_TOLERANCE_VAR, "tight")]))
            .unwrap_err();
        assert!(err.to_string().contains(WELD_TOLERANCE_VAR));

        let zero = GeometryConfig::load_from(&path, vars(&[(DEGENERATE_TOLERANCE_VAR, "0")]));
        assert!(zero.is_err());
        Ok(())
    }

    #[test]
    fn test_load_reads_process_environment() -> Result<()> {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let previous: Vec<(&str, Option<String>)> = [
            DEGENERATE_TOLERANCE_VAR,
            WELD_TOLERANCE_VAR,
            GRID_CELL_SIZE_VAR,
        ]
        .iter()
        .map(|&key| (key, std::env::var(key).ok()))
        .collect();

        std::env::remove_var(DEGENERATE_TOLERANCE_VAR);
        std::env::set_var(WELD_TOLERANCE_VAR, "0.125");
        std::env::set_var(GRID_CELL_SIZE_VAR, "3");
        let loaded = GeometryConfig::load();

        std::env::set_var(GRID_CELL_SIZE_VAR, "-1");
        let negative = GeometryConfig::load();

        for (key, value) in previous {
            match value {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
        }

        let loaded = loaded?;
        assert_eq!(loaded.weld_tolerance, 0.125);
        assert_eq!(loaded.grid_cell_size, 3.0);
        assert!(negative.is_err());
        Ok(())
    }
}
