//! Configuration for the grid loader.

use serde::{Deserialize, Serialize};

/// How the no-data sentinel is compared against samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodataMode {
    /// Mask samples equal to the sentinel (within a small tolerance)
    #[default]
    Equal,
    /// Mask samples at or below the sentinel
    AtOrBelow,
}

impl NodataMode {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "at_or_below" | "below" | "le" => NodataMode::AtOrBelow,
            _ => NodataMode::Equal,
        }
    }
}

/// No-data masking policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodataConfig {
    /// The sentinel value
    #[serde(default)]
    pub sentinel: f64,

    #[serde(default)]
    pub mode: NodataMode,

    /// Use the file's GDAL_NODATA value instead of `sentinel` when present
    #[serde(default)]
    pub prefer_file_nodata: bool,
}

impl Default for NodataConfig {
    fn default() -> Self {
        Self {
            sentinel: 0.0,
            mode: NodataMode::Equal,
            prefer_file_nodata: false,
        }
    }
}

impl NodataConfig {
    /// Sentinel to apply for a raster that declares `file_nodata`.
    pub fn effective_sentinel(&self, file_nodata: Option<f64>) -> f64 {
        match file_nodata {
            Some(v) if self.prefer_file_nodata => v,
            _ => self.sentinel,
        }
    }

    /// Whether `value` counts as missing against `sentinel`.
    ///
    /// Equality uses the tolerance `1e-8 + 1e-5 * |sentinel|`.
    pub fn is_missing(&self, value: f32, sentinel: f64) -> bool {
        let value = value as f64;
        if !value.is_finite() {
            return true;
        }
        if sentinel.is_nan() {
            return false;
        }
        let tolerance = 1e-8 + 1e-5 * sentinel.abs();
        match self.mode {
            NodataMode::Equal => (value - sentinel).abs() <= tolerance,
            NodataMode::AtOrBelow => value <= sentinel + tolerance,
        }
    }
}

/// Configuration for the grid loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    #[serde(default)]
    pub nodata: NodataConfig,

    /// Display label attached to grids loaded from raster files
    #[serde(default = "default_label")]
    pub label: String,
}

fn default_label() -> String {
    "Temperature [C]".to_string()
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            nodata: NodataConfig::default(),
            label: default_label(),
        }
    }
}

impl LoaderConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("NODATA_SENTINEL") {
            if let Ok(sentinel) = val.parse() {
                config.nodata.sentinel = sentinel;
            }
        }

        if let Ok(val) = std::env::var("NODATA_MODE") {
            config.nodata.mode = NodataMode::from_str(&val);
        }

        if let Ok(val) = std::env::var("PREFER_FILE_NODATA") {
            config.nodata.prefer_file_nodata = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("GRID_LABEL") {
            config.label = val;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_mode_tolerance() {
        let cfg = NodataConfig::default();
        assert!(cfg.is_missing(0.0, 0.0));
        assert!(!cfg.is_missing(0.001, 0.0));
        assert!(cfg.is_missing(-9999.0, -9999.0));
        assert!(!cfg.is_missing(-9998.0, -9999.0));
        assert!(cfg.is_missing(f32::NAN, 0.0));
    }

    #[test]
    fn test_at_or_below_mode() {
        let cfg = NodataConfig {
            mode: NodataMode::AtOrBelow,
            ..Default::default()
        };
        assert!(cfg.is_missing(-9999.0, -999.0));
        assert!(cfg.is_missing(-999.0, -999.0));
        assert!(!cfg.is_missing(-998.0, -999.0));
    }

    #[test]
    fn test_effective_sentinel() {
        let mut cfg = NodataConfig::default();
        assert_eq!(cfg.effective_sentinel(Some(-9999.0)), 0.0);
        cfg.prefer_file_nodata = true;
        assert_eq!(cfg.effective_sentinel(Some(-9999.0)), -9999.0);
        assert_eq!(cfg.effective_sentinel(None), 0.0);
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!(NodataMode::from_str("AT_OR_BELOW"), NodataMode::AtOrBelow);
        assert_eq!(NodataMode::from_str("equal"), NodataMode::Equal);
        assert_eq!(NodataMode::from_str("garbage"), NodataMode::Equal);
    }
}
