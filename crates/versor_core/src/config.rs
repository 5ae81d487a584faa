//! Process-wide numeric configuration.
//!
//! Decimal operations read the active precision; literal construction reads
//! the default number kind. Both stay in effect until changed.

use std::sync::{OnceLock, RwLock};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MathError, MathResult};

/// Significant digits the decimal backend can hold.
pub const MAX_PRECISION: u32 = 28;

/// Which representation a plain numeric literal becomes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum NumberKind {
    #[default]
    Number,
    Decimal,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Significant digits kept by decimal trigonometry.
    pub precision: u32,
    pub number: NumberKind,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            precision: MAX_PRECISION,
            number: NumberKind::Number,
        }
    }
}

impl Config {
    pub fn validate(&self) -> MathResult<()> {
        if self.precision == 0 || self.precision > MAX_PRECISION {
            return Err(MathError::Config(format!(
                "precision must be between 1 and {MAX_PRECISION}, got {}",
                self.precision
            )));
        }
        Ok(())
    }
}

static CONFIG: OnceLock<RwLock<Config>> = OnceLock::new();

fn cell() -> &'static RwLock<Config> {
    CONFIG.get_or_init(|| RwLock::new(Config::default()))
}

/// Snapshot of the active configuration.
pub fn config() -> Config {
    // A poisoned lock still holds a valid Copy value.
    *cell().read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn set_config(next: Config) -> MathResult<()> {
    next.validate()?;
    let mut guard = cell().write().unwrap_or_else(|poisoned| poisoned.into_inner());
    debug!(
        precision = next.precision,
        number = ?next.number,
        "numeric configuration changed"
    );
    *guard = next;
    Ok(())
}

pub fn set_precision(precision: u32) -> MathResult<()> {
    set_config(Config {
        precision,
        ..config()
    })
}

/// Serialises tests that touch the global configuration.
#[cfg(test)]
pub(crate) fn test_lock() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_precision() {
        let _guard = test_lock();
        let before = config();
        assert!(matches!(set_precision(0), Err(MathError::Config(_))));
        assert!(matches!(set_precision(29), Err(MathError::Config(_))));
        assert_eq!(config(), before);
    }

    #[test]
    fn precision_change_is_visible_until_reset() {
        let _guard = test_lock();
        set_precision(12).expect("precision should be accepted");
        assert_eq!(config().precision, 12);
        set_config(Config::default()).expect("defaults are valid");
        assert_eq!(config().precision, MAX_PRECISION);
    }

    #[test]
    fn deserializes_partial_json_with_defaults() -> anyhow::Result<()> {
        let parsed: Config = serde_json::from_str(r#"{"number":"decimal"}"#)?;
        assert_eq!(parsed.number, NumberKind::Decimal);
        assert_eq!(parsed.precision, MAX_PRECISION);

        let text = serde_json::to_string(&Config {
            precision: 15,
            number: NumberKind::Number,
        })?;
        assert_eq!(text, r#"{"precision":15,"number":"number"}"#);
        Ok(())
    }
}
