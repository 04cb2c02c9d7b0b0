/// Measurement configuration loaded from environment variables
use crate::analysis::Unit;
use crate::error::SessionError;

/// Upload ceiling advertised by the storefront
pub const DEFAULT_MAX_UPLOAD_MB: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeterConfig {
    /// Unit used until the user picks another one.
    pub default_unit: Unit,
    /// Largest accepted input in bytes.
    pub max_upload_bytes: usize,
}

impl MeterConfig {
    /// Load configuration from `STLMETER_UNIT` and `STLMETER_MAX_UPLOAD_MB`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            default_unit: lookup("STLMETER_UNIT")
                .map(|value| Unit::from_symbol_lossy(&value))
                .unwrap_or_default(),
            max_upload_bytes: lookup("STLMETER_MAX_UPLOAD_MB")
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_MB)
                .saturating_mul(1024 * 1024),
        }
    }

    /// Reject inputs above the upload ceiling
    pub fn check_size(&self, size: usize) -> Result<(), SessionError> {
        if size > self.max_upload_bytes {
            return Err(SessionError::TooLarge {
                size,
                limit: self.max_upload_bytes,
            });
        }
        Ok(())
    }
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            default_unit: Unit::Millimeter,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
        }
    }
}
