//! Execution configuration.
//!
//! Loaded from JSON by embedding services; every field has a default so an
//! empty object is a valid configuration.

use crate::error::{ErrorClass, ErrorOrigin, InternalError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("invalid execution config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid execution config: timeout_ms must be positive")]
    ZeroTimeout,
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorClass::InvalidArgument, ErrorOrigin::Config, err.to_string())
    }
}

///
/// ExecutionConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutionConfig {
    /// Wall-clock budget for one query execution; `None` disables the deadline.
    pub timeout_ms: Option<u64>,

    /// Verify that intersection inputs arrive in their declared order.
    pub check_input_order: bool,

    /// Emit metrics events for cursor activity.
    pub record_metrics: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            timeout_ms: None,
            check_input_order: true,
            record_metrics: true,
        }
    }
}

impl ExecutionConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;

        Ok(config)
    }

    pub const fn validate(&self) -> Result<(), ConfigError> {
        if matches!(self.timeout_ms, Some(0)) {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(())
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}
