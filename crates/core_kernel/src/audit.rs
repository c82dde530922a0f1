//! Audit records shared by every component

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded configuration change with before and after values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationChange {
    pub parameter: String,
    pub old_value: String,
    pub new_value: String,
    pub timestamp: DateTime<Utc>,
}

impl ConfigurationChange {
    pub fn new(
        parameter: impl Into<String>,
        old_value: impl ToString,
        new_value: impl ToString,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let change = Self {
            parameter: parameter.into(),
            old_value: old_value.to_string(),
            new_value: new_value.to_string(),
            timestamp,
        };
        tracing::info!(
            parameter = %change.parameter,
            old_value = %change.old_value,
            new_value = %change.new_value,
            "configuration changed"
        );
        change
    }

    /// Records a change of a structured value using its JSON form
    pub fn json<T: Serialize>(
        parameter: impl Into<String>,
        old_value: &T,
        new_value: &T,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let render = |v: &T| serde_json::to_string(v).unwrap_or_else(|e| format!("<{e}>"));
        Self::new(parameter, render(old_value), render(new_value), timestamp)
    }
}
