//! One-shot user-facing notifications, scoped to a single render cycle.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    Info,
    Error,
}

/// A flash message: a translation key plus interpolation variables.
/// Attached to a response, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub vars: BTreeMap<String, String>,
}

impl FlashMessage {
    pub fn info(message: &str) -> Self {
        Self {
            level: FlashLevel::Info,
            message: message.to_string(),
            vars: BTreeMap::new(),
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.to_string(),
            vars: BTreeMap::new(),
        }
    }

    pub fn error_with(message: &str, vars: &[(&str, &str)]) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.to_string(),
            vars: vars
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_with_vars() {
        let flash = FlashMessage::error_with("some.key", &[("%exception%", "boom")]);
        assert_eq!(flash.level, FlashLevel::Error);
        assert_eq!(flash.vars.get("%exception%").unwrap(), "boom");
    }

    #[test]
    fn test_vars_omitted_when_empty() {
        let json = serde_json::to_string(&FlashMessage::info("ok")).unwrap();
        assert!(!json.contains("vars"));
    }
}
