use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// String-keyed runtime property bag handed to each task by the batch
/// runtime.
///
/// Comparator configuration and serialization knobs travel through this bag;
/// stateful per-task objects read it exactly once at configure time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    entries: HashMap<String, String>,
}

impl RuntimeConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no properties are set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Set a property, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Look up a property.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Look up an integer property, falling back to `default` when the key is
    /// absent or not parseable.
    pub fn get_usize(&self, key: &str, default: usize) -> usize {
        self.get(key)
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::RuntimeConfig;

    #[test]
    fn typed_getter_falls_back_on_missing_or_garbage() {
        let mut cfg = RuntimeConfig::new();
        assert!(cfg.is_empty());
        assert_eq!(cfg.get_usize("n", 1), 1);

        cfg.set("n", "3").set("junk", "not-a-number");
        assert!(!cfg.is_empty());
        assert_eq!(cfg.get_usize("n", 1), 3);
        assert_eq!(cfg.get_usize("junk", 7), 7);
    }
}
