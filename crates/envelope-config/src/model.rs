use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Behaviour of a mutation unit that is called again before its last call settled.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConcurrencyMode {
    #[default]
    Reject,
    Queue,
}

/// Stores balance-engine options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub concurrency: ConcurrencyMode,
    /// Serialize all mutations against one budget, across units.
    #[serde(default = "Config::default_serialize_budget_mutations")]
    pub serialize_budget_mutations: bool,
    /// Default tracing directive, combined with `RUST_LOG`.
    #[serde(default = "Config::default_log_filter")]
    pub log_filter: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_opened_budget: Option<Uuid>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            concurrency: ConcurrencyMode::default(),
            serialize_budget_mutations: Self::default_serialize_budget_mutations(),
            log_filter: Self::default_log_filter(),
            last_opened_budget: None,
        }
    }
}

impl Config {
    fn default_serialize_budget_mutations() -> bool {
        true
    }

    fn default_log_filter() -> String {
        "envelope_budget=info,envelope_core=info".into()
    }
}
