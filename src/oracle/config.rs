use std::path::PathBuf;
use std::time::Duration;

use oracle_model::CategoryId;
use serde::{Deserialize, Serialize};

use super::store;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Category selected when the page is first shown.
    #[serde(default = "default_category")]
    pub default_category: CategoryId,

    /// Simulated thinking time between submission and response.
    #[serde(default = "default_response_delay_ms")]
    pub response_delay_ms: u64,

    #[serde(default = "default_responses_file")]
    pub responses_file: PathBuf,

    #[serde(default = "default_static_serving_dir")]
    pub static_serving_dir: PathBuf,

    #[serde(default = "default_serving_addr")]
    pub serving_addr: String,
}

fn default_category() -> CategoryId {
    CategoryId::from("romance")
}

fn default_response_delay_ms() -> u64 {
    1000
}

fn default_responses_file() -> PathBuf {
    store::data_dir().join("responses.yaml")
}

fn default_static_serving_dir() -> PathBuf {
    "ui/dist".into()
}

fn default_serving_addr() -> String {
    "0.0.0.0:3000".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_category: default_category(),
            response_delay_ms: default_response_delay_ms(),
            responses_file: default_responses_file(),
            static_serving_dir: default_static_serving_dir(),
            serving_addr: default_serving_addr(),
        }
    }
}

impl Config {
    pub fn response_delay(&self) -> Duration {
        Duration::from_millis(self.response_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: Config = serde_yaml::from_str("responseDelayMs: 250\n").unwrap();
        assert_eq!(config.response_delay(), Duration::from_millis(250));
        assert_eq!(config.default_category, CategoryId::from("romance"));
        assert_eq!(config.serving_addr, "0.0.0.0:3000");
        assert_eq!(config.static_serving_dir, PathBuf::from("ui/dist"));
    }
}
