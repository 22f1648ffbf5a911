use tracing::warn;

pub const DEFAULT_JSON_CONTENT_TYPE: &str = "application/json";
pub const DEFAULT_MAX_BODY_SIZE: usize = 64 * 1024 * 1024;

const JSON_CONTENT_TYPE_ENV: &str = "DBC_JSON_CONTENT_TYPE";
const MAX_BODY_SIZE_ENV: &str = "DBC_MAX_BODY_SIZE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeConfig {
    /// Media type required by the JSON decode operations.
    pub json_content_type: String,
    /// Maximum body size in bytes accepted by any decode operation.
    pub max_body_size: usize,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            json_content_type: DEFAULT_JSON_CONTENT_TYPE.into(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

impl EnvelopeConfig {
    /// Defaults overridden by `DBC_JSON_CONTENT_TYPE` and `DBC_MAX_BODY_SIZE`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(content_type) = lookup(JSON_CONTENT_TYPE_ENV) {
            let content_type = content_type.trim();
            if !content_type.is_empty() {
                config.json_content_type = content_type.to_string();
            }
        }
        if let Some(raw) = lookup(MAX_BODY_SIZE_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(size) => config.max_body_size = size,
                Err(err) => warn!(
                    value = raw.as_str(),
                    error = %err,
                    "ignoring malformed {MAX_BODY_SIZE_ENV}"
                ),
            }
        }
        config
    }
}
