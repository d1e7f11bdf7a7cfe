use crate::cli::Cli;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

// Slack on top of the request timeout before a blocking front end gives up.
const WAIT_MARGIN: Duration = Duration::from_secs(5);

/// Settings for the Gemini backend. There is no built-in API key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    #[must_use]
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            api_key: normalize_key(cli.api_key.as_deref())
                .or_else(|| normalize_key(cli.legacy_api_key.as_deref())),
            model: cli.model.clone(),
            base_url: cli.api_base.clone(),
            timeout: Duration::from_secs(cli.timeout_secs),
        }
    }

    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// How long a blocking front end should wait for an outstanding reply.
    /// Always longer than the request timeout, so a reply is never cut off
    /// while reqwest is still allowed to deliver it.
    #[must_use]
    pub fn wait_limit(&self) -> Duration {
        self.timeout + WAIT_MARGIN
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

fn normalize_key(key: Option<&str>) -> Option<String> {
    key.map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
}
