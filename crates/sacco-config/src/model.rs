use sacco_domain::{ApplicantType, PhaseRetry};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

pub const ENV_API_URL: &str = "LOAN_WIZARD_API_URL";
pub const ENV_APPLICANT_TYPE: &str = "LOAN_WIZARD_APPLICANT_TYPE";

/// User-configurable wizard settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "Config::default_api_base_url")]
    pub api_base_url: String,
    #[serde(default)]
    pub applicant_type: ApplicantType,
    #[serde(default)]
    pub phase_retry: PhaseRetry,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
    #[serde(default = "Config::default_log_filter")]
    pub log_filter: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Name of the environment variable holding the signed-in user's token.
    pub access_token_env: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: Self::default_api_base_url(),
            applicant_type: ApplicantType::default(),
            phase_retry: PhaseRetry::default(),
            ui_color_enabled: Self::default_ui_color_enabled(),
            log_filter: Self::default_log_filter(),
            access_token_env: None,
        }
    }
}

impl Config {
    pub fn default_api_base_url() -> String {
        "http://localhost:8080/api".into()
    }

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn default_log_filter() -> String {
        "loan_wizard=info,sacco_core=info,sacco_api_http=info".into()
    }

    pub fn default_access_token_env() -> &'static str {
        "LOAN_WIZARD_TOKEN"
    }

    pub fn access_token_var(&self) -> &str {
        self.access_token_env
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(Self::default_access_token_env())
    }

    /// Applies overrides from `lookup` (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|url| !url.trim().is_empty()) {
            self.api_base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(raw) = lookup(ENV_APPLICANT_TYPE).filter(|raw| !raw.trim().is_empty()) {
            self.applicant_type =
                ApplicantType::parse(&raw).ok_or_else(|| ConfigError::InvalidValue {
                    key: ENV_APPLICANT_TYPE,
                    value: raw.clone(),
                })?;
        }
        Ok(())
    }

    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(self)
    }
}
