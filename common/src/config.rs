/// Default Gemini model for chat and extraction.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Base URL of the Generative Language REST API.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Fixed intake submission target.
pub const DEFAULT_INTAKE_URL: &str = "https://intake.freightdesk.example/api/v1/bookings";

/// Endpoints and credentials used by the web client.
///
/// The UI fills this from compile-time env vars (`FREIGHTDESK_*`), so values
/// are baked into the WASM bundle at build time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub intake_url: String,
}

impl ClientConfig {
    /// Resolve raw values; empty strings count as unset.
    pub fn from_values(
        api_key: Option<&str>,
        model: Option<&str>,
        api_base: Option<&str>,
        intake_url: Option<&str>,
    ) -> Self {
        Self {
            api_key: non_empty(api_key).map(String::from),
            model: non_empty(model).unwrap_or(DEFAULT_MODEL).to_string(),
            api_base: non_empty(api_base)
                .unwrap_or(DEFAULT_API_BASE)
                .trim_end_matches('/')
                .to_string(),
            intake_url: non_empty(intake_url).unwrap_or(DEFAULT_INTAKE_URL).to_string(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_values(None, None, None, None)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset_or_empty() {
        let cfg = ClientConfig::from_values(Some(""), Some("  "), None, None);
        assert_eq!(cfg, ClientConfig::default());
        assert!(!cfg.has_api_key());
        assert_eq!(cfg.model, DEFAULT_MODEL);
        assert_eq!(cfg.intake_url, DEFAULT_INTAKE_URL);
    }

    #[test]
    fn explicit_values_win_and_base_is_trimmed() {
        let cfg = ClientConfig::from_values(
            Some("key-123"),
            Some("gemini-1.5-pro"),
            Some("http://localhost:8080/v1beta/"),
            Some("http://localhost:9000/intake"),
        );
        assert_eq!(cfg.api_key.as_deref(), Some("key-123"));
        assert_eq!(cfg.model, "gemini-1.5-pro");
        assert_eq!(cfg.api_base, "http://localhost:8080/v1beta");
        assert_eq!(cfg.intake_url, "http://localhost:9000/intake");
    }
}
