//! Client configuration baked in at build time.
//!
//! `FREIGHTDESK_GEMINI_API_KEY`, `FREIGHTDESK_GEMINI_MODEL`,
//! `FREIGHTDESK_GEMINI_BASE_URL` and `FREIGHTDESK_INTAKE_URL` are read with
//! `option_env!` when the WASM bundle is compiled. Anything unset falls back
//! to the defaults in [`ClientConfig`].

use freightdesk_common::config::ClientConfig;

pub fn client_config() -> ClientConfig {
    ClientConfig::from_values(
        option_env!("FREIGHTDESK_GEMINI_API_KEY"),
        option_env!("FREIGHTDESK_GEMINI_MODEL"),
        option_env!("FREIGHTDESK_GEMINI_BASE_URL"),
        option_env!("FREIGHTDESK_INTAKE_URL"),
    )
}
