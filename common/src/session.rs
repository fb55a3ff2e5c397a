//! Logged-in user record and screen selection.
//!
//! The session is client-only: presence of a record grants dashboard access.

use serde::{Deserialize, Serialize};

use crate::storage::{KeyValueStore, USER_KEY};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub email: String,
    pub company_name: String,
}

impl Session {
    /// Build a session from login form input. Returns `None` when the email
    /// is blank or has no `@`.
    pub fn new(email: &str, company_name: &str) -> Option<Self> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return None;
        }
        Some(Self {
            email: email.to_string(),
            company_name: company_name.trim().to_string(),
        })
    }

    /// Company name, or the email when no company was given.
    pub fn display_name(&self) -> &str {
        if self.company_name.is_empty() {
            &self.email
        } else {
            &self.company_name
        }
    }
}

/// Read the persisted session. A corrupt record counts as logged out.
pub fn load_session(storage: &impl KeyValueStore) -> Option<Session> {
    let raw = storage.get(USER_KEY)?;
    match serde_json::from_str(&raw) {
        Ok(session) => Some(session),
        Err(e) => {
            tracing::warn!("Stored session unreadable, treating as logged out: {e}");
            None
        }
    }
}

pub fn save_session(storage: &mut impl KeyValueStore, session: &Session) {
    match serde_json::to_string(session) {
        Ok(json) => storage.set(USER_KEY, &json),
        Err(e) => tracing::error!("Failed to serialize session: {e}"),
    }
}

pub fn clear_session(storage: &mut impl KeyValueStore) {
    storage.remove(USER_KEY);
}

/// The three top-level screens, selected by the URL fragment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Screen {
    #[default]
    Landing,
    Login,
    Dashboard,
}

impl Screen {
    /// Parse `#dashboard`, `#/login`, `dashboard`... Unknown → Landing.
    pub fn from_fragment(fragment: &str) -> Self {
        let name = fragment.trim().trim_start_matches('#').trim_start_matches('/');
        match name.to_ascii_lowercase().as_str() {
            "login" => Screen::Login,
            "dashboard" => Screen::Dashboard,
            _ => Screen::Landing,
        }
    }

    pub fn fragment(self) -> &'static str {
        match self {
            Screen::Landing => "#landing",
            Screen::Login => "#login",
            Screen::Dashboard => "#dashboard",
        }
    }
}

/// Apply the session guard to a requested screen.
pub fn resolve_screen(requested: Screen, session: Option<&Session>) -> Screen {
    match (requested, session) {
        (Screen::Dashboard, None) => Screen::Login,
        (Screen::Login, Some(_)) => Screen::Dashboard,
        (screen, _) => screen,
    }
}
