//! services/api/src/adapters/judge.rs
//!
//! HTTP adapter for public coding-judge profile APIs. The service runs two of these,
//! a primary and a fallback, each pointed at a different mirror.

use async_trait::async_trait;
use coursehub_core::payload::JudgeProfile;
use coursehub_core::ports::{JudgeProfileService, PortError, PortResult};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub struct HttpJudgeAdapter {
    client: Client,
    name: String,
    base_url: String,
}

impl HttpJudgeAdapter {
    pub fn new(client: Client, name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Builds the shared outbound client used by every judge adapter.
    pub fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
        Client::builder()
            .timeout(timeout)
            .user_agent(concat!("coursehub/", env!("CARGO_PKG_VERSION")))
            .build()
    }

    fn profile_url(&self, username: &str) -> String {
        format!("{}/{}", self.base_url, username)
    }
}

/// Judge usernames are short ASCII handles; anything else never reaches the network.
pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username.len() <= 64
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
}

#[async_trait]
impl JudgeProfileService for HttpJudgeAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_profile(&self, username: &str) -> PortResult<JudgeProfile> {
        if !is_valid_username(username) {
            return Err(PortError::NotFound(format!(
                "'{}' is not a valid judge username",
                username
            )));
        }

        let url = self.profile_url(username);
        debug!(source = %self.name, %url, "Fetching judge profile");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PortError::Unavailable(format!("{}: {}", self.name, e)))?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(PortError::NotFound(format!(
                    "{} has no profile for '{}'",
                    self.name, username
                )))
            }
            status if !status.is_success() => {
                return Err(PortError::Unavailable(format!(
                    "{} answered with status {}",
                    self.name, status
                )))
            }
            _ => {}
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(format!("{}: unreadable body: {}", self.name, e)))?;

        let profile = JudgeProfile::from_value(&body);
        if profile.is_empty() {
            return Err(PortError::NotFound(format!(
                "{} returned no statistics for '{}'",
                self.name, username
            )));
        }
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_validation() {
        assert!(is_valid_username("neal_wu"));
        assert!(is_valid_username("lee-215.dev"));
        assert!(!is_valid_username(""));
        assert!(!is_valid_username("../admin"));
        assert!(!is_valid_username("has space"));
        assert!(!is_valid_username(&"x".repeat(65)));
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let adapter = HttpJudgeAdapter::new(Client::new(), "primary", "https://judge.example/");
        assert_eq!(adapter.profile_url("alice"), "https://judge.example/alice");
    }
}
