//! Launch configuration: API base address and user identity
//!
//! Mirrors how the mini-app is opened: the chat platform embeds the user id,
//! and keyboard-launched sessions pass `user_id` / `api_url` as query
//! parameters of the launch URL instead.

use url::Url;

use crate::types::{HabitcalError, Result, UserId};

/// API base used when nothing else is configured
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8080";

pub const ENV_API_URL: &str = "HABITCAL_API_URL";
pub const ENV_USER_ID: &str = "HABITCAL_USER_ID";

/// Raw launch inputs, as given on the command line
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    /// Explicit API base (`--api-url`)
    pub api_url: Option<String>,
    /// Platform-provided user id (`--user-id`)
    pub user_id: Option<i64>,
    /// Full mini-app launch URL (`--launch-url`)
    pub launch_url: Option<String>,
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    pub api_base: String,
    /// `None` when no source identified the user
    pub user: Option<UserId>,
}

impl LaunchConfig {
    /// Resolve from command-line options and the process environment
    pub fn resolve(options: &LaunchOptions) -> Result<Self> {
        Self::resolve_with(options, |key| std::env::var(key).ok())
    }

    /// Resolve with an explicit environment lookup
    pub fn resolve_with(
        options: &LaunchOptions,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let launch = options
            .launch_url
            .as_deref()
            .map(LaunchParams::parse)
            .transpose()?
            .unwrap_or_default();

        let api_base = options
            .api_url
            .clone()
            .or(launch.api_url)
            .or_else(|| env(ENV_API_URL))
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let user = options
            .user_id
            .and_then(UserId::new)
            .or(launch.user)
            .or_else(|| env(ENV_USER_ID).as_deref().and_then(UserId::parse));

        if user.is_none() {
            tracing::warn!("user id could not be resolved");
        }

        Ok(Self {
            api_base: api_base.trim().trim_end_matches('/').to_string(),
            user,
        })
    }
}

/// Query parameters of a launch URL
#[derive(Debug, Default)]
struct LaunchParams {
    api_url: Option<String>,
    user: Option<UserId>,
}

impl LaunchParams {
    fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw)
            .map_err(|e| HabitcalError::Config(format!("invalid launch URL '{}': {}", raw, e)))?;

        let mut params = Self::default();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "api_url" if !value.is_empty() => params.api_url = Some(value.into_owned()),
                "user_id" => params.user = UserId::parse(&value),
                _ => {}
            }
        }
        Ok(params)
    }
}
