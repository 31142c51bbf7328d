// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::api::{ApiClient, HttpTransport};
use crate::db;

pub const API_URL_ENV: &str = "CARIHESAP_API_URL";
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

pub const KEY_API_URL: &str = "api_url";
pub const KEY_TOKEN: &str = "token";
pub const KEY_TIMEOUT: &str = "timeout_secs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Config {
    /// Environment beats the stored setting, which beats the default.
    pub fn load(conn: &Connection) -> Result<Self> {
        let env_url = std::env::var(API_URL_ENV)
            .ok()
            .filter(|s| !s.trim().is_empty());
        let api_url = match env_url {
            Some(u) => u,
            None => db::get_setting(conn, KEY_API_URL)?.unwrap_or_else(|| DEFAULT_API_URL.into()),
        };
        let timeout_secs = match db::get_setting(conn, KEY_TIMEOUT)? {
            Some(s) => s
                .trim()
                .parse::<u64>()
                .with_context(|| format!("Invalid stored timeout '{}'", s))?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            token: db::get_setting(conn, KEY_TOKEN)?,
            timeout_secs,
        })
    }

    pub fn client(&self) -> Result<ApiClient<HttpTransport>> {
        let transport = HttpTransport::new(&self.api_url, self.token.clone(), self.timeout_secs)
            .context("Failed to build HTTP client")?;
        Ok(ApiClient::new(transport))
    }
}
