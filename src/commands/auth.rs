// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};
use rusqlite::Connection;

use crate::api::{ApiClient, Transport};
use crate::config::{self, Config};
use crate::db;

pub fn login<T: Transport>(
    api: &mut ApiClient<T>,
    conn: &Connection,
    m: &clap::ArgMatches,
) -> Result<()> {
    let username = m.get_one::<String>("username").unwrap();
    let password = m.get_one::<String>("password").unwrap();
    let token = api
        .login(username, password)
        .map_err(|e| anyhow!(e.user_message()))?;
    db::set_setting(conn, config::KEY_TOKEN, &token)?;
    println!("Giriş yapıldı: {}", username);
    Ok(())
}

pub fn logout<T: Transport>(api: &mut ApiClient<T>, conn: &Connection) -> Result<()> {
    api.logout();
    db::clear_setting(conn, config::KEY_TOKEN)?;
    println!("Oturum kapatıldı");
    Ok(())
}

/// `config set-url|set-timeout|show`
pub fn handle_config(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set-url", sub)) => {
            let url = sub.get_one::<String>("url").unwrap().trim();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(anyhow!("URL must start with http:// or https://"));
            }
            db::set_setting(conn, config::KEY_API_URL, url.trim_end_matches('/'))?;
            println!("API URL set to {}", url);
        }
        Some(("set-timeout", sub)) => {
            let secs = *sub.get_one::<u64>("secs").unwrap();
            if secs == 0 {
                return Err(anyhow!("Timeout must be at least one second"));
            }
            db::set_setting(conn, config::KEY_TIMEOUT, &secs.to_string())?;
            println!("Timeout set to {}s", secs);
        }
        Some(("show", _)) => {
            let cfg = Config::load(conn)?;
            println!("api_url      {}", cfg.api_url);
            println!("timeout_secs {}", cfg.timeout_secs);
            println!(
                "token        {}",
                if cfg.token.is_some() { "stored" } else { "-" }
            );
            println!("db           {}", db::db_path()?.display());
        }
        _ => {}
    }
    Ok(())
}
