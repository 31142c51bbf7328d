// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use clap::ArgMatches;
use rusqlite::Connection;
use tracing_subscriber::EnvFilter;

use carihesap::api::{ApiClient, HttpTransport};
use carihesap::config::Config;
use carihesap::models::PartnerKind;
use carihesap::refresh::{RefreshBus, Resource};
use carihesap::{cli, commands, db};

const LOG_ENV: &str = "CARIHESAP_LOG";

/// `CARIHESAP_LOG`, then `RUST_LOG`, else warnings only. Logs go to stderr
/// so tables and JSON on stdout stay clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let conn = db::open_or_init()?;
    if let Some(("init", _)) = matches.subcommand() {
        println!("Database initialized at {}", db::db_path()?.display());
        return Ok(());
    }
    if let Some(("config", sub)) = matches.subcommand() {
        return commands::auth::handle_config(&conn, sub);
    }

    let config = Config::load(&conn)?;
    tracing::debug!(api_url = %config.api_url, "loaded config");
    let mut api = config.client()?;
    let bus = RefreshBus::load(&conn)?;

    let result = dispatch(&matches, &mut api, &bus, &conn);
    // mutations that succeeded before a failure still invalidate lists
    bus.save(&conn)?;
    result
}

fn dispatch(
    matches: &ArgMatches,
    api: &mut ApiClient<HttpTransport>,
    bus: &RefreshBus,
    conn: &Connection,
) -> Result<()> {
    match matches.subcommand() {
        Some(("login", sub)) => commands::auth::login(api, conn, sub)?,
        Some(("logout", _)) => commands::auth::logout(api, conn)?,
        Some(("product", sub)) => commands::products::handle(api, bus, sub)?,
        Some(("customer", sub)) => {
            commands::partners::handle(api, bus, PartnerKind::Customer, sub)?
        }
        Some(("supplier", sub)) => {
            commands::partners::handle(api, bus, PartnerKind::Supplier, sub)?
        }
        Some(("account", sub)) => commands::accounts::handle(api, bus, conn, sub)?,
        Some(("invoice", sub)) => commands::invoices::handle(api, bus, sub)?,
        Some(("category", sub)) => {
            commands::classifiers::handle(api, bus, Resource::Categories, sub)?
        }
        Some(("brand", sub)) => commands::classifiers::handle(api, bus, Resource::Brands, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(api, bus, sub)?,
        Some(("dashboard", sub)) => commands::dashboard::handle(api, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
