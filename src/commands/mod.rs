// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};
use rust_decimal::Decimal;

use crate::error::ActionOutcome;
use crate::utils::parse_decimal;

pub mod accounts;
pub mod auth;
pub mod classifiers;
pub mod dashboard;
pub mod invoices;
pub mod partners;
pub mod products;
pub mod transactions;

/// Print a successful outcome, turn a failed one into the command's error.
pub fn report(outcome: ActionOutcome) -> Result<()> {
    match outcome {
        ActionOutcome {
            success: true,
            message,
        } => {
            if let Some(msg) = message {
                println!("{}", msg);
            }
            Ok(())
        }
        ActionOutcome { message, .. } => bail!(
            "{}",
            message.unwrap_or_else(|| crate::error::GENERIC_ERROR_MESSAGE.to_string())
        ),
    }
}

pub fn print_change_note(changed: bool) {
    if changed {
        println!("Not: liste son görüntülemeden bu yana değişti");
    }
}

// `update` overlays only the flags given on the command line onto the
// stored document.

pub(crate) fn overlay_str(target: &mut String, m: &clap::ArgMatches, key: &str) {
    if let Some(v) = m.get_one::<String>(key) {
        *target = v.clone();
    }
}

pub(crate) fn overlay_opt(target: &mut Option<String>, m: &clap::ArgMatches, key: &str) {
    if let Some(v) = m.get_one::<String>(key) {
        *target = Some(v.clone());
    }
}

pub(crate) fn overlay_decimal(target: &mut Decimal, m: &clap::ArgMatches, key: &str) -> Result<()> {
    if let Some(v) = m.get_one::<String>(key) {
        *target = parse_decimal(v)?;
    }
    Ok(())
}
