// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};

use crate::api::{ApiClient, Transport};
use crate::dashboard::DashboardSummary;
use crate::utils::{fmt_amount, maybe_print_json, pretty_table};

pub fn summary<T: Transport>(api: &ApiClient<T>) -> Result<DashboardSummary> {
    let products = api.products().map_err(|e| anyhow!(e.user_message()))?;
    let invoices = api.invoices().map_err(|e| anyhow!(e.user_message()))?;
    let accounts = api.accounts().map_err(|e| anyhow!(e.user_message()))?;
    Ok(DashboardSummary::build(&products, &invoices, &accounts))
}

pub fn handle<T: Transport>(api: &ApiClient<T>, m: &clap::ArgMatches) -> Result<()> {
    let s = summary(api)?;
    if maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &s)? {
        return Ok(());
    }
    let mut rows = vec![
        vec!["Ürün sayısı".to_string(), s.product_count.to_string()],
        vec!["Stok değeri".to_string(), fmt_amount(&s.stock_value)],
        vec!["Kritik stok".to_string(), s.critical_products.len().to_string()],
        vec!["Açık alacak".to_string(), fmt_amount(&s.open_receivables)],
        vec!["Açık borç".to_string(), fmt_amount(&s.open_payables)],
        vec!["Kasa/banka toplamı".to_string(), fmt_amount(&s.cash_position)],
    ];
    for (status, n) in &s.invoices_by_status {
        rows.push(vec![format!("Fatura ({})", status), n.to_string()]);
    }
    println!("{}", pretty_table(&["Gösterge", "Değer"], rows));
    if !s.critical_products.is_empty() {
        println!("Kritik: {}", s.critical_products.join(", "));
    }
    Ok(())
}
