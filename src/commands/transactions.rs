// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use serde::Serialize;

use crate::api::{ApiClient, Transport};
use crate::forms::QuickTransactionForm;
use crate::labels::transaction_type_label;
use crate::models::{PartnerKind, Transaction, TransactionType};
use crate::refresh::{RefreshBus, Resource};
use crate::utils::{date_or_today, fmt_amount, fmt_date, maybe_print_json, parse_decimal, pretty_table};

pub fn handle<T: Transport>(api: &ApiClient<T>, bus: &RefreshBus, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(api, bus, sub)?,
        Some(("list", sub)) => list(api, sub)?,
        _ => {}
    }
    Ok(())
}

pub fn form_from_args(sub: &clap::ArgMatches) -> Result<QuickTransactionForm> {
    let type_str = sub.get_one::<String>("type").unwrap();
    let r#type = TransactionType::from_string(type_str)
        .with_context(|| format!("Unknown transaction type '{}'", type_str))?;
    let partner = match (
        sub.get_one::<String>("customer"),
        sub.get_one::<String>("supplier"),
    ) {
        (Some(id), _) => Some((PartnerKind::Customer, id.clone())),
        (None, Some(id)) => Some((PartnerKind::Supplier, id.clone())),
        (None, None) => None,
    };
    Ok(QuickTransactionForm {
        r#type,
        amount: parse_decimal(sub.get_one::<String>("amount").unwrap())?,
        description: sub.get_one::<String>("description").cloned(),
        date: date_or_today(sub.get_one::<String>("date"))?,
        account: sub.get_one::<String>("account").cloned(),
        partner,
    })
}

fn add<T: Transport>(api: &ApiClient<T>, bus: &RefreshBus, sub: &clap::ArgMatches) -> Result<()> {
    let form = form_from_args(sub)?;
    form.validate().into_result()?;
    api.create_transaction(form.to_payload())
        .map_err(|e| anyhow!(e.user_message()))?;
    bus.publish(Resource::Transactions);
    bus.publish(Resource::Accounts);
    if let Some((kind, _)) = &form.partner {
        bus.publish((*kind).into());
    }
    println!(
        "{} kaydedildi: {} ({})",
        transaction_type_label(form.r#type),
        fmt_amount(&form.amount),
        form.date
    );
    Ok(())
}

fn list<T: Transport>(api: &ApiClient<T>, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(api, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.date.clone(),
                    r.r#type.clone(),
                    r.amount.clone(),
                    r.party.clone(),
                    r.description.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Tarih", "Tür", "Tutar", "Hesap/Cari", "Açıklama"], rows)
        );
    }
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub date: String,
    pub r#type: String,
    pub amount: String,
    pub party: String,
    pub description: String,
}

impl From<&Transaction> for TransactionRow {
    fn from(t: &Transaction) -> Self {
        let party = [&t.account, &t.customer, &t.supplier, &t.source_account]
            .into_iter()
            .flatten()
            .next()
            .map(|r| r.display().to_string())
            .unwrap_or_default();
        Self {
            date: fmt_date(t.date),
            r#type: transaction_type_label(t.r#type).to_string(),
            amount: fmt_amount(&t.amount),
            party,
            description: t.description.clone().unwrap_or_default(),
        }
    }
}

/// `--account` reads the account statement; otherwise the general list,
/// newest first as the server returns it, cut at `--limit`.
pub fn query_rows<T: Transport>(api: &ApiClient<T>, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let limit = sub.get_one::<u32>("limit").copied();
    let txs = match sub.get_one::<String>("account") {
        Some(acc) => api.account_transactions(acc),
        None => {
            let mut query = Vec::new();
            if let Some(l) = limit {
                query.push(("limit".to_string(), l.to_string()));
            }
            api.transactions(query)
        }
    }
    .map_err(|e| anyhow!(e.user_message()))?;
    let mut rows: Vec<TransactionRow> = txs.iter().map(TransactionRow::from).collect();
    if let Some(l) = limit {
        rows.truncate(l as usize);
    }
    Ok(rows)
}
