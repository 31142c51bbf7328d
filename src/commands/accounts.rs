// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow, bail};
use rusqlite::Connection;

use crate::api::{ApiClient, Transport};
use crate::db;
use crate::forms::AccountForm;
use crate::labels::{account_type_label, transaction_type_label};
use crate::models::{Account, AccountType, CariType, PartnerKind};
use crate::money::fmt_money;
use crate::refresh::{RefreshBus, Resource};
use crate::transfer::{self, Party, TransferRequest};
use crate::utils::{date_or_today, fmt_amount, fmt_date, maybe_print_json, parse_decimal, pretty_table};

use super::{overlay_decimal, overlay_str};

const SNAPSHOT_RESOURCE: &str = "accounts";

fn find<T: Transport>(api: &ApiClient<T>, id: &str) -> Result<Account> {
    api.accounts()
        .map_err(|e| anyhow!(e.user_message()))?
        .into_iter()
        .find(|a| a.id == id)
        .with_context(|| format!("Hesap bulunamadı: {}", id))
}

/// Delete an account and keep a snapshot so `undo` can re-create it.
pub fn remove<T: Transport>(api: &ApiClient<T>, conn: &Connection, id: &str) -> Result<Account> {
    let account = find(api, id)?;
    api.delete_account(id)
        .map_err(|e| anyhow!(e.user_message()))?;
    db::push_snapshot(conn, SNAPSHOT_RESOURCE, &serde_json::to_value(&account)?)?;
    Ok(account)
}

/// Re-create the most recently deleted account. The snapshot is only dropped
/// once the server accepted it.
pub fn undo<T: Transport>(api: &ApiClient<T>, conn: &Connection) -> Result<Account> {
    let Some((snap_id, payload)) = db::peek_snapshot(conn, SNAPSHOT_RESOURCE)? else {
        bail!("Geri alınacak silme işlemi yok");
    };
    let deleted: Account = serde_json::from_value(payload)
        .with_context(|| format!("Invalid account snapshot #{}", snap_id))?;
    let created = api
        .create_account(AccountForm::restore_payload(&deleted))
        .map_err(|e| anyhow!(e.user_message()))?;
    db::drop_snapshot(conn, snap_id)?;
    Ok(created)
}

fn form_from_args(m: &clap::ArgMatches) -> Result<AccountForm> {
    let r#type = parse_account_type(m.get_one::<String>("type").unwrap())?;
    let cari_type = parse_cari_type(m.get_one::<String>("cari-type").map(String::as_str))?;
    Ok(AccountForm {
        name: m.get_one::<String>("name").cloned().unwrap_or_default(),
        r#type,
        cari_type,
        balance: parse_decimal(m.get_one::<String>("balance").map(String::as_str).unwrap_or("0"))?,
        currency: m.get_one::<String>("currency").cloned().unwrap_or_else(|| "TRY".into()),
    })
}

fn parse_account_type(raw: &str) -> Result<AccountType> {
    AccountType::from_string(raw).with_context(|| format!("Unknown account type '{}'", raw))
}

fn parse_cari_type(raw: Option<&str>) -> Result<Option<CariType>> {
    Ok(match raw {
        Some("customer") => Some(CariType::Customer),
        Some("supplier") => Some(CariType::Supplier),
        Some(other) => bail!("Unknown cari type '{}'", other),
        None => None,
    })
}

/// The stored account with the given flags applied on top. Moving an
/// account off the cari type drops its cari type.
pub fn update_form(current: &Account, m: &clap::ArgMatches) -> Result<AccountForm> {
    let mut form = AccountForm::from(current);
    overlay_str(&mut form.name, m, "name");
    if let Some(t) = m.get_one::<String>("type") {
        form.r#type = parse_account_type(t)?;
        if form.r#type != AccountType::Cari {
            form.cari_type = None;
        }
    }
    if let Some(ct) = parse_cari_type(m.get_one::<String>("cari-type").map(String::as_str))? {
        form.cari_type = Some(ct);
    }
    overlay_decimal(&mut form.balance, m, "balance")?;
    overlay_str(&mut form.currency, m, "currency");
    Ok(form)
}

pub fn transfer_request(m: &clap::ArgMatches) -> Result<TransferRequest> {
    let party = |key: &str| -> Result<Party> {
        let raw = m.get_one::<String>(key).unwrap();
        Party::parse(raw).with_context(|| {
            format!("Invalid party '{}', expected account:<id>, customer:<id> or supplier:<id>", raw)
        })
    };
    Ok(TransferRequest {
        source: party("from")?,
        target: party("to")?,
        amount: parse_decimal(m.get_one::<String>("amount").unwrap())?,
        description: m.get_one::<String>("description").cloned(),
        date: date_or_today(m.get_one::<String>("date"))?,
    })
}

pub fn handle<T: Transport>(
    api: &ApiClient<T>,
    bus: &RefreshBus,
    conn: &Connection,
    m: &clap::ArgMatches,
) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let form = form_from_args(sub)?;
            form.validate().into_result()?;
            let created = api
                .create_account(form.to_payload())
                .map_err(|e| anyhow!(e.user_message()))?;
            match form.cari_type {
                Some(ct) if form.r#type == AccountType::Cari => bus.publish_cari_created(ct),
                _ => {
                    bus.publish(Resource::Accounts);
                }
            }
            println!(
                "Hesap eklendi: {} ({}, {})",
                created.name,
                account_type_label(created.r#type),
                created.currency
            );
        }
        Some(("list", sub)) => {
            let accounts = api.accounts().map_err(|e| anyhow!(e.user_message()))?;
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &accounts)? {
                return Ok(());
            }
            let data = accounts
                .iter()
                .map(|a| {
                    let cari = match a.cari_type.map(PartnerKind::from) {
                        Some(PartnerKind::Customer) => "Müşteri",
                        Some(PartnerKind::Supplier) => "Tedarikçi",
                        None => "",
                    };
                    vec![
                        a.name.clone(),
                        account_type_label(a.r#type).to_string(),
                        cari.to_string(),
                        fmt_money(&a.balance, &a.currency),
                        a.id.clone(),
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(&["Ad", "Tür", "Cari Türü", "Bakiye", "ID"], data)
            );
        }
        Some(("update", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            let current = find(api, id)?;
            let form = update_form(&current, sub)?;
            form.validate().into_result()?;
            let updated = api
                .update_account(id, form.to_payload())
                .map_err(|e| anyhow!(e.user_message()))?;
            bus.publish(Resource::Accounts);
            if let Some(ct) = updated.cari_type {
                bus.publish(PartnerKind::from(ct).into());
            }
            println!("Hesap güncellendi: {}", updated.name);
        }
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            let removed = remove(api, conn, id)?;
            bus.publish(Resource::Accounts);
            println!("Hesap silindi: {} (geri almak için: account undo)", removed.name);
        }
        Some(("undo", _)) => {
            let restored = undo(api, conn)?;
            match restored.cari_type {
                Some(ct) => bus.publish_cari_created(ct),
                None => {
                    bus.publish(Resource::Accounts);
                }
            }
            println!("Hesap geri yüklendi: {}", restored.name);
        }
        Some(("statement", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            let txs = api
                .account_transactions(id)
                .map_err(|e| anyhow!(e.user_message()))?;
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &txs)? {
                return Ok(());
            }
            let data = txs
                .iter()
                .map(|t| {
                    vec![
                        fmt_date(t.date),
                        transaction_type_label(t.r#type).to_string(),
                        fmt_amount(&t.amount),
                        t.description.clone().unwrap_or_default(),
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(&["Tarih", "Tür", "Tutar", "Açıklama"], data)
            );
        }
        Some(("transfer", sub)) => {
            let req = transfer_request(sub)?;
            transfer::execute(api, &req).map_err(|e| anyhow!(e.user_message()))?;
            bus.publish(Resource::Accounts);
            bus.publish(Resource::Transactions);
            for party in [&req.source, &req.target] {
                match party {
                    Party::Customer(_) => {
                        bus.publish(Resource::Customers);
                    }
                    Party::Supplier(_) => {
                        bus.publish(Resource::Suppliers);
                    }
                    Party::Account(_) => {}
                }
            }
            println!("Transfer tamamlandı: {}", fmt_amount(&req.amount));
        }
        _ => {}
    }
    Ok(())
}
