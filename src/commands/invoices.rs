// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde_json::json;

use crate::api::{ApiClient, Transport};
use crate::csv_io;
use crate::error::ActionOutcome;
use crate::invoice::InvoiceForm;
use crate::invoice::workflow::{InvoiceWorkflow, PaymentDialog, allowed_actions};
use crate::labels::{payment_status_label, status_label, type_label};
use crate::listing::{ListState, SortOrder};
use crate::models::{Invoice, InvoiceType};
use crate::money::fmt_money;
use crate::refresh::{RefreshBus, Resource};
use crate::utils::{fmt_amount, fmt_date, maybe_print_json, parse_decimal, pretty_table, today};

use super::{print_change_note, report};

pub fn list_state(m: &clap::ArgMatches) -> ListState<Invoice> {
    let mut state = ListState::new(Resource::Invoices);
    if let Some(term) = m.get_one::<String>("search") {
        state.set_search(term);
    }
    if let Some(status) = m.get_one::<String>("status") {
        state.set_filter("status", status);
    }
    if let Some(t) = m.get_one::<String>("type") {
        state.set_filter("invoiceType", t);
    }
    if let Some(field) = m.get_one::<String>("sort") {
        let order = m.get_one::<String>("order").map(String::as_str).unwrap_or("asc");
        state.set_sort(field, SortOrder::from_string(order));
    }
    if let Some(limit) = m.get_one::<u32>("limit") {
        state.query.limit = *limit;
    }
    if let Some(page) = m.get_one::<u32>("page") {
        state.set_page(*page);
    }
    state
}

/// Read an invoice form from a JSON file. A missing number is suggested from
/// the current time and a missing date defaults to today. The type is left
/// as given: `create` defaults it to a sale, `update` keeps the stored one.
pub fn load_form(path: &Path) -> Result<InvoiceForm> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Form dosyası okunamadı: {}", path.display()))?;
    let mut form: InvoiceForm = serde_json::from_str(&text)
        .with_context(|| format!("Geçersiz fatura formu: {}", path.display()))?;
    if form.invoice_number.trim().is_empty() {
        let now = chrono::Local::now().naive_local();
        form.invoice_number = crate::invoice::suggest_invoice_number(now);
    }
    if form.date.is_none() {
        form.date = Some(today());
    }
    Ok(form)
}

fn fetch<T: Transport>(api: &ApiClient<T>, m: &clap::ArgMatches) -> Result<Invoice> {
    let id = m.get_one::<String>("id").unwrap();
    api.invoice(id).map_err(|e| anyhow!(e.user_message()))
}

/// Stock and balances move with every status change.
fn publish_status_change(bus: &RefreshBus) {
    for r in [
        Resource::Invoices,
        Resource::Products,
        Resource::Accounts,
        Resource::Transactions,
        Resource::Customers,
        Resource::Suppliers,
    ] {
        bus.publish(r);
    }
}

fn print_invoice(inv: &Invoice, admin: bool) {
    println!(
        "{} | {} | {} | {}",
        inv.invoice_number,
        type_label(inv.invoice_type),
        status_label(inv.status),
        payment_status_label(inv.payment_status)
    );
    println!(
        "Cari: {}   Tarih: {}   Vade: {}",
        inv.customer_or_supplier.display(),
        fmt_date(inv.date),
        fmt_date(inv.due_date)
    );
    let data = inv
        .products
        .iter()
        .map(|l| {
            vec![
                l.product.display().to_string(),
                fmt_amount(&l.quantity),
                fmt_amount(&l.unit_price),
                format!("%{}", l.tax_rate.normalize()),
                fmt_amount(&(l.quantity * l.unit_price)),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Ürün", "Miktar", "Birim Fiyat", "KDV", "Tutar"], data)
    );
    println!(
        "Toplam: {}   Ödenen: {}   Kalan: {}",
        fmt_money(&inv.total_amount, &inv.currency),
        fmt_money(&inv.paid_amount, &inv.currency),
        fmt_money(&inv.remaining(), &inv.currency)
    );
    let actions: Vec<&str> = allowed_actions(inv.status, inv.invoice_type, admin)
        .iter()
        .map(|a| a.label())
        .collect();
    if !actions.is_empty() {
        println!("İşlemler: {}", actions.join(", "));
    }
}

pub fn handle<T: Transport>(api: &ApiClient<T>, bus: &RefreshBus, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => {
            let mut state = list_state(sub);
            state
                .refresh_tracked(api, bus)
                .map_err(|e| anyhow!(e.user_message()))?;
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &state.items)? {
                return Ok(());
            }
            let data = state
                .items
                .iter()
                .map(|inv| {
                    vec![
                        inv.invoice_number.clone(),
                        type_label(inv.invoice_type).to_string(),
                        inv.customer_or_supplier.display().to_string(),
                        fmt_date(inv.date),
                        status_label(inv.status).to_string(),
                        fmt_money(&inv.total_amount, &inv.currency),
                        inv.id.clone(),
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(&["No", "Tür", "Cari", "Tarih", "Durum", "Toplam", "ID"], data)
            );
            println!("Sayfa {}/{}", state.query.page.min(state.total_pages), state.total_pages);
            print_change_note(state.changed_since_last_view());
        }
        Some(("show", sub)) => {
            let inv = fetch(api, sub)?;
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &inv)? {
                return Ok(());
            }
            print_invoice(&inv, false);
        }
        Some(("create", sub)) => {
            let mut form = load_form(Path::new(sub.get_one::<String>("file").unwrap()))?;
            form.invoice_type.get_or_insert(InvoiceType::Sale);
            if let Some(n) = sub.get_one::<String>("number") {
                form.invoice_number = n.clone();
            }
            form.validate().into_result()?;
            let created = api
                .create_invoice(form.to_payload())
                .map_err(|e| anyhow!(e.user_message()))?;
            bus.publish(Resource::Invoices);
            println!(
                "Fatura oluşturuldu: {} ({})",
                created.invoice_number,
                status_label(created.status)
            );
        }
        Some(("update", sub)) => {
            let mut form = load_form(Path::new(sub.get_one::<String>("file").unwrap()))?;
            let id = sub.get_one::<String>("id").unwrap();
            let current = fetch(api, sub)?;
            form.invoice_type.get_or_insert(current.invoice_type);
            form.validate().into_result()?;
            let updated = api
                .update_invoice(id, form.to_payload())
                .map_err(|e| anyhow!(e.user_message()))?;
            bus.publish(Resource::Invoices);
            println!("Fatura güncellendi: {}", updated.invoice_number);
        }
        Some(("totals", sub)) => {
            let form = load_form(Path::new(sub.get_one::<String>("file").unwrap()))?;
            let totals = form.totals();
            let errors = form.validate();
            let out = json!({
                "subtotal": fmt_amount(&totals.subtotal),
                "tax": fmt_amount(&totals.tax),
                "grandTotal": fmt_amount(&totals.grand_total),
                "valid": errors.is_empty(),
                "errors": errors,
            });
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &out)? {
                return Ok(());
            }
            let ccy = form.currency.as_deref().unwrap_or("TRY");
            println!("Ara Toplam: {}", fmt_money(&totals.subtotal, ccy));
            println!("KDV:        {}", fmt_money(&totals.tax, ccy));
            println!("Genel:      {}", fmt_money(&totals.grand_total, ccy));
            for (field, msg) in errors.iter() {
                println!("  {}: {}", field, msg);
            }
        }
        Some(("actions", sub)) => {
            let inv = fetch(api, sub)?;
            let admin = sub.get_flag("admin");
            for a in allowed_actions(inv.status, inv.invoice_type, admin) {
                println!("{}\t{}", a.as_str(), a.label());
            }
        }
        Some(("approve", sub)) => {
            let inv = fetch(api, sub)?;
            InvoiceWorkflow::new(api)
                .approve(&inv)
                .map_err(|e| anyhow!(e.user_message()))?;
            publish_status_change(bus);
            println!("Fatura onaylandı: {}", inv.invoice_number);
        }
        Some(("revert", sub)) => {
            let inv = fetch(api, sub)?;
            InvoiceWorkflow::new(api)
                .as_admin(sub.get_flag("admin"))
                .revert(&inv)
                .map_err(|e| anyhow!(e.user_message()))?;
            publish_status_change(bus);
            println!("Fatura geri alındı: {}", inv.invoice_number);
        }
        Some(("pay", sub)) => {
            let inv = fetch(api, sub)?;
            let accounts = api.accounts().map_err(|e| anyhow!(e.user_message()))?;
            let mut dialog = PaymentDialog::for_invoice(&inv);
            if let Some(raw) = sub.get_one::<String>("amount") {
                dialog.amount = parse_decimal(raw)?;
            }
            dialog.account_id = sub.get_one::<String>("account").cloned();
            dialog.description = sub.get_one::<String>("description").cloned();
            InvoiceWorkflow::new(api)
                .settle(&inv, &dialog, &accounts)
                .map_err(|e| anyhow!(e.user_message()))?;
            publish_status_change(bus);
            println!(
                "Ödeme kaydedildi: {} {}",
                inv.invoice_number,
                fmt_money(&dialog.amount, &inv.currency)
            );
        }
        Some(("cancel", sub)) => {
            let inv = fetch(api, sub)?;
            InvoiceWorkflow::new(api)
                .cancel(&inv)
                .map_err(|e| anyhow!(e.user_message()))?;
            publish_status_change(bus);
            println!("Fatura iptal edildi: {}", inv.invoice_number);
        }
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            report(ActionOutcome::from_api(&api.delete_invoice(id), "Fatura silindi"))?;
            bus.publish(Resource::Invoices);
        }
        Some(("export", sub)) => {
            let dir = Path::new(sub.get_one::<String>("dir").unwrap());
            let invoices = api.invoices().map_err(|e| anyhow!(e.user_message()))?;
            let path = csv_io::export_to_dir(
                dir,
                "faturalar",
                today(),
                &csv_io::INVOICE_HEADERS,
                &csv_io::invoice_rows(&invoices),
            )?;
            println!("{} fatura dışa aktarıldı: {}", invoices.len(), path.display());
        }
        _ => {}
    }
    Ok(())
}
