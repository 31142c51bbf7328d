// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use tracing::warn;

use crate::api::{ApiClient, Transport};
use crate::csv_io;
use crate::debt::{self, describe_balance};
use crate::error::ActionOutcome;
use crate::forms::PartnerForm;
use crate::listing::{ListState, SortOrder};
use crate::models::{DebtSummary, Partner, PartnerKind};
use crate::refresh::RefreshBus;
use crate::utils::{date_or_today, maybe_print_json, parse_decimal, pretty_table, today};

use super::{overlay_opt, overlay_str, print_change_note, report};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerRow {
    #[serde(flatten)]
    pub partner: Partner,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debt: Option<DebtSummary>,
    /// Why the balance could not be fetched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debt_error: Option<String>,
}

pub struct PartnerListing {
    pub rows: Vec<PartnerRow>,
    pub changed: bool,
}

impl PartnerListing {
    /// Distinct debt lookup failures, in row order.
    pub fn debt_errors(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for msg in self.rows.iter().filter_map(|r| r.debt_error.as_deref()) {
            if !out.contains(&msg) {
                out.push(msg);
            }
        }
        out
    }
}

pub fn query_rows<T: Transport>(
    api: &ApiClient<T>,
    bus: &RefreshBus,
    kind: PartnerKind,
    m: &clap::ArgMatches,
) -> Result<PartnerListing> {
    let mut state: ListState<Partner> = ListState::new(kind.into());
    if let Some(term) = m.get_one::<String>("search") {
        state.set_search(term);
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
        .refresh_tracked(api, bus)
        .map_err(|e| anyhow!(e.user_message()))?;

    let with_debt = m.get_flag("with-debt");
    let mut rows = Vec::with_capacity(state.items.len());
    for partner in state.items.drain(..) {
        let (debt, debt_error) = if with_debt {
            match api.partner_debt(kind, &partner.id) {
                Ok(d) => (Some(d), None),
                Err(e) => {
                    warn!(partner = %partner.id, error = %e, "debt lookup failed");
                    (None, Some(e.user_message()))
                }
            }
        } else {
            (None, None)
        };
        rows.push(PartnerRow {
            partner,
            debt,
            debt_error,
        });
    }
    Ok(PartnerListing {
        rows,
        changed: state.changed_since_last_view(),
    })
}

fn form_from_args(m: &clap::ArgMatches) -> PartnerForm {
    PartnerForm {
        name: m.get_one::<String>("name").cloned().unwrap_or_default(),
        email: m.get_one::<String>("email").cloned(),
        phone: m.get_one::<String>("phone").cloned(),
        address: m.get_one::<String>("address").cloned(),
        tax_number: m.get_one::<String>("tax-number").cloned(),
        tax_office: m.get_one::<String>("tax-office").cloned(),
    }
}

/// The stored partner with the given flags applied on top.
pub fn update_form(current: &Partner, m: &clap::ArgMatches) -> PartnerForm {
    let mut form = PartnerForm::from(current);
    overlay_str(&mut form.name, m, "name");
    overlay_opt(&mut form.email, m, "email");
    overlay_opt(&mut form.phone, m, "phone");
    overlay_opt(&mut form.address, m, "address");
    overlay_opt(&mut form.tax_number, m, "tax-number");
    overlay_opt(&mut form.tax_office, m, "tax-office");
    form
}

fn noun(kind: PartnerKind) -> &'static str {
    match kind {
        PartnerKind::Customer => "Müşteri",
        PartnerKind::Supplier => "Tedarikçi",
    }
}

pub fn handle<T: Transport>(
    api: &ApiClient<T>,
    bus: &RefreshBus,
    kind: PartnerKind,
    m: &clap::ArgMatches,
) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => {
            let listing = query_rows(api, bus, kind, sub)?;
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &listing.rows)? {
                return Ok(());
            }
            let data = listing
                .rows
                .iter()
                .map(|r| {
                    vec![
                        r.partner.name.clone(),
                        r.partner.phone.clone().unwrap_or_default(),
                        r.partner.email.clone().unwrap_or_default(),
                        r.partner.tax_number.clone().unwrap_or_default(),
                        r.debt
                            .as_ref()
                            .map(|d| describe_balance(kind, d, "TRY"))
                            .unwrap_or_default(),
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(&["Ad", "Telefon", "E-posta", "Vergi No", "Bakiye"], data)
            );
            for msg in listing.debt_errors() {
                println!("Bakiye alınamadı: {}", msg);
            }
            print_change_note(listing.changed);
        }
        Some(("add", sub)) => {
            let form = form_from_args(sub);
            form.validate().into_result()?;
            let created = api
                .create_partner(kind, form.to_payload())
                .map_err(|e| anyhow!(e.user_message()))?;
            bus.publish(kind.into());
            println!("{} eklendi: {} ({})", noun(kind), created.name, created.id);
        }
        Some(("update", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            let current = api
                .partners(kind)
                .map_err(|e| anyhow!(e.user_message()))?
                .into_iter()
                .find(|p| p.id == *id)
                .with_context(|| format!("{} bulunamadı: {}", noun(kind), id))?;
            let form = update_form(&current, sub);
            form.validate().into_result()?;
            let updated = api
                .update_partner(kind, id, form.to_payload())
                .map_err(|e| anyhow!(e.user_message()))?;
            bus.publish(kind.into());
            println!("{} güncellendi: {}", noun(kind), updated.name);
        }
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            let result = api.delete_partner(kind, id);
            report(ActionOutcome::from_api(&result, &format!("{} silindi", noun(kind))))?;
            bus.publish(kind.into());
        }
        Some(("debt", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            let summary = api
                .partner_debt(kind, id)
                .map_err(|e| anyhow!(e.user_message()))?;
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &summary)? {
                return Ok(());
            }
            println!(
                "{}",
                pretty_table(
                    &["Toplam", "Ödenen", "Kalan"],
                    vec![vec![
                        crate::utils::fmt_amount(&summary.total_amount),
                        crate::utils::fmt_amount(&summary.total_paid),
                        describe_balance(kind, &summary, "TRY"),
                    ]],
                )
            );
        }
        Some(("adjust", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            let target = parse_decimal(sub.get_one::<String>("target").unwrap())?;
            let date = date_or_today(sub.get_one::<String>("date"))?;
            let note = sub.get_one::<String>("note").map(String::as_str);
            let (adj, after) = debt::reconcile(api, kind, id, target, date, note)
                .map_err(|e| anyhow!(e.user_message()))?;
            match adj {
                Some(adj) => {
                    bus.publish(kind.into());
                    bus.publish(crate::refresh::Resource::Transactions);
                    println!(
                        "Düzeltme kaydedildi ({:?} {}). Yeni bakiye: {}",
                        adj.r#type,
                        crate::utils::fmt_amount(&adj.amount),
                        describe_balance(kind, &after, "TRY")
                    );
                }
                None => println!(
                    "Bakiye zaten hedefte: {}",
                    describe_balance(kind, &after, "TRY")
                ),
            }
        }
        Some(("export", sub)) => {
            let dir = Path::new(sub.get_one::<String>("dir").unwrap());
            let partners = api.partners(kind).map_err(|e| anyhow!(e.user_message()))?;
            let prefix = match kind {
                PartnerKind::Customer => "musteriler",
                PartnerKind::Supplier => "tedarikciler",
            };
            let path = csv_io::export_to_dir(
                dir,
                prefix,
                today(),
                &csv_io::PARTNER_HEADERS,
                &csv_io::partner_rows(&partners),
            )?;
            println!("{} kayıt dışa aktarıldı: {}", partners.len(), path.display());
        }
        _ => {}
    }
    Ok(())
}
