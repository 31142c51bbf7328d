// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Cari balance display and manual debt adjustments.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tracing::info;

use crate::api::{ApiClient, Transport};
use crate::error::ApiResult;
use crate::models::{DebtSummary, PartnerKind, TransactionType};
use crate::money;

pub const ALACAK: &str = "ALACAK";
pub const VERECEK: &str = "VERECEK";
pub const SETTLED: &str = "BAKİYE YOK";

/// A customer with an open amount owes us (ALACAK); a supplier with an open
/// amount is owed by us (VERECEK). Negative amounts flip the label.
pub fn balance_label(kind: PartnerKind, unpaid: Decimal) -> &'static str {
    if unpaid.is_zero() {
        return SETTLED;
    }
    let positive = unpaid > Decimal::ZERO;
    match (kind, positive) {
        (PartnerKind::Customer, true) | (PartnerKind::Supplier, false) => ALACAK,
        (PartnerKind::Customer, false) | (PartnerKind::Supplier, true) => VERECEK,
    }
}

/// `"1250.00 TRY ALACAK"` style text for tables.
pub fn describe_balance(kind: PartnerKind, summary: &DebtSummary, currency: &str) -> String {
    let unpaid = summary.unpaid_amount();
    if unpaid.is_zero() {
        return SETTLED.to_string();
    }
    format!(
        "{} {}",
        money::fmt_money(&unpaid.abs(), currency),
        balance_label(kind, unpaid)
    )
}

/// Transaction needed to move a cari from `current` to `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct Adjustment {
    pub r#type: TransactionType,
    pub amount: Decimal,
}

/// Raising what a customer owes is booked as income on the cari, lowering it
/// as expense; suppliers mirror that.
pub fn plan_adjustment(kind: PartnerKind, current: Decimal, target: Decimal) -> Option<Adjustment> {
    let delta = target - current;
    if delta.is_zero() {
        return None;
    }
    let increase = delta > Decimal::ZERO;
    let r#type = match (kind, increase) {
        (PartnerKind::Customer, true) | (PartnerKind::Supplier, false) => TransactionType::Income,
        (PartnerKind::Customer, false) | (PartnerKind::Supplier, true) => TransactionType::Expense,
    };
    Some(Adjustment {
        r#type,
        amount: delta.abs(),
    })
}

pub fn adjustment_payload(
    kind: PartnerKind,
    partner_id: &str,
    adj: &Adjustment,
    date: NaiveDate,
    note: Option<&str>,
) -> Value {
    let mut body = json!({
        "type": adj.r#type,
        "amount": money::to_f64(&adj.amount),
        "description": note.map(str::trim).filter(|n| !n.is_empty()).unwrap_or("Borç düzeltme"),
        "date": date.format("%Y-%m-%d").to_string(),
        "isDebtAdjustment": true,
    });
    body[kind.field()] = json!(partner_id);
    body
}

/// Fetch the current balance, post the correcting transaction and return the
/// refreshed summary. A zero delta posts nothing.
pub fn reconcile<T: Transport>(
    api: &ApiClient<T>,
    kind: PartnerKind,
    partner_id: &str,
    target: Decimal,
    date: NaiveDate,
    note: Option<&str>,
) -> ApiResult<(Option<Adjustment>, DebtSummary)> {
    let before = api.partner_debt(kind, partner_id)?;
    let Some(adj) = plan_adjustment(kind, before.unpaid_amount(), target) else {
        return Ok((None, before));
    };
    info!(
        partner = partner_id,
        kind = kind.field(),
        amount = %adj.amount,
        "posting debt adjustment"
    );
    api.create_transaction(adjustment_payload(kind, partner_id, &adj, date, note))?;
    let after = api.partner_debt(kind, partner_id)?;
    Ok((Some(adj), after))
}
