// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Invoice status transitions.
//!
//! ```text
//!   draft ──approve──► approved ──collect/pay──► paid
//!     │                  │  ▲                      │
//!     │                  │  └──────revert──────────┘ (admin)
//!     │                  └──revert──► draft
//!     └──cancel──► canceled ◄──cancel── approved
//! ```
//!
//! Approve, revert, collect and pay move stock or money on the server, so
//! each goes to its own endpoint. The generic status update is used for
//! cancel only.

use rust_decimal::Decimal;
use serde_json::Value;
use tracing::info;

use crate::api::{ApiClient, PaymentBody, Transport};
use crate::error::{ApiError, WorkflowError};
use crate::models::{Account, Invoice, InvoiceStatus, InvoiceType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvoiceAction {
    Approve,
    /// Payment received on a sale invoice.
    Collect,
    /// Payment made on a purchase or return invoice.
    Pay,
    Revert,
    Cancel,
}

impl InvoiceAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceAction::Approve => "approve",
            InvoiceAction::Collect => "collect",
            InvoiceAction::Pay => "pay",
            InvoiceAction::Revert => "revert",
            InvoiceAction::Cancel => "cancel",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InvoiceAction::Approve => "Onayla",
            InvoiceAction::Collect => "Tahsil Et",
            InvoiceAction::Pay => "Öde",
            InvoiceAction::Revert => "Geri Al",
            InvoiceAction::Cancel => "İptal Et",
        }
    }
}

/// Which payment action settles an invoice of this type, if any.
pub fn payment_action(t: InvoiceType) -> Option<InvoiceAction> {
    match t {
        InvoiceType::Sale => Some(InvoiceAction::Collect),
        InvoiceType::Purchase | InvoiceType::Return => Some(InvoiceAction::Pay),
        InvoiceType::Proforma => None,
    }
}

/// Actions offered for an invoice in `status`. Reverting a paid invoice is
/// only offered to admins.
pub fn allowed_actions(status: InvoiceStatus, t: InvoiceType, admin: bool) -> Vec<InvoiceAction> {
    if t == InvoiceType::Proforma {
        return match status {
            InvoiceStatus::Draft => vec![InvoiceAction::Cancel],
            _ => Vec::new(),
        };
    }
    match status {
        InvoiceStatus::Draft => vec![InvoiceAction::Approve, InvoiceAction::Cancel],
        InvoiceStatus::Approved => {
            let mut v = Vec::with_capacity(3);
            v.extend(payment_action(t));
            v.push(InvoiceAction::Revert);
            v.push(InvoiceAction::Cancel);
            v
        }
        InvoiceStatus::Paid if admin => vec![InvoiceAction::Revert],
        InvoiceStatus::Paid | InvoiceStatus::Canceled => Vec::new(),
    }
}

/// Status an invoice ends up in after `action` succeeds.
pub fn next_status(status: InvoiceStatus, action: InvoiceAction) -> InvoiceStatus {
    match (status, action) {
        (InvoiceStatus::Draft, InvoiceAction::Approve) => InvoiceStatus::Approved,
        (InvoiceStatus::Approved, InvoiceAction::Collect | InvoiceAction::Pay) => {
            InvoiceStatus::Paid
        }
        (InvoiceStatus::Approved, InvoiceAction::Revert) => InvoiceStatus::Draft,
        (InvoiceStatus::Paid, InvoiceAction::Revert) => InvoiceStatus::Approved,
        (_, InvoiceAction::Cancel) => InvoiceStatus::Canceled,
        (s, _) => s,
    }
}

pub fn check_transition(
    inv: &Invoice,
    action: InvoiceAction,
    admin: bool,
) -> Result<(), WorkflowError> {
    if allowed_actions(inv.status, inv.invoice_type, admin).contains(&action) {
        return Ok(());
    }
    if inv.status == InvoiceStatus::Paid && action == InvoiceAction::Revert {
        return Err(WorkflowError::AdminOnly);
    }
    Err(WorkflowError::NotAllowed {
        action: action.as_str().to_string(),
        status: inv.status.as_str().to_string(),
    })
}

/// State of the payment dialog shown before an invoice can be collected or
/// paid. Prefilled with what is still open on the invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentDialog {
    pub amount: Decimal,
    pub account_id: Option<String>,
    pub description: Option<String>,
}

impl PaymentDialog {
    pub fn for_invoice(inv: &Invoice) -> Self {
        Self {
            amount: inv.remaining(),
            account_id: None,
            description: None,
        }
    }

    /// Accounts the picker may offer: company accounts only, a cari cannot
    /// pay itself.
    pub fn selectable_accounts(accounts: &[Account]) -> Vec<&Account> {
        accounts.iter().filter(|a| a.is_internal()).collect()
    }

    /// Mirrors the disabled state of the submit button.
    pub fn can_submit(&self) -> bool {
        self.amount > Decimal::ZERO && self.account_id.as_deref().is_some_and(|a| !a.is_empty())
    }

    /// Validate against the known accounts and build the request body.
    pub fn submit(&self, accounts: &[Account]) -> Result<PaymentBody, WorkflowError> {
        let account_id = self
            .account_id
            .as_deref()
            .filter(|a| !a.is_empty())
            .ok_or(WorkflowError::MissingAccount)?;
        if self.amount <= Decimal::ZERO {
            return Err(WorkflowError::NonPositiveAmount);
        }
        let account = accounts
            .iter()
            .find(|a| a.id == account_id)
            .ok_or_else(|| WorkflowError::UnknownAccount(account_id.to_string()))?;
        if !account.is_internal() {
            return Err(WorkflowError::CariAccount(account.name.clone()));
        }
        Ok(PaymentBody {
            amount: self.amount,
            account_id: account_id.to_string(),
            description: self
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error(transparent)]
    Rejected(#[from] WorkflowError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ActionError {
    pub fn user_message(&self) -> String {
        match self {
            ActionError::Rejected(e) => e.to_string(),
            ActionError::Api(e) => e.user_message(),
        }
    }
}

/// Drives status changes for one invoice against the API.
pub struct InvoiceWorkflow<'a, T: Transport> {
    api: &'a ApiClient<T>,
    admin: bool,
}

impl<'a, T: Transport> InvoiceWorkflow<'a, T> {
    pub fn new(api: &'a ApiClient<T>) -> Self {
        Self { api, admin: false }
    }

    pub fn as_admin(mut self, admin: bool) -> Self {
        self.admin = admin;
        self
    }

    fn id(inv: &Invoice) -> Result<&str, WorkflowError> {
        if inv.id.is_empty() {
            Err(WorkflowError::MissingId)
        } else {
            Ok(&inv.id)
        }
    }

    pub fn approve(&self, inv: &Invoice) -> Result<Value, ActionError> {
        check_transition(inv, InvoiceAction::Approve, self.admin)?;
        let id = Self::id(inv)?;
        info!(invoice = %inv.invoice_number, "approving invoice");
        Ok(self.api.invoice_action(id, "approve", None)?)
    }

    pub fn revert(&self, inv: &Invoice) -> Result<Value, ActionError> {
        check_transition(inv, InvoiceAction::Revert, self.admin)?;
        let id = Self::id(inv)?;
        info!(invoice = %inv.invoice_number, from = inv.status.as_str(), "reverting invoice");
        Ok(self.api.invoice_action(id, "revert", None)?)
    }

    /// Collect (sale) or pay (purchase/return) through the dialog. Nothing
    /// is sent unless the dialog validates.
    pub fn settle(
        &self,
        inv: &Invoice,
        dialog: &PaymentDialog,
        accounts: &[Account],
    ) -> Result<Value, ActionError> {
        let action = payment_action(inv.invoice_type).ok_or_else(|| WorkflowError::NotAllowed {
            action: "pay".to_string(),
            status: inv.status.as_str().to_string(),
        })?;
        check_transition(inv, action, self.admin)?;
        let id = Self::id(inv)?;
        let body = dialog.submit(accounts)?;
        info!(
            invoice = %inv.invoice_number,
            action = action.as_str(),
            amount = %body.amount,
            "settling invoice"
        );
        let body = serde_json::to_value(&body).map_err(ApiError::from)?;
        Ok(self.api.invoice_action(id, action.as_str(), Some(body))?)
    }

    pub fn cancel(&self, inv: &Invoice) -> Result<Value, ActionError> {
        check_transition(inv, InvoiceAction::Cancel, self.admin)?;
        let id = Self::id(inv)?;
        info!(invoice = %inv.invoice_number, "canceling invoice");
        Ok(self.api.cancel_invoice_status(id)?)
    }
}

