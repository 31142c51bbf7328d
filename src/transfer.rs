// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Money transfers between company accounts and cari partners.
//!
//! Account to account goes to `/accounts/transfer`; anything touching a
//! customer or supplier goes to `/transactions/transfer` with discriminator
//! fields. Cari to cari has no endpoint and is rejected up front.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Map, Value, json};
use tracing::info;

use crate::api::{ApiClient, Transport};
use crate::error::{ApiError, TransferError};
use crate::money;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Party {
    Account(String),
    Customer(String),
    Supplier(String),
}

impl Party {
    pub fn kind(&self) -> &'static str {
        match self {
            Party::Account(_) => "account",
            Party::Customer(_) => "customer",
            Party::Supplier(_) => "supplier",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Party::Account(id) | Party::Customer(id) | Party::Supplier(id) => id,
        }
    }

    pub fn is_cari(&self) -> bool {
        !matches!(self, Party::Account(_))
    }

    /// Parse `account:<id>`, `customer:<id>` or `supplier:<id>`.
    pub fn parse(raw: &str) -> Option<Self> {
        let (kind, id) = raw.trim().split_once(':')?;
        let id = id.trim();
        if id.is_empty() {
            return None;
        }
        match kind.trim().to_lowercase().as_str() {
            "account" | "hesap" => Some(Party::Account(id.to_string())),
            "customer" | "musteri" | "müşteri" => Some(Party::Customer(id.to_string())),
            "supplier" | "tedarikci" | "tedarikçi" => Some(Party::Supplier(id.to_string())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub source: Party,
    pub target: Party,
    pub amount: Decimal,
    pub description: Option<String>,
    pub date: NaiveDate,
}

/// Where a transfer goes and what is sent.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferPlan {
    pub path: &'static str,
    pub body: Value,
}

impl TransferRequest {
    /// Run the client-side guards. Nothing reaches the network unless this
    /// passes.
    pub fn check(&self) -> Result<(), TransferError> {
        if self.source.id().trim().is_empty() || self.target.id().trim().is_empty() {
            return Err(TransferError::MissingParty);
        }
        if self.source.kind() == self.target.kind() && self.source.id() == self.target.id() {
            return Err(TransferError::SameParty);
        }
        if self.source.is_cari() && self.target.is_cari() {
            return Err(TransferError::CariToCari);
        }
        if self.amount <= Decimal::ZERO {
            return Err(TransferError::NonPositiveAmount);
        }
        Ok(())
    }

    pub fn plan(&self) -> Result<TransferPlan, TransferError> {
        self.check()?;
        let mut body = Map::new();
        body.insert("amount".into(), json!(money::to_f64(&self.amount)));
        body.insert(
            "description".into(),
            json!(
                self.description
                    .as_deref()
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .unwrap_or("Transfer")
            ),
        );
        body.insert("date".into(), json!(self.date.format("%Y-%m-%d").to_string()));

        if let (Party::Account(src), Party::Account(dst)) = (&self.source, &self.target) {
            body.insert("sourceAccount".into(), json!(src));
            body.insert("targetAccount".into(), json!(dst));
            return Ok(TransferPlan {
                path: "/accounts/transfer",
                body: Value::Object(body),
            });
        }

        body.insert("sourceType".into(), json!(self.source.kind()));
        body.insert("targetType".into(), json!(self.target.kind()));
        for (party, account_field) in [
            (&self.source, "sourceAccount"),
            (&self.target, "targetAccount"),
        ] {
            match party {
                Party::Account(id) => body.insert(account_field.into(), json!(id)),
                Party::Customer(id) => body.insert("customer".into(), json!(id)),
                Party::Supplier(id) => body.insert("supplier".into(), json!(id)),
            };
        }
        Ok(TransferPlan {
            path: "/transactions/transfer",
            body: Value::Object(body),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransferFailure {
    #[error(transparent)]
    Rejected(#[from] TransferError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl TransferFailure {
    pub fn user_message(&self) -> String {
        match self {
            TransferFailure::Rejected(e) => e.to_string(),
            TransferFailure::Api(e) => e.user_message(),
        }
    }
}

pub fn execute<T: Transport>(
    api: &ApiClient<T>,
    req: &TransferRequest,
) -> Result<Value, TransferFailure> {
    let plan = req.plan()?;
    info!(
        source = req.source.kind(),
        target = req.target.kind(),
        amount = %req.amount,
        path = plan.path,
        "transfer"
    );
    Ok(api.post_raw(plan.path, plan.body)?)
}
