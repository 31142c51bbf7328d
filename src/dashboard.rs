// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Account, Invoice, InvoiceStatus, InvoiceType, Product};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub product_count: usize,
    pub critical_products: Vec<String>,
    pub stock_value: Decimal,
    pub invoices_by_status: BTreeMap<&'static str, usize>,
    pub open_receivables: Decimal,
    pub open_payables: Decimal,
    pub cash_position: Decimal,
}

impl DashboardSummary {
    pub fn build(products: &[Product], invoices: &[Invoice], accounts: &[Account]) -> Self {
        let mut s = DashboardSummary {
            product_count: products.len(),
            ..Default::default()
        };
        for p in products {
            s.stock_value += p.stock_value();
            if p.is_critical() {
                s.critical_products.push(p.name.clone());
            }
        }
        for inv in invoices {
            *s.invoices_by_status.entry(inv.status.as_str()).or_insert(0) += 1;
            if inv.status != InvoiceStatus::Approved {
                continue;
            }
            match inv.invoice_type {
                InvoiceType::Sale => s.open_receivables += inv.remaining(),
                InvoiceType::Purchase => s.open_payables += inv.remaining(),
                _ => {}
            }
        }
        s.cash_position = accounts
            .iter()
            .filter(|a| a.is_internal())
            .map(|a| a.balance)
            .sum();
        s
    }
}
