// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Invoice form state: editable rows, derived totals and the validity
//! predicate that gates the save action.
//!
//! Totals are always derived from the current rows and never stored on the
//! form, so they cannot drift from what the user is editing.

pub mod workflow;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::forms::FieldErrors;
use crate::models::{Invoice, InvoiceType, PartnerKind};
use crate::money;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// One editable row of the invoice form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default, with = "money::lenient")]
    pub quantity: Decimal,
    #[serde(default, with = "money::lenient")]
    pub unit_price: Decimal,
    #[serde(default, with = "money::lenient")]
    pub tax_rate: Decimal,
}

impl LineItem {
    pub fn new(product_id: &str, quantity: Decimal, unit_price: Decimal, tax_rate: Decimal) -> Self {
        Self {
            product_id: Some(product_id.to_string()),
            quantity,
            unit_price,
            tax_rate,
        }
    }

    pub fn line_total(&self) -> Decimal {
        self.quantity * self.unit_price
    }

    pub fn line_tax(&self) -> Decimal {
        self.line_total() * self.tax_rate / HUNDRED
    }

    pub fn line_gross(&self) -> Decimal {
        self.line_total() + self.line_tax()
    }

    fn has_product(&self) -> bool {
        self.product_id
            .as_deref()
            .is_some_and(|p| !p.trim().is_empty())
    }

    pub fn is_valid(&self) -> bool {
        self.has_product() && self.quantity > Decimal::ZERO && self.unit_price > Decimal::ZERO
    }
}

pub fn subtotal(rows: &[LineItem]) -> Decimal {
    rows.iter().map(LineItem::line_total).sum()
}

pub fn total_tax(rows: &[LineItem]) -> Decimal {
    rows.iter().map(LineItem::line_tax).sum()
}

pub fn grand_total(rows: &[LineItem]) -> Decimal {
    subtotal(rows) + total_tax(rows)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub grand_total: Decimal,
}

impl Totals {
    pub fn of(rows: &[LineItem]) -> Self {
        let subtotal = subtotal(rows);
        let tax = total_tax(rows);
        Totals {
            subtotal,
            tax,
            grand_total: subtotal + tax,
        }
    }
}

/// Suggested invoice number: local date and time digits. The user may
/// overwrite it; uniqueness is enforced by the server.
pub fn suggest_invoice_number(now: NaiveDateTime) -> String {
    now.format("%Y%m%d%H%M%S").to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceForm {
    #[serde(default)]
    pub invoice_number: String,
    #[serde(default)]
    pub invoice_type: Option<InvoiceType>,
    #[serde(default)]
    pub partner_id: Option<String>,
    #[serde(default)]
    pub partner_model: Option<PartnerKind>,
    #[serde(default, with = "money::date")]
    pub date: Option<NaiveDate>,
    #[serde(default, with = "money::date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub rows: Vec<LineItem>,
}

impl InvoiceForm {
    /// A blank form for a new invoice, pre-filled with a suggested number
    /// and today's date.
    pub fn new(invoice_type: InvoiceType, now: NaiveDateTime) -> Self {
        Self {
            invoice_number: suggest_invoice_number(now),
            invoice_type: Some(invoice_type),
            date: Some(now.date()),
            currency: Some("TRY".to_string()),
            ..Default::default()
        }
    }

    /// Load an existing invoice for editing.
    pub fn from_invoice(inv: &Invoice) -> Self {
        Self {
            invoice_number: inv.invoice_number.clone(),
            invoice_type: Some(inv.invoice_type),
            partner_id: Some(inv.customer_or_supplier.id().to_string()),
            partner_model: Some(inv.partner_model),
            date: inv.date,
            due_date: inv.due_date,
            currency: Some(inv.currency.clone()),
            notes: inv.notes.clone(),
            rows: inv
                .products
                .iter()
                .map(|l| LineItem {
                    product_id: Some(l.product.id().to_string()),
                    quantity: l.quantity,
                    unit_price: l.unit_price,
                    tax_rate: l.tax_rate,
                })
                .collect(),
        }
    }

    pub fn add_row(&mut self, row: LineItem) {
        self.rows.push(row);
    }

    pub fn remove_row(&mut self, index: usize) -> Option<LineItem> {
        (index < self.rows.len()).then(|| self.rows.remove(index))
    }

    pub fn totals(&self) -> Totals {
        Totals::of(&self.rows)
    }

    pub fn partner_kind(&self) -> PartnerKind {
        self.partner_model.unwrap_or_else(|| {
            self.invoice_type
                .map(|t| t.default_partner())
                .unwrap_or(PartnerKind::Customer)
        })
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();
        if self.invoice_number.trim().is_empty() {
            errors.insert("invoiceNumber", "Fatura numarası zorunludur");
        }
        if self.invoice_type.is_none() {
            errors.insert("invoiceType", "Fatura türü seçilmelidir");
        }
        if self
            .partner_id
            .as_deref()
            .is_none_or(|p| p.trim().is_empty())
        {
            errors.insert("customerOrSupplier", "Cari seçilmelidir");
        }
        if self.date.is_none() {
            errors.insert("date", "Fatura tarihi zorunludur");
        }
        if self.rows.is_empty() {
            errors.insert("products", "En az bir ürün satırı eklenmelidir");
        }
        for (i, row) in self.rows.iter().enumerate() {
            if !row.has_product() {
                errors.insert(format!("products[{}].product", i), "Ürün seçilmelidir");
            }
            if row.quantity <= Decimal::ZERO {
                errors.insert(
                    format!("products[{}].quantity", i),
                    "Miktar sıfırdan büyük olmalıdır",
                );
            }
            if row.unit_price <= Decimal::ZERO {
                errors.insert(
                    format!("products[{}].unitPrice", i),
                    "Birim fiyat sıfırdan büyük olmalıdır",
                );
            }
        }
        errors
    }

    /// Gates the save action. Advisory only; the server re-validates.
    pub fn is_valid(&self) -> bool {
        !self.invoice_number.trim().is_empty()
            && self.invoice_type.is_some()
            && self
                .partner_id
                .as_deref()
                .is_some_and(|p| !p.trim().is_empty())
            && self.date.is_some()
            && !self.rows.is_empty()
            && self.rows.iter().all(LineItem::is_valid)
    }

    /// Request body for `POST /invoices` or `PUT /invoices/:id`. Status is
    /// never part of it: new invoices start as drafts on the server.
    pub fn to_payload(&self) -> Value {
        let totals = self.totals();
        let rows: Vec<Value> = self
            .rows
            .iter()
            .map(|r| {
                json!({
                    "product": r.product_id,
                    "quantity": money::to_f64(&r.quantity),
                    "unitPrice": money::to_f64(&r.unit_price),
                    "taxRate": money::to_f64(&r.tax_rate),
                    "total": money::to_f64(&r.line_gross()),
                })
            })
            .collect();
        let partner_model = match self.partner_kind() {
            PartnerKind::Customer => "Customer",
            PartnerKind::Supplier => "Supplier",
        };
        json!({
            "invoiceNumber": self.invoice_number.trim(),
            "invoiceType": self.invoice_type.map(|t| t.as_str()),
            "customerOrSupplier": self.partner_id,
            "partnerModel": partner_model,
            "date": self.date.map(|d| d.format("%Y-%m-%d").to_string()),
            "dueDate": self.due_date.map(|d| d.format("%Y-%m-%d").to_string()),
            "currency": self.currency.clone().unwrap_or_else(|| "TRY".to_string()),
            "notes": self.notes,
            "products": rows,
            "subtotal": money::to_f64(&totals.subtotal),
            "taxAmount": money::to_f64(&totals.tax),
            "totalAmount": money::to_f64(&totals.grand_total),
        })
    }
}
