// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Typed entity forms. Each form validates into field-keyed Turkish
//! messages and produces the JSON body the API expects.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Value, json};

use crate::models::{Account, AccountType, CariType, Partner, PartnerKind, Product, TransactionType};
use crate::money;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9 ()\-]{7,20}$").expect("valid phone regex"));

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// First message per field wins.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(())` when empty, otherwise an error listing every field.
    pub fn into_result(self) -> anyhow::Result<()> {
        if self.0.is_empty() {
            return Ok(());
        }
        let lines: Vec<String> = self.0.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
        Err(anyhow::anyhow!("Form geçersiz:\n  {}", lines.join("\n  ")))
    }
}

fn require(errors: &mut FieldErrors, field: &str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.insert(field, message);
    }
}

fn non_negative(errors: &mut FieldErrors, field: &str, value: Decimal) {
    if value < Decimal::ZERO {
        errors.insert(field, "Negatif olamaz");
    }
}

fn blank_to_none(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: String,
    pub sku: String,
    pub barcode: Option<String>,
    pub quantity: Decimal,
    pub unit: Option<String>,
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    pub currency: Option<String>,
    pub critical_stock_level: Decimal,
    pub track_stock: bool,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub tags: Vec<String>,
    pub oem_code: Option<String>,
}

impl ProductForm {
    pub fn validate(&self) -> FieldErrors {
        let mut e = FieldErrors::default();
        require(&mut e, "name", &self.name, "Ürün adı zorunludur");
        non_negative(&mut e, "quantity", self.quantity);
        non_negative(&mut e, "purchasePrice", self.purchase_price);
        non_negative(&mut e, "salePrice", self.sale_price);
        non_negative(&mut e, "criticalStockLevel", self.critical_stock_level);
        e
    }

    pub fn to_payload(&self) -> Value {
        let mut tags: Vec<String> = self
            .tags
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        tags.sort();
        tags.dedup();
        json!({
            "name": self.name.trim(),
            "sku": self.sku.trim(),
            "barcode": blank_to_none(&self.barcode),
            "quantity": money::to_f64(&self.quantity),
            "unit": blank_to_none(&self.unit).unwrap_or("adet"),
            "purchasePrice": money::to_f64(&self.purchase_price),
            "salePrice": money::to_f64(&self.sale_price),
            "currency": blank_to_none(&self.currency).unwrap_or("TRY"),
            "criticalStockLevel": money::to_f64(&self.critical_stock_level),
            "trackStock": self.track_stock,
            "category": blank_to_none(&self.category),
            "brand": blank_to_none(&self.brand),
            "tags": tags,
            "oemCode": blank_to_none(&self.oem_code),
        })
    }
}

/// Starting point for an edit: the stored product as a form.
impl From<&Product> for ProductForm {
    fn from(p: &Product) -> Self {
        Self {
            name: p.name.clone(),
            sku: p.sku.clone(),
            barcode: p.barcode.clone(),
            quantity: p.quantity,
            unit: p.unit.clone(),
            purchase_price: p.purchase_price,
            sale_price: p.sale_price,
            currency: Some(p.currency.clone()),
            critical_stock_level: p.critical_stock_level,
            track_stock: p.track_stock,
            category: p.category.as_ref().map(|r| r.id().to_string()),
            brand: p.brand.as_ref().map(|r| r.id().to_string()),
            tags: p.tags.clone(),
            oem_code: p.oem_code.clone(),
        }
    }
}

/// Used for both customers and suppliers.
#[derive(Debug, Clone, Default)]
pub struct PartnerForm {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub tax_number: Option<String>,
    pub tax_office: Option<String>,
}

impl PartnerForm {
    pub fn validate(&self) -> FieldErrors {
        let mut e = FieldErrors::default();
        require(&mut e, "name", &self.name, "Ad zorunludur");
        if let Some(email) = blank_to_none(&self.email) {
            if !EMAIL_RE.is_match(email) {
                e.insert("email", "Geçerli bir e-posta adresi girin");
            }
        }
        if let Some(phone) = blank_to_none(&self.phone) {
            if !PHONE_RE.is_match(phone) {
                e.insert("phone", "Geçerli bir telefon numarası girin");
            }
        }
        if let Some(tax) = blank_to_none(&self.tax_number) {
            if !tax.chars().all(|c| c.is_ascii_digit()) || !(10..=11).contains(&tax.len()) {
                e.insert("taxNumber", "Vergi numarası 10 veya 11 haneli olmalıdır");
            }
        }
        e
    }

    pub fn to_payload(&self) -> Value {
        json!({
            "name": self.name.trim(),
            "email": blank_to_none(&self.email),
            "phone": blank_to_none(&self.phone),
            "address": blank_to_none(&self.address),
            "taxNumber": blank_to_none(&self.tax_number),
            "taxOffice": blank_to_none(&self.tax_office),
        })
    }
}

impl From<&Partner> for PartnerForm {
    fn from(p: &Partner) -> Self {
        Self {
            name: p.name.clone(),
            email: p.email.clone(),
            phone: p.phone.clone(),
            address: p.address.clone(),
            tax_number: p.tax_number.clone(),
            tax_office: p.tax_office.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AccountForm {
    pub name: String,
    pub r#type: AccountType,
    pub cari_type: Option<CariType>,
    pub balance: Decimal,
    pub currency: String,
}

impl AccountForm {
    pub fn validate(&self) -> FieldErrors {
        let mut e = FieldErrors::default();
        require(&mut e, "name", &self.name, "Hesap adı zorunludur");
        match (self.r#type, self.cari_type) {
            (AccountType::Cari, None) => e.insert("cariType", "Cari türü seçilmelidir"),
            (t, Some(_)) if t != AccountType::Cari => {
                e.insert("cariType", "Cari türü yalnızca cari hesaplarda kullanılır")
            }
            _ => {}
        }
        require(&mut e, "currency", &self.currency, "Para birimi zorunludur");
        e
    }

    pub fn to_payload(&self) -> Value {
        let mut body = json!({
            "name": self.name.trim(),
            "type": self.r#type.as_str(),
            "balance": money::to_f64(&self.balance),
            "currency": self.currency.trim().to_uppercase(),
        });
        if let (AccountType::Cari, Some(ct)) = (self.r#type, self.cari_type) {
            body["cariType"] = serde_json::to_value(ct).unwrap_or(Value::Null);
        }
        body
    }

    /// Payload that recreates a deleted account from its snapshot.
    pub fn restore_payload(acc: &Account) -> Value {
        AccountForm::from(acc).to_payload()
    }
}

impl From<&Account> for AccountForm {
    fn from(acc: &Account) -> Self {
        Self {
            name: acc.name.clone(),
            r#type: acc.r#type,
            cari_type: acc.cari_type,
            balance: acc.balance,
            currency: acc.currency.clone(),
        }
    }
}

/// Categories and brands.
#[derive(Debug, Clone, Default)]
pub struct ClassifierForm {
    pub name: String,
    pub description: Option<String>,
}

impl ClassifierForm {
    pub fn validate(&self) -> FieldErrors {
        let mut e = FieldErrors::default();
        require(&mut e, "name", &self.name, "Ad zorunludur");
        e
    }

    pub fn to_payload(&self) -> Value {
        json!({
            "name": self.name.trim(),
            "description": blank_to_none(&self.description),
        })
    }
}

/// Quick income/expense posting against an account or a cari.
#[derive(Debug, Clone)]
pub struct QuickTransactionForm {
    pub r#type: TransactionType,
    pub amount: Decimal,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub account: Option<String>,
    pub partner: Option<(PartnerKind, String)>,
}

impl QuickTransactionForm {
    pub fn validate(&self) -> FieldErrors {
        let mut e = FieldErrors::default();
        if self.amount <= Decimal::ZERO {
            e.insert("amount", "Tutar sıfırdan büyük olmalıdır");
        }
        if self.r#type == TransactionType::Transfer {
            e.insert("type", "Transferler için transfer komutunu kullanın");
        }
        if self.account.is_none() && self.partner.is_none() {
            e.insert("account", "Hesap veya cari seçilmelidir");
        }
        e
    }

    pub fn to_payload(&self) -> Value {
        let mut body = json!({
            "type": self.r#type,
            "amount": money::to_f64(&self.amount),
            "description": blank_to_none(&self.description),
            "date": self.date.format("%Y-%m-%d").to_string(),
        });
        if let Some(acc) = &self.account {
            body["account"] = json!(acc);
        }
        if let Some((kind, id)) = &self.partner {
            body[kind.field()] = json!(id);
        }
        body
    }
}
