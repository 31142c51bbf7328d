// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money;

/// A reference to another document: either a bare id or a populated object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ref {
    Id(String),
    Object {
        #[serde(rename = "_id", alias = "id")]
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

impl Ref {
    pub fn id(&self) -> &str {
        match self {
            Ref::Id(id) => id,
            Ref::Object { id, .. } => id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Ref::Id(_) => None,
            Ref::Object { name, .. } => name.as_deref(),
        }
    }

    /// Name when populated, otherwise the id.
    pub fn display(&self) -> &str {
        self.name().unwrap_or_else(|| self.id())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default, with = "money::lenient")]
    pub quantity: Decimal,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default, with = "money::lenient")]
    pub purchase_price: Decimal,
    #[serde(default, with = "money::lenient")]
    pub sale_price: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default, with = "money::lenient")]
    pub critical_stock_level: Decimal,
    #[serde(default)]
    pub track_stock: bool,
    #[serde(default)]
    pub category: Option<Ref>,
    #[serde(default)]
    pub brand: Option<Ref>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub oem_code: Option<String>,
}

impl Product {
    /// Display threshold only; the server decides nothing from it.
    pub fn is_critical(&self) -> bool {
        self.track_stock && self.quantity <= self.critical_stock_level
    }

    pub fn stock_value(&self) -> Decimal {
        self.quantity * self.purchase_price
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartnerKind {
    Customer,
    Supplier,
}

impl PartnerKind {
    pub fn resource(&self) -> &'static str {
        match self {
            PartnerKind::Customer => "customers",
            PartnerKind::Supplier => "suppliers",
        }
    }

    /// Field name used in transaction payloads.
    pub fn field(&self) -> &'static str {
        match self {
            PartnerKind::Customer => "customer",
            PartnerKind::Supplier => "supplier",
        }
    }
}

/// Customers and suppliers share one shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partner {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub tax_number: Option<String>,
    #[serde(default)]
    pub tax_office: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtSummary {
    #[serde(default, with = "money::lenient")]
    pub debt: Decimal,
    #[serde(default, with = "money::lenient")]
    pub total_paid: Decimal,
    #[serde(default, with = "money::lenient")]
    pub total_amount: Decimal,
}

impl DebtSummary {
    pub fn unpaid_amount(&self) -> Decimal {
        self.debt
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Cash,
    Bank,
    CreditCard,
    Personnel,
    Cari,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Cash => "cash",
            AccountType::Bank => "bank",
            AccountType::CreditCard => "credit_card",
            AccountType::Personnel => "personnel",
            AccountType::Cari => "cari",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Some(AccountType::Cash),
            "bank" => Some(AccountType::Bank),
            "credit_card" | "credit-card" => Some(AccountType::CreditCard),
            "personnel" => Some(AccountType::Personnel),
            "cari" => Some(AccountType::Cari),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CariType {
    Customer,
    Supplier,
}

impl From<CariType> for PartnerKind {
    fn from(c: CariType) -> Self {
        match c {
            CariType::Customer => PartnerKind::Customer,
            CariType::Supplier => PartnerKind::Supplier,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    pub name: String,
    pub r#type: AccountType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cari_type: Option<CariType>,
    #[serde(default, with = "money::lenient")]
    pub balance: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Account {
    /// Company-owned accounts (cash, bank, card, personnel) as opposed to
    /// cari accounts that mirror a trading partner.
    pub fn is_internal(&self) -> bool {
        self.r#type != AccountType::Cari
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceType {
    Sale,
    Purchase,
    Return,
    Proforma,
}

impl InvoiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceType::Sale => "sale",
            InvoiceType::Purchase => "purchase",
            InvoiceType::Return => "return",
            InvoiceType::Proforma => "proforma",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sale" => Some(InvoiceType::Sale),
            "purchase" => Some(InvoiceType::Purchase),
            "return" => Some(InvoiceType::Return),
            "proforma" => Some(InvoiceType::Proforma),
            _ => None,
        }
    }

    /// Purchase invoices are issued by suppliers; everything else is billed
    /// to a customer.
    pub fn default_partner(&self) -> PartnerKind {
        match self {
            InvoiceType::Purchase => PartnerKind::Supplier,
            _ => PartnerKind::Customer,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Approved,
    Paid,
    Canceled,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Approved => "approved",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Canceled => "canceled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Partial,
    Paid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLine {
    pub product: Ref,
    #[serde(default, with = "money::lenient")]
    pub quantity: Decimal,
    #[serde(default, with = "money::lenient")]
    pub unit_price: Decimal,
    #[serde(default, with = "money::lenient")]
    pub tax_rate: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    pub invoice_number: String,
    #[serde(alias = "type")]
    pub invoice_type: InvoiceType,
    pub customer_or_supplier: Ref,
    #[serde(default = "default_partner_model")]
    pub partner_model: PartnerKind,
    #[serde(default, with = "money::date")]
    pub date: Option<NaiveDate>,
    #[serde(default, with = "money::date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub status: InvoiceStatus,
    #[serde(default = "default_payment_status")]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub products: Vec<InvoiceLine>,
    #[serde(default, with = "money::lenient")]
    pub total_amount: Decimal,
    #[serde(default, with = "money::lenient")]
    pub paid_amount: Decimal,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Invoice {
    pub fn remaining(&self) -> Decimal {
        (self.total_amount - self.paid_amount).max(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
    Transfer,
}

impl TransactionType {
    pub fn from_string(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" => Some(TransactionType::Income),
            "expense" => Some(TransactionType::Expense),
            "transfer" => Some(TransactionType::Transfer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    pub r#type: TransactionType,
    #[serde(default, with = "money::lenient")]
    pub amount: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "money::date")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub account: Option<Ref>,
    #[serde(default)]
    pub customer: Option<Ref>,
    #[serde(default)]
    pub supplier: Option<Ref>,
    #[serde(default)]
    pub source_account: Option<Ref>,
    #[serde(default)]
    pub target_account: Option<Ref>,
}

/// Categories and brands share one shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classifier {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_currency() -> String {
    "TRY".to_string()
}

fn default_partner_model() -> PartnerKind {
    PartnerKind::Customer
}

fn default_payment_status() -> PaymentStatus {
    PaymentStatus::Unpaid
}
