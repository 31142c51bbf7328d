// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{AccountType, InvoiceStatus, InvoiceType, PaymentStatus, TransactionType};

pub fn status_label(s: InvoiceStatus) -> &'static str {
    match s {
        InvoiceStatus::Draft => "Taslak",
        InvoiceStatus::Approved => "Onaylandı",
        InvoiceStatus::Paid => "Ödendi",
        InvoiceStatus::Canceled => "İptal Edildi",
    }
}

/// Colour tag for status chips; terminals map it onto ANSI colours.
pub fn status_color(s: InvoiceStatus) -> &'static str {
    match s {
        InvoiceStatus::Draft => "default",
        InvoiceStatus::Approved => "info",
        InvoiceStatus::Paid => "success",
        InvoiceStatus::Canceled => "error",
    }
}

pub fn type_label(t: InvoiceType) -> &'static str {
    match t {
        InvoiceType::Sale => "Satış",
        InvoiceType::Purchase => "Alış",
        InvoiceType::Return => "İade",
        InvoiceType::Proforma => "Proforma",
    }
}

pub fn payment_status_label(p: PaymentStatus) -> &'static str {
    match p {
        PaymentStatus::Unpaid => "Ödenmedi",
        PaymentStatus::Partial => "Kısmi Ödendi",
        PaymentStatus::Paid => "Ödendi",
    }
}

pub fn account_type_label(t: AccountType) -> &'static str {
    match t {
        AccountType::Cash => "Kasa",
        AccountType::Bank => "Banka",
        AccountType::CreditCard => "Kredi Kartı",
        AccountType::Personnel => "Personel",
        AccountType::Cari => "Cari",
    }
}

pub fn transaction_type_label(t: TransactionType) -> &'static str {
    match t {
        TransactionType::Income => "Gelir",
        TransactionType::Expense => "Gider",
        TransactionType::Transfer => "Transfer",
    }
}
