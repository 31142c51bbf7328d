// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use std::io::Write;
use std::str::FromStr;

use carihesap::commands::invoices;
use carihesap::invoice::{
    InvoiceForm, LineItem, Totals, grand_total, subtotal, suggest_invoice_number, total_tax,
};
use carihesap::models::{Invoice, InvoiceType, PartnerKind};
use carihesap::refresh::{RefreshBus, Resource};
use chrono::{NaiveDate, NaiveDateTime};
use common::{FakeTransport, area_matches, client};
use rust_decimal::Decimal;
use serde_json::json;
use tempfile::NamedTempFile;

fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 7)
        .unwrap()
        .and_hms_opt(9, 5, 30)
        .unwrap()
}

fn sample_rows() -> Vec<LineItem> {
    vec![
        LineItem::new("p1", d("2"), d("100"), d("18")),
        LineItem::new("p2", d("1"), d("50"), d("8")),
    ]
}

fn valid_form() -> InvoiceForm {
    let mut f = InvoiceForm::new(InvoiceType::Sale, now());
    f.partner_id = Some("c1".into());
    for r in sample_rows() {
        f.add_row(r);
    }
    f
}

#[test]
fn two_row_example_totals() {
    let rows = sample_rows();
    assert_eq!(subtotal(&rows), d("250"));
    assert_eq!(total_tax(&rows), d("40"));
    assert_eq!(grand_total(&rows), d("290"));
    assert_eq!(
        Totals::of(&rows),
        Totals {
            subtotal: d("250"),
            tax: d("40"),
            grand_total: d("290"),
        }
    );
}

#[test]
fn grand_total_is_subtotal_plus_tax() {
    let rows = vec![
        LineItem::new("a", d("3.5"), d("19.99"), d("20")),
        LineItem::new("b", d("0.25"), d("1000"), d("1")),
        LineItem::new("c", d("7"), d("0.10"), d("0")),
    ];
    assert_eq!(grand_total(&rows), subtotal(&rows) + total_tax(&rows));
}

#[test]
fn grand_total_never_drops_when_quantity_or_price_grows() {
    let base = sample_rows();
    let start = grand_total(&base);
    for step in 1..=20 {
        let inc = Decimal::from(step);
        let mut more_qty = base.clone();
        more_qty[0].quantity += inc;
        assert!(grand_total(&more_qty) >= start);

        let mut more_price = base.clone();
        more_price[1].unit_price += inc / d("4");
        assert!(grand_total(&more_price) >= start);
    }
}

#[test]
fn totals_follow_row_edits() {
    let mut form = valid_form();
    assert_eq!(form.totals().grand_total, d("290"));
    form.remove_row(1);
    assert_eq!(form.totals().grand_total, d("236"));
    form.rows[0].quantity = d("1");
    assert_eq!(form.totals().subtotal, d("100"));
    assert!(form.remove_row(5).is_none());
}

#[test]
fn new_form_suggests_number_and_date() {
    let form = InvoiceForm::new(InvoiceType::Purchase, now());
    assert_eq!(form.invoice_number, "20250307090530");
    assert_eq!(suggest_invoice_number(now()), "20250307090530");
    assert_eq!(form.date, NaiveDate::from_ymd_opt(2025, 3, 7));
    assert_eq!(form.partner_kind(), PartnerKind::Supplier);
}

#[test]
fn complete_form_is_valid() {
    let form = valid_form();
    assert!(form.is_valid());
    assert!(form.validate().is_empty());
}

#[test]
fn zero_quantity_or_price_invalidates() {
    let mut form = valid_form();
    form.rows[1].quantity = Decimal::ZERO;
    assert!(!form.is_valid());
    assert!(form.validate().contains("products[1].quantity"));

    let mut form = valid_form();
    form.rows[0].unit_price = d("-1");
    assert!(!form.is_valid());
    assert!(form.validate().contains("products[0].unitPrice"));
}

#[test]
fn missing_header_fields_invalidate() {
    let mut form = valid_form();
    form.invoice_number = "  ".into();
    form.partner_id = None;
    form.date = None;
    let errors = form.validate();
    assert!(!form.is_valid());
    assert!(errors.contains("invoiceNumber"));
    assert!(errors.contains("customerOrSupplier"));
    assert!(errors.contains("date"));

    let mut empty = valid_form();
    empty.rows.clear();
    assert!(!empty.is_valid());
    assert!(empty.validate().contains("products"));

    let mut no_product = valid_form();
    no_product.rows[0].product_id = None;
    assert!(!no_product.is_valid());
    assert!(no_product.validate().contains("products[0].product"));
}

#[test]
fn payload_carries_derived_totals_and_no_status() {
    let payload = valid_form().to_payload();
    assert_eq!(payload["totalAmount"], json!(290.0));
    assert_eq!(payload["subtotal"], json!(250.0));
    assert_eq!(payload["taxAmount"], json!(40.0));
    assert_eq!(payload["partnerModel"], "Customer");
    assert_eq!(payload["invoiceType"], "sale");
    assert_eq!(payload["date"], "2025-03-07");
    assert_eq!(payload["products"][0]["total"], json!(236.0));
    assert!(payload.get("status").is_none());
}

#[test]
fn form_loads_from_existing_invoice() {
    let inv: Invoice = serde_json::from_value(json!({
        "_id": "inv1",
        "invoiceNumber": "F-1",
        "invoiceType": "purchase",
        "customerOrSupplier": { "_id": "s1", "name": "Acme" },
        "partnerModel": "Supplier",
        "date": "2025-01-02T00:00:00.000Z",
        "status": "draft",
        "products": [
            { "product": "p1", "quantity": "3", "unitPrice": 10, "taxRate": 20 }
        ],
        "totalAmount": 36
    }))
    .unwrap();
    let form = InvoiceForm::from_invoice(&inv);
    assert_eq!(form.partner_id.as_deref(), Some("s1"));
    assert_eq!(form.partner_kind(), PartnerKind::Supplier);
    assert_eq!(form.date, NaiveDate::from_ymd_opt(2025, 1, 2));
    assert_eq!(form.totals().grand_total, d("36"));
    assert!(form.is_valid());
}

#[test]
fn load_form_fills_number_and_date() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"invoiceType":"sale","partnerId":"c9","rows":[{{"productId":"p1","quantity":"1,5","unitPrice":10,"taxRate":10}}]}}"#
    )
    .unwrap();
    file.flush().unwrap();

    let form = invoices::load_form(file.path()).unwrap();
    assert_eq!(form.invoice_number.len(), 14);
    assert!(form.date.is_some());
    assert_eq!(form.rows[0].quantity, d("1.5"));
    assert_eq!(form.totals().grand_total, d("16.5"));
    assert!(form.is_valid());
}

#[test]
fn load_form_rejects_broken_json() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{{ not json").unwrap();
    file.flush().unwrap();
    assert!(invoices::load_form(file.path()).is_err());
}

fn untyped_form_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"partnerId":"s1","rows":[{{"productId":"p1","quantity":2,"unitPrice":10,"taxRate":20}}]}}"#
    )
    .unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn load_form_leaves_type_unset() {
    let file = untyped_form_file();
    let form = invoices::load_form(file.path()).unwrap();
    assert_eq!(form.invoice_type, None);
}

#[test]
fn update_keeps_stored_invoice_type() {
    let file = untyped_form_file();
    let api = client(
        FakeTransport::new()
            .on(
                "GET",
                "/invoices/i1",
                json!({ "invoice": {
                    "_id": "i1",
                    "invoiceNumber": "F-9",
                    "invoiceType": "purchase",
                    "customerOrSupplier": "s1",
                    "status": "draft",
                    "totalAmount": 24
                } }),
            )
            .on("PUT", "/invoices/i1", json!({ "invoice": { "_id": "i1", "invoiceNumber": "F-9", "invoiceType": "purchase", "customerOrSupplier": "s1" } })),
    );
    let bus = RefreshBus::new();
    let path = file.path().to_str().unwrap();
    let m = area_matches(&["invoice", "update", "--id", "i1", "--file", path]);
    invoices::handle(&api, &bus, &m).unwrap();

    let body = api.transport().last().unwrap().body.unwrap();
    assert_eq!(body["invoiceType"], "purchase");
    assert_eq!(body["partnerModel"], "Supplier");
    assert_eq!(bus.generation(Resource::Invoices), 1);
}

#[test]
fn create_defaults_to_sale() {
    let file = untyped_form_file();
    let api = client(FakeTransport::new().on(
        "POST",
        "/invoices",
        json!({ "invoice": { "_id": "i2", "invoiceNumber": "F-10", "invoiceType": "sale", "customerOrSupplier": "s1" } }),
    ));
    let bus = RefreshBus::new();
    let path = file.path().to_str().unwrap();
    let m = area_matches(&["invoice", "create", "--file", path]);
    invoices::handle(&api, &bus, &m).unwrap();
    let body = api.transport().last().unwrap().body.unwrap();
    assert_eq!(body["invoiceType"], "sale");
}
