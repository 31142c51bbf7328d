// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use std::str::FromStr;

use carihesap::commands::invoices;
use carihesap::error::WorkflowError;
use carihesap::invoice::workflow::{
    ActionError, InvoiceAction, InvoiceWorkflow, PaymentDialog, allowed_actions, check_transition,
    next_status, payment_action,
};
use carihesap::models::{Account, Invoice, InvoiceStatus, InvoiceType};
use carihesap::refresh::{RefreshBus, Resource};
use common::{FakeTransport, area_matches, client};
use rust_decimal::Decimal;
use serde_json::{Value, json};

fn invoice(status: &str, kind: &str) -> Invoice {
    serde_json::from_value(json!({
        "_id": "inv1",
        "invoiceNumber": "F-100",
        "invoiceType": kind,
        "customerOrSupplier": "c1",
        "status": status,
        "totalAmount": 290,
        "paidAmount": 90
    }))
    .unwrap()
}

fn accounts() -> Vec<Account> {
    serde_json::from_value(json!([
        { "_id": "kasa", "name": "Merkez Kasa", "type": "cash", "balance": 1000 },
        { "_id": "cari1", "name": "Ali Cari", "type": "cari", "cariType": "customer" }
    ]))
    .unwrap()
}

fn accounts_json() -> Value {
    json!([
        { "_id": "kasa", "name": "Merkez Kasa", "type": "cash", "balance": 1000 },
        { "_id": "cari1", "name": "Ali Cari", "type": "cari", "cariType": "customer" }
    ])
}

#[test]
fn actions_per_status() {
    use InvoiceAction::*;
    use InvoiceStatus::*;
    assert_eq!(allowed_actions(Draft, InvoiceType::Sale, false), vec![Approve, Cancel]);
    assert_eq!(
        allowed_actions(Approved, InvoiceType::Sale, false),
        vec![Collect, Revert, Cancel]
    );
    assert_eq!(
        allowed_actions(Approved, InvoiceType::Purchase, false),
        vec![Pay, Revert, Cancel]
    );
    assert_eq!(
        allowed_actions(Approved, InvoiceType::Return, false),
        vec![Pay, Revert, Cancel]
    );
    assert!(allowed_actions(Paid, InvoiceType::Sale, false).is_empty());
    assert_eq!(allowed_actions(Paid, InvoiceType::Sale, true), vec![Revert]);
    assert!(allowed_actions(Canceled, InvoiceType::Sale, true).is_empty());
    assert_eq!(allowed_actions(Draft, InvoiceType::Proforma, false), vec![Cancel]);
    assert_eq!(payment_action(InvoiceType::Proforma), None);
}

#[test]
fn status_after_actions() {
    use InvoiceAction::*;
    use InvoiceStatus::*;
    assert_eq!(next_status(Draft, Approve), Approved);
    assert_eq!(next_status(Approved, Collect), Paid);
    assert_eq!(next_status(Approved, Revert), Draft);
    assert_eq!(next_status(Paid, Revert), Approved);
    assert_eq!(next_status(Approved, Cancel), Canceled);
}

#[test]
fn paid_revert_requires_admin() {
    let inv = invoice("paid", "sale");
    assert_eq!(
        check_transition(&inv, InvoiceAction::Revert, false),
        Err(WorkflowError::AdminOnly)
    );
    assert!(check_transition(&inv, InvoiceAction::Revert, true).is_ok());
}

#[test]
fn dialog_prefills_remaining_and_hides_cari_accounts() {
    let inv = invoice("approved", "sale");
    let dialog = PaymentDialog::for_invoice(&inv);
    assert_eq!(dialog.amount, Decimal::from(200));
    assert!(!dialog.can_submit());

    let accs = accounts();
    let offered = PaymentDialog::selectable_accounts(&accs);
    assert_eq!(offered.len(), 1);
    assert_eq!(offered[0].id, "kasa");
}

#[test]
fn paid_unreachable_without_account() {
    let api = client(FakeTransport::new().on("POST", "/invoices/inv1/collect", json!({})));
    let inv = invoice("approved", "sale");
    let dialog = PaymentDialog::for_invoice(&inv);
    let err = InvoiceWorkflow::new(&api)
        .settle(&inv, &dialog, &accounts())
        .unwrap_err();
    assert!(matches!(err, ActionError::Rejected(WorkflowError::MissingAccount)));
    assert!(api.transport().requests().is_empty());
}

#[test]
fn paid_unreachable_without_positive_amount() {
    let api = client(FakeTransport::new().on("POST", "/invoices/inv1/collect", json!({})));
    let inv = invoice("approved", "sale");
    let mut dialog = PaymentDialog::for_invoice(&inv);
    dialog.account_id = Some("kasa".into());
    dialog.amount = Decimal::ZERO;
    assert!(!dialog.can_submit());
    let err = InvoiceWorkflow::new(&api)
        .settle(&inv, &dialog, &accounts())
        .unwrap_err();
    assert!(matches!(err, ActionError::Rejected(WorkflowError::NonPositiveAmount)));
    assert!(api.transport().requests().is_empty());
}

#[test]
fn paid_unreachable_through_cari_account() {
    let api = client(FakeTransport::new());
    let inv = invoice("approved", "sale");
    let mut dialog = PaymentDialog::for_invoice(&inv);
    dialog.account_id = Some("cari1".into());
    let err = InvoiceWorkflow::new(&api)
        .settle(&inv, &dialog, &accounts())
        .unwrap_err();
    assert!(matches!(err, ActionError::Rejected(WorkflowError::CariAccount(_))));
    assert!(api.transport().requests().is_empty());
}

#[test]
fn collect_posts_payment_body() {
    let api = client(FakeTransport::new().on("POST", "/invoices/inv1/collect", json!({"status": "paid"})));
    let inv = invoice("approved", "sale");
    let mut dialog = PaymentDialog::for_invoice(&inv);
    dialog.account_id = Some("kasa".into());
    dialog.description = Some("  Nakit tahsilat ".into());
    InvoiceWorkflow::new(&api)
        .settle(&inv, &dialog, &accounts())
        .unwrap();

    let req = api.transport().last().unwrap();
    assert_eq!(req.path, "/invoices/inv1/collect");
    assert_eq!(
        req.body.unwrap(),
        json!({ "amount": 200.0, "accountId": "kasa", "description": "Nakit tahsilat" })
    );
}

#[test]
fn purchase_settles_through_pay() {
    let api = client(FakeTransport::new().on("POST", "/invoices/inv1/pay", json!({})));
    let inv = invoice("approved", "purchase");
    let mut dialog = PaymentDialog::for_invoice(&inv);
    dialog.account_id = Some("kasa".into());
    dialog.amount = Decimal::from_str("50.25").unwrap();
    InvoiceWorkflow::new(&api)
        .settle(&inv, &dialog, &accounts())
        .unwrap();
    assert_eq!(api.transport().count("POST", "/invoices/inv1/pay"), 1);
}

#[test]
fn draft_cannot_be_settled() {
    let api = client(FakeTransport::new());
    let inv = invoice("draft", "sale");
    let mut dialog = PaymentDialog::for_invoice(&inv);
    dialog.account_id = Some("kasa".into());
    let err = InvoiceWorkflow::new(&api)
        .settle(&inv, &dialog, &accounts())
        .unwrap_err();
    assert!(matches!(err, ActionError::Rejected(WorkflowError::NotAllowed { .. })));
    assert!(api.transport().requests().is_empty());
}

#[test]
fn approve_and_revert_use_dedicated_endpoints() {
    let api = client(
        FakeTransport::new()
            .on("POST", "/invoices/inv1/approve", json!({}))
            .on("POST", "/invoices/inv1/revert", json!({})),
    );
    InvoiceWorkflow::new(&api)
        .approve(&invoice("draft", "sale"))
        .unwrap();
    InvoiceWorkflow::new(&api)
        .as_admin(true)
        .revert(&invoice("paid", "sale"))
        .unwrap();
    assert_eq!(api.transport().count("POST", "/invoices/inv1/approve"), 1);
    assert_eq!(api.transport().count("POST", "/invoices/inv1/revert"), 1);
    assert_eq!(api.transport().count("PATCH", "/invoices/inv1/status"), 0);
}

#[test]
fn cancel_goes_through_status_update() {
    let api = client(FakeTransport::new().on("PATCH", "/invoices/inv1/status", json!({})));
    InvoiceWorkflow::new(&api)
        .cancel(&invoice("approved", "sale"))
        .unwrap();
    let req = api.transport().last().unwrap();
    assert_eq!(req.method.as_str(), "PATCH");
    assert_eq!(req.body.unwrap(), json!({ "status": "canceled" }));

    let err = InvoiceWorkflow::new(&api)
        .cancel(&invoice("canceled", "sale"))
        .unwrap_err();
    assert!(matches!(err, ActionError::Rejected(_)));
}

#[test]
fn server_message_surfaces_on_failure() {
    let api = client(FakeTransport::new().fail(
        "POST",
        "/invoices/inv1/approve",
        400,
        r#"{"msg":"Yetersiz stok"}"#,
    ));
    let err = InvoiceWorkflow::new(&api)
        .approve(&invoice("draft", "sale"))
        .unwrap_err();
    assert_eq!(err.user_message(), "Yetersiz stok");
}

#[test]
fn pay_command_settles_with_open_amount() {
    let api = client(
        FakeTransport::new()
            .on(
                "GET",
                "/invoices/inv1",
                json!({ "invoice": serde_json::to_value(invoice("approved", "sale")).unwrap() }),
            )
            .on("GET", "/accounts", accounts_json())
            .on("POST", "/invoices/inv1/collect", json!({})),
    );
    let bus = RefreshBus::new();
    let m = area_matches(&["invoice", "pay", "--id", "inv1", "--account", "kasa"]);
    invoices::handle(&api, &bus, &m).unwrap();

    let body = api.transport().last().unwrap().body.unwrap();
    assert_eq!(body["amount"], json!(200.0));
    assert_eq!(body["accountId"], "kasa");
    assert_eq!(bus.generation(Resource::Invoices), 1);
    assert_eq!(bus.generation(Resource::Products), 1);
}

#[test]
fn pay_command_refuses_cari_account() {
    let api = client(
        FakeTransport::new()
            .on(
                "GET",
                "/invoices/inv1",
                serde_json::to_value(invoice("approved", "sale")).unwrap(),
            )
            .on("GET", "/accounts", accounts_json()),
    );
    let bus = RefreshBus::new();
    let m = area_matches(&["invoice", "pay", "--id", "inv1", "--account", "cari1"]);
    assert!(invoices::handle(&api, &bus, &m).is_err());
    assert_eq!(api.transport().count("POST", "/invoices/inv1/collect"), 0);
    assert_eq!(bus.generation(Resource::Invoices), 0);
}
