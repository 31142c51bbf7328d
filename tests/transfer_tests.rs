// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use carihesap::commands::accounts;
use carihesap::error::TransferError;
use carihesap::refresh::{RefreshBus, Resource};
use carihesap::transfer::{self, Party, TransferFailure, TransferRequest};
use chrono::NaiveDate;
use common::{FakeTransport, area_matches, client, sub_matches};
use rust_decimal::Decimal;
use serde_json::json;

fn req(source: Party, target: Party, amount: i64) -> TransferRequest {
    TransferRequest {
        source,
        target,
        amount: Decimal::from(amount),
        description: None,
        date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
    }
}

#[test]
fn parses_party_prefixes() {
    assert_eq!(Party::parse("account:a1"), Some(Party::Account("a1".into())));
    assert_eq!(Party::parse(" Customer : c1 "), Some(Party::Customer("c1".into())));
    assert_eq!(Party::parse("tedarikçi:s1"), Some(Party::Supplier("s1".into())));
    assert_eq!(Party::parse("a1"), None);
    assert_eq!(Party::parse("account:"), None);
}

#[test]
fn same_party_rejected_without_network() {
    let api = client(FakeTransport::new().on("POST", "/accounts/transfer", json!({})));
    let r = req(Party::Account("a1".into()), Party::Account("a1".into()), 10);
    let err = transfer::execute(&api, &r).unwrap_err();
    assert!(matches!(err, TransferFailure::Rejected(TransferError::SameParty)));
    assert!(api.transport().requests().is_empty());
}

#[test]
fn same_id_of_different_kind_is_allowed() {
    let r = req(Party::Account("x".into()), Party::Customer("x".into()), 10);
    assert!(r.check().is_ok());
}

#[test]
fn cari_to_cari_rejected() {
    let api = client(FakeTransport::new());
    let r = req(Party::Customer("c1".into()), Party::Supplier("s1".into()), 10);
    let err = transfer::execute(&api, &r).unwrap_err();
    assert!(matches!(err, TransferFailure::Rejected(TransferError::CariToCari)));
    assert!(!err.user_message().is_empty());
    assert!(api.transport().requests().is_empty());
}

#[test]
fn non_positive_amount_rejected() {
    let r = req(Party::Account("a1".into()), Party::Account("a2".into()), 0);
    assert_eq!(r.check(), Err(TransferError::NonPositiveAmount));
    let r = req(Party::Account("a1".into()), Party::Account("a2".into()), -5);
    assert_eq!(r.check(), Err(TransferError::NonPositiveAmount));
}

#[test]
fn account_to_account_uses_accounts_endpoint() {
    let r = req(Party::Account("a1".into()), Party::Account("a2".into()), 150);
    let plan = r.plan().unwrap();
    assert_eq!(plan.path, "/accounts/transfer");
    assert_eq!(
        plan.body,
        json!({
            "amount": 150.0,
            "description": "Transfer",
            "date": "2025-04-01",
            "sourceAccount": "a1",
            "targetAccount": "a2"
        })
    );
}

#[test]
fn cari_transfer_carries_discriminators() {
    let r = req(Party::Customer("c1".into()), Party::Account("a2".into()), 75);
    let plan = r.plan().unwrap();
    assert_eq!(plan.path, "/transactions/transfer");
    assert_eq!(plan.body["sourceType"], "customer");
    assert_eq!(plan.body["targetType"], "account");
    assert_eq!(plan.body["customer"], "c1");
    assert_eq!(plan.body["targetAccount"], "a2");
    assert!(plan.body.get("sourceAccount").is_none());

    let r = req(Party::Account("a1".into()), Party::Supplier("s1".into()), 75);
    let plan = r.plan().unwrap();
    assert_eq!(plan.body["sourceAccount"], "a1");
    assert_eq!(plan.body["supplier"], "s1");
    assert_eq!(plan.body["targetType"], "supplier");
}

#[test]
fn execute_posts_plan() {
    let api = client(FakeTransport::new().on("POST", "/transactions/transfer", json!({"ok": true})));
    let r = req(Party::Account("a1".into()), Party::Customer("c1".into()), 20);
    transfer::execute(&api, &r).unwrap();
    let sent = api.transport().last().unwrap();
    assert_eq!(sent.path, "/transactions/transfer");
    assert_eq!(sent.body.unwrap()["customer"], "c1");
}

#[test]
fn transfer_request_from_cli() {
    let m = sub_matches(&[
        "account",
        "transfer",
        "--from",
        "account:a1",
        "--to",
        "supplier:s1",
        "--amount",
        "1.250,75",
        "--date",
        "2025-05-02",
    ]);
    let r = accounts::transfer_request(&m).unwrap();
    assert_eq!(r.source, Party::Account("a1".into()));
    assert_eq!(r.target, Party::Supplier("s1".into()));
    assert_eq!(r.amount.to_string(), "1250.75");
    assert_eq!(r.date, NaiveDate::from_ymd_opt(2025, 5, 2).unwrap());
}

#[test]
fn transfer_command_publishes_touched_lists() {
    let api = client(FakeTransport::new().on("POST", "/transactions/transfer", json!({})));
    let bus = RefreshBus::new();
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    carihesap::db::init_schema(&conn).unwrap();
    let m = area_matches(&[
        "account", "transfer", "--from", "account:a1", "--to", "customer:c1", "--amount", "5",
    ]);
    accounts::handle(&api, &bus, &conn, &m).unwrap();
    assert_eq!(bus.generation(Resource::Accounts), 1);
    assert_eq!(bus.generation(Resource::Customers), 1);
    assert_eq!(bus.generation(Resource::Suppliers), 0);
}

#[test]
fn transfer_command_rejects_cari_pair() {
    let api = client(FakeTransport::new());
    let bus = RefreshBus::new();
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    let m = area_matches(&[
        "account", "transfer", "--from", "customer:c1", "--to", "supplier:s1", "--amount", "5",
    ]);
    assert!(accounts::handle(&api, &bus, &conn, &m).is_err());
    assert!(api.transport().requests().is_empty());
}
