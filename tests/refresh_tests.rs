// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use std::sync::Arc;
use std::thread;

use carihesap::db;
use carihesap::listing::ListState;
use carihesap::models::{CariType, Product};
use carihesap::refresh::{RefreshBus, Resource};
use common::{FakeTransport, area_matches, client};
use rusqlite::Connection;
use serde_json::json;
use tokio::sync::broadcast::error::TryRecvError;

#[test]
fn publish_notifies_only_that_resource() {
    let bus = RefreshBus::new();
    let mut products = bus.subscribe(Resource::Products);
    let mut invoices = bus.subscribe(Resource::Invoices);

    assert_eq!(bus.publish(Resource::Products), 1);
    assert_eq!(bus.publish(Resource::Products), 2);

    assert_eq!(products.try_recv().unwrap(), 1);
    assert_eq!(products.try_recv().unwrap(), 2);
    assert_eq!(invoices.try_recv(), Err(TryRecvError::Empty));
    assert_eq!(bus.generation(Resource::Invoices), 0);
}

#[test]
fn publishing_without_subscribers_still_counts() {
    let bus = RefreshBus::new();
    let rx = bus.subscribe(Resource::Accounts);
    drop(rx);
    assert_eq!(bus.publish(Resource::Accounts), 1);
    let mut live = bus.subscribe(Resource::Accounts);
    bus.publish(Resource::Accounts);
    assert_eq!(live.try_recv().unwrap(), 2);
}

#[test]
fn creating_cari_account_refreshes_partner_list() {
    let bus = RefreshBus::new();
    let mut suppliers = bus.subscribe(Resource::Suppliers);
    bus.publish_cari_created(CariType::Supplier);
    assert_eq!(bus.generation(Resource::Accounts), 1);
    assert_eq!(bus.generation(Resource::Suppliers), 1);
    assert_eq!(bus.generation(Resource::Customers), 0);
    assert_eq!(suppliers.try_recv().unwrap(), 1);
}

#[test]
fn bus_is_shareable_across_threads() {
    let bus = Arc::new(RefreshBus::new());
    let mut rx = bus.subscribe(Resource::Transactions);
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let bus = Arc::clone(&bus);
            thread::spawn(move || {
                bus.publish(Resource::Transactions);
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(bus.generation(Resource::Transactions), 4);
    let mut seen = Vec::new();
    while let Ok(g) = rx.try_recv() {
        seen.push(g);
    }
    seen.sort();
    assert_eq!(seen, vec![1, 2, 3, 4]);
}

fn store() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

#[test]
fn counters_survive_save_and_load() {
    let conn = store();
    let bus = RefreshBus::load(&conn).unwrap();
    assert_eq!(bus.generation(Resource::Products), 0);
    bus.publish(Resource::Products);
    bus.publish(Resource::Products);
    bus.mark_seen(Resource::Invoices, 7);
    bus.save(&conn).unwrap();

    let reloaded = RefreshBus::load(&conn).unwrap();
    assert_eq!(reloaded.generation(Resource::Products), 2);
    assert_eq!(reloaded.last_seen(Resource::Invoices), 7);
    assert_eq!(reloaded.publish(Resource::Products), 3);
}

#[test]
fn corrupt_counter_reads_as_zero() {
    let conn = store();
    db::set_setting(&conn, "refresh.generation.brands", "lots").unwrap();
    let bus = RefreshBus::load(&conn).unwrap();
    assert_eq!(bus.generation(Resource::Brands), 0);
}

#[test]
fn mark_seen_reports_changes() {
    let bus = RefreshBus::new();
    assert!(!bus.mark_seen(Resource::Products, 0));
    bus.publish(Resource::Products);
    assert!(bus.mark_seen(Resource::Products, 1));
    assert!(!bus.mark_seen(Resource::Products, 1));
}

fn products_api() -> common::FakeTransport {
    FakeTransport::new()
        .on("GET", "/products", json!({ "products": [{ "_id": "p1", "name": "Vida" }], "totalPages": 1 }))
        .on("POST", "/products", json!({ "product": { "_id": "p2", "name": "Somun" } }))
}

#[test]
fn mutation_in_one_run_shows_as_change_in_the_next() {
    let conn = store();

    // first run lists products
    let api = client(products_api());
    let bus = RefreshBus::load(&conn).unwrap();
    let mut state: ListState<Product> = ListState::new(Resource::Products);
    state.refresh_tracked(&api, &bus).unwrap();
    assert!(!state.changed_since_last_view());
    bus.save(&conn).unwrap();

    // second run adds a product
    let bus = RefreshBus::load(&conn).unwrap();
    let m = area_matches(&["product", "add", "--name", "Somun"]);
    carihesap::commands::products::handle(&api, &bus, &m).unwrap();
    bus.save(&conn).unwrap();

    // third run lists again and notices
    let bus = RefreshBus::load(&conn).unwrap();
    let mut state: ListState<Product> = ListState::new(Resource::Products);
    state.refresh_tracked(&api, &bus).unwrap();
    assert!(state.changed_since_last_view());
    assert!(!state.is_stale(&bus));
    bus.save(&conn).unwrap();

    // and a fourth list sees nothing new
    let bus = RefreshBus::load(&conn).unwrap();
    let mut state: ListState<Product> = ListState::new(Resource::Products);
    state.refresh_tracked(&api, &bus).unwrap();
    assert!(!state.changed_since_last_view());
}
