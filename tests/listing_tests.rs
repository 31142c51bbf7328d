// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use carihesap::commands::products;
use carihesap::listing::{
    ListQuery, ListState, RequestSequencer, SortOrder, filter_local, product_fields, turkish_lower,
};
use carihesap::models::{Invoice, Product};
use carihesap::refresh::{RefreshBus, Resource};
use common::{FakeTransport, client, sub_matches};
use serde_json::json;

fn pairs(v: &[(&str, &str)]) -> Vec<(String, String)> {
    v.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn product(name: &str, sku: &str) -> Product {
    Product {
        id: sku.to_lowercase(),
        name: name.into(),
        sku: sku.into(),
        ..Default::default()
    }
}

#[test]
fn params_in_stable_order_and_empty_filters_skipped() {
    let mut q = ListQuery::default();
    q.search_term = " vida ".into();
    q.filters.insert("status".into(), "approved".into());
    q.filters.insert("brand".into(), "  ".into());
    q.sort = Some(carihesap::listing::Sort {
        field: "date".into(),
        order: SortOrder::Desc,
    });
    q.page = 0;
    assert_eq!(
        q.to_params(),
        pairs(&[
            ("page", "1"),
            ("limit", "20"),
            ("search", "vida"),
            ("sortBy", "date"),
            ("sortOrder", "desc"),
            ("status", "approved"),
        ])
    );
}

#[test]
fn search_and_filter_reset_page() {
    let mut state: ListState<Invoice> = ListState::new(Resource::Invoices);
    state.set_page(4);
    state.set_filter("status", "draft");
    assert_eq!(state.query.page, 1);
    state.set_page(3);
    state.set_search("F-1");
    assert_eq!(state.query.page, 1);
    state.set_filter("status", "");
    assert!(state.query.filters.is_empty());
}

#[test]
fn product_search_switches_to_flat_endpoint() {
    let mut state: ListState<Product> = ListState::new(Resource::Products);
    assert_eq!(state.request().path, "/products");
    state.set_search("fren");
    let req = state.request();
    assert_eq!(req.path, "/search/products");
    assert_eq!(req.query, pairs(&[("q", "fren")]));

    let mut invoices: ListState<Invoice> = ListState::new(Resource::Invoices);
    invoices.set_search("fren");
    assert_eq!(invoices.request().path, "/invoices");
}

#[test]
fn flat_search_reports_single_page() {
    let api = client(FakeTransport::new().on(
        "GET",
        "/search/products",
        json!({ "products": [{ "_id": "1", "name": "Fren Balatası", "sku": "FB-1" }], "totalPages": 7 }),
    ));
    let mut state: ListState<Product> = ListState::new(Resource::Products);
    state.set_search("fren");
    state.refresh(&api).unwrap();
    assert_eq!(state.items.len(), 1);
    assert_eq!(state.total_pages, 1);
    assert!(!state.loading);
}

#[test]
fn paged_list_keeps_total_pages() {
    let api = client(FakeTransport::new().on(
        "GET",
        "/invoices",
        json!({ "invoices": [], "totalPages": 3, "total": 41 }),
    ));
    let mut state: ListState<Invoice> = ListState::new(Resource::Invoices);
    state.refresh(&api).unwrap();
    assert_eq!(state.total_pages, 3);
    assert_eq!(state.total, Some(41));
}

#[test]
fn stale_response_is_dropped() {
    let mut state: ListState<Product> = ListState::new(Resource::Products);
    let first = state.begin_fetch();
    state.set_search("yeni");
    let second = state.begin_fetch();

    let newer = json!([{ "_id": "2", "name": "Yeni", "sku": "Y" }]);
    assert!(state.complete(&second, Ok(newer)).unwrap());

    let older = json!([{ "_id": "1", "name": "Eski", "sku": "E" }]);
    assert!(!state.complete(&first, Ok(older)).unwrap());
    assert_eq!(state.items.len(), 1);
    assert_eq!(state.items[0].name, "Yeni");
}

#[test]
fn sequencer_tracks_newest_ticket() {
    let seq = RequestSequencer::default();
    let a = seq.begin();
    let b = seq.begin();
    assert!(b > a);
    assert!(seq.is_current(b));
    assert!(!seq.is_current(a));
}

#[test]
fn staleness_follows_bus_generation() {
    let api = client(FakeTransport::new().on("GET", "/products", json!([])));
    let bus = RefreshBus::new();
    let mut state: ListState<Product> = ListState::new(Resource::Products);
    state.refresh_tracked(&api, &bus).unwrap();
    assert!(!state.is_stale(&bus));
    bus.publish(Resource::Invoices);
    assert!(!state.is_stale(&bus));
    bus.publish(Resource::Products);
    assert!(state.is_stale(&bus));
    state.refresh_tracked(&api, &bus).unwrap();
    assert!(!state.is_stale(&bus));
}

#[test]
fn turkish_lowercase_rules() {
    assert_eq!(turkish_lower("IŞIK"), "ışık");
    assert_eq!(turkish_lower("İSTANBUL"), "istanbul");
}

#[test]
fn local_filter_matches_any_field() {
    let mut items = vec![
        product("Işık Anahtarı", "IA-1"),
        product("İstanbul Vida", "IV-2"),
        product("Somun", "S-3"),
    ];
    items[2].tags = vec!["bağlantı".into()];
    let hits = filter_local(&items, "ışık", product_fields);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].sku, "IA-1");
    assert_eq!(filter_local(&items, "istanbul", product_fields).len(), 1);
    assert_eq!(filter_local(&items, "BAĞLANTI", product_fields).len(), 1);
    assert_eq!(filter_local(&items, "  ", product_fields).len(), 3);
}

#[test]
fn product_list_args_become_query() {
    let m = sub_matches(&[
        "product", "list", "--category", "cat1", "--sort", "name", "--order", "desc", "--page",
        "2", "--limit", "50",
    ]);
    let state = products::list_state(&m);
    let params = state.request().query;
    assert!(params.contains(&("page".into(), "2".into())));
    assert!(params.contains(&("limit".into(), "50".into())));
    assert!(params.contains(&("category".into(), "cat1".into())));
    assert!(params.contains(&("sortOrder".into(), "desc".into())));
}

#[test]
fn product_rows_apply_critical_filter() {
    let api = client(FakeTransport::new().on(
        "GET",
        "/products",
        json!({ "products": [
            { "_id": "1", "name": "A", "sku": "A", "quantity": 2, "criticalStockLevel": 5, "trackStock": true },
            { "_id": "2", "name": "B", "sku": "B", "quantity": 9, "criticalStockLevel": 5, "trackStock": true },
            { "_id": "3", "name": "C", "sku": "C", "quantity": 0, "criticalStockLevel": 5, "trackStock": false }
        ], "totalPages": 1 }),
    ));
    let bus = RefreshBus::new();
    let m = sub_matches(&["product", "list", "--critical"]);
    let listing = products::query_rows(&api, &bus, &m).unwrap();
    assert_eq!(listing.total_pages, 1);
    assert_eq!(listing.rows.len(), 1);
    assert_eq!(listing.rows[0].sku, "A");
    assert!(!listing.changed);
}
