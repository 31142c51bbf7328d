// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde_json::Value;

use crate::api::{ApiClient, Transport};
use crate::csv_io::{self, StockCountImport};
use crate::error::ActionOutcome;
use crate::forms::ProductForm;
use crate::listing::{ListState, SortOrder, filter_local, product_fields};
use crate::models::Product;
use crate::refresh::{RefreshBus, Resource};
use crate::utils::{date_or_today, fmt_amount, maybe_print_json, parse_decimal, pretty_table, today};

use super::{overlay_decimal, overlay_opt, overlay_str, print_change_note, report};

/// List state built from `product list` arguments.
pub fn list_state(m: &clap::ArgMatches) -> ListState<Product> {
    let mut state = ListState::new(Resource::Products);
    if let Some(term) = m.get_one::<String>("search") {
        state.set_search(term);
    }
    for key in ["category", "brand"] {
        if let Some(v) = m.get_one::<String>(key) {
            state.set_filter(key, v);
        }
    }
    if let Some(field) = m.get_one::<String>("sort") {
        let order = m.get_one::<String>("order").map(String::as_str).unwrap_or("asc");
        state.set_sort(field, SortOrder::from_string(order));
    }
    if let Some(limit) = m.get_one::<u32>("limit") {
        state.query.limit = *limit;
    }
    if let Some(page) = m.get_one::<u32>("page") {
        state.set_page(*page);
    }
    state
}

pub struct ProductListing {
    pub rows: Vec<Product>,
    pub total_pages: u32,
    pub changed: bool,
}

/// Fetch one page and apply the client-side `--critical` and `--filter`.
pub fn query_rows<T: Transport>(
    api: &ApiClient<T>,
    bus: &RefreshBus,
    m: &clap::ArgMatches,
) -> Result<ProductListing> {
    let mut state = list_state(m);
    state
        .refresh_tracked(api, bus)
        .map_err(|e| anyhow!(e.user_message()))?;
    let needle = m.get_one::<String>("filter").map(String::as_str).unwrap_or("");
    let critical_only = m.get_flag("critical");
    let rows = filter_local(&state.items, needle, product_fields)
        .into_iter()
        .filter(|p| !critical_only || p.is_critical())
        .cloned()
        .collect();
    Ok(ProductListing {
        rows,
        total_pages: state.total_pages,
        changed: state.changed_since_last_view(),
    })
}

fn form_from_args(m: &clap::ArgMatches) -> Result<ProductForm> {
    let dec = |key: &str| -> Result<rust_decimal::Decimal> {
        parse_decimal(m.get_one::<String>(key).map(String::as_str).unwrap_or("0"))
    };
    Ok(ProductForm {
        name: m.get_one::<String>("name").cloned().unwrap_or_default(),
        sku: m.get_one::<String>("sku").cloned().unwrap_or_default(),
        barcode: m.get_one::<String>("barcode").cloned(),
        quantity: dec("quantity")?,
        unit: m.get_one::<String>("unit").cloned(),
        purchase_price: dec("purchase-price")?,
        sale_price: dec("sale-price")?,
        currency: m.get_one::<String>("currency").cloned(),
        critical_stock_level: dec("critical-level")?,
        track_stock: m.get_flag("track-stock"),
        category: m.get_one::<String>("category").cloned(),
        brand: m.get_one::<String>("brand").cloned(),
        tags: m
            .get_many::<String>("tag")
            .map(|v| v.cloned().collect())
            .unwrap_or_default(),
        oem_code: m.get_one::<String>("oem").cloned(),
    })
}

/// The stored product with the given flags applied on top.
pub fn update_form(current: &Product, m: &clap::ArgMatches) -> Result<ProductForm> {
    let mut form = ProductForm::from(current);
    overlay_str(&mut form.name, m, "name");
    overlay_str(&mut form.sku, m, "sku");
    overlay_opt(&mut form.barcode, m, "barcode");
    overlay_decimal(&mut form.quantity, m, "quantity")?;
    overlay_opt(&mut form.unit, m, "unit");
    overlay_decimal(&mut form.purchase_price, m, "purchase-price")?;
    overlay_decimal(&mut form.sale_price, m, "sale-price")?;
    overlay_opt(&mut form.currency, m, "currency");
    overlay_decimal(&mut form.critical_stock_level, m, "critical-level")?;
    if let Some(track) = m.get_one::<bool>("track-stock") {
        form.track_stock = *track;
    }
    overlay_opt(&mut form.category, m, "category");
    overlay_opt(&mut form.brand, m, "brand");
    if let Some(tags) = m.get_many::<String>("tag") {
        form.tags = tags.cloned().collect();
    }
    overlay_opt(&mut form.oem_code, m, "oem");
    Ok(form)
}

/// Parse a stock-count file into the import payload.
pub fn build_import(path: &Path, m: &clap::ArgMatches) -> Result<StockCountImport> {
    let updates = csv_io::parse_stock_count_file(path)
        .with_context(|| format!("Stok sayım dosyası okunamadı: {}", path.display()))?;
    let date = date_or_today(m.get_one::<String>("date"))?;
    let count_type = m
        .get_one::<String>("count-type")
        .map(String::as_str)
        .unwrap_or("full");
    Ok(StockCountImport::new(updates, date, count_type))
}

pub fn handle<T: Transport>(api: &ApiClient<T>, bus: &RefreshBus, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => {
            let ProductListing {
                rows,
                total_pages,
                changed,
            } = query_rows(api, bus, sub)?;
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &rows)? {
                return Ok(());
            }
            let data = rows
                .iter()
                .map(|p| {
                    vec![
                        p.sku.clone(),
                        p.name.clone(),
                        fmt_amount(&p.quantity),
                        p.unit.clone().unwrap_or_else(|| "adet".into()),
                        format!("{} {}", fmt_amount(&p.sale_price), p.currency),
                        if p.is_critical() { "!".into() } else { String::new() },
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(&["SKU", "Ürün Adı", "Miktar", "Birim", "Satış", "Kritik"], data)
            );
            let page = sub.get_one::<u32>("page").copied().unwrap_or(1);
            println!("Sayfa {}/{}", page.min(total_pages), total_pages);
            print_change_note(changed);
        }
        Some(("add", sub)) => {
            let form = form_from_args(sub)?;
            form.validate().into_result()?;
            let created = api
                .create_product(form.to_payload())
                .map_err(|e| anyhow!(e.user_message()))?;
            bus.publish(Resource::Products);
            println!("Ürün eklendi: {} ({})", created.name, created.id);
        }
        Some(("update", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            let current = api.product(id).map_err(|e| anyhow!(e.user_message()))?;
            let form = update_form(&current, sub)?;
            form.validate().into_result()?;
            let updated = api
                .update_product(id, form.to_payload())
                .map_err(|e| anyhow!(e.user_message()))?;
            bus.publish(Resource::Products);
            println!("Ürün güncellendi: {}", updated.name);
        }
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            report(ActionOutcome::from_api(&api.delete_product(id), "Ürün silindi"))?;
            bus.publish(Resource::Products);
        }
        Some(("suggest", sub)) => {
            let q = sub.get_one::<String>("q").unwrap();
            let items = api
                .product_suggestions(q)
                .map_err(|e| anyhow!(e.user_message()))?;
            for s in items {
                println!("{}", s);
            }
        }
        Some(("import-stock", sub)) => {
            let path = Path::new(sub.get_one::<String>("path").unwrap());
            let payload = build_import(path, sub)?;
            if payload.stock_updates.is_empty() {
                return Err(anyhow!(crate::error::ImportError::Empty));
            }
            if sub.get_flag("dry-run") {
                println!("{}", serde_json::to_string_pretty(&payload)?);
                return Ok(());
            }
            let resp = api
                .import_stock_count(&payload)
                .map_err(|e| anyhow!(e.user_message()))?;
            bus.publish(Resource::Products);
            let msg = resp
                .get("message")
                .or_else(|| resp.get("msg"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| {
                    format!(
                        "{} ürün için stok sayımı aktarıldı (toplam {})",
                        payload.total_items_counted,
                        fmt_amount(&payload.total_quantity_counted)
                    )
                });
            println!("{}", msg);
        }
        Some(("export", sub)) => {
            let dir = Path::new(sub.get_one::<String>("dir").unwrap());
            let products = api.products().map_err(|e| anyhow!(e.user_message()))?;
            let path = csv_io::export_to_dir(
                dir,
                "urunler",
                today(),
                &csv_io::PRODUCT_HEADERS,
                &csv_io::product_rows(&products),
            )?;
            println!("{} ürün dışa aktarıldı: {}", products.len(), path.display());
        }
        _ => {}
    }
    Ok(())
}
