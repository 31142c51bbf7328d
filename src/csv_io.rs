// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Stock-count CSV import and the Turkish CSV exports.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ImportError;
use crate::labels;
use crate::models::{Invoice, Partner, Product};
use crate::money::{self, parse_amount};

const BOM: &str = "\u{feff}";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    pub sku: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(with = "money::lenient")]
    pub counted_quantity: Decimal,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_opt_decimal"
    )]
    pub critical_stock_level: Option<Decimal>,
}

fn serialize_opt_decimal<S: serde::Serializer>(d: &Option<Decimal>, s: S) -> Result<S::Ok, S::Error> {
    match d {
        Some(d) => s.serialize_f64(money::to_f64(d)),
        None => s.serialize_none(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockCountImport {
    pub stock_updates: Vec<StockUpdate>,
    pub count_date: String,
    pub total_items_counted: usize,
    #[serde(with = "money::lenient")]
    pub total_quantity_counted: Decimal,
    pub count_type: String,
    pub device_info: String,
}

impl StockCountImport {
    pub fn new(updates: Vec<StockUpdate>, count_date: NaiveDate, count_type: &str) -> Self {
        let total_quantity_counted = updates.iter().map(|u| u.counted_quantity).sum();
        Self {
            total_items_counted: updates.len(),
            total_quantity_counted,
            stock_updates: updates,
            count_date: count_date.format("%Y-%m-%d").to_string(),
            count_type: count_type.to_string(),
            device_info: device_info(),
        }
    }
}

fn device_info() -> String {
    format!(
        "carihesap/{} ({} {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

fn normalize_header(h: &str) -> String {
    h.trim_start_matches('\u{feff}')
        .trim()
        .to_lowercase()
        .replace('\u{307}', "")
        .replace('ı', "i")
        .replace('ü', "u")
        .replace('ş', "s")
        .replace('ğ', "g")
        .replace('ç', "c")
        .replace('ö', "o")
}

#[derive(Debug, Default)]
struct Columns {
    product_id: Option<usize>,
    sku: Option<usize>,
    name: Option<usize>,
    quantity: Option<usize>,
    critical: Option<usize>,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Self {
        let mut cols = Columns::default();
        for (i, h) in headers.iter().enumerate() {
            match normalize_header(h).as_str() {
                "urun id" | "product id" | "id" => cols.product_id = Some(i),
                "sku" | "stok kodu" => cols.sku = Some(i),
                "urun adi" | "ad" | "name" => cols.name = Some(i),
                // "Sayılan Miktar" beats a plain "Miktar" column.
                "sayilan miktar" => cols.quantity = Some(i),
                "miktar" | "quantity" if cols.quantity.is_none() => cols.quantity = Some(i),
                "kritik stok seviyesi" | "kritik stok" => cols.critical = Some(i),
                _ => {}
            }
        }
        cols
    }
}

fn cell(rec: &csv::StringRecord, idx: Option<usize>) -> Option<&str> {
    idx.and_then(|i| rec.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Parse a stock-count sheet. Rows without a SKU or without a parseable
/// counted quantity are dropped.
pub fn parse_stock_count<R: Read>(mut input: R) -> Result<Vec<StockUpdate>, ImportError> {
    let mut raw = String::new();
    input.read_to_string(&mut raw)?;
    let text = raw.trim_start_matches(BOM);
    let first_line = text.lines().next().unwrap_or("");
    let delimiter = if first_line.contains(';') && !first_line.contains(',') {
        b';'
    } else {
        b','
    };

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());
    let cols = Columns::locate(rdr.headers()?);
    if cols.quantity.is_none() {
        return Err(ImportError::MissingQuantityColumn);
    }

    let mut out = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let rec = result?;
        let sku = cell(&rec, cols.sku);
        let qty = cell(&rec, cols.quantity).and_then(parse_amount);
        let (Some(sku), Some(counted_quantity)) = (sku, qty) else {
            debug!(row = line + 2, "skipping stock-count row without sku or quantity");
            continue;
        };
        out.push(StockUpdate {
            product_id: cell(&rec, cols.product_id).map(str::to_string),
            sku: sku.to_string(),
            name: cell(&rec, cols.name).map(str::to_string),
            counted_quantity,
            critical_stock_level: cell(&rec, cols.critical).and_then(parse_amount),
        });
    }
    if out.is_empty() {
        warn!("stock-count file produced no usable rows");
    }
    Ok(out)
}

pub fn parse_stock_count_file(path: &Path) -> Result<Vec<StockUpdate>, ImportError> {
    let f = std::fs::File::open(path)?;
    parse_stock_count(f)
}

/// `<prefix>_<YYYY-MM-DD>.csv`
pub fn export_filename(prefix: &str, today: NaiveDate) -> String {
    format!("{}_{}.csv", prefix, today.format("%Y-%m-%d"))
}

/// Write rows as UTF-8 CSV with a BOM so spreadsheet tools pick up the
/// Turkish characters.
pub fn write_csv<W: Write>(mut out: W, headers: &[&str], rows: &[Vec<String>]) -> csv::Result<()> {
    out.write_all(BOM.as_bytes())?;
    let mut wtr = WriterBuilder::new().delimiter(b',').from_writer(out);
    wtr.write_record(headers)?;
    for r in rows {
        wtr.write_record(r)?;
    }
    wtr.flush()?;
    Ok(())
}

fn dec(d: &Decimal) -> String {
    format!("{:.2}", d.round_dp(2))
}

fn opt(s: &Option<String>) -> String {
    s.clone().unwrap_or_default()
}

pub const PRODUCT_HEADERS: [&str; 11] = [
    "Ürün ID",
    "Ürün Adı",
    "SKU",
    "Barkod",
    "Miktar",
    "Birim",
    "Alış Fiyatı",
    "Satış Fiyatı",
    "Para Birimi",
    "Kritik Stok Seviyesi",
    "Kategori",
];

pub fn product_rows(products: &[Product]) -> Vec<Vec<String>> {
    products
        .iter()
        .map(|p| {
            vec![
                p.id.clone(),
                p.name.clone(),
                p.sku.clone(),
                opt(&p.barcode),
                p.quantity.normalize().to_string(),
                opt(&p.unit),
                dec(&p.purchase_price),
                dec(&p.sale_price),
                p.currency.clone(),
                p.critical_stock_level.normalize().to_string(),
                p.category
                    .as_ref()
                    .map(|c| c.display().to_string())
                    .unwrap_or_default(),
            ]
        })
        .collect()
}

pub const PARTNER_HEADERS: [&str; 7] = [
    "ID",
    "Ad",
    "E-posta",
    "Telefon",
    "Adres",
    "Vergi No",
    "Vergi Dairesi",
];

pub fn partner_rows(partners: &[Partner]) -> Vec<Vec<String>> {
    partners
        .iter()
        .map(|c| {
            vec![
                c.id.clone(),
                c.name.clone(),
                opt(&c.email),
                opt(&c.phone),
                opt(&c.address),
                opt(&c.tax_number),
                opt(&c.tax_office),
            ]
        })
        .collect()
}

pub const INVOICE_HEADERS: [&str; 9] = [
    "Fatura No",
    "Tür",
    "Cari",
    "Tarih",
    "Vade",
    "Durum",
    "Ödeme Durumu",
    "Toplam",
    "Para Birimi",
];

pub fn invoice_rows(invoices: &[Invoice]) -> Vec<Vec<String>> {
    let date = |d: &Option<NaiveDate>| d.map(|d| d.format("%d.%m.%Y").to_string()).unwrap_or_default();
    invoices
        .iter()
        .map(|i| {
            vec![
                i.invoice_number.clone(),
                labels::type_label(i.invoice_type).to_string(),
                i.customer_or_supplier.display().to_string(),
                date(&i.date),
                date(&i.due_date),
                labels::status_label(i.status).to_string(),
                labels::payment_status_label(i.payment_status).to_string(),
                dec(&i.total_amount),
                i.currency.clone(),
            ]
        })
        .collect()
}

/// Write an export into `dir` under the dated filename and return its path.
pub fn export_to_dir(
    dir: &Path,
    prefix: &str,
    today: NaiveDate,
    headers: &[&str],
    rows: &[Vec<String>],
) -> csv::Result<PathBuf> {
    let path = dir.join(export_filename(prefix, today));
    let f = std::fs::File::create(&path)?;
    write_csv(f, headers, rows)?;
    Ok(path)
}
