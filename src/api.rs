// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! REST client for the back-office API.
//!
//! `Transport` is the seam between typed calls and the wire. `HttpTransport`
//! is the real blocking client; tests plug in a scripted one.

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::listing::ListQuery;
use crate::models::{
    Account, Classifier, DebtSummary, Invoice, Partner, PartnerKind, Product, Transaction,
};

const FETCH_ALL_PAGE_SIZE: u32 = 100;

const UA: &str = concat!("carihesap/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn query(mut self, params: Vec<(String, String)>) -> Self {
        self.query = params;
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

pub trait Transport {
    fn execute(&self, req: ApiRequest) -> ApiResult<Value>;

    /// Replace the bearer token after login or logout.
    fn set_token(&mut self, token: Option<String>);
}

pub struct HttpTransport {
    client: reqwest::blocking::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpTransport {
    pub fn new(base_url: &str, token: Option<String>, timeout_secs: u64) -> ApiResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .user_agent(UA)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }
}

impl Transport for HttpTransport {
    fn execute(&self, req: ApiRequest) -> ApiResult<Value> {
        let url = format!("{}/{}", self.base_url, req.path.trim_start_matches('/'));
        debug!(method = %req.method, %url, "api request");
        let mut builder = self.client.request(req.method, &url);
        if !req.query.is_empty() {
            builder = builder.query(&req.query);
        }
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &req.body {
            builder = builder.json(body);
        }
        let resp = builder.send()?;
        let status = resp.status();
        let text = resp.text()?;
        if !status.is_success() {
            debug!(status = status.as_u16(), "api error response");
            return Err(ApiError::from_body(status.as_u16(), &text));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }
}

/// One page of a list endpoint.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_pages: u32,
    pub total: Option<u64>,
}

impl<T: DeserializeOwned> Page<T> {
    /// Accepts either a bare array or an envelope such as
    /// `{ "products": [...], "totalPages": 3 }`.
    pub fn from_value(v: Value, key: &str) -> ApiResult<Self> {
        match v {
            Value::Array(_) => {
                let items: Vec<T> = serde_json::from_value(v)?;
                Ok(Page {
                    total: Some(items.len() as u64),
                    items,
                    total_pages: 1,
                })
            }
            Value::Object(mut map) => {
                let list_key = [key, "items", "data", "results"]
                    .into_iter()
                    .find(|k| map.get(*k).is_some_and(Value::is_array))
                    .ok_or_else(|| ApiError::Shape(format!("no '{}' list in response", key)))?;
                let list = map.remove(list_key).unwrap_or(Value::Null);
                let items: Vec<T> = serde_json::from_value(list)?;
                let total_pages = map
                    .get("totalPages")
                    .and_then(Value::as_u64)
                    .unwrap_or(1)
                    .max(1) as u32;
                let total = map
                    .get("total")
                    .or_else(|| map.get("totalItems"))
                    .and_then(Value::as_u64);
                Ok(Page {
                    items,
                    total_pages,
                    total,
                })
            }
            other => Err(ApiError::Shape(format!("unexpected list payload: {}", other))),
        }
    }
}

fn decode<T: DeserializeOwned>(v: Value) -> ApiResult<T> {
    Ok(serde_json::from_value(v)?)
}

/// Single documents sometimes arrive wrapped as `{ "<key>": {...} }`.
fn decode_one<T: DeserializeOwned>(v: Value, key: &str) -> ApiResult<T> {
    match v {
        Value::Object(mut map) if map.get(key).is_some_and(Value::is_object) => {
            decode(map.remove(key).unwrap_or(Value::Null))
        }
        other => decode(other),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentBody {
    #[serde(with = "crate::money::lenient")]
    pub amount: rust_decimal::Decimal,
    pub account_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

pub struct ApiClient<T: Transport> {
    transport: T,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn send(&self, req: ApiRequest) -> ApiResult<Value> {
        self.transport.execute(req)
    }

    fn get(&self, path: &str, query: Vec<(String, String)>) -> ApiResult<Value> {
        self.send(ApiRequest::new(Method::GET, path).query(query))
    }

    fn post(&self, path: &str, body: Value) -> ApiResult<Value> {
        self.send(ApiRequest::new(Method::POST, path).body(body))
    }

    fn put(&self, path: &str, body: Value) -> ApiResult<Value> {
        self.send(ApiRequest::new(Method::PUT, path).body(body))
    }

    fn delete(&self, path: &str) -> ApiResult<Value> {
        self.send(ApiRequest::new(Method::DELETE, path))
    }

    // auth

    /// Log in and keep the token on the transport. Returns the token so the
    /// caller can persist it.
    pub fn login(&mut self, username: &str, password: &str) -> ApiResult<String> {
        let v = self.post(
            "/auth/login",
            json!({ "username": username, "password": password }),
        )?;
        let token = v
            .get("token")
            .and_then(Value::as_str)
            .ok_or_else(|| ApiError::Shape("login response has no token".into()))?
            .to_string();
        self.transport.set_token(Some(token.clone()));
        Ok(token)
    }

    pub fn logout(&mut self) {
        self.transport.set_token(None);
    }

    // generic listing

    pub fn list_page<D: DeserializeOwned>(
        &self,
        resource: &str,
        query: Vec<(String, String)>,
    ) -> ApiResult<Page<D>> {
        let v = self.get(&format!("/{}", resource), query)?;
        Page::from_value(v, resource)
    }

    /// Every page of a list endpoint, concatenated. Stops at `totalPages`
    /// or at the first empty page.
    pub fn list_all<D: DeserializeOwned>(&self, resource: &str) -> ApiResult<Vec<D>> {
        let mut query = ListQuery {
            limit: FETCH_ALL_PAGE_SIZE,
            ..ListQuery::default()
        };
        let mut items = Vec::new();
        loop {
            let page: Page<D> = self.list_page(resource, query.to_params())?;
            let done = page.items.is_empty() || query.page >= page.total_pages;
            items.extend(page.items);
            if done {
                break;
            }
            query.page += 1;
        }
        debug!(resource, count = items.len(), pages = query.page, "fetched full list");
        Ok(items)
    }

    // products

    pub fn products(&self) -> ApiResult<Vec<Product>> {
        self.list_all("products")
    }

    pub fn product(&self, id: &str) -> ApiResult<Product> {
        decode_one(self.get(&format!("/products/{}", id), Vec::new())?, "product")
    }

    pub fn create_product(&self, payload: Value) -> ApiResult<Product> {
        decode_one(self.post("/products", payload)?, "product")
    }

    pub fn update_product(&self, id: &str, payload: Value) -> ApiResult<Product> {
        decode_one(self.put(&format!("/products/{}", id), payload)?, "product")
    }

    pub fn delete_product(&self, id: &str) -> ApiResult<()> {
        self.delete(&format!("/products/{}", id)).map(|_| ())
    }

    pub fn product_suggestions(&self, q: &str) -> ApiResult<Vec<String>> {
        let v = self.get(
            "/search/products/suggestions",
            vec![("q".into(), q.to_string())],
        )?;
        let list = match v {
            Value::Object(mut map) => map.remove("suggestions").unwrap_or(Value::Array(vec![])),
            other => other,
        };
        let items = list
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(|s| match s {
                        Value::String(s) => Some(s.clone()),
                        Value::Object(o) => o.get("name").and_then(Value::as_str).map(str::to_string),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(items)
    }

    pub fn import_stock_count<B: Serialize>(&self, payload: &B) -> ApiResult<Value> {
        self.post("/products/import-stock-count", serde_json::to_value(payload)?)
    }

    // customers / suppliers

    pub fn partners(&self, kind: PartnerKind) -> ApiResult<Vec<Partner>> {
        self.list_all(kind.resource())
    }

    pub fn create_partner(&self, kind: PartnerKind, payload: Value) -> ApiResult<Partner> {
        decode_one(
            self.post(&format!("/{}", kind.resource()), payload)?,
            kind.field(),
        )
    }

    pub fn update_partner(&self, kind: PartnerKind, id: &str, payload: Value) -> ApiResult<Partner> {
        decode_one(
            self.put(&format!("/{}/{}", kind.resource(), id), payload)?,
            kind.field(),
        )
    }

    pub fn delete_partner(&self, kind: PartnerKind, id: &str) -> ApiResult<()> {
        self.delete(&format!("/{}/{}", kind.resource(), id))
            .map(|_| ())
    }

    pub fn partner_debt(&self, kind: PartnerKind, id: &str) -> ApiResult<DebtSummary> {
        decode(self.get(&format!("/{}/{}/debt", kind.resource(), id), Vec::new())?)
    }

    // accounts

    pub fn accounts(&self) -> ApiResult<Vec<Account>> {
        self.list_all("accounts")
    }

    pub fn create_account(&self, payload: Value) -> ApiResult<Account> {
        decode_one(self.post("/accounts", payload)?, "account")
    }

    pub fn update_account(&self, id: &str, payload: Value) -> ApiResult<Account> {
        decode_one(self.put(&format!("/accounts/{}", id), payload)?, "account")
    }

    pub fn delete_account(&self, id: &str) -> ApiResult<()> {
        self.delete(&format!("/accounts/{}", id)).map(|_| ())
    }

    pub fn account_transactions(&self, id: &str) -> ApiResult<Vec<Transaction>> {
        let v = self.get(&format!("/accounts/{}/transactions", id), Vec::new())?;
        Ok(Page::from_value(v, "transactions")?.items)
    }

    // transactions

    pub fn transactions(&self, query: Vec<(String, String)>) -> ApiResult<Vec<Transaction>> {
        Ok(self.list_page("transactions", query)?.items)
    }

    pub fn create_transaction(&self, payload: Value) -> ApiResult<Value> {
        self.post("/transactions", payload)
    }

    // invoices

    pub fn invoices(&self) -> ApiResult<Vec<Invoice>> {
        self.list_all("invoices")
    }

    pub fn invoice(&self, id: &str) -> ApiResult<Invoice> {
        decode_one(self.get(&format!("/invoices/{}", id), Vec::new())?, "invoice")
    }

    pub fn create_invoice(&self, payload: Value) -> ApiResult<Invoice> {
        decode_one(self.post("/invoices", payload)?, "invoice")
    }

    pub fn update_invoice(&self, id: &str, payload: Value) -> ApiResult<Invoice> {
        decode_one(self.put(&format!("/invoices/{}", id), payload)?, "invoice")
    }

    pub fn delete_invoice(&self, id: &str) -> ApiResult<()> {
        self.delete(&format!("/invoices/{}", id)).map(|_| ())
    }

    /// Stock-moving and money-moving invoice actions. Only called through
    /// `invoice::workflow`.
    pub(crate) fn invoice_action(&self, id: &str, action: &str, body: Option<Value>) -> ApiResult<Value> {
        let mut req = ApiRequest::new(Method::POST, format!("/invoices/{}/{}", id, action));
        if let Some(b) = body {
            req = req.body(b);
        }
        self.send(req)
    }

    /// The generic status path. Only ever used to cancel.
    pub(crate) fn cancel_invoice_status(&self, id: &str) -> ApiResult<Value> {
        self.send(
            ApiRequest::new(Method::PATCH, format!("/invoices/{}/status", id))
                .body(json!({ "status": "canceled" })),
        )
    }

    // categories / brands

    pub fn classifiers(&self, resource: &str) -> ApiResult<Vec<Classifier>> {
        self.list_all(resource)
    }

    pub fn create_classifier(&self, resource: &str, payload: Value) -> ApiResult<Value> {
        self.post(&format!("/{}", resource), payload)
    }

    pub fn delete_classifier(&self, resource: &str, id: &str) -> ApiResult<()> {
        self.delete(&format!("/{}/{}", resource, id)).map(|_| ())
    }

    // transfers

    pub(crate) fn post_raw(&self, path: &str, body: Value) -> ApiResult<Value> {
        self.post(path, body)
    }
}
