// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! List state for paged resources: search term, filters, sort and page are
//! serialized into one GET per refresh and the result replaces the items.
//!
//! Responses are applied through a ticket so an older request that finishes
//! late cannot overwrite a newer result.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::{ApiClient, ApiRequest, Page, Transport};
use crate::error::ApiResult;
use crate::models::Product;
use crate::refresh::{RefreshBus, Resource};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn from_string(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("desc") {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub order: SortOrder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub search_term: String,
    pub filters: BTreeMap<String, String>,
    pub sort: Option<Sort>,
    pub page: u32,
    pub limit: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            filters: BTreeMap::new(),
            sort: None,
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListQuery {
    pub fn is_searching(&self) -> bool {
        !self.search_term.trim().is_empty()
    }

    /// Query parameters in a stable order; empty filters are skipped.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("page".to_string(), self.page.max(1).to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ];
        if self.is_searching() {
            params.push(("search".to_string(), self.search_term.trim().to_string()));
        }
        if let Some(sort) = &self.sort {
            params.push(("sortBy".to_string(), sort.field.clone()));
            params.push(("sortOrder".to_string(), sort.order.as_str().to_string()));
        }
        for (k, v) in &self.filters {
            if !v.trim().is_empty() {
                params.push((k.clone(), v.trim().to_string()));
            }
        }
        params
    }
}

/// Hands out increasing tickets; only the newest ticket may apply.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    pub fn begin(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket
    }
}

/// A request that has been issued but whose response is not applied yet.
#[derive(Debug, Clone)]
pub struct PendingFetch {
    pub ticket: u64,
    pub request: ApiRequest,
    pub query: ListQuery,
}

pub struct ListState<D> {
    resource: Resource,
    pub items: Vec<D>,
    pub loading: bool,
    pub query: ListQuery,
    pub total_pages: u32,
    pub total: Option<u64>,
    seen_generation: u64,
    changed_since_seen: bool,
    sequencer: RequestSequencer,
}

impl<D: DeserializeOwned> ListState<D> {
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            items: Vec::new(),
            loading: false,
            query: ListQuery::default(),
            total_pages: 1,
            total: None,
            seen_generation: 0,
            changed_since_seen: false,
            sequencer: RequestSequencer::default(),
        }
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    pub fn set_search(&mut self, term: &str) {
        self.query.search_term = term.to_string();
        self.query.page = 1;
    }

    pub fn set_filter(&mut self, key: &str, value: &str) {
        if value.trim().is_empty() {
            self.query.filters.remove(key);
        } else {
            self.query.filters.insert(key.to_string(), value.to_string());
        }
        self.query.page = 1;
    }

    pub fn set_sort(&mut self, field: &str, order: SortOrder) {
        self.query.sort = Some(Sort {
            field: field.to_string(),
            order,
        });
    }

    pub fn set_page(&mut self, page: u32) {
        self.query.page = page.max(1);
    }

    /// Build the request for the current query. Product lists switch to the
    /// flat search endpoint while a search term is set.
    pub fn request(&self) -> ApiRequest {
        if self.resource == Resource::Products && self.query.is_searching() {
            return ApiRequest::new(reqwest::Method::GET, "/search/products").query(vec![(
                "q".to_string(),
                self.query.search_term.trim().to_string(),
            )]);
        }
        ApiRequest::new(reqwest::Method::GET, format!("/{}", self.resource.name()))
            .query(self.query.to_params())
    }

    pub fn begin_fetch(&mut self) -> PendingFetch {
        self.loading = true;
        PendingFetch {
            ticket: self.sequencer.begin(),
            request: self.request(),
            query: self.query.clone(),
        }
    }

    /// Apply a response. Returns false when a newer fetch has been started
    /// since `pending` was issued; the response is then dropped.
    pub fn complete(&mut self, pending: &PendingFetch, result: ApiResult<serde_json::Value>) -> ApiResult<bool> {
        if !self.sequencer.is_current(pending.ticket) {
            debug!(
                resource = self.resource.name(),
                ticket = pending.ticket,
                "dropping stale list response"
            );
            return Ok(false);
        }
        self.loading = false;
        let page: Page<D> = Page::from_value(result?, self.resource.name())?;
        let flat = self.resource == Resource::Products && pending.query.is_searching();
        self.items = page.items;
        self.total = page.total;
        self.total_pages = if flat { 1 } else { page.total_pages };
        Ok(true)
    }

    /// Issue one GET and replace the items.
    pub fn refresh<T: Transport>(&mut self, api: &ApiClient<T>) -> ApiResult<()> {
        let pending = self.begin_fetch();
        let result = api.send(pending.request.clone());
        self.complete(&pending, result)?;
        Ok(())
    }

    /// Refresh and record the bus generation the data was fetched at.
    pub fn refresh_tracked<T: Transport>(
        &mut self,
        api: &ApiClient<T>,
        bus: &RefreshBus,
    ) -> ApiResult<()> {
        let generation = bus.generation(self.resource);
        self.refresh(api)?;
        self.seen_generation = generation;
        self.changed_since_seen = bus.mark_seen(self.resource, generation);
        Ok(())
    }

    /// True when the resource was published to since the last tracked
    /// refresh, which may have happened in an earlier run.
    pub fn changed_since_last_view(&self) -> bool {
        self.changed_since_seen
    }

    pub fn is_stale(&self, bus: &RefreshBus) -> bool {
        bus.generation(self.resource) != self.seen_generation
    }
}

/// Lowercase with Turkish dotted/dotless I rules.
pub fn turkish_lower(s: &str) -> String {
    s.chars()
        .flat_map(|c| match c {
            'I' => vec!['ı'],
            'İ' => vec!['i'],
            other => other.to_lowercase().collect(),
        })
        .collect()
}

/// Client-side table filter: case-insensitive substring match on any of
/// the given fields.
pub fn filter_local<'a, D, F>(items: &'a [D], needle: &str, fields: F) -> Vec<&'a D>
where
    F: Fn(&D) -> Vec<&str>,
{
    let needle = turkish_lower(needle.trim());
    if needle.is_empty() {
        return items.iter().collect();
    }
    items
        .iter()
        .filter(|item| {
            fields(*item)
                .into_iter()
                .any(|f| turkish_lower(f).contains(&needle))
        })
        .collect()
}

pub fn product_fields(p: &Product) -> Vec<&str> {
    let mut v = vec![p.name.as_str(), p.sku.as_str()];
    v.extend(p.barcode.as_deref());
    v.extend(p.oem_code.as_deref());
    v.extend(p.tags.iter().map(String::as_str));
    v
}
