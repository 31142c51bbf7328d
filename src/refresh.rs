// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Cross-view invalidation. A change to one resource bumps its generation
//! and notifies subscribers so unrelated lists know to refetch.

use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use rusqlite::Connection;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::db;
use crate::models::{CariType, PartnerKind};

const RESOURCE_COUNT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Products,
    Customers,
    Suppliers,
    Accounts,
    Invoices,
    Transactions,
    Categories,
    Brands,
}

impl Resource {
    pub const ALL: [Resource; RESOURCE_COUNT] = [
        Resource::Products,
        Resource::Customers,
        Resource::Suppliers,
        Resource::Accounts,
        Resource::Invoices,
        Resource::Transactions,
        Resource::Categories,
        Resource::Brands,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Resource::Products => "products",
            Resource::Customers => "customers",
            Resource::Suppliers => "suppliers",
            Resource::Accounts => "accounts",
            Resource::Invoices => "invoices",
            Resource::Transactions => "transactions",
            Resource::Categories => "categories",
            Resource::Brands => "brands",
        }
    }
}

impl From<PartnerKind> for Resource {
    fn from(k: PartnerKind) -> Self {
        match k {
            PartnerKind::Customer => Resource::Customers,
            PartnerKind::Supplier => Resource::Suppliers,
        }
    }
}

/// Buffered notifications per subscriber; a slower reader gets `Lagged`.
const CHANNEL_CAPACITY: usize = 64;

struct Channel {
    tx: broadcast::Sender<u64>,
    generation: AtomicU64,
    seen: AtomicU64,
}

impl Channel {
    fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            tx,
            generation: AtomicU64::new(0),
            seen: AtomicU64::new(0),
        }
    }
}

/// Per-resource generation counters with a broadcast channel each.
///
/// The binary loads the counters from the session store before a command and
/// saves them afterwards, so a mutation in one invocation marks the list
/// stale for the next one.
pub struct RefreshBus {
    channels: [Channel; RESOURCE_COUNT],
}

impl Default for RefreshBus {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshBus {
    pub fn new() -> Self {
        Self {
            channels: std::array::from_fn(|_| Channel::new()),
        }
    }

    fn channel(&self, resource: Resource) -> &Channel {
        &self.channels[resource as usize]
    }

    /// Receive the new generation every time `resource` is published.
    pub fn subscribe(&self, resource: Resource) -> broadcast::Receiver<u64> {
        self.channel(resource).tx.subscribe()
    }

    pub fn generation(&self, resource: Resource) -> u64 {
        self.channel(resource).generation.load(Ordering::SeqCst)
    }

    /// Bump and notify.
    pub fn publish(&self, resource: Resource) -> u64 {
        let ch = self.channel(resource);
        let generation = ch.generation.fetch_add(1, Ordering::SeqCst) + 1;
        // no live subscribers is fine
        let _ = ch.tx.send(generation);
        debug!(resource = resource.name(), generation, "refresh published");
        generation
    }

    /// A cari account mirrors a customer or supplier, so both lists go stale.
    pub fn publish_cari_created(&self, cari: CariType) {
        self.publish(Resource::Accounts);
        self.publish(PartnerKind::from(cari).into());
    }

    /// Record that `resource` was shown at `generation`. Returns true when it
    /// changed since the previous showing.
    pub fn mark_seen(&self, resource: Resource, generation: u64) -> bool {
        let previous = self.channel(resource).seen.swap(generation, Ordering::SeqCst);
        previous < generation
    }

    pub fn last_seen(&self, resource: Resource) -> u64 {
        self.channel(resource).seen.load(Ordering::SeqCst)
    }

    /// Restore counters saved by [`RefreshBus::save`].
    pub fn load(conn: &Connection) -> Result<Self> {
        let bus = Self::new();
        for r in Resource::ALL {
            let ch = bus.channel(r);
            ch.generation
                .store(read_counter(conn, &counter_key("generation", r))?, Ordering::SeqCst);
            ch.seen
                .store(read_counter(conn, &counter_key("seen", r))?, Ordering::SeqCst);
        }
        Ok(bus)
    }

    pub fn save(&self, conn: &Connection) -> Result<()> {
        for r in Resource::ALL {
            db::set_setting(conn, &counter_key("generation", r), &self.generation(r).to_string())?;
            db::set_setting(conn, &counter_key("seen", r), &self.last_seen(r).to_string())?;
        }
        Ok(())
    }
}

fn counter_key(kind: &str, r: Resource) -> String {
    format!("refresh.{}.{}", kind, r.name())
}

fn read_counter(conn: &Connection, key: &str) -> Result<u64> {
    let raw = db::get_setting(conn, key)?;
    Ok(match raw.as_deref().map(str::parse::<u64>) {
        Some(Ok(n)) => n,
        Some(Err(_)) => {
            warn!(key, "ignoring corrupt refresh counter");
            0
        }
        None => 0,
    })
}
