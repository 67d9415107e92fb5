//! One-shot result delivery between screens.
//!
//! A caller that opens a picker registers a handler and passes the returned
//! [`HandoffId`] along. Whoever produces the result executes the id once.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::models::{GeocodeResult, ReverseGeocode, StructuredAddress};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandoffId(Uuid);

impl HandoffId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for HandoffId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HandoffId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// What a picker screen hands back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HandoffPayload {
    Geocoded(GeocodeResult),
    Address(StructuredAddress),
    PinDrop(ReverseGeocode),
}

type Handler<T> = Box<dyn FnOnce(T) + Send>;

struct Entry<T> {
    handler: Handler<T>,
    expires_at: Instant,
}

/// TTL-bounded map of pending one-shot handlers.
pub struct HandoffRegistry<T = HandoffPayload> {
    entries: Mutex<HashMap<HandoffId, Entry<T>>>,
    ttl: Duration,
}

impl<T> HandoffRegistry<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn register<F>(&self, handler: F) -> HandoffId
    where
        F: FnOnce(T) + Send + 'static,
    {
        let id = HandoffId::new();
        self.register_with_id(id, handler);
        id
    }

    /// Replaces any handler already stored under `id`.
    pub fn register_with_id<F>(&self, id: HandoffId, handler: F)
    where
        F: FnOnce(T) + Send + 'static,
    {
        let now = Instant::now();
        let mut entries = self.lock();
        purge(&mut entries, now);
        entries.insert(
            id,
            Entry {
                handler: Box::new(handler),
                expires_at: now + self.ttl,
            },
        );
        debug!("Registered handoff {} ({} pending)", id, entries.len());
    }

    /// Delivers `payload` to the handler for `id`, at most once.
    ///
    /// Returns false when the id is unknown, already used or expired.
    pub fn execute(&self, id: HandoffId, payload: T) -> bool {
        let entry = {
            let mut entries = self.lock();
            purge(&mut entries, Instant::now());
            entries.remove(&id)
        };

        match entry {
            Some(entry) => {
                (entry.handler)(payload);
                debug!("Delivered handoff {}", id);
                true
            }
            None => {
                debug!("Handoff {} is unknown or expired", id);
                false
            }
        }
    }

    /// Drops the handler without invoking it.
    pub fn cleanup(&self, id: HandoffId) -> bool {
        self.lock().remove(&id).is_some()
    }

    pub fn purge_expired(&self) -> usize {
        purge(&mut self.lock(), Instant::now())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<HandoffId, Entry<T>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn purge<T>(entries: &mut HashMap<HandoffId, Entry<T>>, now: Instant) -> usize {
    let before = entries.len();
    entries.retain(|_, entry| entry.expires_at > now);
    let purged = before - entries.len();
    if purged > 0 {
        debug!("Purged {} expired handoffs", purged);
    }
    purged
}
