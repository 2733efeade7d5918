// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reflector plumbing shared by the collectors.
//!
//! Each watched resource gets a reflector task that keeps a [`Store`] current and calls
//! the registered event handlers after every change. Collectors only ever read the
//! store.

use crate::constants::CACHE_SYNC_TIMEOUT_SECS;
use crate::errors::SourceError;
use crate::source::EventHandler;
use futures::StreamExt;
use kube::runtime::reflector::{self, store::Writer, Store};
use kube::runtime::watcher::{self, Event};
use kube::runtime::WatchStreamExt;
use kube::{Api, Resource};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Event handlers registered on a collector, shared with its watch tasks.
#[derive(Clone, Default)]
pub(crate) struct Handlers(Arc<RwLock<Vec<EventHandler>>>);

impl Handlers {
    pub(crate) fn add(&self, handler: EventHandler) {
        if let Ok(mut handlers) = self.0.write() {
            handlers.push(handler);
        }
    }

    pub(crate) fn notify(&self) {
        if let Ok(handlers) = self.0.read() {
            for handler in handlers.iter() {
                handler();
            }
        }
    }
}

/// Watch tasks of a collector, aborted when the collector is dropped.
#[derive(Default)]
pub(crate) struct WatchTasks(Vec<JoinHandle<()>>);

impl WatchTasks {
    pub(crate) fn push(&mut self, task: JoinHandle<()>) {
        self.0.push(task);
    }
}

impl Drop for WatchTasks {
    fn drop(&mut self) {
        for task in &self.0 {
            task.abort();
        }
    }
}

/// Watcher configuration for an optional label selector.
pub(crate) fn watcher_config(label_selector: &str) -> watcher::Config {
    let config = watcher::Config::default();
    if label_selector.is_empty() {
        config
    } else {
        config.labels(label_selector)
    }
}

/// Spawns a reflector feeding `writer` from `api`, notifying `handlers` on every change.
pub(crate) fn spawn_reflector<K>(
    api: Api<K>,
    config: watcher::Config,
    writer: Writer<K>,
    handlers: Handlers,
    resource: String,
) -> JoinHandle<()>
where
    K: Resource + Clone + DeserializeOwned + Debug + Send + Sync + 'static,
    K::DynamicType: Eq + Hash + Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut events = reflector::reflector(writer, watcher::watcher(api, config).default_backoff()).boxed();

        while let Some(event) = events.next().await {
            match event {
                Ok(Event::Apply(_) | Event::Delete(_) | Event::InitDone) => {
                    debug!(resource = %resource, "Watch event applied");
                    handlers.notify();
                }
                Ok(Event::Init | Event::InitApply(_)) => {}
                Err(e) => warn!(resource = %resource, error = %e, "Watch stream error"),
            }
        }

        warn!(resource = %resource, "Watch stream ended");
    })
}

/// Waits for the initial list of `store` to complete.
///
/// # Errors
///
/// Returns [`SourceError::CacheSync`] if the writer is dropped or the sync does not
/// finish within the timeout.
pub(crate) async fn wait_until_ready<K>(store: &Store<K>, resource: &str) -> Result<(), SourceError>
where
    K: Resource + Clone + 'static,
    K::DynamicType: Eq + Hash + Clone,
{
    let timeout = Duration::from_secs(CACHE_SYNC_TIMEOUT_SECS);
    match tokio::time::timeout(timeout, store.wait_until_ready()).await {
        Ok(Ok(())) => {
            debug!(resource = resource, "Cache synced");
            Ok(())
        }
        Ok(Err(e)) => Err(SourceError::CacheSync {
            resource: resource.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Err(SourceError::CacheSync {
            resource: resource.to_string(),
            reason: format!("timed out after {CACHE_SYNC_TIMEOUT_SECS}s"),
        }),
    }
}
