// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The `Source` abstraction shared by collectors, the aggregator and wrappers.

use crate::endpoint::Endpoint;
use crate::errors::SourceError;
use std::sync::Arc;

/// Callback invoked whenever a source's underlying objects change.
pub type EventHandler = Arc<dyn Fn() + Send + Sync>;

/// A producer of desired DNS endpoints.
///
/// Collectors implement this over their reflector stores; [`crate::aggregator::MultiSource`]
/// and [`crate::dedup::DedupSource`] implement it by composing other sources.
#[async_trait::async_trait]
pub trait Source: Send + Sync {
    /// Returns the endpoints currently desired by this source.
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] if the endpoints cannot be computed. Callers must not
    /// use a partial result.
    async fn endpoints(&self) -> Result<Vec<Endpoint>, SourceError>;

    /// Registers a handler called after every change to the source's objects.
    ///
    /// Sources without a change feed ignore the handler.
    fn add_event_handler(&self, handler: EventHandler);
}
