//! Event handlers.

use crate::EventContext;
use algebrach_error::AlgebrachResult;
use async_trait::async_trait;

/// Business logic run for a matched event of type `E`.
///
/// Errors are caught by the dispatcher, logged and turned into a reply.
#[async_trait]
pub trait Handler<E: Sync>: Send + Sync {
    /// Handle `event`.
    async fn handle(&self, event: &E, ctx: &EventContext) -> AlgebrachResult<()>;
}
