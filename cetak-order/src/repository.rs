use crate::models::{NotaSetting, Order};
use async_trait::async_trait;
use uuid::Uuid;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Durable storage for the order aggregate (order + items + payments,
/// written transactionally per order).
///
/// `save` must reject a write whose `version` no longer matches the stored
/// one; that optimistic check is the per-order serialization boundary: a
/// payment and a status-advance can never interleave into an inconsistent
/// (status, paid-to-date) pair.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn save(&self, order: &Order) -> Result<(), BoxError>;

    async fn get(&self, id: Uuid) -> Result<Option<Order>, BoxError>;

    /// Cascades to the order's items and payments.
    async fn delete(&self, id: Uuid) -> Result<(), BoxError>;

    async fn list(&self, customer_id: Option<Uuid>) -> Result<Vec<Order>, BoxError>;
}

/// The atomic increment primitive behind invoice numbering, plus storage
/// for the nota configuration. `next_value` must be a single atomic
/// fetch-and-increment (a database sequence or equivalent), never
/// read-then-write from application code.
#[async_trait]
pub trait NotaCounter: Send + Sync {
    async fn setting(&self) -> Result<NotaSetting, BoxError>;

    /// Issue the next numeric value. Strictly increasing, gap-free, atomic
    /// across concurrent callers.
    async fn next_value(&self) -> Result<i64, BoxError>;

    /// Replace the configuration. `reset_to` restarts the counter so that
    /// `reset_to` is the next issued value; `None` keeps the counter
    /// running (a prefix-only change never renumbers).
    async fn update_setting(
        &self,
        setting: NotaSetting,
        reset_to: Option<i64>,
    ) -> Result<(), BoxError>;
}
