use uuid::Uuid;

use super::errors::DomainError;
use super::order::{ListResult, Order, OrderDraft, OrderStatus};

/// Persistence port for orders.
///
/// Implementations own transaction scoping: `insert` and `update_status` must
/// run their writes (including the outbox event) inside a single transaction,
/// and `update_status` must take an exclusive row lock before checking the
/// transition table so concurrent updates on one order serialize.
pub trait OrderRepository: Send + Sync + 'static {
    fn insert(&self, draft: OrderDraft) -> Result<Order, DomainError>;

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError>;

    /// `page` is 1-indexed; `page_size` is already clamped by the caller.
    /// `total` counts every row matching the filter, not just this page.
    fn list(
        &self,
        page: i64,
        page_size: i64,
        status: Option<OrderStatus>,
    ) -> Result<ListResult, DomainError>;

    fn update_status(&self, id: Uuid, new_status: OrderStatus) -> Result<Order, DomainError>;
}
