use std::sync::Arc;

use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{ListResult, Order, OrderDraft, OrderStatus};
use crate::domain::ports::OrderRepository;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Orchestrates validation and transition enforcement over the repository.
///
/// Every state-mutating operation commits exactly one outbox event with the
/// order row (the repository writes both in one transaction), so a rolled-back
/// request can never leak a notification job.
#[derive(Clone)]
pub struct OrderService {
    repo: Arc<dyn OrderRepository>,
}

impl OrderService {
    pub fn new(repo: Arc<dyn OrderRepository>) -> Self {
        Self { repo }
    }

    pub fn create_order(
        &self,
        customer_name: String,
        product_name: String,
        quantity: i32,
        price: BigDecimal,
    ) -> Result<Order, DomainError> {
        let draft = OrderDraft::new(customer_name, product_name, quantity, price)?;
        let order = self.repo.insert(draft)?;
        log::info!("Order created: {}", order.order_number);
        Ok(order)
    }

    pub fn get_order(&self, id: Uuid) -> Result<Order, DomainError> {
        self.repo.find_by_id(id)?.ok_or(DomainError::NotFound)
    }

    pub fn list_orders(
        &self,
        page: i64,
        page_size: i64,
        status: Option<&str>,
    ) -> Result<ListResult, DomainError> {
        let status = status.map(str::parse::<OrderStatus>).transpose()?;
        let page = page.max(1);
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self.repo.list(page, page_size, status)
    }

    pub fn update_order_status(&self, id: Uuid, new_status: &str) -> Result<Order, DomainError> {
        let new_status = new_status.parse::<OrderStatus>()?;
        self.repo.update_status(id, new_status)
    }
}
