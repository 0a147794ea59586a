#![allow(dead_code)]

use std::sync::Mutex;

use chrono::Utc;
use uuid::Uuid;

use order_api::domain::errors::DomainError;
use order_api::domain::order::{
    generate_order_number, ListResult, Order, OrderDraft, OrderEvent, OrderStatus,
};
use order_api::domain::ports::OrderRepository;

/// In-memory stand-in for the Diesel repository. Mirrors its semantics
/// (pending on insert, transition checks under "lock", one event per
/// mutation) closely enough for HTTP-level and dispatcher tests.
#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: Mutex<Vec<Order>>,
    pub events: Mutex<Vec<(Uuid, OrderEvent)>>,
}

impl InMemoryOrderRepository {
    pub fn order_count(&self) -> usize {
        self.orders.lock().unwrap().len()
    }

    pub fn recorded_events(&self) -> Vec<(Uuid, OrderEvent)> {
        self.events.lock().unwrap().clone()
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn insert(&self, draft: OrderDraft) -> Result<Order, DomainError> {
        let now = Utc::now();
        let order = Order {
            id: Uuid::now_v7(),
            order_number: generate_order_number(),
            customer_name: draft.customer_name,
            product_name: draft.product_name,
            quantity: draft.quantity,
            price: draft.price,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.orders.lock().unwrap().push(order.clone());
        self.events
            .lock()
            .unwrap()
            .push((order.id, OrderEvent::Created));
        Ok(order)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.id == id)
            .cloned())
    }

    fn list(
        &self,
        page: i64,
        page_size: i64,
        status: Option<OrderStatus>,
    ) -> Result<ListResult, DomainError> {
        let orders = self.orders.lock().unwrap();
        let mut matching: Vec<Order> = orders
            .iter()
            .filter(|o| status.map_or(true, |s| o.status == s))
            .cloned()
            .collect();
        // Most recent first; v7 ids break created_at ties deterministically.
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = matching.len() as i64;
        let offset = ((page - 1) * page_size) as usize;
        let items = matching
            .into_iter()
            .skip(offset)
            .take(page_size as usize)
            .collect();
        Ok(ListResult { items, total })
    }

    fn update_status(&self, id: Uuid, new_status: OrderStatus) -> Result<Order, DomainError> {
        let mut orders = self.orders.lock().unwrap();
        let order = orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(DomainError::NotFound)?;

        if !order.status.can_transition_to(new_status) {
            let allowed: Vec<&str> = order
                .status
                .allowed_transitions()
                .iter()
                .map(OrderStatus::as_str)
                .collect();
            return Err(DomainError::InvalidState(format!(
                "Cannot transition from '{}' to '{}'. Allowed: [{}]",
                order.status,
                new_status,
                allowed.join(", ")
            )));
        }

        order.status = new_status;
        order.updated_at = Utc::now();
        let updated = order.clone();
        drop(orders);

        self.events
            .lock()
            .unwrap()
            .push((id, OrderEvent::StatusUpdated));
        Ok(updated)
    }
}
