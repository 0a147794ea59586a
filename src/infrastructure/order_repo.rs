use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{
    generate_order_number, ListResult, Order, OrderDraft, OrderEvent, OrderStatus,
    ORDER_NUMBER_ATTEMPTS,
};
use crate::domain::ports::OrderRepository;
use crate::schema::{order_outbox, orders};

use super::models::{NewOrderRow, NewOutboxRow, OrderRow};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::NotFound => DomainError::NotFound,
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                DomainError::Conflict(info.message().to_string())
            }
            other => DomainError::Internal(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

// ── Repository ───────────────────────────────────────────────────────────────

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Pick an order number that is not yet taken. After the attempt budget
    /// is spent, the last candidate goes in anyway and the unique constraint
    /// has the final word.
    fn unused_order_number(conn: &mut PgConnection) -> Result<String, DomainError> {
        for _ in 0..ORDER_NUMBER_ATTEMPTS {
            let candidate = generate_order_number();
            let taken: bool = diesel::select(diesel::dsl::exists(
                orders::table.filter(orders::order_number.eq(&candidate)),
            ))
            .get_result(conn)?;
            if !taken {
                return Ok(candidate);
            }
        }
        Ok(generate_order_number())
    }

    fn insert_outbox_event(
        conn: &mut PgConnection,
        order_id: Uuid,
        event: OrderEvent,
    ) -> Result<(), DomainError> {
        diesel::insert_into(order_outbox::table)
            .values(&NewOutboxRow {
                id: Uuid::new_v4(),
                order_id,
                event_type: event.as_str().to_string(),
            })
            .execute(conn)?;
        Ok(())
    }
}

impl OrderRepository for DieselOrderRepository {
    fn insert(&self, draft: OrderDraft) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let order_number = Self::unused_order_number(conn)?;
            let row: OrderRow = diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: Uuid::now_v7(),
                    order_number,
                    customer_name: draft.customer_name,
                    product_name: draft.product_name,
                    quantity: draft.quantity,
                    price: draft.price,
                    status: OrderStatus::Pending.as_str().to_string(),
                })
                .returning(OrderRow::as_returning())
                .get_result(conn)?;

            // Same transaction as the order row: the notification job exists
            // if and only if the order committed.
            Self::insert_outbox_event(conn, row.id, OrderEvent::Created)?;

            Order::try_from(row)
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = orders::table
            .find(id)
            .select(OrderRow::as_select())
            .first::<OrderRow>(&mut conn)
            .optional()?;

        row.map(Order::try_from).transpose()
    }

    fn list(
        &self,
        page: i64,
        page_size: i64,
        status: Option<OrderStatus>,
    ) -> Result<ListResult, DomainError> {
        let mut conn = self.pool.get()?;

        let offset = (page - 1) * page_size;
        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = match status {
                Some(s) => orders::table
                    .filter(orders::status.eq(s.as_str()))
                    .count()
                    .get_result(conn)?,
                None => orders::table.count().get_result(conn)?,
            };

            let mut query = orders::table
                .select(OrderRow::as_select())
                .order((orders::created_at.desc(), orders::id.desc()))
                .into_boxed();
            if let Some(s) = status {
                query = query.filter(orders::status.eq(s.as_str()));
            }
            let rows = query.limit(page_size).offset(offset).load::<OrderRow>(conn)?;

            Ok(ListResult {
                items: rows
                    .into_iter()
                    .map(Order::try_from)
                    .collect::<Result<Vec<_>, _>>()?,
                total,
            })
        })
    }

    fn update_status(&self, id: Uuid, new_status: OrderStatus) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // Exclusive row lock for the rest of the transaction; concurrent
            // updates on the same order serialize here and each sees the
            // latest committed status.
            let row = orders::table
                .find(id)
                .for_update()
                .select(OrderRow::as_select())
                .first::<OrderRow>(conn)
                .optional()?;

            let Some(row) = row else {
                return Err(DomainError::NotFound);
            };
            let current = Order::try_from(row)?;

            if !current.status.can_transition_to(new_status) {
                let allowed: Vec<&str> = current
                    .status
                    .allowed_transitions()
                    .iter()
                    .map(OrderStatus::as_str)
                    .collect();
                return Err(DomainError::InvalidState(format!(
                    "Cannot transition from '{}' to '{}'. Allowed: [{}]",
                    current.status,
                    new_status,
                    allowed.join(", ")
                )));
            }

            let updated: OrderRow = diesel::update(orders::table.find(id))
                .set((
                    orders::status.eq(new_status.as_str()),
                    orders::updated_at.eq(diesel::dsl::now),
                ))
                .returning(OrderRow::as_returning())
                .get_result(conn)?;

            Self::insert_outbox_event(conn, id, OrderEvent::StatusUpdated)?;

            log::info!(
                "Order {}: {} -> {}",
                current.order_number,
                current.status,
                new_status
            );

            Order::try_from(updated)
        })
    }
}
