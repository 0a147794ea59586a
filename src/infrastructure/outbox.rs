use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::order_outbox;

use super::models::OutboxRow;

/// Queue side of the outbox table, consumed by the notification worker.
///
/// Rows stay pending (`processed_at IS NULL`) until an outcome is recorded,
/// so a crash mid-dispatch re-delivers on restart (at-least-once).

pub fn pending_events(conn: &mut PgConnection, limit: i64) -> QueryResult<Vec<OutboxRow>> {
    order_outbox::table
        .filter(order_outbox::processed_at.is_null())
        .order(order_outbox::created_at.asc())
        .limit(limit)
        .select(OutboxRow::as_select())
        .load(conn)
}

pub fn mark_processed(
    conn: &mut PgConnection,
    id: Uuid,
    outcome: &str,
    detail: Option<&str>,
) -> QueryResult<usize> {
    diesel::update(order_outbox::table.find(id))
        .set((
            order_outbox::processed_at.eq(diesel::dsl::now),
            order_outbox::outcome.eq(outcome),
            order_outbox::detail.eq(detail),
        ))
        .execute(conn)
}
