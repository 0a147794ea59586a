use std::time::Duration;

use tokio::time::sleep;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::OrderEvent;
use crate::infrastructure::outbox;

use super::dispatcher::{DispatchOutcome, Dispatcher};

pub const BATCH_SIZE: i64 = 10;

/// Polls the outbox table and pushes each pending event through the
/// dispatcher. One job's failure never takes down the loop or the other
/// jobs in the batch.
pub struct NotificationWorker {
    pool: DbPool,
    dispatcher: Dispatcher,
    poll_interval: Duration,
}

impl NotificationWorker {
    pub fn new(pool: DbPool, dispatcher: Dispatcher, poll_interval: Duration) -> Self {
        Self {
            pool,
            dispatcher,
            poll_interval,
        }
    }

    pub async fn run(self) {
        log::info!(
            "Notification worker started (poll interval {:?})",
            self.poll_interval
        );
        loop {
            if let Err(e) = self.drain_pending().await {
                log::error!("Outbox poll failed: {e}");
            }
            sleep(self.poll_interval).await;
        }
    }

    /// Process one batch of pending outbox rows. Returns how many rows were
    /// picked up.
    pub async fn drain_pending(&self) -> Result<usize, DomainError> {
        let pool = self.pool.clone();
        let batch = tokio::task::spawn_blocking(move || -> Result<_, DomainError> {
            let mut conn = pool.get()?;
            Ok(outbox::pending_events(&mut conn, BATCH_SIZE)?)
        })
        .await
        .map_err(|e| DomainError::Internal(e.to_string()))??;

        let count = batch.len();
        for row in batch {
            let outcome = match OrderEvent::parse(&row.event_type) {
                Some(event) => self.dispatcher.dispatch(row.order_id, event).await,
                None => DispatchOutcome::Error {
                    reason: format!("unknown event type: {}", row.event_type),
                },
            };

            // If recording fails the row stays pending and is re-delivered on
            // the next poll; duplicates are within the at-least-once contract.
            let pool = self.pool.clone();
            let row_id = row.id;
            let marked = tokio::task::spawn_blocking(move || -> Result<(), DomainError> {
                let mut conn = pool.get()?;
                outbox::mark_processed(&mut conn, row_id, outcome.kind(), outcome.detail())?;
                Ok(())
            })
            .await
            .map_err(|e| DomainError::Internal(e.to_string()));

            match marked {
                Ok(Ok(())) => {}
                Ok(Err(e)) | Err(e) => {
                    log::error!("Failed to record outcome for outbox row {row_id}: {e}");
                }
            }
        }

        Ok(count)
    }
}
