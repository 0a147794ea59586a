use std::sync::Arc;

use uuid::Uuid;

use crate::config::SlackSettings;
use crate::domain::order::OrderEvent;
use crate::domain::ports::OrderRepository;

use super::retry::{retry_on_transient, RetryConfig, RetryResult};
use super::slack::{build_payload, SlackClient, SlackError};

/// Final state of one notification job. Exactly one of these is recorded per
/// outbox row; none of them propagates as an error to the worker loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent { order_number: String },
    Skipped { reason: &'static str },
    Error { reason: String },
}

impl DispatchOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchOutcome::Sent { .. } => "sent",
            DispatchOutcome::Skipped { .. } => "skipped",
            DispatchOutcome::Error { .. } => "error",
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            DispatchOutcome::Sent { order_number } => Some(order_number),
            DispatchOutcome::Skipped { reason } => Some(reason),
            DispatchOutcome::Error { reason } => Some(reason),
        }
    }
}

pub struct Dispatcher {
    repo: Arc<dyn OrderRepository>,
    client: SlackClient,
    slack: SlackSettings,
    retry: RetryConfig,
}

impl Dispatcher {
    pub fn new(
        repo: Arc<dyn OrderRepository>,
        slack: SlackSettings,
        retry: RetryConfig,
    ) -> Result<Self, SlackError> {
        let client = SlackClient::new(slack.api_url.clone(), slack.bot_token.clone())?;
        Ok(Self {
            repo,
            client,
            slack,
            retry,
        })
    }

    pub async fn dispatch(&self, order_id: Uuid, event: OrderEvent) -> DispatchOutcome {
        if !self.slack.enabled {
            log::info!("Slack disabled, skipping notification for order {order_id}");
            return DispatchOutcome::Skipped {
                reason: "slack_disabled",
            };
        }
        if !self.slack.has_credentials() {
            log::warn!("SLACK_BOT_TOKEN or SLACK_CHANNEL not configured");
            return DispatchOutcome::Skipped {
                reason: "no_slack_config",
            };
        }

        // The order is re-read here rather than snapshotted at enqueue time;
        // a row that disappeared in the meantime resolves cleanly without
        // retries.
        let repo = Arc::clone(&self.repo);
        let order = match tokio::task::spawn_blocking(move || repo.find_by_id(order_id)).await {
            Ok(Ok(Some(order))) => order,
            Ok(Ok(None)) => {
                log::error!("Order {order_id} not found for notification");
                return DispatchOutcome::Error {
                    reason: "order_not_found".to_string(),
                };
            }
            Ok(Err(e)) => {
                log::error!("Failed to load order {order_id} for notification: {e}");
                return DispatchOutcome::Error {
                    reason: e.to_string(),
                };
            }
            Err(e) => {
                log::error!("Notification lookup task failed for order {order_id}: {e}");
                return DispatchOutcome::Error {
                    reason: e.to_string(),
                };
            }
        };

        let payload = build_payload(&order, event, &self.slack.channel);
        match retry_on_transient(&self.retry, |_attempt| self.client.post_message(&payload)).await
        {
            RetryResult::Success(()) => {
                log::info!(
                    "Slack notification sent for order {} ({})",
                    order.order_number,
                    event.as_str()
                );
                DispatchOutcome::Sent {
                    order_number: order.order_number,
                }
            }
            RetryResult::PermanentFailure(e) => {
                log::error!(
                    "Slack non-retriable error for order {}: {e}",
                    order.order_number
                );
                DispatchOutcome::Error {
                    reason: e.to_string(),
                }
            }
            RetryResult::Exhausted(e) => {
                log::error!(
                    "Slack delivery for order {} failed after retries: {e}",
                    order.order_number
                );
                DispatchOutcome::Error {
                    reason: e.to_string(),
                }
            }
        }
    }
}
