use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::domain::order::{Order, OrderEvent, OrderStatus};

use super::retry::IsTransient;

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Slack error codes that retrying cannot fix; everything else is treated
/// as retriable.
const NON_RETRIABLE_ERRORS: [&str; 4] = [
    "invalid_auth",
    "channel_not_found",
    "not_in_channel",
    "is_archived",
];

#[derive(Debug, Error)]
pub enum SlackError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("Slack API error: {0}")]
    Api(String),
}

impl IsTransient for SlackError {
    fn is_transient(&self) -> bool {
        match self {
            SlackError::Transport(_) => true,
            SlackError::Api(code) => !NON_RETRIABLE_ERRORS.contains(&code.as_str()),
        }
    }
}

fn status_color(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "#FFA500",
        OrderStatus::Confirmed => "#2196F3",
        OrderStatus::Shipped => "#9C27B0",
        OrderStatus::Delivered => "#4CAF50",
        OrderStatus::Cancelled => "#F44336",
    }
}

fn status_emoji(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => ":hourglass_flowing_sand:",
        OrderStatus::Confirmed => ":white_check_mark:",
        OrderStatus::Shipped => ":package:",
        OrderStatus::Delivered => ":tada:",
        OrderStatus::Cancelled => ":x:",
    }
}

/// Build a `chat.postMessage` payload with a Block Kit attachment keyed by
/// the order's current status.
pub fn build_payload(order: &Order, event: OrderEvent, channel: &str) -> Value {
    let color = status_color(order.status);
    let emoji = status_emoji(order.status);
    let title = match event {
        OrderEvent::Created => format!("{emoji} New Order Created"),
        OrderEvent::StatusUpdated => format!("{emoji} Order Status Updated"),
    };
    let status_upper = order.status.as_str().to_uppercase();
    let text = format!(
        "{title}: {} - {} ({status_upper})",
        order.order_number, order.customer_name
    );

    json!({
        "channel": channel,
        "text": text,
        "attachments": [
            {
                "color": color,
                "blocks": [
                    {
                        "type": "header",
                        "text": { "type": "plain_text", "text": title },
                    },
                    {
                        "type": "section",
                        "fields": [
                            { "type": "mrkdwn", "text": format!("*Order Number:*\n{}", order.order_number) },
                            { "type": "mrkdwn", "text": format!("*Customer:*\n{}", order.customer_name) },
                            { "type": "mrkdwn", "text": format!("*Product:*\n{}", order.product_name) },
                            { "type": "mrkdwn", "text": format!("*Quantity:*\n{}", order.quantity) },
                            { "type": "mrkdwn", "text": format!("*Price:*\n${}", order.price) },
                            { "type": "mrkdwn", "text": format!("*Status:*\n{status_upper}") },
                        ],
                    },
                ],
            }
        ],
    })
}

#[derive(Debug, Deserialize)]
struct SlackResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

pub struct SlackClient {
    http: reqwest::Client,
    api_url: String,
    bot_token: String,
}

impl SlackClient {
    pub fn new(api_url: String, bot_token: String) -> Result<Self, SlackError> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SlackError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            api_url,
            bot_token,
        })
    }

    /// POST the payload to `chat.postMessage`. Transport problems and non-2xx
    /// responses surface as [`SlackError::Transport`]; a well-formed response
    /// with `ok: false` surfaces the provider error code as [`SlackError::Api`].
    pub async fn post_message(&self, payload: &Value) -> Result<(), SlackError> {
        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.bot_token)
            .json(payload)
            .send()
            .await
            .map_err(|e| SlackError::Transport(e.to_string()))?
            .error_for_status()
            .map_err(|e| SlackError::Transport(e.to_string()))?;

        let body: SlackResponse = response
            .json()
            .await
            .map_err(|e| SlackError::Transport(e.to_string()))?;

        if body.ok {
            Ok(())
        } else {
            Err(SlackError::Api(
                body.error.unwrap_or_else(|| "unknown".to_string()),
            ))
        }
    }
}
