use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::errors::DomainError;

pub const CUSTOMER_NAME_MAX: usize = 100;
pub const PRODUCT_NAME_MAX: usize = 200;

/// Attempts at generating a collision-free order number before deferring to
/// the database unique constraint.
pub const ORDER_NUMBER_ATTEMPTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Destinations reachable from this status. Terminal states return an
    /// empty slice.
    pub fn allowed_transitions(&self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Pending => &[OrderStatus::Confirmed, OrderStatus::Cancelled],
            OrderStatus::Confirmed => &[OrderStatus::Shipped, OrderStatus::Cancelled],
            OrderStatus::Shipped => &[OrderStatus::Delivered],
            OrderStatus::Delivered => &[],
            OrderStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, to: OrderStatus) -> bool {
        self.allowed_transitions().contains(&to)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_transitions().is_empty()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(DomainError::Validation(format!("Invalid status: {other}"))),
        }
    }
}

/// Lifecycle events that produce a notification job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderEvent {
    Created,
    StatusUpdated,
}

impl OrderEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderEvent::Created => "created",
            OrderEvent::StatusUpdated => "status_updated",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created" => Some(OrderEvent::Created),
            "status_updated" => Some(OrderEvent::StatusUpdated),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub customer_name: String,
    pub product_name: String,
    pub quantity: i32,
    pub price: BigDecimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ListResult {
    pub items: Vec<Order>,
    pub total: i64,
}

/// A creation request that has passed field validation.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub customer_name: String,
    pub product_name: String,
    pub quantity: i32,
    pub price: BigDecimal,
}

impl OrderDraft {
    pub fn new(
        customer_name: String,
        product_name: String,
        quantity: i32,
        price: BigDecimal,
    ) -> Result<Self, DomainError> {
        if customer_name.is_empty() {
            return Err(DomainError::Validation(
                "customer_name must not be empty".to_string(),
            ));
        }
        if customer_name.chars().count() > CUSTOMER_NAME_MAX {
            return Err(DomainError::Validation(format!(
                "customer_name must be at most {CUSTOMER_NAME_MAX} characters"
            )));
        }
        if product_name.is_empty() {
            return Err(DomainError::Validation(
                "product_name must not be empty".to_string(),
            ));
        }
        if product_name.chars().count() > PRODUCT_NAME_MAX {
            return Err(DomainError::Validation(format!(
                "product_name must be at most {PRODUCT_NAME_MAX} characters"
            )));
        }
        if quantity < 1 {
            return Err(DomainError::Validation(
                "quantity must be at least 1".to_string(),
            ));
        }
        if price < BigDecimal::zero() {
            return Err(DomainError::Validation(
                "price must not be negative".to_string(),
            ));
        }
        if price.fractional_digit_count() > 2 {
            return Err(DomainError::Validation(
                "price must have at most 2 decimal places".to_string(),
            ));
        }
        Ok(Self {
            customer_name,
            product_name,
            quantity,
            price,
        })
    }
}

/// Generate an order number like `ORD-A3X7K9`.
///
/// The suffix is drawn from UUID entropy, so callers still need the
/// database unique constraint as the final collision backstop.
pub fn generate_order_number() -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let bytes = Uuid::new_v4().into_bytes();
    let suffix: String = bytes
        .iter()
        .take(6)
        .map(|b| ALPHABET[*b as usize % ALPHABET.len()] as char)
        .collect();
    format!("ORD-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn price(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("valid decimal")
    }

    fn draft(quantity: i32, price_str: &str) -> Result<OrderDraft, DomainError> {
        OrderDraft::new(
            "Alice".to_string(),
            "Widget".to_string(),
            quantity,
            price(price_str),
        )
    }

    #[test]
    fn pending_can_confirm_or_cancel() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Confirmed));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Shipped));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn confirmed_can_ship_or_cancel() {
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Shipped));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Confirmed.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Confirmed.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn shipped_can_only_deliver() {
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Confirmed));
    }

    #[test]
    fn terminal_states_accept_nothing() {
        for terminal in [OrderStatus::Delivered, OrderStatus::Cancelled] {
            assert!(terminal.is_terminal());
            for to in OrderStatus::ALL {
                assert!(!terminal.can_transition_to(to));
            }
        }
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Confirmed.is_terminal());
        assert!(!OrderStatus::Shipped.is_terminal());
    }

    #[test]
    fn status_parses_from_lowercase_names() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn unknown_status_is_a_validation_error() {
        let err = OrderStatus::from_str("archived").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn order_number_has_expected_shape() {
        let number = generate_order_number();
        assert_eq!(number.len(), 10);
        let suffix = number.strip_prefix("ORD-").expect("ORD- prefix");
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn draft_accepts_valid_input() {
        let d = draft(3, "29.99").expect("valid draft");
        assert_eq!(d.quantity, 3);
        assert_eq!(d.price, price("29.99"));
    }

    #[test]
    fn draft_rejects_empty_names() {
        let err = OrderDraft::new(String::new(), "Widget".to_string(), 1, price("1.00"));
        assert!(matches!(err, Err(DomainError::Validation(_))));

        let err = OrderDraft::new("Alice".to_string(), String::new(), 1, price("1.00"));
        assert!(matches!(err, Err(DomainError::Validation(_))));
    }

    #[test]
    fn draft_rejects_overlong_names() {
        let long = "x".repeat(CUSTOMER_NAME_MAX + 1);
        let err = OrderDraft::new(long, "Widget".to_string(), 1, price("1.00"));
        assert!(matches!(err, Err(DomainError::Validation(_))));
    }

    #[test]
    fn draft_rejects_zero_quantity() {
        assert!(matches!(draft(0, "1.00"), Err(DomainError::Validation(_))));
        assert!(matches!(draft(-2, "1.00"), Err(DomainError::Validation(_))));
    }

    #[test]
    fn draft_rejects_negative_price() {
        assert!(matches!(
            draft(1, "-0.01"),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn draft_rejects_more_than_two_decimal_places() {
        assert!(matches!(
            draft(1, "9.999"),
            Err(DomainError::Validation(_))
        ));
        // Scale is what counts, so a third digit is rejected even when zero.
        assert!(matches!(
            draft(1, "9.990"),
            Err(DomainError::Validation(_))
        ));
        assert!(draft(1, "9.99").is_ok());
        assert!(draft(1, "10").is_ok());
    }

    #[test]
    fn event_names_round_trip() {
        for event in [OrderEvent::Created, OrderEvent::StatusUpdated] {
            assert_eq!(OrderEvent::parse(event.as_str()), Some(event));
        }
        assert_eq!(OrderEvent::parse("deleted"), None);
    }
}
