use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order lifecycle. Only `Pending` is non-terminal; transitions out of a
/// terminal state are rejected at the store layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Failed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Failed => "failed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Parse the lowercase wire form. Unknown strings are rejected rather
    /// than stored verbatim.
    pub fn parse(s: &str) -> Option<OrderStatus> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "confirmed" => Some(OrderStatus::Confirmed),
            "failed" => Some(OrderStatus::Failed),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }
}

/// A line item with its unit price already resolved by the caller; pricing
/// is not re-derived here.
#[derive(Debug, Clone)]
pub struct LineItem {
    pub item_id: String,
    pub name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

/// Delivery address as collected by the storefront checkout form. Stored as
/// an opaque JSON document; the workflow never interprets individual fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub country: String,
    pub phone: String,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub items: Vec<LineItem>,
    pub amount: BigDecimal,
    pub address: Address,
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<LineItem>,
    pub amount: BigDecimal,
    pub address: Address,
    pub status: OrderStatus,
    pub payment: bool,
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// What the gateway needs to open a hosted payment session.
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub email: String,
    /// Charge amount in the gateway's minor unit (major amount x 100).
    pub amount_minor: i64,
    pub callback_url: String,
    pub cancel_url: String,
    pub order_id: Uuid,
    pub user_id: Uuid,
}

/// Session handle returned by the gateway at initialization.
#[derive(Debug, Clone)]
pub struct PaymentSession {
    pub authorization_url: String,
    pub access_code: String,
    pub reference: String,
}

/// Outcome of a gateway verify call. Anything other than `success` on the
/// wire means the charge did not go through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    Success,
    Failed,
    Other(String),
}

impl TransactionStatus {
    pub fn from_wire(s: &str) -> TransactionStatus {
        match s {
            "success" => TransactionStatus::Success,
            "failed" => TransactionStatus::Failed,
            other => TransactionStatus::Other(other.to_string()),
        }
    }
}

/// The slice of a user account the workflow needs: the payment receipt email.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_wire_form() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Failed,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert_eq!(OrderStatus::parse("shipped"), None);
        assert_eq!(OrderStatus::parse("PENDING"), None);
        assert_eq!(OrderStatus::parse(""), None);
    }

    #[test]
    fn only_pending_is_non_terminal() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(OrderStatus::Confirmed.is_terminal());
        assert!(OrderStatus::Failed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
    }

    #[test]
    fn transaction_status_maps_wire_strings() {
        assert_eq!(
            TransactionStatus::from_wire("success"),
            TransactionStatus::Success
        );
        assert_eq!(
            TransactionStatus::from_wire("failed"),
            TransactionStatus::Failed
        );
        assert_eq!(
            TransactionStatus::from_wire("abandoned"),
            TransactionStatus::Other("abandoned".to_string())
        );
    }
}
