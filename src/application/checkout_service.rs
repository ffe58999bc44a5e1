use std::sync::Arc;

use bigdecimal::{BigDecimal, RoundingMode, ToPrimitive, Zero};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{
    NewOrder, OrderStatus, OrderView, PaymentRequest, PaymentSession, TransactionStatus,
};
use crate::domain::ports::{OrderStore, PaymentGateway, UserDirectory};

/// Result of a payment verification attempt, as reported back to the
/// redirect endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyOutcome {
    pub verified: bool,
    pub message: &'static str,
}

/// Orchestrates the checkout workflow: order creation, cart clearing,
/// payment-session initialization and payment verification. All external
/// state lives behind the three injected ports.
pub struct CheckoutService {
    users: Arc<dyn UserDirectory>,
    orders: Arc<dyn OrderStore>,
    gateway: Arc<dyn PaymentGateway>,
    frontend_base: String,
}

impl CheckoutService {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        orders: Arc<dyn OrderStore>,
        gateway: Arc<dyn PaymentGateway>,
        frontend_base: impl Into<String>,
    ) -> Self {
        Self {
            users,
            orders,
            gateway,
            frontend_base: frontend_base.into(),
        }
    }

    /// Place an order and open a hosted payment session for it.
    ///
    /// The order row is written before the gateway is contacted, so a crash
    /// mid-flight leaves a recoverable `pending` record instead of a silently
    /// lost charge. A gateway failure therefore does not roll the order back.
    pub async fn place_order(&self, order: NewOrder) -> Result<PaymentSession, DomainError> {
        validate_order(&order)?;

        let user = self
            .users
            .find_by_id(order.user_id)
            .await?
            .ok_or(DomainError::UserNotFound)?;

        let amount_minor = to_minor_units(&order.amount)?;
        let user_id = order.user_id;
        let saved = self.orders.create(order).await?;

        // Best effort: the order already exists, so a stale cart is not
        // worth failing the checkout over.
        if let Err(e) = self.users.clear_cart(user_id).await {
            log::warn!("failed to clear cart for user {}: {}", user_id, e);
        }

        let request = PaymentRequest {
            email: user.email,
            amount_minor,
            callback_url: format!(
                "{}/verify?success=true&orderId={}",
                self.frontend_base, saved.id
            ),
            cancel_url: format!(
                "{}/verify?success=false&orderId={}",
                self.frontend_base, saved.id
            ),
            order_id: saved.id,
            user_id,
        };
        let session = self.gateway.initialize(&request).await?;

        // The stored reference is what verification trusts later; the
        // session metadata still carries orderId for manual reconciliation
        // if this write is lost.
        if let Err(e) = self.orders.set_reference(saved.id, &session.reference).await {
            log::error!(
                "failed to record payment reference {} on order {}: {}",
                session.reference,
                saved.id,
                e
            );
        }

        Ok(session)
    }

    /// Settle an order after the gateway redirect.
    ///
    /// `success` is a client-suppliable flag from the redirect query string;
    /// anything other than the literal `"true"` cancels the order without a
    /// gateway round trip. The gateway transaction reference is always taken
    /// from the stored order, never from the caller.
    ///
    /// Transitions are conditional on the order still being `pending`, so
    /// repeating a verify after a terminal outcome re-applies it as a no-op.
    pub async fn verify_payment(
        &self,
        order_id: Uuid,
        success: &str,
    ) -> Result<VerifyOutcome, DomainError> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or(DomainError::OrderNotFound)?;

        if order.status.is_terminal() {
            log::info!(
                "re-running verification for order {} already in state {}",
                order_id,
                order.status.as_str()
            );
        }

        if success != "true" {
            self.orders
                .transition_from_pending(order_id, OrderStatus::Cancelled, None)
                .await?;
            return Ok(VerifyOutcome {
                verified: false,
                message: "Payment was cancelled",
            });
        }

        let reference = order.reference.ok_or_else(|| {
            DomainError::Verification(format!("order {} has no payment reference", order_id))
        })?;

        match self.gateway.verify(&reference).await? {
            TransactionStatus::Success => {
                self.orders
                    .transition_from_pending(order_id, OrderStatus::Confirmed, Some(true))
                    .await?;
                Ok(VerifyOutcome {
                    verified: true,
                    message: "Payment verified successfully",
                })
            }
            _ => {
                self.orders
                    .transition_from_pending(order_id, OrderStatus::Failed, None)
                    .await?;
                Ok(VerifyOutcome {
                    verified: false,
                    message: "Payment verification failed",
                })
            }
        }
    }

    pub async fn list_user_orders(&self, user_id: Uuid) -> Result<Vec<OrderView>, DomainError> {
        self.orders.find_by_user(user_id).await
    }

    pub async fn list_all_orders(&self) -> Result<Vec<OrderView>, DomainError> {
        self.orders.find_all().await
    }

    /// Administrative status overwrite. Unknown status strings and unknown
    /// orders are both rejected.
    pub async fn update_status(&self, order_id: Uuid, status: &str) -> Result<(), DomainError> {
        let status = OrderStatus::parse(status)
            .ok_or_else(|| DomainError::InvalidInput(format!("unknown order status '{status}'")))?;
        if !self.orders.update_status(order_id, status).await? {
            return Err(DomainError::OrderNotFound);
        }
        Ok(())
    }
}

fn validate_order(order: &NewOrder) -> Result<(), DomainError> {
    if order.items.is_empty() {
        return Err(DomainError::InvalidInput("order has no items".to_string()));
    }
    for item in &order.items {
        if item.quantity <= 0 {
            return Err(DomainError::InvalidInput(format!(
                "item '{}' has non-positive quantity {}",
                item.item_id, item.quantity
            )));
        }
        if item.unit_price < BigDecimal::zero() {
            return Err(DomainError::InvalidInput(format!(
                "item '{}' has negative price {}",
                item.item_id, item.unit_price
            )));
        }
    }
    if order.amount <= BigDecimal::zero() {
        return Err(DomainError::InvalidInput(format!(
            "amount must be positive, got {}",
            order.amount
        )));
    }
    Ok(())
}

/// Convert a major-unit amount to the gateway's integer minor unit
/// (amount x 100), rounding half-up past two decimal places.
fn to_minor_units(amount: &BigDecimal) -> Result<i64, DomainError> {
    (amount * BigDecimal::from(100))
        .with_scale_round(0, RoundingMode::HalfUp)
        .to_i64()
        .ok_or_else(|| {
            DomainError::Internal(format!("amount {} overflows the gateway minor unit", amount))
        })
}
