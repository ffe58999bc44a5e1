use async_trait::async_trait;
use uuid::Uuid;

use super::errors::DomainError;
use super::order::{
    NewOrder, OrderStatus, OrderView, PaymentRequest, PaymentSession, TransactionStatus,
    UserRecord,
};

/// Read-mostly view of the account directory. The workflow only ever reads
/// the receipt email and resets the cart snapshot.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, DomainError>;
    /// Reset the user's cart snapshot to `{}`.
    async fn clear_cart(&self, id: Uuid) -> Result<(), DomainError>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn create(&self, order: NewOrder) -> Result<OrderView, DomainError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError>;
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<OrderView>, DomainError>;
    async fn find_all(&self) -> Result<Vec<OrderView>, DomainError>;
    /// Record the gateway transaction reference issued at initialization.
    async fn set_reference(&self, id: Uuid, reference: &str) -> Result<(), DomainError>;
    /// Single conditional update: move the order out of `pending` into `to`,
    /// optionally flipping the payment flag in the same statement. Returns
    /// whether a row actually transitioned; a lost race or an already
    /// terminal order is a no-op, never a regression.
    async fn transition_from_pending(
        &self,
        id: Uuid,
        to: OrderStatus,
        payment: Option<bool>,
    ) -> Result<bool, DomainError>;
    /// Administrative overwrite of the status column. Returns whether the
    /// order exists.
    async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<bool, DomainError>;
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn initialize(&self, request: &PaymentRequest) -> Result<PaymentSession, DomainError>;
    async fn verify(&self, reference: &str) -> Result<TransactionStatus, DomainError>;
}
