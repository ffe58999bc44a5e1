use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("User not found")]
    UserNotFound,
    #[error("Order not found")]
    OrderNotFound,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The gateway rejected session creation. The payload is kept for
    /// diagnostics and never shown verbatim to the end user.
    #[error("Payment initialization failed: {0}")]
    PaymentInit(String),
    #[error("Payment verification error: {0}")]
    Verification(String),
    #[error("Internal error: {0}")]
    Internal(String),
}
