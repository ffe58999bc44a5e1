use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::checkout_service::CheckoutService;
use crate::domain::order::{Address, LineItem, NewOrder, OrderView};
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceOrderItem {
    pub id: String,
    pub name: String,
    pub quantity: i32,
    /// Unit price in major units; accepts a JSON number or string.
    #[schema(value_type = f64)]
    pub price: BigDecimal,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub user_id: Uuid,
    pub items: Vec<PlaceOrderItem>,
    /// Total charge including the delivery fee, pre-computed by the caller.
    #[schema(value_type = f64)]
    pub amount: BigDecimal,
    #[schema(value_type = Object)]
    pub address: Address,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlaceOrderResponse {
    pub success: bool,
    pub authorization_url: String,
    pub access_code: String,
    pub reference: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    pub order_id: Uuid,
    /// Redirect flag as delivered by the gateway callback; anything other
    /// than the literal "true" cancels the order.
    #[serde(default)]
    pub success: String,
    /// Accepted for wire compatibility with the storefront redirect, but
    /// ignored: verification trusts only the reference stored on the order.
    pub reference: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserOrdersRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: String,
    pub name: String,
    pub quantity: i32,
    /// Decimal rendered as a string to avoid floating-point issues, e.g. "9.99"
    pub price: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<OrderItemResponse>,
    pub amount: String,
    #[schema(value_type = Object)]
    pub address: Address,
    pub status: String,
    pub payment: bool,
    pub reference: Option<String>,
    pub created_at: String,
}

impl From<OrderView> for OrderResponse {
    fn from(order: OrderView) -> Self {
        OrderResponse {
            id: order.id,
            user_id: order.user_id,
            items: order
                .items
                .into_iter()
                .map(|i| OrderItemResponse {
                    id: i.item_id,
                    name: i.name,
                    quantity: i.quantity,
                    price: i.unit_price.to_string(),
                })
                .collect(),
            amount: order.amount.to_string(),
            address: order.address,
            status: order.status.as_str().to_string(),
            payment: order.payment,
            reference: order.reference,
            created_at: order.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrdersListResponse {
    pub success: bool,
    pub data: Vec<OrderResponse>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub order_id: Uuid,
    pub status: String,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/order/place
///
/// Persists a pending order, clears the user's cart and opens a hosted
/// payment session. The caller is expected to redirect the customer to
/// `authorization_url`.
#[utoipa::path(
    post,
    path = "/api/order/place",
    request_body = PlaceOrderRequest,
    responses(
        (status = 200, description = "Payment session created", body = PlaceOrderResponse),
        (status = 400, description = "Invalid items or amount"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Payment initialization failed"),
    ),
    tag = "orders"
)]
pub async fn place_order(
    service: web::Data<CheckoutService>,
    body: web::Json<PlaceOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let order = NewOrder {
        user_id: body.user_id,
        items: body
            .items
            .into_iter()
            .map(|i| LineItem {
                item_id: i.id,
                name: i.name,
                quantity: i.quantity,
                unit_price: i.price,
            })
            .collect(),
        amount: body.amount,
        address: body.address,
    };

    let session = service.place_order(order).await?;

    Ok(HttpResponse::Ok().json(PlaceOrderResponse {
        success: true,
        authorization_url: session.authorization_url,
        access_code: session.access_code,
        reference: session.reference,
    }))
}

/// POST /api/order/verify
///
/// Settles an order after the gateway redirect. Both outcomes are 200s with
/// a `{success, message}` envelope; only lookup and gateway failures map to
/// error statuses.
#[utoipa::path(
    post,
    path = "/api/order/verify",
    request_body = VerifyPaymentRequest,
    responses(
        (status = 200, description = "Verification outcome", body = VerifyPaymentResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Gateway verification error"),
    ),
    tag = "orders"
)]
pub async fn verify_payment(
    service: web::Data<CheckoutService>,
    body: web::Json<VerifyPaymentRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let outcome = service.verify_payment(body.order_id, &body.success).await?;

    Ok(HttpResponse::Ok().json(VerifyPaymentResponse {
        success: outcome.verified,
        message: outcome.message.to_string(),
    }))
}

/// POST /api/order/userorders
///
/// All orders belonging to one user, any status, newest first.
#[utoipa::path(
    post,
    path = "/api/order/userorders",
    request_body = UserOrdersRequest,
    responses(
        (status = 200, description = "The user's orders", body = OrdersListResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn user_orders(
    service: web::Data<CheckoutService>,
    body: web::Json<UserOrdersRequest>,
) -> Result<HttpResponse, AppError> {
    let orders = service.list_user_orders(body.user_id).await?;

    Ok(HttpResponse::Ok().json(OrdersListResponse {
        success: true,
        data: orders.into_iter().map(OrderResponse::from).collect(),
    }))
}

/// GET /api/order/list
///
/// Administrative: every order irrespective of owner.
#[utoipa::path(
    get,
    path = "/api/order/list",
    responses(
        (status = 200, description = "All orders", body = OrdersListResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders(service: web::Data<CheckoutService>) -> Result<HttpResponse, AppError> {
    let orders = service.list_all_orders().await?;

    Ok(HttpResponse::Ok().json(OrdersListResponse {
        success: true,
        data: orders.into_iter().map(OrderResponse::from).collect(),
    }))
}

/// POST /api/order/status
///
/// Administrative status overwrite. The status must be one of the four
/// lifecycle states; free-text values are rejected.
#[utoipa::path(
    post,
    path = "/api/order/status",
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated"),
        (status = 400, description = "Unknown status value"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn update_status(
    service: web::Data<CheckoutService>,
    body: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, AppError> {
    service.update_status(body.order_id, &body.status).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Status updated",
    })))
}
