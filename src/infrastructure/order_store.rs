use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{LineItem, NewOrder, OrderStatus, OrderView};
use crate::domain::ports::OrderStore;
use crate::schema::{order_items, orders};

use super::models::{NewOrderItemRow, NewOrderRow, OrderItemRow, OrderRow};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

// ── Store ────────────────────────────────────────────────────────────────────

pub struct DieselOrderStore {
    pool: DbPool,
}

impl DieselOrderStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_view(order: OrderRow, items: Vec<OrderItemRow>) -> Result<OrderView, DomainError> {
    let status = OrderStatus::parse(&order.status).ok_or_else(|| {
        DomainError::Internal(format!(
            "order {} has unrecognized status '{}'",
            order.id, order.status
        ))
    })?;
    let address = serde_json::from_value(order.address)
        .map_err(|e| DomainError::Internal(format!("order {} address: {}", order.id, e)))?;
    Ok(OrderView {
        id: order.id,
        user_id: order.user_id,
        items: items
            .into_iter()
            .map(|i| LineItem {
                item_id: i.item_id,
                name: i.name,
                quantity: i.quantity,
                unit_price: i.unit_price,
            })
            .collect(),
        amount: order.amount,
        address,
        status,
        payment: order.payment,
        reference: order.reference,
        created_at: order.created_at,
    })
}

fn load_with_items(
    conn: &mut PgConnection,
    order_rows: Vec<OrderRow>,
) -> Result<Vec<OrderView>, DomainError> {
    let items: Vec<OrderItemRow> = OrderItemRow::belonging_to(&order_rows)
        .select(OrderItemRow::as_select())
        .load(conn)?;
    let grouped = items.grouped_by(&order_rows);
    order_rows
        .into_iter()
        .zip(grouped)
        .map(|(order, items)| to_view(order, items))
        .collect()
}

#[async_trait::async_trait]
impl OrderStore for DieselOrderStore {
    async fn create(&self, order: NewOrder) -> Result<OrderView, DomainError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            conn.transaction::<_, DomainError, _>(|conn| {
                let order_id = Uuid::new_v4();
                let address = serde_json::to_value(&order.address)
                    .map_err(|e| DomainError::Internal(e.to_string()))?;

                let row: OrderRow = diesel::insert_into(orders::table)
                    .values(&NewOrderRow {
                        id: order_id,
                        user_id: order.user_id,
                        status: OrderStatus::Pending.as_str().to_string(),
                        payment: false,
                        amount: order.amount.clone(),
                        address,
                    })
                    .returning(OrderRow::as_returning())
                    .get_result(conn)?;

                let new_items: Vec<NewOrderItemRow> = order
                    .items
                    .iter()
                    .map(|i| NewOrderItemRow {
                        id: Uuid::new_v4(),
                        order_id,
                        item_id: i.item_id.clone(),
                        name: i.name.clone(),
                        quantity: i.quantity,
                        unit_price: i.unit_price.clone(),
                    })
                    .collect();
                let item_rows: Vec<OrderItemRow> = diesel::insert_into(order_items::table)
                    .values(&new_items)
                    .returning(OrderItemRow::as_returning())
                    .get_results(conn)?;

                to_view(row, item_rows)
            })
        })
        .await
        .map_err(|e| DomainError::Internal(e.to_string()))?
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;

            let order = orders::table
                .filter(orders::id.eq(id))
                .select(OrderRow::as_select())
                .first(&mut conn)
                .optional()?;

            let Some(order) = order else {
                return Ok(None);
            };

            let items = OrderItemRow::belonging_to(&order)
                .select(OrderItemRow::as_select())
                .load(&mut conn)?;

            to_view(order, items).map(Some)
        })
        .await
        .map_err(|e| DomainError::Internal(e.to_string()))?
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<OrderView>, DomainError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let order_rows = orders::table
                .filter(orders::user_id.eq(user_id))
                .order(orders::created_at.desc())
                .select(OrderRow::as_select())
                .load(&mut conn)?;
            load_with_items(&mut conn, order_rows)
        })
        .await
        .map_err(|e| DomainError::Internal(e.to_string()))?
    }

    async fn find_all(&self) -> Result<Vec<OrderView>, DomainError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let order_rows = orders::table
                .order(orders::created_at.desc())
                .select(OrderRow::as_select())
                .load(&mut conn)?;
            load_with_items(&mut conn, order_rows)
        })
        .await
        .map_err(|e| DomainError::Internal(e.to_string()))?
    }

    async fn set_reference(&self, id: Uuid, reference: &str) -> Result<(), DomainError> {
        let pool = self.pool.clone();
        let reference = reference.to_string();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let updated = diesel::update(orders::table.filter(orders::id.eq(id)))
                .set(orders::reference.eq(reference))
                .execute(&mut conn)?;
            if updated == 0 {
                return Err(DomainError::OrderNotFound);
            }
            Ok(())
        })
        .await
        .map_err(|e| DomainError::Internal(e.to_string()))?
    }

    async fn transition_from_pending(
        &self,
        id: Uuid,
        to: OrderStatus,
        payment: Option<bool>,
    ) -> Result<bool, DomainError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let target = orders::table
                .filter(orders::id.eq(id))
                .filter(orders::status.eq(OrderStatus::Pending.as_str()));
            let updated = match payment {
                Some(paid) => diesel::update(target)
                    .set((orders::status.eq(to.as_str()), orders::payment.eq(paid)))
                    .execute(&mut conn)?,
                None => diesel::update(target)
                    .set(orders::status.eq(to.as_str()))
                    .execute(&mut conn)?,
            };
            Ok(updated > 0)
        })
        .await
        .map_err(|e| DomainError::Internal(e.to_string()))?
    }

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<bool, DomainError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let updated = diesel::update(orders::table.filter(orders::id.eq(id)))
                .set(orders::status.eq(status.as_str()))
                .execute(&mut conn)?;
            Ok(updated > 0)
        })
        .await
        .map_err(|e| DomainError::Internal(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use uuid::Uuid;

    use super::DieselOrderStore;
    use crate::domain::order::{Address, LineItem, NewOrder, OrderStatus};
    use crate::domain::ports::OrderStore;
    use crate::infrastructure::test_support::{insert_user, setup_db};

    fn sample_order(user_id: Uuid) -> NewOrder {
        NewOrder {
            user_id,
            items: vec![
                LineItem {
                    item_id: "1".to_string(),
                    name: "Pizza".to_string(),
                    quantity: 2,
                    unit_price: BigDecimal::from_str("15.99").unwrap(),
                },
                LineItem {
                    item_id: "2".to_string(),
                    name: "Burger".to_string(),
                    quantity: 1,
                    unit_price: BigDecimal::from_str("8.99").unwrap(),
                },
            ],
            amount: BigDecimal::from_str("40.97").unwrap(),
            address: Address {
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                email: "test@example.com".to_string(),
                street: "123 Test St".to_string(),
                city: "Test City".to_string(),
                state: "TS".to_string(),
                zipcode: "12345".to_string(),
                country: "Testland".to_string(),
                phone: "5550100".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn create_and_find_by_id_roundtrip() {
        let (_container, pool) = setup_db().await;
        let user_id = insert_user(&pool, "roundtrip@example.com");
        let store = DieselOrderStore::new(pool);

        let created = store
            .create(sample_order(user_id))
            .await
            .expect("create failed");
        let order = store
            .find_by_id(created.id)
            .await
            .expect("find failed")
            .expect("order should exist");

        assert_eq!(order.user_id, user_id);
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(!order.payment);
        assert!(order.reference.is_none());
        assert_eq!(order.amount, BigDecimal::from_str("40.97").unwrap());
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items.iter().map(|i| i.quantity).sum::<i32>(), 3);
        assert_eq!(order.address.city, "Test City");
    }

    #[tokio::test]
    async fn find_by_id_returns_none_for_unknown_id() {
        let (_container, pool) = setup_db().await;
        let store = DieselOrderStore::new(pool);

        let result = store
            .find_by_id(Uuid::new_v4())
            .await
            .expect("find should not error");

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn transition_applies_only_from_pending() {
        let (_container, pool) = setup_db().await;
        let user_id = insert_user(&pool, "transition@example.com");
        let store = DieselOrderStore::new(pool);
        let created = store
            .create(sample_order(user_id))
            .await
            .expect("create failed");

        let applied = store
            .transition_from_pending(created.id, OrderStatus::Confirmed, Some(true))
            .await
            .expect("transition failed");
        assert!(applied);

        let order = store.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert!(order.payment);

        // A second transition attempt loses the race by definition.
        let applied = store
            .transition_from_pending(created.id, OrderStatus::Cancelled, None)
            .await
            .expect("transition failed");
        assert!(!applied);

        let order = store.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert!(order.payment);
    }

    #[tokio::test]
    async fn set_reference_persists_on_the_order() {
        let (_container, pool) = setup_db().await;
        let user_id = insert_user(&pool, "reference@example.com");
        let store = DieselOrderStore::new(pool);
        let created = store
            .create(sample_order(user_id))
            .await
            .expect("create failed");

        store
            .set_reference(created.id, "ps_ref_123")
            .await
            .expect("set_reference failed");

        let order = store.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(order.reference.as_deref(), Some("ps_ref_123"));
    }

    #[tokio::test]
    async fn find_by_user_filters_and_find_all_does_not() {
        let (_container, pool) = setup_db().await;
        let first = insert_user(&pool, "first@example.com");
        let second = insert_user(&pool, "second@example.com");
        let store = DieselOrderStore::new(pool);

        store.create(sample_order(first)).await.expect("create failed");
        store.create(sample_order(first)).await.expect("create failed");
        store.create(sample_order(second)).await.expect("create failed");

        let firsts = store.find_by_user(first).await.expect("find_by_user failed");
        assert_eq!(firsts.len(), 2);
        assert!(firsts.iter().all(|o| o.user_id == first));

        let all = store.find_all().await.expect("find_all failed");
        assert_eq!(all.len(), 3);

        let none = store
            .find_by_user(Uuid::new_v4())
            .await
            .expect("find_by_user failed");
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn update_status_reports_row_existence() {
        let (_container, pool) = setup_db().await;
        let user_id = insert_user(&pool, "admin@example.com");
        let store = DieselOrderStore::new(pool);
        let created = store
            .create(sample_order(user_id))
            .await
            .expect("create failed");

        let updated = store
            .update_status(created.id, OrderStatus::Cancelled)
            .await
            .expect("update failed");
        assert!(updated);
        let order = store.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);

        let updated = store
            .update_status(Uuid::new_v4(), OrderStatus::Cancelled)
            .await
            .expect("update failed");
        assert!(!updated);
    }
}
