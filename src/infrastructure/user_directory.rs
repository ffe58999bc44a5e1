use diesel::prelude::*;
use serde_json::json;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::UserRecord;
use crate::domain::ports::UserDirectory;
use crate::schema::users;

use super::models::UserRow;

pub struct DieselUserDirectory {
    pool: DbPool,
}

impl DieselUserDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserDirectory for DieselUserDirectory {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, DomainError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let user = users::table
                .filter(users::id.eq(id))
                .select(UserRow::as_select())
                .first(&mut conn)
                .optional()?;
            Ok(user.map(|u| UserRecord {
                id: u.id,
                email: u.email,
            }))
        })
        .await
        .map_err(|e| DomainError::Internal(e.to_string()))?
    }

    async fn clear_cart(&self, id: Uuid) -> Result<(), DomainError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let updated = diesel::update(users::table.filter(users::id.eq(id)))
                .set(users::cart_data.eq(json!({})))
                .execute(&mut conn)?;
            if updated == 0 {
                return Err(DomainError::UserNotFound);
            }
            Ok(())
        })
        .await
        .map_err(|e| DomainError::Internal(e.to_string()))?
    }
}
