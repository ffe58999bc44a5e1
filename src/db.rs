use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

/// Pool size covers the actix worker threads plus the blocking pool the
/// store adapters run their queries on.
const MAX_POOL_SIZE: u32 = 10;

pub fn create_pool(database_url: &str) -> DbPool {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder()
        .max_size(MAX_POOL_SIZE)
        .build(manager)
        .expect("Failed to build Postgres connection pool")
}
