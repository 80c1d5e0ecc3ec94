use std::time::Duration;

use anyhow::Result;
use diesel::{
    mysql::MysqlConnection,
    r2d2::{ConnectionManager, Pool, PooledConnection},
};

pub type MysqlPool = Pool<ConnectionManager<MysqlConnection>>;
pub type PooledConn = PooledConnection<ConnectionManager<MysqlConnection>>;

#[inline]
pub fn get_pool(database_url: &str, size: u32) -> Result<MysqlPool> {
    let manager = ConnectionManager::<MysqlConnection>::new(database_url);
    let pool = Pool::builder()
        .max_size(size.max(1))
        .connection_timeout(Duration::from_secs(10))
        .build(manager)?;

    Ok(pool)
}

#[inline]
pub fn get_connection(pool: &MysqlPool) -> Result<PooledConn> {
    let conn = pool.get()?;

    Ok(conn)
}

/// Icon paths are stored relative to the static folder, sometimes with
/// Windows separators. The frontend wants "static/images/...".
pub fn static_path(path: &str) -> String {
    let cleaned = path.replace('\\', "/");
    let cleaned = cleaned.trim_start_matches('/');
    match cleaned {
        "" => String::new(),
        p if p.starts_with("static/") => p.to_owned(),
        p => format!("static/{}", p),
    }
}
