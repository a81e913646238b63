use crate::adapter::database_error::DatabaseError;
use sqlx::{MySql, Pool};
use tracing::info;

/// 適用するマイグレーション（順番に実行する）
const MIGRATIONS: [(&str, &str); 2] = [
    ("001_create_rooms_table", include_str!("../../migrations/001_create_rooms_table.sql")),
    ("002_create_bookings_table", include_str!("../../migrations/002_create_bookings_table.sql")),
];

/// データベースマイグレーションを管理する構造体
pub struct DatabaseMigration {
    pool: Pool<MySql>,
}

impl DatabaseMigration {
    /// 新しいDatabaseMigrationインスタンスを作成
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    /// マイグレーションを実行
    /// べき等性を保証（CREATE TABLE IF NOT EXISTS）
    pub async fn run(&self) -> Result<(), DatabaseError> {
        for (name, migration_sql) in MIGRATIONS {
            sqlx::query(migration_sql)
                .execute(&self.pool)
                .await
                .map_err(|e| DatabaseError::MigrationError(format!("Migration {} failed: {}", name, e)))?;
            info!(migration = name, "migration applied");
        }

        Ok(())
    }
}
