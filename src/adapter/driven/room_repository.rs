use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{HotelId, Money, Room, RoomId, RoomType};
use crate::domain::port::{InventoryLedger, LedgerOutcome, RepositoryError, RoomRepository};
use async_trait::async_trait;
use rust_decimal::Decimal;

// MySQL関連のインポート
use sqlx::mysql::MySqlRow;
use sqlx::{Executor, MySql, Pool, Row};

const ROOM_COLUMNS: &str = "id, hotel_id, room_type, price_per_night, stock";

/// 在庫を1つ減算する（在庫が0なら何もしない）
/// 条件付きUPDATEの1文で読み取りと書き込みを不可分に行う
///
/// # Returns
/// * `Ok(true)` - 減算した
/// * `Ok(false)` - 在庫が0、または客室が存在しない
pub(crate) async fn decrement_stock<'e, E>(executor: E, room_id: RoomId) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = MySql>,
{
    let result = sqlx::query("UPDATE rooms SET stock = stock - 1 WHERE id = ? AND stock > 0")
        .bind(room_id.to_string())
        .execute(executor)
        .await?;
    Ok(result.rows_affected() == 1)
}

/// 在庫を1つ戻す
///
/// # Returns
/// * `Ok(false)` - 客室が存在しない
pub(crate) async fn increment_stock<'e, E>(executor: E, room_id: RoomId) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = MySql>,
{
    let result = sqlx::query("UPDATE rooms SET stock = stock + 1 WHERE id = ?")
        .bind(room_id.to_string())
        .execute(executor)
        .await?;
    Ok(result.rows_affected() == 1)
}

/// データベースの行から客室を再構築する
fn room_from_row(row: &MySqlRow) -> Result<Room, RepositoryError> {
    let fetch_failed = |e: sqlx::Error| RepositoryError::FetchFailed(format!("客室の列の読み取りに失敗しました: {}", e));

    let id = RoomId::from_string(row.try_get("id").map_err(fetch_failed)?)
        .map_err(|e| RepositoryError::FetchFailed(format!("客室IDの解析に失敗しました: {}", e)))?;
    let hotel_id = HotelId::from_string(row.try_get("hotel_id").map_err(fetch_failed)?)
        .map_err(|e| RepositoryError::FetchFailed(format!("ホテルIDの解析に失敗しました: {}", e)))?;
    let room_type = RoomType::from_string(row.try_get("room_type").map_err(fetch_failed)?)
        .map_err(|e| RepositoryError::FetchFailed(e.to_string()))?;
    let price = Money::new(row.try_get::<Decimal, _>("price_per_night").map_err(fetch_failed)?)
        .map_err(|e| RepositoryError::FetchFailed(e.to_string()))?;
    let stock: u32 = row.try_get("stock").map_err(fetch_failed)?;

    Room::new(id, hotel_id, room_type, price, stock)
        .map_err(|e| RepositoryError::FetchFailed(format!("客室の再構築に失敗しました: {}", e)))
}

/// MySQL客室リポジトリ
/// MySQLデータベースを使用して客室を永続化する
#[derive(Clone)]
pub struct MySqlRoomRepository {
    pool: Pool<MySql>,
}

impl MySqlRoomRepository {
    /// 新しいMySQL客室リポジトリを作成
    ///
    /// # Arguments
    /// * `pool` - MySQLコネクションプール
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoomRepository for MySqlRoomRepository {
    async fn save(&self, room: &Room) -> Result<(), RepositoryError> {
        // 客室データをroomsテーブルにUPSERT
        sqlx::query(
            r#"
            INSERT INTO rooms (id, hotel_id, room_type, price_per_night, stock)
            VALUES (?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                room_type = VALUES(room_type),
                price_per_night = VALUES(price_per_night),
                stock = VALUES(stock)
            "#,
        )
        .bind(room.id().to_string())
        .bind(room.hotel_id().to_string())
        .bind(room.room_type().to_string())
        .bind(room.price_per_night().amount())
        .bind(room.stock())
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::query("客室の保存に失敗しました"))?;

        Ok(())
    }

    async fn find_by_id(&self, room_id: RoomId) -> Result<Option<Room>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {} FROM rooms WHERE id = ?", ROOM_COLUMNS))
            .bind(room_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::query("客室の取得に失敗しました"))?;

        row.as_ref().map(room_from_row).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Room>, RepositoryError> {
        let rows = sqlx::query(&format!("SELECT {} FROM rooms ORDER BY id ASC", ROOM_COLUMNS))
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::query("客室一覧の取得に失敗しました"))?;

        rows.iter().map(room_from_row).collect()
    }

    async fn find_by_hotel(&self, hotel_id: HotelId) -> Result<Vec<Room>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM rooms WHERE hotel_id = ? ORDER BY id ASC",
            ROOM_COLUMNS
        ))
        .bind(hotel_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::query("ホテル別客室一覧の取得に失敗しました"))?;

        rows.iter().map(room_from_row).collect()
    }
}

/// MySQL在庫台帳
/// roomsテーブルのstock列を条件付きUPDATEで増減する
#[derive(Clone)]
pub struct MySqlInventoryLedger {
    pool: Pool<MySql>,
}

impl MySqlInventoryLedger {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    async fn room_exists(&self, room_id: RoomId) -> Result<bool, RepositoryError> {
        let row = sqlx::query("SELECT 1 FROM rooms WHERE id = ?")
            .bind(room_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::query("客室の存在確認に失敗しました"))?;
        Ok(row.is_some())
    }
}

#[async_trait]
impl InventoryLedger for MySqlInventoryLedger {
    async fn decrement(&self, room_id: RoomId) -> Result<LedgerOutcome, RepositoryError> {
        let decremented = decrement_stock(&self.pool, room_id)
            .await
            .map_err(DatabaseError::query("在庫の減算に失敗しました"))?;

        if decremented {
            return Ok(LedgerOutcome::Decremented);
        }
        if !self.room_exists(room_id).await? {
            return Err(RepositoryError::OperationFailed(format!(
                "客室が見つかりません: {}",
                room_id
            )));
        }
        Ok(LedgerOutcome::OutOfStock)
    }

    async fn increment(&self, room_id: RoomId) -> Result<(), RepositoryError> {
        let incremented = increment_stock(&self.pool, room_id)
            .await
            .map_err(DatabaseError::query("在庫の加算に失敗しました"))?;

        if !incremented {
            return Err(RepositoryError::OperationFailed(format!(
                "客室が見つかりません: {}",
                room_id
            )));
        }
        Ok(())
    }
}
