use crate::adapter::database_error::DatabaseError;
use crate::adapter::driven::room_repository::{decrement_stock, increment_stock};
use crate::domain::model::{
    Booking, BookingId, BookingStatus, BookingTransition, LedgerEffect, RoomId, StayPeriod, UserId,
};
use crate::domain::port::{BookingRepository, RepositoryError, TransitionOutcome};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

// MySQL関連のインポート
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, Pool, Row};

const BOOKING_COLUMNS: &str = "id, user_id, room_id, check_in, check_out, created_at, status";

/// データベースの行から予約を再構築する
fn booking_from_row(row: &MySqlRow) -> Result<Booking, RepositoryError> {
    let fetch_failed =
        |e: sqlx::Error| RepositoryError::FetchFailed(format!("予約の列の読み取りに失敗しました: {}", e));

    let id = BookingId::from_string(row.try_get("id").map_err(fetch_failed)?)
        .map_err(|e| RepositoryError::FetchFailed(format!("予約IDの解析に失敗しました: {}", e)))?;
    let user = UserId::from_string(row.try_get("user_id").map_err(fetch_failed)?)
        .map_err(|e| RepositoryError::FetchFailed(format!("利用者IDの解析に失敗しました: {}", e)))?;
    let room_id = RoomId::from_string(row.try_get("room_id").map_err(fetch_failed)?)
        .map_err(|e| RepositoryError::FetchFailed(format!("客室IDの解析に失敗しました: {}", e)))?;

    let check_in: NaiveDate = row.try_get("check_in").map_err(fetch_failed)?;
    let check_out: NaiveDate = row.try_get("check_out").map_err(fetch_failed)?;
    let stay = StayPeriod::new(check_in, check_out)
        .map_err(|e| RepositoryError::FetchFailed(format!("宿泊期間の構築に失敗しました: {}", e)))?;

    let created_at: NaiveDateTime = row.try_get("created_at").map_err(fetch_failed)?;
    let status = BookingStatus::from_string(row.try_get("status").map_err(fetch_failed)?).map_err(
        |e| RepositoryError::FetchFailed(format!("予約ステータスの解析に失敗しました: {}", e)),
    )?;

    Ok(Booking::reconstruct(
        id,
        user,
        room_id,
        stay,
        created_at.and_utc(),
        status,
    ))
}

/// MySQL予約リポジトリ
/// MySQLデータベースを使用して予約を永続化する
#[derive(Clone)]
pub struct MySqlBookingRepository {
    pool: Pool<MySql>,
}

impl MySqlBookingRepository {
    /// 新しいMySQL予約リポジトリを作成
    ///
    /// # Arguments
    /// * `pool` - MySQLコネクションプール
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for MySqlBookingRepository {
    async fn save(&self, booking: &Booking) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO bookings (id, user_id, room_id, check_in, check_out, created_at, status)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(booking.id().to_string())
        .bind(booking.user().to_string())
        .bind(booking.room_id().to_string())
        .bind(booking.stay().check_in())
        .bind(booking.stay().check_out())
        .bind(booking.created_at().naive_utc())
        .bind(booking.status().as_str())
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::query("予約の保存に失敗しました"))?;

        Ok(())
    }

    async fn find_by_id(&self, booking_id: BookingId) -> Result<Option<Booking>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM bookings WHERE id = ?",
            BOOKING_COLUMNS
        ))
        .bind(booking_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::query("予約の取得に失敗しました"))?;

        row.as_ref().map(booking_from_row).transpose()
    }

    async fn find_by_user(&self, user: UserId) -> Result<Vec<Booking>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM bookings WHERE user_id = ? ORDER BY created_at DESC",
            BOOKING_COLUMNS
        ))
        .bind(user.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::query("利用者の予約一覧の取得に失敗しました"))?;

        rows.iter().map(booking_from_row).collect()
    }

    async fn find_by_status(&self, status: BookingStatus) -> Result<Vec<Booking>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM bookings WHERE status = ? ORDER BY created_at ASC",
            BOOKING_COLUMNS
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::query("ステータス別予約一覧の取得に失敗しました"))?;

        rows.iter().map(booking_from_row).collect()
    }

    async fn apply_transition(
        &self,
        transition: &BookingTransition,
    ) -> Result<TransitionOutcome, RepositoryError> {
        // ロック順序は bookings → rooms で固定する
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(DatabaseError::connection("トランザクション開始に失敗しました"))?;

        let updated = sqlx::query("UPDATE bookings SET status = ? WHERE id = ? AND status = ?")
            .bind(transition.to.as_str())
            .bind(transition.booking_id.to_string())
            .bind(transition.from.as_str())
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::query("予約ステータスの更新に失敗しました"))?;

        if updated.rows_affected() != 1 {
            tx.rollback()
                .await
                .map_err(DatabaseError::connection("ロールバックに失敗しました"))?;
            return Ok(TransitionOutcome::StatusChanged);
        }

        match transition.ledger {
            LedgerEffect::None => {}
            LedgerEffect::Decrement => {
                let decremented = decrement_stock(&mut *tx, transition.room_id)
                    .await
                    .map_err(DatabaseError::query("在庫の減算に失敗しました"))?;
                if !decremented {
                    tx.rollback()
                        .await
                        .map_err(DatabaseError::connection("ロールバックに失敗しました"))?;
                    return Ok(TransitionOutcome::OutOfStock);
                }
            }
            LedgerEffect::Increment => {
                let incremented = increment_stock(&mut *tx, transition.room_id)
                    .await
                    .map_err(DatabaseError::query("在庫の加算に失敗しました"))?;
                if !incremented {
                    tx.rollback()
                        .await
                        .map_err(DatabaseError::connection("ロールバックに失敗しました"))?;
                    return Err(RepositoryError::OperationFailed(format!(
                        "客室が見つかりません: {}",
                        transition.room_id
                    )));
                }
            }
        }

        tx.commit()
            .await
            .map_err(DatabaseError::connection("トランザクションのコミットに失敗しました"))?;

        Ok(TransitionOutcome::Applied)
    }
}
