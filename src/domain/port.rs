// 出力ポート
// ドメイン層が外部に依存する機能をトレイトとして定義
// アダプター層でこれらのトレイトを実装する

use crate::domain::model::{
    Booking, BookingId, BookingStatus, BookingTransition, HotelId, Room, RoomId, UserId,
};
use async_trait::async_trait;

/// リポジトリエラー型
/// リポジトリ操作で発生するエラーを表現する
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[allow(clippy::enum_variant_names)]
pub enum RepositoryError {
    /// データベース接続に失敗
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    /// 操作に失敗
    #[error("Operation failed: {0}")]
    OperationFailed(String),
    /// データの取得に失敗
    #[error("Fetch failed: {0}")]
    FetchFailed(String),
}

/// 在庫台帳の減算結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerOutcome {
    /// 在庫を1つ減算した
    Decremented,
    /// 在庫が0のため減算しなかった
    OutOfStock,
}

/// 状態遷移の適用結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// ステータス更新と在庫作用を適用した
    Applied,
    /// 予約のステータスが `from` と一致しない（並行更新または削除）
    StatusChanged,
    /// 在庫減算が必要だが在庫が0（何も変更していない）
    OutOfStock,
}

/// 在庫台帳トレイト
/// 客室ごとの在庫数に対するアトミックな読み取り・変更・書き込みを抽象化する
#[async_trait]
pub trait InventoryLedger: Send + Sync {
    /// 在庫を1つ減算する
    /// 在庫が0の場合は何も変更せずに `LedgerOutcome::OutOfStock` を返す
    async fn decrement(&self, room_id: RoomId) -> Result<LedgerOutcome, RepositoryError>;

    /// 在庫を1つ戻す
    async fn increment(&self, room_id: RoomId) -> Result<(), RepositoryError>;
}

/// 客室リポジトリトレイト
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// 客室を保存する
    async fn save(&self, room: &Room) -> Result<(), RepositoryError>;

    /// 客室IDで客室を検索する
    async fn find_by_id(&self, room_id: RoomId) -> Result<Option<Room>, RepositoryError>;

    /// すべての客室を取得する
    async fn find_all(&self) -> Result<Vec<Room>, RepositoryError>;

    /// 指定されたホテルの客室を取得する
    async fn find_by_hotel(&self, hotel_id: HotelId) -> Result<Vec<Room>, RepositoryError>;

    /// 新しい一意の客室IDを生成する
    fn next_identity(&self) -> RoomId {
        RoomId::new()
    }
}

/// 予約リポジトリトレイト
/// 予約集約の永続化と、状態遷移のアトミックな適用を抽象化する
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// 新しい予約を保存する
    async fn save(&self, booking: &Booking) -> Result<(), RepositoryError>;

    /// 予約IDで予約を検索する
    ///
    /// # Returns
    /// * `Ok(Some(Booking))` - 予約が見つかった
    /// * `Ok(None)` - 予約が見つからなかった
    async fn find_by_id(&self, booking_id: BookingId) -> Result<Option<Booking>, RepositoryError>;

    /// 利用者の予約を取得する
    /// 作成日時の降順で並べて返す
    async fn find_by_user(&self, user: UserId) -> Result<Vec<Booking>, RepositoryError>;

    /// 指定されたステータスの予約を取得する
    /// 作成日時の昇順で並べて返す
    async fn find_by_status(&self, status: BookingStatus) -> Result<Vec<Booking>, RepositoryError>;

    /// 状態遷移をアトミックに適用する
    ///
    /// ステータスが `transition.from` の場合に限り `transition.to` へ更新し、
    /// 同じトランザクションで在庫作用を適用する。
    /// どちらかが成立しなければ何も変更しない。
    async fn apply_transition(
        &self,
        transition: &BookingTransition,
    ) -> Result<TransitionOutcome, RepositoryError>;

    /// 新しい一意の予約IDを生成する
    fn next_identity(&self) -> BookingId {
        BookingId::new()
    }
}

/// 確定キューのエラー
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueueError {
    #[error("Confirmation queue is closed")]
    Closed,
}

/// 確定キュートレイト
/// 予約確定タスクを非同期ワーカーに引き渡すポート
#[async_trait]
pub trait ConfirmationQueue: Send + Sync {
    /// 予約の確定タスクを登録する（結果は呼び出し元に返らない）
    async fn enqueue(&self, booking_id: BookingId) -> Result<(), QueueError>;
}
