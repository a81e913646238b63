/// ドメイン層のエラー型
/// ビジネスルール違反を表現する
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// 無効な宿泊期間（チェックアウト日がチェックイン日以前）
    #[error("{0}")]
    InvalidStayPeriod(String),
    /// 予約時点で客室の在庫がない（参考チェック）
    #[error("This room is not available for reservation.")]
    RoomUnavailable,
    /// 確定時点で在庫がない
    #[error("Room is out of stock")]
    OutOfStock,
    /// 既にキャンセル済みの予約
    #[error("Booking is already cancelled.")]
    AlreadyCancelled,
    /// 現在の状態では許可されない遷移
    #[error("Invalid booking state: {0}")]
    InvalidBookingState(String),
    /// 無効な値
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}
