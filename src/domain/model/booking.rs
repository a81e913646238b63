use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::error::DomainError;
use crate::domain::model::{BookingId, BookingStatus, Money, Room, RoomId, StayPeriod, UserId};

/// 状態遷移に伴う在庫台帳への作用
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerEffect {
    /// 在庫を変更しない
    None,
    /// 在庫を1つ減算する（在庫0なら遷移全体が失敗）
    Decrement,
    /// 在庫を1つ戻す
    Increment,
}

/// 予約の状態遷移
/// リポジトリは `from` を条件にステータスを更新し、同じトランザクションで在庫作用を適用する
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingTransition {
    pub booking_id: BookingId,
    pub room_id: RoomId,
    pub from: BookingStatus,
    pub to: BookingStatus,
    pub ledger: LedgerEffect,
}

/// Booking集約
/// 1件の予約のライフサイクル（Pending → Confirmed / Cancelled）を管理する
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    id: BookingId,
    user: UserId,
    room_id: RoomId,
    stay: StayPeriod,
    created_at: DateTime<Utc>,
    status: BookingStatus,
}

impl Booking {
    /// 新しい予約をPending状態で作成
    ///
    /// 在庫チェックは参考チェックのみで、在庫の減算は確定時に行う。
    ///
    /// # Returns
    /// * `Err(DomainError::RoomUnavailable)` - 客室の在庫が0
    /// * `Err(DomainError::InvalidStayPeriod)` - チェックアウト日がチェックイン日以前
    /// * `Err(DomainError::InvalidValue)` - 合計金額が表現できない
    pub fn reserve(
        id: BookingId,
        user: UserId,
        room: &Room,
        check_in: NaiveDate,
        check_out: NaiveDate,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if !room.is_available() {
            return Err(DomainError::RoomUnavailable);
        }
        let stay = StayPeriod::new(check_in, check_out)?;
        // 合計金額が計算できない予約は作成しない
        room.price_per_night().multiply(stay.nights())?;

        Ok(Self {
            id,
            user,
            room_id: room.id(),
            stay,
            created_at,
            status: BookingStatus::Pending,
        })
    }

    /// データベースから取得したデータで予約を再構築
    pub fn reconstruct(
        id: BookingId,
        user: UserId,
        room_id: RoomId,
        stay: StayPeriod,
        created_at: DateTime<Utc>,
        status: BookingStatus,
    ) -> Self {
        Self {
            id,
            user,
            room_id,
            stay,
            created_at,
            status,
        }
    }

    pub fn id(&self) -> BookingId {
        self.id
    }

    pub fn user(&self) -> UserId {
        self.user
    }

    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    pub fn stay(&self) -> StayPeriod {
        self.stay
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn status(&self) -> BookingStatus {
        self.status
    }

    /// 指定された利用者がこの予約の所有者か
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.user == user
    }

    /// 予約を確定
    /// 事前条件:
    /// - ステータスがPending
    ///
    /// 在庫の減算は返された遷移をリポジトリが適用するときに行われる。
    pub fn confirm(&mut self) -> Result<BookingTransition, DomainError> {
        if self.status != BookingStatus::Pending {
            return Err(DomainError::InvalidBookingState(format!(
                "確定できるのはPending状態のみです（現在: {}）",
                self.status
            )));
        }

        Ok(self.transition_to(BookingStatus::Confirmed, LedgerEffect::Decrement))
    }

    /// 予約をキャンセル
    /// 事前条件:
    /// - ステータスがCancelled以外
    ///
    /// Confirmedからのキャンセルのみ在庫を戻す。
    pub fn cancel(&mut self) -> Result<BookingTransition, DomainError> {
        let ledger = match self.status {
            BookingStatus::Pending => LedgerEffect::None,
            BookingStatus::Confirmed => LedgerEffect::Increment,
            BookingStatus::Cancelled => return Err(DomainError::AlreadyCancelled),
        };

        Ok(self.transition_to(BookingStatus::Cancelled, ledger))
    }

    fn transition_to(&mut self, to: BookingStatus, ledger: LedgerEffect) -> BookingTransition {
        let transition = BookingTransition {
            booking_id: self.id,
            room_id: self.room_id,
            from: self.status,
            to,
            ledger,
        };
        self.status = to;
        transition
    }

    /// 合計金額（1泊あたりの料金 × 宿泊数）
    pub fn total_price(&self, room: &Room) -> Result<Money, DomainError> {
        room.price_per_night().multiply(self.stay.nights())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{HotelId, Money, RoomType};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn room_with_stock(stock: u32) -> Room {
        Room::new(
            RoomId::new(),
            HotelId::new(),
            RoomType::Single,
            Money::new(dec!(100.00)).unwrap(),
            stock,
        )
        .unwrap()
    }

    fn pending_booking(room: &Room) -> Booking {
        Booking::reserve(
            BookingId::new(),
            UserId::new(),
            room,
            date(2025, 6, 1),
            date(2025, 6, 5),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_reserve_creates_pending_booking() {
        let room = room_with_stock(1);
        let booking = pending_booking(&room);

        assert_eq!(booking.status(), BookingStatus::Pending);
        assert_eq!(booking.room_id(), room.id());
        assert_eq!(room.stock(), 1);
    }

    #[test]
    fn test_reserve_without_stock_is_unavailable() {
        let room = room_with_stock(0);
        let result = Booking::reserve(
            BookingId::new(),
            UserId::new(),
            &room,
            date(2025, 6, 1),
            date(2025, 6, 5),
            Utc::now(),
        );
        assert_eq!(result, Err(DomainError::RoomUnavailable));
    }

    #[test]
    fn test_reserve_with_invalid_dates_fails_validation() {
        let room = room_with_stock(3);
        let result = Booking::reserve(
            BookingId::new(),
            UserId::new(),
            &room,
            date(2025, 6, 5),
            date(2025, 6, 5),
            Utc::now(),
        );
        assert!(matches!(result, Err(DomainError::InvalidStayPeriod(_))));
    }

    #[test]
    fn test_confirm_pending_decrements_ledger() {
        let room = room_with_stock(1);
        let mut booking = pending_booking(&room);

        let transition = booking.confirm().unwrap();

        assert_eq!(booking.status(), BookingStatus::Confirmed);
        assert_eq!(transition.from, BookingStatus::Pending);
        assert_eq!(transition.to, BookingStatus::Confirmed);
        assert_eq!(transition.ledger, LedgerEffect::Decrement);
        assert_eq!(transition.room_id, room.id());
    }

    #[test]
    fn test_confirm_non_pending_is_rejected() {
        let room = room_with_stock(1);
        let mut booking = pending_booking(&room);
        booking.confirm().unwrap();

        assert!(matches!(booking.confirm(), Err(DomainError::InvalidBookingState(_))));

        let mut cancelled = pending_booking(&room);
        cancelled.cancel().unwrap();
        assert!(matches!(cancelled.confirm(), Err(DomainError::InvalidBookingState(_))));
        assert_eq!(cancelled.status(), BookingStatus::Cancelled);
    }

    #[test]
    fn test_cancel_pending_leaves_ledger_untouched() {
        let room = room_with_stock(1);
        let mut booking = pending_booking(&room);

        let transition = booking.cancel().unwrap();

        assert_eq!(booking.status(), BookingStatus::Cancelled);
        assert_eq!(transition.ledger, LedgerEffect::None);
    }

    #[test]
    fn test_cancel_confirmed_credits_ledger() {
        let room = room_with_stock(1);
        let mut booking = pending_booking(&room);
        booking.confirm().unwrap();

        let transition = booking.cancel().unwrap();

        assert_eq!(transition.from, BookingStatus::Confirmed);
        assert_eq!(transition.ledger, LedgerEffect::Increment);
    }

    #[test]
    fn test_cancelled_is_absorbing() {
        let room = room_with_stock(1);
        let mut booking = pending_booking(&room);
        booking.cancel().unwrap();

        assert_eq!(booking.cancel(), Err(DomainError::AlreadyCancelled));
        assert_eq!(booking.status(), BookingStatus::Cancelled);
    }

    #[test]
    fn test_total_price_uses_nights() {
        let room = room_with_stock(1);
        let booking = pending_booking(&room);
        assert_eq!(booking.total_price(&room).unwrap().amount(), dec!(400.00));
    }
}
