use crate::application::ApplicationError;
use crate::domain::error::DomainError;
use crate::domain::model::{Booking, BookingId, Money, Room, RoomId, UserId};
use crate::domain::port::{BookingRepository, ConfirmationQueue, RoomRepository, TransitionOutcome};
use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

mod room_catalog_service;

pub use room_catalog_service::RoomCatalogService;

/// キャンセル時に並行更新と競合した場合の最大試行回数
const MAX_TRANSITION_ATTEMPTS: usize = 3;

/// 予約と対象客室の組
/// レスポンスの合計金額計算に客室の料金が必要なため一緒に返す
#[derive(Debug, Clone, PartialEq)]
pub struct BookingView {
    pub booking: Booking,
    pub room: Room,
}

impl BookingView {
    /// 合計金額
    pub fn total_price(&self) -> Result<Money, DomainError> {
        self.booking.total_price(&self.room)
    }
}

/// 予約アプリケーションサービス
/// 外部の呼び出し元（REST API）が予約を操作するための窓口
pub struct BookingApplicationService {
    room_repository: Arc<dyn RoomRepository>,
    booking_repository: Arc<dyn BookingRepository>,
    confirmation_queue: Arc<dyn ConfirmationQueue>,
}

impl BookingApplicationService {
    /// 新しい予約アプリケーションサービスを作成
    ///
    /// # Arguments
    /// * `room_repository` - 客室リポジトリ
    /// * `booking_repository` - 予約リポジトリ
    /// * `confirmation_queue` - 予約確定キュー
    pub fn new(
        room_repository: Arc<dyn RoomRepository>,
        booking_repository: Arc<dyn BookingRepository>,
        confirmation_queue: Arc<dyn ConfirmationQueue>,
    ) -> Self {
        Self {
            room_repository,
            booking_repository,
            confirmation_queue,
        }
    }

    /// 客室を予約する
    ///
    /// 予約はPending状態で作成され、確定は非同期ワーカーに委ねる。
    /// 在庫はこの時点では減算しない。
    ///
    /// # Returns
    /// * `Ok(BookingView)` - 作成された予約
    /// * `Err(ApplicationError::NotFound)` - 客室が存在しない
    /// * `Err(ApplicationError::DomainError(RoomUnavailable))` - 在庫なし
    /// * `Err(ApplicationError::DomainError(InvalidStayPeriod))` - 日付が不正
    #[tracing::instrument(skip_all, fields(%room_id, %caller))]
    pub async fn reserve(
        &self,
        room_id: RoomId,
        check_in: NaiveDate,
        check_out: NaiveDate,
        caller: UserId,
    ) -> Result<BookingView, ApplicationError> {
        let room = self.check_reservable(room_id).await?;

        let booking = Booking::reserve(
            self.booking_repository.next_identity(),
            caller,
            &room,
            check_in,
            check_out,
            Utc::now(),
        )?;
        self.booking_repository.save(&booking).await?;
        info!(booking_id = %booking.id(), "booking created as pending");

        // 確定タスクの登録失敗はリクエストを失敗させない
        // Pendingの予約は起動時の再登録で拾われる
        if let Err(err) = self.confirmation_queue.enqueue(booking.id()).await {
            error!(booking_id = %booking.id(), error = %err, "failed to enqueue booking confirmation");
        }

        Ok(BookingView { booking, room })
    }

    /// 予約をキャンセルする
    ///
    /// Confirmedからのキャンセルは在庫を1つ戻す。確定処理と競合した場合は
    /// 予約を読み直して遷移をやり直す。
    ///
    /// # Returns
    /// * `Ok(Booking)` - キャンセル後の予約
    /// * `Err(ApplicationError::NotFound)` - 予約が存在しない
    /// * `Err(ApplicationError::Forbidden)` - 呼び出し元が所有者ではない
    /// * `Err(ApplicationError::DomainError(AlreadyCancelled))` - 既にキャンセル済み
    #[tracing::instrument(skip_all, fields(%booking_id, %caller))]
    pub async fn cancel(
        &self,
        booking_id: BookingId,
        caller: UserId,
    ) -> Result<Booking, ApplicationError> {
        for attempt in 1..=MAX_TRANSITION_ATTEMPTS {
            let mut booking = self.find_booking(booking_id).await?;

            if !booking.is_owned_by(caller) {
                return Err(ApplicationError::Forbidden(
                    "You cannot cancel someone else's booking.".to_string(),
                ));
            }

            let transition = booking.cancel()?;

            match self.booking_repository.apply_transition(&transition).await? {
                TransitionOutcome::Applied => {
                    info!(
                        previous_status = %transition.from,
                        ledger = ?transition.ledger,
                        "booking cancelled"
                    );
                    return Ok(booking);
                }
                TransitionOutcome::StatusChanged => {
                    warn!(attempt, "booking status changed concurrently, retrying cancel");
                }
                TransitionOutcome::OutOfStock => {
                    // キャンセルは在庫を減算しないためここには来ない
                    return Err(DomainError::OutOfStock.into());
                }
            }
        }

        Err(ApplicationError::ConcurrentModification(format!(
            "予約 {} のキャンセルが並行更新により完了しませんでした",
            booking_id
        )))
    }

    /// 客室が予約を受け付けられる状態か確認する
    ///
    /// 宿泊日の検証より前に行う参考チェック。在庫の確保は確定時に行う。
    ///
    /// # Returns
    /// * `Ok(Room)` - 在庫のある客室
    /// * `Err(ApplicationError::NotFound)` - 客室が存在しない
    /// * `Err(ApplicationError::DomainError(RoomUnavailable))` - 在庫なし
    pub async fn check_reservable(&self, room_id: RoomId) -> Result<Room, ApplicationError> {
        let room = self.find_room(room_id).await?;
        if !room.is_available() {
            return Err(DomainError::RoomUnavailable.into());
        }
        Ok(room)
    }

    /// 呼び出し元の予約一覧を取得する
    /// 作成日時の降順で並べて返す
    pub async fn list_for_user(&self, caller: UserId) -> Result<Vec<BookingView>, ApplicationError> {
        let bookings = self.booking_repository.find_by_user(caller).await?;

        let mut rooms: HashMap<RoomId, Room> = HashMap::new();
        let mut views = Vec::with_capacity(bookings.len());
        for booking in bookings {
            let room = match rooms.get(&booking.room_id()) {
                Some(room) => room.clone(),
                None => {
                    let room = self.find_room(booking.room_id()).await?;
                    rooms.insert(room.id(), room.clone());
                    room
                }
            };
            views.push(BookingView { booking, room });
        }

        Ok(views)
    }

    /// 呼び出し元の予約を1件取得する
    ///
    /// 他の利用者の予約は存在を漏らさないよう `NotFound` として扱う。
    pub async fn detail(
        &self,
        booking_id: BookingId,
        caller: UserId,
    ) -> Result<BookingView, ApplicationError> {
        let booking = self
            .booking_repository
            .find_by_id(booking_id)
            .await?
            .filter(|booking| booking.is_owned_by(caller))
            .ok_or_else(|| booking_not_found(booking_id))?;

        let room = self.find_room(booking.room_id()).await?;
        Ok(BookingView { booking, room })
    }

    async fn find_room(&self, room_id: RoomId) -> Result<Room, ApplicationError> {
        self.room_repository
            .find_by_id(room_id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound(format!("客室が見つかりません: {}", room_id)))
    }

    async fn find_booking(&self, booking_id: BookingId) -> Result<Booking, ApplicationError> {
        self.booking_repository
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| booking_not_found(booking_id))
    }
}

fn booking_not_found(booking_id: BookingId) -> ApplicationError {
    ApplicationError::NotFound(format!("予約が見つかりません: {}", booking_id))
}
