use hotel_booking::adapter::driven::{confirmation_channel, InMemoryStore};
use hotel_booking::application::service::{BookingApplicationService, RoomCatalogService};
use hotel_booking::application::worker::{ConfirmationOutcome, ConfirmationWorker};
use hotel_booking::application::ApplicationError;
use hotel_booking::domain::error::DomainError;
use hotel_booking::domain::model::{
    BookingId, BookingStatus, HotelId, Money, Room, RoomId, RoomType, UserId,
};
use hotel_booking::domain::port::{BookingRepository, RoomRepository};

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

// 予約ファサード・確定ワーカー・インメモリストアを組み立てたテスト環境
struct Hotel {
    store: InMemoryStore,
    bookings: BookingApplicationService,
    catalog: RoomCatalogService,
    worker: Arc<ConfirmationWorker>,
    receiver: UnboundedReceiver<BookingId>,
}

impl Hotel {
    fn new() -> Self {
        let store = InMemoryStore::new();
        let (queue, receiver) = confirmation_channel();
        let bookings = BookingApplicationService::new(
            Arc::new(store.rooms()),
            Arc::new(store.bookings()),
            Arc::new(queue),
        );
        let catalog = RoomCatalogService::new(Arc::new(store.rooms()), Arc::new(store.ledger()));
        let worker = Arc::new(ConfirmationWorker::new(
            Arc::new(store.bookings()),
            Duration::ZERO,
        ));
        Self {
            store,
            bookings,
            catalog,
            worker,
            receiver,
        }
    }

    async fn room(&self, stock: u32) -> Room {
        self.catalog
            .register_room(
                HotelId::new(),
                RoomType::Double,
                Money::new(dec!(100.00)).unwrap(),
                stock,
            )
            .await
            .unwrap()
    }

    async fn stock(&self, room_id: RoomId) -> u32 {
        self.store.rooms().find_by_id(room_id).await.unwrap().unwrap().stock()
    }

    async fn status(&self, booking_id: BookingId) -> BookingStatus {
        self.store
            .bookings()
            .find_by_id(booking_id)
            .await
            .unwrap()
            .unwrap()
            .status()
    }

    // キューに登録された確定タスクを1件取り出して実行する
    async fn run_next_confirmation(&mut self) -> ConfirmationOutcome {
        let booking_id = self.receiver.try_recv().unwrap();
        self.worker.confirm_booking(booking_id).await.unwrap()
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn test_end_to_end_reserve_confirm_cancel() {
    let mut hotel = Hotel::new();
    let room = hotel.room(1).await;
    let user_a = UserId::new();

    let view = hotel
        .bookings
        .reserve(room.id(), date(2025, 6, 1), date(2025, 6, 5), user_a)
        .await
        .unwrap();
    let booking_id = view.booking.id();
    assert_eq!(view.booking.status(), BookingStatus::Pending);
    assert_eq!(view.total_price().unwrap().amount(), dec!(400.00));
    assert_eq!(hotel.stock(room.id()).await, 1);

    let outcome = hotel.run_next_confirmation().await;
    assert_eq!(outcome, ConfirmationOutcome::Confirmed);
    assert_eq!(hotel.status(booking_id).await, BookingStatus::Confirmed);
    assert_eq!(hotel.stock(room.id()).await, 0);

    let cancelled = hotel.bookings.cancel(booking_id, user_a).await.unwrap();
    assert_eq!(cancelled.status(), BookingStatus::Cancelled);
    assert_eq!(hotel.status(booking_id).await, BookingStatus::Cancelled);
    assert_eq!(hotel.stock(room.id()).await, 1);
}

#[tokio::test]
async fn test_concurrent_confirmations_with_single_unit() {
    let hotel = Hotel::new();
    let room = hotel.room(1).await;

    // 参考チェックは在庫1を見て両方の予約を受け付ける
    let first = hotel
        .bookings
        .reserve(room.id(), date(2025, 6, 1), date(2025, 6, 3), UserId::new())
        .await
        .unwrap();
    let second = hotel
        .bookings
        .reserve(room.id(), date(2025, 6, 1), date(2025, 6, 3), UserId::new())
        .await
        .unwrap();

    let worker_a = Arc::clone(&hotel.worker);
    let worker_b = Arc::clone(&hotel.worker);
    let first_id = first.booking.id();
    let second_id = second.booking.id();
    let (a, b) = tokio::join!(
        tokio::spawn(async move { worker_a.confirm_booking(first_id).await.unwrap() }),
        tokio::spawn(async move { worker_b.confirm_booking(second_id).await.unwrap() }),
    );
    let outcomes = [a.unwrap(), b.unwrap()];

    let confirmed = outcomes
        .iter()
        .filter(|outcome| **outcome == ConfirmationOutcome::Confirmed)
        .count();
    let skipped = outcomes
        .iter()
        .filter(|outcome| **outcome == ConfirmationOutcome::SkippedNoStock)
        .count();
    assert_eq!(confirmed, 1);
    assert_eq!(skipped, 1);

    let statuses = [hotel.status(first_id).await, hotel.status(second_id).await];
    assert!(statuses.contains(&BookingStatus::Confirmed));
    assert!(statuses.contains(&BookingStatus::Pending));
    assert_eq!(hotel.stock(room.id()).await, 0);
}

#[tokio::test]
async fn test_many_concurrent_confirmations_never_oversell() {
    let hotel = Hotel::new();
    let room = hotel.room(3).await;

    let mut booking_ids = Vec::new();
    for _ in 0..12 {
        let view = hotel
            .bookings
            .reserve(room.id(), date(2025, 7, 1), date(2025, 7, 2), UserId::new())
            .await
            .unwrap();
        booking_ids.push(view.booking.id());
    }

    let mut handles = Vec::new();
    for booking_id in booking_ids.clone() {
        let worker = Arc::clone(&hotel.worker);
        handles.push(tokio::spawn(async move {
            worker.confirm_booking(booking_id).await.unwrap()
        }));
    }

    let mut confirmed = 0;
    for handle in handles {
        if handle.await.unwrap() == ConfirmationOutcome::Confirmed {
            confirmed += 1;
        }
    }

    assert_eq!(confirmed, 3);
    assert_eq!(hotel.stock(room.id()).await, 0);
    let mut pending = 0;
    for booking_id in booking_ids {
        if hotel.status(booking_id).await == BookingStatus::Pending {
            pending += 1;
        }
    }
    assert_eq!(pending, 9);
}

#[tokio::test]
async fn test_cancel_pending_booking_leaves_stock_untouched() {
    let mut hotel = Hotel::new();
    let room = hotel.room(2).await;
    let owner = UserId::new();

    let view = hotel
        .bookings
        .reserve(room.id(), date(2025, 6, 1), date(2025, 6, 5), owner)
        .await
        .unwrap();
    hotel.bookings.cancel(view.booking.id(), owner).await.unwrap();
    assert_eq!(hotel.stock(room.id()).await, 2);

    // 遅れて実行された確定タスクはキャンセル済みの予約を確定しない
    let outcome = hotel.run_next_confirmation().await;
    assert_eq!(
        outcome,
        ConfirmationOutcome::SkippedNotPending(BookingStatus::Cancelled)
    );
    assert_eq!(hotel.stock(room.id()).await, 2);
}

#[tokio::test]
async fn test_cancel_twice_changes_nothing() {
    let mut hotel = Hotel::new();
    let room = hotel.room(1).await;
    let owner = UserId::new();

    let view = hotel
        .bookings
        .reserve(room.id(), date(2025, 6, 1), date(2025, 6, 5), owner)
        .await
        .unwrap();
    hotel.run_next_confirmation().await;
    hotel.bookings.cancel(view.booking.id(), owner).await.unwrap();
    assert_eq!(hotel.stock(room.id()).await, 1);

    let result = hotel.bookings.cancel(view.booking.id(), owner).await;

    assert!(matches!(
        result,
        Err(ApplicationError::DomainError(DomainError::AlreadyCancelled))
    ));
    assert_eq!(hotel.status(view.booking.id()).await, BookingStatus::Cancelled);
    assert_eq!(hotel.stock(room.id()).await, 1);
}

#[tokio::test]
async fn test_non_owner_cannot_cancel_or_view() {
    let mut hotel = Hotel::new();
    let room = hotel.room(1).await;
    let owner = UserId::new();
    let stranger = UserId::new();

    let view = hotel
        .bookings
        .reserve(room.id(), date(2025, 6, 1), date(2025, 6, 5), owner)
        .await
        .unwrap();
    hotel.run_next_confirmation().await;

    let cancel = hotel.bookings.cancel(view.booking.id(), stranger).await;
    assert!(matches!(cancel, Err(ApplicationError::Forbidden(_))));

    let detail = hotel.bookings.detail(view.booking.id(), stranger).await;
    assert!(matches!(detail, Err(ApplicationError::NotFound(_))));

    assert!(hotel.bookings.list_for_user(stranger).await.unwrap().is_empty());
    assert_eq!(hotel.status(view.booking.id()).await, BookingStatus::Confirmed);
    assert_eq!(hotel.stock(room.id()).await, 0);
}

#[tokio::test]
async fn test_reserve_sold_out_room_creates_nothing() {
    let hotel = Hotel::new();
    let room = hotel.room(0).await;
    let caller = UserId::new();

    let result = hotel
        .bookings
        .reserve(room.id(), date(2025, 6, 1), date(2025, 6, 5), caller)
        .await;

    assert!(matches!(
        result,
        Err(ApplicationError::DomainError(DomainError::RoomUnavailable))
    ));
    assert!(hotel.bookings.list_for_user(caller).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_restocked_room_lets_waiting_booking_confirm() {
    let mut hotel = Hotel::new();
    let room = hotel.room(1).await;

    let first = hotel
        .bookings
        .reserve(room.id(), date(2025, 6, 1), date(2025, 6, 2), UserId::new())
        .await
        .unwrap();
    let second = hotel
        .bookings
        .reserve(room.id(), date(2025, 6, 1), date(2025, 6, 2), UserId::new())
        .await
        .unwrap();
    assert_eq!(hotel.run_next_confirmation().await, ConfirmationOutcome::Confirmed);
    assert_eq!(hotel.run_next_confirmation().await, ConfirmationOutcome::SkippedNoStock);

    hotel.catalog.add_stock(room.id()).await.unwrap();
    let outcome = hotel.worker.confirm_booking(second.booking.id()).await.unwrap();

    assert_eq!(outcome, ConfirmationOutcome::Confirmed);
    assert_eq!(hotel.status(first.booking.id()).await, BookingStatus::Confirmed);
    assert_eq!(hotel.stock(room.id()).await, 0);
}
