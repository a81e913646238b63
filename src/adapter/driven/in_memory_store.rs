use crate::domain::model::{
    Booking, BookingId, BookingStatus, BookingTransition, HotelId, LedgerEffect, Room, RoomId,
    UserId,
};
use crate::domain::port::{
    BookingRepository, InventoryLedger, LedgerOutcome, RepositoryError, RoomRepository,
    TransitionOutcome,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Default)]
struct StoreState {
    rooms: HashMap<RoomId, Room>,
    bookings: HashMap<BookingId, Booking>,
}

impl StoreState {
    fn room_mut(&mut self, room_id: RoomId) -> Result<&mut Room, RepositoryError> {
        self.rooms
            .get_mut(&room_id)
            .ok_or_else(|| RepositoryError::OperationFailed(format!("客室が見つかりません: {}", room_id)))
    }
}

/// インメモリストア
/// 客室と予約を1つのロックで保護し、状態遷移と在庫作用を不可分に適用する
/// 開発・テスト用の実装
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// このストアを共有する客室リポジトリ
    pub fn rooms(&self) -> InMemoryRoomRepository {
        InMemoryRoomRepository {
            state: Arc::clone(&self.state),
        }
    }

    /// このストアを共有する予約リポジトリ
    pub fn bookings(&self) -> InMemoryBookingRepository {
        InMemoryBookingRepository {
            state: Arc::clone(&self.state),
        }
    }

    /// このストアを共有する在庫台帳
    pub fn ledger(&self) -> InMemoryInventoryLedger {
        InMemoryInventoryLedger {
            state: Arc::clone(&self.state),
        }
    }
}

/// インメモリ客室リポジトリ
#[derive(Clone)]
pub struct InMemoryRoomRepository {
    state: Arc<Mutex<StoreState>>,
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn save(&self, room: &Room) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;
        state.rooms.insert(room.id(), room.clone());
        Ok(())
    }

    async fn find_by_id(&self, room_id: RoomId) -> Result<Option<Room>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state.rooms.get(&room_id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Room>, RepositoryError> {
        let state = self.state.lock().await;
        let mut rooms: Vec<Room> = state.rooms.values().cloned().collect();
        rooms.sort_by_key(|room| room.id());
        Ok(rooms)
    }

    async fn find_by_hotel(&self, hotel_id: HotelId) -> Result<Vec<Room>, RepositoryError> {
        let state = self.state.lock().await;
        let mut rooms: Vec<Room> = state
            .rooms
            .values()
            .filter(|room| room.hotel_id() == hotel_id)
            .cloned()
            .collect();
        rooms.sort_by_key(|room| room.id());
        Ok(rooms)
    }
}

/// インメモリ在庫台帳
#[derive(Clone)]
pub struct InMemoryInventoryLedger {
    state: Arc<Mutex<StoreState>>,
}

#[async_trait]
impl InventoryLedger for InMemoryInventoryLedger {
    async fn decrement(&self, room_id: RoomId) -> Result<LedgerOutcome, RepositoryError> {
        let mut state = self.state.lock().await;
        let room = state.room_mut(room_id)?;
        match room.take_unit() {
            Ok(()) => Ok(LedgerOutcome::Decremented),
            Err(_) => Ok(LedgerOutcome::OutOfStock),
        }
    }

    async fn increment(&self, room_id: RoomId) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;
        state
            .room_mut(room_id)?
            .return_unit()
            .map_err(|e| RepositoryError::OperationFailed(e.to_string()))
    }
}

/// インメモリ予約リポジトリ
#[derive(Clone)]
pub struct InMemoryBookingRepository {
    state: Arc<Mutex<StoreState>>,
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn save(&self, booking: &Booking) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;
        state.bookings.insert(booking.id(), booking.clone());
        Ok(())
    }

    async fn find_by_id(&self, booking_id: BookingId) -> Result<Option<Booking>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state.bookings.get(&booking_id).cloned())
    }

    async fn find_by_user(&self, user: UserId) -> Result<Vec<Booking>, RepositoryError> {
        let state = self.state.lock().await;
        let mut bookings: Vec<Booking> = state
            .bookings
            .values()
            .filter(|booking| booking.is_owned_by(user))
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(bookings)
    }

    async fn find_by_status(&self, status: BookingStatus) -> Result<Vec<Booking>, RepositoryError> {
        let state = self.state.lock().await;
        let mut bookings: Vec<Booking> = state
            .bookings
            .values()
            .filter(|booking| booking.status() == status)
            .cloned()
            .collect();
        bookings.sort_by_key(|booking| booking.created_at());
        Ok(bookings)
    }

    async fn apply_transition(
        &self,
        transition: &BookingTransition,
    ) -> Result<TransitionOutcome, RepositoryError> {
        let mut state = self.state.lock().await;

        let current = match state.bookings.get(&transition.booking_id) {
            Some(booking) if booking.status() == transition.from => booking.clone(),
            _ => return Ok(TransitionOutcome::StatusChanged),
        };

        // 在庫作用を先に適用し、失敗したら何も変更しない
        let room = state.room_mut(transition.room_id)?;
        match transition.ledger {
            LedgerEffect::None => {}
            LedgerEffect::Decrement => {
                if room.take_unit().is_err() {
                    return Ok(TransitionOutcome::OutOfStock);
                }
            }
            LedgerEffect::Increment => room
                .return_unit()
                .map_err(|e| RepositoryError::OperationFailed(e.to_string()))?,
        }

        let updated = Booking::reconstruct(
            current.id(),
            current.user(),
            current.room_id(),
            current.stay(),
            current.created_at(),
            transition.to,
        );
        state.bookings.insert(updated.id(), updated);

        Ok(TransitionOutcome::Applied)
    }
}
