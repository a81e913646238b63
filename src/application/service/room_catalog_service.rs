use crate::application::ApplicationError;
use crate::domain::error::DomainError;
use crate::domain::model::{HotelId, Money, Room, RoomId, RoomType};
use crate::domain::port::{InventoryLedger, LedgerOutcome, RoomRepository};
use std::sync::Arc;
use tracing::info;

/// 客室カタログサービス
/// 客室の参照・登録と、管理者による在庫の増減を提供する
pub struct RoomCatalogService {
    room_repository: Arc<dyn RoomRepository>,
    inventory_ledger: Arc<dyn InventoryLedger>,
}

impl RoomCatalogService {
    /// 新しい客室カタログサービスを作成
    ///
    /// # Arguments
    /// * `room_repository` - 客室リポジトリ
    /// * `inventory_ledger` - 在庫台帳
    pub fn new(
        room_repository: Arc<dyn RoomRepository>,
        inventory_ledger: Arc<dyn InventoryLedger>,
    ) -> Self {
        Self {
            room_repository,
            inventory_ledger,
        }
    }

    /// 客室を登録する
    ///
    /// # Returns
    /// * `Ok(Room)` - 登録された客室
    /// * `Err(ApplicationError::DomainError)` - 料金が0以下
    pub async fn register_room(
        &self,
        hotel_id: HotelId,
        room_type: RoomType,
        price_per_night: Money,
        stock: u32,
    ) -> Result<Room, ApplicationError> {
        let room = Room::new(
            self.room_repository.next_identity(),
            hotel_id,
            room_type,
            price_per_night,
            stock,
        )?;
        self.room_repository.save(&room).await?;
        info!(room_id = %room.id(), %hotel_id, stock, "room registered");
        Ok(room)
    }

    /// 在庫を1つ追加する
    /// 確定処理と同じ台帳を通すため、並行する確定と競合しても在庫数は壊れない
    #[tracing::instrument(skip_all, fields(%room_id))]
    pub async fn add_stock(&self, room_id: RoomId) -> Result<Room, ApplicationError> {
        self.require_room(room_id).await?;
        self.inventory_ledger.increment(room_id).await?;
        info!("room stock incremented");
        self.require_room(room_id).await
    }

    /// 在庫を1つ引き上げる
    ///
    /// # Returns
    /// * `Err(ApplicationError::DomainError(OutOfStock))` - 在庫が0
    #[tracing::instrument(skip_all, fields(%room_id))]
    pub async fn withdraw_stock(&self, room_id: RoomId) -> Result<Room, ApplicationError> {
        self.require_room(room_id).await?;
        match self.inventory_ledger.decrement(room_id).await? {
            LedgerOutcome::Decremented => info!("room stock decremented"),
            LedgerOutcome::OutOfStock => return Err(DomainError::OutOfStock.into()),
        }
        self.require_room(room_id).await
    }

    async fn require_room(&self, room_id: RoomId) -> Result<Room, ApplicationError> {
        self.get_room(room_id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound(format!("客室が見つかりません: {}", room_id)))
    }

    /// 客室IDで客室を取得
    ///
    /// # Returns
    /// * `Ok(Some(Room))` - 客室が見つかった
    /// * `Ok(None)` - 客室が見つからなかった
    pub async fn get_room(&self, room_id: RoomId) -> Result<Option<Room>, ApplicationError> {
        self.room_repository
            .find_by_id(room_id)
            .await
            .map_err(ApplicationError::from)
    }

    /// すべての客室を取得
    pub async fn get_all_rooms(&self) -> Result<Vec<Room>, ApplicationError> {
        self.room_repository
            .find_all()
            .await
            .map_err(ApplicationError::from)
    }

    /// 指定されたホテルの客室を取得
    pub async fn get_rooms_by_hotel(&self, hotel_id: HotelId) -> Result<Vec<Room>, ApplicationError> {
        self.room_repository
            .find_by_hotel(hotel_id)
            .await
            .map_err(ApplicationError::from)
    }
}
