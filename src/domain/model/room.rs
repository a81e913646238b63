use crate::domain::error::DomainError;
use crate::domain::model::{HotelId, Money, RoomId, RoomType};
use rust_decimal::Decimal;

/// 1泊あたりの料金の上限（rooms.price_per_night の DECIMAL(10, 2)）
fn max_price_per_night() -> Decimal {
    Decimal::new(9_999_999_999, 2)
}

/// 客室集約
/// ホテルに属し、予約可能な在庫数を保持する
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    id: RoomId,
    hotel_id: HotelId,
    room_type: RoomType,
    price_per_night: Money,
    stock: u32,
}

impl Room {
    /// 新しい客室を作成
    ///
    /// # Arguments
    /// * `price_per_night` - 1泊あたりの料金（0より大きいこと）
    /// * `stock` - 予約可能な在庫数
    pub fn new(
        id: RoomId,
        hotel_id: HotelId,
        room_type: RoomType,
        price_per_night: Money,
        stock: u32,
    ) -> Result<Self, DomainError> {
        if !price_per_night.is_positive() {
            return Err(DomainError::InvalidValue(
                "1泊あたりの料金は0より大きい必要があります".to_string(),
            ));
        }
        if price_per_night.amount() > max_price_per_night() {
            return Err(DomainError::InvalidValue(format!(
                "1泊あたりの料金は{}以下である必要があります",
                max_price_per_night()
            )));
        }
        Ok(Self {
            id,
            hotel_id,
            room_type,
            price_per_night,
            stock,
        })
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn hotel_id(&self) -> HotelId {
        self.hotel_id
    }

    pub fn room_type(&self) -> RoomType {
        self.room_type
    }

    pub fn price_per_night(&self) -> Money {
        self.price_per_night
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    /// 在庫が1つ以上あるか
    pub fn is_available(&self) -> bool {
        self.stock > 0
    }

    /// 在庫を1つ確保する
    ///
    /// # Returns
    /// * `Err(DomainError::OutOfStock)` - 在庫が0
    pub fn take_unit(&mut self) -> Result<(), DomainError> {
        if !self.is_available() {
            return Err(DomainError::OutOfStock);
        }
        self.stock -= 1;
        Ok(())
    }

    /// 確保済みの在庫を1つ戻す
    ///
    /// # Returns
    /// * `Err(DomainError::InvalidValue)` - 在庫数が上限に達している
    pub fn return_unit(&mut self) -> Result<(), DomainError> {
        self.stock = self.stock.checked_add(1).ok_or_else(|| {
            DomainError::InvalidValue(format!("在庫数は{}を超えられません", u32::MAX))
        })?;
        Ok(())
    }
}
