use crate::application::service::BookingView;
use crate::domain::error::DomainError;
use crate::domain::model::{BookingStatus, Room};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 客室用のレスポンスDTO
#[derive(Debug, Serialize, Deserialize)]
pub struct RoomResponse {
    pub id: String,
    pub hotel_id: String,
    pub room_type: String,
    pub price_per_night: Decimal,
    pub stock: u32,
    pub is_available: bool,
}

impl RoomResponse {
    /// ドメインオブジェクトからRoomResponseを作成
    pub fn from_room(room: &Room) -> Self {
        Self {
            id: room.id().to_string(),
            hotel_id: room.hotel_id().to_string(),
            room_type: room.room_type().to_string(),
            price_per_night: room.price_per_night().amount(),
            stock: room.stock(),
            is_available: room.is_available(),
        }
    }
}

/// 予約用のレスポンスDTO
/// 客室はネストした表現で返す
#[derive(Debug, Serialize, Deserialize)]
pub struct BookingResponse {
    pub id: String,
    pub user: String,
    pub room: RoomResponse,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub status: BookingStatus,
    pub total_price: Decimal,
}

impl BookingResponse {
    pub fn from_view(view: &BookingView) -> Result<Self, DomainError> {
        let booking = &view.booking;
        Ok(Self {
            id: booking.id().to_string(),
            user: booking.user().to_string(),
            room: RoomResponse::from_room(&view.room),
            check_in: booking.stay().check_in(),
            check_out: booking.stay().check_out(),
            created_at: booking.created_at(),
            status: booking.status(),
            total_price: view.total_price()?.amount(),
        })
    }
}

/// キャンセル完了のレスポンスDTO
#[derive(Debug, Serialize, Deserialize)]
pub struct CancelResponse {
    pub detail: String,
}

impl CancelResponse {
    pub fn cancelled() -> Self {
        Self {
            detail: "Booking cancelled successfully.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Booking, BookingId, HotelId, Money, RoomId, RoomType, UserId};
    use rust_decimal_macros::dec;

    fn room(stock: u32) -> Room {
        Room::new(
            RoomId::new(),
            HotelId::new(),
            RoomType::Double,
            Money::new(dec!(80.00)).unwrap(),
            stock,
        )
        .unwrap()
    }

    #[test]
    fn test_room_response_reports_availability() {
        assert!(RoomResponse::from_room(&room(1)).is_available);
        assert!(!RoomResponse::from_room(&room(0)).is_available);
    }

    #[test]
    fn test_booking_response_json_shape() {
        let room = room(1);
        let booking = Booking::reserve(
            BookingId::new(),
            UserId::new(),
            &room,
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 5).unwrap(),
            Utc::now(),
        )
        .unwrap();
        let view = BookingView { booking, room };

        let json = serde_json::to_value(BookingResponse::from_view(&view).unwrap()).unwrap();

        assert_eq!(json["status"], "pending");
        assert_eq!(json["check_in"], "2025-06-01");
        assert_eq!(json["check_out"], "2025-06-05");
        assert_eq!(json["total_price"], "320.00");
        assert_eq!(json["room"]["room_type"], "Double");
        assert_eq!(json["room"]["price_per_night"], "80.00");
        assert_eq!(json["room"]["is_available"], true);
    }

    #[test]
    fn test_cancel_response_message() {
        let json = serde_json::to_value(CancelResponse::cancelled()).unwrap();
        assert_eq!(json, serde_json::json!({"detail": "Booking cancelled successfully."}));
    }
}
