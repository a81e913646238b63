use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 客室予約用のリクエストDTO
#[derive(Debug, Serialize, Deserialize)]
pub struct ReserveRoomRequest {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

/// 客室登録用のリクエストDTO
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    pub hotel_id: Uuid,
    pub room_type: String,
    pub price_per_night: Decimal,
    pub stock: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reserve_room_request_parses_iso_dates() {
        let request: ReserveRoomRequest =
            serde_json::from_str(r#"{"check_in": "2025-06-01", "check_out": "2025-06-05"}"#)
                .unwrap();

        assert_eq!(request.check_in, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_eq!(request.check_out, NaiveDate::from_ymd_opt(2025, 6, 5).unwrap());
    }

    #[test]
    fn test_reserve_room_request_rejects_missing_field() {
        let result = serde_json::from_str::<ReserveRoomRequest>(r#"{"check_in": "2025-06-01"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_create_room_request_accepts_numeric_and_string_price() {
        let hotel_id = Uuid::new_v4();

        let numeric: CreateRoomRequest = serde_json::from_str(&format!(
            r#"{{"hotel_id": "{}", "room_type": "Double", "price_per_night": 120.5, "stock": 2}}"#,
            hotel_id
        ))
        .unwrap();
        assert_eq!(numeric.price_per_night, dec!(120.5));

        let text: CreateRoomRequest = serde_json::from_str(&format!(
            r#"{{"hotel_id": "{}", "room_type": "Vip", "price_per_night": "300.00", "stock": 1}}"#,
            hotel_id
        ))
        .unwrap();
        assert_eq!(text.price_per_night, dec!(300.00));
        assert_eq!(text.hotel_id, hotel_id);
    }

    #[test]
    fn test_create_room_request_rejects_negative_stock() {
        let result = serde_json::from_str::<CreateRoomRequest>(&format!(
            r#"{{"hotel_id": "{}", "room_type": "Single", "price_per_night": 50, "stock": -1}}"#,
            Uuid::new_v4()
        ));
        assert!(result.is_err());
    }
}
