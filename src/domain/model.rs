// ドメインモデル（エンティティと値オブジェクト）

mod booking;
mod room;
mod value_objects;

pub use value_objects::{
    BookingId, HotelId, RoomId, UserId,
    BookingStatus,
    Money,
    RoomType,
    StayPeriod,
};

pub use booking::{Booking, BookingTransition, LedgerEffect};
pub use room::Room;
