// 駆動される側アダプター（リポジトリ実装、確定キューなど）

mod booking_repository;
mod confirmation_queue;
mod in_memory_store;
mod room_repository;

pub use booking_repository::MySqlBookingRepository;
pub use confirmation_queue::{confirmation_channel, TokioConfirmationQueue};
pub use in_memory_store::{
    InMemoryBookingRepository, InMemoryInventoryLedger, InMemoryRoomRepository, InMemoryStore,
};
pub use room_repository::{MySqlInventoryLedger, MySqlRoomRepository};
