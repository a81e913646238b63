// アプリケーション層
// ユースケース（予約の受付・キャンセル・照会）と非同期の予約確定

pub mod error;
pub mod service;
pub mod worker;

pub use error::ApplicationError;
