// ドメイン層
// 客室在庫と予約ライフサイクルのビジネスルール

pub mod error;
pub mod model;
pub mod port;
