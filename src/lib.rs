//! ホテル客室の在庫管理と予約ライフサイクル
//!
//! - `domain`: 客室・予約の集約と、外部に依存するポート
//! - `application`: 予約ファサード、客室カタログ、予約確定ワーカー
//! - `adapter`: MySQL / インメモリのリポジトリ、確定キュー、REST API

pub mod adapter;
pub mod application;
pub mod domain;
