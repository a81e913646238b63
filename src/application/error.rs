use crate::domain::error::DomainError;
use crate::domain::port::{QueueError, RepositoryError};

/// アプリケーション層のエラー型
/// ドメインエラー、リポジトリエラー、キューエラーをラップする
#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    /// ドメインエラー（ビジネスルール違反）
    #[error("Domain error: {0}")]
    DomainError(#[from] DomainError),
    /// リポジトリエラー（永続化の失敗）
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
    /// 確定キューへの登録失敗
    #[error("Queue error: {0}")]
    QueueError(#[from] QueueError),
    /// エンティティが見つからない
    #[error("Not found: {0}")]
    NotFound(String),
    /// 所有者以外による操作
    #[error("Forbidden: {0}")]
    Forbidden(String),
    /// 並行更新が続き状態遷移を確定できなかった
    #[error("Concurrent modification: {0}")]
    ConcurrentModification(String),
}
