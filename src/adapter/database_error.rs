use crate::domain::port::RepositoryError;

/// データベースエラー型
/// データベース操作で発生するエラーを表現する
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DatabaseError {
    /// データベース接続エラー
    #[error("Database connection error: {0}")]
    ConnectionError(String),
    /// SQLクエリエラー
    #[error("Database query error: {0}")]
    QueryError(String),
    /// マイグレーションエラー
    #[error("Migration error: {0}")]
    MigrationError(String),
}

impl DatabaseError {
    /// クエリ失敗を文脈付きで変換するクロージャを返す
    pub fn query(context: &'static str) -> impl Fn(sqlx::Error) -> RepositoryError {
        move |e| DatabaseError::QueryError(format!("{}: {}", context, e)).into()
    }

    /// 接続・トランザクション失敗を文脈付きで変換するクロージャを返す
    pub fn connection(context: &'static str) -> impl Fn(sqlx::Error) -> RepositoryError {
        move |e| DatabaseError::ConnectionError(format!("{}: {}", context, e)).into()
    }
}

/// DatabaseErrorからRepositoryErrorへの変換
impl From<DatabaseError> for RepositoryError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::ConnectionError(msg) => RepositoryError::ConnectionFailed(msg),
            DatabaseError::QueryError(msg) => RepositoryError::OperationFailed(msg),
            DatabaseError::MigrationError(msg) => RepositoryError::OperationFailed(msg),
        }
    }
}
