//! 呼び出し元の識別
//!
//! 認証そのものは上流の認証レイヤーが行い、検証済みの利用者IDを
//! `x-user-id` ヘッダーで、ロールを `x-user-role` ヘッダーで渡す。

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    Json,
};

use crate::adapter::driver::rest_api::ApiError;
use crate::domain::model::UserId;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

const ADMIN_ROLE: &str = "admin";

/// 認証済みの呼び出し元
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub UserId);

/// 管理者ロールを持つ呼び出し元
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequireAdmin(pub UserId);

fn unauthenticated() -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiError {
            error: "Authentication credentials were not provided.".to_string(),
            code: "UNAUTHENTICATED".to_string(),
        }),
    )
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ApiError>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| UserId::from_string(value.trim()).ok())
            .ok_or_else(unauthenticated)?;

        Ok(AuthenticatedUser(user_id))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ApiError>);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(user_id) = AuthenticatedUser::from_request_parts(parts, state).await?;

        let is_admin = parts
            .headers
            .get(USER_ROLE_HEADER)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|role| role.eq_ignore_ascii_case(ADMIN_ROLE));

        if !is_admin {
            return Err((
                StatusCode::FORBIDDEN,
                Json(ApiError {
                    error: "You do not have permission to perform this action.".to_string(),
                    code: "FORBIDDEN".to_string(),
                }),
            ));
        }

        Ok(RequireAdmin(user_id))
    }
}
