use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::Json,
    routing::{get, patch, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use crate::adapter::driver::auth::{AuthenticatedUser, RequireAdmin};
use crate::adapter::driver::request_dto::{CreateRoomRequest, ReserveRoomRequest};
use crate::adapter::driver::response_dto::{BookingResponse, CancelResponse, RoomResponse};
use crate::application::service::{BookingApplicationService, BookingView, RoomCatalogService};
use crate::application::ApplicationError;
use crate::domain::error::DomainError;
use crate::domain::model::{BookingId, HotelId, Money, RoomId, RoomType};

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

// アプリケーションサービスを含む状態
#[derive(Clone)]
pub struct AppState {
    pub booking_service: Arc<BookingApplicationService>,
    pub room_catalog_service: Arc<RoomCatalogService>,
}

// REST APIルーターを作成
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/rooms", get(get_rooms).post(create_room))
        .route("/rooms/:room_id", get(get_room_by_id))
        .route("/rooms/:room_id/reserve", post(reserve_room))
        .route("/rooms/:room_id/stock/increment", post(increment_stock))
        .route("/rooms/:room_id/stock/decrement", post(decrement_stock))
        .route("/hotels/:hotel_id/rooms", get(get_rooms_by_hotel))
        .route("/reserves", get(get_my_bookings))
        .route("/reserves/:booking_id", get(get_booking_detail))
        .route("/reserves/:booking_id/cancel", patch(cancel_booking))
}

// ヘルスチェックエンドポイント
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "hotel-booking",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// 客室予約エンドポイント
async fn reserve_room(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<ReserveRoomRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<BookingResponse>)> {
    let room_id = RoomId::from_uuid(path_uuid(path)?);
    // 客室の存在と在庫を本文の検証より先に判定する
    state
        .booking_service
        .check_reservable(room_id)
        .await
        .map_err(map_application_error)?;
    let Json(request) = body.map_err(invalid_body)?;

    let view = state
        .booking_service
        .reserve(room_id, request.check_in, request.check_out, caller)
        .await
        .map_err(map_application_error)?;

    Ok((StatusCode::CREATED, Json(booking_response(&view)?)))
}

// 予約キャンセルエンドポイント
async fn cancel_booking(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<CancelResponse>> {
    let booking_id = BookingId::from_uuid(path_uuid(path)?);

    state
        .booking_service
        .cancel(booking_id, caller)
        .await
        .map_err(map_application_error)?;

    Ok(Json(CancelResponse::cancelled()))
}

// 自分の予約一覧取得エンドポイント
async fn get_my_bookings(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> ApiResult<Json<Vec<BookingResponse>>> {
    let views = state
        .booking_service
        .list_for_user(caller)
        .await
        .map_err(map_application_error)?;

    let responses = views
        .iter()
        .map(booking_response)
        .collect::<ApiResult<Vec<_>>>()?;
    Ok(Json(responses))
}

// 予約詳細取得エンドポイント
async fn get_booking_detail(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<BookingResponse>> {
    let booking_id = BookingId::from_uuid(path_uuid(path)?);

    let view = state
        .booking_service
        .detail(booking_id, caller)
        .await
        .map_err(map_application_error)?;

    Ok(Json(booking_response(&view)?))
}

// 客室一覧取得エンドポイント
async fn get_rooms(State(state): State<AppState>) -> ApiResult<Json<Vec<RoomResponse>>> {
    let rooms = state
        .room_catalog_service
        .get_all_rooms()
        .await
        .map_err(map_application_error)?;

    Ok(Json(rooms.iter().map(RoomResponse::from_room).collect()))
}

// 客室詳細取得エンドポイント
async fn get_room_by_id(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<RoomResponse>> {
    let room_id = RoomId::from_uuid(path_uuid(path)?);

    match state.room_catalog_service.get_room(room_id).await {
        Ok(Some(room)) => Ok(Json(RoomResponse::from_room(&room))),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ApiError {
                error: "指定された客室が見つかりません".to_string(),
                code: "ROOM_NOT_FOUND".to_string(),
            }),
        )),
        Err(err) => Err(map_application_error(err)),
    }
}

// ホテル別客室一覧取得エンドポイント
async fn get_rooms_by_hotel(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Vec<RoomResponse>>> {
    let hotel_id = HotelId::from_uuid(path_uuid(path)?);

    let rooms = state
        .room_catalog_service
        .get_rooms_by_hotel(hotel_id)
        .await
        .map_err(map_application_error)?;

    Ok(Json(rooms.iter().map(RoomResponse::from_room).collect()))
}

// 客室登録エンドポイント（管理者のみ）
async fn create_room(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    body: Result<Json<CreateRoomRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RoomResponse>)> {
    let Json(request) = body.map_err(invalid_body)?;

    let room_type = RoomType::from_string(&request.room_type)
        .map_err(|err| map_application_error(err.into()))?;
    let price = Money::new(request.price_per_night)
        .map_err(|err| map_application_error(err.into()))?;

    let room = state
        .room_catalog_service
        .register_room(
            HotelId::from_uuid(request.hotel_id),
            room_type,
            price,
            request.stock,
        )
        .await
        .map_err(map_application_error)?;

    Ok((StatusCode::CREATED, Json(RoomResponse::from_room(&room))))
}

// 在庫追加エンドポイント（管理者のみ）
async fn increment_stock(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<RoomResponse>> {
    let room_id = RoomId::from_uuid(path_uuid(path)?);

    let room = state
        .room_catalog_service
        .add_stock(room_id)
        .await
        .map_err(map_application_error)?;

    Ok(Json(RoomResponse::from_room(&room)))
}

// 在庫引き上げエンドポイント（管理者のみ）
async fn decrement_stock(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<RoomResponse>> {
    let room_id = RoomId::from_uuid(path_uuid(path)?);

    let room = state
        .room_catalog_service
        .withdraw_stock(room_id)
        .await
        .map_err(map_application_error)?;

    Ok(Json(RoomResponse::from_room(&room)))
}

// パスパラメータのUUIDを取り出す
fn booking_response(view: &BookingView) -> ApiResult<BookingResponse> {
    BookingResponse::from_view(view).map_err(|err| map_application_error(err.into()))
}

fn path_uuid(path: Result<Path<Uuid>, PathRejection>) -> ApiResult<Uuid> {
    path.map(|Path(id)| id).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "無効なID形式です".to_string(),
                code: "INVALID_UUID".to_string(),
            }),
        )
    })
}

// 不正なリクエストボディを400にする
fn invalid_body(rejection: JsonRejection) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError {
            error: rejection.body_text(),
            code: "VALIDATION_ERROR".to_string(),
        }),
    )
}

// アプリケーションエラーをHTTPエラーにマッピング
fn map_application_error(err: ApplicationError) -> (StatusCode, Json<ApiError>) {
    match err {
        ApplicationError::DomainError(domain_err) => map_domain_error(domain_err),
        ApplicationError::RepositoryError(repo_err) => {
            error!(error = %repo_err, "repository failure while handling request");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError {
                    error: format!("{}", repo_err),
                    code: "REPOSITORY_ERROR".to_string(),
                }),
            )
        }
        ApplicationError::QueueError(queue_err) => {
            error!(error = %queue_err, "confirmation queue failure while handling request");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError {
                    error: format!("{}", queue_err),
                    code: "QUEUE_ERROR".to_string(),
                }),
            )
        }
        ApplicationError::NotFound(msg) => (
            StatusCode::NOT_FOUND,
            Json(ApiError {
                error: msg,
                code: "NOT_FOUND".to_string(),
            }),
        ),
        ApplicationError::Forbidden(msg) => (
            StatusCode::FORBIDDEN,
            Json(ApiError {
                error: msg,
                code: "FORBIDDEN".to_string(),
            }),
        ),
        ApplicationError::ConcurrentModification(msg) => (
            StatusCode::CONFLICT,
            Json(ApiError {
                error: msg,
                code: "CONCURRENT_MODIFICATION".to_string(),
            }),
        ),
    }
}

// ドメインエラーを適切なHTTPステータスコードとエラーコードにマッピング
fn map_domain_error(domain_err: DomainError) -> (StatusCode, Json<ApiError>) {
    let code = match &domain_err {
        DomainError::InvalidStayPeriod(_) => "VALIDATION_ERROR",
        DomainError::RoomUnavailable => "ROOM_UNAVAILABLE",
        DomainError::OutOfStock => "OUT_OF_STOCK",
        DomainError::AlreadyCancelled => "ALREADY_CANCELLED",
        DomainError::InvalidBookingState(_) => "INVALID_BOOKING_STATE",
        DomainError::InvalidValue(_) => "INVALID_VALUE",
    };

    (
        StatusCode::BAD_REQUEST,
        Json(ApiError {
            error: domain_err.to_string(),
            code: code.to_string(),
        }),
    )
}
