use hotel_booking::adapter::driven::{
    confirmation_channel, InMemoryStore, MySqlBookingRepository, MySqlInventoryLedger,
    MySqlRoomRepository,
};
use hotel_booking::adapter::driver::rest_api::{create_router, AppState};
use hotel_booking::adapter::{AppConfig, DatabaseMigration, StorageBackend};
use hotel_booking::application::service::{BookingApplicationService, RoomCatalogService};
use hotel_booking::application::worker::ConfirmationWorker;
use hotel_booking::domain::model::BookingStatus;
use hotel_booking::domain::port::{
    BookingRepository, ConfirmationQueue, InventoryLedger, RoomRepository,
};

use sqlx::mysql::MySqlPoolOptions;
use std::sync::Arc;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// 保存先に応じて組み立てたリポジトリ群
struct Storage {
    rooms: Arc<dyn RoomRepository>,
    bookings: Arc<dyn BookingRepository>,
    ledger: Arc<dyn InventoryLedger>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hotel_booking=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // .envファイルから環境変数を読み込む
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    info!(storage = ?config.storage, addr = %config.server_addr, "configuration loaded");

    let storage = match config.storage {
        StorageBackend::MySql => {
            let pool = MySqlPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(&config.database.connection_string())
                .await?;
            info!(
                host = %config.database.host,
                port = config.database.port,
                "database connection pool created"
            );

            DatabaseMigration::new(pool.clone()).run().await?;

            Storage {
                rooms: Arc::new(MySqlRoomRepository::new(pool.clone())),
                bookings: Arc::new(MySqlBookingRepository::new(pool.clone())),
                ledger: Arc::new(MySqlInventoryLedger::new(pool)),
            }
        }
        StorageBackend::Memory => {
            warn!("using in-memory storage, data is lost on shutdown");
            let store = InMemoryStore::new();
            Storage {
                rooms: Arc::new(store.rooms()),
                bookings: Arc::new(store.bookings()),
                ledger: Arc::new(store.ledger()),
            }
        }
    };

    // 予約確定ワーカーを起動
    let (queue, receiver) = confirmation_channel();
    let worker = Arc::new(ConfirmationWorker::new(
        storage.bookings.clone(),
        config.confirmation_delay,
    ));
    let worker_handle = worker.spawn(receiver);

    // 前回の停止時にキューに残っていたPendingの予約を再登録する
    let pending = storage.bookings.find_by_status(BookingStatus::Pending).await?;
    for booking in &pending {
        queue.enqueue(booking.id()).await?;
    }
    info!(count = pending.len(), "pending bookings re-enqueued for confirmation");

    let app_state = AppState {
        booking_service: Arc::new(BookingApplicationService::new(
            storage.rooms.clone(),
            storage.bookings.clone(),
            Arc::new(queue),
        )),
        room_catalog_service: Arc::new(RoomCatalogService::new(storage.rooms, storage.ledger)),
    };

    let app = create_router().with_state(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    info!(addr = %config.server_addr, "REST API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // AppStateが破棄されると送信側が閉じ、ワーカーは受信ループを抜ける
    worker_handle.await?;
    info!("server stopped");

    Ok(())
}

/// Ctrl+C または SIGTERM を待つ
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl+C, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }
}
