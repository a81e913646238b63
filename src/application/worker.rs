use crate::application::ApplicationError;
use crate::domain::error::DomainError;
use crate::domain::model::{BookingId, BookingStatus};
use crate::domain::port::{BookingRepository, TransitionOutcome};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// 予約確定タスクの結果
/// いずれも終端で、再試行はしない
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    /// Pending → Confirmed に遷移し、在庫を1つ減算した
    Confirmed,
    /// 在庫が0のためPendingのまま据え置いた
    SkippedNoStock,
    /// 既にPendingではなかった（確定済み・キャンセル済み）
    SkippedNotPending(BookingStatus),
    /// 予約が存在しなかった
    BookingMissing,
}

impl fmt::Display for ConfirmationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfirmationOutcome::Confirmed => write!(f, "confirmed"),
            ConfirmationOutcome::SkippedNoStock => write!(f, "skipped: no stock"),
            ConfirmationOutcome::SkippedNotPending(status) => {
                write!(f, "skipped: booking is {}", status)
            }
            ConfirmationOutcome::BookingMissing => write!(f, "booking does not exist"),
        }
    }
}

/// 予約確定ワーカー
/// 予約作成リクエストとは切り離されて、キューに登録された予約を確定する
pub struct ConfirmationWorker {
    booking_repository: Arc<dyn BookingRepository>,
    delay: Duration,
}

impl ConfirmationWorker {
    /// 新しい予約確定ワーカーを作成
    ///
    /// # Arguments
    /// * `booking_repository` - 予約リポジトリ
    /// * `delay` - タスク受信から確定処理までの待ち時間
    pub fn new(booking_repository: Arc<dyn BookingRepository>, delay: Duration) -> Self {
        Self {
            booking_repository,
            delay,
        }
    }

    /// 予約を確定する
    ///
    /// Pendingかつ在庫がある場合のみ確定し、同じトランザクションで在庫を1つ減算する。
    /// それ以外の場合は何も変更せず、理由を結果として返す。
    /// 何度呼び出しても、確定済み・キャンセル済みの予約には影響しない。
    #[tracing::instrument(skip_all, fields(%booking_id))]
    pub async fn confirm_booking(
        &self,
        booking_id: BookingId,
    ) -> Result<ConfirmationOutcome, ApplicationError> {
        let Some(mut booking) = self.booking_repository.find_by_id(booking_id).await? else {
            return Ok(ConfirmationOutcome::BookingMissing);
        };

        let transition = match booking.confirm() {
            Ok(transition) => transition,
            Err(DomainError::InvalidBookingState(_)) => {
                return Ok(ConfirmationOutcome::SkippedNotPending(booking.status()))
            }
            Err(other) => return Err(other.into()),
        };

        let outcome = match self.booking_repository.apply_transition(&transition).await? {
            TransitionOutcome::Applied => ConfirmationOutcome::Confirmed,
            TransitionOutcome::OutOfStock => ConfirmationOutcome::SkippedNoStock,
            TransitionOutcome::StatusChanged => {
                // 読み取り後にキャンセル・削除された
                match self.booking_repository.find_by_id(booking_id).await? {
                    Some(current) => ConfirmationOutcome::SkippedNotPending(current.status()),
                    None => ConfirmationOutcome::BookingMissing,
                }
            }
        };

        Ok(outcome)
    }

    /// ワーカーをバックグラウンドタスクとして起動
    pub fn spawn(self: Arc<Self>, receiver: UnboundedReceiver<BookingId>) -> JoinHandle<()> {
        tokio::spawn(self.run(receiver))
    }

    /// キューが閉じられるまでタスクを受信し続ける
    /// 各タスクは独立したタスクとして1回だけ実行される
    pub async fn run(self: Arc<Self>, mut receiver: UnboundedReceiver<BookingId>) {
        info!(delay_secs = self.delay.as_secs(), "confirmation worker started");

        while let Some(booking_id) = receiver.recv().await {
            let worker = Arc::clone(&self);
            tokio::spawn(async move {
                worker.process(booking_id).await;
            });
        }

        info!("confirmation queue closed, worker stopped");
    }

    /// 待ち時間の後に確定処理を行い、結果をログに残す
    async fn process(&self, booking_id: BookingId) -> Option<ConfirmationOutcome> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match self.confirm_booking(booking_id).await {
            Ok(outcome) => {
                match outcome {
                    ConfirmationOutcome::Confirmed => {
                        info!(%booking_id, %outcome, "booking confirmation finished")
                    }
                    _ => warn!(%booking_id, %outcome, "booking confirmation skipped"),
                }
                Some(outcome)
            }
            Err(err) => {
                error!(%booking_id, error = %err, "booking confirmation failed");
                None
            }
        }
    }
}
