use crate::domain::model::BookingId;
use crate::domain::port::{ConfirmationQueue, QueueError};
use async_trait::async_trait;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// プロセス内の予約確定キュー
/// tokioのmpscチャネルでワーカーにタスクを引き渡す
/// 永続化されないため、再起動時はPendingの予約を再登録する
#[derive(Clone)]
pub struct TokioConfirmationQueue {
    sender: UnboundedSender<BookingId>,
}

/// 確定キューと、ワーカーが受信する側のチャネルを作成する
pub fn confirmation_channel() -> (TokioConfirmationQueue, UnboundedReceiver<BookingId>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (TokioConfirmationQueue { sender }, receiver)
}

#[async_trait]
impl ConfirmationQueue for TokioConfirmationQueue {
    async fn enqueue(&self, booking_id: BookingId) -> Result<(), QueueError> {
        self.sender.send(booking_id).map_err(|_| QueueError::Closed)
    }
}
