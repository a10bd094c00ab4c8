//! Ctrl-C 的分派：有配對請求等待中時轉為取消訊號，否則交由呼叫端結束程式。

use std::future::Future;
use tokio::sync::broadcast;

#[derive(Debug, Clone)]
pub struct Interrupt {
    sender: broadcast::Sender<()>,
}

impl Default for Interrupt {
    fn default() -> Self {
        Self::new()
    }
}

impl Interrupt {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self { sender }
    }

    /// 回傳 true 表示訊號已交給等待中的請求
    pub fn trigger(&self) -> bool {
        self.sender.send(()).is_ok()
    }

    /// 呼叫當下即開始監聽，future 被丟棄後不再算作等待者
    pub fn cancelled(&self) -> impl Future<Output = ()> + 'static {
        let mut receiver = self.sender.subscribe();
        async move {
            let _ = receiver.recv().await;
        }
    }

    pub fn has_waiters(&self) -> bool {
        self.sender.receiver_count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_trigger_without_waiter_is_not_delivered() {
        let interrupt = Interrupt::new();
        assert!(!interrupt.has_waiters());
        assert!(!interrupt.trigger());
    }

    #[tokio::test]
    async fn test_trigger_completes_pending_cancellation() {
        let interrupt = Interrupt::new();
        let cancelled = interrupt.cancelled();
        assert!(interrupt.has_waiters());

        assert!(interrupt.trigger());
        tokio::time::timeout(Duration::from_secs(1), cancelled)
            .await
            .expect("cancellation should resolve");
    }

    #[test]
    fn test_dropped_cancellation_stops_listening() {
        let interrupt = Interrupt::new();
        drop(interrupt.cancelled());
        assert!(!interrupt.has_waiters());
        assert!(!interrupt.trigger());
    }
}
