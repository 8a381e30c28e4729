use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

static NEXT_TIMER_ID: AtomicU64 = AtomicU64::new(1);

/// What a pending timer will do when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    AutoSubmit,
    AutoGrade,
}

impl std::fmt::Display for TimerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimerKind::AutoSubmit => write!(f, "auto-submit"),
            TimerKind::AutoGrade => write!(f, "auto-grade"),
        }
    }
}

/// Handle to a scheduled auto-transition.
///
/// Dropping the handle does not cancel the timer; call [`TimerHandle::cancel`].
#[derive(Debug, Clone)]
pub struct TimerHandle {
    id: u64,
    kind: TimerKind,
    token: CancellationToken,
}

impl TimerHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> TimerKind {
        self.kind
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Run `action` after `delay` unless the returned handle is cancelled first.
///
/// `action` receives the timer id so it can tell whether it is still the
/// timer its assignment expects. Must be called from within a tokio runtime.
pub fn schedule<F, Fut>(kind: TimerKind, delay: Duration, action: F) -> TimerHandle
where
    F: FnOnce(u64) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let id = NEXT_TIMER_ID.fetch_add(1, Ordering::Relaxed);
    let token = CancellationToken::new();
    let task_token = token.clone();

    tokio::spawn(async move {
        tokio::select! {
            _ = task_token.cancelled() => {
                tracing::trace!(timer_id = id, kind = %kind, "Timer cancelled");
            }
            _ = tokio::time::sleep(delay) => {
                tracing::trace!(timer_id = id, kind = %kind, "Timer fired");
                action(id).await;
            }
        }
    });

    TimerHandle { id, kind, token }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn fires_after_delay() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let handle = schedule(TimerKind::AutoSubmit, Duration::from_millis(500), move |_| async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(handle.kind(), TimerKind::AutoSubmit);

        tokio::time::sleep(Duration::from_millis(499)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_timer_never_fires() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let handle = schedule(TimerKind::AutoGrade, Duration::from_millis(100), move |_| async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        handle.cancel();
        assert!(handle.is_cancelled());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn action_receives_its_own_id() {
        let seen = Arc::new(AtomicU64::new(0));
        let slot = seen.clone();
        let handle = schedule(TimerKind::AutoGrade, Duration::from_millis(10), move |id| async move {
            slot.store(id, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(seen.load(Ordering::SeqCst), handle.id());
    }

    #[tokio::test]
    async fn ids_are_unique() {
        let a = schedule(TimerKind::AutoSubmit, Duration::from_secs(60), |_| async {});
        let b = schedule(TimerKind::AutoSubmit, Duration::from_secs(60), |_| async {});
        assert_ne!(a.id(), b.id());
        a.cancel();
        b.cancel();
    }
}
