//! Time abstraction for testability.
//!
//! Retry backoff waits go through a [`Sleeper`] so tests can observe the
//! requested delays without actually waiting.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Abstraction over asynchronous sleeping.
///
/// Implementations must suspend only the calling task; other tasks
/// sharing the runtime keep running.
pub trait Sleeper: Send + Sync {
    /// Waits for the given duration.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

impl<S: Sleeper> Sleeper for Arc<S> {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        (**self).sleep(duration)
    }
}

/// Production sleeper backed by [`tokio::time::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Sleeper that returns immediately.
///
/// Useful in tests to exercise retry paths without real delays.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantSleeper;

impl Sleeper for InstantSleeper {
    async fn sleep(&self, _duration: Duration) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// A sleeper that records requested delays.
    #[derive(Default)]
    struct RecordingSleeper {
        delays: Mutex<Vec<Duration>>,
    }

    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.delays.lock().unwrap().push(duration);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_sleeper_waits_for_duration() {
        let start = tokio::time::Instant::now();
        TokioSleeper.sleep(Duration::from_millis(250)).await;

        assert!(start.elapsed() >= Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn instant_sleeper_does_not_advance_time() {
        let start = tokio::time::Instant::now();
        InstantSleeper.sleep(Duration::from_secs(60)).await;

        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn recording_sleeper_captures_delays() {
        let sleeper = RecordingSleeper::default();
        sleeper.sleep(Duration::from_millis(1)).await;
        sleeper.sleep(Duration::from_millis(2)).await;

        assert_eq!(
            *sleeper.delays.lock().unwrap(),
            vec![Duration::from_millis(1), Duration::from_millis(2)]
        );
    }

    #[test]
    fn sleepers_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TokioSleeper>();
        assert_send_sync::<InstantSleeper>();
    }
}
