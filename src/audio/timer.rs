//! One-shot cancellable timer used to end a session when its pattern is over.

use std::thread;
use std::time::Duration;

use crossbeam_channel::{after, bounded, select, Sender};

/// Fires `callback` once after `delay` unless cancelled first.
/// Dropping the timer cancels it.
pub struct AutoStopTimer {
    cancel: Option<Sender<()>>,
}

impl AutoStopTimer {
    pub fn arm<F>(delay: Duration, callback: F) -> std::io::Result<Self>
    where
        F: FnOnce() + Send + 'static,
    {
        let (cancel_tx, cancel_rx) = bounded::<()>(1);
        thread::Builder::new()
            .name("moodtune-autostop".into())
            .spawn(move || {
                select! {
                    // a message or a disconnect both mean cancelled
                    recv(cancel_rx) -> _ => {}
                    recv(after(delay)) -> _ => callback(),
                }
            })?;
        Ok(Self {
            cancel: Some(cancel_tx),
        })
    }

    /// Cancel without waiting for the timer thread. Safe to call repeatedly.
    pub fn cancel(&mut self) {
        if let Some(tx) = self.cancel.take() {
            let _ = tx.try_send(());
        }
    }

    #[cfg(test)]
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.is_none()
    }
}

impl Drop for AutoStopTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Instant;

    #[test]
    fn fires_once_after_delay() {
        let (tx, rx) = bounded(1);
        let started = Instant::now();
        let _timer = AutoStopTimer::arm(Duration::from_millis(40), move || {
            let _ = tx.send(Instant::now());
        })
        .unwrap();
        let fired = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(fired.duration_since(started) >= Duration::from_millis(40));
    }

    #[test]
    fn cancel_prevents_callback() {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        let mut timer = AutoStopTimer::arm(Duration::from_millis(50), move || {
            h.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        timer.cancel();
        timer.cancel();
        assert!(timer.is_cancelled());
        thread::sleep(Duration::from_millis(150));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn drop_cancels() {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        let timer = AutoStopTimer::arm(Duration::from_millis(50), move || {
            h.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        drop(timer);
        thread::sleep(Duration::from_millis(150));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
