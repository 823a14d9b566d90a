//! Cooperative stop signal shared by the writer thread and its owner

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Cloneable one-shot stop flag with an interruptible wait
///
/// Once triggered it stays triggered.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    stopped: Mutex<bool>,
    condvar: Condvar,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag and wake every waiter
    pub fn trigger(&self) {
        let mut stopped = self.inner.stopped.lock();
        *stopped = true;
        self.inner.condvar.notify_all();
    }

    pub fn is_triggered(&self) -> bool {
        *self.inner.stopped.lock()
    }

    /// Wait up to `timeout` for the signal; returns whether it is set
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut stopped = self.inner.stopped.lock();

        while !*stopped {
            if self
                .inner
                .condvar
                .wait_until(&mut stopped, deadline)
                .timed_out()
            {
                break;
            }
        }
        *stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_wait_times_out_when_not_triggered() {
        let signal = StopSignal::new();
        let started = Instant::now();

        assert!(!signal.wait_timeout(Duration::from_millis(50)));
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert!(!signal.is_triggered());
    }

    #[test]
    fn test_trigger_wakes_waiter_early() {
        let signal = StopSignal::new();
        let waiter = {
            let signal = signal.clone();
            thread::spawn(move || {
                let started = Instant::now();
                let stopped = signal.wait_timeout(Duration::from_secs(30));
                (stopped, started.elapsed())
            })
        };

        thread::sleep(Duration::from_millis(20));
        signal.trigger();

        let (stopped, waited) = waiter.join().unwrap();
        assert!(stopped);
        assert!(waited < Duration::from_secs(5));
    }

    #[test]
    fn test_triggered_signal_returns_immediately() {
        let signal = StopSignal::new();
        signal.trigger();
        signal.trigger();

        assert!(signal.is_triggered());
        assert!(signal.wait_timeout(Duration::from_secs(30)));
    }
}
