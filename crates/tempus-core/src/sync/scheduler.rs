//! Jittered periodic trigger
//!
//! Fires a callback roughly every interval, with the delay drawn uniformly
//! from ±10% around the target so a fleet of clients does not thundering-herd
//! the server at aligned instants.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    /// Replace the interval; `None` pauses firing entirely
    SetInterval(Option<Duration>),
    Stop,
}

/// Periodic trigger thread.
///
/// Dropping the handle stops and joins the thread.
pub struct Scheduler {
    tx: Sender<Control>,
    handle: Option<JoinHandle<()>>,
}

impl Scheduler {
    /// Start the trigger thread. With `interval` of `None` the thread idles
    /// until [`set_interval`](Self::set_interval) enables it.
    pub fn start<F>(
        name: &'static str,
        interval: Option<Duration>,
        mut on_fire: F,
    ) -> std::io::Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();

        let handle = std::thread::Builder::new()
            .name(format!("sched-{name}"))
            .spawn(move || {
                let mut rng = rand::thread_rng();
                let mut interval = interval;
                loop {
                    // With no interval there is nothing to time out on; block
                    // until reconfigured or stopped.
                    let received = match interval {
                        Some(target) => rx.recv_timeout(jittered_delay(target, &mut rng)),
                        None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
                    };
                    match received {
                        Ok(Control::SetInterval(new)) => interval = new,
                        Ok(Control::Stop) | Err(RecvTimeoutError::Disconnected) => break,
                        Err(RecvTimeoutError::Timeout) => {
                            tracing::trace!("{name} timer fired");
                            on_fire();
                        }
                    }
                }
            })?;

        Ok(Self {
            tx,
            handle: Some(handle),
        })
    }

    /// Change the interval; `None` pauses the trigger. Takes effect from the
    /// next wait, cutting any sleep in progress short.
    pub fn set_interval(&self, interval: Option<Duration>) {
        let _ = self.tx.send(Control::SetInterval(interval));
    }

    /// Stop the thread and wait for it.
    pub fn stop(&mut self) {
        let _ = self.tx.send(Control::Stop);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Draw the next delay: uniform over `interval ± max(1s, interval / 10)`,
/// clamped below at one second.
fn jittered_delay<R: Rng>(interval: Duration, rng: &mut R) -> Duration {
    let target = interval.as_secs().max(1);
    let jitter = (target / 10).max(1);
    let low = target.saturating_sub(jitter).max(1);
    let high = target + jitter;
    Duration::from_secs(rng.gen_range(low..=high))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Instant;

    #[test]
    fn jitter_stays_within_ten_percent() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let delay = jittered_delay(Duration::from_secs(600), &mut rng);
            assert!(delay >= Duration::from_secs(540));
            assert!(delay <= Duration::from_secs(660));
        }
    }

    #[test]
    fn tiny_intervals_keep_a_floor_of_one_second() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let delay = jittered_delay(Duration::from_secs(1), &mut rng);
            assert!(delay >= Duration::from_secs(1));
            assert!(delay <= Duration::from_secs(2));
        }
    }

    #[test]
    fn fires_repeatedly_at_the_configured_interval() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);

        let mut scheduler = Scheduler::start("test", Some(Duration::from_secs(1)), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        let start = Instant::now();
        while fired.load(Ordering::SeqCst) < 2 && start.elapsed() < Duration::from_secs(10) {
            std::thread::sleep(Duration::from_millis(50));
        }
        scheduler.stop();
        assert!(fired.load(Ordering::SeqCst) >= 2);
    }

    #[test]
    fn disabled_scheduler_never_fires() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);

        let mut scheduler = Scheduler::start("idle", None, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        std::thread::sleep(Duration::from_millis(300));
        scheduler.stop();
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn set_interval_pauses_and_resumes() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);

        let scheduler = Scheduler::start("toggle", Some(Duration::from_secs(1)), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        scheduler.set_interval(None);
        std::thread::sleep(Duration::from_millis(100));
        let paused_at = fired.load(Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(1500));
        // At most one fire could have slipped in before the pause landed.
        assert!(fired.load(Ordering::SeqCst) <= paused_at + 1);

        scheduler.set_interval(Some(Duration::from_secs(1)));
        let start = Instant::now();
        while fired.load(Ordering::SeqCst) <= paused_at && start.elapsed() < Duration::from_secs(10)
        {
            std::thread::sleep(Duration::from_millis(50));
        }
        assert!(fired.load(Ordering::SeqCst) > paused_at);
    }
}
