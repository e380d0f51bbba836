use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Which of the two fixed crops is on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn flipped(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Two-state machine flipped on every timer tick. Never terminates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Toggler {
    side: Side,
}

impl Default for Toggler {
    fn default() -> Self {
        Self { side: Side::Right }
    }
}

impl Toggler {
    #[cfg(test)]
    pub fn starting_at(side: Side) -> Self {
        Self { side }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn tick(&mut self) {
        self.side = self.side.flipped();
    }

    /// Applies `ticks` flips at once; only the parity matters.
    pub fn advance(&mut self, ticks: usize) {
        if ticks % 2 == 1 {
            self.tick();
        }
    }
}

/// Keeps a fixed cadence, but restarts it from `now` after a stall instead of
/// firing the missed ticks back to back.
fn next_deadline(deadline: Instant, period: Duration, now: Instant) -> Instant {
    let next = deadline + period;
    if next <= now { now + period } else { next }
}

/// Background ticker calling `on_tick` every `period` until cancelled.
///
/// Cancellation drops the sender half of a channel the worker sleeps on, so
/// the worker wakes immediately instead of finishing its current period.
pub struct RepeatingTimer {
    cancel: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl RepeatingTimer {
    pub fn start<F>(period: Duration, mut on_tick: F) -> std::io::Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let (cancel_tx, cancel_rx) = mpsc::channel::<()>();
        let worker = thread::Builder::new()
            .name("flicker-timer".into())
            .spawn(move || {
                let mut deadline = Instant::now() + period;
                loop {
                    let wait = deadline.saturating_duration_since(Instant::now());
                    match cancel_rx.recv_timeout(wait) {
                        Err(RecvTimeoutError::Timeout) => {
                            on_tick();
                            deadline = next_deadline(deadline, period, Instant::now());
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                log::debug!("timer stopped");
            })?;

        log::debug!("timer started with period {period:?}");
        Ok(Self {
            cancel: Some(cancel_tx),
            worker: Some(worker),
        })
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    pub fn cancel(&mut self) {
        drop(self.cancel.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::warn!("timer thread panicked");
            }
        }
    }
}

impl Drop for RepeatingTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Timer ticks queued for the UI thread, which drains them once per frame.
pub struct TickFeed {
    // Declared before `ticks` so the timer is joined before its sink closes.
    _timer: RepeatingTimer,
    ticks: Receiver<()>,
}

impl TickFeed {
    /// `wake` runs on the timer thread after each tick is queued.
    pub fn start<W>(period: Duration, wake: W) -> std::io::Result<Self>
    where
        W: Fn() + Send + 'static,
    {
        let (tick_tx, ticks) = mpsc::channel();
        let timer = RepeatingTimer::start(period, move || {
            if tick_tx.send(()).is_ok() {
                wake();
            }
        })?;
        Ok(Self { _timer: timer, ticks })
    }

    /// Number of ticks since the last drain.
    pub fn drain(&self) -> usize {
        self.ticks.try_iter().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn odd_ticks_change_side_even_ticks_restore_it() {
        for start in [Side::Left, Side::Right] {
            for ticks in 0..7 {
                let mut stepped = Toggler::starting_at(start);
                for _ in 0..ticks {
                    stepped.tick();
                }
                let mut jumped = Toggler::starting_at(start);
                jumped.advance(ticks);

                assert_eq!(stepped, jumped);
                assert_eq!(stepped.side() == start, ticks % 2 == 0);
            }
        }
    }

    #[test]
    fn toggler_starts_on_right() {
        assert_eq!(Toggler::default().side(), Side::Right);
    }

    #[test]
    fn deadline_keeps_cadence_when_on_time() {
        let start = Instant::now();
        let period = Duration::from_millis(200);
        let next = next_deadline(start, period, start + Duration::from_millis(5));
        assert_eq!(next, start + period);
    }

    #[test]
    fn deadline_restarts_after_a_stall() {
        let start = Instant::now();
        let period = Duration::from_millis(200);
        let woke = start + Duration::from_secs(3);
        assert_eq!(next_deadline(start, period, woke), woke + period);
    }

    #[test]
    fn tick_feed_counts_ticks_between_drains() {
        let wakes = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&wakes);
        let feed = TickFeed::start(Duration::from_millis(2), move || {
            seen.fetch_add(1, Ordering::SeqCst);
        })
        .expect("spawn timer");

        let deadline = Instant::now() + Duration::from_secs(5);
        while wakes.load(Ordering::SeqCst) < 3 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(2));
        }
        let drained = feed.drain();
        assert!(drained >= 3);
    }

    #[test]
    fn dropping_tick_feed_stops_its_timer() {
        let wakes = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&wakes);
        let feed = TickFeed::start(Duration::from_millis(2), move || {
            seen.fetch_add(1, Ordering::SeqCst);
        })
        .expect("spawn timer");
        drop(feed);

        let after_drop = wakes.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(wakes.load(Ordering::SeqCst), after_drop);
    }

    #[test]
    fn timer_fires_repeatedly() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let timer = RepeatingTimer::start(Duration::from_millis(5), move || {
            seen.fetch_add(1, Ordering::SeqCst);
        })
        .expect("spawn timer");

        let deadline = Instant::now() + Duration::from_secs(5);
        while count.load(Ordering::SeqCst) < 3 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(count.load(Ordering::SeqCst) >= 3);
        drop(timer);
    }

    #[test]
    fn drop_stops_timer_without_waiting_a_period() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let mut timer = RepeatingTimer::start(Duration::from_secs(60), move || {
            seen.fetch_add(1, Ordering::SeqCst);
        })
        .expect("spawn timer");
        assert!(timer.is_running());

        let started = Instant::now();
        timer.cancel();
        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(!timer.is_running());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn no_ticks_after_cancel() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let timer = RepeatingTimer::start(Duration::from_millis(2), move || {
            seen.fetch_add(1, Ordering::SeqCst);
        })
        .expect("spawn timer");
        drop(timer);

        let after_cancel = count.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(count.load(Ordering::SeqCst), after_cancel);
    }
}
