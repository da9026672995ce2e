//! Fixed-interval rate gate for the search endpoint.
//!
//! The gate admits one call per interval. The first call passes immediately and
//! every later call waits until a full interval has elapsed since the previous
//! admission. Time is read from a [`governor`] clock and waiting is delegated to
//! a [`Sleeper`], so tests can drive the gate with a
//! [`FakeRelativeClock`] instead of sleeping.

use async_trait::async_trait;
use governor::clock::{Clock, DefaultClock, FakeRelativeClock};
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Something that blocks until the next outbound call is allowed
#[async_trait]
pub trait Pacer: Send + Sync {
    /// Wait until the next call may be issued
    async fn ready(&self);
}

/// Suspends the current task
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Sleeper for a [`FakeRelativeClock`]: advances the clock instead of waiting
/// and records every requested duration.
#[derive(Debug, Default, Clone)]
pub struct RecordingSleeper {
    clock: FakeRelativeClock,
    slept: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn new(clock: FakeRelativeClock) -> Self {
        Self {
            clock,
            slept: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Durations slept so far
    pub fn slept(&self) -> Vec<Duration> {
        self.slept
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Sum of all durations slept so far
    pub fn total(&self) -> Duration {
        self.slept().into_iter().sum()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(duration);
        self.clock.advance(duration);
    }
}

type DirectLimiter<C> =
    RateLimiter<NotKeyed, InMemoryState, C, NoOpMiddleware<<C as Clock>::Instant>>;

/// Gate admitting one call per `interval`
pub struct IntervalGate<C: Clock = DefaultClock, S = TokioSleeper> {
    limiter: DirectLimiter<C>,
    clock: C,
    sleeper: S,
    interval: Duration,
}

impl IntervalGate {
    /// Gate on the wall clock. Returns `None` for a zero interval.
    pub fn new(interval: Duration) -> Option<Self> {
        Self::with_clock(interval, DefaultClock::default(), TokioSleeper)
    }
}

impl IntervalGate<FakeRelativeClock, RecordingSleeper> {
    /// Gate on a fake clock, plus the sleeper that records its waits
    pub fn fake(interval: Duration) -> Option<(Self, RecordingSleeper)> {
        let clock = FakeRelativeClock::default();
        let sleeper = RecordingSleeper::new(clock.clone());
        let gate = Self::with_clock(interval, clock, sleeper.clone())?;
        Some((gate, sleeper))
    }
}

impl<C: Clock, S: Sleeper> IntervalGate<C, S> {
    pub fn with_clock(interval: Duration, clock: C, sleeper: S) -> Option<Self> {
        let quota = Quota::with_period(interval)?.allow_burst(nonzero!(1u32));
        Some(Self {
            limiter: RateLimiter::direct_with_clock(quota, &clock),
            clock,
            sleeper,
            interval,
        })
    }
}

impl<C: Clock, S> std::fmt::Debug for IntervalGate<C, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntervalGate")
            .field("interval", &self.interval)
            .finish()
    }
}

#[async_trait]
impl<C, S> Pacer for IntervalGate<C, S>
where
    C: Clock + Send + Sync,
    C::Instant: Send + Sync,
    S: Sleeper,
{
    async fn ready(&self) {
        loop {
            let wait = match self.limiter.check() {
                Ok(()) => return,
                Err(not_until) => not_until.wait_time_from(self.clock.now()),
            };
            tracing::trace!(?wait, "waiting for rate gate");
            self.sleeper.sleep(wait).await;
        }
    }
}
