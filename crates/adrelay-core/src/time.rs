//! Clock abstraction for store-assigned timestamps and uptime.
//!
//! The store never trusts caller-supplied times. Everything it stamps comes
//! from a `Clock`, which lets tests drive time deterministically, including
//! stepping the wall clock backwards.

use std::{
    sync::{
        atomic::{AtomicI64, AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};

use chrono::{DateTime, Utc};

/// Source of monotonic and wall-clock time.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Returns the current instant for uptime measurements.
    fn now(&self) -> Instant;

    /// Returns the current wall-clock time.
    fn now_system(&self) -> SystemTime;

    /// Returns the current wall-clock time as a UTC timestamp.
    fn now_utc(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from(self.now_system())
    }
}

/// Production clock backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealClock;

impl RealClock {
    /// Creates a new real clock instance.
    pub fn new() -> Self {
        Self
    }
}

impl Clock for RealClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn now_system(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Manually driven clock for deterministic tests.
///
/// Clones share the same underlying time, so a clock handed to the store can
/// still be advanced from the test body.
#[derive(Debug, Clone)]
pub struct TestClock {
    /// Monotonic nanoseconds elapsed since `base_instant`
    monotonic_ns: Arc<AtomicU64>,
    /// Wall-clock nanoseconds relative to UNIX_EPOCH (may be negative)
    system_ns: Arc<AtomicI64>,
    base_instant: Instant,
}

impl TestClock {
    /// Creates a test clock starting at the current wall-clock time.
    pub fn new() -> Self {
        Self::with_start_time(SystemTime::now())
    }

    /// Creates a test clock whose wall clock starts at `start`.
    pub fn with_start_time(start: SystemTime) -> Self {
        Self {
            monotonic_ns: Arc::new(AtomicU64::new(0)),
            system_ns: Arc::new(AtomicI64::new(system_time_to_ns(start))),
            base_instant: Instant::now(),
        }
    }

    /// Advances both the monotonic and the wall clock.
    pub fn advance(&self, duration: Duration) {
        let duration_ns = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);

        self.monotonic_ns.fetch_add(duration_ns, Ordering::AcqRel);
        self.system_ns.fetch_add(i64::try_from(duration_ns).unwrap_or(i64::MAX), Ordering::AcqRel);
    }

    /// Sets the wall clock to `time`, leaving monotonic time untouched.
    ///
    /// Jumping backwards is allowed and simulates an NTP correction.
    pub fn set_system_time(&self, time: SystemTime) {
        self.system_ns.store(system_time_to_ns(time), Ordering::Release);
    }

    /// Returns monotonic time elapsed since the clock was created.
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.monotonic_ns.load(Ordering::Acquire))
    }
}

impl Default for TestClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TestClock {
    fn now(&self) -> Instant {
        self.base_instant + self.elapsed()
    }

    fn now_system(&self) -> SystemTime {
        let ns = self.system_ns.load(Ordering::Acquire);
        if ns >= 0 {
            UNIX_EPOCH + Duration::from_nanos(ns.unsigned_abs())
        } else {
            UNIX_EPOCH - Duration::from_nanos(ns.unsigned_abs())
        }
    }
}

fn system_time_to_ns(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_nanos()).unwrap_or(i64::MAX),
        Err(before) => -i64::try_from(before.duration().as_nanos()).unwrap_or(i64::MAX),
    }
}
