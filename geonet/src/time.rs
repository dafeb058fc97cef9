/*! Time structures.

The `time` module contains structures used to represent both
absolute and relative time.

 - [Instant] is used to represent absolute time.
 - [Duration] is used to represet relative time.
 - [Timer] is a deferred action that is cancelled by a generation check.
 - [Timestamp] is the 32-bit wrapping clock carried in position vectors.

[Instant]: struct.Instant.html
[Duration]: struct.Duration.html
[Timer]: struct.Timer.html
[Timestamp]: struct.Timestamp.html
*/
use core::{cmp, fmt, ops};
pub use core::time::Duration;

/// A representation of an absolute time value.
///
/// The `Instant` type is a wrapper around a `i64` value that
/// represents a number of milliseconds, monotonically increasing
/// since an arbitrary moment in time, such as system startup.
///
/// * A value of `0` is inherently arbitrary.
/// * A value less than `0` indicates a time before the starting
///   point.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant {
    /// The milliseconds since the reference point.
    pub millis: i64,
}

/// An expiration time, inversion of `Option`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiration {
    /// Expires at the instant.
    When(Instant),
    /// Never expires.
    Never,
}

/// A deferred action with at-least-once firing.
///
/// Arming the timer records its start time. Whoever scheduled the action keeps the returned
/// [`Ticket`]. When the action comes due it must present that ticket again and the timer only
/// fires if the start time is still the one captured in it. Re-arming or cancelling the timer
/// invalidates all outstanding tickets, there is no removal of the pending action itself.
///
/// [`Ticket`]: struct.Ticket.html
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    started: Option<Instant>,
    period: Duration,
}

/// The generation of a `Timer` captured when it was armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    started: Instant,
}

/// A GeoNetworking timestamp.
///
/// Milliseconds since 2004-01-01T00:00:00Z (the TAI/UTC difference is ignored), taken modulo
/// 2^32. The value wraps roughly every 49.7 days so it has no total order, only a notion of
/// being newer within half the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Timestamp(pub u32);

use Expiration::{When, Never};

impl Instant {
    /// Create a new `Instant` from a number of milliseconds.
    pub fn from_millis<T: Into<i64>>(millis: T) -> Instant {
        Instant { millis: millis.into() }
    }

    /// Create a new `Instant` from a number of seconds.
    pub fn from_secs<T: Into<i64>>(secs: T) -> Instant {
        Instant { millis: secs.into() * 1000 }
    }

    /// Create a new `Instant` from the current [std::time::SystemTime].
    ///
    /// [std::time::SystemTime]: https://doc.rust-lang.org/std/time/struct.SystemTime.html
    pub fn now() -> Instant {
        Self::from(::std::time::SystemTime::now())
    }

    /// The fractional number of milliseconds that have passed
    /// since the beginning of time.
    pub fn millis(&self) -> i64 {
        self.millis % 1000
    }

    /// The number of whole seconds that have passed since the
    /// beginning of time.
    pub fn secs(&self) -> i64 {
        self.millis / 1000
    }

    /// The total number of milliseconds that have passed since
    /// the biginning of time.
    pub fn total_millis(&self) -> i64 {
        self.millis
    }
}

impl From<::std::time::SystemTime> for Instant {
    fn from(other: ::std::time::SystemTime) -> Instant {
        // Clocks before the unix epoch are treated as the epoch itself.
        let n = other.duration_since(::std::time::UNIX_EPOCH)
            .unwrap_or_default();
        Self::from_millis(n.as_secs() as i64 * 1000 + (n.subsec_nanos() / 1000000) as i64)
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}s", self.secs(), self.millis())
    }
}

impl ops::Add<Duration> for Instant {
    type Output = Instant;

    fn add(self, rhs: Duration) -> Instant {
        Instant::from_millis(self.millis + rhs.as_millis() as i64)
    }
}

impl ops::AddAssign<Duration> for Instant {
    fn add_assign(&mut self, rhs: Duration) {
        self.millis += rhs.as_millis() as i64;
    }
}

impl ops::Sub<Duration> for Instant {
    type Output = Instant;

    fn sub(self, rhs: Duration) -> Instant {
        Instant::from_millis(self.millis - rhs.as_millis() as i64)
    }
}

impl ops::Sub<Instant> for Instant {
    type Output = Duration;

    fn sub(self, rhs: Instant) -> Duration {
        Duration::from_millis((self.millis - rhs.millis).abs() as u64)
    }
}

impl Default for Expiration {
    fn default() -> Self {
        Expiration::Never
    }
}

impl From<Option<Instant>> for Expiration {
    fn from(opt: Option<Instant>) -> Self {
        match opt {
            Some(instant) => When(instant),
            None => Never,
        }
    }
}

impl From<Expiration> for Option<Instant> {
    fn from(opt: Expiration) -> Self {
        match opt {
            When(instant) => Some(instant),
            Never => None,
        }
    }
}

impl cmp::PartialOrd<Self> for Expiration {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl cmp::Ord for Expiration {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        match (*self, *other) {
            (Never, Never) => cmp::Ordering::Equal,
            (Never, When(_)) => cmp::Ordering::Greater,
            (When(_), Never) => cmp::Ordering::Less,
            (When(ref a), When(ref b)) => a.cmp(b),
        }
    }
}

impl Timestamp {
    /// The start of the timestamp epoch in milliseconds since the Unix epoch.
    pub const EPOCH_UNIX_MILLIS: u64 = 1_072_915_200_000;

    /// Convert from milliseconds since the Unix epoch.
    pub fn from_unix_millis(millis: u64) -> Self {
        Timestamp(millis.wrapping_sub(Self::EPOCH_UNIX_MILLIS) as u32)
    }

    /// Convert an instant relative to the Unix epoch, as produced by `Instant::now`.
    pub fn from_instant(instant: Instant) -> Self {
        Self::from_unix_millis(instant.total_millis() as u64)
    }

    /// Compare with wraparound.
    ///
    /// `self` is newer if it is ahead of `previous` by at most half the range, or if it is behind
    /// by strictly more than half the range (meaning the clock wrapped in between). Equal values
    /// are not newer.
    pub fn is_newer_than(self, previous: Timestamp) -> bool {
        const HALF: u32 = u32::max_value() / 2;
        let (current, previous) = (self.0, previous.0);
        (current > previous && current - previous <= HALF)
            || (previous > current && previous - current > HALF)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

impl Timer {
    /// A disarmed timer that comes due `period` after being armed.
    pub fn new(period: Duration) -> Self {
        Timer {
            started: None,
            period,
        }
    }

    /// Start a new generation of the timer.
    ///
    /// All tickets of previous generations become stale.
    pub fn arm(&mut self, now: Instant) -> Ticket {
        self.started = Some(now);
        Ticket { started: now }
    }

    /// Invalidate all outstanding tickets.
    pub fn cancel(&mut self) {
        self.started = None;
    }

    /// The time at which the current generation comes due.
    pub fn deadline(&self) -> Expiration {
        self.started.map(|start| start + self.period).into()
    }

    /// Check a ticket against the current generation.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.started == Some(ticket.started)
    }

    /// Try to fire the action scheduled with `ticket`.
    ///
    /// Returns `true` exactly when the ticket is of the current generation and the period has
    /// passed. The timer is disarmed in that case.
    pub fn fire(&mut self, ticket: Ticket, now: Instant) -> bool {
        if !self.is_current(ticket) {
            return false;
        }

        if Expiration::When(now) < self.deadline() {
            return false;
        }

        self.started = None;
        true
    }
}
