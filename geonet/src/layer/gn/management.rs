//! The source of time and position.
//!
//! A router does not own a clock or a positioning device. It asks a management entity, which may
//! not be able to answer, for example before the first GNSS fix. Operations that need the answer
//! then fail instead of inventing one.
use std::time::{SystemTime, UNIX_EPOCH};

use crate::time::Timestamp;
use crate::wire::geonet::{Address, LongPositionVector, ShortPositionVector};

use super::greedy::Point;

/// The kinematic state of the own station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LocalPosition {
    /// Latitude in 1/10 microdegree.
    pub latitude: i32,
    /// Longitude in 1/10 microdegree.
    pub longitude: i32,
    /// Speed in 0.01 m/s, 15 bits.
    pub speed: u16,
    /// Heading in 0.1 degree from north.
    pub heading: u16,
    /// The position is within the accuracy required by the application.
    pub accurate: bool,
}

/// Supplies time and position to the router.
pub trait Management {
    /// Milliseconds since the Unix epoch.
    fn time(&self) -> Option<u64>;

    /// The current position.
    fn position(&self) -> Option<LocalPosition>;

    /// The current GeoNetworking timestamp.
    fn timestamp(&self) -> Option<Timestamp> {
        self.time().map(Timestamp::from_unix_millis)
    }
}

/// A management entity that knows neither time nor position.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoManagement;

/// A management entity with explicitly set values.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fixed {
    /// Returned from `time`.
    pub time: Option<u64>,
    /// Returned from `position`.
    pub position: Option<LocalPosition>,
}

/// The system clock and a position set by the application.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    /// Returned from `position`.
    pub position: Option<LocalPosition>,
}

impl LocalPosition {
    /// The coordinates alone.
    pub fn point(&self) -> Point {
        Point::new(self.latitude, self.longitude)
    }

    /// The long position vector advertising this position for `address`.
    pub fn vector(&self, address: Address, timestamp: Timestamp) -> LongPositionVector {
        LongPositionVector {
            short: ShortPositionVector {
                address,
                timestamp,
                latitude: self.latitude,
                longitude: self.longitude,
            },
            accurate: self.accurate,
            speed: self.speed & 0x7fff,
            heading: self.heading,
        }
    }
}

impl Management for NoManagement {
    fn time(&self) -> Option<u64> {
        None
    }

    fn position(&self) -> Option<LocalPosition> {
        None
    }
}

impl Management for Fixed {
    fn time(&self) -> Option<u64> {
        self.time
    }

    fn position(&self) -> Option<LocalPosition> {
        self.position
    }
}

impl Management for SystemClock {
    fn time(&self) -> Option<u64> {
        let since = SystemTime::now().duration_since(UNIX_EPOCH).ok()?;
        Some(since.as_millis() as u64)
    }

    fn position(&self) -> Option<LocalPosition> {
        self.position
    }
}

impl<M: Management + ?Sized> Management for &'_ M {
    fn time(&self) -> Option<u64> {
        (**self).time()
    }

    fn position(&self) -> Option<LocalPosition> {
        (**self).position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::geonet::{Mid, StationType};

    #[test]
    fn nothing_known() {
        assert_eq!(NoManagement.time(), None);
        assert_eq!(NoManagement.position(), None);
        assert_eq!(NoManagement.timestamp(), None);
    }

    #[test]
    fn fixed_timestamp() {
        let fixed = Fixed {
            time: Some(Timestamp::EPOCH_UNIX_MILLIS + 1_104_922_570),
            position: None,
        };
        assert_eq!(fixed.timestamp(), Some(Timestamp(1_104_922_570)));
    }

    #[test]
    fn system_clock_after_epoch() {
        let clock = SystemClock::default();
        let now = clock.time().unwrap();
        assert!(now > Timestamp::EPOCH_UNIX_MILLIS);
    }

    #[test]
    fn vector() {
        let position = LocalPosition {
            latitude: 1,
            longitude: -2,
            speed: 0xffff,
            heading: 3600,
            accurate: true,
        };
        let address = Address::new(false, StationType::Bus, 0, Mid::new(5));
        let lpv = position.vector(address, Timestamp(9));
        assert_eq!(lpv.address(), address);
        assert_eq!(lpv.short.timestamp, Timestamp(9));
        assert_eq!(lpv.short.longitude, -2);
        assert_eq!(lpv.speed, 0x7fff);
        assert_eq!(position.point(), Point::new(1, -2));
    }
}
