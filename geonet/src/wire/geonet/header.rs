use core::fmt;

use crate::time::Duration;

/// The protocol version this implementation speaks, EN 302 636-4-1 v1.2.1.
pub const PROTOCOL_VERSION: u8 = 0;

enum_with_unknown! {
    /// The header following the basic header.
    pub doc enum BasicNextHeader(u8) {
        /// Treated like `Common`.
        Any = 0,
        /// A common header follows.
        Common = 1,
        /// A secured packet follows.
        Secured = 2,
    }
}

enum_with_unknown! {
    /// The protocol above GeoNetworking, carried in the common header.
    pub doc enum NextHeader(u8) {
        /// Unspecified, the payload is not delivered to any transport.
        Any = 0,
        /// Basic Transport Protocol, interactive.
        BtpA = 1,
        /// Basic Transport Protocol, non-interactive.
        BtpB = 2,
        /// IPv6 adaptation sub-layer.
        Ipv6 = 3,
    }
}

enum_with_unknown! {
    /// The extended header type nibble of the common header.
    pub doc enum HeaderType(u8) {
        /// No extended header.
        Any = 0,
        /// Beacon.
        Beacon = 1,
        /// GeoUnicast.
        GeoUnicast = 2,
        /// GeoAnycast, subtype selects the area shape.
        GeoAnycast = 3,
        /// GeoBroadcast, subtype selects the area shape.
        GeoBroadcast = 4,
        /// Topologically scoped broadcast, single or multi hop.
        TopoBroadcast = 5,
        /// Location service request or reply.
        LocationService = 6,
    }
}

/// The traffic class byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TrafficClass {
    /// Store-carry-forward: the packet may be buffered when there is no suitable neighbour.
    pub store_carry_forward: bool,
    /// The packet may be moved to another channel.
    pub channel_offload: bool,
    /// Traffic class identifier, 6 bits.
    pub id: u8,
}

/// The lifetime field of the basic header.
///
/// The upper 6 bits are a multiplier, the lower 2 bits select the base unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Lifetime(pub u8);

/// A packet sequence number.
///
/// Sequence numbers are assigned from 1 upwards and skip 0 when wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SequenceNumber(pub u16);

const SCF_FLAG: u8 = 0x80;
const OFFLOAD_FLAG: u8 = 0x40;
const ID_MASK: u8 = 0x3f;

const LIFETIME_BASES_MS: [u64; 4] = [50, 1_000, 10_000, 100_000];
const MULTIPLIER_MAX: u64 = 63;

impl TrafficClass {
    /// Unpack the traffic class byte.
    pub fn from_byte(byte: u8) -> Self {
        TrafficClass {
            store_carry_forward: byte & SCF_FLAG != 0,
            channel_offload: byte & OFFLOAD_FLAG != 0,
            id: byte & ID_MASK,
        }
    }

    /// Pack into the traffic class byte, the id is truncated to 6 bits.
    pub fn to_byte(self) -> u8 {
        let scf = if self.store_carry_forward { SCF_FLAG } else { 0 };
        let offload = if self.channel_offload { OFFLOAD_FLAG } else { 0 };
        scf | offload | (self.id & ID_MASK)
    }
}

impl Lifetime {
    /// Encode a duration with the finest base that can represent it.
    ///
    /// The duration is rounded down to a multiple of the base. Durations beyond 6300 seconds
    /// saturate.
    pub fn from_duration(duration: Duration) -> Self {
        let millis = duration.as_millis() as u64;
        let base = LIFETIME_BASES_MS.iter()
            .position(|&base| millis / base <= MULTIPLIER_MAX)
            .unwrap_or(LIFETIME_BASES_MS.len() - 1);
        let multiplier = (millis / LIFETIME_BASES_MS[base]).min(MULTIPLIER_MAX);
        Lifetime(((multiplier as u8) << 2) | base as u8)
    }

    /// The duration represented by the field.
    pub fn duration(self) -> Duration {
        let multiplier = u64::from(self.0 >> 2);
        let base = LIFETIME_BASES_MS[usize::from(self.0 & 0x3)];
        Duration::from_millis(multiplier * base)
    }
}

impl SequenceNumber {
    /// The first number assigned after startup.
    pub const FIRST: SequenceNumber = SequenceNumber(1);

    /// The number assigned after this one.
    pub fn next(self) -> Self {
        match self.0 {
            u16::MAX => SequenceNumber(1),
            sn => SequenceNumber(sn + 1),
        }
    }

    /// Compare with wraparound, analogous to `Timestamp::is_newer_than`.
    pub fn is_newer_than(self, previous: SequenceNumber) -> bool {
        const HALF: u16 = u16::MAX / 2;
        let (current, previous) = (self.0, previous.0);
        (current > previous && current - previous <= HALF)
            || (previous > current && previous - current > HALF)
    }
}

impl fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traffic_class() {
        let tc = TrafficClass::from_byte(0xc5);
        assert!(tc.store_carry_forward);
        assert!(tc.channel_offload);
        assert_eq!(tc.id, 5);
        assert_eq!(tc.to_byte(), 0xc5);
        assert_eq!(TrafficClass { id: 0xff, ..TrafficClass::default() }.to_byte(), 0x3f);
    }

    #[test]
    fn lifetime() {
        assert_eq!(Lifetime::from_duration(Duration::from_secs(60)), Lifetime((60 << 2) | 1));
        assert_eq!(Lifetime((60 << 2) | 1).duration(), Duration::from_secs(60));
        assert_eq!(Lifetime::from_duration(Duration::from_millis(500)), Lifetime(10 << 2));
        assert_eq!(Lifetime::from_duration(Duration::from_secs(600)), Lifetime((60 << 2) | 2));
        assert_eq!(Lifetime::from_duration(Duration::from_secs(100_000)), Lifetime(0xff));
        assert_eq!(Lifetime(0xff).duration(), Duration::from_secs(6300));
    }

    #[test]
    fn sequence_numbers_skip_zero() {
        let mut sn = SequenceNumber::FIRST;
        for expected in 1..=u16::MAX {
            assert_eq!(sn, SequenceNumber(expected));
            sn = sn.next();
        }
        assert_eq!(sn, SequenceNumber(1));
    }

    #[test]
    fn sequence_wraparound() {
        assert!(SequenceNumber(3).is_newer_than(SequenceNumber(2)));
        assert!(!SequenceNumber(2).is_newer_than(SequenceNumber(2)));
        assert!(!SequenceNumber(1).is_newer_than(SequenceNumber(2)));
        assert!(SequenceNumber(1).is_newer_than(SequenceNumber(u16::MAX)));
        assert!(!SequenceNumber(u16::MAX).is_newer_than(SequenceNumber(1)));
    }
}
