use core::{cmp, fmt, hash};
use byteorder::{ByteOrder, NetworkEndian};

use crate::wire::EthernetAddress;

enum_with_unknown! {
    /// The type of an ITS station.
    pub doc enum StationType(u8) {
        /// Type not known.
        Unspecified = 0,
        /// A pedestrian with a personal device.
        Pedestrian = 1,
        /// A bicycle.
        Cyclist = 2,
        /// A moped.
        Moped = 3,
        /// A motorcycle.
        Motorcycle = 4,
        /// A passenger car.
        PassengerCar = 5,
        /// A bus.
        Bus = 6,
        /// A light truck.
        LightTruck = 7,
        /// A heavy truck.
        HeavyTruck = 8,
        /// A trailer.
        Trailer = 9,
        /// Emergency and other special vehicles.
        SpecialVehicle = 10,
        /// A tram.
        Tram = 11,
        /// A stationary roadside unit.
        RoadsideUnit = 15,
    }
}

/// The 48-bit mobile (link layer) identifier of a station.
///
/// This is the part of the GeoNetworking address that identifies a station. It is also its
/// Ethernet address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Mid(u64);

/// A GeoNetworking address.
///
/// Bit layout of the 64-bit big endian value, most significant first:
///
/// ```text
///  63  62      58 57         48 47                                            0
/// +---+----------+-------------+-----------------------------------------------+
/// | M |    ST    |     SCC     |                      MID                      |
/// +---+----------+-------------+-----------------------------------------------+
/// ```
///
/// Two addresses are the same station if their MID is the same. The other fields are not
/// considered by `Eq`, `Ord` or `Hash`.
#[derive(Clone, Copy, Default)]
pub struct Address(u64);

const MANUAL_SHIFT: u32 = 63;
const STATION_TYPE_SHIFT: u32 = 58;
const STATION_TYPE_MASK: u64 = 0x1f;
const COUNTRY_SHIFT: u32 = 48;
const COUNTRY_MASK: u64 = 0x3ff;
const MID_MASK: u64 = 0xffff_ffff_ffff;

impl Mid {
    /// The all-ones identifier, also the link layer broadcast.
    pub const BROADCAST: Mid = Mid(MID_MASK);

    /// Create an identifier from the lower 48 bits of a value.
    pub const fn new(value: u64) -> Self {
        Mid(value & MID_MASK)
    }

    /// The identifier as an integer.
    pub fn value(self) -> u64 {
        self.0
    }

    /// Interpret an Ethernet address as identifier.
    pub fn from_link_address(addr: EthernetAddress) -> Self {
        Mid(NetworkEndian::read_uint(addr.as_bytes(), 6))
    }

    /// The Ethernet address with the same value.
    pub fn link_address(self) -> EthernetAddress {
        let mut bytes = [0; 6];
        NetworkEndian::write_uint(&mut bytes, self.0, 6);
        EthernetAddress(bytes)
    }

    /// Query whether this is the broadcast identifier.
    pub fn is_broadcast(self) -> bool {
        self == Self::BROADCAST
    }
}

impl Address {
    /// The length of an address on the wire.
    pub const LEN: usize = 8;

    /// Pack the fields into an address.
    ///
    /// Country codes are truncated to their 10 bit width, as are station type codes to 5 bits.
    pub fn new(manual: bool, station_type: StationType, country_code: u16, mid: Mid) -> Self {
        let station: u8 = station_type.into();
        Address(
            (u64::from(manual) << MANUAL_SHIFT)
            | ((u64::from(station) & STATION_TYPE_MASK) << STATION_TYPE_SHIFT)
            | ((u64::from(country_code) & COUNTRY_MASK) << COUNTRY_SHIFT)
            | mid.0)
    }

    /// Reinterpret a raw 64-bit value.
    pub const fn from_raw(value: u64) -> Self {
        Address(value)
    }

    /// The raw 64-bit value with all fields.
    pub fn raw(self) -> u64 {
        self.0
    }

    /// Read an address from its wire representation.
    ///
    /// # Panics
    /// The function panics if `data` is shorter than eight octets.
    pub fn from_bytes(data: &[u8]) -> Self {
        Address(NetworkEndian::read_u64(data))
    }

    /// Write the wire representation of the address.
    ///
    /// # Panics
    /// The function panics if `data` is shorter than eight octets.
    pub fn write_bytes(self, data: &mut [u8]) {
        NetworkEndian::write_u64(data, self.0)
    }

    /// Whether the address was configured manually.
    pub fn manual(self) -> bool {
        self.0 >> MANUAL_SHIFT != 0
    }

    /// The station type code.
    pub fn station_type(self) -> StationType {
        StationType::from(((self.0 >> STATION_TYPE_SHIFT) & STATION_TYPE_MASK) as u8)
    }

    /// The ITU country code.
    pub fn country_code(self) -> u16 {
        ((self.0 >> COUNTRY_SHIFT) & COUNTRY_MASK) as u16
    }

    /// The mobile identifier.
    pub fn mid(self) -> Mid {
        Mid(self.0 & MID_MASK)
    }

    /// The same address with a different identifier.
    pub fn with_mid(self, mid: Mid) -> Self {
        Address((self.0 & !MID_MASK) | mid.0)
    }

    /// The Ethernet address of the station.
    pub fn link_address(self) -> EthernetAddress {
        self.mid().link_address()
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.mid() == other.mid()
    }
}

impl Eq for Address { }

impl PartialOrd for Address {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Address {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.mid().cmp(&other.mid())
    }
}

impl hash::Hash for Address {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.mid().hash(state)
    }
}

impl From<EthernetAddress> for Mid {
    fn from(addr: EthernetAddress) -> Self {
        Mid::from_link_address(addr)
    }
}

impl fmt::Display for Mid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.link_address(), f)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Address")
            .field("manual", &self.manual())
            .field("station_type", &self.station_type())
            .field("country_code", &self.country_code())
            .field("mid", &self.mid())
            .finish()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.mid(), self.country_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_layout() {
        let addr = Address::new(true, StationType::RoadsideUnit, 0x2aa, Mid::new(0x0123_4567_89ab));
        let mut bytes = [0; 8];
        addr.write_bytes(&mut bytes);
        // M=1, ST=01111, SCC=10_1010_1010
        assert_eq!(bytes, [0xbe, 0xaa, 0x01, 0x23, 0x45, 0x67, 0x89, 0xab]);

        let parsed = Address::from_bytes(&bytes);
        assert!(parsed.manual());
        assert_eq!(parsed.station_type(), StationType::RoadsideUnit);
        assert_eq!(parsed.country_code(), 0x2aa);
        assert_eq!(parsed.mid(), Mid::new(0x0123_4567_89ab));
        assert_eq!(parsed.raw(), addr.raw());
    }

    #[test]
    fn field_extremes() {
        for &(manual, station, country, mid) in &[
            (false, 0u8, 0u16, 0u64),
            (true, 31, 1023, 0xffff_ffff_ffff),
            (false, 31, 0, 0xffff_ffff_ffff),
            (true, 0, 1023, 1),
        ] {
            let addr = Address::new(manual, StationType::from(station), country, Mid::new(mid));
            assert_eq!(addr.manual(), manual);
            assert_eq!(addr.station_type(), StationType::from(station));
            assert_eq!(addr.country_code(), country);
            assert_eq!(addr.mid().value(), mid);
        }
    }

    #[test]
    fn station_type_codes() {
        assert_eq!(StationType::from(0), StationType::Unspecified);
        assert_eq!(StationType::from(15), StationType::RoadsideUnit);
        assert_eq!(StationType::from(12), StationType::Unknown(12));
        assert_eq!(u8::from(StationType::Unspecified), 0);
        assert_eq!(u8::from(StationType::Unknown(31)), 31);

        let addr = Address::new(false, StationType::Unspecified, 0, Mid::new(1));
        assert_eq!(addr.station_type(), StationType::Unspecified);
    }

    #[test]
    fn identity_is_mid() {
        let mid = Mid::new(0x42);
        let a = Address::new(false, StationType::Bus, 10, mid);
        let b = Address::new(true, StationType::Tram, 999, mid);
        let c = Address::new(false, StationType::Bus, 10, Mid::new(0x43));
        assert_eq!(a, b);
        assert_ne!(a.raw(), b.raw());
        assert_ne!(a, c);
        assert!(a < c);
    }

    #[test]
    fn mid_is_link_address() {
        let link = EthernetAddress([0x02, 0x00, 0x5e, 0x10, 0x20, 0x30]);
        let mid = Mid::from_link_address(link);
        assert_eq!(mid.value(), 0x0200_5e10_2030);
        assert_eq!(mid.link_address(), link);
        assert_eq!(Mid::BROADCAST.link_address(), EthernetAddress::BROADCAST);
    }

    #[test]
    fn with_mid_keeps_fields() {
        let addr = Address::new(false, StationType::PassengerCar, 276, Mid::new(1));
        let moved = addr.with_mid(Mid::new(2));
        assert_eq!(moved.station_type(), StationType::PassengerCar);
        assert_eq!(moved.country_code(), 276);
        assert_eq!(moved.mid(), Mid::new(2));
    }
}
