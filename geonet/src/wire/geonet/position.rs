use byteorder::{ByteOrder, NetworkEndian};

use crate::time::Timestamp;
use crate::wire::{Error, Result};
use super::Address;

mod field {
    use crate::wire::field::*;

    pub(crate) const ADDRESS:   Field =  0..8;
    pub(crate) const TIMESTAMP: Field =  8..12;
    pub(crate) const LATITUDE:  Field = 12..16;
    pub(crate) const LONGITUDE: Field = 16..20;
    pub(crate) const PAI_SPEED: Field = 20..22;
    pub(crate) const HEADING:   Field = 22..24;
}

const PAI_FLAG: u16 = 0x8000;
const SPEED_MASK: u16 = 0x7fff;

/// The byte offset of the timestamp within a position vector.
pub const TIMESTAMP_OFFSET: usize = field::TIMESTAMP.start;

/// A short position vector.
///
/// Coordinates are in units of 1/10 micro degree (that is 1e-7 degree), north and east positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ShortPositionVector {
    /// The station at this position.
    pub address: Address,
    /// When the position was determined.
    pub timestamp: Timestamp,
    /// Latitude, north positive.
    pub latitude: i32,
    /// Longitude, east positive.
    pub longitude: i32,
}

/// A long position vector, a short one plus kinematics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LongPositionVector {
    /// Address, time and coordinates.
    pub short: ShortPositionVector,
    /// The position accuracy indicator.
    pub accurate: bool,
    /// Speed in units of 0.01 m/s, only the lower 15 bits are transmitted.
    pub speed: u16,
    /// Heading in units of 0.1 degree clockwise from north.
    pub heading: u16,
}

impl ShortPositionVector {
    /// The length on the wire.
    pub const LEN: usize = field::LONGITUDE.end;

    /// Parse from the start of a buffer.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < Self::LEN {
            return Err(Error::Truncated);
        }

        Ok(ShortPositionVector {
            address: Address::from_bytes(&data[field::ADDRESS]),
            timestamp: Timestamp(NetworkEndian::read_u32(&data[field::TIMESTAMP])),
            latitude: NetworkEndian::read_i32(&data[field::LATITUDE]),
            longitude: NetworkEndian::read_i32(&data[field::LONGITUDE]),
        })
    }

    /// Emit into the start of a buffer.
    ///
    /// # Panics
    /// This method panics if the buffer is shorter than `LEN`.
    pub fn emit(&self, data: &mut [u8]) {
        self.address.write_bytes(&mut data[field::ADDRESS]);
        NetworkEndian::write_u32(&mut data[field::TIMESTAMP], self.timestamp.0);
        NetworkEndian::write_i32(&mut data[field::LATITUDE], self.latitude);
        NetworkEndian::write_i32(&mut data[field::LONGITUDE], self.longitude);
    }
}

impl LongPositionVector {
    /// The length on the wire.
    pub const LEN: usize = field::HEADING.end;

    /// Parse from the start of a buffer.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < Self::LEN {
            return Err(Error::Truncated);
        }

        let short = ShortPositionVector::parse(data)?;
        let pai_speed = NetworkEndian::read_u16(&data[field::PAI_SPEED]);
        Ok(LongPositionVector {
            short,
            accurate: pai_speed & PAI_FLAG != 0,
            speed: pai_speed & SPEED_MASK,
            heading: NetworkEndian::read_u16(&data[field::HEADING]),
        })
    }

    /// Emit into the start of a buffer.
    ///
    /// # Panics
    /// This method panics if the buffer is shorter than `LEN`.
    pub fn emit(&self, data: &mut [u8]) {
        self.short.emit(data);
        let pai = if self.accurate { PAI_FLAG } else { 0 };
        NetworkEndian::write_u16(&mut data[field::PAI_SPEED], pai | (self.speed & SPEED_MASK));
        NetworkEndian::write_u16(&mut data[field::HEADING], self.heading);
    }

    /// The address of the described station.
    pub fn address(&self) -> Address {
        self.short.address
    }
}
