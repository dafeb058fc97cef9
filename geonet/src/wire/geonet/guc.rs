use byteorder::{ByteOrder, NetworkEndian};

use crate::wire::{Error, Result};
use super::{LongPositionVector, SequenceNumber, ShortPositionVector};

byte_wrapper! {
    /// A byte sequence representing a GeoUnicast extended header.
    #[derive(Debug, PartialEq, Eq)]
    pub struct guc([u8]);
}

mod field {
    use crate::wire::field::*;

    pub(crate) const SEQUENCE_NUMBER: Field =  0..2;
    pub(crate) const RESERVED:        Field =  2..4;
    pub(crate) const SOURCE:          Field =  4..28;
    pub(crate) const DESTINATION:     Field = 28..48;
}

/// The length of the GeoUnicast extended header.
pub const HEADER_LEN: usize = field::DESTINATION.end;

/// Offset of the sequence number.
pub const SEQUENCE_NUMBER_OFFSET: usize = field::SEQUENCE_NUMBER.start;

/// Offset of the source long position vector.
pub const SOURCE_OFFSET: usize = field::SOURCE.start;

impl guc {
    /// Imbue a raw octet buffer with GeoUnicast header structure.
    pub fn new_unchecked(data: &[u8]) -> &Self {
        Self::__from_macro_new_unchecked(data)
    }

    /// Imbue a mutable octet buffer with GeoUnicast header structure.
    pub fn new_unchecked_mut(data: &mut [u8]) -> &mut Self {
        Self::__from_macro_new_unchecked_mut(data)
    }

    /// Shorthand for a combination of `new_unchecked` and `check_len`.
    pub fn new_checked(data: &[u8]) -> Result<&Self> {
        let header = Self::new_unchecked(data);
        header.check_len()?;
        Ok(header)
    }

    /// Ensure that no accessor method will panic if called.
    pub fn check_len(&self) -> Result<()> {
        if self.0.len() < HEADER_LEN {
            Err(Error::Truncated)
        } else {
            Ok(())
        }
    }

    /// Return the sequence number field.
    pub fn sequence_number(&self) -> SequenceNumber {
        SequenceNumber(NetworkEndian::read_u16(&self.0[field::SEQUENCE_NUMBER]))
    }

    /// Parse the source position vector.
    pub fn source(&self) -> Result<LongPositionVector> {
        LongPositionVector::parse(&self.0[field::SOURCE])
    }

    /// Parse the destination position vector.
    pub fn destination(&self) -> Result<ShortPositionVector> {
        ShortPositionVector::parse(&self.0[field::DESTINATION])
    }

    /// Set the sequence number field.
    pub fn set_sequence_number(&mut self, value: SequenceNumber) {
        NetworkEndian::write_u16(&mut self.0[field::SEQUENCE_NUMBER], value.0)
    }

    /// Zero the reserved field.
    pub fn clear_reserved(&mut self) {
        NetworkEndian::write_u16(&mut self.0[field::RESERVED], 0)
    }

    /// Write the source position vector.
    pub fn set_source(&mut self, value: &LongPositionVector) {
        value.emit(&mut self.0[field::SOURCE])
    }

    /// Write the destination position vector.
    pub fn set_destination(&mut self, value: &ShortPositionVector) {
        value.emit(&mut self.0[field::DESTINATION])
    }
}

/// A high-level representation of a GeoUnicast extended header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Repr {
    /// Sequence number assigned by the source.
    pub sequence_number: SequenceNumber,
    /// Position vector of the originating station.
    pub source: LongPositionVector,
    /// Position vector of the destination.
    pub destination: ShortPositionVector,
}

impl Repr {
    /// Parse a GeoUnicast header.
    pub fn parse(header: &guc) -> Result<Self> {
        header.check_len()?;
        Ok(Repr {
            sequence_number: header.sequence_number(),
            source: header.source()?,
            destination: header.destination()?,
        })
    }

    /// The length of the emitted header.
    pub fn buffer_len(&self) -> usize {
        HEADER_LEN
    }

    /// Emit the header into a buffer of at least `buffer_len` bytes.
    pub fn emit(&self, header: &mut guc) {
        header.set_sequence_number(self.sequence_number);
        header.clear_reserved();
        header.set_source(&self.source);
        header.set_destination(&self.destination);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Timestamp;
    use crate::wire::geonet::{Address, Mid, StationType};

    fn repr() -> Repr {
        Repr {
            sequence_number: SequenceNumber(0x1234),
            source: LongPositionVector {
                short: ShortPositionVector {
                    address: Address::new(false, StationType::Bus, 5, Mid::new(0xaa)),
                    timestamp: Timestamp(0x0102_0304),
                    latitude: 10,
                    longitude: -10,
                },
                accurate: false,
                speed: 1,
                heading: 2,
            },
            destination: ShortPositionVector {
                address: Address::new(false, StationType::Tram, 5, Mid::new(0xbb)),
                timestamp: Timestamp(0x0506_0708),
                latitude: 20,
                longitude: -20,
            },
        }
    }

    #[test]
    fn field_positions() {
        let mut bytes = vec![0xa5; HEADER_LEN];
        repr().emit(guc::new_unchecked_mut(&mut bytes));

        assert_eq!(&bytes[0..4], &[0x12, 0x34, 0x00, 0x00]);
        // Source timestamp at offset 12, as used by duplicate detection.
        assert_eq!(&bytes[12..16], &[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(&bytes[28 + 7..28 + 8], &[0xbb]);
        assert_eq!(&bytes[36..40], &[0x05, 0x06, 0x07, 0x08]);

        let parsed = Repr::parse(guc::new_checked(&bytes).unwrap()).unwrap();
        assert_eq!(parsed, repr());
    }

    #[test]
    fn truncated() {
        let bytes = [0; HEADER_LEN - 1];
        assert_eq!(guc::new_checked(&bytes), Err(Error::Truncated));
    }
}
