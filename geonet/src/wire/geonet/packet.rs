use core::{fmt, ops};
use core::convert::TryFrom;
use byteorder::{ByteOrder, NetworkEndian};

use crate::time::Timestamp;
use crate::wire::{Error, Result, Payload, PayloadMut, PayloadError, Reframe, payload};
use super::{
    Address, BasicNextHeader, Extended, HeaderInfo, Lifetime, NextHeader, SequenceNumber,
    TrafficClass, PROTOCOL_VERSION, guc};

byte_wrapper! {
    /// A byte sequence starting with the GeoNetworking basic and common header.
    #[derive(Debug, PartialEq, Eq)]
    pub struct geonet([u8]);
}

/// A GeoNetworking packet with its parsed headers.
#[derive(Debug, Clone)]
pub struct Packet<T: Payload> {
    buffer: T,
    repr: Repr,
}

mod field {
    use crate::wire::field::*;

    // Basic header
    pub(crate) const VERSION_NH: usize = 0;
    pub(crate) const BH_RESERVED: usize = 1;
    pub(crate) const LIFETIME: usize = 2;
    pub(crate) const RHL: usize = 3;

    // Common header
    pub(crate) const NH: usize = 4;
    pub(crate) const HT_HST: usize = 5;
    pub(crate) const TC: usize = 6;
    pub(crate) const FLAGS: usize = 7;
    pub(crate) const PL: Field = 8..10;
    pub(crate) const MHL: usize = 10;
    pub(crate) const CH_RESERVED: usize = 11;

    pub(crate) const EXTENDED: Rest = 12..;
}

/// The combined length of basic and common header.
pub const HEADER_LEN: usize = field::EXTENDED.start;

const MOBILE_FLAG: u8 = 0x80;

impl geonet {
    /// Imbue a raw octet buffer with GeoNetworking packet structure.
    pub fn new_unchecked(data: &[u8]) -> &Self {
        Self::__from_macro_new_unchecked(data)
    }

    /// Imbue a mutable octet buffer with GeoNetworking packet structure.
    pub fn new_unchecked_mut(data: &mut [u8]) -> &mut Self {
        Self::__from_macro_new_unchecked_mut(data)
    }

    /// Shorthand for a combination of `new_unchecked` and `check_len`.
    pub fn new_checked(data: &[u8]) -> Result<&Self> {
        let packet = Self::new_unchecked(data);
        packet.check_len()?;
        Ok(packet)
    }

    /// Ensure that the fixed headers are present.
    ///
    /// Returns `Err(Error::Truncated)` if the buffer is too short for the basic and common header.
    /// The extended header and payload are checked by `check_extended`.
    pub fn check_len(&self) -> Result<()> {
        if self.0.len() < HEADER_LEN {
            Err(Error::Truncated)
        } else {
            Ok(())
        }
    }

    /// Ensure the registered extended header and the payload fit into the buffer.
    ///
    /// Returns `Err(Error::Unrecognized)` for an unregistered header type.
    pub fn check_extended(&self) -> Result<Extended> {
        self.check_len()?;
        let extended = self.extended_type().ok_or(Error::Unrecognized)?;
        let total = HEADER_LEN + extended.info().size + usize::from(self.payload_len());
        if self.0.len() < total {
            return Err(Error::Truncated);
        }
        Ok(extended)
    }

    /// The underlying bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Return the protocol version field.
    pub fn version(&self) -> u8 {
        self.0[field::VERSION_NH] >> 4
    }

    /// Return the next header field of the basic header.
    pub fn basic_next_header(&self) -> BasicNextHeader {
        BasicNextHeader::from(self.0[field::VERSION_NH] & 0x0f)
    }

    /// Return the lifetime field.
    pub fn lifetime(&self) -> Lifetime {
        Lifetime(self.0[field::LIFETIME])
    }

    /// Return the remaining hop limit field.
    pub fn remaining_hop_limit(&self) -> u8 {
        self.0[field::RHL]
    }

    /// Return the next header field of the common header.
    pub fn next_header(&self) -> NextHeader {
        NextHeader::from(self.0[field::NH] >> 4)
    }

    /// The raw header type and subtype nibbles.
    pub fn header_type(&self) -> (u8, u8) {
        let byte = self.0[field::HT_HST];
        (byte >> 4, byte & 0x0f)
    }

    /// Return the traffic class field.
    pub fn traffic_class(&self) -> TrafficClass {
        TrafficClass::from_byte(self.0[field::TC])
    }

    /// Query the mobility flag.
    pub fn is_mobile(&self) -> bool {
        self.0[field::FLAGS] & MOBILE_FLAG != 0
    }

    /// Return the payload length field.
    pub fn payload_len(&self) -> u16 {
        NetworkEndian::read_u16(&self.0[field::PL])
    }

    /// Return the maximum hop limit field.
    pub fn max_hop_limit(&self) -> u8 {
        self.0[field::MHL]
    }

    /// The registered extended header type, if any.
    pub fn extended_type(&self) -> Option<Extended> {
        let (header, sub) = self.header_type();
        Extended::lookup(header, sub)
    }

    /// The layout of the extended header, if registered.
    pub fn header_info(&self) -> Option<&'static HeaderInfo> {
        self.extended_type().map(Extended::info)
    }

    /// Length of basic, common and extended header.
    pub fn header_len(&self) -> Option<usize> {
        self.header_info().map(|info| HEADER_LEN + info.size)
    }

    /// The bytes following the common header.
    pub fn extended_slice(&self) -> &[u8] {
        &self.0[field::EXTENDED]
    }

    /// The source address according to the registered layout of the extended header.
    ///
    /// Requires a successful `check_extended`, returns `None` if the header type does not carry
    /// a source address.
    pub fn fetch_source_address(&self) -> Option<Address> {
        let offset = self.header_info()?.offsets.source_address?;
        self.extended_slice()
            .get(offset..offset + Address::LEN)
            .map(Address::from_bytes)
    }

    /// The sequence number according to the registered layout of the extended header.
    pub fn fetch_sequence_number(&self) -> Option<SequenceNumber> {
        let offset = self.header_info()?.offsets.sequence_number?;
        self.extended_slice()
            .get(offset..offset + 2)
            .map(NetworkEndian::read_u16)
            .map(SequenceNumber)
    }

    /// The source timestamp according to the registered layout of the extended header.
    pub fn fetch_timestamp(&self) -> Option<Timestamp> {
        let offset = self.header_info()?.offsets.timestamp?;
        self.extended_slice()
            .get(offset..offset + 4)
            .map(NetworkEndian::read_u32)
            .map(Timestamp)
    }

    /// Set the version and basic next header, clearing the reserved byte.
    pub fn set_version_and_next_header(&mut self, version: u8, next: BasicNextHeader) {
        let next: u8 = next.into();
        self.0[field::VERSION_NH] = (version << 4) | (next & 0x0f);
        self.0[field::BH_RESERVED] = 0;
    }

    /// Set the lifetime field.
    pub fn set_lifetime(&mut self, value: Lifetime) {
        self.0[field::LIFETIME] = value.0;
    }

    /// Set the remaining hop limit field.
    pub fn set_remaining_hop_limit(&mut self, value: u8) {
        self.0[field::RHL] = value;
    }

    /// Set the next header field of the common header.
    pub fn set_next_header(&mut self, value: NextHeader) {
        let value: u8 = value.into();
        self.0[field::NH] = value << 4;
    }

    /// Set the header type and subtype nibbles.
    pub fn set_header_type(&mut self, header: u8, sub: u8) {
        self.0[field::HT_HST] = (header << 4) | (sub & 0x0f);
    }

    /// Set the traffic class field.
    pub fn set_traffic_class(&mut self, value: TrafficClass) {
        self.0[field::TC] = value.to_byte();
    }

    /// Set or clear the mobility flag.
    pub fn set_mobile(&mut self, mobile: bool) {
        self.0[field::FLAGS] = if mobile { MOBILE_FLAG } else { 0 };
    }

    /// Set the payload length field.
    pub fn set_payload_len(&mut self, value: u16) {
        NetworkEndian::write_u16(&mut self.0[field::PL], value)
    }

    /// Set the maximum hop limit, clearing the reserved byte.
    pub fn set_max_hop_limit(&mut self, value: u8) {
        self.0[field::MHL] = value;
        self.0[field::CH_RESERVED] = 0;
    }

    /// The bytes following the common header, mutably.
    pub fn extended_mut_slice(&mut self) -> &mut [u8] {
        &mut self.0[field::EXTENDED]
    }
}

/// The extended header of a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendedRepr {
    /// A GeoUnicast header.
    GeoUnicast(guc::Repr),
}

/// A high-level representation of the GeoNetworking headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Repr {
    /// How long the packet may be buffered.
    pub lifetime: Lifetime,
    /// Hops left, decremented by each forwarder.
    pub remaining_hop_limit: u8,
    /// The transport protocol of the payload.
    pub next_header: NextHeader,
    /// The traffic class of the packet.
    pub traffic_class: TrafficClass,
    /// The originating station is mobile.
    pub mobile: bool,
    /// Length of the payload after all headers.
    pub payload_len: u16,
    /// Hop limit set by the source.
    pub max_hop_limit: u8,
    /// The extended header.
    pub extended: ExtendedRepr,
}

impl ExtendedRepr {
    /// The registry entry matching this header.
    pub fn kind(&self) -> Extended {
        match self {
            ExtendedRepr::GeoUnicast(_) => Extended::GeoUnicast,
        }
    }

    /// The length of the emitted extended header.
    pub fn buffer_len(&self) -> usize {
        match self {
            ExtendedRepr::GeoUnicast(repr) => repr.buffer_len(),
        }
    }

    /// The sequence number carried by the header.
    pub fn sequence_number(&self) -> SequenceNumber {
        match self {
            ExtendedRepr::GeoUnicast(repr) => repr.sequence_number,
        }
    }

    fn parse(kind: Extended, data: &[u8]) -> Result<Self> {
        match kind {
            Extended::GeoUnicast => guc::Repr::parse(guc::guc::new_checked(data)?)
                .map(ExtendedRepr::GeoUnicast),
        }
    }

    fn emit(&self, data: &mut [u8]) {
        match self {
            ExtendedRepr::GeoUnicast(repr) => repr.emit(guc::guc::new_unchecked_mut(data)),
        }
    }
}

impl Repr {
    /// Parse and validate the headers of a packet.
    ///
    /// The checks are ordered: an unregistered extended header is `Unrecognized`, a foreign
    /// protocol version or a secured packet is `Unsupported`, an unknown basic next header is
    /// `Unrecognized` and a remaining hop limit above the maximum hop limit is `Malformed`.
    pub fn parse(packet: &geonet) -> Result<Repr> {
        let kind = packet.check_extended()?;

        if packet.version() != PROTOCOL_VERSION {
            return Err(Error::Unsupported);
        }

        match packet.basic_next_header() {
            BasicNextHeader::Any | BasicNextHeader::Common => (),
            BasicNextHeader::Secured => return Err(Error::Unsupported),
            BasicNextHeader::Unknown(_) => return Err(Error::Unrecognized),
        }

        if packet.max_hop_limit() < packet.remaining_hop_limit() {
            return Err(Error::Malformed);
        }

        Ok(Repr {
            lifetime: packet.lifetime(),
            remaining_hop_limit: packet.remaining_hop_limit(),
            next_header: packet.next_header(),
            traffic_class: packet.traffic_class(),
            mobile: packet.is_mobile(),
            payload_len: packet.payload_len(),
            max_hop_limit: packet.max_hop_limit(),
            extended: ExtendedRepr::parse(kind, packet.extended_slice())?,
        })
    }

    /// The length of all GeoNetworking headers.
    pub fn header_len(&self) -> usize {
        HEADER_LEN + self.extended.buffer_len()
    }

    /// The length of the packet including its payload.
    pub fn buffer_len(&self) -> usize {
        self.header_len() + usize::from(self.payload_len)
    }

    /// Emit the headers into a buffer of at least `header_len` bytes.
    pub fn emit(&self, packet: &mut geonet) {
        let (header, sub) = self.extended.kind().type_nibbles();
        packet.set_version_and_next_header(PROTOCOL_VERSION, BasicNextHeader::Common);
        packet.set_lifetime(self.lifetime);
        packet.set_remaining_hop_limit(self.remaining_hop_limit);
        packet.set_next_header(self.next_header);
        packet.set_header_type(header, sub);
        packet.set_traffic_class(self.traffic_class);
        packet.set_mobile(self.mobile);
        packet.set_payload_len(self.payload_len);
        packet.set_max_hop_limit(self.max_hop_limit);
        self.extended.emit(packet.extended_mut_slice());
    }
}

impl<T: Payload> Packet<T> {
    /// Parse the headers of a buffer.
    pub fn new_checked(buffer: T) -> Result<Self> {
        let repr = Repr::parse(geonet::new_checked(buffer.payload())?)?;
        Ok(Packet { buffer, repr })
    }

    /// Construct a packet with assumed representation.
    pub fn new_unchecked(buffer: T, repr: Repr) -> Self {
        Packet { buffer, repr }
    }

    /// The parsed headers.
    pub fn repr(&self) -> Repr {
        self.repr
    }

    /// Consumes the packet, returning the underlying buffer.
    pub fn into_inner(self) -> T {
        self.buffer
    }

    /// The upper layer payload.
    pub fn payload_slice(&self) -> &[u8] {
        let start = self.repr.header_len();
        &self.buffer.payload()[start..start + usize::from(self.repr.payload_len)]
    }

    /// The upper layer payload, mutably.
    pub fn payload_mut_slice(&mut self) -> &mut [u8] where T: PayloadMut {
        let start = self.repr.header_len();
        let end = start + usize::from(self.repr.payload_len);
        &mut self.buffer.payload_mut()[start..end]
    }

    /// Change the remaining hop limit in both buffer and representation.
    pub fn set_remaining_hop_limit(&mut self, value: u8) where T: PayloadMut {
        geonet::new_unchecked_mut(self.buffer.payload_mut())
            .set_remaining_hop_limit(value);
        self.repr.remaining_hop_limit = value;
    }
}

impl<T: Payload> ops::Deref for Packet<T> {
    type Target = geonet;

    fn deref(&self) -> &geonet {
        // We checked the length at construction.
        geonet::new_unchecked(self.buffer.payload())
    }
}

impl<T: Payload> Payload for Packet<T> {
    fn payload(&self) -> &payload {
        self.payload_slice().into()
    }
}

impl<T: PayloadMut> PayloadMut for Packet<T> {
    fn payload_mut(&mut self) -> &mut payload {
        self.payload_mut_slice().into()
    }

    fn resize(&mut self, length: usize) -> core::result::Result<(), PayloadError> {
        let header_len = self.repr.header_len();
        let payload_len = payload_len_field(length)?;
        self.buffer.resize(header_len + length)?;
        self.repr.payload_len = payload_len;
        geonet::new_unchecked_mut(self.buffer.payload_mut()).set_payload_len(payload_len);
        Ok(())
    }

    fn reframe(&mut self, mut reframe: Reframe) -> core::result::Result<(), PayloadError> {
        let header_len = self.repr.header_len();
        let payload_len = payload_len_field(reframe.length)?;
        reframe.within_header(header_len);
        self.buffer.reframe(reframe)?;
        self.repr.payload_len = payload_len;
        geonet::new_unchecked_mut(self.buffer.payload_mut()).set_payload_len(payload_len);
        Ok(())
    }
}

/// The payload length field is 16 bits wide.
fn payload_len_field(len: usize) -> core::result::Result<u16, PayloadError> {
    u16::try_from(len).map_err(|_| PayloadError::BadSize)
}

impl<T: Payload> fmt::Display for Packet<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = &self.repr;
        write!(f, "GN rhl={}/{} nh={:?} tc={:#04x} len={}",
               repr.remaining_hop_limit, repr.max_hop_limit, repr.next_header,
               repr.traffic_class.to_byte(), repr.payload_len)?;
        match &repr.extended {
            ExtendedRepr::GeoUnicast(header) => write!(f, " GUC sn={} src={} dst={}",
                header.sequence_number, header.source.address(), header.destination.address),
        }
    }
}
