//! The static table of extended header types.
//!
//! Every `(header type, subtype)` pair of the common header indexes the table. Only pairs with a
//! registered variant of [`Extended`] are understood; a packet with any other pair is discarded.
//! Supporting a new header type means adding a variant and its `HeaderInfo`, the dispatch in the
//! endpoint then becomes non-exhaustive until it is handled.
//!
//! [`Extended`]: enum.Extended.html
use super::{HeaderType, guc, position};

/// Number of header type values covered by the table.
pub const HEADER_COUNT: usize = 7;

/// Number of subtype values covered by the table.
pub const SUBHEADER_COUNT: usize = 3;

/// The extended header types that are implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extended {
    /// A GeoUnicast header, type 2 subtype 0.
    GeoUnicast,
}

/// Layout information about one extended header type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeaderInfo {
    /// The header type nibble.
    pub header: HeaderType,
    /// The subtype nibble.
    pub subheader: u8,
    /// Size of the extended header in bytes.
    pub size: usize,
    /// Positions of the fields used for duplicate detection.
    pub offsets: Offsets,
}

/// Byte offsets within an extended header.
///
/// A field that the header type does not carry is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Offsets {
    /// The source address, start of the source position vector.
    pub source_address: Option<usize>,
    /// The 16-bit sequence number.
    pub sequence_number: Option<usize>,
    /// The 32-bit timestamp of the source position vector.
    pub timestamp: Option<usize>,
}

static GEO_UNICAST: HeaderInfo = HeaderInfo {
    header: HeaderType::GeoUnicast,
    subheader: 0,
    size: guc::HEADER_LEN,
    offsets: Offsets {
        source_address: Some(guc::SOURCE_OFFSET),
        sequence_number: Some(guc::SEQUENCE_NUMBER_OFFSET),
        timestamp: Some(guc::SOURCE_OFFSET + position::TIMESTAMP_OFFSET),
    },
};

static LOOKUP: [[Option<Extended>; SUBHEADER_COUNT]; HEADER_COUNT] = [
    /* Any */             [None, None, None],
    /* Beacon */          [None, None, None],
    /* GeoUnicast */      [Some(Extended::GeoUnicast), None, None],
    /* GeoAnycast */      [None, None, None],
    /* GeoBroadcast */    [None, None, None],
    /* TopoBroadcast */   [None, None, None],
    /* LocationService */ [None, None, None],
];

impl Extended {
    /// Find the registered header type for the nibbles of the common header.
    ///
    /// This is total over all nibble values. Out of range or unregistered pairs are `None`.
    pub fn lookup(header: u8, subheader: u8) -> Option<Self> {
        LOOKUP.get(usize::from(header))?
            .get(usize::from(subheader))
            .cloned()
            .flatten()
    }

    /// The layout of this header type.
    pub fn info(self) -> &'static HeaderInfo {
        match self {
            Extended::GeoUnicast => &GEO_UNICAST,
        }
    }

    /// The header type and subtype nibbles.
    pub fn type_nibbles(self) -> (u8, u8) {
        let info = self.info();
        (info.header.into(), info.subheader)
    }
}

/// Look up the layout of a header type, `None` for unregistered pairs.
pub fn lookup(header: u8, subheader: u8) -> Option<&'static HeaderInfo> {
    Extended::lookup(header, subheader).map(Extended::info)
}

/// The length of the extended header, `None` for unregistered pairs.
pub fn extended_header_length(header: u8, subheader: u8) -> Option<usize> {
    lookup(header, subheader).map(|info| info.size)
}
