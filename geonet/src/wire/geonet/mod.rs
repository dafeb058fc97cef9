//! GeoNetworking headers as defined in EN 302 636-4-1.
//!
//! Every packet starts with a 4 byte basic header followed by an 8 byte common header. The common
//! header names the extended header that follows and the protocol of the payload:
//!
//! ```text
//! +--------------+---------------+-------------------+-----------------+
//! | Basic Header | Common Header | Extended Header   | Payload (BTP)   |
//! |      4       |       8       | e.g. GUC: 48      | payload_length  |
//! +--------------+---------------+-------------------+-----------------+
//! ```
//!
//! The extended header types understood by this crate are listed in the [`registry`]. All
//! multi-byte fields are in network byte order and bit fields are packed most significant first,
//! independent of the host.
//!
//! [`registry`]: registry/index.html
mod address;
mod header;
mod packet;
mod position;
pub mod guc;
pub mod registry;

pub use self::address::{Address, Mid, StationType};
pub use self::header::{
    BasicNextHeader,
    HeaderType,
    Lifetime,
    NextHeader,
    SequenceNumber,
    TrafficClass,
    PROTOCOL_VERSION};
pub use self::packet::{
    geonet,
    ExtendedRepr,
    Packet,
    Repr,
    HEADER_LEN};
pub use self::position::{LongPositionVector, ShortPositionVector};
pub use self::registry::{Extended, HeaderInfo, Offsets};
