use core::fmt;

use crate::wire;

/// Why a received packet was not delivered or forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Discard {
    /// The buffer is shorter than the headers and payload claim.
    Truncated,
    /// The extended header type is not registered, or the basic next header is unknown.
    Unrecognized,
    /// A foreign protocol version or a secured packet.
    Unsupported,
    /// The remaining hop limit exceeds the maximum hop limit.
    Malformed,
    /// One of our own packets, repeated by another station.
    OwnPacket,
    /// Already processed.
    Duplicate,
    /// The duplicate detection key could not be read.
    MissingField,
    /// The Location Table has no space for the source.
    LocationTableFull,
    /// The packet is for us, but no transport is selected or the selected one is unavailable.
    NoTransport,
    /// Forwarding would exhaust the hop limit.
    HopLimit,
    /// Forwarding requires our own position, which is unknown.
    NoPosition,
    /// Forwarding requires a buffer, which is not available.
    NoRoute,
    /// The device refused to queue the forwarded packet.
    Queue,
}

/// Statistics of a GeoNetworking endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    /// Packets handed to the upper layer.
    pub delivered: u64,
    /// Packets forwarded towards their destination.
    pub forwarded: u64,
    /// Packets originated and queued.
    pub sent: u64,
    /// Duplicate packets.
    pub duplicates: u64,
    /// All discarded packets, including duplicates.
    pub discarded: u64,
    /// Addresses regenerated after a collision with another station.
    pub regenerated: u64,
    /// The reason of the most recent discard.
    pub last_discard: Option<Discard>,
}

impl Counters {
    /// Record a discarded packet.
    pub fn discard(&mut self, reason: Discard) {
        net_debug!("gn: discard: {}", reason);
        self.discarded += 1;
        if reason == Discard::Duplicate {
            self.duplicates += 1;
        }
        self.last_discard = Some(reason);
    }
}

impl From<wire::Error> for Discard {
    fn from(err: wire::Error) -> Self {
        match err {
            wire::Error::Truncated => Discard::Truncated,
            wire::Error::Unrecognized => Discard::Unrecognized,
            wire::Error::Malformed => Discard::Malformed,
            wire::Error::Unsupported => Discard::Unsupported,
        }
    }
}

impl fmt::Display for Discard {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let msg = match self {
            Discard::Truncated => "truncated",
            Discard::Unrecognized => "unrecognized header",
            Discard::Unsupported => "unsupported version or security",
            Discard::Malformed => "hop limit above maximum",
            Discard::OwnPacket => "own packet",
            Discard::Duplicate => "duplicate",
            Discard::MissingField => "no duplicate detection key",
            Discard::LocationTableFull => "location table full",
            Discard::NoTransport => "no transport",
            Discard::HopLimit => "hop limit reached",
            Discard::NoPosition => "own position unknown",
            Discard::NoRoute => "no route and no buffer",
            Discard::Queue => "queue failed",
        };
        f.write_str(msg)
    }
}
