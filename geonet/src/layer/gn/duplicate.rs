//! Duplicate packet detection.
//!
//! A packet is identified by its source together with the sequence number and timestamp of the
//! source. Both values wrap around, so a value is newer than another if it is ahead by at most
//! half of its range. The timestamp takes precedence, the sequence number only decides between
//! packets of the same timestamp.
use crate::time::Timestamp;
use crate::wire::geonet::{geonet, Address, SequenceNumber};

use super::loct::LocationTable;

/// The outcome of duplicate detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Freshness {
    /// Not seen before, continue processing.
    Fresh,
    /// Already processed, discard silently.
    Duplicate,
}

/// The detection key could not be read from the packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MissingField;

/// Detect duplicates of a packet with the layout of its extended header.
///
/// Headers carrying a sequence number use the sequence number and timestamp test, those that only
/// carry a timestamp use the timestamp test alone. A header without source address or timestamp
/// can not be checked.
pub fn detect(table: &mut LocationTable, packet: &geonet) -> Result<Freshness, MissingField> {
    let source = packet.fetch_source_address().ok_or(MissingField)?;
    let timestamp = packet.fetch_timestamp().ok_or(MissingField)?;
    Ok(match packet.fetch_sequence_number() {
        Some(sequence_number) => detect_sntst(table, source, sequence_number, timestamp),
        None => detect_tst(table, source, timestamp),
    })
}

/// The sequence number and timestamp based test.
///
/// A station without entry was not heard before, its packet is fresh. A fresh packet refreshes
/// the stored sequence number and timestamp of an existing entry.
pub fn detect_sntst(
    table: &mut LocationTable,
    source: Address,
    sequence_number: SequenceNumber,
    timestamp: Timestamp,
) -> Freshness {
    let entry = match table.find_mut(source) {
        Some(entry) => entry,
        None => return Freshness::Fresh,
    };

    let fresh = timestamp.is_newer_than(entry.timestamp)
        || (timestamp == entry.timestamp && sequence_number.is_newer_than(entry.sequence_number));

    if fresh {
        entry.timestamp = timestamp;
        entry.sequence_number = sequence_number;
        Freshness::Fresh
    } else {
        net_trace!("dpd: duplicate {} {} from {}", timestamp, sequence_number, source);
        Freshness::Duplicate
    }
}

/// The timestamp based test, for headers without sequence number.
pub fn detect_tst(
    table: &mut LocationTable,
    source: Address,
    timestamp: Timestamp,
) -> Freshness {
    let entry = match table.find_mut(source) {
        Some(entry) => entry,
        None => return Freshness::Fresh,
    };

    if timestamp.is_newer_than(entry.timestamp) {
        entry.timestamp = timestamp;
        Freshness::Fresh
    } else {
        net_trace!("dpd: duplicate {} from {}", timestamp, source);
        Freshness::Duplicate
    }
}
