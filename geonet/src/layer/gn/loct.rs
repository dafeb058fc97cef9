//! The Location Table.
//!
//! Every GeoNetworking router keeps a table of the stations it has heard of, directly or through
//! forwarders. An entry holds the last position vector a station advertised and the sequence
//! number and timestamp of the last packet accepted from it, the latter being the key for
//! duplicate packet detection.
use core::ops::Deref;

use crate::managed::Ordered;
use crate::time::{Duration, Expiration, Instant, Timestamp};
use crate::wire::geonet::{Address, LongPositionVector, Mid, SequenceNumber, StationType, PROTOCOL_VERSION};

/// An entry of the Location Table.
///
/// Entries are identified by the MID of their address. The address is fixed once the entry was
/// created, everything else is updated with each packet accepted from the station.
#[derive(Debug, Clone, Copy)]
pub struct Entry {
    address: Address,
    /// The station type as last advertised in the source address.
    pub station_type: StationType,
    /// The GeoNetworking protocol version of the station.
    pub version: u8,
    /// The last known position vector.
    pub position: LongPositionVector,
    /// A location service request for this station is in progress.
    pub location_service_pending: bool,
    /// The station was heard directly, not through a forwarder.
    pub is_neighbour: bool,
    /// Sequence number of the last accepted packet.
    pub sequence_number: SequenceNumber,
    /// Source timestamp of the last accepted packet.
    pub timestamp: Timestamp,
    /// Estimate of the packet data rate of the station, in bytes per second.
    pub packet_data_rate: u32,
    expires_at: Expiration,
}

/// Errors of table operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// There was no space to add the entry.
    NoSpace,

    /// Entry could not be found in the storage.
    EntryNotFound,
}

/// A Location Table backed by an ordered slice.
///
/// # Examples
///
/// ```
/// use geonet::layer::gn::{LocationTable, LocationEntry};
///
/// let mut storage = [LocationEntry::default(); 16];
/// let table = LocationTable::new(&mut storage[..]);
/// assert_eq!(table.len(), 0);
/// ```
#[derive(Debug)]
pub struct LocationTable<'a> {
    storage: Ordered<'a, Entry>,
}

/// The read-only part of the Location Table.
///
/// The entries are sorted by MID so that lookups are a binary search.
#[derive(Debug)]
#[repr(transparent)]
pub struct Table([Entry]);

impl<'a> LocationTable<'a> {
    /// Create a table.
    ///
    /// The backing storage is created logically empty.
    pub fn new<T>(storage: T) -> Self
        where T: Into<Ordered<'a, Entry>>
    {
        LocationTable { storage: storage.into() }
    }

    /// The number of entries that fit into the table.
    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    /// Find an entry for mutation.
    pub fn find_mut(&mut self, address: Address) -> Option<&mut Entry> {
        let idx = self.position(address).ok()?;
        self.storage.get_mut(idx)
    }

    /// Get the entry of `address`, creating an empty one if there is none.
    ///
    /// An existing entry is returned unchanged. Fails with `NoSpace` if the storage is full.
    pub fn add(&mut self, address: Address) -> Result<&mut Entry, Error> {
        let idx = match self.position(address) {
            Ok(idx) => idx,
            Err(_) => {
                let free = self.storage.init().ok_or(Error::NoSpace)?;
                *free = Entry::new(address);
                net_debug!("loct: new entry {}", address);
                self.storage.push().ok_or(Error::NoSpace)?
            },
        };

        self.storage.get_mut(idx).ok_or(Error::EntryNotFound)
    }

    /// Overwrite an entry with the information of an accepted packet.
    ///
    /// Fails with `EntryNotFound` if the station has no entry, it must be added first. Clears the
    /// location service pending flag.
    pub fn update(
        &mut self,
        address: Address,
        position: LongPositionVector,
        is_neighbour: bool,
        sequence_number: SequenceNumber,
        station_type: StationType,
        timestamp: Timestamp,
    ) -> Result<&mut Entry, Error> {
        let entry = self.find_mut(address).ok_or(Error::EntryNotFound)?;
        entry.position = position;
        entry.is_neighbour = is_neighbour;
        entry.sequence_number = sequence_number;
        entry.station_type = station_type;
        entry.timestamp = timestamp;
        entry.location_service_pending = false;
        Ok(entry)
    }

    /// Remove the entry of a station.
    pub fn remove(&mut self, address: Address) -> Result<Entry, Error> {
        let idx = self.position(address).map_err(|_| Error::EntryNotFound)?;
        let entry = self.storage[idx];
        self.storage.pop(idx).ok_or(Error::EntryNotFound)?;
        Ok(entry)
    }

    /// Remove all entries whose lifetime ended before `now`.
    ///
    /// Returns the number of removed entries.
    pub fn expire(&mut self, now: Instant) -> usize {
        let before = self.storage.len();
        self.storage.retain(|entry| entry.is_alive(now));
        let removed = before - self.storage.len();
        if removed > 0 {
            net_debug!("loct: expired {} entries", removed);
        }
        removed
    }

    fn position(&self, address: Address) -> Result<usize, usize> {
        let mid = address.mid();
        self.storage.ordered_slice()
            .binary_search_by_key(&mid, |entry| entry.address.mid())
    }
}

impl Table {
    fn from_slice(data: &[Entry]) -> &Self {
        // SAFETY: this is safe due to repr(transparent)
        unsafe { &*(data as *const [Entry] as *const Self) }
    }

    /// Find the entry of a station, by its MID.
    pub fn find(&self, address: Address) -> Option<&Entry> {
        self.find_mid(address.mid())
    }

    /// Find the entry of a station by the MID alone.
    pub fn find_mid(&self, mid: Mid) -> Option<&Entry> {
        let idx = self.0
            .binary_search_by_key(&mid, |entry| entry.address.mid())
            .ok()?;
        self.0.get(idx)
    }

    /// All entries of stations heard directly.
    pub fn neighbours(&self) -> impl Iterator<Item=&Entry> + '_ {
        self.0.iter().filter(|entry| entry.is_neighbour)
    }
}

impl Entry {
    fn new(address: Address) -> Self {
        Entry {
            address,
            station_type: address.station_type(),
            ..Entry::default()
        }
    }

    /// The address of the station.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The link layer address, always the MID of the address.
    pub fn link_address(&self) -> Mid {
        self.address.mid()
    }

    /// The time after which the entry is removed.
    pub fn expires_at(&self) -> Expiration {
        self.expires_at
    }

    /// Extend the lifetime of the entry to `lifetime` after `now`.
    pub fn renew(&mut self, now: Instant, lifetime: Duration) {
        self.expires_at = Expiration::When(now + lifetime);
    }

    /// If the entry is still valid at `now`.
    pub fn is_alive(&self, now: Instant) -> bool {
        Expiration::When(now) <= self.expires_at
    }
}

impl Default for Entry {
    fn default() -> Self {
        Entry {
            address: Address::default(),
            station_type: StationType::Unspecified,
            version: PROTOCOL_VERSION,
            position: LongPositionVector::default(),
            location_service_pending: false,
            is_neighbour: false,
            sequence_number: SequenceNumber(0),
            timestamp: Timestamp::default(),
            packet_data_rate: 0,
            expires_at: Expiration::Never,
        }
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Entry) -> bool {
        self.address == other.address
    }
}

impl Eq for Entry { }

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Entry) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Entry) -> core::cmp::Ordering {
        self.address.cmp(&other.address)
    }
}

impl Deref for LocationTable<'_> {
    type Target = Table;

    fn deref(&self) -> &Table {
        Table::from_slice(self.storage.ordered_slice())
    }
}

impl Deref for Table {
    type Target = [Entry];

    fn deref(&self) -> &[Entry] {
        &self.0
    }
}
