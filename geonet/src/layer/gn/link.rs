//! Binding of local devices to GeoNetworking addresses.
use crate::layer::{Error, Result};
use crate::managed::Ordered;
use crate::wire::geonet::{Address, Mid, StationType};

/// Identifies a local network device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DeviceId(pub u16);

/// How the address of a link is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// A random MID is drawn on creation and whenever another station uses the same MID.
    Auto,
    /// The address is assigned by the management entity.
    Managed,
    /// A temporary pseudonym.
    Anonymous,
}

/// A device and the GeoNetworking address assigned to it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Link {
    device: DeviceId,
    address: Address,
}

/// The registry of local addresses, one per device.
#[derive(Debug)]
pub struct Links<'a> {
    storage: Ordered<'a, Link>,
}

/// A small, fast, non-cryptographic random generator.
///
/// Xoroshiro256** by Blackman and Vigna. The state is expanded from the seed with SplitMix64 so
/// that any seed, including zero, gives a usable generator.
#[derive(Debug, Clone)]
pub struct Xoroshiro256 {
    state: [u64; 4],
}

impl<'a> Links<'a> {
    /// Create an empty registry backed by `storage`.
    pub fn new<T>(storage: T) -> Self
        where T: Into<Ordered<'a, Link>>
    {
        Links { storage: storage.into() }
    }

    /// Bind `address` to `device`, replacing an earlier binding of the device.
    pub fn insert(&mut self, device: DeviceId, address: Address) -> Result<()> {
        if let Some(link) = self.find_device_mut(device) {
            link.address = address;
            return Ok(());
        }

        let free = self.storage.init().ok_or(Error::Exhausted)?;
        *free = Link { device, address };
        self.storage.push().ok_or(Error::Exhausted)?;
        Ok(())
    }

    /// The address bound to a device.
    pub fn address(&self, device: DeviceId) -> Option<Address> {
        self.storage
            .binary_search_by_key(&device, |link| link.device)
            .ok()
            .map(|idx| self.storage[idx].address)
    }

    /// Find the link whose address has the MID `mid`.
    pub fn find_mid(&self, mid: Mid) -> Option<&Link> {
        self.storage.iter().find(|link| link.address.mid() == mid)
    }

    /// If `address` is one of the local addresses.
    pub fn owns(&self, address: Address) -> bool {
        self.find_mid(address.mid()).is_some()
    }

    /// Iterate all links, by device.
    pub fn iter(&self) -> impl Iterator<Item=&Link> + '_ {
        self.storage.iter()
    }

    /// The number of links.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// If no device has an address.
    pub fn is_empty(&self) -> bool {
        self.storage.len() == 0
    }

    /// Replace the MID of the link currently using `mid`.
    ///
    /// Station type and country code stay the same. Returns the new address.
    pub(crate) fn replace_mid(&mut self, mid: Mid, fresh: Mid) -> Option<Address> {
        let link = self.storage.iter_mut().find(|link| link.address.mid() == mid)?;
        link.address = link.address.with_mid(fresh);
        Some(link.address)
    }

    fn find_device_mut(&mut self, device: DeviceId) -> Option<&mut Link> {
        let idx = self.storage
            .binary_search_by_key(&device, |link| link.device)
            .ok()?;
        self.storage.get_mut(idx)
    }
}

impl Link {
    /// The device of the link.
    pub fn device(&self) -> DeviceId {
        self.device
    }

    /// The address of the link.
    pub fn address(&self) -> Address {
        self.address
    }
}

impl PartialEq for Link {
    fn eq(&self, other: &Link) -> bool {
        self.device == other.device
    }
}

impl Eq for Link { }

impl PartialOrd for Link {
    fn partial_cmp(&self, other: &Link) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Link {
    fn cmp(&self, other: &Link) -> core::cmp::Ordering {
        self.device.cmp(&other.device)
    }
}

impl Method {
    /// Create the address for a new link.
    ///
    /// Only `Auto` is supported, the other methods always fail with `Illegal`.
    pub fn configure(
        self,
        rng: &mut Xoroshiro256,
        station_type: StationType,
        country_code: u16,
    ) -> Result<Address> {
        match self {
            Method::Auto => Ok(Address::new(false, station_type, country_code, random_mid(rng))),
            Method::Managed | Method::Anonymous => Err(Error::Illegal),
        }
    }
}

/// Draw a MID usable as a unicast, locally administered link layer address.
pub fn random_mid(rng: &mut Xoroshiro256) -> Mid {
    const LOCAL: u64 = 0x02 << 40;
    const GROUP: u64 = 0x01 << 40;
    Mid::new((rng.next() & !GROUP) | LOCAL)
}

impl Xoroshiro256 {
    /// Seed a new generator.
    pub fn new(seed: u64) -> Self {
        let mut split = seed;
        let mut state = [0; 4];
        for word in state.iter_mut() {
            *word = splitmix64(&mut split);
        }
        Xoroshiro256 { state }
    }

    /// The next random value.
    pub fn next(&mut self) -> u64 {
        let s = &mut self.state;
        let result = s[1]
            .wrapping_mul(5)
            .rotate_left(7)
            .wrapping_mul(9);

        let t = s[1] << 17;

        s[2] ^= s[0];
        s[3] ^= s[1];
        s[1] ^= s[2];
        s[0] ^= s[3];

        s[2] ^= t;

        s[3] = s[3].rotate_left(45);

        result
    }
}

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn methods() {
        let mut rng = Xoroshiro256::new(0);
        let address = Method::Auto.configure(&mut rng, StationType::Tram, 42).unwrap();
        assert_eq!(address.station_type(), StationType::Tram);
        assert_eq!(address.country_code(), 42);
        assert!(!address.manual());

        assert_eq!(Method::Managed.configure(&mut rng, StationType::Tram, 42), Err(Error::Illegal));
        assert_eq!(Method::Anonymous.configure(&mut rng, StationType::Tram, 42), Err(Error::Illegal));
    }

    #[test]
    fn random_mids_are_unicast() {
        let mut rng = Xoroshiro256::new(7);
        let mut previous = None;
        for _ in 0..64 {
            let mid = random_mid(&mut rng);
            let mac = mid.link_address();
            assert!(!mac.is_multicast());
            assert!(!mac.is_broadcast());
            assert_eq!(mac.0[0] & 0x02, 0x02);
            assert_ne!(Some(mid), previous);
            previous = Some(mid);
        }
    }

    #[test]
    fn registry() {
        let mut storage = [Link::default(); 2];
        let mut links = Links::new(&mut storage[..]);
        let a = Address::new(false, StationType::Bus, 1, Mid::new(0x02_00_00_00_00_0a));
        let b = Address::new(false, StationType::Bus, 1, Mid::new(0x02_00_00_00_00_0b));
        let c = Address::new(false, StationType::Bus, 1, Mid::new(0x02_00_00_00_00_0c));

        links.insert(DeviceId(1), a).unwrap();
        links.insert(DeviceId(0), b).unwrap();
        assert_eq!(links.insert(DeviceId(2), c), Err(Error::Exhausted));
        // Rebinding a device does not need space.
        links.insert(DeviceId(1), c).unwrap();

        assert_eq!(links.len(), 2);
        assert_eq!(links.address(DeviceId(1)), Some(c));
        assert!(links.owns(b));
        assert!(!links.owns(a));
        assert_eq!(links.iter().map(Link::device).collect::<Vec<_>>(), [DeviceId(0), DeviceId(1)]);

        let fresh = links.replace_mid(b.mid(), Mid::new(0x02_00_00_00_00_0d)).unwrap();
        assert_eq!(fresh.station_type(), StationType::Bus);
        assert_eq!(fresh.country_code(), 1);
        assert_eq!(links.address(DeviceId(0)), Some(fresh));
        assert!(!links.owns(b));
    }
}
