//! The tunable parameters of a GeoNetworking router.
//!
//! The parameters are plain fields of [`Settings`]. For configuration surfaces that address them
//! by name, such as a management protocol or the command line, the same fields are reachable
//! through [`Settings::get`] and [`Settings::set`] with an enumerated key.
//!
//! [`Settings`]: struct.Settings.html
//! [`Settings::get`]: struct.Settings.html#method.get
//! [`Settings::set`]: struct.Settings.html#method.set
use core::fmt;

use crate::layer::{Error, Result};
use crate::time::Duration;
use crate::wire::geonet::{StationType, TrafficClass, PROTOCOL_VERSION};

/// The GeoUnicast forwarding algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Forwarding {
    /// Greedy forwarding towards the neighbour closest to the destination.
    Greedy,
    /// Contention based forwarding, not supported.
    ContentionBased,
}

/// Router parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Whether the station moves, advertised in the common header.
    pub is_mobile: bool,
    /// Maximum hop limit of originated packets.
    pub default_hop_limit: u8,
    /// Upper bound for the lifetime of any packet.
    pub max_packet_lifetime: Duration,
    /// Lifetime of originated packets.
    pub default_packet_lifetime: Duration,
    /// Lifetime of a Location Table entry after the last packet of its station.
    pub lifetime_locte: Duration,
    /// Maximum payload length of a packet.
    pub max_sdu_size: u16,
    /// Maximum length of all GeoNetworking headers of a packet.
    pub max_gn_header_size: u16,
    /// GeoUnicast forwarding algorithm.
    pub guc_forwarding: Forwarding,
    /// Size of the GeoUnicast forwarding buffer in KiB.
    pub uc_forwarding_packet_buffer_size: u16,
    /// Assumed radio range in meters.
    pub default_max_communication_range: u16,
    /// Beacon interval.
    pub beacon_retransmit_timer: Duration,
    /// Maximum random delay added to the beacon interval.
    pub beacon_max_jitter: Duration,
    /// Interval between location service requests.
    pub location_service_retransmit_timer: Duration,
    /// Number of location service requests before giving up.
    pub location_service_max_retransmit: u8,
    /// Size of the location service buffer in bytes.
    pub location_service_packet_buffer_size: u16,
    /// Maximum packet data rate of a neighbour in KiB/s.
    pub max_packet_data_rate: u32,
    /// Weight of the packet data rate average in percent.
    pub max_packet_data_rate_ema_beta: u8,
    /// Station type of addresses configured for links.
    pub station_type: StationType,
    /// The protocol version spoken.
    pub protocol_version: u8,
    /// Traffic class of originated packets.
    pub traffic_class: TrafficClass,
}

/// The name of a parameter.
///
/// Each key names the field of `Settings` with the same name.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Setting {
    IsMobile,
    DefaultHopLimit,
    MaxPacketLifetime,
    DefaultPacketLifetime,
    LifetimeLocte,
    MaxSduSize,
    MaxGnHeaderSize,
    GucForwarding,
    UcForwardingPacketBufferSize,
    DefaultMaxCommunicationRange,
    BeaconRetransmitTimer,
    BeaconMaxJitter,
    LocationServiceRetransmitTimer,
    LocationServiceMaxRetransmit,
    LocationServicePacketBufferSize,
    MaxPacketDataRate,
    MaxPacketDataRateEmaBeta,
    StationType,
    ProtocolVersion,
    TrafficClass,
}

/// The value of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    /// A flag.
    Bool(bool),
    /// A count or size.
    Number(u32),
    /// A time span.
    Duration(Duration),
    /// The forwarding algorithm.
    Forwarding(Forwarding),
    /// A station type.
    StationType(StationType),
    /// A traffic class.
    TrafficClass(TrafficClass),
}

impl Settings {
    /// All keys, in declaration order.
    pub const KEYS: [Setting; 20] = [
        Setting::IsMobile,
        Setting::DefaultHopLimit,
        Setting::MaxPacketLifetime,
        Setting::DefaultPacketLifetime,
        Setting::LifetimeLocte,
        Setting::MaxSduSize,
        Setting::MaxGnHeaderSize,
        Setting::GucForwarding,
        Setting::UcForwardingPacketBufferSize,
        Setting::DefaultMaxCommunicationRange,
        Setting::BeaconRetransmitTimer,
        Setting::BeaconMaxJitter,
        Setting::LocationServiceRetransmitTimer,
        Setting::LocationServiceMaxRetransmit,
        Setting::LocationServicePacketBufferSize,
        Setting::MaxPacketDataRate,
        Setting::MaxPacketDataRateEmaBeta,
        Setting::StationType,
        Setting::ProtocolVersion,
        Setting::TrafficClass,
    ];

    /// Read a parameter.
    pub fn get(&self, setting: Setting) -> Value {
        match setting {
            Setting::IsMobile => Value::Bool(self.is_mobile),
            Setting::DefaultHopLimit => Value::Number(self.default_hop_limit.into()),
            Setting::MaxPacketLifetime => Value::Duration(self.max_packet_lifetime),
            Setting::DefaultPacketLifetime => Value::Duration(self.default_packet_lifetime),
            Setting::LifetimeLocte => Value::Duration(self.lifetime_locte),
            Setting::MaxSduSize => Value::Number(self.max_sdu_size.into()),
            Setting::MaxGnHeaderSize => Value::Number(self.max_gn_header_size.into()),
            Setting::GucForwarding => Value::Forwarding(self.guc_forwarding),
            Setting::UcForwardingPacketBufferSize =>
                Value::Number(self.uc_forwarding_packet_buffer_size.into()),
            Setting::DefaultMaxCommunicationRange =>
                Value::Number(self.default_max_communication_range.into()),
            Setting::BeaconRetransmitTimer => Value::Duration(self.beacon_retransmit_timer),
            Setting::BeaconMaxJitter => Value::Duration(self.beacon_max_jitter),
            Setting::LocationServiceRetransmitTimer =>
                Value::Duration(self.location_service_retransmit_timer),
            Setting::LocationServiceMaxRetransmit =>
                Value::Number(self.location_service_max_retransmit.into()),
            Setting::LocationServicePacketBufferSize =>
                Value::Number(self.location_service_packet_buffer_size.into()),
            Setting::MaxPacketDataRate => Value::Number(self.max_packet_data_rate),
            Setting::MaxPacketDataRateEmaBeta =>
                Value::Number(self.max_packet_data_rate_ema_beta.into()),
            Setting::StationType => Value::StationType(self.station_type),
            Setting::ProtocolVersion => Value::Number(self.protocol_version.into()),
            Setting::TrafficClass => Value::TrafficClass(self.traffic_class),
        }
    }

    /// Change a parameter.
    ///
    /// Fails with `Illegal`, leaving the settings unchanged, if the value is of the wrong kind or
    /// out of range for the parameter. Lifetimes can not exceed `max_packet_lifetime`, only greedy
    /// forwarding and the implemented protocol version are accepted.
    pub fn set(&mut self, setting: Setting, value: Value) -> Result<()> {
        match (setting, value) {
            (Setting::IsMobile, Value::Bool(flag)) => self.is_mobile = flag,
            (Setting::DefaultHopLimit, Value::Number(n)) => self.default_hop_limit = narrow(n)?,
            (Setting::MaxPacketLifetime, Value::Duration(d)) => {
                if d < self.default_packet_lifetime {
                    return Err(Error::Illegal);
                }
                self.max_packet_lifetime = d;
            },
            (Setting::DefaultPacketLifetime, Value::Duration(d)) => {
                if d > self.max_packet_lifetime {
                    return Err(Error::Illegal);
                }
                self.default_packet_lifetime = d;
            },
            (Setting::LifetimeLocte, Value::Duration(d)) => self.lifetime_locte = d,
            (Setting::MaxSduSize, Value::Number(n)) => self.max_sdu_size = narrow(n)?,
            (Setting::MaxGnHeaderSize, Value::Number(n)) => self.max_gn_header_size = narrow(n)?,
            (Setting::GucForwarding, Value::Forwarding(Forwarding::Greedy)) =>
                self.guc_forwarding = Forwarding::Greedy,
            (Setting::UcForwardingPacketBufferSize, Value::Number(n)) =>
                self.uc_forwarding_packet_buffer_size = narrow(n)?,
            (Setting::DefaultMaxCommunicationRange, Value::Number(n)) =>
                self.default_max_communication_range = narrow(n)?,
            (Setting::BeaconRetransmitTimer, Value::Duration(d)) => self.beacon_retransmit_timer = d,
            (Setting::BeaconMaxJitter, Value::Duration(d)) => self.beacon_max_jitter = d,
            (Setting::LocationServiceRetransmitTimer, Value::Duration(d)) =>
                self.location_service_retransmit_timer = d,
            (Setting::LocationServiceMaxRetransmit, Value::Number(n)) =>
                self.location_service_max_retransmit = narrow(n)?,
            (Setting::LocationServicePacketBufferSize, Value::Number(n)) =>
                self.location_service_packet_buffer_size = narrow(n)?,
            (Setting::MaxPacketDataRate, Value::Number(n)) => self.max_packet_data_rate = n,
            (Setting::MaxPacketDataRateEmaBeta, Value::Number(n)) if n <= 100 =>
                self.max_packet_data_rate_ema_beta = narrow(n)?,
            (Setting::StationType, Value::StationType(st)) => self.station_type = st,
            (Setting::ProtocolVersion, Value::Number(n)) if n == u32::from(PROTOCOL_VERSION) =>
                self.protocol_version = PROTOCOL_VERSION,
            (Setting::TrafficClass, Value::TrafficClass(tc)) => self.traffic_class = tc,
            _ => return Err(Error::Illegal),
        }
        Ok(())
    }
}

fn narrow<T: core::convert::TryFrom<u32>>(value: u32) -> Result<T> {
    T::try_from(value).map_err(|_| Error::Illegal)
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            is_mobile: false,
            default_hop_limit: 10,
            max_packet_lifetime: Duration::from_secs(600),
            default_packet_lifetime: Duration::from_secs(60),
            lifetime_locte: Duration::from_secs(20),
            max_sdu_size: 1398,
            max_gn_header_size: 88,
            guc_forwarding: Forwarding::Greedy,
            uc_forwarding_packet_buffer_size: 256,
            default_max_communication_range: 1000,
            beacon_retransmit_timer: Duration::from_millis(3000),
            beacon_max_jitter: Duration::from_millis(750),
            location_service_retransmit_timer: Duration::from_millis(1000),
            location_service_max_retransmit: 10,
            location_service_packet_buffer_size: 1024,
            max_packet_data_rate: 100,
            max_packet_data_rate_ema_beta: 90,
            station_type: StationType::Unspecified,
            protocol_version: PROTOCOL_VERSION,
            traffic_class: TrafficClass::default(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Bool(flag) => write!(f, "{}", flag),
            Value::Number(n) => write!(f, "{}", n),
            Value::Duration(d) => write!(f, "{}ms", d.as_millis()),
            Value::Forwarding(fwd) => write!(f, "{:?}", fwd),
            Value::StationType(st) => write!(f, "{:?}", st),
            Value::TrafficClass(tc) => write!(f, "{:#04x}", tc.to_byte()),
        }
    }
}
