//! The GeoNetworking layer.
//!
//! The [`Endpoint`] holds the state of a router: the Location Table of known stations, the
//! addresses of the local links and the router parameters. Like the ethernet endpoint it is
//! borrowed for each batch of packets with [`recv`] or [`send`].
//!
//! ## Receiving
//!
//! Every packet with the GeoNetworking ethertype is parsed and checked first. Packets of a foreign
//! protocol version, secured packets and those with an unknown extended header are dropped.
//! Duplicate detection then consults the Location Table entry of the source. Packets addressed to
//! one of the local links are handed to the receiver, all others are forwarded greedily in place,
//! reusing the receive buffer.
//!
//! No packet is ever dropped silently. The reason of each discard is counted in the
//! [`Counters`] of the endpoint.
//!
//! ## Sending
//!
//! An originated packet is described by an [`Init`]. Its destination must be in the Location
//! Table, as there is no location service. The management entity supplies time and position of
//! the station.
//!
//! ```
//! use geonet::layer::{eth, gn};
//! use geonet::managed::Slice;
//! use geonet::nic::{external::External, Device};
//! use geonet::wire::geonet::{NextHeader, StationType};
//!
//! let mut locations = vec![gn::LocationEntry::default(); 16];
//! let mut links = vec![gn::Link::default(); 1];
//!
//! let mut gn = gn::Endpoint::new(
//!     gn::LocationTable::new(&mut locations[..]),
//!     gn::Links::new(&mut links[..]),
//!     gn::Settings::default());
//! let own = gn.link_add(gn::DeviceId(0), gn::Method::Auto, StationType::PassengerCar, 0)
//!     .unwrap();
//! let mut eth = eth::Endpoint::new(own.link_address());
//!
//! // Nothing is known about the destination yet, the packet is refused.
//! let mut nic = External::new_send(Slice::One(vec![0; 1024]));
//! let mut sender = gn.guc_send(own, NextHeader::BtpB, b"hello");
//! nic.tx(1, eth.send(gn.send(&mut sender))).unwrap();
//! assert!(sender.result().unwrap().is_err());
//! ```
//!
//! [`Endpoint`]: struct.Endpoint.html
//! [`recv`]: struct.Endpoint.html#method.recv
//! [`send`]: struct.Endpoint.html#method.send
//! [`Counters`]: struct.Counters.html
//! [`Init`]: struct.Init.html
use crate::wire::Payload;
use crate::wire::geonet::NextHeader;

mod counters;
pub mod duplicate;
mod endpoint;
mod extended;
pub mod greedy;
mod guc;
mod link;
mod loct;
mod management;
mod packet;
pub mod settings;

#[cfg(test)]
mod tests;

pub use counters::{Counters, Discard};

pub use duplicate::Freshness;

pub use endpoint::{
    Endpoint,
    GucSender,
    Receiver,
    Sender,
};

pub use greedy::{NextHop, Point};

pub use link::{
    random_mid,
    DeviceId,
    Link,
    Links,
    Method,
    Xoroshiro256,
};

pub use loct::{
    Entry as LocationEntry,
    Error as LocationError,
    LocationTable,
    Table as LocationSlice,
};

pub use management::{
    Fixed,
    LocalPosition,
    Management,
    NoManagement,
    SystemClock,
};

pub use packet::{
    Controller,
    GnPacket,
    Init,
    In as InPacket,
    Out as OutPacket,
    Raw as RawPacket,
};

pub use settings::{Forwarding, Setting, Settings, Value};

/// A GeoNetworking receiver.
///
/// Processes packets addressed to one of the local links.
pub trait Recv<P: Payload> {
    /// Inspect one incoming packet.
    fn receive(&mut self, packet: InPacket<P>);
}

/// A GeoNetworking sender.
///
/// Utilize raw packet buffers to originate packets.
pub trait Send<P: Payload> {
    /// Fill in one available packet buffer.
    fn send(&mut self, packet: RawPacket<P>);
}

/// Hands received packets to one of two transports.
///
/// The endpoint only delivers packets whose next header is BTP-A or BTP-B, this selects the
/// receiver for each.
pub struct Transport<A, B> {
    /// Receives BTP-A packets.
    pub btp_a: A,
    /// Receives BTP-B packets.
    pub btp_b: B,
}

impl<P: Payload, E> Recv<P> for &'_ mut E
    where E: Recv<P>
{
    fn receive(&mut self, packet: InPacket<P>) {
        (**self).receive(packet)
    }
}

impl<P: Payload, E> Send<P> for &'_ mut E
    where E: Send<P>
{
    fn send(&mut self, packet: RawPacket<P>) {
        (**self).send(packet)
    }
}

impl<P: Payload, A, B> Recv<P> for Transport<A, B>
where
    A: Recv<P>,
    B: Recv<P>,
{
    fn receive(&mut self, packet: InPacket<P>) {
        match packet.packet.repr().next_header {
            NextHeader::BtpA => self.btp_a.receive(packet),
            NextHeader::BtpB => self.btp_b.receive(packet),
            other => net_debug!("gn: no transport for {:?}", other),
        }
    }
}
