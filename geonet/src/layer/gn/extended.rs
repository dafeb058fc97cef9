//! Per extended header processing.
//!
//! The common header is handled the same for every packet. What happens afterwards depends on the
//! extended header: who the destination is, whether the Location Table learns about the source,
//! and how the next hop is chosen. Each header type implements [`ExtendedHeader`] and the
//! functions in this module dispatch on the parsed representation.
use crate::layer::Result;
use crate::time::Instant;
use crate::wire::EthernetAddress;
use crate::wire::geonet::{Address, Extended, ExtendedRepr, Repr, SequenceNumber};

use super::counters::{Counters, Discard};
use super::guc::GeoUnicast;
use super::link::{Links, Xoroshiro256};
use super::loct::LocationTable;
use super::management::Management;
use super::packet::Init;
use super::settings::Settings;

/// The endpoint state borrowed for handling one packet.
pub(crate) struct Context<'r, 'a> {
    pub(crate) locations: &'r mut LocationTable<'a>,
    pub(crate) links: &'r mut Links<'a>,
    pub(crate) settings: &'r Settings,
    pub(crate) management: &'r dyn Management,
    pub(crate) rng: &'r mut Xoroshiro256,
    /// The sequence number of the next originated packet, advanced once it was emitted.
    pub(crate) sequence: SequenceNumber,
    pub(crate) counters: &'r mut Counters,
    pub(crate) now: Instant,
    /// Hardware address of the device, changed when its address is regenerated.
    pub(crate) link_address: EthernetAddress,
}

/// The verdict on a received packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Inbound {
    /// Hand the payload to the transport.
    Deliver,
    /// Send the packet on, in place, to this hardware address.
    Forward(EthernetAddress),
    /// Drop the packet.
    Discard(Discard),
}

/// The extended header of an originated packet and where to send it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Push {
    pub(crate) source: Address,
    pub(crate) extended: ExtendedRepr,
    pub(crate) link_destination: EthernetAddress,
}

pub(crate) trait ExtendedHeader {
    /// The parsed representation of the extended header.
    type Header;

    /// Decide on a received packet whose common header passed all checks.
    fn inbound(ctx: &mut Context, common: &Repr, header: &Self::Header) -> Inbound;

    /// Build the extended header of a packet to originate.
    fn push(ctx: &mut Context, init: &Init) -> Result<Push>;
}

pub(crate) fn inbound(ctx: &mut Context, common: &Repr) -> Inbound {
    match &common.extended {
        ExtendedRepr::GeoUnicast(header) => GeoUnicast::inbound(ctx, common, header),
    }
}

pub(crate) fn push(ctx: &mut Context, init: &Init) -> Result<Push> {
    match init.header {
        Extended::GeoUnicast => GeoUnicast::push(ctx, init),
    }
}
