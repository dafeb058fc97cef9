use crate::layer::{Error, Result, eth};
use crate::nic::Info;
use crate::time::Instant;
use crate::wire::{EthernetAddress, EthernetFrame, EthernetProtocol, Payload, PayloadMut};
use crate::wire::geonet::{
    geonet,
    Address,
    Extended,
    Lifetime,
    NextHeader,
    Packet,
    Repr,
    TrafficClass};

/// A GeoNetworking packet within an ethernet frame.
pub type GnPacket<'a, P> = Packet<EthernetFrame<&'a mut P>>;

/// An incoming packet.
///
/// The packet passed duplicate detection and is addressed to one of the local links.
pub struct In<'a, P: Payload> {
    /// A reference to the GeoNetworking endpoint state.
    pub handle: Controller<'a>,
    /// The valid packet inside the buffer.
    pub packet: GnPacket<'a, P>,
}

/// An outgoing packet as prepared by the GeoNetworking layer.
///
/// All headers are initialized but the payload is not. Fill it by grabbing the mutable slice.
#[must_use = "You need to call `send` explicitely on an OutPacket, otherwise no packet is sent."]
pub struct Out<'a, P: Payload> {
    handle: Controller<'a>,
    packet: GnPacket<'a, P>,
}

/// A buffer into which a packet can be placed.
pub struct Raw<'a, P: Payload> {
    /// A reference to the GeoNetworking endpoint state.
    pub handle: Controller<'a>,
    /// A mutable reference to the payload buffer.
    pub payload: &'a mut P,
}

/// A reference to the endpoint of layers below (phy + eth + gn).
pub struct Controller<'a> {
    pub(crate) eth: eth::Controller<'a>,
    pub(crate) endpoint: &'a mut dyn Endpoint,
}

/// Initializer for a packet.
///
/// Fields left at `None` are filled from the settings of the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Init {
    /// The station to reach.
    pub destination: Address,
    /// The extended header to originate.
    pub header: Extended,
    /// The transport protocol of the payload.
    pub next_header: NextHeader,
    /// The traffic class of the packet.
    pub traffic_class: TrafficClass,
    /// The lifetime, capped at the maximum packet lifetime.
    pub lifetime: Option<Lifetime>,
    /// The hop limit.
    pub max_hop_limit: Option<u8>,
    /// The length in bytes that the payload requires.
    pub payload: usize,
}

/// Headers and link addresses of a packet about to be originated.
pub(crate) struct Prepared {
    pub(crate) repr: Repr,
    pub(crate) src_addr: EthernetAddress,
    pub(crate) dst_addr: EthernetAddress,
}

/// The interface to the endpoint.
pub(crate) trait Endpoint {
    /// The GeoNetworking address of the device with the hardware address `link_address`.
    fn local_address(&self, link_address: EthernetAddress) -> Option<Address>;

    /// Build the headers of a new packet.
    fn prepare(&mut self, init: &Init, link_address: EthernetAddress, now: Instant)
        -> Result<Prepared>;

    /// Consume the sequence number of a packet whose headers were written to a buffer.
    fn commit(&mut self, repr: &Repr);

    /// Account for a packet that was queued.
    fn sent(&mut self);
}

impl<'a> Controller<'a> {
    pub(crate) fn new(
        eth: eth::Controller<'a>,
        endpoint: &'a mut dyn Endpoint,
    ) -> Self {
        Controller { eth, endpoint, }
    }

    /// Proof to the compiler that we can shorten the lifetime arbitrarily.
    pub fn borrow_mut(&mut self) -> Controller {
        Controller {
            eth: self.eth.borrow_mut(),
            endpoint: self.endpoint,
        }
    }

    /// Get the hardware info for that packet.
    pub fn info(&self) -> &dyn Info {
        self.eth.info()
    }

    /// The GeoNetworking address of this device.
    pub fn local_address(&mut self) -> Option<Address> {
        let link_address = self.eth.src_addr();
        self.endpoint.local_address(link_address)
    }
}

impl<'a, P: Payload> In<'a, P> {
    /// Reuse the buffer underlying the packet.
    ///
    /// Note that the content will be lost entirely when reinitializing the frame.
    pub fn deinit(self) -> Raw<'a, P>
        where P: PayloadMut,
    {
        Raw {
            handle: self.handle,
            payload: self.packet.into_inner().into_inner(),
        }
    }
}

impl<'a, P: Payload> Out<'a, P> {
    /// Pretend the packet has been initialized by the GeoNetworking layer.
    ///
    /// This is fine to call if a previous call to `into_incoming` was used to destructure the
    /// initialized packet and its contents have not changed.
    pub fn new_unchecked(
        handle: Controller<'a>,
        packet: GnPacket<'a, P>) -> Self
    {
        Out { handle, packet, }
    }

    /// Unwrap the contained control handle and initialized packet.
    pub fn into_incoming(self) -> In<'a, P> {
        let Out { handle, packet } = self;
        In { handle, packet }
    }

    /// The headers of the packet.
    pub fn repr(&self) -> Repr {
        self.packet.repr()
    }

    /// Try to send that packet.
    pub fn send(self) -> Result<()> {
        let Out { handle: Controller { eth: link, endpoint }, packet } = self;
        let lower = eth::OutPacket::new_unchecked(link, packet.into_inner());
        lower.send()?;
        endpoint.sent();
        Ok(())
    }
}

impl<'a, P: PayloadMut> Out<'a, P> {
    /// A mutable slice containing the payload of the packet.
    pub fn payload_mut_slice(&mut self) -> &mut [u8] {
        self.packet.payload_mut_slice()
    }
}

impl<'a, P: Payload + PayloadMut> Raw<'a, P> {
    /// Initialize the raw packet buffer to a valid GeoNetworking packet.
    ///
    /// Fails with `BadSize` if the payload exceeds the maximum SDU size, with `Unavailable` if the
    /// time or position of the station are unknown and with `Unreachable` if the destination is
    /// not in the Location Table.
    pub fn prepare(self, init: Init) -> Result<Out<'a, P>> {
        let Raw { handle: Controller { eth: mut link, endpoint }, payload } = self;
        let now = link.info().timestamp();
        let link_address = link.src_addr();
        let prepared = endpoint.prepare(&init, link_address, now)?;

        let lower = eth::RawPacket::new(link, payload);
        let lower = lower.prepare(eth::Init {
            src_addr: prepared.src_addr,
            dst_addr: prepared.dst_addr,
            ethertype: EthernetProtocol::GeoNetworking,
            payload: prepared.repr.buffer_len(),
        })?;

        let eth::InPacket { handle, mut frame } = lower.into_incoming();
        let header = frame.payload_mut_slice();
        if header.len() < prepared.repr.header_len() {
            return Err(Error::BadSize);
        }
        prepared.repr.emit(geonet::new_unchecked_mut(header));
        endpoint.commit(&prepared.repr);

        Ok(Out {
            handle: Controller::new(handle, endpoint),
            packet: Packet::new_unchecked(frame, prepared.repr),
        })
    }
}
