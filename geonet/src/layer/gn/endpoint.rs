use core::convert::TryFrom;

use crate::layer::{eth, Error, FnHandler, Result};
use crate::time::{Duration, Instant, Ticket, Timer};
use crate::wire::{EthernetAddress, EthernetProtocol, Payload, PayloadMut};
use crate::wire::geonet::{
    Address,
    Extended,
    Lifetime,
    Mid,
    NextHeader,
    Repr,
    SequenceNumber,
    StationType};

use super::{Recv, Send};
use super::counters::{Counters, Discard};
use super::duplicate::{self, Freshness};
use super::extended::{self, Context, Inbound};
use super::link::{DeviceId, Links, Method, Xoroshiro256};
use super::loct::LocationTable;
use super::management::{Management, NoManagement};
use super::packet::{self, Controller, GnPacket, Init, Prepared};
use super::settings::Settings;

/// How often the Location Table is swept for expired entries.
const EXPIRY_PERIOD: Duration = Duration::from_secs(1);

/// The GeoNetworking state of a station.
///
/// Owns the Location Table, the addresses of the local links and the router parameters. Borrow it
/// for receiving or sending with the methods of the same name.
pub struct Endpoint<'data, M = NoManagement> {
    locations: LocationTable<'data>,
    links: Links<'data>,
    settings: Settings,
    sequence: SequenceNumber,
    rng: Xoroshiro256,
    management: M,
    counters: Counters,
    expiry: Timer,
    expiry_ticket: Option<Ticket>,
}

/// An endpoint borrowed for receiving.
///
/// Dispatching to the transports is configured here, and not in the endpoint state.
pub struct Receiver<'a, 'data, M, H> {
    endpoint: GnEndpoint<'a, 'data, M>,

    /// The upper protocol receiver.
    handler: H,
}

/// An endpoint borrowed for sending.
pub struct Sender<'a, 'data, M, H> {
    endpoint: GnEndpoint<'a, 'data, M>,

    /// The upper protocol sender.
    handler: H,
}

/// Originates one GeoUnicast packet with a fixed payload.
///
/// Offer it buffers until one was used. The outcome is available afterwards.
pub struct GucSender<'p> {
    init: Init,
    payload: &'p [u8],
    result: Option<Result<()>>,
}

struct GnEndpoint<'a, 'data, M> {
    inner: &'a mut Endpoint<'data, M>,
}

impl<'data> Endpoint<'data> {
    /// Create an endpoint without time and position.
    ///
    /// Such an endpoint receives but can neither originate nor forward packets. Supply a
    /// management entity with [`with_management`].
    ///
    /// [`with_management`]: #method.with_management
    pub fn new(locations: LocationTable<'data>, links: Links<'data>, settings: Settings) -> Self {
        Endpoint {
            locations,
            links,
            settings,
            sequence: SequenceNumber::FIRST,
            rng: Xoroshiro256::new(0),
            management: NoManagement,
            counters: Counters::default(),
            expiry: Timer::new(EXPIRY_PERIOD),
            expiry_ticket: None,
        }
    }
}

impl<'data, M: Management> Endpoint<'data, M> {
    /// Replace the source of time and position.
    pub fn with_management<N: Management>(self, management: N) -> Endpoint<'data, N> {
        Endpoint {
            locations: self.locations,
            links: self.links,
            settings: self.settings,
            sequence: self.sequence,
            rng: self.rng,
            management,
            counters: self.counters,
            expiry: self.expiry,
            expiry_ticket: self.expiry_ticket,
        }
    }

    /// Reseed the generator of random MIDs.
    pub fn seed(&mut self, seed: u64) {
        self.rng = Xoroshiro256::new(seed);
    }

    /// Receive packets and pass those for us to `handler`.
    pub fn recv<H>(&mut self, handler: H) -> Receiver<'_, 'data, M, H> {
        Receiver { endpoint: self.gn(), handler, }
    }

    /// Receive with a closure or function.
    pub fn recv_with<H>(&mut self, handler: H) -> Receiver<'_, 'data, M, FnHandler<H>> {
        self.recv(FnHandler(handler))
    }

    /// Offer buffers for originating packets to `handler`.
    pub fn send<H>(&mut self, handler: H) -> Sender<'_, 'data, M, H> {
        Sender { endpoint: self.gn(), handler, }
    }

    /// Send with a closure or function.
    pub fn send_with<H>(&mut self, handler: H) -> Sender<'_, 'data, M, FnHandler<H>> {
        self.send(FnHandler(handler))
    }

    /// Create the address of a new link.
    ///
    /// The address is configured with `method` and bound to `device`, replacing a previous
    /// binding of that device. Use its [`link_address`] for the ethernet endpoint of the device.
    ///
    /// [`link_address`]: ../../wire/geonet/struct.Address.html#method.link_address
    pub fn link_add(
        &mut self,
        device: DeviceId,
        method: Method,
        station_type: StationType,
        country_code: u16,
    ) -> Result<Address> {
        let address = method.configure(&mut self.rng, station_type, country_code)?;
        self.links.insert(device, address)?;
        net_debug!("gn: link {:?} is {}", device, address);
        Ok(address)
    }

    /// The addresses of the local links.
    pub fn links(&self) -> &Links<'data> {
        &self.links
    }

    /// The Location Table.
    pub fn loct(&self) -> &LocationTable<'data> {
        &self.locations
    }

    /// The Location Table, mutably.
    pub fn loct_mut(&mut self) -> &mut LocationTable<'data> {
        &mut self.locations
    }

    /// The router parameters.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The router parameters, mutably.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// The source of time and position.
    pub fn management(&self) -> &M {
        &self.management
    }

    /// The source of time and position, mutably.
    pub fn management_mut(&mut self) -> &mut M {
        &mut self.management
    }

    /// Statistics of received and sent packets.
    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    /// The sequence number of the next originated packet.
    pub fn sequence_number(&self) -> SequenceNumber {
        self.sequence
    }

    /// An initializer for a GeoUnicast packet with the default parameters.
    pub fn guc_init(&self, destination: Address, next_header: NextHeader, payload: usize) -> Init {
        Init {
            destination,
            header: Extended::GeoUnicast,
            next_header,
            traffic_class: self.settings.traffic_class,
            lifetime: None,
            max_hop_limit: None,
            payload,
        }
    }

    /// A sender originating one GeoUnicast packet with `payload`.
    pub fn guc_send<'p>(&self, destination: Address, next_header: NextHeader, payload: &'p [u8])
        -> GucSender<'p>
    {
        GucSender::new(self.guc_init(destination, next_header, payload.len()), payload)
    }

    /// Remove expired Location Table entries, at most once per second.
    ///
    /// Called at the start of each receive. Returns the number of removed entries.
    pub fn poll(&mut self, now: Instant) -> usize {
        if let Some(ticket) = self.expiry_ticket {
            if !self.expiry.fire(ticket, now) {
                return 0;
            }
        }

        self.expiry_ticket = Some(self.expiry.arm(now));
        self.locations.expire(now)
    }

    fn gn(&mut self) -> GnEndpoint<'_, 'data, M> {
        GnEndpoint {
            inner: self,
        }
    }

    fn context(&mut self, now: Instant, link_address: EthernetAddress) -> Context<'_, 'data> {
        Context {
            locations: &mut self.locations,
            links: &mut self.links,
            settings: &self.settings,
            management: &self.management,
            rng: &mut self.rng,
            sequence: self.sequence,
            counters: &mut self.counters,
            now,
            link_address,
        }
    }
}

impl<M: Management> packet::Endpoint for GnEndpoint<'_, '_, M> {
    fn local_address(&self, link_address: EthernetAddress) -> Option<Address> {
        self.inner.links.find_mid(Mid::from(link_address))
            .map(|link| link.address())
    }

    fn prepare(&mut self, init: &Init, link_address: EthernetAddress, now: Instant)
        -> Result<Prepared>
    {
        let settings = self.inner.settings;
        if init.payload > usize::from(settings.max_sdu_size) {
            return Err(Error::BadSize);
        }
        let payload_len = u16::try_from(init.payload)
            .map_err(|_| Error::BadSize)?;

        let push = extended::push(&mut self.inner.context(now, link_address), init)?;

        let max_lifetime = settings.max_packet_lifetime;
        let lifetime = init.lifetime
            .unwrap_or_else(|| Lifetime::from_duration(settings.default_packet_lifetime));
        let lifetime = if lifetime.duration() > max_lifetime {
            Lifetime::from_duration(max_lifetime)
        } else {
            lifetime
        };
        let hop_limit = init.max_hop_limit.unwrap_or(settings.default_hop_limit);

        let repr = Repr {
            lifetime,
            remaining_hop_limit: hop_limit,
            next_header: init.next_header,
            traffic_class: init.traffic_class,
            mobile: settings.is_mobile,
            payload_len,
            max_hop_limit: hop_limit,
            extended: push.extended,
        };

        if repr.header_len() > usize::from(settings.max_gn_header_size) {
            return Err(Error::BadSize);
        }

        net_trace!("gn: originating {:?} to {}", push.extended.kind(), init.destination);
        Ok(Prepared {
            repr,
            src_addr: push.source.link_address(),
            dst_addr: push.link_destination,
        })
    }

    fn commit(&mut self, repr: &Repr) {
        self.inner.sequence = repr.extended.sequence_number().next();
    }

    fn sent(&mut self) {
        self.inner.counters.sent += 1;
    }
}

impl<M: Management, H> Receiver<'_, '_, M, H> {
    fn forward<'b, P: PayloadMut>(
        &mut self,
        handle: eth::Controller<'b>,
        mut packet: GnPacket<'b, P>,
        link_address: EthernetAddress,
        next_hop: EthernetAddress,
    ) {
        let remaining = packet.repr().remaining_hop_limit - 1;
        packet.set_remaining_hop_limit(remaining);

        let frame = packet.into_inner();
        let init = eth::Init {
            src_addr: link_address,
            dst_addr: next_hop,
            ethertype: EthernetProtocol::GeoNetworking,
            payload: frame.payload_slice().len(),
        };

        let sent = eth::InPacket { handle, frame }
            .reinit(init)
            .and_then(|out| out.send());

        let counters = &mut self.endpoint.inner.counters;
        match sent {
            Ok(()) => {
                net_trace!("gn: forwarded to {} with rhl {}", next_hop, remaining);
                counters.forwarded += 1;
            },
            Err(err) => {
                net_debug!("gn: forwarding failed: {}", err);
                counters.discard(Discard::Queue);
            },
        }
    }
}

impl<P, T, M> eth::Recv<P> for Receiver<'_, '_, M, T>
where
    P: PayloadMut,
    T: Recv<P>,
    M: Management,
{
    fn receive(&mut self, eth::InPacket { mut handle, frame }: eth::InPacket<P>) {
        if frame.repr().ethertype != EthernetProtocol::GeoNetworking {
            return;
        }

        let now = handle.info().timestamp();
        self.endpoint.inner.poll(now);

        let packet = match GnPacket::new_checked(frame) {
            Ok(packet) => packet,
            Err(err) => return self.endpoint.inner.counters.discard(err.into()),
        };
        net_trace!("gn: received {}", packet);

        match duplicate::detect(&mut self.endpoint.inner.locations, &packet) {
            Ok(Freshness::Fresh) => (),
            Ok(Freshness::Duplicate) => {
                return self.endpoint.inner.counters.discard(Discard::Duplicate);
            },
            Err(_) => return self.endpoint.inner.counters.discard(Discard::MissingField),
        }

        let original = handle.src_addr();
        let repr = packet.repr();
        let (inbound, link_address) = {
            let mut ctx = self.endpoint.inner.context(now, original);
            let inbound = extended::inbound(&mut ctx, &repr);
            (inbound, ctx.link_address)
        };

        if link_address != original {
            handle.set_src_addr(link_address);
        }

        match inbound {
            Inbound::Deliver => {
                self.endpoint.inner.counters.delivered += 1;
                let handle = Controller::new(handle.borrow_mut(), &mut self.endpoint);
                self.handler.receive(packet::In { handle, packet })
            },
            Inbound::Forward(next_hop) => self.forward(handle, packet, link_address, next_hop),
            Inbound::Discard(reason) => self.endpoint.inner.counters.discard(reason),
        }
    }
}

impl<P, T, M> eth::Send<P> for Sender<'_, '_, M, T>
where
    P: Payload + PayloadMut,
    T: Send<P>,
    M: Management,
{
    fn send(&mut self, eth::RawPacket { mut handle, payload }: eth::RawPacket<P>) {
        let handle = Controller::new(handle.borrow_mut(), &mut self.endpoint);
        let packet = packet::Raw { handle, payload };
        self.handler.send(packet)
    }
}

impl<'p> GucSender<'p> {
    /// Send `payload` as configured by `init`.
    ///
    /// The payload length of `init` is taken from `payload`.
    pub fn new(init: Init, payload: &'p [u8]) -> Self {
        GucSender {
            init: Init { payload: payload.len(), ..init },
            payload,
            result: None,
        }
    }

    /// The outcome, once a buffer was offered.
    pub fn result(&self) -> Option<Result<()>> {
        self.result
    }
}

impl<P: Payload + PayloadMut> Send<P> for GucSender<'_> {
    fn send(&mut self, raw: packet::Raw<P>) {
        if self.result.is_some() {
            return;
        }

        let payload = self.payload;
        let result = raw.prepare(self.init)
            .and_then(|mut out| {
                out.payload_mut_slice().copy_from_slice(payload);
                out.send()
            });
        self.result = Some(result);
    }
}

impl<P: Payload, F> Recv<P> for FnHandler<F>
    where F: FnMut(packet::In<P>)
{
    fn receive(&mut self, frame: packet::In<P>) {
        self.0(frame)
    }
}

impl<P: Payload, F> Send<P> for FnHandler<F>
    where F: FnMut(packet::Raw<P>)
{
    fn send(&mut self, frame: packet::Raw<P>) {
        self.0(frame)
    }
}
