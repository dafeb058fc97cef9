//! GeoUnicast, a packet towards a single station.
//!
//! A station whose address matches the destination delivers the packet to its transport.
//! Every other station forwards it greedily towards the position in the destination vector,
//! taking one hop of its budget.
use crate::layer::{Error, Result};
use crate::wire::EthernetAddress;
use crate::wire::geonet::{guc, Address, ExtendedRepr, Mid, NextHeader, Repr, ShortPositionVector};

use super::counters::Discard;
use super::extended::{Context, ExtendedHeader, Inbound, Push};
use super::greedy::{self, NextHop, Point};
use super::link::{self, Link};
use super::settings::Forwarding;
use super::packet::Init;

pub(crate) struct GeoUnicast;

impl ExtendedHeader for GeoUnicast {
    type Header = guc::Repr;

    fn inbound(ctx: &mut Context, common: &Repr, header: &guc::Repr) -> Inbound {
        if ctx.links.owns(header.destination.address) {
            receive(ctx, common, header)
        } else {
            forward(ctx, common, header)
        }
    }

    fn push(ctx: &mut Context, init: &Init) -> Result<Push> {
        let source = ctx.links.find_mid(Mid::from(ctx.link_address))
            .or_else(|| ctx.links.iter().next())
            .map(Link::address)
            .ok_or(Error::Illegal)?;

        let timestamp = ctx.management.timestamp().ok_or(Error::Unavailable)?;
        let own = ctx.management.position().ok_or(Error::Unavailable)?;

        // Without a location service the destination must already be known.
        let entry = *ctx.locations.find(init.destination).ok_or(Error::Unreachable)?;
        let destination = ShortPositionVector {
            address: entry.address(),
            ..entry.position.short
        };

        let target = Point::new(destination.latitude, destination.longitude);
        match greedy::next_hop(&**ctx.locations, own.point(), target, init.traffic_class) {
            NextHop::Buffer => return Err(Error::Unreachable),
            hop => net_trace!("guc: push to {} via {:?}", destination.address, hop),
        }

        Ok(Push {
            source,
            extended: ExtendedRepr::GeoUnicast(guc::Repr {
                sequence_number: ctx.sequence,
                source: own.vector(source, timestamp),
                destination,
            }),
            link_destination: EthernetAddress::BROADCAST,
        })
    }
}

fn receive(ctx: &mut Context, common: &Repr, header: &guc::Repr) -> Inbound {
    resolve_collision(ctx, header.source.address());

    if let Err(reason) = learn_source(ctx, common, header) {
        return Inbound::Discard(reason);
    }

    match common.next_header {
        NextHeader::BtpA | NextHeader::BtpB => Inbound::Deliver,
        other => {
            net_debug!("guc: no transport for {:?}", other);
            Inbound::Discard(Discard::NoTransport)
        },
    }
}

fn forward(ctx: &mut Context, common: &Repr, header: &guc::Repr) -> Inbound {
    // A neighbour repeated one of our own packets.
    if ctx.links.owns(header.source.address()) {
        return Inbound::Discard(Discard::OwnPacket);
    }

    if let Err(reason) = learn_source(ctx, common, header) {
        return Inbound::Discard(reason);
    }

    if common.remaining_hop_limit <= 1 {
        return Inbound::Discard(Discard::HopLimit);
    }

    let own = match ctx.management.position() {
        Some(own) => own,
        None => return Inbound::Discard(Discard::NoPosition),
    };

    if ctx.settings.guc_forwarding != Forwarding::Greedy {
        return Inbound::Discard(Discard::NoRoute);
    }

    let target = Point::new(header.destination.latitude, header.destination.longitude);
    match greedy::next_hop(&**ctx.locations, own.point(), target, common.traffic_class) {
        NextHop::Neighbour(mid) => Inbound::Forward(mid.link_address()),
        NextHop::Broadcast => Inbound::Forward(EthernetAddress::BROADCAST),
        NextHop::Buffer => Inbound::Discard(Discard::NoRoute),
    }
}

/// Another station claims one of our addresses, draw a new one.
fn resolve_collision(ctx: &mut Context, source: Address) {
    if !ctx.links.owns(source) {
        return;
    }

    let fresh = link::random_mid(ctx.rng);
    let address = match ctx.links.replace_mid(source.mid(), fresh) {
        Some(address) => address,
        None => return,
    };

    net_debug!("guc: address collision on {}, now {}", source, address);
    ctx.counters.regenerated += 1;
    if Mid::from(ctx.link_address) == source.mid() {
        ctx.link_address = address.link_address();
    }
}

/// Record the source position vector in the Location Table.
fn learn_source(
    ctx: &mut Context,
    common: &Repr,
    header: &guc::Repr,
) -> core::result::Result<(), Discard> {
    let source = header.source.address();
    let is_neighbour = common.remaining_hop_limit == common.max_hop_limit;

    ctx.locations.add(source)
        .map_err(|_| Discard::LocationTableFull)?;
    let entry = ctx.locations
        .update(
            source,
            header.source,
            is_neighbour,
            header.sequence_number,
            source.station_type(),
            header.source.short.timestamp)
        .map_err(|_| Discard::LocationTableFull)?;
    entry.renew(ctx.now, ctx.settings.lifetime_locte);
    Ok(())
}
