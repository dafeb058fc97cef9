use super::*;
use crate::layer::{eth, Error};
use crate::managed::Slice;
use crate::nic::{external::External, Device};
use crate::time::{Duration, Instant, Timestamp};
use crate::wire::{EthernetAddress, EthernetProtocol, Payload, ethernet_frame};
use crate::wire::geonet::{
    geonet,
    guc,
    Address,
    BasicNextHeader,
    ExtendedRepr,
    Lifetime,
    LongPositionVector,
    Mid,
    NextHeader,
    Repr,
    SequenceNumber,
    ShortPositionVector,
    StationType,
    TrafficClass};

static PAYLOAD: [u8; 8] = [0xaa, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0xff];

const OWN: Address = Address::from_raw(0x1400_0200_0000_000b);
const SOURCE: Address = Address::from_raw(0x1400_0200_0000_000a);
const FAR: Address = Address::from_raw(0x3c00_0200_0000_000c);
const HOP: Address = Address::from_raw(0x1400_0200_0000_000d);

// Along one meridian, 0.05 degree is about 5.6km.
const OWN_POSITION: Point = Point { latitude: 520_000_000, longitude: 45_000_000 };
const SOURCE_POSITION: Point = Point { latitude: 519_500_000, longitude: 45_000_000 };
const HOP_POSITION: Point = Point { latitude: 520_500_000, longitude: 45_000_000 };
const FAR_POSITION: Point = Point { latitude: 521_000_000, longitude: 45_000_000 };

const TIMESTAMP: u32 = 1_104_922_570;

#[derive(Default)]
struct Collect(Vec<(NextHeader, Vec<u8>)>);

impl<P: Payload> Recv<P> for Collect {
    fn receive(&mut self, packet: InPacket<P>) {
        let repr = packet.packet.repr();
        self.0.push((repr.next_header, packet.packet.payload_slice().to_vec()));
    }
}

fn management(position: Point) -> Fixed {
    Fixed {
        time: Some(Timestamp::EPOCH_UNIX_MILLIS + u64::from(TIMESTAMP) + 1_000),
        position: Some(LocalPosition {
            latitude: position.latitude,
            longitude: position.longitude,
            speed: 0,
            heading: 0,
            accurate: true,
        }),
    }
}

fn station<'a>(
    address: Address,
    position: Point,
    locations: &'a mut [LocationEntry],
    links: &'a mut [Link],
) -> Endpoint<'a, Fixed> {
    let mut links = Links::new(links);
    links.insert(DeviceId(0), address).unwrap();
    Endpoint::new(LocationTable::new(locations), links, Settings::default())
        .with_management(management(position))
}

fn vector(address: Address, position: Point, timestamp: u32) -> LongPositionVector {
    LongPositionVector {
        short: ShortPositionVector {
            address,
            timestamp: Timestamp(timestamp),
            latitude: position.latitude,
            longitude: position.longitude,
        },
        accurate: true,
        speed: 0,
        heading: 0,
    }
}

fn guc_repr(
    source: Address,
    destination: Address,
    destination_position: Point,
    sequence_number: u16,
) -> Repr {
    Repr {
        lifetime: Lifetime::from_duration(Duration::from_secs(60)),
        remaining_hop_limit: 10,
        next_header: NextHeader::BtpB,
        traffic_class: TrafficClass::default(),
        mobile: true,
        payload_len: PAYLOAD.len() as u16,
        max_hop_limit: 10,
        extended: ExtendedRepr::GeoUnicast(guc::Repr {
            sequence_number: SequenceNumber(sequence_number),
            source: vector(source, SOURCE_POSITION, TIMESTAMP),
            destination: ShortPositionVector {
                address: destination,
                timestamp: Timestamp(TIMESTAMP),
                latitude: destination_position.latitude,
                longitude: destination_position.longitude,
            },
        }),
    }
}

fn write_frame(buffer: &mut Vec<u8>, link_dst: EthernetAddress, repr: &Repr) {
    buffer.clear();
    buffer.resize(ethernet_frame::buffer_len(repr.buffer_len()), 0);

    let frame = ethernet_frame::new_unchecked_mut(&mut buffer[..]);
    frame.set_dst_addr(link_dst);
    frame.set_src_addr(SOURCE.link_address());
    frame.set_ethertype(EthernetProtocol::GeoNetworking);

    let packet = frame.payload_mut_slice();
    repr.emit(geonet::new_unchecked_mut(packet));
    packet[repr.header_len()..].copy_from_slice(&PAYLOAD);
}

fn with_packet(buffer: &mut Vec<u8>, mutate: impl FnOnce(&mut geonet)) {
    let frame = ethernet_frame::new_unchecked_mut(&mut buffer[..]);
    mutate(geonet::new_unchecked_mut(frame.payload_mut_slice()));
}

fn learn_neighbour(endpoint: &mut Endpoint<Fixed>, address: Address, position: Point) {
    let locations = endpoint.loct_mut();
    locations.add(address).unwrap();
    let entry = locations.update(
        address,
        vector(address, position, TIMESTAMP),
        true,
        SequenceNumber(1),
        address.station_type(),
        Timestamp(TIMESTAMP)).unwrap();
    entry.renew(Instant::from_millis(0), Duration::from_secs(20));
}

#[test]
fn accept_and_deliver() {
    let mut locations = [LocationEntry::default(); 4];
    let mut links = [Link::default(); 1];
    let mut gn = station(OWN, OWN_POSITION, &mut locations, &mut links);
    let mut eth = eth::Endpoint::new(OWN.link_address());

    let mut nic = External::new_recv(Slice::One(Vec::new()));
    write_frame(nic.get_mut(0).unwrap(), OWN.link_address(), &guc_repr(SOURCE, OWN, OWN_POSITION, 1));

    let mut collect = Collect::default();
    assert_eq!(nic.rx(1, eth.recv(gn.recv(&mut collect))), Ok(1));
    assert_eq!(collect.0, vec![(NextHeader::BtpB, PAYLOAD.to_vec())]);

    assert_eq!(gn.loct().len(), 1);
    let entry = gn.loct().find(SOURCE).expect("source was learned");
    assert_eq!(entry.sequence_number, SequenceNumber(1));
    assert_eq!(entry.timestamp, Timestamp(TIMESTAMP));
    assert_eq!(entry.position.short.latitude, SOURCE_POSITION.latitude);
    assert_eq!(entry.station_type, StationType::PassengerCar);
    assert!(entry.is_neighbour);
    assert!(!entry.location_service_pending);
    assert_eq!(gn.counters().delivered, 1);
    assert_eq!(nic.requeued(), 0);
}

#[test]
fn replay_is_duplicate() {
    let mut locations = [LocationEntry::default(); 4];
    let mut links = [Link::default(); 1];
    let mut gn = station(OWN, OWN_POSITION, &mut locations, &mut links);
    let mut eth = eth::Endpoint::new(OWN.link_address());

    let mut nic = External::new_recv(Slice::One(Vec::new()));
    write_frame(nic.get_mut(0).unwrap(), OWN.link_address(), &guc_repr(SOURCE, OWN, OWN_POSITION, 1));

    let mut collect = Collect::default();
    assert_eq!(nic.rx(1, eth.recv(gn.recv(&mut collect))), Ok(1));
    let learned = *gn.loct().find(SOURCE).unwrap();

    nic.reset_receive();
    assert_eq!(nic.rx(1, eth.recv(gn.recv(&mut collect))), Ok(1));

    assert_eq!(collect.0.len(), 1);
    assert_eq!(gn.counters().duplicates, 1);
    assert_eq!(gn.counters().last_discard, Some(Discard::Duplicate));
    let entry = gn.loct().find(SOURCE).unwrap();
    assert_eq!(entry.sequence_number, learned.sequence_number);
    assert_eq!(entry.timestamp, learned.timestamp);
    assert_eq!(entry.expires_at(), learned.expires_at());
}

#[test]
fn newer_sequence_number_is_fresh() {
    let mut locations = [LocationEntry::default(); 4];
    let mut links = [Link::default(); 1];
    let mut gn = station(OWN, OWN_POSITION, &mut locations, &mut links);
    let mut eth = eth::Endpoint::new(OWN.link_address());

    let mut nic = External::new_recv(Slice::Many(vec![Vec::new(), Vec::new()]));
    write_frame(nic.get_mut(0).unwrap(), OWN.link_address(), &guc_repr(SOURCE, OWN, OWN_POSITION, 1));
    write_frame(nic.get_mut(1).unwrap(), OWN.link_address(), &guc_repr(SOURCE, OWN, OWN_POSITION, 2));

    let mut collect = Collect::default();
    assert_eq!(nic.rx(1, eth.recv(gn.recv(&mut collect))), Ok(1));
    assert_eq!(nic.rx(1, eth.recv(gn.recv(&mut collect))), Ok(1));

    assert_eq!(collect.0.len(), 2);
    assert_eq!(gn.loct().len(), 1);
    assert_eq!(gn.loct().find(SOURCE).unwrap().sequence_number, SequenceNumber(2));
}

#[test]
fn forward_to_closer_neighbour() {
    let mut locations = [LocationEntry::default(); 4];
    let mut links = [Link::default(); 1];
    let mut gn = station(OWN, OWN_POSITION, &mut locations, &mut links);
    learn_neighbour(&mut gn, HOP, HOP_POSITION);
    let mut eth = eth::Endpoint::new(OWN.link_address());

    let mut nic = External::new_recv(Slice::One(Vec::new()));
    write_frame(nic.get_mut(0).unwrap(), OWN.link_address(), &guc_repr(SOURCE, FAR, FAR_POSITION, 7));

    let mut collect = Collect::default();
    assert_eq!(nic.rx(1, eth.recv(gn.recv(&mut collect))), Ok(1));

    assert!(collect.0.is_empty());
    assert_eq!(nic.requeued(), 1);
    assert_eq!(gn.counters().forwarded, 1);
    assert_eq!(gn.loct().len(), 2);

    let buffer = nic.get(0).unwrap();
    let frame = ethernet_frame::new_checked(&buffer[..]).unwrap();
    assert_eq!(frame.dst_addr(), HOP.link_address());
    assert_eq!(frame.src_addr(), OWN.link_address());

    let packet = geonet::new_checked(frame.payload_slice()).unwrap();
    let repr = Repr::parse(packet).unwrap();
    assert_eq!(repr.remaining_hop_limit, 9);
    assert_eq!(repr.max_hop_limit, 10);
    assert_eq!(repr.extended.sequence_number(), SequenceNumber(7));
    assert_eq!(&frame.payload_slice()[repr.header_len()..], &PAYLOAD[..]);
}

#[test]
fn forward_without_progress_broadcasts() {
    let mut locations = [LocationEntry::default(); 4];
    let mut links = [Link::default(); 1];
    let mut gn = station(OWN, OWN_POSITION, &mut locations, &mut links);
    let mut eth = eth::Endpoint::new(OWN.link_address());

    let mut nic = External::new_recv(Slice::One(Vec::new()));
    write_frame(nic.get_mut(0).unwrap(), OWN.link_address(), &guc_repr(SOURCE, FAR, FAR_POSITION, 7));

    let mut collect = Collect::default();
    assert_eq!(nic.rx(1, eth.recv(gn.recv(&mut collect))), Ok(1));

    assert_eq!(nic.requeued(), 1);
    let buffer = nic.get(0).unwrap();
    let frame = ethernet_frame::new_checked(&buffer[..]).unwrap();
    assert_eq!(frame.dst_addr(), EthernetAddress::BROADCAST);
}

#[test]
fn forward_needs_hops_and_position() {
    let mut locations = [LocationEntry::default(); 4];
    let mut links = [Link::default(); 1];
    let mut gn = station(OWN, OWN_POSITION, &mut locations, &mut links);
    learn_neighbour(&mut gn, HOP, HOP_POSITION);
    let mut eth = eth::Endpoint::new(OWN.link_address());

    let mut nic = External::new_recv(Slice::Many(vec![Vec::new(), Vec::new()]));
    let mut last_hop = guc_repr(SOURCE, FAR, FAR_POSITION, 7);
    last_hop.remaining_hop_limit = 1;
    write_frame(nic.get_mut(0).unwrap(), OWN.link_address(), &last_hop);
    write_frame(nic.get_mut(1).unwrap(), OWN.link_address(), &guc_repr(SOURCE, FAR, FAR_POSITION, 8));

    let mut collect = Collect::default();
    assert_eq!(nic.rx(1, eth.recv(gn.recv(&mut collect))), Ok(1));
    assert_eq!(gn.counters().last_discard, Some(Discard::HopLimit));
    // The source is learned nonetheless, but not as a neighbour.
    assert!(!gn.loct().find(SOURCE).unwrap().is_neighbour);

    gn.management_mut().position = None;
    assert_eq!(nic.rx(1, eth.recv(gn.recv(&mut collect))), Ok(1));
    assert_eq!(gn.counters().last_discard, Some(Discard::NoPosition));

    assert_eq!(nic.requeued(), 0);
    assert_eq!(gn.counters().forwarded, 0);
}

#[test]
fn own_packet_is_not_forwarded_again() {
    let mut locations = [LocationEntry::default(); 4];
    let mut links = [Link::default(); 1];
    let mut gn = station(OWN, OWN_POSITION, &mut locations, &mut links);
    learn_neighbour(&mut gn, FAR, FAR_POSITION);
    let mut eth = eth::Endpoint::new(OWN.link_address());

    let mut nic = External::new_send(Slice::One(vec![0; 1024]));
    let mut sender = gn.guc_send(FAR, NextHeader::BtpB, &PAYLOAD);
    assert_eq!(nic.tx(1, eth.send(gn.send(&mut sender))), Ok(1));
    assert_eq!(sender.result(), Some(Ok(())));

    // A neighbour repeats the broadcast with one hop less.
    nic.receive_all();
    {
        let buffer = nic.get_mut(0).unwrap();
        ethernet_frame::new_unchecked_mut(&mut buffer[..]).set_src_addr(HOP.link_address());
        with_packet(buffer, |packet| packet.set_remaining_hop_limit(9));
    }

    let mut collect = Collect::default();
    assert_eq!(nic.rx(1, eth.recv(gn.recv(&mut collect))), Ok(1));

    assert!(collect.0.is_empty());
    assert_eq!(gn.counters().last_discard, Some(Discard::OwnPacket));
    assert_eq!(gn.counters().forwarded, 0);
    assert_eq!(gn.counters().regenerated, 0);
    assert_eq!(nic.requeued(), 0);
    assert!(gn.loct().find(OWN).is_none());
    assert_eq!(gn.loct().len(), 1);
    assert_eq!(gn.links().address(DeviceId(0)), Some(OWN));
}

#[test]
fn rejected_headers() {
    fn foreign_version(packet: &mut geonet) {
        packet.set_version_and_next_header(1, BasicNextHeader::Common);
    }

    fn secured(packet: &mut geonet) {
        packet.set_version_and_next_header(0, BasicNextHeader::Secured);
    }

    fn unknown_header(packet: &mut geonet) {
        packet.set_header_type(15, 0);
    }

    fn hop_limit_exceeded(packet: &mut geonet) {
        packet.set_max_hop_limit(5);
    }

    let cases: [(fn(&mut geonet), Discard); 4] = [
        (foreign_version, Discard::Unsupported),
        (secured, Discard::Unsupported),
        (unknown_header, Discard::Unrecognized),
        (hop_limit_exceeded, Discard::Malformed),
    ];

    for (mutate, reason) in cases.iter() {
        let mut locations = [LocationEntry::default(); 4];
        let mut links = [Link::default(); 1];
        let mut gn = station(OWN, OWN_POSITION, &mut locations, &mut links);
        let mut eth = eth::Endpoint::new(OWN.link_address());

        let mut nic = External::new_recv(Slice::One(Vec::new()));
        let buffer = nic.get_mut(0).unwrap();
        write_frame(buffer, OWN.link_address(), &guc_repr(SOURCE, OWN, OWN_POSITION, 1));
        with_packet(buffer, *mutate);

        let mut collect = Collect::default();
        assert_eq!(nic.rx(1, eth.recv(gn.recv(&mut collect))), Ok(1));
        assert!(collect.0.is_empty());
        assert_eq!(gn.loct().len(), 0);
        assert_eq!(gn.counters().last_discard, Some(*reason));
    }
}

#[test]
fn no_transport() {
    let mut locations = [LocationEntry::default(); 4];
    let mut links = [Link::default(); 1];
    let mut gn = station(OWN, OWN_POSITION, &mut locations, &mut links);
    let mut eth = eth::Endpoint::new(OWN.link_address());

    let mut nic = External::new_recv(Slice::One(Vec::new()));
    let mut repr = guc_repr(SOURCE, OWN, OWN_POSITION, 1);
    repr.next_header = NextHeader::Ipv6;
    write_frame(nic.get_mut(0).unwrap(), OWN.link_address(), &repr);

    let mut collect = Collect::default();
    assert_eq!(nic.rx(1, eth.recv(gn.recv(&mut collect))), Ok(1));
    assert!(collect.0.is_empty());
    assert_eq!(gn.counters().last_discard, Some(Discard::NoTransport));
    assert!(gn.loct().find(SOURCE).is_some());
}

#[test]
fn transports_by_next_header() {
    let mut locations = [LocationEntry::default(); 4];
    let mut links = [Link::default(); 1];
    let mut gn = station(OWN, OWN_POSITION, &mut locations, &mut links);
    let mut eth = eth::Endpoint::new(OWN.link_address());

    let mut nic = External::new_recv(Slice::Many(vec![Vec::new(), Vec::new()]));
    let mut first = guc_repr(SOURCE, OWN, OWN_POSITION, 1);
    first.next_header = NextHeader::BtpA;
    write_frame(nic.get_mut(0).unwrap(), OWN.link_address(), &first);
    write_frame(nic.get_mut(1).unwrap(), OWN.link_address(), &guc_repr(SOURCE, OWN, OWN_POSITION, 2));

    let mut transport = Transport { btp_a: Collect::default(), btp_b: Collect::default() };
    assert_eq!(nic.rx(2, eth.recv(gn.recv(&mut transport))), Ok(1));
    assert_eq!(nic.rx(2, eth.recv(gn.recv(&mut transport))), Ok(1));

    assert_eq!(transport.btp_a.0, vec![(NextHeader::BtpA, PAYLOAD.to_vec())]);
    assert_eq!(transport.btp_b.0, vec![(NextHeader::BtpB, PAYLOAD.to_vec())]);
}

#[test]
fn send_and_receive() {
    let mut locations_a = [LocationEntry::default(); 4];
    let mut links_a = [Link::default(); 1];
    let mut gn_a = station(SOURCE, SOURCE_POSITION, &mut locations_a, &mut links_a);
    learn_neighbour(&mut gn_a, OWN, OWN_POSITION);
    let mut eth_a = eth::Endpoint::new(SOURCE.link_address());

    let mut locations_b = [LocationEntry::default(); 4];
    let mut links_b = [Link::default(); 1];
    let mut gn_b = station(OWN, OWN_POSITION, &mut locations_b, &mut links_b);
    let mut eth_b = eth::Endpoint::new(OWN.link_address());

    let mut nic = External::new_send(Slice::One(vec![0; 1024]));
    let mut sender = gn_a.guc_send(OWN, NextHeader::BtpA, &PAYLOAD);
    assert_eq!(nic.tx(1, eth_a.send(gn_a.send(&mut sender))), Ok(1));
    assert_eq!(sender.result(), Some(Ok(())));
    assert_eq!(gn_a.sequence_number(), SequenceNumber(2));
    assert_eq!(gn_a.counters().sent, 1);

    {
        let buffer = nic.get(0).unwrap();
        let frame = ethernet_frame::new_checked(&buffer[..]).unwrap();
        assert_eq!(frame.src_addr(), SOURCE.link_address());
        assert_eq!(frame.dst_addr(), EthernetAddress::BROADCAST);
        assert_eq!(frame.ethertype(), EthernetProtocol::GeoNetworking);

        let repr = Repr::parse(geonet::new_checked(frame.payload_slice()).unwrap()).unwrap();
        assert_eq!(repr.remaining_hop_limit, 10);
        assert_eq!(repr.max_hop_limit, 10);
        assert_eq!(repr.lifetime.duration(), Duration::from_secs(60));
        assert_eq!(repr.payload_len as usize, PAYLOAD.len());
        match repr.extended {
            ExtendedRepr::GeoUnicast(header) => {
                assert_eq!(header.sequence_number, SequenceNumber(1));
                assert_eq!(header.source.address(), SOURCE);
                assert_eq!(header.source.short.latitude, SOURCE_POSITION.latitude);
                assert_eq!(header.source.short.timestamp, Timestamp(TIMESTAMP + 1_000));
                assert_eq!(header.destination.address, OWN);
                assert_eq!(header.destination.latitude, OWN_POSITION.latitude);
            },
        }
    }

    nic.receive_all();
    let mut collect = Collect::default();
    assert_eq!(nic.rx(1, eth_b.recv(gn_b.recv(&mut collect))), Ok(1));
    assert_eq!(collect.0, vec![(NextHeader::BtpA, PAYLOAD.to_vec())]);
    assert_eq!(gn_b.loct().find(SOURCE).unwrap().sequence_number, SequenceNumber(1));
}

#[test]
fn send_rejected() {
    let mut locations = [LocationEntry::default(); 4];
    let mut links = [Link::default(); 1];
    let mut gn = station(SOURCE, SOURCE_POSITION, &mut locations, &mut links);
    let mut eth = eth::Endpoint::new(SOURCE.link_address());
    let mut nic = External::new_send(Slice::One(vec![0; 2048]));

    let mut unknown = gn.guc_send(OWN, NextHeader::BtpA, &PAYLOAD);
    assert_eq!(nic.tx(1, eth.send(gn.send(&mut unknown))), Ok(0));
    assert_eq!(unknown.result(), Some(Err(Error::Unreachable)));

    learn_neighbour(&mut gn, OWN, OWN_POSITION);
    let large = [0u8; 1500];
    let mut oversized = gn.guc_send(OWN, NextHeader::BtpA, &large);
    assert_eq!(nic.tx(1, eth.send(gn.send(&mut oversized))), Ok(0));
    assert_eq!(oversized.result(), Some(Err(Error::BadSize)));

    gn.management_mut().time = None;
    let mut no_time = gn.guc_send(OWN, NextHeader::BtpA, &PAYLOAD);
    assert_eq!(nic.tx(1, eth.send(gn.send(&mut no_time))), Ok(0));
    assert_eq!(no_time.result(), Some(Err(Error::Unavailable)));

    // Nothing was sent, no sequence number was consumed.
    assert_eq!(gn.sequence_number(), SequenceNumber::FIRST);
    assert_eq!(gn.counters().sent, 0);
}

#[test]
fn short_buffer_keeps_sequence_number() {
    let mut locations = [LocationEntry::default(); 4];
    let mut links = [Link::default(); 1];
    let mut gn = station(SOURCE, SOURCE_POSITION, &mut locations, &mut links);
    learn_neighbour(&mut gn, OWN, OWN_POSITION);
    let mut eth = eth::Endpoint::new(SOURCE.link_address());

    // Too short for the headers, and a borrowed buffer can not grow.
    let mut storage = [0u8; 40];
    let mut short = External::new_send(Slice::One(Slice::Borrowed(&mut storage[..])));
    let mut sender = gn.guc_send(OWN, NextHeader::BtpA, &PAYLOAD);
    assert_eq!(short.tx(1, eth.send(gn.send(&mut sender))), Ok(0));
    assert_eq!(sender.result(), Some(Err(Error::BadSize)));
    assert_eq!(gn.sequence_number(), SequenceNumber::FIRST);

    let mut nic = External::new_send(Slice::One(vec![0; 1024]));
    let mut sender = gn.guc_send(OWN, NextHeader::BtpA, &PAYLOAD);
    assert_eq!(nic.tx(1, eth.send(gn.send(&mut sender))), Ok(1));
    assert_eq!(gn.sequence_number(), SequenceNumber(2));

    let buffer = nic.get(0).unwrap();
    let frame = ethernet_frame::new_checked(&buffer[..]).unwrap();
    let repr = Repr::parse(geonet::new_checked(frame.payload_slice()).unwrap()).unwrap();
    assert_eq!(repr.extended.sequence_number(), SequenceNumber::FIRST);
}

#[test]
fn buffered_traffic_is_unreachable() {
    let mut locations = [LocationEntry::default(); 4];
    let mut links = [Link::default(); 1];
    let mut gn = station(SOURCE, SOURCE_POSITION, &mut locations, &mut links);
    let mut eth = eth::Endpoint::new(SOURCE.link_address());
    let mut nic = External::new_send(Slice::One(vec![0; 1024]));

    // Known, but not a neighbour, and no neighbour makes progress.
    learn_neighbour(&mut gn, FAR, FAR_POSITION);
    gn.loct_mut().find_mut(FAR).unwrap().is_neighbour = false;

    let mut init = gn.guc_init(FAR, NextHeader::BtpB, PAYLOAD.len());
    init.traffic_class.store_carry_forward = true;
    let mut sender = GucSender::new(init, &PAYLOAD);
    assert_eq!(nic.tx(1, eth.send(gn.send(&mut sender))), Ok(0));
    assert_eq!(sender.result(), Some(Err(Error::Unreachable)));
}

#[test]
fn address_collision() {
    let mut locations = [LocationEntry::default(); 4];
    let mut links = [Link::default(); 1];
    let mut gn = station(OWN, OWN_POSITION, &mut locations, &mut links);
    gn.seed(42);
    let mut eth = eth::Endpoint::new(OWN.link_address());

    // Another station uses our MID.
    let impostor = Address::new(false, StationType::Bus, 0, OWN.mid());
    let repr = guc_repr(impostor, OWN, OWN_POSITION, 1);

    let mut nic = External::new_recv(Slice::One(Vec::new()));
    write_frame(nic.get_mut(0).unwrap(), OWN.link_address(), &repr);

    let mut collect = Collect::default();
    assert_eq!(nic.rx(1, eth.recv(gn.recv(&mut collect))), Ok(1));

    let renewed = gn.links().address(DeviceId(0)).unwrap();
    assert_ne!(renewed.mid(), OWN.mid());
    assert_eq!(renewed.station_type(), OWN.station_type());
    assert!(!renewed.link_address().is_multicast());
    assert_eq!(eth.addr(), renewed.link_address());
    assert_eq!(gn.counters().regenerated, 1);
    assert_eq!(collect.0.len(), 1);
    assert!(gn.loct().find_mid(OWN.mid()).is_some());
}

#[test]
fn entries_expire() {
    let mut locations = [LocationEntry::default(); 4];
    let mut links = [Link::default(); 1];
    let mut gn = station(OWN, OWN_POSITION, &mut locations, &mut links);
    let mut eth = eth::Endpoint::new(OWN.link_address());

    let mut nic = External::new_recv(Slice::One(Vec::new()));
    write_frame(nic.get_mut(0).unwrap(), OWN.link_address(), &guc_repr(SOURCE, OWN, OWN_POSITION, 1));

    let mut collect = Collect::default();
    assert_eq!(nic.rx(1, eth.recv(gn.recv(&mut collect))), Ok(1));
    assert_eq!(gn.loct().len(), 1);

    // Sweeps are rate limited.
    assert_eq!(gn.poll(Instant::from_millis(500)), 0);
    assert_eq!(gn.poll(Instant::from_secs(10)), 0);
    assert_eq!(gn.loct().len(), 1);

    assert_eq!(gn.poll(Instant::from_secs(25)), 1);
    assert_eq!(gn.loct().len(), 0);
}

#[test]
fn ignores_foreign_ethertype() {
    let mut locations = [LocationEntry::default(); 4];
    let mut links = [Link::default(); 1];
    let mut gn = station(OWN, OWN_POSITION, &mut locations, &mut links);
    let mut eth = eth::Endpoint::new(OWN.link_address());

    let mut nic = External::new_recv(Slice::One(Vec::new()));
    let buffer = nic.get_mut(0).unwrap();
    write_frame(buffer, OWN.link_address(), &guc_repr(SOURCE, OWN, OWN_POSITION, 1));
    ethernet_frame::new_unchecked_mut(&mut buffer[..]).set_ethertype(EthernetProtocol::Unknown(0x0800));

    let mut collect = Collect::default();
    assert_eq!(nic.rx(1, eth.recv(gn.recv(&mut collect))), Ok(1));
    assert!(collect.0.is_empty());
    assert_eq!(gn.counters().discarded, 0);
    assert_eq!(gn.loct().len(), 0);
}

#[test]
fn sequence_number_advances() {
    let mut locations = [LocationEntry::default(); 4];
    let mut links = [Link::default(); 1];
    let mut gn = station(SOURCE, SOURCE_POSITION, &mut locations, &mut links);
    learn_neighbour(&mut gn, OWN, OWN_POSITION);
    let mut eth = eth::Endpoint::new(SOURCE.link_address());
    let mut nic = External::new_send(Slice::Many(vec![vec![0; 256]; 3]));

    for expected in 1..=3 {
        let mut sender = gn.guc_send(OWN, NextHeader::BtpB, &PAYLOAD);
        assert_eq!(nic.tx(1, eth.send(gn.send(&mut sender))), Ok(1));
        let buffer = nic.get(expected - 1).unwrap();
        let frame = ethernet_frame::new_checked(&buffer[..]).unwrap();
        let repr = Repr::parse(geonet::new_checked(frame.payload_slice()).unwrap()).unwrap();
        assert_eq!(repr.extended.sequence_number(), SequenceNumber(expected as u16));
    }
}

#[test]
fn mid_of_link_address() {
    let mid = Mid::from(OWN.link_address());
    assert_eq!(mid, OWN.mid());
}
