//! Relays one GeoUnicast packet along a line of stations.
//!
//! # Usage
//!
//! The stations are placed along a meridian, `spacing` tenths of a microdegree apart. Each one
//! knows only its direct neighbours, except the first which also knows the position of the last.
//! The first station originates a packet to the last one, all stations in between forward it
//! greedily in the same buffer.
//!
//!   > $ cargo run --example relay -- --stations 5 --hop-limit 6 hello
//!
//! Lowering the hop limit below the number of hops makes the packet die on the way.
use structopt::StructOpt;

use geonet::layer::{eth, gn};
use geonet::layer::gn::Management;
use geonet::managed::Slice;
use geonet::nic::{external::External, Device};
use geonet::time::{Duration, Instant, Timestamp};
use geonet::wire::ethernet_frame;
use geonet::wire::geonet::{Address, NextHeader, SequenceNumber, StationType};

struct Station {
    eth: eth::Endpoint,
    gn: gn::Endpoint<'static, gn::Fixed>,
    address: Address,
    position: gn::LocalPosition,
}

fn main() {
    let config = Config::from_args();
    let count = config.stations.max(2);

    let mut settings = gn::Settings::default();
    settings.set(gn::Setting::DefaultHopLimit, gn::Value::Number(config.hop_limit))
        .expect("Hop limit must fit 8 bits");
    settings.set(gn::Setting::DefaultPacketLifetime,
            gn::Value::Duration(Duration::from_secs(config.lifetime)))
        .expect("Lifetime must not exceed the maximum packet lifetime");

    if config.verbose {
        for &key in gn::Settings::KEYS.iter() {
            println!("{:?} = {}", key, settings.get(key));
        }
    }

    let now = gn::SystemClock::default().time()
        .expect("System clock before the Unix epoch");

    let mut stations: Vec<Station> = (0..count).map(|idx| {
        let position = gn::LocalPosition {
            latitude: config.latitude + config.spacing * idx as i32,
            longitude: config.longitude,
            speed: 0,
            heading: 0,
            accurate: true,
        };

        let mut gn = gn::Endpoint::new(
                gn::LocationTable::new(vec![gn::LocationEntry::default(); 16]),
                gn::Links::new(vec![gn::Link::default(); 1]),
                settings)
            .with_management(gn::Fixed {
                time: Some(now),
                position: Some(position),
            });
        gn.seed(config.seed.wrapping_add(idx as u64));

        let address = gn.link_add(gn::DeviceId(0), gn::Method::Auto, StationType::RoadsideUnit, 0)
            .expect("Auto configuration can not fail");
        println!("station {}: {} at {}", idx, address, position.latitude);

        Station {
            eth: eth::Endpoint::new(address.link_address()),
            gn,
            address,
            position,
        }
    }).collect();

    // Beacons are not exchanged, tell each station about its neighbours instead.
    let known: Vec<(Address, gn::LocalPosition)> = stations.iter()
        .map(|station| (station.address, station.position))
        .collect();
    for (idx, station) in stations.iter_mut().enumerate() {
        let left = idx.checked_sub(1);
        let right = Some(idx + 1).filter(|&right| right < count);
        for neighbour in left.into_iter().chain(right) {
            learn(&mut station.gn, known[neighbour], true, now);
        }
    }
    learn(&mut stations[0].gn, known[count - 1], count == 2, now);

    let mut nic = External::new_send(Slice::One(vec![0; 1 << 11]));
    let destination = known[count - 1].0;
    let first = &mut stations[0];
    let mut sender = first.gn.guc_send(destination, NextHeader::BtpB, config.payload.as_bytes());
    nic.tx(1, first.eth.send(first.gn.send(&mut sender)))
        .expect("External device can not fail");
    match sender.result() {
        Some(Ok(())) => println!("station 0: sent to {}", destination),
        other => {
            println!("station 0: could not send, {:?}", other);
            return;
        },
    }

    for (idx, station) in stations.iter_mut().enumerate().skip(1) {
        let requeued = nic.requeued();
        nic.receive_all();
        nic.rx(1, station.eth.recv(station.gn.recv_with(deliver)))
            .expect("External device can not fail");

        let counters = station.gn.counters();
        if counters.delivered > 0 {
            println!("station {}: delivered", idx);
            break;
        }

        if nic.requeued() == requeued {
            println!("station {}: dropped, {:?}", idx, counters.last_discard);
            break;
        }

        let frame = ethernet_frame::new_checked(&nic.get(0).expect("One buffer")[..])
            .expect("Forwarded a valid frame");
        println!("station {}: forwarded to {}", idx, frame.dst_addr());
    }
}

fn deliver(packet: gn::InPacket<Vec<u8>>) {
    let payload = packet.packet.payload_slice();
    println!("received {:?}", String::from_utf8_lossy(payload));
}

fn learn(
    endpoint: &mut gn::Endpoint<gn::Fixed>,
    (address, position): (Address, gn::LocalPosition),
    is_neighbour: bool,
    now: u64,
) {
    let timestamp = Timestamp::from_unix_millis(now);
    let lifetime = endpoint.settings().lifetime_locte;
    let locations = endpoint.loct_mut();
    locations.add(address).expect("Location Table has room");
    locations.update(
            address,
            position.vector(address, timestamp),
            is_neighbour,
            SequenceNumber(0),
            address.station_type(),
            timestamp)
        .expect("Entry was just added")
        .renew(Instant::from_millis(0), lifetime);
}

#[derive(StructOpt)]
struct Config {
    /// Number of stations in the line.
    #[structopt(long = "stations", default_value = "4")]
    stations: usize,
    /// Distance between stations in 1/10 microdegree.
    #[structopt(long = "spacing", default_value = "50000")]
    spacing: i32,
    #[structopt(long = "latitude", default_value = "520000000")]
    latitude: i32,
    #[structopt(long = "longitude", default_value = "45000000")]
    longitude: i32,
    #[structopt(long = "hop-limit", default_value = "10")]
    hop_limit: u32,
    /// Packet lifetime in seconds.
    #[structopt(long = "lifetime", default_value = "60")]
    lifetime: u64,
    #[structopt(long = "seed", default_value = "0")]
    seed: u64,
    #[structopt(short = "v", long = "verbose")]
    verbose: bool,
    payload: String,
}
