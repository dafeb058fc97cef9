//! Greedy forwarding.
//!
//! The next hop of a packet is the neighbour closest to its destination, provided that neighbour
//! is closer than the router itself. Otherwise the packet has reached a local optimum and is
//! either buffered, if its traffic class allows, or broadcast.
use crate::wire::geonet::{Mid, TrafficClass};

use super::loct::Table;

/// Mean earth radius in meters.
const EARTH_RADIUS: f64 = 6_371_000.0;

/// Coordinates are in tenths of a microdegree.
const UNITS_PER_DEGREE: f64 = 10_000_000.0;

/// A point on the earth surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    /// Latitude in 1/10 microdegree.
    pub latitude: i32,
    /// Longitude in 1/10 microdegree.
    pub longitude: i32,
}

/// The forwarding decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NextHop {
    /// Unicast to this neighbour.
    Neighbour(Mid),
    /// No neighbour makes progress, broadcast to everyone in range.
    Broadcast,
    /// No neighbour makes progress and the packet may be stored until one does.
    Buffer,
}

impl Point {
    /// Create a point from fixed point coordinates.
    pub fn new(latitude: i32, longitude: i32) -> Self {
        Point { latitude, longitude }
    }

    /// Great circle distance in meters, with the haversine formula.
    pub fn distance(self, other: Point) -> f64 {
        let lat_a = radians(self.latitude);
        let lat_b = radians(other.latitude);
        let d_lat = lat_b - lat_a;
        let d_lon = radians(other.longitude) - radians(self.longitude);

        let a = (d_lat / 2.0).sin().powi(2)
            + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS * c
    }
}

fn radians(fixed: i32) -> f64 {
    (f64::from(fixed) / UNITS_PER_DEGREE).to_radians()
}

/// Choose the next hop towards `destination`.
///
/// Only entries flagged as neighbours are considered. Ties between neighbours keep the one with
/// the lowest MID.
pub fn next_hop(
    table: &Table,
    own: Point,
    destination: Point,
    traffic_class: TrafficClass,
) -> NextHop {
    let own_distance = own.distance(destination);

    let closest = table.neighbours()
        .map(|entry| {
            let position = &entry.position.short;
            let at = Point::new(position.latitude, position.longitude);
            (entry.link_address(), at.distance(destination))
        })
        .fold(None, |best: Option<(Mid, f64)>, (mid, distance)| match best {
            Some((_, best_distance)) if best_distance <= distance => best,
            _ => Some((mid, distance)),
        });

    match closest {
        Some((mid, distance)) if distance < own_distance => {
            net_trace!("greedy: next hop {} at {:.0}m, own {:.0}m", mid, distance, own_distance);
            NextHop::Neighbour(mid)
        },
        _ if traffic_class.store_carry_forward => NextHop::Buffer,
        _ => NextHop::Broadcast,
    }
}
