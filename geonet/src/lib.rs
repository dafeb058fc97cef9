//! A GeoNetworking router core for user-space networking.
//!
//! ## Table of contents
//!
//! 1. [Design](#design-and-relevant-core-concepts)
//! 2. [The wire module](wire/index.html)
//!    1. [Overview of packet representations](wire/index.html#an-overview-over-packet-representations)
//!    1. [GeoNetworking headers](wire/geonet/index.html)
//! 3. [The layers](layer/index.html)
//!    1. [The eth layer](layer/eth/index.html)
//!    1. [The GeoNetworking layer](layer/gn/index.html)
//! 4. [Network interfaces](nic/index.html)
//! 5. Internals
//!    1. [The managed module](managed/index.html)
//!    1. [Time](time/index.html)
//!
//! ## Design and relevant core concepts
//!
//! ITS stations (vehicles, roadside units) exchange packets over a shared broadcast medium and
//! route by position instead of by a fixed topology. This crate implements the network layer of
//! such a station as a tree of callbacks: the network card hands a buffer to the ethernet layer,
//! which hands it on to the GeoNetworking endpoint, which finally hands the payload to a transport
//! handler (BTP-A or BTP-B). Sending goes the same path in the other direction.
//!
//! The endpoint state (Location Table, the addresses linked to devices, settings) is owned by the
//! caller and borrowed by each layer only for the duration of a receive or send call. There is no
//! process wide state. The memory of the tables is passed in on construction so that the
//! processing itself never allocates.
#![warn(missing_docs)]
#![warn(unreachable_pub)]

#[macro_use] mod macros;
pub mod nic;
pub mod layer;
pub mod managed;
pub mod time;
pub mod wire;
