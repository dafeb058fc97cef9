/*! Low-level packet access and construction.

# An overview over packet representations

The `wire` module deals with the packet *representation*. It provides three levels of
functionality.

 * First, it provides functions to extract fields from sequences of octets, and to insert fields
   into sequences of octets. This happens in the lowercase structures e.g. [`ethernet_frame`] or
   [`geonet::geonet`].
 * Second, it provides a compact, high-level representation of header data that can be created from
   parsing and emitted into a sequence of octets. This happens through the `Repr` family of structs
   and enums, e.g. [`EthernetRepr`] or [`geonet::Repr`].
 * Third, it provides a type wrapper around sequences of octets valid as a particular packet
   format which potentially owns its data. It memoizes the parsed headers so that the layout is
   not recalculated on every access. This happens in the uppercase `Frame` or `Packet` structs,
   e.g. [`EthernetFrame`] or [`geonet::Packet`].

[`ethernet_frame`]: struct.ethernet_frame.html
[`geonet::geonet`]: geonet/struct.geonet.html
[`EthernetRepr`]: struct.EthernetRepr.html
[`geonet::Repr`]: geonet/struct.Repr.html
[`EthernetFrame`]: struct.EthernetFrame.html
[`geonet::Packet`]: geonet/struct.Packet.html

The byte containers are abstracted by [`Payload`] and [`PayloadMut`]. A framing packet needs to
resize its contents without the payload changing under it, and these two traits model exactly
that relationship.

[`Payload`]: trait.Payload.html
[`PayloadMut`]: trait.PayloadMut.html

The lowercase structures guarantee that, if their `check_len()` method returned `Ok(())`, no field
accessor or setter will panic. The `Packet::new_checked` constructors additionally parse and
validate the headers; when parsing untrusted input it is *necessary* to use them. When emitting
output it is *incorrect* to use them since a buffer that is reused may still contain data from a
previous packet. The buffer length for emission is calculated by `Repr::buffer_len`.

# Examples

Emit a GeoUnicast header and parse it back:

```rust
use geonet::time::Timestamp;
use geonet::wire::geonet::{guc, Address, LongPositionVector, Mid, SequenceNumber,
    ShortPositionVector, StationType};

let source = Address::new(false, StationType::PassengerCar, 276, Mid::new(0x0200_0000_0001));
let repr = guc::Repr {
    sequence_number: SequenceNumber(1),
    source: LongPositionVector {
        short: ShortPositionVector {
            address: source,
            timestamp: Timestamp(1104922570),
            latitude: 520_000_000,
            longitude: 45_000_000,
        },
        accurate: true,
        speed: 1389,
        heading: 900,
    },
    destination: ShortPositionVector::default(),
};

let mut buffer = vec![0; repr.buffer_len()];
repr.emit(guc::guc::new_unchecked_mut(&mut buffer));
let header = guc::guc::new_checked(&buffer).expect("truncated header");
assert_eq!(guc::Repr::parse(header), Ok(repr));
```
*/
#![allow(missing_docs)]

mod field {
    pub(crate) type Field = ::core::ops::Range<usize>;
    pub(crate) type Rest  = ::core::ops::RangeFrom<usize>;
}

mod ethernet;
mod error;
pub mod geonet;

#[path = "payload.rs"]
mod payload_impl;
mod payload_ext;

pub use self::payload_impl::{Reframe, Payload, PayloadMut, Error as PayloadError, payload};
pub use self::payload_ext::{ReframePayload, PayloadMutExt};

/// The result type of a reframing operation on [`PayloadMut`].
///
/// [`PayloadMut`]: trait.PayloadMut.html
pub type PayloadResult<T> = core::result::Result<T, PayloadError>;

pub use self::ethernet::{
    ethernet as ethernet_frame,
    EtherType as EthernetProtocol,
    Address as EthernetAddress,
    Frame as EthernetFrame,
    ParseAddressError as EthernetParseAddressError,
    Repr as EthernetRepr};

pub use self::error::{
    Error,
    Result};
