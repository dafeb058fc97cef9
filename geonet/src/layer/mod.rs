//! The process logic of protocol layers.
//!
//! ## Layering
//!
//! Each protocol layer is split into two parts; the packet logic contained in `wire` and the
//! processing part in this module. An endpoint represents the local state of a protocol: for
//! GeoNetworking that is the Location Table, the addresses linked to devices and the settings.
//! This state can be modified by the user program while no processing takes place.
//!
//! ## Receiving
//!
//! Layers process packets by routing them to the layer conceptually above them. A receiver is
//! created by borrowing the endpoint together with the handler of the upper layer, and is then
//! passed to the layer below:
//!
//! ```text
//! nic.rx(n, eth.recv(gn.recv(transport)))
//! ```
//!
//! The packet handed to the upper layer keeps a handle to all layers below it so that the upper
//! layer can still use them, e.g. for answering in the same buffer.
//!
//! ## Sending
//!
//! Sending works the same way in reverse. The device offers raw buffers, each layer wraps the
//! buffer and its own handle and passes it to the sender above. The upper layer initializes the
//! packet through `prepare`, filling the headers of all layers below it, writes its payload and
//! finally calls `send` to queue the buffer on the device.

pub mod eth;
pub mod gn;

/// The result type of endpoint operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors of endpoint operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Error {
    /// The operation was not permitted.
    ///
    /// Returned when the device, endpoint, receiver or sender does not allow or implement an
    /// operation. An address configuration method that is not supported is one example.
    Illegal,

    /// Not enough space for the requested packet.
    ///
    /// May also be returned when trying to resize a packet but the requested length can not be
    /// fulfilled. In contrast to `Illegal` this would signal that a smaller size may be possible.
    BadSize,

    /// Unable to find a route towards the destination address.
    Unreachable,

    /// The action could not be completed because there were not enough resources.
    ///
    /// It would have been legal with more resources, e.g. a full Location Table. You may want to
    /// expire old entries and retry.
    Exhausted,

    /// Information from the management entity is not available.
    ///
    /// The current time or position of the station is required but no source for it has been
    /// configured.
    Unavailable,
}

/// A standard wrapper for a function implementing receive or send traits.
///
/// Keeps the type alias overhead low by providing a single wrapper type that implements the send
/// and receive traits for all layers, where applicable.
pub struct FnHandler<F>(pub F);

/// Can convert from a wire error.
///
/// This indicates some layer tried to operate on a packet but failed.
impl From<crate::wire::Error> for Error {
    fn from(_: crate::wire::Error) -> Self {
        Error::Illegal
    }
}

/// Can convert from a payload error.
///
/// One common cause is failure to resize the buffer to the necessary size.
impl From<crate::wire::PayloadError> for Error {
    fn from(err: crate::wire::PayloadError) -> Self {
        use crate::wire::PayloadError;
        match err {
            PayloadError::BadSize => Error::BadSize,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let msg = match self {
            Error::Illegal => "operation not permitted",
            Error::BadSize => "buffer has the wrong size",
            Error::Unreachable => "destination unreachable",
            Error::Exhausted => "resources exhausted",
            Error::Unavailable => "management information unavailable",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for Error {}
