//! The ethernet layer.
//!
//! This is tasked with decoding the framed ethernet data that the physical device deals with, and
//! putting GeoNetworking packets into an ethernet framing. The state within the ethernet endpoint
//! is tiny: only the hardware address of the station. GeoNetworking derives its link layer
//! destinations from the MID of its own addresses so no address resolution takes place here.
use crate::wire::Payload;

mod endpoint;
mod packet;

pub use endpoint::{
    Endpoint,
    Receiver,
    Sender,
};

pub use packet::{
    Controller,
    Init,
    In as InPacket,
    Out as OutPacket,
    Raw as RawPacket,
};

/// A ethernet receiver.
///
/// Processes incoming ethernet frames. The buffer may be reused for forwarding the packet.
pub trait Recv<P: Payload> {
    /// Inspect one incoming, valid ethernet frame in a packet buffer.
    fn receive(&mut self, frame: InPacket<P>);
}

/// An ethernet sender.
///
/// Utilize raw packet buffers to generate ethernet frames with an encapsulated upper layer
/// payload.
pub trait Send<P: Payload> {
    /// Fill in one available packet buffer.
    ///
    /// Use the `Controller`'s [`src_addr`] method to find the hardware address identifying this
    /// device and use it during initialization of the frame within the buffer.
    ///
    /// [`src_addr`]: struct.Controller.html#method.src_addr
    fn send(&mut self, raw: RawPacket<P>);
}

impl<P: Payload, E> Recv<P> for &'_ mut E
    where E: Recv<P>
{
    fn receive(&mut self, frame: InPacket<P>) {
        (**self).receive(frame)
    }
}

impl<P: Payload, E> Send<P> for &'_ mut E
    where E: Send<P>
{
    fn send(&mut self, frame: RawPacket<P>) {
        (**self).send(frame)
    }
}
