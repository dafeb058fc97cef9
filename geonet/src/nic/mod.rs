//! Encapsulates a network interface card.
//!
//! The GeoNetworking router runs on top of an Ethernet-like broadcast medium. The device hands out
//! packet buffers together with a handle through which a buffer is queued for transmission. This
//! crate contains only a software device, [`External`], whose buffers are supplied by the caller.
//! Binding to a real interface means implementing [`Device`] for it.
//!
//! [`External`]: external/struct.External.html
//! [`Device`]: trait.Device.html
pub mod common;
pub mod external;

use crate::wire::Payload;
use crate::layer::{Result, FnHandler};
use crate::time::Instant;

/// A reference to memory holding packet data and a handle.
///
/// The `Payload` is as an interface into internal library types for packet parsing while the
/// `Handle` is an interface to the device to provide operations for packet handling.
pub struct Packet<'a, H, P>
where
    H: Handle + ?Sized + 'a,
    P: Payload + ?Sized + 'a,
{
    /// A control handle to the network interface and current buffer.
    pub handle: &'a mut H,
    /// One buffer containing an Ethernet frame.
    pub payload: &'a mut P,
}

/// A controller for the network operations of the payload buffer.
///
/// This trait is split from the main payload since it must be possible to use its method even
/// while the payload itself is borrowed (e.g. within a parsed packet representation).
pub trait Handle {
    /// Queue this packet to be sent.
    ///
    /// Fails when the device has no resources to queue the packet or if the buffer can not be
    /// sent at all.
    fn queue(&mut self) -> Result<()>;

    /// Information on the packet intended for upper layers.
    fn info(&self) -> &dyn Info;
}

/// The metadata associated with a packet buffer.
pub trait Info {
    /// The reference time stamp for this packet.
    ///
    /// Timestamps should be monotonically increasing. The GeoNetworking layer uses them for the
    /// Location Table lifetime, not for the timestamps of position vectors.
    fn timestamp(&self) -> Instant;
}

/// A layer 2 device.
pub trait Device {
    /// The control handle type also providing packet meta information.
    type Handle: Handle + ?Sized;
    /// The payload buffer type of this device.
    type Payload: Payload + ?Sized;

    /// Transmit some packets utilizing the `sender`.
    ///
    /// Up to `max` packet buffers are chosen by the device. They are provided to the sender
    /// callback which may initialize their contents and decide to queue them.
    fn tx(&mut self, max: usize, sender: impl Send<Self::Handle, Self::Payload>)
        -> Result<usize>;

    /// Receive packet utilizing the `receptor`.
    ///
    /// Dequeue up to `max` received packets and provide them to the receiver callback.
    fn rx(&mut self, max: usize, receiver: impl Recv<Self::Handle, Self::Payload>)
        -> Result<usize>;
}

/// A raw network packet receiver.
pub trait Recv<H: Handle + ?Sized, P: Payload + ?Sized> {
    /// Receive a single packet.
    fn receive(&mut self, packet: Packet<H, P>);
}

/// A raw network packet sender.
pub trait Send<H: Handle + ?Sized, P: Payload + ?Sized> {
    /// Fill a single packet for sending.
    fn send(&mut self, packet: Packet<H, P>);
}

impl<F, H: Handle + ?Sized, P: Payload + ?Sized> Recv<H, P> for FnHandler<F>
    where F: FnMut(Packet<H, P>)
{
    fn receive(&mut self, packet: Packet<H, P>) {
        (self.0)(packet)
    }
}

impl<F, H: Handle + ?Sized, P: Payload + ?Sized> Send<H, P> for FnHandler<F>
    where F: FnMut(Packet<H, P>)
{
    fn send(&mut self, packet: Packet<H, P>) {
        (self.0)(packet)
    }
}

impl<F, H: Handle + ?Sized, P: Payload + ?Sized> Recv<H, P> for &'_ mut F
    where F: Recv<H, P>
{
    fn receive(&mut self, packet: Packet<H, P>) {
        (**self).receive(packet)
    }
}

impl<F, H: Handle + ?Sized, P: Payload + ?Sized> Send<H, P> for &'_ mut F
    where F: Send<H, P>
{
    fn send(&mut self, packet: Packet<H, P>) {
        (**self).send(packet)
    }
}
