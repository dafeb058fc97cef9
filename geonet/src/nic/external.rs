//! A stub nic whose buffers come from an external source.
//!
//! The buffers are split into a prefix of packets to be received and a suffix of slots for
//! packets to be sent. Received buffers may be queued again, which models a router forwarding a
//! packet in place, and is counted in `requeued`.
use core::ops::{Deref, DerefMut};
use crate::wire::Payload;
use crate::time::Instant;

use super::{Info, Recv, Send};
use super::common::{EnqueueFlag, PacketInfo};
use crate::layer::Result;

/// The handle of the `External` nic.
pub struct Handle(EnqueueFlag);

/// A nic backed by a caller supplied slice of buffers.
pub struct External<T> {
    /// Backing buffer, accessible as a slice of packet payloads.
    buffer: T,

    /// Number of received packages.
    recv: usize,

    /// Number of sent packages.
    sent: usize,

    /// Number of received packages that were queued for sending again.
    requeued: usize,

    /// The index of the split.
    split: usize,

    /// The info struct just copied for each packet.
    info: PacketInfo,
}

impl<T> External<T> {
    /// Set the index of the last to-receive buffer.
    pub fn set_one_past_receive(&mut self, at: usize) {
        self.split = at;
    }

    /// Reset sending, resending into the first buffer.
    pub fn reset_send(&mut self) {
        self.sent = 0;
    }

    /// Reset receiving, receiving the first buffer again.
    pub fn reset_receive(&mut self) {
        self.recv = 0;
    }

    /// Number of received buffers that were queued again.
    pub fn requeued(&self) -> usize {
        self.requeued
    }
}

impl<T, P> External<T> where T: Deref<Target=[P]> {
    /// A new external nic, only sending packets.
    pub fn new_send(buffer: T) -> Self {
        External {
            buffer,
            recv: 0,
            sent: 0,
            requeued: 0,
            split: 0,
            info: PacketInfo {
                timestamp: Instant::from_millis(0),
            },
        }
    }

    /// A new external nic, only receiving packets.
    pub fn new_recv(buffer: T) -> Self {
        let len = buffer.len();
        let mut nic = Self::new_send(buffer);
        nic.split = len;
        nic
    }

    /// Remaining number of buffers to receive.
    pub fn to_recv(&self) -> usize {
        self.buffer.len()
            .min(self.split)
            .saturating_sub(self.recv)
    }

    /// Remaining number of buffers to send.
    pub fn to_send(&self) -> usize {
        self.buffer.len()
            .saturating_sub(self.split)
            .saturating_sub(self.sent)
    }

    /// Change the buffer state such that all packets are pending to be received.
    pub fn receive_all(&mut self) {
        self.set_one_past_receive(self.buffer.len());
        self.reset_receive();
    }

    /// Change the buffer state such that all packets are pending to be sent.
    pub fn send_all(&mut self) {
        self.set_one_past_receive(0);
        self.reset_send();
    }

    /// Access one of the buffers.
    pub fn get(&self, idx: usize) -> Option<&P> {
        self.buffer.get(idx)
    }

    /// Mutably access one of the buffers.
    pub fn get_mut(&mut self, idx: usize) -> Option<&mut P>
        where T: DerefMut,
    {
        self.buffer.get_mut(idx)
    }

    /// Update the timestamp on all future packets.
    pub fn set_current_time(&mut self, instant: Instant) {
        self.info.timestamp = instant;
    }

    fn next_recv(&self) -> usize {
        self.recv
    }

    fn next_send(&self) -> usize {
        self.split + self.sent
    }
}

impl<T, P> super::Device for External<T>
where
    T: Deref<Target=[P]> + DerefMut,
    P: Payload,
{
    type Handle = Handle;
    type Payload = P;

    fn tx(&mut self, max: usize, mut sender: impl Send<Self::Handle, Self::Payload>)
        -> Result<usize>
    {
        if max == 0 || self.to_send() == 0 {
            return Ok(0)
        }

        let next_id = self.next_send();
        let buffer = &mut self.buffer[next_id];

        let mut flag = Handle(EnqueueFlag::set_true(self.info));
        sender.send(super::Packet {
            handle: &mut flag,
            payload: buffer,
        });

        if flag.0.was_sent() {
            self.sent += 1;
            Ok(1)
        } else {
            Ok(0)
        }
    }

    fn rx(&mut self, max: usize, mut receptor: impl Recv<Self::Handle, Self::Payload>)
        -> Result<usize>
    {
        if max == 0 || self.to_recv() == 0 {
            return Ok(0)
        }

        let next_id = self.next_recv();
        let buffer = &mut self.buffer[next_id];

        let mut flag = Handle(EnqueueFlag::set_true(self.info));
        receptor.receive(super::Packet {
            handle: &mut flag,
            payload: buffer,
        });

        if flag.0.was_sent() {
            self.requeued += 1;
        }

        self.recv += 1;
        Ok(1)
    }
}

impl super::Handle for Handle {
    fn queue(&mut self) -> Result<()> {
        self.0.queue()
    }

    fn info(&self) -> &dyn Info {
        self.0.info()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::FnHandler;
    use crate::managed::Slice;
    use crate::nic::{Device, Handle as _, Packet};

    fn mark_and_queue(packet: Packet<Handle, Vec<u8>>) {
        packet.payload[0] = 42;
        assert_eq!(packet.handle.queue(), Ok(()));
    }

    fn expect_marked(packet: Packet<Handle, Vec<u8>>) {
        assert_eq!(packet.payload[0], 42);
    }

    fn ignore(_: Packet<Handle, Vec<u8>>) { }

    #[test]
    fn send_then_receive() {
        let mut nic = External::new_send(Slice::Many(vec![vec![0u8; 4], vec![0u8; 4]]));
        assert_eq!(nic.to_send(), 2);

        let sent = nic.tx(1, FnHandler(mark_and_queue));
        assert_eq!(sent, Ok(1));
        assert_eq!(nic.to_send(), 1);

        nic.receive_all();
        let received = nic.rx(1, FnHandler(expect_marked));
        assert_eq!(received, Ok(1));
        assert_eq!(nic.requeued(), 0);

        let received = nic.rx(1, FnHandler(mark_and_queue));
        assert_eq!(received, Ok(1));
        assert_eq!(nic.requeued(), 1);
        assert_eq!(nic.to_recv(), 0);
    }

    #[test]
    fn unqueued_is_not_sent() {
        let mut nic = External::new_send(Slice::One(vec![0u8; 4]));
        let sent = nic.tx(1, FnHandler(ignore));
        assert_eq!(sent, Ok(0));
        assert_eq!(nic.to_send(), 1);
    }
}
