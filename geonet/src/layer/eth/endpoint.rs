use crate::layer::FnHandler;
use crate::wire::{EthernetAddress, EthernetFrame, Payload, PayloadMut};
use crate::nic;

use super::{Recv, Send};
use super::packet::{self, Controller};

/// The ethernet state of a station.
pub struct Endpoint {
    /// Our own address.
    ///
    /// Frames whose destination is neither this address nor broadcast are ignored.
    addr: EthernetAddress,
}

/// An endpoint borrowed for receiving.
///
/// Dispatching to higher protocols is configurerd here, and not in the endpoint state.
pub struct Receiver<'a, H> {
    endpoint: EthEndpoint<'a>,

    /// The upper protocol receiver.
    handler: H,
}

/// An endpoint borrowed for sending.
pub struct Sender<'a, H> {
    endpoint: EthEndpoint<'a>,

    /// The upper protocol sender.
    handler: H,
}

struct EthEndpoint<'a> {
    inner: &'a mut Endpoint,
}

impl Endpoint {
    /// Create an endpoint with a hardware address.
    pub fn new(addr: EthernetAddress) -> Self {
        Endpoint {
            addr,
        }
    }

    /// The configured hardware address.
    pub fn addr(&self) -> EthernetAddress {
        self.addr
    }

    /// Change the hardware address.
    ///
    /// The GeoNetworking layer does so when it regenerates its own address after a collision with
    /// another station.
    pub fn set_addr(&mut self, addr: EthernetAddress) {
        self.addr = addr;
    }

    /// Receive frames and pass those addressed to us to `handler`.
    pub fn recv<H>(&mut self, handler: H) -> Receiver<'_, H> {
        Receiver { endpoint: self.eth(), handler, }
    }

    /// Receive with a closure or function.
    pub fn recv_with<H>(&mut self, handler: H) -> Receiver<'_, FnHandler<H>> {
        self.recv(FnHandler(handler))
    }

    /// Offer buffers of the device to `handler`.
    pub fn send<H>(&mut self, handler: H) -> Sender<'_, H> {
        Sender { endpoint: self.eth(), handler, }
    }

    /// Send with a closure or function.
    pub fn send_with<H>(&mut self, handler: H) -> Sender<'_, FnHandler<H>> {
        self.send(FnHandler(handler))
    }

    fn eth(&mut self) -> EthEndpoint<'_> {
        EthEndpoint {
            inner: self,
        }
    }

    fn accepts(&self, dst_addr: EthernetAddress) -> bool {
        dst_addr == self.addr || dst_addr.is_broadcast()
    }
}

impl packet::Endpoint for EthEndpoint<'_> {
    fn src_addr(&mut self) -> EthernetAddress {
        self.inner.addr
    }

    fn set_src_addr(&mut self, addr: EthernetAddress) {
        self.inner.addr = addr;
    }
}

impl<H, P, T> nic::Recv<H, P> for Receiver<'_, T>
where
    H: nic::Handle,
    P: Payload,
    T: Recv<P>,
{
    fn receive(&mut self, packet: nic::Packet<H, P>) {
        let frame = match EthernetFrame::new_checked(packet.payload) {
            Ok(frame) => frame,
            Err(err) => {
                net_trace!("eth: dropping frame: {}", err);
                return
            },
        };

        let repr = frame.repr();
        if !self.endpoint.inner.accepts(repr.dst_addr) {
            return
        }

        let handle = Controller::new(packet.handle, &mut self.endpoint);
        let packet = packet::In { handle, frame };
        self.handler.receive(packet)
    }
}

impl<H, P, T> nic::Send<H, P> for Sender<'_, T>
where
    H: nic::Handle,
    P: Payload + PayloadMut,
    T: Send<P>,
{
    fn send(&mut self, nic::Packet { handle, payload }: nic::Packet<H, P>) {
        let handle = Controller::new(handle, &mut self.endpoint);
        let packet = packet::Raw::new(handle, payload);
        self.handler.send(packet)
    }
}

impl<P: Payload, F> Recv<P> for FnHandler<F>
    where F: FnMut(packet::In<P>)
{
    fn receive(&mut self, frame: packet::In<P>) {
        self.0(frame)
    }
}

impl<P: Payload, F> Send<P> for FnHandler<F>
    where F: FnMut(packet::Raw<P>)
{
    fn send(&mut self, frame: packet::Raw<P>) {
        self.0(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::managed::Slice;
    use crate::nic::{external::External, Device};
    use crate::layer::eth::Init;
    use crate::wire::{EthernetAddress, EthernetProtocol};

    const MAC_ADDR_1: EthernetAddress = EthernetAddress([0x02, 1, 2, 3, 4, 5]);
    const MAC_ADDR_2: EthernetAddress = EthernetAddress([0x02, 5, 4, 3, 2, 1]);

    static PAYLOAD_BYTES: [u8; 50] =
        [0xaa, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
         0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
         0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
         0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
         0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
         0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
         0x00, 0xff];

    fn send_to(mut frame: packet::Raw<Vec<u8>>, dst_addr: EthernetAddress) {
        let src_addr = frame.handle.src_addr();
        let init = Init {
            src_addr,
            dst_addr,
            ethertype: EthernetProtocol::GeoNetworking,
            payload: PAYLOAD_BYTES.len(),
        };
        let mut prepared = frame.prepare(init)
            .expect("Preparing frame mustn't fail in controlled environment");
        prepared
            .payload_mut_slice()
            .copy_from_slice(&PAYLOAD_BYTES[..]);
        prepared
            .send()
            .expect("Sending is possible");
    }

    fn send_self(frame: packet::Raw<Vec<u8>>) {
        send_to(frame, MAC_ADDR_1)
    }

    fn send_other(frame: packet::Raw<Vec<u8>>) {
        send_to(frame, MAC_ADDR_2)
    }

    fn send_broadcast(frame: packet::Raw<Vec<u8>>) {
        send_to(frame, EthernetAddress::BROADCAST)
    }

    fn simple_recv(frame: packet::In<Vec<u8>>) {
        assert_eq!(frame.frame.ethertype(), EthernetProtocol::GeoNetworking);
        assert_eq!(frame.frame.payload_slice(), &PAYLOAD_BYTES[..]);
    }

    fn unexpected_recv(_: packet::In<Vec<u8>>) {
        panic!("Frame for another station must be filtered");
    }

    #[test]
    fn simple() {
        let mut endpoint = Endpoint::new(MAC_ADDR_1);
        let mut nic = External::new_send(Slice::One(vec![0; 1024]));

        let sent = nic.tx(
            1,
            endpoint
                .send_with(send_self));
        assert_eq!(sent, Ok(1));

        nic.set_one_past_receive(1);
        let recv = nic.rx(
            1,
            endpoint
                .recv_with(simple_recv));
        assert_eq!(recv, Ok(1));
    }

    #[test]
    fn broadcast_accepted() {
        let mut endpoint = Endpoint::new(MAC_ADDR_1);
        let mut nic = External::new_send(Slice::One(vec![0; 1024]));

        assert_eq!(nic.tx(1, endpoint.send_with(send_broadcast)), Ok(1));
        nic.set_one_past_receive(1);
        assert_eq!(nic.rx(1, endpoint.recv_with(simple_recv)), Ok(1));
    }

    #[test]
    fn foreign_filtered() {
        let mut endpoint = Endpoint::new(MAC_ADDR_1);
        let mut nic = External::new_send(Slice::One(vec![0; 1024]));

        assert_eq!(nic.tx(1, endpoint.send_with(send_other)), Ok(1));
        nic.set_one_past_receive(1);
        assert_eq!(nic.rx(1, endpoint.recv_with(unexpected_recv)), Ok(1));
    }
}
