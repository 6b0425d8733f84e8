use core::error::Error;
use std::{net::SocketAddr, sync::Arc, time::Duration};

use log::{debug, error, info, warn};
use roomchat_shared::{
    chat_frame::{ChatFrame, MAX_DATAGRAM_LENGTH},
    wire_code::ChatOperation,
};
use tokio::net::UdpSocket;

use crate::{room::Member, room_registry::RoomRegistry};

pub struct UdpHandler;

impl UdpHandler {
    /// Receives datagrams forever, handing each one to its own task.
    pub async fn handle_socket(
        socket: UdpSocket,
        registry: Arc<RoomRegistry>,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let socket = Arc::new(socket);
        let mut buf = [0u8; MAX_DATAGRAM_LENGTH];

        loop {
            match socket.recv_from(&mut buf).await {
                Ok((n, from_addr)) => {
                    let datagram = buf[..n].to_vec();
                    let socket = Arc::clone(&socket);
                    let registry = Arc::clone(&registry);

                    tokio::spawn(async move {
                        Self::handle_datagram(&socket, &registry, &datagram, from_addr).await;
                    });
                }
                Err(e) => {
                    error!("Error receiving UDP packet: {}", e);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        }
    }

    /// Nothing is ever sent back to the sender on failure; the data channel
    /// has no acknowledgement.
    pub async fn handle_datagram(
        socket: &UdpSocket,
        registry: &RoomRegistry,
        datagram: &[u8],
        from_addr: SocketAddr,
    ) {
        let frame = match ChatFrame::decode(datagram) {
            Ok(frame) => frame,
            Err(e) => {
                debug!("Dropping datagram from {}: {}", from_addr, e);
                return;
            }
        };

        match frame.operation {
            ChatOperation::Exit => Self::handle_exit(socket, registry, &frame).await,
            ChatOperation::SendAddress => {
                Self::handle_send_address(registry, &frame, from_addr).await
            }
            ChatOperation::SendMessage => {
                Self::handle_send_message(socket, registry, &frame).await
            }
        }
    }

    async fn handle_exit(socket: &UdpSocket, registry: &RoomRegistry, frame: &ChatFrame) {
        let departure = match registry
            .remove_member(&frame.room_id, &frame.member_id)
            .await
        {
            Ok(departure) => departure,
            Err(e) => {
                debug!("Ignoring exit of {} from {}: {}", frame.member_id, frame.room_id, e);
                return;
            }
        };

        let notice = if departure.room_closed {
            format!("{} closed the room", departure.member_name)
        } else {
            format!("{} has left the room", departure.member_name)
        };

        send_immediate(socket, notice.as_bytes(), &departure.notify).await;
    }

    async fn handle_send_address(registry: &RoomRegistry, frame: &ChatFrame, from_addr: SocketAddr) {
        match registry
            .learn_address(&frame.room_id, &frame.member_id, from_addr)
            .await
        {
            Ok(()) => info!("Learned address {} for member {}", from_addr, frame.member_id),
            Err(e) => debug!(
                "Ignoring address from {} for {} in {}: {}",
                from_addr, frame.member_id, frame.room_id, e
            ),
        }
    }

    async fn handle_send_message(socket: &UdpSocket, registry: &RoomRegistry, frame: &ChatFrame) {
        if let Err(e) = registry
            .record_message(&frame.room_id, &frame.member_id, &frame.message)
            .await
        {
            debug!("Ignoring message from {} in {}: {}", frame.member_id, frame.room_id, e);
            return;
        }

        let members = match registry.list_members(&frame.room_id).await {
            Ok(members) => members,
            Err(e) => {
                debug!("Room {} vanished before broadcast: {}", frame.room_id, e);
                return;
            }
        };

        // Members that have not announced an address yet miss this message.
        let destinations: Vec<SocketAddr> = members.iter().filter_map(Member::address).collect();

        send_immediate(socket, frame.message.as_bytes(), &destinations).await;
    }
}

async fn send_immediate(socket: &UdpSocket, payload: &[u8], destinations: &[SocketAddr]) {
    let mut forwarded = 0;
    let mut dropped = 0;

    for &dest in destinations {
        match socket.send_to(payload, dest).await {
            Ok(_) => forwarded += 1,
            Err(e) => {
                dropped += 1;
                warn!("Failed to send to {}: {}", dest, e);
            }
        }
    }

    if forwarded > 0 || dropped > 0 {
        debug!("Broadcast {} bytes: {} forwarded, {} dropped", payload.len(), forwarded, dropped);
    }
}
