use core::error::Error;
use std::{net::SocketAddr, sync::Arc};

use log::{error, info, warn};
use tokio::net::{TcpListener, ToSocketAddrs, UdpSocket};

use crate::{room_registry::RoomRegistry, tcp_handler::TcpHandler, udp_handler::UdpHandler};

/// Owns the control listener and the data socket; all room state lives in
/// the injected registry.
pub struct ChatServer {
    tcp_listener: TcpListener,
    udp_socket: UdpSocket,
    registry: Arc<RoomRegistry>,
}

impl ChatServer {
    pub async fn bind<T, U>(
        tcp_addr: T,
        udp_addr: U,
        registry: Arc<RoomRegistry>,
    ) -> Result<Self, Box<dyn Error + Send + Sync>>
    where
        T: ToSocketAddrs,
        U: ToSocketAddrs,
    {
        Ok(Self {
            tcp_listener: TcpListener::bind(tcp_addr).await?,
            udp_socket: UdpSocket::bind(udp_addr).await?,
            registry,
        })
    }

    pub fn local_tcp_addr(&self) -> std::io::Result<SocketAddr> {
        self.tcp_listener.local_addr()
    }

    pub fn local_udp_addr(&self) -> std::io::Result<SocketAddr> {
        self.udp_socket.local_addr()
    }

    pub async fn listen(self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let ChatServer {
            tcp_listener,
            udp_socket,
            registry,
        } = self;

        let udp_registry = Arc::clone(&registry);
        let mut udp_task: tokio::task::JoinHandle<Result<(), Box<dyn Error + Send + Sync>>> =
            tokio::spawn(async move { UdpHandler::handle_socket(udp_socket, udp_registry).await });

        loop {
            tokio::select! {
                result = &mut udp_task => {
                    return result?;
                }

                result = tcp_listener.accept() => {
                    let (tcp_stream, peer) = match result {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            warn!("Failed to accept connection: {}", e);
                            continue;
                        }
                    };

                    let registry = Arc::clone(&registry);

                    tokio::spawn(async move {
                        info!("{} opened a control connection", peer);

                        if let Err(e) = TcpHandler::handle_stream(tcp_stream, &registry).await {
                            error!("Error handling control connection from {}: {}", peer, e);
                        }
                    });
                }
            }
        }
    }
}
