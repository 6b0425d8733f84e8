use std::sync::Arc;

use clap::Parser;
use log::{error, info};
use roomchat_server::{chat_server::ChatServer, room_registry::RoomRegistry};
use roomchat_shared::{TCP_PORT, UDP_PORT};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[arg(short, long, default_value = "0.0.0.0")]
    tcp: String,

    #[arg(short, long, default_value = "0.0.0.0")]
    udp: String,

    #[arg(long, default_value_t = TCP_PORT)]
    tcp_port: u16,

    #[arg(long, default_value_t = UDP_PORT)]
    udp_port: u16,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let tcp_addr = format!("{}:{}", args.tcp, args.tcp_port);
    let udp_addr = format!("{}:{}", args.udp, args.udp_port);

    let registry = Arc::new(RoomRegistry::new());

    let server = match ChatServer::bind(tcp_addr.clone(), udp_addr.clone(), registry).await {
        Ok(server) => server,
        Err(e) => {
            error!("Error binding: {}", e);
            return;
        }
    };

    info!("Chat server listening on TCP: {}, UDP: {}", tcp_addr, udp_addr);

    if let Err(e) = server.listen().await {
        error!("{}", e);
    }
}
