mod chat_interface;
mod chat_session;
mod cli_display;
mod client;
mod pre_chat_interface;
mod prompt;

use clap::Parser;
use roomchat_shared::{TCP_PORT, UDP_PORT};

use crate::client::Client;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[arg(short, long)]
    username: Option<String>,

    #[arg(short, long, default_value = "127.0.0.1")]
    server_address: String,

    #[arg(long, default_value_t = TCP_PORT)]
    tcp_port: u16,

    #[arg(long, default_value_t = UDP_PORT)]
    udp_port: u16,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = Client::run(
        &args.server_address,
        args.tcp_port,
        args.udp_port,
        args.username,
    )
    .await
    {
        eprintln!("{:#}", e);
    }
}
