use anyhow::{Context, Result, bail};
use roomchat_shared::{
    control_frame::{ControlFrame, ReceivedControlFrame},
    wire_code::ControlState,
};
use tokio::net::TcpStream;

use crate::{
    chat_interface::ChatInterface, cli_display::CliDisplay, pre_chat_interface::PreChatInterface,
};

pub struct Client;

impl Client {
    pub async fn run(
        server_addr: &str,
        tcp_port: u16,
        udp_port: u16,
        username: Option<String>,
    ) -> Result<()> {
        let control_addr = format!("{}:{}", server_addr, tcp_port);
        let data_addr = format!("{}:{}", server_addr, udp_port);

        let session = match PreChatInterface::run(&control_addr, username).await? {
            Some(session) => session,
            None => return Ok(()),
        };

        CliDisplay::print_joined(&session);

        ChatInterface::run(&data_addr, &session).await
    }
}

/// Runs one control exchange on a fresh connection. `None` means the server
/// acknowledged the request but closed without answering.
pub async fn send_request(control_addr: &str, request: &ControlFrame) -> Result<Option<ControlFrame>> {
    let mut tcp_stream = TcpStream::connect(control_addr)
        .await
        .with_context(|| format!("Error connecting to server at {}", control_addr))?;

    request.write_to_stream(&mut tcp_stream).await?;

    match ControlFrame::read_from_stream(&mut tcp_stream).await? {
        ReceivedControlFrame::Frame(frame) if frame.state == ControlState::Ack => {}
        ReceivedControlFrame::Frame(frame) => {
            bail!("Expected an acknowledgement from server, got {}", frame.state)
        }
        ReceivedControlFrame::Closed => {
            bail!("Unexpected EOF from server while waiting for acknowledgement")
        }
    }

    CliDisplay::print_processing();

    match ControlFrame::read_from_stream(&mut tcp_stream).await? {
        ReceivedControlFrame::Frame(frame) => Ok(Some(frame)),
        ReceivedControlFrame::Closed => Ok(None),
    }
}
