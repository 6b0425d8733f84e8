use core::error::Error;

use log::{info, warn};
use roomchat_shared::{
    control_frame::{ControlFrame, ReceivedControlFrame},
    frame_error::FrameError,
    wire_code::ControlOperation,
};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::{room_registry::RoomRegistry, tcp_command_handler::TcpCommandHandler};

pub struct TcpHandler;

impl TcpHandler {
    /// Serves exactly one request on a freshly accepted control connection:
    /// acknowledge, read, answer (or stay silent for a rejected join), return.
    pub async fn handle_stream<S>(
        mut stream: S,
        registry: &RoomRegistry,
    ) -> Result<(), Box<dyn Error + Send + Sync>>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        ControlFrame::ack().write_to_stream(&mut stream).await?;

        let request = match ControlFrame::read_from_stream(&mut stream).await {
            Ok(ReceivedControlFrame::Frame(frame)) => frame,
            Ok(ReceivedControlFrame::Closed) => {
                info!("Control connection closed before a request arrived");
                return Ok(());
            }
            Err(FrameError::Io(e)) => return Err(e.into()),
            Err(e) => {
                warn!("Client sent an invalid control frame: {}", e);

                // The operation byte is unknown here, so the reply carries 0.
                ControlFrame::invalid(ControlOperation::CreateRoom, diagnostic(&e.to_string()))
                    .write_to_stream(&mut stream)
                    .await?;

                return Ok(());
            }
        };

        info!("Received {} request", request.operation);

        if let Some(response) = TcpCommandHandler::handle_request(&request, registry).await {
            response.write_to_stream(&mut stream).await?;
        }

        Ok(())
    }
}

/// Cuts a message down so it fits the single-byte payload length.
fn diagnostic(message: &str) -> String {
    let mut end = message.len().min(u8::MAX as usize);

    while !message.is_char_boundary(end) {
        end -= 1;
    }

    message[..end].to_string()
}
