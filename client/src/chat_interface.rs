use std::{io, sync::Arc, thread};

use anyhow::Result;
use roomchat_shared::{
    chat_frame::{ChatFrame, MAX_DATAGRAM_LENGTH},
    frame_error::FrameError,
    wire_code::ChatOperation,
};
use tokio::{net::UdpSocket, sync::mpsc};
use tokio_util::sync::CancellationToken;

use crate::{chat_session::ChatSession, cli_display::CliDisplay};

pub struct ChatInterface;

impl ChatInterface {
    pub async fn run(data_addr: &str, session: &ChatSession) -> Result<()> {
        let udp_socket = Arc::new(UdpSocket::bind("0.0.0.0:0").await?);
        udp_socket.connect(data_addr).await?;

        let announce = ChatFrame::send_address(&session.room_id, &session.member_id).encode()?;
        udp_socket.send(&announce).await?;

        let udp_listener_loop_cancel_token = CancellationToken::new();
        let udp_listener_task = tokio::spawn(udp_listener_loop(
            Arc::clone(&udp_socket),
            udp_listener_loop_cancel_token.clone(),
        ));

        let budget = ChatFrame::message_budget(&session.room_id, &session.member_id);
        let mut lines = spawn_stdin_reader();

        CliDisplay::print_prompt();

        while let Some(line) = lines.recv().await {
            let line = line.trim_end();

            if line.eq_ignore_ascii_case("exit") {
                break;
            }

            if !line.is_empty() {
                let frame = ChatFrame::new(
                    ChatOperation::SendMessage,
                    &session.room_id,
                    &session.member_id,
                    line,
                );

                match frame.encode() {
                    Ok(bytes) => {
                        if let Err(e) = udp_socket.send(&bytes).await {
                            eprintln!("Error sending message: {}", e);
                        }
                    }
                    Err(FrameError::MessageTooLong { .. }) => {
                        eprintln!("Message is too long; at most {} bytes fit.", budget);
                    }
                    Err(e) => eprintln!("{}", e),
                }
            }

            CliDisplay::print_prompt();
        }

        let exit = ChatFrame::exit(&session.room_id, &session.member_id).encode()?;
        udp_socket.send(&exit).await?;

        udp_listener_loop_cancel_token.cancel();
        udp_listener_task.await?;

        CliDisplay::print_current_user_left_room(&session.room_name);

        Ok(())
    }
}

async fn udp_listener_loop(udp_socket: Arc<UdpSocket>, cancel_token: CancellationToken) {
    let mut buf = [0; MAX_DATAGRAM_LENGTH];

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => break,

            result = udp_socket.recv(&mut buf) => {
                match result {
                    Ok(n) => CliDisplay::print_incoming(&String::from_utf8_lossy(&buf[..n])),
                    Err(e) => {
                        eprintln!("Error receiving data: {}", e);
                        break;
                    }
                }
            }
        }
    }
}

/// Stdin blocks, so lines are read on a plain thread and handed over.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);

    thread::spawn(move || {
        for line in io::stdin().lines() {
            let Ok(line) = line else { break };

            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });

    rx
}
