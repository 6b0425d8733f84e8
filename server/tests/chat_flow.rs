use std::{net::SocketAddr, sync::Arc, time::Duration};

use roomchat_server::{chat_server::ChatServer, room_registry::RoomRegistry};
use roomchat_shared::{
    chat_frame::{ChatFrame, MAX_DATAGRAM_LENGTH},
    control_frame::{ControlFrame, ReceivedControlFrame, RoomFields},
    wire_code::{ChatOperation, ControlOperation, ControlState},
};
use tokio::{
    io::AsyncWriteExt,
    net::{TcpStream, UdpSocket},
    task::JoinHandle,
    time::{sleep, timeout},
};

const WAIT: Duration = Duration::from_secs(1);

struct TestServer {
    tcp_addr: SocketAddr,
    udp_addr: SocketAddr,
    registry: Arc<RoomRegistry>,
    task: JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn start_server() -> TestServer {
    let registry = Arc::new(RoomRegistry::new());
    let server = ChatServer::bind("127.0.0.1:0", "127.0.0.1:0", Arc::clone(&registry))
        .await
        .expect("bind server");

    let tcp_addr = server.local_tcp_addr().expect("tcp addr");
    let udp_addr = server.local_udp_addr().expect("udp addr");

    let task = tokio::spawn(async move {
        let _ = server.listen().await;
    });

    TestServer {
        tcp_addr,
        udp_addr,
        registry,
        task,
    }
}

/// One control exchange. `None` when the server closes after the ack.
async fn exchange(addr: SocketAddr, request: &ControlFrame) -> Option<ControlFrame> {
    let mut stream = TcpStream::connect(addr).await.expect("connect");
    request.write_to_stream(&mut stream).await.expect("write request");

    let ack = match timeout(WAIT, ControlFrame::read_from_stream(&mut stream))
        .await
        .expect("ack in time")
        .expect("read ack")
    {
        ReceivedControlFrame::Frame(frame) => frame,
        ReceivedControlFrame::Closed => panic!("server closed before ack"),
    };
    assert_eq!(ack.state, ControlState::Ack);

    match timeout(WAIT, ControlFrame::read_from_stream(&mut stream))
        .await
        .expect("response in time")
        .expect("read response")
    {
        ReceivedControlFrame::Frame(frame) => Some(frame),
        ReceivedControlFrame::Closed => None,
    }
}

async fn create_room(server: &TestServer, room_name: &str, password: &str, user_name: &str) -> RoomFields {
    let request = ControlFrame::request(
        ControlOperation::CreateRoom,
        RoomFields {
            room_name: room_name.into(),
            room_password: password.into(),
            user_name: user_name.into(),
            ..RoomFields::default()
        },
    );

    let response = exchange(server.tcp_addr, &request).await.expect("create response");
    assert_eq!(response.state, ControlState::Success);
    response.fields().cloned().expect("create fields")
}

async fn join_room(server: &TestServer, room_id: &str, user_name: &str, password: &str) -> Option<ControlFrame> {
    let request = ControlFrame::request(
        ControlOperation::JoinRoom,
        RoomFields {
            room_id: room_id.into(),
            room_password: password.into(),
            user_name: user_name.into(),
            ..RoomFields::default()
        },
    );

    exchange(server.tcp_addr, &request).await
}

async fn announce(server: &TestServer, socket: &UdpSocket, room_id: &str, member_id: &str) {
    let frame = ChatFrame::send_address(room_id, member_id).encode().unwrap();
    socket.send_to(&frame, server.udp_addr).await.unwrap();

    let expected = socket.local_addr().unwrap();
    for _ in 0..100 {
        let members = server.registry.list_members(room_id).await.unwrap();
        if members
            .iter()
            .any(|member| member.id().as_str() == member_id && member.address() == Some(expected))
        {
            return;
        }
        sleep(Duration::from_millis(10)).await;
    }

    panic!("server never learned the address of {member_id}");
}

async fn recv_text(socket: &UdpSocket) -> Option<String> {
    let mut buf = [0; MAX_DATAGRAM_LENGTH];
    let n = timeout(Duration::from_millis(300), socket.recv(&mut buf))
        .await
        .ok()?
        .ok()?;
    Some(String::from_utf8_lossy(&buf[..n]).into_owned())
}

#[tokio::test]
async fn create_join_and_chat() {
    let server = start_server().await;

    let created = create_room(&server, "General", "", "alice").await;
    let room_id = created.room_id.clone();
    let host_id = created.user_id.clone();

    let host_socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    announce(&server, &host_socket, &room_id, &host_id).await;

    let joined = join_room(&server, &room_id, "Bob", "")
        .await
        .expect("join response");
    assert_eq!(joined.state, ControlState::Success);
    let bob = joined.fields().cloned().unwrap();
    assert_eq!(bob.room_id, room_id);
    assert_ne!(bob.user_id, host_id);

    let bob_socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    announce(&server, &bob_socket, &room_id, &bob.user_id).await;

    let message = ChatFrame::new(ChatOperation::SendMessage, &room_id, &bob.user_id, "hi")
        .encode()
        .unwrap();
    bob_socket.send_to(&message, server.udp_addr).await.unwrap();

    assert_eq!(recv_text(&host_socket).await.as_deref(), Some("hi"));
    assert_eq!(recv_text(&bob_socket).await.as_deref(), Some("hi"));
}

#[tokio::test]
async fn search_reports_password_presence_only() {
    let server = start_server().await;
    let created = create_room(&server, "Private", "secret", "alice").await;

    let request = ControlFrame::request(
        ControlOperation::SearchRoomById,
        RoomFields {
            room_id: created.room_id.clone(),
            ..RoomFields::default()
        },
    );
    let response = exchange(server.tcp_addr, &request).await.unwrap();

    assert_eq!(response.state, ControlState::Success);
    let fields = response.fields().unwrap();
    assert_eq!(fields.room_name, "Private");
    assert!(!fields.room_password.is_empty());
    assert_ne!(fields.room_password, "secret");
}

#[tokio::test]
async fn search_for_missing_room_is_invalid() {
    let server = start_server().await;

    let request = ControlFrame::request(
        ControlOperation::SearchRoomById,
        RoomFields {
            room_id: "00000000-0000-0000-0000-000000000000".into(),
            ..RoomFields::default()
        },
    );
    let response = exchange(server.tcp_addr, &request).await.unwrap();

    assert_eq!(response.state, ControlState::Invalid);
}

#[tokio::test]
async fn wrong_password_closes_without_response() {
    let server = start_server().await;
    let created = create_room(&server, "Private", "secret", "alice").await;

    assert!(join_room(&server, &created.room_id, "bob", "wrong").await.is_none());

    let accepted = join_room(&server, &created.room_id, "bob", "secret")
        .await
        .expect("join with the right password");
    assert_eq!(accepted.state, ControlState::Success);
}

#[tokio::test]
async fn malformed_control_request_gets_invalid() {
    let server = start_server().await;

    let mut stream = TcpStream::connect(server.tcp_addr).await.unwrap();
    stream.write_all(&[2, 0, 0, b'n', b'o']).await.unwrap();

    let mut frames = Vec::new();
    while let ReceivedControlFrame::Frame(frame) = timeout(WAIT, ControlFrame::read_from_stream(&mut stream))
        .await
        .unwrap()
        .unwrap()
    {
        frames.push(frame);
    }

    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].state, ControlState::Ack);
    assert_eq!(frames[1].state, ControlState::Invalid);
}

#[tokio::test]
async fn host_exit_ends_the_room_for_everyone() {
    let server = start_server().await;
    let created = create_room(&server, "General", "", "alice").await;
    let room_id = created.room_id.clone();

    let bob = join_room(&server, &room_id, "bob", "")
        .await
        .and_then(|response| response.fields().cloned())
        .unwrap();
    let bob_socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    announce(&server, &bob_socket, &room_id, &bob.user_id).await;

    let host_socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let exit = ChatFrame::exit(&room_id, &created.user_id).encode().unwrap();
    host_socket.send_to(&exit, server.udp_addr).await.unwrap();

    assert_eq!(recv_text(&bob_socket).await.as_deref(), Some("alice closed the room"));
    assert!(server.registry.find_room(&room_id).await.is_err());

    assert!(join_room(&server, &room_id, "carol", "").await.is_none());
}
