//! Data channel framing.
//!
//! ```text
//! | operation: 1 byte | room id length: 1 byte | member id length: 1 byte | message length: 1 byte |
//! | room id | member id | message |
//! ```

use crate::{frame_error::FrameError, wire_code::ChatOperation};

pub const CHAT_HEADER_LENGTH: usize = 4;

/// Room id, member id and message together must fit a single length byte.
pub const MAX_CHAT_BODY_LENGTH: usize = u8::MAX as usize;

/// Receive buffer size for one datagram.
pub const MAX_DATAGRAM_LENGTH: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatFrame {
    pub operation: ChatOperation,
    pub room_id: String,
    pub member_id: String,
    pub message: String,
}

impl ChatFrame {
    pub fn new(
        operation: ChatOperation,
        room_id: &str,
        member_id: &str,
        message: &str,
    ) -> Self {
        Self {
            operation,
            room_id: room_id.to_string(),
            member_id: member_id.to_string(),
            message: message.to_string(),
        }
    }

    pub fn send_address(room_id: &str, member_id: &str) -> Self {
        Self::new(ChatOperation::SendAddress, room_id, member_id, "")
    }

    pub fn exit(room_id: &str, member_id: &str) -> Self {
        Self::new(ChatOperation::Exit, room_id, member_id, "")
    }

    /// How many message bytes still fit beside the two ids.
    pub fn message_budget(room_id: &str, member_id: &str) -> usize {
        MAX_CHAT_BODY_LENGTH.saturating_sub(room_id.len() + member_id.len())
    }

    pub fn encode(&self) -> Result<Vec<u8>, FrameError> {
        let room_id = self.room_id.as_bytes();
        let member_id = self.member_id.as_bytes();
        let message = self.message.as_bytes();

        let body_len = room_id.len() + member_id.len() + message.len();
        if body_len > MAX_CHAT_BODY_LENGTH {
            return Err(FrameError::MessageTooLong {
                len: body_len,
                budget: MAX_CHAT_BODY_LENGTH,
            });
        }

        let mut bytes = Vec::with_capacity(CHAT_HEADER_LENGTH + body_len);
        bytes.push(self.operation.to_byte());
        bytes.push(room_id.len() as u8);
        bytes.push(member_id.len() as u8);
        bytes.push(message.len() as u8);
        bytes.extend_from_slice(room_id);
        bytes.extend_from_slice(member_id);
        bytes.extend_from_slice(message);

        Ok(bytes)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        if bytes.len() < CHAT_HEADER_LENGTH {
            return Err(FrameError::Malformed(format!(
                "expected a {} byte header, got {} bytes",
                CHAT_HEADER_LENGTH,
                bytes.len()
            )));
        }

        let operation = ChatOperation::from_byte(bytes[0])
            .ok_or_else(|| FrameError::Malformed(format!("unknown chat operation {}", bytes[0])))?;

        let room_id_len = bytes[1] as usize;
        let member_id_len = bytes[2] as usize;
        let message_len = bytes[3] as usize;

        let payload = &bytes[CHAT_HEADER_LENGTH..];
        let declared = room_id_len + member_id_len + message_len;

        if declared > payload.len() {
            return Err(FrameError::Malformed(format!(
                "lengths declare {} body bytes but only {} are present",
                declared,
                payload.len()
            )));
        }

        let (room_id, rest) = payload.split_at(room_id_len);
        let (member_id, rest) = rest.split_at(member_id_len);
        let message = &rest[..message_len];

        Ok(Self {
            operation,
            room_id: utf8_field("room id", room_id)?,
            member_id: utf8_field("member id", member_id)?,
            message: utf8_field("message", message)?,
        })
    }
}

fn utf8_field(name: &str, bytes: &[u8]) -> Result<String, FrameError> {
    String::from_utf8(bytes.to_vec())
        .map_err(|_| FrameError::InvalidPayload(format!("{} is not valid UTF-8", name)))
}
