//! Control channel framing.
//!
//! ```text
//! | payload length: 1 byte | operation: 1 byte | state: 1 byte | payload: 0..=255 bytes |
//! ```
//!
//! Request and success frames carry a JSON object with the five
//! [`RoomFields`] keys. Fail and invalid frames carry a plain UTF-8
//! diagnostic. The acknowledgement frame has no payload at all.

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{
    frame_error::FrameError,
    wire_code::{ControlOperation, ControlState},
};

pub const CONTROL_HEADER_LENGTH: usize = 3;

pub const ACK_FRAME: [u8; CONTROL_HEADER_LENGTH] = [
    0,
    ControlOperation::CreateRoom as u8,
    ControlState::Ack as u8,
];

/// Stands in for the password of a protected room in search results.
pub const PASSWORD_MASK: &str = "********";

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomFields {
    pub room_id: String,
    pub room_name: String,
    pub room_password: String,
    pub user_id: String,
    pub user_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlBody {
    Empty,
    Fields(RoomFields),
    Message(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlFrame {
    pub operation: ControlOperation,
    pub state: ControlState,
    pub body: ControlBody,
}

#[derive(Debug)]
pub enum ReceivedControlFrame {
    Closed,
    Frame(ControlFrame),
}

impl ControlFrame {
    pub fn request(operation: ControlOperation, fields: RoomFields) -> Self {
        Self {
            operation,
            state: ControlState::Request,
            body: ControlBody::Fields(fields),
        }
    }

    pub fn ack() -> Self {
        Self {
            operation: ControlOperation::CreateRoom,
            state: ControlState::Ack,
            body: ControlBody::Empty,
        }
    }

    pub fn success(operation: ControlOperation, fields: RoomFields) -> Self {
        Self {
            operation,
            state: ControlState::Success,
            body: ControlBody::Fields(fields),
        }
    }

    pub fn fail(operation: ControlOperation, message: impl Into<String>) -> Self {
        Self {
            operation,
            state: ControlState::Fail,
            body: ControlBody::Message(message.into()),
        }
    }

    pub fn invalid(operation: ControlOperation, message: impl Into<String>) -> Self {
        Self {
            operation,
            state: ControlState::Invalid,
            body: ControlBody::Message(message.into()),
        }
    }

    pub fn fields(&self) -> Option<&RoomFields> {
        match &self.body {
            ControlBody::Fields(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match &self.body {
            ControlBody::Message(message) => Some(message),
            _ => None,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, FrameError> {
        let payload = match &self.body {
            ControlBody::Empty => Vec::new(),
            ControlBody::Fields(fields) => serde_json::to_vec(fields)
                .map_err(|e| FrameError::InvalidPayload(e.to_string()))?,
            ControlBody::Message(message) => message.as_bytes().to_vec(),
        };

        if payload.len() > u8::MAX as usize {
            return Err(FrameError::PayloadTooLarge(payload.len()));
        }

        let mut bytes = Vec::with_capacity(CONTROL_HEADER_LENGTH + payload.len());
        bytes.push(payload.len() as u8);
        bytes.push(self.operation.to_byte());
        bytes.push(self.state.to_byte());
        bytes.extend(payload);

        Ok(bytes)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        if bytes.len() < CONTROL_HEADER_LENGTH {
            return Err(FrameError::Malformed(format!(
                "expected a {} byte header, got {} bytes",
                CONTROL_HEADER_LENGTH,
                bytes.len()
            )));
        }

        let declared = bytes[0] as usize;
        let payload = &bytes[CONTROL_HEADER_LENGTH..];

        if payload.len() != declared {
            return Err(FrameError::Incomplete {
                declared,
                available: payload.len(),
            });
        }

        let operation = ControlOperation::from_byte(bytes[1]).ok_or_else(|| {
            FrameError::Malformed(format!("unknown control operation {}", bytes[1]))
        })?;
        let state = ControlState::from_byte(bytes[2])
            .ok_or_else(|| FrameError::Malformed(format!("unknown control state {}", bytes[2])))?;

        Ok(Self {
            operation,
            state,
            body: decode_body(state, payload)?,
        })
    }

    pub async fn write_to_stream<W>(&self, stream: &mut W) -> Result<(), FrameError>
    where
        W: AsyncWrite + Unpin,
    {
        let bytes = self.encode()?;

        stream.write_all(&bytes).await?;
        stream.flush().await?;

        Ok(())
    }

    /// Reads the header and then exactly the declared payload. A stream that
    /// ends before the first byte is reported as [`ReceivedControlFrame::Closed`];
    /// one that ends mid-frame fails to decode.
    pub async fn read_from_stream<R>(stream: &mut R) -> Result<ReceivedControlFrame, FrameError>
    where
        R: AsyncRead + Unpin,
    {
        let mut buf = [0; 1];

        let first_byte = match stream.read(&mut buf).await? {
            0 => return Ok(ReceivedControlFrame::Closed),
            _ => buf[0],
        };

        let mut frame = vec![first_byte];

        (&mut *stream)
            .take((CONTROL_HEADER_LENGTH - 1) as u64)
            .read_to_end(&mut frame)
            .await?;

        if frame.len() == CONTROL_HEADER_LENGTH {
            (&mut *stream)
                .take(first_byte as u64)
                .read_to_end(&mut frame)
                .await?;
        }

        Self::decode(&frame).map(ReceivedControlFrame::Frame)
    }
}

fn decode_body(state: ControlState, payload: &[u8]) -> Result<ControlBody, FrameError> {
    match state {
        ControlState::Request | ControlState::Success => serde_json::from_slice(payload)
            .map(ControlBody::Fields)
            .map_err(|e| FrameError::InvalidPayload(e.to_string())),
        ControlState::Ack if payload.is_empty() => Ok(ControlBody::Empty),
        ControlState::Ack => Err(FrameError::InvalidPayload(
            "acknowledgement carries a payload".to_string(),
        )),
        ControlState::Fail | ControlState::Invalid => std::str::from_utf8(payload)
            .map(|message| ControlBody::Message(message.to_string()))
            .map_err(|e| FrameError::InvalidPayload(e.to_string())),
    }
}
