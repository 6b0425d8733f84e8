use log::{error, info, warn};
use roomchat_shared::{
    control_frame::{ControlFrame, INTERNAL_ERROR_MESSAGE, PASSWORD_MASK, RoomFields},
    validate_password, validate_room_name, validate_user_name,
    wire_code::{ControlOperation, ControlState},
};

use crate::room_registry::RoomRegistry;

pub struct TcpCommandHandler;

impl TcpCommandHandler {
    /// Maps one control request to its response. `None` means the connection
    /// is closed without a response, which is how a rejected join is signalled.
    pub async fn handle_request(
        request: &ControlFrame,
        registry: &RoomRegistry,
    ) -> Option<ControlFrame> {
        if request.state != ControlState::Request {
            return Some(ControlFrame::invalid(
                request.operation,
                format!("Expected a {} frame, got {}", ControlState::Request, request.state),
            ));
        }

        let Some(fields) = request.fields() else {
            return Some(ControlFrame::invalid(request.operation, "Request carries no fields"));
        };

        match request.operation {
            ControlOperation::CreateRoom => Some(create_room(fields, registry).await),
            ControlOperation::SearchRoomById => Some(search_room_by_id(fields, registry).await),
            ControlOperation::JoinRoom => join_room(fields, registry).await,
            ControlOperation::LeaveRoom => Some(ControlFrame::invalid(
                ControlOperation::LeaveRoom,
                "Leave a room by sending EXIT on the data channel",
            )),
        }
    }
}

async fn create_room(fields: &RoomFields, registry: &RoomRegistry) -> ControlFrame {
    let validation = validate_user_name(&fields.user_name)
        .and_then(|_| validate_room_name(&fields.room_name))
        .and_then(|_| validate_password(&fields.room_password));

    if let Err(message) = validation {
        return ControlFrame::invalid(ControlOperation::CreateRoom, message);
    }

    let (room, host) = registry
        .create_room(&fields.room_name, &fields.room_password, &fields.user_name)
        .await;

    let response = ControlFrame::success(
        ControlOperation::CreateRoom,
        RoomFields {
            room_id: room.id.to_string(),
            room_name: room.name.clone(),
            room_password: room.password.clone(),
            user_id: host.id().to_string(),
            user_name: host.name().to_string(),
        },
    );

    encode_or_roll_back(response, registry, room.id.as_str(), host.id().as_str()).await
}

async fn search_room_by_id(fields: &RoomFields, registry: &RoomRegistry) -> ControlFrame {
    match registry.find_room(&fields.room_id).await {
        Ok(room) => {
            let room_password = if room.has_password() {
                PASSWORD_MASK.to_string()
            } else {
                String::new()
            };

            ControlFrame::success(
                ControlOperation::SearchRoomById,
                RoomFields {
                    room_id: room.id.to_string(),
                    room_name: room.name,
                    room_password,
                    ..RoomFields::default()
                },
            )
        }
        Err(e) => ControlFrame::invalid(ControlOperation::SearchRoomById, e.to_string()),
    }
}

async fn join_room(fields: &RoomFields, registry: &RoomRegistry) -> Option<ControlFrame> {
    if let Err(message) = validate_user_name(&fields.user_name) {
        return Some(ControlFrame::invalid(ControlOperation::JoinRoom, message));
    }

    let (room, member) = match registry
        .join_room(&fields.room_id, &fields.user_name, &fields.room_password)
        .await
    {
        Ok(joined) => joined,
        Err(e) => {
            info!("Rejected {} joining {}: {}", fields.user_name, fields.room_id, e);
            return None;
        }
    };

    let response = ControlFrame::success(
        ControlOperation::JoinRoom,
        RoomFields {
            room_id: room.id.to_string(),
            room_name: room.name.clone(),
            user_id: member.id().to_string(),
            user_name: member.name().to_string(),
            ..RoomFields::default()
        },
    );

    info!(
        "{} joined {} ({} members)",
        member.name(),
        room.id,
        room.member_count
    );

    Some(encode_or_roll_back(response, registry, room.id.as_str(), member.id().as_str()).await)
}

/// Returns `response` when it fits in a frame. Otherwise the member it
/// introduces is removed again, closing the room when that member is the
/// host, and FAIL is returned instead.
async fn encode_or_roll_back(
    response: ControlFrame,
    registry: &RoomRegistry,
    room_id: &str,
    member_id: &str,
) -> ControlFrame {
    let Err(e) = response.encode() else {
        return response;
    };

    error!(
        "Could not encode {} response for room {}: {}",
        response.operation, room_id, e
    );

    if let Err(e) = registry.remove_member(room_id, member_id).await {
        warn!("Could not roll back member {} of room {}: {}", member_id, room_id, e);
    }

    ControlFrame::fail(response.operation, INTERNAL_ERROR_MESSAGE)
}
