use roomchat_shared::control_frame::RoomFields;

/// Ids handed out by a successful create or join, needed on the data channel.
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub room_id: String,
    pub room_name: String,
    pub member_id: String,
    pub user_name: String,
}

impl From<&RoomFields> for ChatSession {
    fn from(fields: &RoomFields) -> Self {
        Self {
            room_id: fields.room_id.clone(),
            room_name: fields.room_name.clone(),
            member_id: fields.user_id.clone(),
            user_name: fields.user_name.clone(),
        }
    }
}
