pub mod chat_frame;
pub mod control_frame;
pub mod frame_error;
pub mod wire_code;

pub const TCP_PORT: u16 = 8080;
pub const UDP_PORT: u16 = 9090;

pub const MAX_USER_NAME_LENGTH: usize = 24;
pub const MAX_ROOM_NAME_LENGTH: usize = 48;
pub const MAX_PASSWORD_LENGTH: usize = 24;

/// Room and member ids are hyphenated UUID strings.
pub const ID_LENGTH: usize = 36;

pub fn is_valid_name(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Characters serde_json writes as escape sequences. Names free of them are
/// as long on the wire as their byte length.
fn needs_json_escape(c: char) -> bool {
    c.is_control() || c == '"' || c == '\\'
}

pub fn validate_user_name(name: &str) -> Result<(), String> {
    if name.is_empty() || name.len() > MAX_USER_NAME_LENGTH {
        return Err(format!(
            "User name must be between 1 and {} characters.",
            MAX_USER_NAME_LENGTH
        ));
    }

    if !is_valid_name(name) {
        return Err(
            "User name must contain only letters, numbers, underscores (_), or hyphens (-)."
                .to_string(),
        );
    }

    Ok(())
}

pub fn validate_room_name(name: &str) -> Result<(), String> {
    if name.is_empty() || name.len() > MAX_ROOM_NAME_LENGTH {
        return Err(format!(
            "Room name must be between 1 and {} bytes.",
            MAX_ROOM_NAME_LENGTH
        ));
    }

    if name.chars().any(needs_json_escape) {
        return Err(
            "Room name must not contain control characters, quotes or backslashes.".to_string(),
        );
    }

    Ok(())
}

/// An empty password leaves the room open.
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at most {} bytes.",
            MAX_PASSWORD_LENGTH
        ));
    }

    if password.chars().any(needs_json_escape) {
        return Err(
            "Password must not contain control characters, quotes or backslashes.".to_string(),
        );
    }

    Ok(())
}
