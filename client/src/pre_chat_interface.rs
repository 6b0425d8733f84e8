use std::io;

use anyhow::{Result, bail};
use roomchat_shared::{
    control_frame::{ControlFrame, RoomFields},
    validate_password, validate_room_name, validate_user_name,
    wire_code::{ControlOperation, ControlState},
};

use crate::{
    chat_session::ChatSession,
    cli_display::CliDisplay,
    client::send_request,
    prompt::{Action, prompt_action, prompt_string, prompt_yes_no},
};

const MAX_ROOM_ID_INPUT_LENGTH: usize = 64;

pub struct PreChatInterface;

impl PreChatInterface {
    /// Walks the user through creating or joining a room. `None` when the
    /// user backs out or the server turns the request down.
    pub async fn run(control_addr: &str, username: Option<String>) -> Result<Option<ChatSession>> {
        let action = prompt_action(&mut io::stdin().lock(), &mut io::stdout())?;

        match action {
            Action::CreateRoom => create_room(control_addr, username).await,
            Action::JoinRoom => join_room(control_addr, username).await,
        }
    }
}

async fn create_room(control_addr: &str, username: Option<String>) -> Result<Option<ChatSession>> {
    let user_name = ask_user_name(username)?;
    let room_name = prompt_string(
        &mut io::stdin().lock(),
        &mut io::stdout(),
        "chat room name",
        validate_room_name,
    )?;

    let wants_password = prompt_yes_no(
        &mut io::stdin().lock(),
        &mut io::stdout(),
        "Do you want to set a password for the room?",
    )?;
    let room_password = if wants_password {
        ask_password()?
    } else {
        String::new()
    };

    let request = ControlFrame::request(
        ControlOperation::CreateRoom,
        RoomFields {
            room_name,
            room_password,
            user_name,
            ..RoomFields::default()
        },
    );

    match send_request(control_addr, &request).await? {
        Some(response) if response.state == ControlState::Success => {
            let Some(fields) = response.fields() else {
                bail!("Invalid response from server during create_room");
            };

            CliDisplay::print_room_created(&fields.room_name, &fields.room_id);
            Ok(Some(ChatSession::from(fields)))
        }
        Some(response) => {
            eprintln!("{}", response.message().unwrap_or("Could not create the room."));
            Ok(None)
        }
        None => bail!("Unexpected EOF from server during create_room"),
    }
}

async fn join_room(control_addr: &str, username: Option<String>) -> Result<Option<ChatSession>> {
    let room_id = prompt_string(&mut io::stdin().lock(), &mut io::stdout(), "room id", |input| {
        if input.is_empty() || input.len() > MAX_ROOM_ID_INPUT_LENGTH {
            Err(format!(
                "Room id must be between 1 and {} characters.",
                MAX_ROOM_ID_INPUT_LENGTH
            ))
        } else {
            Ok(())
        }
    })?;

    let found = match search_room(control_addr, &room_id).await? {
        Some(found) => found,
        None => return Ok(None),
    };

    let question = format!("Join the room '{}'?", found.room_name);
    if !prompt_yes_no(&mut io::stdin().lock(), &mut io::stdout(), &question)? {
        println!("Room joining was canceled.");
        return Ok(None);
    }

    let user_name = ask_user_name(username)?;
    let room_password = if found.room_password.is_empty() {
        String::new()
    } else {
        ask_password()?
    };

    let request = ControlFrame::request(
        ControlOperation::JoinRoom,
        RoomFields {
            room_id: found.room_id,
            room_name: found.room_name,
            room_password,
            user_name,
            ..RoomFields::default()
        },
    );

    match send_request(control_addr, &request).await? {
        Some(response) if response.state == ControlState::Success => {
            let Some(fields) = response.fields() else {
                bail!("Invalid response from server during join_room");
            };

            Ok(Some(ChatSession::from(fields)))
        }
        Some(response) => {
            eprintln!("{}", response.message().unwrap_or("Could not join the room."));
            Ok(None)
        }
        None => {
            eprintln!("Join was rejected: wrong password or the room no longer exists.");
            Ok(None)
        }
    }
}

async fn search_room(control_addr: &str, room_id: &str) -> Result<Option<RoomFields>> {
    let request = ControlFrame::request(
        ControlOperation::SearchRoomById,
        RoomFields {
            room_id: room_id.to_string(),
            ..RoomFields::default()
        },
    );

    match send_request(control_addr, &request).await? {
        Some(response) if response.state == ControlState::Success => match response.fields() {
            Some(fields) => Ok(Some(fields.clone())),
            None => bail!("Invalid response from server during search_room"),
        },
        Some(response) => {
            eprintln!(
                "Designated chat room does not exist: {}",
                response.message().unwrap_or("no details")
            );
            Ok(None)
        }
        None => bail!("Unexpected EOF from server during search_room"),
    }
}

fn ask_user_name(username: Option<String>) -> Result<String> {
    if let Some(username) = username {
        match validate_user_name(&username) {
            Ok(()) => return Ok(username),
            Err(message) => eprintln!("{}", message),
        }
    }

    Ok(prompt_string(
        &mut io::stdin().lock(),
        &mut io::stdout(),
        "user name",
        validate_user_name,
    )?)
}

fn ask_password() -> Result<String> {
    Ok(prompt_string(
        &mut io::stdin().lock(),
        &mut io::stdout(),
        "password",
        |input| {
            if input.is_empty() {
                return Err("Input some string".to_string());
            }
            validate_password(input)
        },
    )?)
}
