use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use std::io::{Write, stdout};

use crate::chat_session::ChatSession;

pub const PROMPT_STR: &str = "Enter message (type 'exit' to quit): ";

pub struct CliDisplay;

impl CliDisplay {
    pub fn print_processing() {
        println!("Server is processing your request...");
    }

    pub fn print_room_created(room_name: &str, room_id: &str) {
        println!("Created room '{}'.", room_name);
        println!("Share this room id so others can join: {}", room_id);
    }

    pub fn print_joined(session: &ChatSession) {
        println!(
            "Joined '{}' as '{}'. Messages you send reach everyone in the room.",
            session.room_name, session.user_name
        );
    }

    pub fn print_prompt() {
        let mut stdout = stdout();

        let _ = write!(stdout, "{}", PROMPT_STR);
        let _ = stdout.flush();
    }

    /// Prints over the half-typed prompt line, then restores the prompt.
    pub fn print_incoming(message: &str) {
        let mut stdout = stdout();

        let _ = execute!(stdout, Clear(ClearType::CurrentLine), cursor::MoveToColumn(0));

        let _ = writeln!(stdout, "{}", message);
        let _ = write!(stdout, "{}", PROMPT_STR);
        let _ = stdout.flush();
    }

    pub fn print_current_user_left_room(room_name: &str) {
        println!("You have left '{}'", room_name);
    }
}
