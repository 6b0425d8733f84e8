use std::io::{self, BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateRoom,
    JoinRoom,
}

/// Asks until `validate` accepts the line. Fails only when input runs out.
pub fn prompt_string<R, W, F>(
    reader: &mut R,
    writer: &mut W,
    label: &str,
    validate: F,
) -> io::Result<String>
where
    R: BufRead,
    W: Write,
    F: Fn(&str) -> Result<(), String>,
{
    loop {
        write!(writer, "Input {}: ", label)?;
        writer.flush()?;

        let input = read_line(reader)?;

        match validate(&input) {
            Ok(()) => return Ok(input),
            Err(message) => writeln!(writer, "{}", message)?,
        }
    }
}

pub fn prompt_yes_no<R, W>(reader: &mut R, writer: &mut W, question: &str) -> io::Result<bool>
where
    R: BufRead,
    W: Write,
{
    loop {
        writeln!(writer, "{}", question)?;
        write!(writer, "Enter y or n: ")?;
        writer.flush()?;

        match read_line(reader)?.trim() {
            "y" => return Ok(true),
            "n" => return Ok(false),
            _ => writeln!(writer, "Invalid input. Please enter y or n.")?,
        }
    }
}

pub fn prompt_action<R, W>(reader: &mut R, writer: &mut W) -> io::Result<Action>
where
    R: BufRead,
    W: Write,
{
    loop {
        writeln!(writer, "Choose an option:")?;
        writeln!(writer, "1. Create a new chat room")?;
        writeln!(writer, "2. Join an existing chat room")?;
        write!(writer, "Enter 1 or 2: ")?;
        writer.flush()?;

        match read_line(reader)?.trim() {
            "1" => return Ok(Action::CreateRoom),
            "2" => return Ok(Action::JoinRoom),
            _ => writeln!(writer, "Invalid input. Please enter 1 or 2.")?,
        }
    }
}

fn read_line<R: BufRead>(reader: &mut R) -> io::Result<String> {
    let mut line = String::new();

    if reader.read_line(&mut line)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
    }

    Ok(line.trim_end_matches(['\n', '\r']).to_string())
}
