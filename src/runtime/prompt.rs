use std::io::{BufRead, Write};

use crate::error::{Error, Result};

pub const PROMPT: &str = "Paste a Spotify playlist, album or track link: ";

/// Ask for a link on `output` and read one line from `input`.
pub fn read_link<R: BufRead, W: Write>(mut input: R, mut output: W) -> Result<String> {
    output.write_all(PROMPT.as_bytes()).map_err(Error::Prompt)?;
    output.flush().map_err(Error::Prompt)?;

    let mut line = String::new();
    input.read_line(&mut line).map_err(Error::Prompt)?;
    Ok(line.trim().to_string())
}
