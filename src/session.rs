//! The interactive card generation flow.
//!
//! Load the service, print the player's characters, ask the operator which
//! one to render, time the generation and save the image. Every step is
//! awaited before the next one starts and the first failure ends the run;
//! nothing is retried.

use std::fs::File;
use std::io::{BufRead, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use log::info;

use crate::{Character, CharacterId, Client, Error, GenerateRequest, Result, Uid};

/// Player whose profile is queried
pub const UID: Uid = Uid(827106332);

/// Where the generated card is written, relative to the working directory
pub const OUTPUT_PATH: &str = "test.png";

/// What a successful run did
#[derive(Debug, Clone)]
pub struct Report {
    pub characters: Vec<Character>,
    pub character: CharacterId,
    /// Wall-clock duration of the generate call alone
    pub elapsed: Duration,
    pub bytes_written: usize,
}

/// Run the flow against `client`, reading the operator's choice from `input`,
/// writing the transcript to `output` and the image to `path`.
pub async fn run<R, W>(client: &Client, mut input: R, mut output: W, path: &Path) -> Result<Report>
where
    R: BufRead,
    W: Write,
{
    client.load().await?;
    info!("Service loaded");

    let characters = client.get_characters(UID).await?;
    writeln!(output, "{}", format_character_list(&characters))?;

    let character = prompt_character_id(&mut input, &mut output)?;
    let request = GenerateRequest::new(UID, character);
    info!("Generating card for character {} of {}", character, UID);

    let now = Instant::now();
    let bytes = client.generate(request).await?;
    let elapsed = now.elapsed();
    writeln!(output, "Time taken: {}", elapsed.as_secs_f64())?;

    save(path, &bytes)?;
    info!("Wrote {} bytes to {}", bytes.len(), path.display());
    writeln!(output, "Done")?;

    Ok(Report {
        characters,
        character,
        elapsed,
        bytes_written: bytes.len(),
    })
}

/// Render the list the way the bindings hand it back: a list of ids.
pub fn format_character_list(characters: &[Character]) -> String {
    let ids: Vec<u32> = characters.iter().map(|c| c.id.0).collect();
    format!("{:?}", ids)
}

/// Ask for a character id and parse a single line of input. There is no
/// re-prompt; anything that is not an integer is an error.
pub fn prompt_character_id<R, W>(input: &mut R, output: &mut W) -> Result<CharacterId>
where
    R: BufRead,
    W: Write,
{
    write!(output, "Enter a character id: ")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(Error::InputError("no character id given".into()));
    }
    let trimmed = line.trim();
    trimmed
        .parse::<u32>()
        .map(CharacterId)
        .map_err(|e| Error::InputError(format!("{:?} is not a character id: {}", trimmed, e)))
}

/// Write `bytes` to `path`, replacing whatever was there. The handle is
/// closed when this returns, on success or failure.
pub fn save(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.flush()?;
    Ok(())
}
