use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::Context;
use serde::{Serialize, de::DeserializeOwned};

use crate::schema::champion::ChampionList;

/// Writes `value` as pretty JSON to `output_path`, or to stdout when no path is given.
///
/// Returns where the value was written.
pub fn save_json<T>(value: &T, output_path: Option<&Path>) -> anyhow::Result<String>
where
    T: Serialize,
{
    match output_path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            write_json(BufWriter::new(file), value)
                .with_context(|| format!("Failed to write JSON to {}", path.display()))?;
            Ok(path.display().to_string())
        }
        None => {
            write_json(io::stdout().lock(), value).context("Failed to write JSON to stdout")?;
            Ok("stdout".to_owned())
        }
    }
}

fn write_json<W, T>(mut writer: W, value: &T) -> anyhow::Result<()>
where
    W: Write,
    T: Serialize,
{
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {file_kind} file: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {file_kind} JSON file: {}", path.display()))
}

/// Reads a champion list written by `pokevo evolve`.
pub fn read_champions_file<P>(path: P) -> anyhow::Result<ChampionList>
where
    P: AsRef<Path>,
{
    read_json_file("champions", path)
}
