//! Waypoint persistence.
//!
//! The on-disk format is plain text, one waypoint per line:
//!
//! ```text
//! 1,47.3769,8.5417,WP 1
//! 2,47.381,8.548,WP 2
//! ```
//!
//! Fields are separated by commas and nothing is escaped, so a name holding a
//! comma is cut at that comma on the next load. Unreadable lines are dropped
//! one by one; they never fail the whole load.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use nom::{
    bytes::complete::take_till,
    character::complete::char,
    combinator::all_consuming,
    multi::separated_list1,
    number::complete::double,
    IResult, Parser,
};

use crate::config::DEFAULT_FILE_NAME;
use crate::error::{LineError, StoreError};
use crate::models::Waypoint;

pub trait WaypointStore {
    fn load(&self) -> Result<Vec<Waypoint>, StoreError>;
    fn save(&mut self, waypoints: &[Waypoint]) -> Result<(), StoreError>;
}

fn field(input: &str) -> IResult<&str, &str> {
    take_till(|c: char| c == ',').parse(input)
}

fn fields(input: &str) -> IResult<&str, Vec<&str>> {
    separated_list1(char(','), field).parse(input)
}

fn parse_id(raw: &str) -> Result<i32, LineError> {
    raw.parse::<i32>().map_err(|_| LineError::InvalidId(raw.to_string()))
}

fn coordinate(input: &str) -> IResult<&str, f64> {
    all_consuming(double).parse(input)
}

/// Surrounding whitespace is tolerated, anything else after the number is not.
fn parse_coordinate(raw: &str) -> Option<f64> {
    coordinate(raw.trim()).ok().map(|(_, value)| value)
}

/// Parse one persisted line.
pub fn parse_line(line: &str) -> Result<Waypoint, LineError> {
    if line.trim().is_empty() {
        return Err(LineError::Blank);
    }

    let parts = match fields(line) {
        Ok((_, parts)) => parts,
        Err(_) => return Err(LineError::MissingFields { found: 0 }),
    };
    if parts.len() < 4 {
        return Err(LineError::MissingFields { found: parts.len() });
    }

    let id = parse_id(parts[0])?;
    let latitude = parse_coordinate(parts[1])
        .ok_or_else(|| LineError::InvalidLatitude(parts[1].to_string()))?;
    let longitude = parse_coordinate(parts[2])
        .ok_or_else(|| LineError::InvalidLongitude(parts[2].to_string()))?;

    Ok(Waypoint {
        id,
        latitude,
        longitude,
        name: parts[3].to_string(),
    })
}

pub fn format_line(waypoint: &Waypoint) -> String {
    format!(
        "{},{},{},{}\n",
        waypoint.id, waypoint.latitude, waypoint.longitude, waypoint.name
    )
}

/// Decode a whole file, keeping every line that parses, in order.
pub fn decode(text: &str) -> Vec<Waypoint> {
    text.lines()
        .enumerate()
        .filter_map(|(index, line)| match parse_line(line) {
            Ok(waypoint) => Some(waypoint),
            Err(LineError::Blank) => None,
            Err(err) => {
                log::debug!("dropping waypoint line {}: {err}", index + 1);
                None
            }
        })
        .collect()
}

pub fn encode(waypoints: &[Waypoint]) -> String {
    waypoints.iter().map(format_line).collect()
}

/// Stores waypoints in a single text file inside the app's private directory.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A store at `<dir>/<file_name>`. An empty directory means the host never
    /// told us where its private files live.
    pub fn in_dir(dir: impl AsRef<Path>, file_name: &str) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        if dir.as_os_str().is_empty() {
            return Err(StoreError::NotConfigured);
        }
        let file_name = if file_name.is_empty() {
            DEFAULT_FILE_NAME
        } else {
            file_name
        };
        Ok(Self::new(dir.join(file_name)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WaypointStore for FileStore {
    fn load(&self) -> Result<Vec<Waypoint>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let waypoints = decode(&text);
        log::info!("loaded {} waypoints from {}", waypoints.len(), self.path.display());
        Ok(waypoints)
    }

    fn save(&mut self, waypoints: &[Waypoint]) -> Result<(), StoreError> {
        fs::write(&self.path, encode(waypoints)).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        log::debug!("saved {} waypoints to {}", waypoints.len(), self.path.display());
        Ok(())
    }
}

/// Keeps the encoded file contents in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    contents: String,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: contents.into(),
            saves: 0,
        }
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl WaypointStore for MemoryStore {
    fn load(&self) -> Result<Vec<Waypoint>, StoreError> {
        Ok(decode(&self.contents))
    }

    fn save(&mut self, waypoints: &[Waypoint]) -> Result<(), StoreError> {
        self.contents = encode(waypoints);
        self.saves += 1;
        Ok(())
    }
}
