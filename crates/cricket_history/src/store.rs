//! File-backed store of finished and aborted games.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDateTime};
use cricket_core::CricketGame;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use crate::record::{RECORD_EXTENSION, parse_file_timestamp};
use crate::{GameOutcome, GameRecord, HistoryError, HistoryErrorKind};

/// Name of the metadata file kept alongside the records.
pub const METADATA_FILE: &str = "metadata.json";

/// File name prefix of export bundles.
pub const EXPORT_PREFIX: &str = "window_cricket_export_";

/// Metadata about the most recently saved game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestGame {
    /// First player's name.
    pub player1_name: String,
    /// Second player's name.
    pub player2_name: String,
    /// Save time, `YYYYMMDD_HHMMSS`.
    pub timestamp: String,
    /// Path of the saved record.
    pub filepath: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Metadata {
    latest_game: LatestGame,
}

/// Every stored record, keyed by file name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportBundle {
    /// Records by file name.
    pub records: BTreeMap<String, GameRecord>,
}

/// Store of game records in a single directory.
///
/// The directory is created on first use. Each call opens and closes its
/// own files; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    dir: PathBuf,
}

impl HistoryStore {
    /// Creates a store rooted at `dir`.
    #[instrument(skip(dir), fields(dir = %dir.as_ref().display()))]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        info!("Creating HistoryStore");
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// The store directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[instrument(skip(self))]
    fn ensure_dir(&self) -> Result<(), HistoryError> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            HistoryError::from(e).context(format!(
                "Cannot create store directory '{}'",
                self.dir.display()
            ))
        })
    }

    /// Resolves a record name to a path inside the store.
    fn record_path(&self, name: &str) -> Result<PathBuf, HistoryError> {
        validate_record_name(name)?;
        Ok(self.dir.join(name))
    }

    /// Saves a game now.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError`] if the game cannot be recorded or written.
    pub fn persist(&self, game: &CricketGame, outcome: GameOutcome) -> Result<PathBuf, HistoryError> {
        self.persist_at(game, outcome, Local::now().naive_local())
    }

    /// Saves a game as if at `timestamp` and updates the latest-players
    /// metadata.
    ///
    /// An existing record with the same name is never overwritten; a
    /// numeric suffix is added instead.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError`] if the game cannot be recorded or written.
    #[instrument(skip(self, game), fields(outcome = ?outcome, %timestamp))]
    pub fn persist_at(
        &self,
        game: &CricketGame,
        outcome: GameOutcome,
        timestamp: NaiveDateTime,
    ) -> Result<PathBuf, HistoryError> {
        self.ensure_dir()?;
        let record = GameRecord::from_game(game, outcome)?;
        let path = self.unused_path(&record.file_name(timestamp));

        write_json(&path, &record)?;
        info!(path = %path.display(), rounds = record.rounds(), "Game saved");

        let [a, b] = record.players();
        let metadata = Metadata {
            latest_game: LatestGame {
                player1_name: a.name().clone(),
                player2_name: b.name().clone(),
                timestamp: timestamp.format("%Y%m%d_%H%M%S").to_string(),
                filepath: path.display().to_string(),
            },
        };
        if let Err(e) = write_json(&self.dir.join(METADATA_FILE), &metadata) {
            warn!(error = %e, "Game saved but metadata was not updated");
        }
        Ok(path)
    }

    fn unused_path(&self, file_name: &str) -> PathBuf {
        let path = self.dir.join(file_name);
        if !path.exists() {
            return path;
        }
        let stem = file_name
            .strip_suffix(&format!(".{}", RECORD_EXTENSION))
            .unwrap_or(file_name);
        (2..)
            .map(|n| self.dir.join(format!("{}-{}.{}", stem, n, RECORD_EXTENSION)))
            .find(|p| !p.exists())
            .unwrap_or(path)
    }

    /// Metadata for the most recently saved game, if readable.
    #[instrument(skip(self))]
    pub fn latest_game(&self) -> Option<LatestGame> {
        let path = self.dir.join(METADATA_FILE);
        if !path.exists() {
            debug!("No metadata yet");
            return None;
        }
        match read_json::<Metadata>(&path) {
            Ok(metadata) => Some(metadata.latest_game),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable metadata");
                None
            }
        }
    }

    /// Names of the players in the most recently saved game.
    pub fn latest_players(&self) -> Option<(String, String)> {
        self.latest_game()
            .map(|latest| (latest.player1_name, latest.player2_name))
    }

    /// Lists record file names, most recent first.
    ///
    /// Records are ordered by the time embedded in their name; a name
    /// without one falls back to the file's modification time.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError`] if the directory cannot be read.
    #[instrument(skip(self))]
    pub fn list_records(&self) -> Result<Vec<String>, HistoryError> {
        self.ensure_dir()?;
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                warn!(name = ?entry.file_name(), "Skipping non UTF-8 file name");
                continue;
            };
            if !is_record_name(&name) {
                continue;
            }
            let saved_at = match parse_file_timestamp(&name) {
                Some(ts) => ts,
                None => modified_time(&entry.path())?,
            };
            entries.push((saved_at, name));
        }

        entries.sort_by(|a, b| b.cmp(a));
        info!(count = entries.len(), "Records listed");
        Ok(entries.into_iter().map(|(_, name)| name).collect())
    }

    /// Loads one record by file name.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError`] if the name is not a record name or the file
    /// is missing or unparseable.
    #[instrument(skip(self))]
    pub fn load(&self, name: &str) -> Result<GameRecord, HistoryError> {
        let path = self.record_path(name)?;
        let record =
            read_json(&path).map_err(|e| e.context(format!("Cannot load '{}'", name)))?;
        debug!("Record loaded");
        Ok(record)
    }

    /// Loads every readable record, most recent first.
    ///
    /// Unreadable records are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError`] if the directory cannot be listed.
    #[instrument(skip(self))]
    pub fn load_all(&self) -> Result<Vec<(String, GameRecord)>, HistoryError> {
        let mut records = Vec::new();
        for name in self.list_records()? {
            match self.load(&name) {
                Ok(record) => records.push((name, record)),
                Err(e) => warn!(%name, error = %e, "Skipping unreadable record"),
            }
        }
        Ok(records)
    }

    /// Deletes one record. Returns false if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError`] for an invalid name or a failed removal.
    #[instrument(skip(self))]
    pub fn delete(&self, name: &str) -> Result<bool, HistoryError> {
        let path = self.record_path(name)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Record deleted");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Record not found");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Writes every record into one timestamped bundle in `dest_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError`] if any record cannot be read or the bundle
    /// cannot be written.
    pub fn export(&self, dest_dir: impl AsRef<Path>) -> Result<PathBuf, HistoryError> {
        self.export_at(dest_dir, Local::now().naive_local())
    }

    /// Writes every record into a bundle stamped with `timestamp`.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError`] if any record cannot be read or the bundle
    /// cannot be written.
    #[instrument(skip(self, dest_dir), fields(dest = %dest_dir.as_ref().display()))]
    pub fn export_at(
        &self,
        dest_dir: impl AsRef<Path>,
        timestamp: NaiveDateTime,
    ) -> Result<PathBuf, HistoryError> {
        let mut records = BTreeMap::new();
        for name in self.list_records()? {
            let record = self.load(&name)?;
            records.insert(name, record);
        }

        fs::create_dir_all(dest_dir.as_ref())?;
        let path = dest_dir.as_ref().join(format!(
            "{}{}.{}",
            EXPORT_PREFIX,
            timestamp.format("%Y%m%d_%H%M%S"),
            RECORD_EXTENSION
        ));
        let count = records.len();
        write_json(&path, &ExportBundle { records })?;
        info!(path = %path.display(), count, "Records exported");
        Ok(path)
    }

    /// Unpacks a bundle into the store, overwriting records with the same
    /// name. Returns the imported names.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError`] if the bundle is unreadable or names a file
    /// that is not a record.
    #[instrument(skip(self, bundle), fields(bundle = %bundle.as_ref().display()))]
    pub fn import(&self, bundle: impl AsRef<Path>) -> Result<Vec<String>, HistoryError> {
        let bundle: ExportBundle = read_json(bundle.as_ref())?;
        for name in bundle.records.keys() {
            validate_record_name(name)?;
        }

        self.ensure_dir()?;
        let mut imported = Vec::with_capacity(bundle.records.len());
        for (name, record) in bundle.records {
            write_json(&self.dir.join(&name), &record)?;
            debug!(%name, "Record imported");
            imported.push(name);
        }
        info!(count = imported.len(), "Records imported");
        Ok(imported)
    }
}

/// True for file names the store treats as game records.
fn is_record_name(name: &str) -> bool {
    name.ends_with(&format!(".{}", RECORD_EXTENSION))
        && name != METADATA_FILE
        && !name.starts_with(EXPORT_PREFIX)
}

fn validate_record_name(name: &str) -> Result<(), HistoryError> {
    let plain = Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name);
    if plain && is_record_name(name) {
        Ok(())
    } else {
        Err(HistoryError::new(
            HistoryErrorKind::InvalidName,
            format!("Not a record name: '{}'", name),
        ))
    }
}

fn modified_time(path: &Path) -> Result<NaiveDateTime, HistoryError> {
    let modified = fs::metadata(path)?.modified()?;
    debug!(path = %path.display(), "Using modification time");
    Ok(DateTime::<Local>::from(modified).naive_local())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), HistoryError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, HistoryError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
