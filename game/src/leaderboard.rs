use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::player::Player;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub first_name: String,
    pub last_name: String,
    pub score: i32,
    /// Display date, e.g. `18 Oct 2026`.
    pub date: String,
}

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("failed to access leaderboard file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode leaderboard: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Formats a record date the way the leaderboard shows it.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%-d %b %Y").to_string()
}

/// Medal shown next to the first three ranks (0-based).
pub fn medal(rank: usize) -> Option<&'static str> {
    match rank {
        0 => Some("🥇"),
        1 => Some("🥈"),
        2 => Some("🥉"),
        _ => None,
    }
}

/// JSON file holding every recorded score, highest first.
#[derive(Debug, Clone)]
pub struct LeaderboardStore {
    path: PathBuf,
}

impl LeaderboardStore {
    pub fn from_env() -> Self {
        if let Some(explicit) = std::env::var_os("BEAT_TIMELINE_LEADERBOARD_PATH") {
            return Self {
                path: PathBuf::from(explicit),
            };
        }

        let base = std::env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME").map(|home| {
                    let mut p = PathBuf::from(home);
                    p.push(".local");
                    p.push("share");
                    p
                })
            })
            .unwrap_or_else(|| PathBuf::from("."));

        let mut path = base;
        path.push("beat-timeline");
        path.push("leaderboard.json");
        Self { path }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records, highest score first. Missing or unreadable storage reads as empty.
    pub fn read(&self) -> Vec<LeaderboardEntry> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Vec::new(),
            Err(err) => {
                warn!(path = %self.path.display(), %err, "failed to read leaderboard");
                return Vec::new();
            }
        };
        match serde_json::from_slice::<Vec<LeaderboardEntry>>(&bytes) {
            Ok(mut entries) => {
                sort_descending(&mut entries);
                entries
            }
            Err(err) => {
                warn!(path = %self.path.display(), %err, "leaderboard file is corrupt; treating as empty");
                Vec::new()
            }
        }
    }

    /// Appends a record dated today. Failures are logged and otherwise ignored.
    pub fn write(&self, player: &Player, score: i32) {
        if let Err(err) = self.try_write_at(player, score, Local::now().date_naive()) {
            warn!(%err, "failed to save score");
        }
    }

    pub fn try_write_at(
        &self,
        player: &Player,
        score: i32,
        date: NaiveDate,
    ) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let mut entries = self.read();
        entries.push(LeaderboardEntry {
            first_name: player.first_name().to_string(),
            last_name: player.last_name().to_string(),
            score,
            date: format_date(date),
        });
        sort_descending(&mut entries);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| LeaderboardError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        let text = serde_json::to_string_pretty(&entries)?;
        fs::write(&self.path, text).map_err(|source| LeaderboardError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!(score, total = entries.len(), "score saved");
        Ok(entries)
    }
}

/// Stable, so equal scores keep their insertion order.
fn sort_descending(entries: &mut [LeaderboardEntry]) {
    entries.sort_by(|a, b| b.score.cmp(&a.score));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_use_day_short_month_year() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).expect("valid date");
        assert_eq!(format_date(date), "18 Oct 2026");
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).expect("valid date");
        assert_eq!(format_date(date), "5 Mar 2024");
    }

    #[test]
    fn medals_only_for_the_podium() {
        assert_eq!(medal(0), Some("🥇"));
        assert_eq!(medal(2), Some("🥉"));
        assert_eq!(medal(3), None);
    }

    #[test]
    fn entries_use_camel_case_keys() {
        let entry = LeaderboardEntry {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            score: 40,
            date: "18 Oct 2026".into(),
        };
        let json = serde_json::to_string(&entry).expect("serialize entry");
        assert!(json.contains("\"firstName\":\"Ada\""));
        assert!(json.contains("\"lastName\""));
    }
}
