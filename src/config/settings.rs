use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_completed_points() -> i64 {
    10
}
fn default_partial_points() -> i64 {
    5
}
fn default_failed_points() -> i64 {
    -8
}
fn default_inactive_points() -> i64 {
    -4
}
fn default_streak_bonus_points() -> i64 {
    5
}
fn default_positive_emotion_points() -> i64 {
    2
}
fn default_negative_emotion_points() -> i64 {
    -1
}
fn default_note_points() -> i64 {
    1
}
fn default_positive_emotions() -> Vec<String> {
    ["happy", "proud", "motivated", "excited", "calm"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_negative_emotions() -> Vec<String> {
    ["sad", "tired", "angry"].iter().map(|s| s.to_string()).collect()
}
fn default_lookahead_days() -> u32 {
    7
}
fn default_heatmap_days() -> u32 {
    28
}

/// When the streak bonus is paid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreakBonusPolicy {
    /// Once each time the running streak reaches a multiple of 7.
    #[default]
    Weekly,
    /// On every completed day while the running streak is at least 2.
    Daily,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_completed_points")]
    pub completed_points: i64,
    #[serde(default = "default_partial_points")]
    pub partial_points: i64,
    #[serde(default = "default_failed_points")]
    pub failed_points: i64,
    #[serde(default = "default_inactive_points")]
    pub inactive_points: i64,
    #[serde(default)]
    pub skipped_points: i64,
    #[serde(default)]
    pub streak_bonus: StreakBonusPolicy,
    #[serde(default = "default_streak_bonus_points")]
    pub streak_bonus_points: i64,
    #[serde(default = "default_positive_emotion_points")]
    pub positive_emotion_points: i64,
    #[serde(default = "default_negative_emotion_points")]
    pub negative_emotion_points: i64,
    #[serde(default = "default_note_points")]
    pub note_points: i64,
    #[serde(default = "default_positive_emotions")]
    pub emotion_positive: Vec<String>,
    #[serde(default = "default_negative_emotions")]
    pub emotion_negative: Vec<String>,
    /// Count partial days alongside completed ones in the completion rate.
    #[serde(default)]
    pub partial_counts_toward_rate: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            completed_points: default_completed_points(),
            partial_points: default_partial_points(),
            failed_points: default_failed_points(),
            inactive_points: default_inactive_points(),
            skipped_points: 0,
            streak_bonus: StreakBonusPolicy::Weekly,
            streak_bonus_points: default_streak_bonus_points(),
            positive_emotion_points: default_positive_emotion_points(),
            negative_emotion_points: default_negative_emotion_points(),
            note_points: default_note_points(),
            emotion_positive: default_positive_emotions(),
            emotion_negative: default_negative_emotions(),
            partial_counts_toward_rate: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Days ahead of today that get an empty status row on startup.
    #[serde(default = "default_lookahead_days")]
    pub lookahead_days: u32,
    #[serde(default = "default_heatmap_days")]
    pub heatmap_days: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            lookahead_days: default_lookahead_days(),
            heatmap_days: default_heatmap_days(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "flowtrack")
            .context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn db_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("flowtrack.db"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(&path).with_context(|| format!("Reading {:?}", path))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Parsing config.toml")
    }

    pub fn ensure_data_dir() -> Result<PathBuf> {
        let dir = Self::data_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}
