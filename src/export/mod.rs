// Export module - human-readable text reports of a playlist
// Two flavours: a dashboard snapshot and a summary with pin status

use crate::error::Result;
use crate::playlist::{format_duration, Playlist, Song};
use chrono::{DateTime, Utc};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const RULE: &str = "----------------------------------------";
const DOUBLE_RULE: &str = "========================================";

/// Snapshot of the playlist with totals and the three longest songs
pub fn render_dashboard(playlist: &Playlist, generated_at: DateTime<Utc>) -> String {
    let songs = snapshot(playlist);
    let mut out = header("PlayWise Playlist Dashboard Snapshot", playlist, generated_at);

    for (i, song) in songs.iter().enumerate() {
        let _ = writeln!(out, "{}. {} ({})", i + 1, song.display_line(), song.formatted_duration());
    }
    out.push_str(RULE);
    out.push('\n');

    let (total, average) = totals(&songs);
    let _ = writeln!(out, "Total Playlist Duration: {}", format_duration(total));
    let _ = writeln!(out, "Average Song Length: {}", format_duration(average));

    out.push_str("\nTop 3 Longest Songs:\n");
    let mut longest: Vec<&Song> = songs.iter().collect();
    longest.sort_by(|a, b| b.duration_secs.cmp(&a.duration_secs)); // stable: earlier wins ties
    for (i, song) in longest.iter().take(3).enumerate() {
        let _ = writeln!(out, "{}. {} - {}", i + 1, song.display_line(), song.formatted_duration());
    }

    out
}

/// Per-song pin status plus totals, pinned count and the extremes
pub fn render_summary(playlist: &Playlist, generated_at: DateTime<Utc>) -> String {
    let songs = snapshot(playlist);
    let mut out = header("PlayWise Playlist Summary Report", playlist, generated_at);

    let mut longest: Option<&Song> = None;
    let mut shortest: Option<&Song> = None;
    for (i, song) in songs.iter().enumerate() {
        let status = if song.pinned { "Pinned" } else { "Unpinned" };
        let _ = writeln!(
            out,
            "{}. {} ({}) - {}",
            i + 1,
            song.display_line(),
            song.formatted_duration(),
            status
        );

        if longest.map_or(true, |l| song.duration_secs > l.duration_secs) {
            longest = Some(song);
        }
        if shortest.map_or(true, |s| song.duration_secs < s.duration_secs) {
            shortest = Some(song);
        }
    }
    out.push_str(RULE);
    out.push('\n');

    let (total, average) = totals(&songs);
    let pinned = songs.iter().filter(|s| s.pinned).count();
    let _ = writeln!(out, "Total Duration: {}", format_duration(total));
    let _ = writeln!(out, "Average Song Length: {}", format_duration(average));
    let _ = writeln!(out, "Pinned Songs: {} / {}", pinned, songs.len());
    if let Some(song) = longest {
        let _ = writeln!(out, "Longest Song: {} ({})", song.title, song.formatted_duration());
    }
    if let Some(song) = shortest {
        let _ = writeln!(out, "Shortest Song: {} ({})", song.title, song.formatted_duration());
    }

    out
}

fn snapshot(playlist: &Playlist) -> Vec<Song> {
    playlist.iter().map(|song| song.borrow().clone()).collect()
}

fn header(title: &str, playlist: &Playlist, generated_at: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", DOUBLE_RULE);
    let _ = writeln!(out, "Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S UTC"));
    let _ = writeln!(out, "Playlist Name: {}", playlist.name());
    let _ = writeln!(out, "Total Songs: {}\n", playlist.len());
    out.push_str("Songs:\n");
    out.push_str(RULE);
    out.push('\n');
    out
}

/// (total, integer average) in seconds
fn totals(songs: &[Song]) -> (u64, u64) {
    let total: u64 = songs.iter().map(|s| s.duration_secs).sum();
    let average = if songs.is_empty() { 0 } else { total / songs.len() as u64 };
    (total, average)
}

/// Writes reports into one directory
pub struct ExportManager {
    directory: PathBuf,
}

impl ExportManager {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn export_dashboard(&self, playlist: &Playlist, file_name: &str) -> Result<PathBuf> {
        self.write(file_name, &render_dashboard(playlist, Utc::now()))
    }

    pub fn export_summary(&self, playlist: &Playlist, file_name: &str) -> Result<PathBuf> {
        self.write(file_name, &render_summary(playlist, Utc::now()))
    }

    fn write(&self, file_name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.directory.join(file_name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        info!("Exported report to {}", path.display());
        Ok(path)
    }
}

impl Default for ExportManager {
    fn default() -> Self {
        Self::new(".")
    }
}
