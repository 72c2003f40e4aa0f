use chrono::{DateTime, Local};
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const SEPARATOR_WIDTH: usize = 30;

/// Append-only daily transcript of user/assistant exchanges.
#[derive(Debug, Clone)]
pub struct TranscriptLog {
    path: PathBuf,
}

impl TranscriptLog {
    /// Transcript for the day of `now` inside `dir`, creating the directory.
    pub fn daily(dir: &Path, now: DateTime<Local>) -> Result<Self, Box<dyn std::error::Error>> {
        fs::create_dir_all(dir)?;
        let file_name = format!("chat_ID-{}.txt", now.format("%Y%m%d"));
        Ok(Self {
            path: dir.join(file_name),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self, user_text: &str, ai_text: &str) -> Result<(), Box<dyn std::error::Error>> {
        self.record_at(user_text, ai_text, Local::now())
    }

    pub fn record_at(
        &self,
        user_text: &str,
        ai_text: &str,
        at: DateTime<Local>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = BufWriter::new(file);
        let timestamp = at.format("%H:%M:%S");

        writeln!(writer, "[{timestamp}] USER: {user_text}")?;
        writeln!(writer, "[{timestamp}] AI: {ai_text}")?;
        writeln!(writer, "{}", "-".repeat(SEPARATOR_WIDTH))?;
        writer.flush()?;
        Ok(())
    }
}
