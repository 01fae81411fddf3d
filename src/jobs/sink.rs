use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tokio::{fs::OpenOptions, io::AsyncWriteExt};

/// Timestamp layout used at the start of each sink line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stamp {
    /// `DD/MM/YYYY-HH:MM:SS`
    DayFirst,
    /// `YYYY-MM-DD HH:MM:SS`
    Iso,
}

impl Stamp {
    pub fn format(self, at: DateTime<Local>) -> String {
        match self {
            Stamp::DayFirst => at.format("%d/%m/%Y-%H:%M:%S").to_string(),
            Stamp::Iso => at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Append-only text file a job reports into.
#[derive(Debug, Clone)]
pub struct LogSink {
    path: PathBuf,
    stamp: Stamp,
}

impl LogSink {
    pub fn new(path: impl Into<PathBuf>, stamp: Stamp) -> Self {
        Self {
            path: path.into(),
            stamp,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn stamp_now(&self) -> String {
        self.stamp.format(Local::now())
    }

    /// Writes `lines` in one append, creating the file if needed.
    pub async fn append(&self, lines: &[String]) -> std::io::Result<()> {
        let mut buf = String::new();
        for line in lines {
            buf.push_str(line);
            buf.push('\n');
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(buf.as_bytes()).await?;
        file.flush().await
    }
}
