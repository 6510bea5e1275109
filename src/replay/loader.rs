use crate::domain::decision::RoutingDecision;
use anyhow::Result;
use std::io::BufRead;
use std::path::PathBuf;

/// Which decision-log partitions to load.
#[derive(Debug, Clone)]
pub enum LogSelection {
    /// Every `routing_*.jsonl` partition in the directory.
    All,
    /// Every partition for a `YYYYMMDD` date, any suffix.
    Date(String),
    /// Exactly one `routing_{date}_{suffix}.jsonl` partition.
    DateSuffix(String, String),
}

pub struct LogReplayer {
    pub log_dir: PathBuf,
}

impl LogReplayer {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
        }
    }

    pub fn load(&self, selection: &LogSelection) -> Result<Vec<RoutingDecision>> {
        let entries = match std::fs::read_dir(&self.log_dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %self.log_dir.display(), error = %e, "log directory unreadable");
                return Ok(Vec::new());
            }
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|name| matches_selection(name, selection))
            })
            .collect();
        files.sort();

        if files.is_empty() {
            tracing::warn!(dir = %self.log_dir.display(), ?selection, "no log files matched");
            return Ok(Vec::new());
        }

        let mut decisions = Vec::new();
        for path in files {
            let file = std::fs::File::open(&path)?;
            for line in std::io::BufReader::new(file).lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<RoutingDecision>(&line) {
                    Ok(decision) => decisions.push(decision),
                    Err(e) => {
                        tracing::warn!(file = %path.display(), error = %e, "skipping malformed decision line");
                    }
                }
            }
        }

        tracing::info!(count = decisions.len(), "loaded routing decisions");
        Ok(decisions)
    }
}

fn matches_selection(name: &str, selection: &LogSelection) -> bool {
    if !name.ends_with(".jsonl") {
        return false;
    }
    match selection {
        LogSelection::All => name.starts_with("routing_"),
        LogSelection::Date(date) => name.starts_with(&format!("routing_{}", date)),
        LogSelection::DateSuffix(date, suffix) => {
            name == format!("routing_{}_{}.jsonl", date, suffix)
        }
    }
}
