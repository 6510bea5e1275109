use crate::domain::decision::RoutingDecision;
use anyhow::Result;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Append-only JSONL decision log, one dated partition per day, optionally
/// suffixed for experiment grouping. Files are only ever appended to.
#[derive(Debug, Clone)]
pub struct DecisionLog {
    pub dir: PathBuf,
}

impl DecisionLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn partition_name(date: &str, suffix: Option<&str>) -> String {
        match suffix {
            Some(s) => format!("routing_{}_{}.jsonl", date, s),
            None => format!("routing_{}.jsonl", date),
        }
    }

    pub fn append(&self, decision: &RoutingDecision, suffix: Option<&str>) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let date = decision.timestamp.format("%Y%m%d").to_string();
        let path = self.dir.join(Self::partition_name(&date, suffix));

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", serde_json::to_string(decision)?)?;
        Ok(())
    }
}
