// Local Answer Table: exact-match question -> answer lookup loaded at startup

use std::collections::HashMap;
use std::path::Path;

use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct LocalAnswers {
    entries: HashMap<String, String>,
}

impl LocalAnswers {
    /// Read the resource at `path`. A missing or unreadable file yields an
    /// empty table.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let answers = Self::parse(&text);
                info!("Loaded {} local answers from {}", answers.len(), path.display());
                answers
            }
            Err(e) => {
                warn!("Local answers unavailable at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Entries are separated by blank lines. The first line of an entry is
    /// the question, the rest are joined with spaces into the answer.
    pub fn parse(text: &str) -> Self {
        let mut entries = HashMap::new();
        let mut block: Vec<&str> = Vec::new();

        for line in text.lines().chain(std::iter::once("")) {
            let line = line.trim();
            if !line.is_empty() {
                block.push(line);
                continue;
            }
            if block.len() >= 2 {
                entries.insert(block[0].to_lowercase(), block[1..].join(" "));
            }
            block.clear();
        }

        Self { entries }
    }

    pub fn lookup(&self, query: &str) -> Option<&str> {
        let key = query.trim();
        if key.is_empty() {
            return None;
        }
        self.entries.get(&key.to_lowercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
