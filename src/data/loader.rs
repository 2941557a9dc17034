// ============================================================
// Layer 4 — Corpus Loader
// ============================================================
// Classification corpora hold one context per line; the
// language-model corpora are a single run of text. Neither is
// cleaned here: a character outside the alphabet must surface
// as an error when the dataset is encoded.

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

pub struct CorpusLoader {
    path: PathBuf,
}

impl CorpusLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read one example per line. Line terminators are stripped,
    /// spaces inside a line are kept, blank lines are dropped.
    pub fn load_examples(&self) -> Result<Vec<String>> {
        let raw = self.read()?;
        let examples: Vec<String> = raw
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        tracing::debug!(
            "Loaded {} examples from '{}'",
            examples.len(),
            self.path.display()
        );
        Ok(examples)
    }

    /// Read the whole file as one text, minus trailing line terminators.
    pub fn load_text(&self) -> Result<String> {
        let raw  = self.read()?;
        let text = raw.trim_end_matches(['\n', '\r']).to_string();
        tracing::debug!(
            "Loaded {} characters from '{}'",
            text.chars().count(),
            self.path.display()
        );
        Ok(text)
    }

    fn read(&self) -> Result<String> {
        fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read corpus file '{}'", self.path.display()))
    }
}
