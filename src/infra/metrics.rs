// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records training metrics to a CSV file after each epoch.
//
// Metrics recorded per epoch:
//   classifier: epoch, train_loss, num_batches, train_acc, dev_acc
//   language model: epoch, train_loss, num_batches,
//                   dev_log_prob, dev_perplexity
//
// train_loss is the mean of the per-batch losses (divided by the
// number of batches, so a short final batch counts once).
//
// Output files (only when a metrics directory is given):
//   <dir>/metrics.csv   — one row per epoch, appended across runs
//   <dir>/summary.json  — the final report of the last run

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    marker::PhantomData,
    path::PathBuf,
};

/// A record that can be written as one CSV row.
pub trait CsvRecord {
    fn header() -> &'static str;
    fn row(&self) -> String;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierEpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch:          usize,
    pub train_loss:     f64,
    pub num_batches:    usize,
    pub train_accuracy: f64,
    pub dev_accuracy:   f64,
}

impl ClassifierEpochMetrics {
    /// True if this epoch beats the best dev accuracy seen so far.
    pub fn is_improvement(&self, best_dev_accuracy: f64) -> bool {
        self.dev_accuracy > best_dev_accuracy
    }
}

impl CsvRecord for ClassifierEpochMetrics {
    fn header() -> &'static str {
        "epoch,train_loss,num_batches,train_acc,dev_acc"
    }

    fn row(&self) -> String {
        format!(
            "{},{:.6},{},{:.6},{:.6}",
            self.epoch, self.train_loss, self.num_batches, self.train_accuracy, self.dev_accuracy
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LmEpochMetrics {
    pub epoch:          usize,
    pub train_loss:     f64,
    pub num_batches:    usize,
    /// None when no dev text was supplied
    pub dev_log_prob:   Option<f64>,
    pub dev_perplexity: Option<f64>,
}

impl LmEpochMetrics {
    /// True if this epoch's dev perplexity beats `best_perplexity`.
    pub fn is_improvement(&self, best_perplexity: f64) -> bool {
        self.dev_perplexity.is_some_and(|p| p < best_perplexity)
    }
}

impl CsvRecord for LmEpochMetrics {
    fn header() -> &'static str {
        "epoch,train_loss,num_batches,dev_log_prob,dev_perplexity"
    }

    fn row(&self) -> String {
        let opt = |v: Option<f64>| v.map(|x| format!("{x:.6}")).unwrap_or_default();
        format!(
            "{},{:.6},{},{},{}",
            self.epoch,
            self.train_loss,
            self.num_batches,
            opt(self.dev_log_prob),
            opt(self.dev_perplexity)
        )
    }
}

/// Appends epoch records of one kind to `<dir>/metrics.csv`.
pub struct MetricsLogger<R: CsvRecord> {
    dir:      PathBuf,
    csv_path: PathBuf,
    _record:  PhantomData<R>,
}

impl<R: CsvRecord> MetricsLogger<R> {
    /// Create the directory if needed and write the CSV header
    /// only if the file doesn't exist yet.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create metrics directory '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)
                .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
            writeln!(f, "{}", R::header())?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { dir, csv_path, _record: PhantomData })
    }

    pub fn log(&self, record: &R) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;
        writeln!(f, "{}", record.row())?;
        Ok(())
    }

    pub fn log_all(&self, records: &[R]) -> Result<()> {
        records.iter().try_for_each(|r| self.log(r))
    }

    /// Overwrite `<dir>/summary.json` with a pretty-printed summary.
    pub fn write_summary<S: Serialize>(&self, summary: &S) -> Result<()> {
        let path = self.dir.join("summary.json");
        let json = serde_json::to_string_pretty(summary)?;
        fs::write(&path, json).with_context(|| format!("Cannot write '{}'", path.display()))?;
        tracing::debug!("Saved run summary to '{}'", path.display());
        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn classifier_metrics(epoch: usize, dev: f64) -> ClassifierEpochMetrics {
        ClassifierEpochMetrics {
            epoch,
            train_loss: 0.5,
            num_batches: 3,
            train_accuracy: 0.8,
            dev_accuracy: dev,
        }
    }

    #[test]
    fn test_is_improvement() {
        let m = classifier_metrics(2, 0.7);
        assert!(m.is_improvement(0.6));
        assert!(!m.is_improvement(0.7));
    }

    #[test]
    fn test_lm_without_dev_never_improves() {
        let m = LmEpochMetrics {
            epoch: 1,
            train_loss: 2.0,
            num_batches: 5,
            dev_log_prob: None,
            dev_perplexity: None,
        };
        assert!(!m.is_improvement(f64::INFINITY));
        assert_eq!(m.row(), "1,2.000000,5,,");
    }

    #[test]
    fn test_csv_header_written_once_and_rows_appended() {
        let dir    = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::<ClassifierEpochMetrics>::new(dir.path()).unwrap();
        logger.log_all(&[classifier_metrics(1, 0.5), classifier_metrics(2, 0.6)]).unwrap();

        // A second logger on the same directory appends without a new header
        let again = MetricsLogger::<ClassifierEpochMetrics>::new(dir.path()).unwrap();
        again.log(&classifier_metrics(3, 0.7)).unwrap();

        let csv   = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], ClassifierEpochMetrics::header());
        assert_eq!(lines[1], "1,0.500000,3,0.800000,0.500000");
    }

    #[test]
    fn test_summary_is_json() {
        let dir    = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::<ClassifierEpochMetrics>::new(dir.path()).unwrap();
        logger.write_summary(&classifier_metrics(1, 0.5)).unwrap();

        let json = fs::read_to_string(dir.path().join("summary.json")).unwrap();
        let back: ClassifierEpochMetrics = serde_json::from_str(&json).unwrap();
        assert_eq!(back, classifier_metrics(1, 0.5));
    }
}
