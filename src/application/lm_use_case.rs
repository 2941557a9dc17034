// ============================================================
// Layer 2 — LmUseCase
// ============================================================
//   Step 1: Load train / dev text               (Layer 4 - data)
//   Step 2: Build the chosen language model     (Layer 5 - ml)
//   Step 3: Score the dev text from a blank
//           context, check the model sums to 1
//           and obeys the chain rule            (Layer 5 - ml)
//   Step 4: Write metrics if asked to           (Layer 6 - infra)

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

use crate::application::{device, TrainBackend};
use crate::data::{chunker::START_SYMBOL, loader::CorpusLoader};
use crate::domain::{traits::LanguageModel, vocab::Vocabulary};
use crate::infra::metrics::{LmEpochMetrics, MetricsLogger};
use crate::ml::{
    baseline::UniformLanguageModel,
    encoder::SequenceEncoderConfig,
    evaluation::{chain_rule_gap, evaluate_text, normalization_sum, LmEvaluation},
    language_model::RnnLanguageModelConfig,
    trainer::{train_language_model, TrainingOptions},
};

/// Dev-text prefix length used for the chain-rule consistency check.
const CHAIN_RULE_CHECK_LEN: usize = 50;
const NORMALIZATION_TOLERANCE: f64 = 1e-2;
const CHAIN_RULE_TOLERANCE: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LmKind {
    Uniform,
    Rnn,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LmConfig {
    pub train_path:  String,
    pub dev_path:    String,
    pub model:       LmKind,
    pub epochs:      usize,
    pub batch_size:  usize,
    pub lr:          f64,
    pub seed:        u64,
    pub chunk_len:   usize,
    pub d_emb:       usize,
    pub d_hidden:    usize,
    pub dropout:     f64,
    pub metrics_dir: Option<String>,
}

impl Default for LmConfig {
    fn default() -> Self {
        Self {
            train_path:  "data/text8-100k.txt".to_string(),
            dev_path:    "data/text8-dev.txt".to_string(),
            model:       LmKind::Rnn,
            epochs:      5,
            batch_size:  16,
            lr:          0.005,
            seed:        10,
            chunk_len:   20,
            d_emb:       30,
            d_hidden:    64,
            dropout:     0.1,
            metrics_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LmOutcome {
    pub model:             LmKind,
    pub dev:               LmEvaluation,
    pub normalization_sum: f64,
    pub chain_rule_gap:    f64,
    /// Empty for the uniform baseline
    pub epochs:            Vec<LmEpochMetrics>,
}

pub struct LmUseCase {
    config: LmConfig,
}

impl LmUseCase {
    pub fn new(config: LmConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<LmOutcome> {
        let cfg = &self.config;

        // ── Step 1: Load text ─────────────────────────────────────────────────
        let train_text = CorpusLoader::new(&cfg.train_path).load_text()?;
        let dev_text   = CorpusLoader::new(&cfg.dev_path).load_text()?;
        ensure!(!dev_text.is_empty(), "Dev text '{}' is empty", cfg.dev_path);
        tracing::info!(
            "Loaded {} train and {} dev characters",
            train_text.chars().count(),
            dev_text.chars().count()
        );

        // ── Step 2: Build the model ───────────────────────────────────────────
        let vocab = Vocabulary::default();
        let (lm, epochs): (Box<dyn LanguageModel>, Vec<LmEpochMetrics>) = match cfg.model {
            LmKind::Uniform => {
                let uniform = UniformLanguageModel::new(vocab.size())?;
                (Box::new(uniform) as Box<dyn LanguageModel>, Vec::new())
            }
            LmKind::Rnn => {
                let model_cfg = RnnLanguageModelConfig::new(
                    SequenceEncoderConfig::new(vocab.size())
                        .with_d_emb(cfg.d_emb)
                        .with_d_hidden(cfg.d_hidden),
                )
                .with_dropout(cfg.dropout);

                let run = train_language_model::<TrainBackend>(
                    &model_cfg,
                    &self.options(),
                    cfg.chunk_len,
                    &train_text,
                    &dev_text,
                    &vocab,
                    &device(),
                )?;
                (Box::new(run.language_model) as Box<dyn LanguageModel>, run.metrics)
            }
        };

        // ── Step 3: Evaluate ──────────────────────────────────────────────────
        let context = START_SYMBOL.to_string();
        let dev     = evaluate_text(lm.as_ref(), &dev_text, &context)?;
        let norm    = normalization_sum(lm.as_ref(), &vocab, &context)?;
        let check: String = dev_text.chars().take(CHAIN_RULE_CHECK_LEN).collect();
        let gap     = chain_rule_gap(lm.as_ref(), &check, &context)?;

        if (norm - 1.0).abs() > NORMALIZATION_TOLERANCE {
            tracing::warn!("Next-character probabilities sum to {:.4}, not 1", norm);
        }
        if gap > CHAIN_RULE_TOLERANCE {
            tracing::warn!("Sequence score differs from summed single scores by {:.6}", gap);
        }

        let mut best: Option<&LmEpochMetrics> = None;
        for m in &epochs {
            if m.is_improvement(best.and_then(|b| b.dev_perplexity).unwrap_or(f64::INFINITY)) {
                best = Some(m);
            }
        }
        if let Some(best) = best {
            tracing::info!(
                "Best dev perplexity {:.3} at epoch {}",
                best.dev_perplexity.unwrap_or(f64::NAN),
                best.epoch
            );
        }

        let outcome = LmOutcome {
            model: cfg.model,
            dev,
            normalization_sum: norm,
            chain_rule_gap: gap,
            epochs,
        };

        // ── Step 4: Metrics ───────────────────────────────────────────────────
        if let Some(dir) = &cfg.metrics_dir {
            let logger = MetricsLogger::<LmEpochMetrics>::new(dir)?;
            logger.log_all(&outcome.epochs)?;
            logger.write_summary(&outcome)?;
        }

        Ok(outcome)
    }

    fn options(&self) -> TrainingOptions {
        TrainingOptions {
            epochs:        self.config.epochs,
            batch_size:    self.config.batch_size,
            learning_rate: self.config.lr,
            seed:          self.config.seed,
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::fs;

    fn write_texts(dir: &std::path::Path) -> LmConfig {
        fs::write(dir.join("train.txt"), "the cat sat on the mat ".repeat(5)).unwrap();
        fs::write(dir.join("dev.txt"), "the dog sat\n").unwrap();
        LmConfig {
            train_path: dir.join("train.txt").to_string_lossy().into_owned(),
            dev_path:   dir.join("dev.txt").to_string_lossy().into_owned(),
            model:      LmKind::Uniform,
            ..LmConfig::default()
        }
    }

    #[test]
    fn test_uniform_reference_run() {
        let dir     = tempfile::tempdir().unwrap();
        let outcome = LmUseCase::new(write_texts(dir.path())).execute().unwrap();

        assert_relative_eq!(outcome.dev.perplexity, 27.0, epsilon = 1e-9);
        assert_relative_eq!(outcome.normalization_sum, 1.0, epsilon = 1e-9);
        assert!(outcome.chain_rule_gap < 1e-9);
    }

    #[test]
    fn test_rnn_run_is_normalised_and_consistent() {
        let dir    = tempfile::tempdir().unwrap();
        let config = LmConfig {
            model:      LmKind::Rnn,
            epochs:     1,
            batch_size: 4,
            chunk_len:  8,
            d_emb:      4,
            d_hidden:   8,
            ..write_texts(dir.path())
        };
        let outcome = LmUseCase::new(config).execute().unwrap();

        assert_eq!(outcome.epochs.len(), 1);
        assert_relative_eq!(outcome.normalization_sum, 1.0, epsilon = 1e-3);
        assert!(outcome.chain_rule_gap < 1e-3);
        assert!(outcome.dev.perplexity.is_finite());
    }

    #[test]
    fn test_empty_dev_text_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_texts(dir.path());
        fs::write(&config.dev_path, "\n").unwrap();
        assert!(LmUseCase::new(config).execute().is_err());
    }
}
