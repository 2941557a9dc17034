// ============================================================
// Layer 2 — ClassifyUseCase
// ============================================================
//   Step 1: Load the four corpora           (Layer 4 - data)
//   Step 2: Label contexts by corpus        (Layer 3 - domain)
//   Step 3: Train the chosen classifier     (Layer 5 - ml)
//   Step 4: Measure train / dev accuracy    (Layer 5 - ml)
//   Step 5: Write metrics if asked to       (Layer 6 - infra)

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::application::{device, TrainBackend};
use crate::data::loader::CorpusLoader;
use crate::domain::{label::LabeledExample, vocab::Vocabulary};
use crate::infra::metrics::{ClassifierEpochMetrics, MetricsLogger};
use crate::ml::{
    baseline::FrequencyBasedClassifier,
    classifier::RnnClassifierConfig,
    encoder::SequenceEncoderConfig,
    evaluation::accuracy,
    trainer::{train_classifier, TrainingOptions},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    Frequency,
    Rnn,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyConfig {
    pub train_consonant: String,
    pub train_vowel:     String,
    pub dev_consonant:   String,
    pub dev_vowel:       String,
    pub model:           ClassifierKind,
    pub epochs:          usize,
    pub batch_size:      usize,
    pub lr:              f64,
    pub seed:            u64,
    pub d_emb:           usize,
    pub d_hidden:        usize,
    pub d_head:          usize,
    pub dropout:         f64,
    pub metrics_dir:     Option<String>,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            train_consonant: "data/train-consonant-examples.txt".to_string(),
            train_vowel:     "data/train-vowel-examples.txt".to_string(),
            dev_consonant:   "data/dev-consonant-examples.txt".to_string(),
            dev_vowel:       "data/dev-vowel-examples.txt".to_string(),
            model:           ClassifierKind::Rnn,
            epochs:          20,
            batch_size:      4,
            lr:              0.005,
            seed:            10,
            d_emb:           30,
            d_hidden:        32,
            d_head:          16,
            dropout:         0.5,
            metrics_dir:     None,
        }
    }
}

/// What a run reports back to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyOutcome {
    pub model:          ClassifierKind,
    pub train_accuracy: f64,
    pub dev_accuracy:   f64,
    /// Empty for the frequency baseline
    pub epochs:         Vec<ClassifierEpochMetrics>,
}

pub struct ClassifyUseCase {
    config: ClassifyConfig,
}

impl ClassifyUseCase {
    pub fn new(config: ClassifyConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<ClassifyOutcome> {
        let cfg = &self.config;

        // ── Step 1: Load corpora ──────────────────────────────────────────────
        let train_cons  = CorpusLoader::new(&cfg.train_consonant).load_examples()?;
        let train_vowel = CorpusLoader::new(&cfg.train_vowel).load_examples()?;
        let dev_cons    = CorpusLoader::new(&cfg.dev_consonant).load_examples()?;
        let dev_vowel   = CorpusLoader::new(&cfg.dev_vowel).load_examples()?;
        tracing::info!(
            "Loaded {} / {} train and {} / {} dev examples (consonant / vowel)",
            train_cons.len(),
            train_vowel.len(),
            dev_cons.len(),
            dev_vowel.len()
        );

        // ── Step 2: Label ─────────────────────────────────────────────────────
        let vocab = Vocabulary::default();
        let train = LabeledExample::from_corpora(&train_cons, &train_vowel);
        let dev   = LabeledExample::from_corpora(&dev_cons, &dev_vowel);

        // ── Steps 3 + 4: Train and evaluate ───────────────────────────────────
        let outcome = match cfg.model {
            ClassifierKind::Frequency => {
                let clf = FrequencyBasedClassifier::train(&train_cons, &train_vowel)?;
                ClassifyOutcome {
                    model:          cfg.model,
                    train_accuracy: accuracy(&clf, &train)?,
                    dev_accuracy:   accuracy(&clf, &dev)?,
                    epochs:         Vec::new(),
                }
            }
            ClassifierKind::Rnn => {
                let model_cfg = RnnClassifierConfig::new(
                    SequenceEncoderConfig::new(vocab.size())
                        .with_d_emb(cfg.d_emb)
                        .with_d_hidden(cfg.d_hidden),
                )
                .with_d_head(cfg.d_head)
                .with_dropout(cfg.dropout);

                let run = train_classifier::<TrainBackend>(
                    &model_cfg,
                    &self.options(),
                    &train,
                    &dev,
                    &vocab,
                    &device(),
                )?;
                ClassifyOutcome {
                    model:          cfg.model,
                    train_accuracy: accuracy(&run.classifier, &train)?,
                    dev_accuracy:   accuracy(&run.classifier, &dev)?,
                    epochs:         run.metrics,
                }
            }
        };

        let mut best: Option<&ClassifierEpochMetrics> = None;
        for m in &outcome.epochs {
            if best.map_or(true, |b| m.is_improvement(b.dev_accuracy)) {
                best = Some(m);
            }
        }
        if let Some(best) = best {
            tracing::info!("Best dev accuracy {:.3} at epoch {}", best.dev_accuracy, best.epoch);
        }

        // ── Step 5: Metrics ───────────────────────────────────────────────────
        if let Some(dir) = &cfg.metrics_dir {
            let logger = MetricsLogger::<ClassifierEpochMetrics>::new(dir)?;
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
