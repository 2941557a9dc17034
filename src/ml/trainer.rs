// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Shared shape of both training runs:
//
//   for each epoch:
//     shuffle example order (seeded StdRng)
//     for each batch of `batch_size` (last one may be short):
//       forward → cross-entropy → backward → one Adam step
//     average loss = sum(batch losses) / number of batches
//     model.valid() → frozen copy on the inner backend
//       (no autodiff, dropout off) → evaluate
//
// The trainer is the only owner of the mutable autodiff model.
// Callers receive read-only handles over the inner-backend model,
// and parameters are only well-defined between epochs.
//
// Reference: Kingma & Ba (2015) Adam

use std::ops::Range;

use burn::{
    data::dataset::Dataset,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::data::{
    batcher::{ClassificationBatcher, LmBatcher},
    chunker::{CharChunker, START_SYMBOL},
    dataset::{ClassificationDataset, LmDataset},
    partition::{batch_ranges, epoch_average_loss, num_batches, shuffled_order},
};
use crate::domain::{label::LabeledExample, vocab::Vocabulary};
use crate::error::ModelError;
use crate::infra::metrics::{ClassifierEpochMetrics, LmEpochMetrics};
use crate::ml::{
    classifier::{RnnClassifier, RnnClassifierConfig, RnnClassifierModel},
    evaluation::{accuracy, evaluate_text},
    language_model::{CharLanguageModel, RnnLanguageModelConfig},
    scorer::RnnLanguageModel,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingOptions {
    pub epochs:        usize,
    pub batch_size:    usize,
    pub learning_rate: f64,
    /// Seeds both the backend RNG (initialisation, dropout) and the shuffle order
    pub seed:          u64,
}

pub struct ClassifierRun<B: Backend> {
    pub classifier:   RnnClassifier<B>,
    pub metrics:      Vec<ClassifierEpochMetrics>,
    /// Per epoch, the loss of every batch in visiting order
    pub batch_losses: Vec<Vec<f64>>,
}

pub struct LmRun<B: Backend> {
    pub language_model: RnnLanguageModel<B>,
    pub metrics:        Vec<LmEpochMetrics>,
    pub batch_losses:   Vec<Vec<f64>>,
}

fn check_vocab_size(model_vocab: usize, vocab: &Vocabulary) -> Result<(), ModelError> {
    if model_vocab != vocab.size() {
        return Err(ModelError::DataShape(format!(
            "model expects {model_vocab} characters but the vocabulary has {}",
            vocab.size()
        )));
    }
    Ok(())
}

/// Average loss of an epoch that must have run exactly
/// `expected` = ceil(n / batch_size) batches.
fn epoch_loss(batch_losses: &[f64], expected: usize) -> Result<f64, ModelError> {
    if batch_losses.len() != expected {
        return Err(ModelError::DataShape(format!(
            "epoch ran {} batches, expected {expected}",
            batch_losses.len()
        )));
    }
    Ok(epoch_average_loss(batch_losses))
}

/// One pass over `order`, batch by batch. Returns the updated
/// model and the scalar loss of every batch.
fn train_epoch<B, M, O, D, I, F>(
    mut model:    M,
    optim:        &mut O,
    dataset:      &D,
    order:        &[usize],
    ranges:       &[Range<usize>],
    lr:           f64,
    forward_loss: F,
) -> Result<(M, Vec<f64>), ModelError>
where
    B: AutodiffBackend,
    M: AutodiffModule<B>,
    O: Optimizer<M, B>,
    D: Dataset<I>,
    F: Fn(&M, Vec<I>) -> Result<Tensor<B, 1>, ModelError>,
{
    let mut batch_losses = Vec::with_capacity(ranges.len());

    for (step, range) in ranges.iter().enumerate() {
        let items: Vec<I> = order[range.clone()]
            .iter()
            .filter_map(|&i| dataset.get(i))
            .collect();

        let loss = forward_loss(&model, items)?;
        let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
        batch_losses.push(loss_val);
        tracing::trace!("batch {} loss={:.4}", step + 1, loss_val);

        let grads = GradientsParams::from_grads(loss.backward(), &model);
        model = optim.step(lr, model, grads);
    }

    Ok((model, batch_losses))
}

/// Train the consonant/vowel classifier and report per-epoch metrics.
pub fn train_classifier<B: AutodiffBackend>(
    model_cfg: &RnnClassifierConfig,
    options:   &TrainingOptions,
    train:     &[LabeledExample],
    dev:       &[LabeledExample],
    vocab:     &Vocabulary,
    device:    &B::Device,
) -> Result<ClassifierRun<B::InnerBackend>, ModelError> {
    let ranges = batch_ranges(train.len(), options.batch_size)?;
    check_vocab_size(model_cfg.encoder.vocab_size, vocab)?;

    // Encoding validates every context up front: one bad example fails the run.
    let train_set = ClassificationDataset::encode(train, vocab)?;
    ClassificationDataset::encode(dev, vocab)?;
    if train.is_empty() {
        return Err(ModelError::DataShape("no training examples".to_string()));
    }

    B::seed(options.seed);
    let mut rng = StdRng::seed_from_u64(options.seed);

    let mut model: RnnClassifierModel<B> = model_cfg.init(device);
    let mut optim   = AdamConfig::new().init::<B, RnnClassifierModel<B>>();
    let batcher     = ClassificationBatcher::<B>::new(device.clone());
    let mut metrics = Vec::with_capacity(options.epochs);
    let mut losses  = Vec::with_capacity(options.epochs);
    let expected    = num_batches(train_set.len(), options.batch_size);

    tracing::info!(
        "Training classifier: {} train / {} dev examples, {} batches per epoch",
        train.len(),
        dev.len(),
        ranges.len()
    );

    for epoch in 1..=options.epochs {
        let order = shuffled_order(train_set.len(), &mut rng);
        let (updated, batch_losses) = train_epoch(
            model,
            &mut optim,
            &train_set,
            &order,
            &ranges,
            options.learning_rate,
            |m: &RnnClassifierModel<B>, items| m.forward_loss(&batcher, items),
        )?;
        model = updated;

        let frozen = RnnClassifier::new(model.valid(), vocab.clone());
        let record = ClassifierEpochMetrics {
            epoch,
            train_loss:     epoch_loss(&batch_losses, expected)?,
            num_batches:    expected,
            train_accuracy: accuracy(&frozen, train)?,
            dev_accuracy:   accuracy(&frozen, dev)?,
        };

        tracing::info!(
            "Epoch {:>3}/{} | train_loss={:.4} | train_acc={:.3} | dev_acc={:.3}",
            epoch,
            options.epochs,
            record.train_loss,
            record.train_accuracy,
            record.dev_accuracy,
        );
        metrics.push(record);
        losses.push(batch_losses);
    }

    Ok(ClassifierRun {
        classifier:   RnnClassifier::new(model.valid(), vocab.clone()),
        metrics,
        batch_losses: losses,
    })
}

/// Train the character language model on teacher-forced chunks
/// of `train_text`, scoring `dev_text` after every epoch.
pub fn train_language_model<B: AutodiffBackend>(
    model_cfg:  &RnnLanguageModelConfig,
    options:    &TrainingOptions,
    chunk_len:  usize,
    train_text: &str,
    dev_text:   &str,
    vocab:      &Vocabulary,
    device:     &B::Device,
) -> Result<LmRun<B::InnerBackend>, ModelError> {
    if options.batch_size == 0 {
        return Err(ModelError::EmptyBatch { batch_size: 0 });
    }
    check_vocab_size(model_cfg.encoder.vocab_size, vocab)?;
    vocab.index_of(START_SYMBOL)?;
    vocab.encode(dev_text)?;

    let examples  = CharChunker::new(chunk_len, START_SYMBOL)?.examples(train_text);
    if examples.is_empty() {
        return Err(ModelError::DataShape("no training text".to_string()));
    }
    let train_set = LmDataset::encode(&examples, vocab)?;
    let ranges  = batch_ranges(train_set.len(), options.batch_size)?;
    let context = START_SYMBOL.to_string();

    B::seed(options.seed);
    let mut rng = StdRng::seed_from_u64(options.seed);

    let mut model: CharLanguageModel<B> = model_cfg.init(device);
    let mut optim   = AdamConfig::new().init::<B, CharLanguageModel<B>>();
    let batcher     = LmBatcher::<B>::new(device.clone());
    let mut metrics = Vec::with_capacity(options.epochs);
    let mut losses  = Vec::with_capacity(options.epochs);
    let expected    = num_batches(train_set.len(), options.batch_size);

    tracing::info!(
        "Training language model: {} chunks of up to {} characters, {} batches per epoch",
        train_set.len(),
        chunk_len,
        ranges.len()
    );

    for epoch in 1..=options.epochs {
        let order = shuffled_order(train_set.len(), &mut rng);
        let (updated, batch_losses) = train_epoch(
            model,
            &mut optim,
            &train_set,
            &order,
            &ranges,
            options.learning_rate,
            |m: &CharLanguageModel<B>, items| m.forward_loss(&batcher, items),
        )?;
        model = updated;

        let dev_eval = if dev_text.is_empty() {
            None
        } else {
            let frozen = RnnLanguageModel::new(model.valid(), vocab.clone());
            Some(evaluate_text(&frozen, dev_text, &context)?)
        };

        let record = LmEpochMetrics {
            epoch,
            train_loss:     epoch_loss(&batch_losses, expected)?,
            num_batches:    expected,
            dev_log_prob:   dev_eval.map(|e| e.log_prob),
            dev_perplexity: dev_eval.map(|e| e.perplexity),
        };

        tracing::info!(
            "Epoch {:>3}/{} | train_loss={:.4} | dev_perplexity={}",
            epoch,
            options.epochs,
            record.train_loss,
            record.dev_perplexity.map(|p| format!("{p:.3}")).unwrap_or_else(|| "-".to_string()),
        );
        metrics.push(record);
        losses.push(batch_losses);
    }

    Ok(LmRun {
        language_model: RnnLanguageModel::new(model.valid(), vocab.clone()),
        metrics,
        batch_losses:   losses,
    })
}
