use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::data::chunker::LmExample;
use crate::domain::{label::LabeledExample, vocab::Vocabulary};
use crate::error::ModelError;

/// One vocabulary-encoded classification example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationItem {
    pub ids:   Vec<usize>,
    pub label: usize,
}

pub struct ClassificationDataset {
    items: Vec<ClassificationItem>,
}

impl ClassificationDataset {
    /// Encode every example; the first empty context or unknown
    /// character aborts the whole dataset.
    pub fn encode(examples: &[LabeledExample], vocab: &Vocabulary) -> Result<Self, ModelError> {
        let items = examples
            .iter()
            .enumerate()
            .map(|(i, ex)| {
                if ex.context.is_empty() {
                    return Err(ModelError::DataShape(format!("example {i} has an empty context")));
                }
                Ok(ClassificationItem { ids: vocab.encode(&ex.context)?, label: ex.label.index() })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { items })
    }
}

impl Dataset<ClassificationItem> for ClassificationDataset {
    fn get(&self, index: usize) -> Option<ClassificationItem> {
        self.items.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

/// One teacher-forced language-model chunk: `target_ids[t]` follows `input_ids[..=t]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LmItem {
    pub input_ids:  Vec<usize>,
    pub target_ids: Vec<usize>,
}

pub struct LmDataset {
    items: Vec<LmItem>,
}

impl LmDataset {
    pub fn encode(examples: &[LmExample], vocab: &Vocabulary) -> Result<Self, ModelError> {
        let items = examples
            .iter()
            .enumerate()
            .map(|(i, ex)| {
                let input_ids  = vocab.encode(&ex.input)?;
                let target_ids = vocab.encode(&ex.target)?;
                if input_ids.is_empty() || input_ids.len() != target_ids.len() {
                    return Err(ModelError::DataShape(format!(
                        "chunk {i} has input length {} and target length {}",
                        input_ids.len(),
                        target_ids.len()
                    )));
                }
                Ok(LmItem { input_ids, target_ids })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { items })
    }
}

impl Dataset<LmItem> for LmDataset {
    fn get(&self, index: usize) -> Option<LmItem> {
        self.items.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}
