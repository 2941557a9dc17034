// ============================================================
// Layer 3 — Labels and Labelled Contexts
// ============================================================
// A context is the run of characters preceding a prediction
// point; the label says what kind of character follows it.

use serde::{Deserialize, Serialize};

/// What follows a context. The discriminants are the class ids
/// used by the classification head (consonant = 0, vowel = 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    ConsonantFollows = 0,
    VowelFollows     = 1,
}

impl Label {
    pub const ALL: [Label; 2] = [Label::ConsonantFollows, Label::VowelFollows];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Arg-max over the two class scores.
    ///
    /// Exactly equal scores resolve to the lowest class index,
    /// i.e. `ConsonantFollows`, so ties never depend on float noise.
    pub fn from_scores(scores: [f32; 2]) -> Self {
        if scores[Label::VowelFollows.index()] > scores[Label::ConsonantFollows.index()] {
            Label::VowelFollows
        } else {
            Label::ConsonantFollows
        }
    }
}

/// One training or evaluation example for the classification task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledExample {
    pub context: String,
    pub label:   Label,
}

impl LabeledExample {
    pub fn new(context: impl Into<String>, label: Label) -> Self {
        Self { context: context.into(), label }
    }

    /// Tag every consonant-corpus context with `ConsonantFollows`
    /// and every vowel-corpus context with `VowelFollows`, keeping
    /// consonant examples first.
    pub fn from_corpora(consonant: &[String], vowel: &[String]) -> Vec<Self> {
        consonant
            .iter()
            .map(|c| Self::new(c.clone(), Label::ConsonantFollows))
            .chain(vowel.iter().map(|c| Self::new(c.clone(), Label::VowelFollows)))
            .collect()
    }
}
