// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `classify` and `lm`, and all
// their configurable flags. Each Args struct converts into the
// matching application config, so the application layer never
// sees clap types.

use clap::{Args, Subcommand, ValueEnum};

use crate::application::{
    classify_use_case::{ClassifierKind, ClassifyConfig},
    lm_use_case::{LmConfig, LmKind},
};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Predict whether a consonant or a vowel follows a context
    Classify(ClassifyArgs),

    /// Train and evaluate a character-level language model
    Lm(LmArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ClassifierChoice {
    /// Majority class of the context's last character
    Frequency,
    /// LSTM encoder + feed-forward head
    Rnn,
}

impl From<ClassifierChoice> for ClassifierKind {
    fn from(c: ClassifierChoice) -> Self {
        match c {
            ClassifierChoice::Frequency => ClassifierKind::Frequency,
            ClassifierChoice::Rnn       => ClassifierKind::Rnn,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum LmChoice {
    /// log(1/V) for every character
    Uniform,
    /// LSTM encoder + softmax head
    Rnn,
}

impl From<LmChoice> for LmKind {
    fn from(c: LmChoice) -> Self {
        match c {
            LmChoice::Uniform => LmKind::Uniform,
            LmChoice::Rnn     => LmKind::Rnn,
        }
    }
}

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    #[arg(long, value_enum, default_value_t = ClassifierChoice::Rnn)]
    pub model: ClassifierChoice,

    /// Training contexts followed by a consonant, one per line
    #[arg(long, default_value = "data/train-consonant-examples.txt")]
    pub train_cons: String,

    /// Training contexts followed by a vowel, one per line
    #[arg(long, default_value = "data/train-vowel-examples.txt")]
    pub train_vowel: String,

    #[arg(long, default_value = "data/dev-consonant-examples.txt")]
    pub dev_cons: String,

    #[arg(long, default_value = "data/dev-vowel-examples.txt")]
    pub dev_vowel: String,

    #[arg(long, default_value_t = 20)]
    pub epochs: usize,

    #[arg(long, default_value_t = 4)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 0.005)]
    pub lr: f64,

    /// Seeds weight initialisation, dropout and shuffling
    #[arg(long, default_value_t = 10)]
    pub seed: u64,

    /// Character embedding dimension
    #[arg(long, default_value_t = 30)]
    pub d_emb: usize,

    /// LSTM hidden size
    #[arg(long, default_value_t = 32)]
    pub d_hidden: usize,

    /// Width of the hidden layer in the classification head
    #[arg(long, default_value_t = 16)]
    pub d_head: usize,

    #[arg(long, default_value_t = 0.5)]
    pub dropout: f64,

    /// Write metrics.csv and summary.json into this directory
    #[arg(long)]
    pub metrics_dir: Option<String>,
}

impl From<ClassifyArgs> for ClassifyConfig {
    fn from(a: ClassifyArgs) -> Self {
        ClassifyConfig {
            train_consonant: a.train_cons,
            train_vowel:     a.train_vowel,
            dev_consonant:   a.dev_cons,
            dev_vowel:       a.dev_vowel,
            model:           a.model.into(),
            epochs:          a.epochs,
            batch_size:      a.batch_size,
            lr:              a.lr,
            seed:            a.seed,
            d_emb:           a.d_emb,
            d_hidden:        a.d_hidden,
            d_head:          a.d_head,
            dropout:         a.dropout,
            metrics_dir:     a.metrics_dir,
        }
    }
}

#[derive(Args, Debug)]
pub struct LmArgs {
    #[arg(long, value_enum, default_value_t = LmChoice::Rnn)]
    pub model: LmChoice,

    #[arg(long, default_value = "data/text8-100k.txt")]
    pub train_path: String,

    #[arg(long, default_value = "data/text8-dev.txt")]
    pub dev_path: String,

    #[arg(long, default_value_t = 5)]
    pub epochs: usize,

    #[arg(long, default_value_t = 16)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 0.005)]
    pub lr: f64,

    #[arg(long, default_value_t = 10)]
    pub seed: u64,

    /// Characters per teacher-forced training chunk
    #[arg(long, default_value_t = 20)]
    pub chunk_len: usize,

    #[arg(long, default_value_t = 30)]
    pub d_emb: usize,

    #[arg(long, default_value_t = 64)]
    pub d_hidden: usize,

    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,

    #[arg(long)]
    pub metrics_dir: Option<String>,
}

impl From<LmArgs> for LmConfig {
    fn from(a: LmArgs) -> Self {
        LmConfig {
            train_path:  a.train_path,
            dev_path:    a.dev_path,
            model:       a.model.into(),
            epochs:      a.epochs,
            batch_size:  a.batch_size,
            lr:          a.lr,
            seed:        a.seed,
            chunk_len:   a.chunk_len,
            d_emb:       a.d_emb,
            d_hidden:    a.d_hidden,
            dropout:     a.dropout,
            metrics_dir: a.metrics_dir,
        }
    }
}
