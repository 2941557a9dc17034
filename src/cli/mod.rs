// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap, hands a config to Layer 2 and
// prints the result. No training or scoring happens here.
//
//   char-rnn classify --model rnn --epochs 20
//   char-rnn lm --model uniform

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{ClassifyArgs, Commands, LmArgs};

#[derive(Parser, Debug)]
#[command(
    name = "char-rnn",
    version,
    about = "Character-level LSTM consonant/vowel classifier and language model."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Classify(args) => run_classify(args),
            Commands::Lm(args)       => run_lm(args),
        }
    }
}

fn run_classify(args: ClassifyArgs) -> Result<()> {
    use crate::application::classify_use_case::ClassifyUseCase;

    let outcome = ClassifyUseCase::new(args.into()).execute()?;

    println!("Model: {:?}", outcome.model);
    println!("Training accuracy: {:.3}", outcome.train_accuracy);
    println!("Dev accuracy:      {:.3}", outcome.dev_accuracy);
    Ok(())
}

fn run_lm(args: LmArgs) -> Result<()> {
    use crate::application::lm_use_case::LmUseCase;

    let outcome = LmUseCase::new(args.into()).execute()?;

    println!("Model: {:?}", outcome.model);
    println!("Dev log prob:       {:.4}", outcome.dev.log_prob);
    println!("Avg log prob:       {:.4}", outcome.dev.avg_log_prob);
    println!("Perplexity:         {:.4}", outcome.dev.perplexity);
    println!("Normalization sum:  {:.4}", outcome.normalization_sum);
    println!("Chain-rule gap:     {:.2e}", outcome.chain_rule_gap);
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{classify_use_case::ClassifyConfig, lm_use_case::LmKind};

    #[test]
    fn test_classify_defaults() {
        let cli = Cli::try_parse_from(["char-rnn", "classify"]).unwrap();
        let Commands::Classify(args) = cli.command else { panic!("expected classify") };
        let cfg: ClassifyConfig = args.into();
        assert_eq!(cfg.epochs, 20);
        assert_eq!(cfg.batch_size, 4);
        assert_eq!(cfg.seed, 10);
        assert!(cfg.metrics_dir.is_none());
    }

    #[test]
    fn test_lm_model_choice() {
        let cli = Cli::try_parse_from(["char-rnn", "lm", "--model", "uniform", "--chunk-len", "7"])
            .unwrap();
        let Commands::Lm(args) = cli.command else { panic!("expected lm") };
        let cfg: crate::application::lm_use_case::LmConfig = args.into();
        assert_eq!(cfg.model, LmKind::Uniform);
        assert_eq!(cfg.chunk_len, 7);
    }

    #[test]
    fn test_unknown_model_is_rejected() {
        assert!(Cli::try_parse_from(["char-rnn", "classify", "--model", "bert"]).is_err());
    }
}
