//! Command line argument parsing for the review-sentinel CLI using clap.

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// review-sentinel - classify product reviews as genuine or generated
#[derive(Parser, Debug, Clone)]
#[command(name = "review-sentinel")]
#[command(about = "Detect fake product reviews with a TF-IDF logistic regression model")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct SentinelArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE", env = "SENTINEL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl SentinelArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP inference service
    Serve(ServeArgs),

    /// Train a model from a labelled CSV dataset
    Train(TrainArgs),

    /// Classify one review locally
    Predict(PredictArgs),

    /// Show what the normalizer makes of a review
    Normalize(NormalizeArgs),

    /// Show how the tokenizer lexicon is acquired
    Resources,
}

impl Command {
    /// Subcommand name as typed on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Serve(_) => "serve",
            Command::Train(_) => "train",
            Command::Predict(_) => "predict",
            Command::Normalize(_) => "normalize",
            Command::Resources => "resources",
        }
    }
}

/// Arguments for serving
#[derive(Parser, Debug, Clone)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Directory holding the model artifacts
    #[arg(short, long, value_name = "DIR")]
    pub model_dir: Option<PathBuf>,

    /// Expose /debug/resources
    #[arg(long)]
    pub debug_endpoints: bool,
}

/// Arguments for training
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// Labelled CSV dataset
    #[arg(short, long, value_name = "CSV")]
    pub data: PathBuf,

    /// Directory to write the model artifacts to
    #[arg(short, long, value_name = "DIR")]
    pub model_dir: Option<PathBuf>,

    /// Override the random seed of the train/test split
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for local prediction
#[derive(Parser, Debug, Clone)]
pub struct PredictArgs {
    /// Review text
    #[arg(value_name = "TEXT")]
    pub text: String,

    /// Directory holding the model artifacts
    #[arg(short, long, value_name = "DIR")]
    pub model_dir: Option<PathBuf>,
}

/// Arguments for normalization
#[derive(Parser, Debug, Clone)]
pub struct NormalizeArgs {
    /// Review text
    #[arg(value_name = "TEXT")]
    pub text: String,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_parsing() {
        let args = SentinelArgs::try_parse_from([
            "review-sentinel",
            "serve",
            "--bind",
            "127.0.0.1:8080",
            "--model-dir",
            "/tmp/model",
        ])
        .unwrap();

        match args.command {
            Command::Serve(serve) => {
                assert_eq!(serve.bind.as_deref(), Some("127.0.0.1:8080"));
                assert_eq!(serve.model_dir, Some(PathBuf::from("/tmp/model")));
                assert!(!serve.debug_endpoints);
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_train_parsing() {
        let args = SentinelArgs::try_parse_from([
            "review-sentinel",
            "-c",
            "sentinel.toml",
            "train",
            "--data",
            "reviews.csv",
            "--seed",
            "7",
        ])
        .unwrap();

        assert_eq!(args.config, Some(PathBuf::from("sentinel.toml")));
        match args.command {
            Command::Train(train) => {
                assert_eq!(train.data, PathBuf::from("reviews.csv"));
                assert_eq!(train.seed, Some(7));
                assert_eq!(train.model_dir, None);
            }
            _ => panic!("Expected Train command"),
        }
    }

    #[test]
    fn test_command_names() {
        let args = SentinelArgs::try_parse_from(["review-sentinel", "resources"]).unwrap();
        assert_eq!(args.command.name(), "resources");

        let args =
            SentinelArgs::try_parse_from(["review-sentinel", "normalize", "nice lamp"]).unwrap();
        assert_eq!(args.command.name(), "normalize");
    }

    #[test]
    fn test_train_requires_data() {
        assert!(SentinelArgs::try_parse_from(["review-sentinel", "train"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = SentinelArgs::try_parse_from([
            "review-sentinel",
            "predict",
            "great blender",
            "-f",
            "json",
            "-vv",
        ])
        .unwrap();

        assert_eq!(args.output_format, OutputFormat::Json);
        assert_eq!(args.verbosity(), 2);
        match args.command {
            Command::Predict(predict) => assert_eq!(predict.text, "great blender"),
            _ => panic!("Expected Predict command"),
        }
    }

    #[test]
    fn test_verbosity_levels() {
        let args = SentinelArgs::try_parse_from(["review-sentinel", "resources"]).unwrap();
        assert_eq!(args.verbosity(), 1);

        let args = SentinelArgs::try_parse_from(["review-sentinel", "-q", "-vvv", "resources"]).unwrap();
        assert_eq!(args.verbosity(), 0);
    }
}
