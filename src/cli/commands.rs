//! Command implementations for the review-sentinel CLI.

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::SentinelConfig;
use crate::error::{Result, SentinelError};
use crate::normalize::ReviewNormalizer;
use crate::resources::{LexiconResolver, inspect_search_paths};
use crate::service::{PredictOutcome, ServiceContext};

/// Execute a CLI command.
pub fn execute_command(args: SentinelArgs) -> Result<()> {
    let mut config = SentinelConfig::resolve(args.config.as_deref())?;
    apply_command_overrides(&mut config, &args.command);
    config.validate()?;

    crate::telemetry::init_tracing(args.verbosity(), config.server.log_json)?;

    match &args.command {
        Command::Serve(_) => serve(config),
        Command::Train(train_args) => train(train_args, &config, &args),
        Command::Predict(predict_args) => predict(predict_args, &config, &args),
        Command::Normalize(normalize_args) => normalize(normalize_args, &config, &args),
        Command::Resources => resources(&config, &args),
    }
}

/// Flags win over the config file and the environment.
fn apply_command_overrides(config: &mut SentinelConfig, command: &Command) {
    match command {
        Command::Serve(serve_args) => {
            if let Some(bind) = &serve_args.bind {
                config.server.bind = bind.clone();
            }
            if let Some(dir) = &serve_args.model_dir {
                config.model.dir = dir.clone();
            }
            if serve_args.debug_endpoints {
                config.server.enable_debug_endpoints = true;
            }
        }
        Command::Train(train_args) => {
            if let Some(dir) = &train_args.model_dir {
                config.model.dir = dir.clone();
            }
            if let Some(seed) = train_args.seed {
                config.training.seed = seed;
            }
        }
        Command::Predict(predict_args) => {
            if let Some(dir) = &predict_args.model_dir {
                config.model.dir = dir.clone();
            }
        }
        Command::Normalize(_) | Command::Resources => {}
    }
}

/// Run the HTTP service until a shutdown signal arrives.
fn serve(config: SentinelConfig) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(crate::server::serve(config))
}

/// Train and persist a model.
fn train(args: &TrainArgs, config: &SentinelConfig, cli_args: &SentinelArgs) -> Result<()> {
    if cli_args.verbosity() > 0 {
        println!("Training from: {}", args.data.display());
        println!("Writing model to: {}", config.model.dir.display());
    }

    let outcome = crate::training::train(config, &args.data)?;

    match cli_args.output_format {
        OutputFormat::Human => {
            if cli_args.verbosity() > 0 {
                println!();
                println!(
                    "Class distribution: {} genuine, {} fake",
                    outcome.distribution.0, outcome.distribution.1
                );
                println!(
                    "Features: {}, solver iterations: {}{}",
                    outcome.artifact.vectorizer().dimension(),
                    outcome.fit.iterations,
                    if outcome.fit.converged {
                        ""
                    } else {
                        " (not converged)"
                    }
                );
                println!();
            }
            print!("{}", outcome.report);
            Ok(())
        }
        OutputFormat::Json => output_result("Model trained", &outcome.summary(), cli_args),
    }
}

/// Classify one review without going through HTTP.
fn predict(args: &PredictArgs, config: &SentinelConfig, cli_args: &SentinelArgs) -> Result<()> {
    let context = ServiceContext::bootstrap(config)?;

    match context.predict(&args.text) {
        PredictOutcome::Classified(prediction) => output_result(
            "Review classified",
            &PredictionResult {
                input: args.text.clone(),
                prediction: prediction.label.as_str().to_string(),
                confidence: prediction.confidence,
                fake_probability: prediction.fake_probability,
                cleaned: prediction.cleaned.into_string(),
            },
            cli_args,
        ),
        PredictOutcome::Rejected(rejection) => output_result(
            "Review rejected",
            &RejectionResult {
                input: args.text.clone(),
                reason: rejection.kind(),
                error: rejection.message(),
            },
            cli_args,
        ),
        PredictOutcome::Failed(failure) => Err(SentinelError::other(failure.message)),
    }
}

/// Run the normalizer alone; no model is needed.
fn normalize(args: &NormalizeArgs, config: &SentinelConfig, cli_args: &SentinelArgs) -> Result<()> {
    let acquisition = LexiconResolver::from_config(&config.resources).acquire()?;
    let normalizer = ReviewNormalizer::new(&config.normalizer, &acquisition.lexicon)?;

    let (cleaned, rejection, tokens) = match normalizer.normalize(&args.text)? {
        Ok(cleaned) => {
            let tokens = cleaned.token_count();
            (Some(cleaned.into_string()), None, tokens)
        }
        Err(rejection) => (None, Some(rejection.message()), 0),
    };

    output_result(
        "Normalized review",
        &NormalizationResult {
            input: args.text.clone(),
            cleaned,
            rejection,
            tokens,
            tokenizer: normalizer.tokenizer_name().to_string(),
            lexicon_source: normalizer.lexicon_source().to_string(),
            fingerprint: format!("{:08x}", normalizer.fingerprint()),
        },
        cli_args,
    )
}

/// Report the search paths and every acquisition attempt.
fn resources(config: &SentinelConfig, cli_args: &SentinelArgs) -> Result<()> {
    let search_paths = inspect_search_paths(&config.resources.search_paths);
    let resolver = LexiconResolver::from_config(&config.resources);

    let result = match resolver.acquire() {
        Ok(acquisition) => ResourcesResult {
            search_paths,
            attempts: acquisition.attempts,
            lexicon_source: Some(acquisition.lexicon.source().to_string()),
            lexicon_words: acquisition.lexicon.len(),
        },
        Err(err) => {
            tracing::warn!(error = %err, "lexicon acquisition failed");
            ResourcesResult {
                search_paths,
                attempts: Vec::new(),
                lexicon_source: None,
                lexicon_words: 0,
            }
        }
    };

    output_result("Tokenizer resources", &result, cli_args)
}
