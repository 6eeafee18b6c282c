use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{json, Value};

use crate::cli::flags::{Cli, Command};
use crate::config::{load_config, FusionConfig};
use crate::core::hash::feed_digest;
use crate::core::types::Feed;
use crate::pipeline::correlator::Correlator;
use crate::pipeline::scorer::Scorer;
use crate::pipeline::validator::{FeedValidator, FeedVerdict};

pub const EXIT_OK: i32 = 0;
pub const EXIT_INVALID: i32 = 1;

pub fn run(cli: Cli) -> Result<i32> {
    let cfg = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::ValidateFeed { path } => run_validate(&cfg, &path),
        Command::Correlate { path } => run_correlate(&cfg, &path),
        Command::Score { path } => run_score(&cfg, &path),
    }
}

fn run_validate(cfg: &FusionConfig, path: &Path) -> Result<i32> {
    let (_, verdict) = validate_path(cfg, path)?;
    if verdict.valid {
        println!("OK");
        return Ok(EXIT_OK);
    }
    for error in &verdict.errors {
        println!("- {}", error);
    }
    Ok(EXIT_INVALID)
}

fn run_correlate(cfg: &FusionConfig, path: &Path) -> Result<i32> {
    let (raw, verdict) = validate_path(cfg, path)?;
    if !verdict.valid {
        report_invalid(&verdict);
        return Ok(EXIT_INVALID);
    }
    let feed = decode_feed(raw)?;

    // Fan the validated feed into a fresh index, then correlate each IOC so
    // intra-feed matches are visible in the records.
    let mut correlator = Correlator::new();
    for ioc in &feed.iocs {
        correlator.index_ioc(ioc.clone());
    }
    for record in correlator.correlate_feed(&feed.iocs) {
        println!("{}", serde_json::to_string(&record)?);
    }
    Ok(EXIT_OK)
}

fn run_score(cfg: &FusionConfig, path: &Path) -> Result<i32> {
    let (raw, verdict) = validate_path(cfg, path)?;
    if !verdict.valid {
        report_invalid(&verdict);
        return Ok(EXIT_INVALID);
    }
    let feed = decode_feed(raw)?;

    let scorer = Scorer::from_config(&cfg.scoring);
    for ioc in &feed.iocs {
        let line = json!({ "value": ioc.value, "score": scorer.score_ioc(ioc) });
        println!("{}", line);
    }
    Ok(EXIT_OK)
}

fn validate_path(cfg: &FusionConfig, path: &Path) -> Result<(Value, FeedVerdict)> {
    let bytes = fs::read(path).with_context(|| format!("reading feed {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        bytes = bytes.len(),
        digest = %feed_digest(&bytes),
        "feed loaded"
    );
    let raw: Value = serde_json::from_slice(&bytes)
        .with_context(|| format!("parsing feed {}", path.display()))?;

    let validator = FeedValidator::new(cfg.validation_limits());
    let verdict = validator.validate(&raw);
    tracing::info!(
        path = %path.display(),
        valid = verdict.valid,
        errors = verdict.errors.len(),
        "feed validated"
    );
    Ok((raw, verdict))
}

fn decode_feed(raw: Value) -> Result<Feed> {
    serde_json::from_value(raw).context("decoding validated feed")
}

fn report_invalid(verdict: &FeedVerdict) {
    for error in &verdict.errors {
        eprintln!("- {}", error);
    }
    tracing::warn!(errors = verdict.errors.len(), "feed rejected");
}
