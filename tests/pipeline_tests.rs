use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use intel_fusion::cli::commands::{run, EXIT_INVALID, EXIT_OK};
use intel_fusion::cli::flags::{Cli, Command};
use intel_fusion::config::FusionConfig;
use intel_fusion::core::types::Feed;
use intel_fusion::pipeline::correlator::Correlator;
use intel_fusion::pipeline::scorer::Scorer;
use intel_fusion::pipeline::validator::FeedValidator;

fn cli(command: Command) -> Cli {
    Cli {
        command,
        config: None,
        verbose: 0,
    }
}

fn write_temp_feed(name: &str, feed: &Value) -> PathBuf {
    let dir = std::env::temp_dir().join("intel_fusion_tests");
    let _ = fs::create_dir_all(&dir);
    let path = dir.join(name);
    fs::write(&path, serde_json::to_vec_pretty(feed).unwrap()).unwrap();
    path
}

#[test]
fn fixture_feed_flows_through_the_whole_pipeline() {
    let bytes = fs::read(Path::new("fixtures/feed-basic.json")).unwrap();
    let raw: Value = serde_json::from_slice(&bytes).unwrap();

    let verdict = FeedValidator::default().validate(&raw);
    assert!(verdict.valid, "fixture invalid: {:?}", verdict.errors);

    let feed: Feed = serde_json::from_value(raw).unwrap();
    assert_eq!(feed.iocs.len(), 3);
    // Unrecognized fields survive decoding.
    assert!(feed.iocs[2].extra.contains_key("campaign"));

    let mut correlator = Correlator::new();
    for ioc in &feed.iocs {
        correlator.index_ioc(ioc.clone());
    }
    let records = correlator.correlate_feed(&feed.iocs);
    assert_eq!(records.len(), 3);

    // The duplicated ip correlates across misp and otx.
    assert_eq!(records[0].correlation_count, 2);
    assert_eq!(records[0].sources.len(), 2);
    assert_eq!(records[1].correlation_count, 2);
    assert_eq!(records[2].correlation_count, 1);

    let scorer = Scorer::default();
    for record in &records {
        assert!(record.advisory);
        let score = scorer.score_correlation(record);
        assert!((0.0..=1.0).contains(&score));
        let ioc_score = scorer.score_ioc(&record.ioc);
        assert!((0.0..=1.0).contains(&ioc_score));
    }
}

#[test]
fn validate_feed_command_accepts_the_fixture() {
    let code = run(cli(Command::ValidateFeed {
        path: PathBuf::from("fixtures/feed-basic.json"),
    }))
    .unwrap();
    assert_eq!(code, EXIT_OK);
}

#[test]
fn correlate_and_score_commands_accept_the_fixture() {
    for command in [
        Command::Correlate {
            path: PathBuf::from("fixtures/feed-basic.json"),
        },
        Command::Score {
            path: PathBuf::from("fixtures/feed-basic.json"),
        },
    ] {
        assert_eq!(run(cli(command)).unwrap(), EXIT_OK);
    }
}

#[test]
fn invalid_feed_maps_to_exit_one() {
    let path = write_temp_feed(
        "missing-signature.json",
        &json!({
            "feed_id": "feed-x",
            "timestamp": "2025-01-01T00:00:00Z",
            "iocs": []
        }),
    );
    let code = run(cli(Command::ValidateFeed { path: path.clone() })).unwrap();
    assert_eq!(code, EXIT_INVALID);

    let code = run(cli(Command::Correlate { path })).unwrap();
    assert_eq!(code, EXIT_INVALID);
}

#[test]
fn unreadable_or_malformed_input_is_a_hard_error() {
    let missing = cli(Command::ValidateFeed {
        path: PathBuf::from("fixtures/no-such-feed.json"),
    });
    assert!(run(missing).is_err());

    let dir = std::env::temp_dir().join("intel_fusion_tests");
    let _ = fs::create_dir_all(&dir);
    let garbled = dir.join("garbled.json");
    fs::write(&garbled, b"{not json").unwrap();
    assert!(run(cli(Command::Score { path: garbled })).is_err());
}

#[test]
fn config_file_limits_apply_to_validation() {
    let dir = std::env::temp_dir().join("intel_fusion_tests");
    let _ = fs::create_dir_all(&dir);
    let config_path = dir.join("strict.toml");
    fs::write(&config_path, "[limits]\nmax_feed_iocs = 1\n").unwrap();

    let feed_path = write_temp_feed(
        "two-iocs.json",
        &json!({
            "feed_id": "feed-x",
            "timestamp": "2025-01-01T00:00:00Z",
            "iocs": [
                {"type": "ip", "value": "192.0.2.1", "confidence": 0.5},
                {"type": "ip", "value": "192.0.2.2", "confidence": 0.5}
            ],
            "signature": {}
        }),
    );

    let strict = Cli {
        command: Command::ValidateFeed {
            path: feed_path.clone(),
        },
        config: Some(config_path),
        verbose: 0,
    };
    assert_eq!(run(strict).unwrap(), EXIT_INVALID);
    assert_eq!(
        run(cli(Command::ValidateFeed { path: feed_path })).unwrap(),
        EXIT_OK
    );
}

#[test]
fn default_config_is_usable_without_a_file() {
    let cfg = FusionConfig::default();
    assert_eq!(cfg.validation_limits().max_feed_iocs, 10_000);
}
