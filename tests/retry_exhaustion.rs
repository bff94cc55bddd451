use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use sortd::config::{Config, Timing};
use sortd::errors::SortdError;
use sortd::move_file;
use sortd::reconcile::sweep_once;
use tempfile::tempdir;

fn fast_cfg(source: &Path, target: &Path) -> Config {
    let mut cfg = Config::new(source, target);
    cfg.log_file = None;
    cfg.timing = Timing {
        settle: Duration::from_millis(5),
        event_settle: Duration::from_millis(10),
        retry_delay: Duration::from_millis(20),
        max_attempts: 3,
        sweep_interval: Duration::from_millis(100),
    };
    cfg
}

/// Block the Documents category by placing a plain file where the category
/// directory should go. Every attempt fails; the error is terminal for this
/// file and the source is left in place.
#[test]
fn exhausted_retries_leave_source_in_place() {
    let source = tempdir().unwrap();
    let target = tempdir().unwrap();
    let cfg = fast_cfg(source.path(), target.path());

    fs::write(target.path().join("Documents"), b"not a directory").unwrap();

    let src = source.path().join("thesis.pdf");
    fs::write(&src, b"pdf").unwrap();

    let started = Instant::now();
    let err = move_file(&cfg, &src).expect_err("blocked category dir must fail");
    match err {
        SortdError::RetriesExhausted {
            attempts,
            last_error,
            ..
        } => {
            assert_eq!(attempts, 3);
            assert!(!last_error.is_empty());
        }
        other => panic!("unexpected error: {other}"),
    }

    // 3 attempts with 2 backoffs of 20ms each; well under a second.
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(src.exists(), "failed file must stay in the source directory");
}

/// One stuck file does not poison the rest of a pass.
#[test]
fn sweep_counts_failures_and_keeps_going() {
    let source = tempdir().unwrap();
    let target = tempdir().unwrap();
    let cfg = fast_cfg(source.path(), target.path());

    fs::write(target.path().join("Documents"), b"not a directory").unwrap();
    fs::write(source.path().join("thesis.pdf"), b"pdf").unwrap();
    fs::write(source.path().join("track.mp3"), b"mp3").unwrap();

    let summary = sweep_once(&cfg);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.moved, 1);
    assert!(target.path().join("Audio").join("track.mp3").exists());
    assert!(source.path().join("thesis.pdf").exists());
}
