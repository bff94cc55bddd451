use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use serial_test::serial;
use sortd::config::{Config, Timing};
use sortd::{RunState, SorterControl, SorterService};
use tempfile::tempdir;

fn fast_cfg(source: &Path, target: &Path) -> Config {
    let mut cfg = Config::new(source, target);
    cfg.log_file = None;
    cfg.timing = Timing {
        settle: Duration::from_millis(10),
        event_settle: Duration::from_millis(30),
        retry_delay: Duration::from_millis(20),
        max_attempts: 3,
        sweep_interval: Duration::from_millis(100),
    };
    cfg
}

fn wait_for(what: &str, timeout: Duration, mut cond: impl FnMut() -> bool) {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    panic!("timed out waiting for {what}");
}

/// End to end: files dropped into the watched directory end up sorted under
/// the target, leaving the source empty.
#[test]
#[serial]
fn sorts_arriving_files_into_categories() {
    let source = tempdir().unwrap();
    let target = tempdir().unwrap();
    let mut svc = SorterService::new(fast_cfg(source.path(), target.path()));

    svc.start().unwrap();
    assert_eq!(svc.status(), RunState::Running);

    fs::write(source.path().join("photo.JPG"), b"jpeg bytes").unwrap();
    fs::write(source.path().join("archive.unknownext"), b"???").unwrap();

    let images = target.path().join("Images").join("photo.JPG");
    let other = target.path().join("Other").join("archive.unknownext");
    wait_for("both files to be sorted", Duration::from_secs(10), || {
        images.exists() && other.exists()
    });

    assert_eq!(fs::read(&images).unwrap(), b"jpeg bytes");
    wait_for("source to drain", Duration::from_secs(5), || {
        fs::read_dir(source.path()).unwrap().next().is_none()
    });

    svc.stop();
    assert_eq!(svc.status(), RunState::Stopped);
}

/// An in-progress download is left alone until the browser renames it to its
/// final name; only then is it sorted.
#[test]
#[serial]
fn partial_download_waits_for_rename() {
    let source = tempdir().unwrap();
    let target = tempdir().unwrap();
    let mut svc = SorterService::new(fast_cfg(source.path(), target.path()));
    svc.start().unwrap();

    let partial = source.path().join("report.pdf.crdownload");
    fs::write(&partial, b"half written").unwrap();

    // Several sweep intervals pass; the artifact must not move anywhere.
    std::thread::sleep(Duration::from_millis(400));
    assert!(partial.exists(), "partial download must stay put");
    assert!(!target.path().join("Documents").join("report.pdf").exists());
    assert!(
        !target
            .path()
            .join("Other")
            .join("report.pdf.crdownload")
            .exists()
    );

    fs::rename(&partial, source.path().join("report.pdf")).unwrap();
    let dest = target.path().join("Documents").join("report.pdf");
    wait_for("renamed download to be sorted", Duration::from_secs(10), || {
        dest.exists()
    });
    assert_eq!(fs::read(&dest).unwrap(), b"half written");

    svc.stop();
}

/// A move still retrying when the service stops keeps its claim until it
/// gives up; after the obstruction clears and the service restarts, the next
/// sweep moves the file exactly once.
#[test]
#[serial]
fn restart_moves_previously_stuck_file_exactly_once() {
    let source = tempdir().unwrap();
    let target = tempdir().unwrap();
    let mut cfg = fast_cfg(source.path(), target.path());
    // Slow the backoff down so the stop lands mid-retry.
    cfg.timing.retry_delay = Duration::from_millis(200);
    let mut svc = SorterService::new(cfg);

    // A file where the Documents directory should go blocks every attempt.
    let blocker = target.path().join("Documents");
    fs::write(&blocker, b"in the way").unwrap();

    svc.start().unwrap();
    let src = source.path().join("thesis.pdf");
    fs::write(&src, b"pdf bytes").unwrap();

    // Claims are keyed on the canonical source path the service watches.
    let claimed = fs::canonicalize(source.path()).unwrap().join("thesis.pdf");
    wait_for("the move to be claimed", Duration::from_secs(10), || {
        svc.pending().contains(&claimed)
    });

    svc.stop();
    // The detached mover keeps retrying through its backoff before giving up.
    wait_for("the retrying mover to give up", Duration::from_secs(10), || {
        svc.pending().is_empty()
    });
    assert!(src.exists(), "stuck file must remain in the source");

    fs::remove_file(&blocker).unwrap();
    svc.start().unwrap();

    let dest = target.path().join("Documents").join("thesis.pdf");
    wait_for("the stuck file to be sorted", Duration::from_secs(10), || {
        dest.exists()
    });
    assert_eq!(fs::read(&dest).unwrap(), b"pdf bytes");
    assert!(!src.exists(), "exactly one copy must remain");

    svc.stop();
}

/// Files that arrive while the service is stopped are picked up on restart
/// by the first reconciliation sweep.
#[test]
#[serial]
fn restart_picks_up_backlog() {
    let source = tempdir().unwrap();
    let target = tempdir().unwrap();
    let mut svc = SorterService::new(fast_cfg(source.path(), target.path()));

    svc.start().unwrap();
    svc.stop();

    let src = source.path().join("song.flac");
    fs::write(&src, b"flac").unwrap();
    std::thread::sleep(Duration::from_millis(300));
    assert!(src.exists(), "nothing should move while stopped");

    svc.start().unwrap();
    let dest = target.path().join("Audio").join("song.flac");
    wait_for("backlog file to be sorted", Duration::from_secs(10), || {
        dest.exists()
    });

    svc.stop();
}
