use std::fs;
use std::path::Path;
use std::time::Duration;

use sortd::config::{Config, Timing};
use sortd::{move_file, MoveOutcome, SkipReason};
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

/// Happy path: a JPG lands in Images under its original name with identical bytes.
#[test]
fn moves_image_into_images_category() {
    let source = tempdir().unwrap();
    let target = tempdir().unwrap();
    let cfg = fast_cfg(source.path(), target.path());

    let src = source.path().join("photo.JPG");
    fs::write(&src, b"jpeg bytes").unwrap();

    let outcome = move_file(&cfg, &src).expect("move should succeed");
    let dest = target.path().join("Images").join("photo.JPG");
    assert_eq!(
        outcome,
        MoveOutcome::Moved {
            dest: dest.clone(),
            category: "Images"
        }
    );
    assert!(!src.exists(), "source should be removed");
    assert_eq!(fs::read(&dest).unwrap(), b"jpeg bytes");
}

/// Unknown extensions land in Other.
#[test]
fn unknown_extension_goes_to_other() {
    let source = tempdir().unwrap();
    let target = tempdir().unwrap();
    let cfg = fast_cfg(source.path(), target.path());

    let src = source.path().join("archive.unknownext");
    fs::write(&src, b"???").unwrap();

    move_file(&cfg, &src).expect("move should succeed");
    assert!(target.path().join("Other").join("archive.unknownext").exists());
    assert!(!src.exists());
}

/// A second invocation on an already-moved path is a silent skip, not an error.
#[test]
fn second_move_of_same_path_is_idempotent() {
    let source = tempdir().unwrap();
    let target = tempdir().unwrap();
    let cfg = fast_cfg(source.path(), target.path());

    let src = source.path().join("notes.txt");
    fs::write(&src, b"notes").unwrap();

    move_file(&cfg, &src).expect("first move should succeed");
    let second = move_file(&cfg, &src).expect("second move must not error");
    assert_eq!(second, MoveOutcome::Skipped(SkipReason::Vanished));
    // Still exactly one copy at the destination.
    assert_eq!(
        fs::read(target.path().join("Documents").join("notes.txt")).unwrap(),
        b"notes"
    );
}

/// Directories and temporary artifacts are skipped without touching them.
#[test]
fn directories_and_artifacts_are_skipped() {
    let source = tempdir().unwrap();
    let target = tempdir().unwrap();
    let cfg = fast_cfg(source.path(), target.path());

    let subdir = source.path().join("keep_me");
    fs::create_dir(&subdir).unwrap();
    let partial = source.path().join("movie.mkv.crdownload");
    fs::write(&partial, b"half").unwrap();
    let lock = source.path().join("~$budget.xlsx");
    fs::write(&lock, b"lock").unwrap();

    assert_eq!(
        move_file(&cfg, &subdir).unwrap(),
        MoveOutcome::Skipped(SkipReason::Directory)
    );
    assert_eq!(
        move_file(&cfg, &partial).unwrap(),
        MoveOutcome::Skipped(SkipReason::TemporaryArtifact)
    );
    assert_eq!(
        move_file(&cfg, &lock).unwrap(),
        MoveOutcome::Skipped(SkipReason::InProgressPrefix)
    );

    assert!(subdir.exists());
    assert!(partial.exists());
    assert!(lock.exists());
}

#[cfg(unix)]
#[test]
fn symlinks_are_skipped() {
    let source = tempdir().unwrap();
    let target = tempdir().unwrap();
    let cfg = fast_cfg(source.path(), target.path());

    let real = source.path().join("real.txt");
    fs::write(&real, b"real").unwrap();
    let link = source.path().join("link.pdf");
    std::os::unix::fs::symlink(&real, &link).unwrap();

    assert_eq!(
        move_file(&cfg, &link).unwrap(),
        MoveOutcome::Skipped(SkipReason::Symlink)
    );
    assert!(link.exists());
}
