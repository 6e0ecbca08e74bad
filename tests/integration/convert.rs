//! Integration tests for batch conversion against a stand-in converter.

#![cfg(unix)]

use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

use slidecat::batch::NoProgress;
use slidecat::config::ConverterCommand;
use slidecat::convert::Converter;
use slidecat::error::{ItemError, ItemErrorKind, SlideCatError, ToolFailure};

use crate::common::{CountingObserver, fake_converter, write_file};

fn converter_in(dir: &TempDir, timeout: Duration) -> Converter {
    Converter::new(ConverterCommand::new(fake_converter(dir.path())), timeout)
}

#[tokio::test]
async fn test_one_failure_does_not_stop_the_batch() {
    let dir = TempDir::new().unwrap();
    let inputs = vec![
        write_file(dir.path(), "a.pptx", b"deck"),
        write_file(dir.path(), "bad.pptx", b"deck"),
        write_file(dir.path(), "c.odp", b"deck"),
    ];
    let outdir = dir.path().join("converted_pdfs");
    let mut observer = CountingObserver::default();

    let report = converter_in(&dir, Duration::from_secs(30))
        .convert(&inputs, &outdir, &mut observer)
        .await
        .unwrap();

    assert_eq!(
        report.successes,
        vec![outdir.join("a.pdf"), outdir.join("c.pdf")]
    );
    assert_eq!(report.failures.len(), 1);
    match &report.failures[0] {
        ItemError::ExternalTool {
            path,
            failure: ToolFailure::ExitCode { code, stderr },
        } => {
            assert_eq!(path, &inputs[1]);
            assert_eq!(*code, Some(3));
            assert!(stderr.contains("crashed"));
        }
        other => panic!("unexpected failure: {other:?}"),
    }

    assert_eq!(observer.started, vec!["a.pptx", "bad.pptx", "c.odp"]);
    assert_eq!(observer.failed, 1);
    assert_eq!(observer.summaries.len(), 1);
    assert_eq!(observer.summaries[0].succeeded, 2);
}

#[tokio::test]
async fn test_every_success_exists_on_disk() {
    let dir = TempDir::new().unwrap();
    let inputs = vec![
        write_file(dir.path(), "one.pptx", b"deck"),
        write_file(dir.path(), "two.ppt", b"deck"),
    ];
    let outdir = dir.path().join("out");

    let report = converter_in(&dir, Duration::from_secs(30))
        .convert(&inputs, &outdir, &mut NoProgress)
        .await
        .unwrap();

    assert!(report.is_clean());
    for pdf in &report.successes {
        assert!(pdf.is_file(), "{} missing", pdf.display());
        assert_eq!(pdf.parent(), Some(outdir.as_path()));
    }
}

#[tokio::test]
async fn test_outdir_is_created_and_reusable() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "deck.pptx", b"deck");
    let outdir = dir.path().join("deep").join("nested").join("pdfs");
    let converter = converter_in(&dir, Duration::from_secs(30));

    for _ in 0..2 {
        let report = converter
            .convert(std::slice::from_ref(&input), &outdir, &mut NoProgress)
            .await
            .unwrap();
        assert_eq!(report.successes, vec![outdir.join("deck.pdf")]);
    }
}

#[tokio::test]
async fn test_uncreatable_outdir_is_fatal() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "deck.pptx", b"deck");
    let blocker = write_file(dir.path(), "taken", b"not a directory");

    let err = converter_in(&dir, Duration::from_secs(30))
        .convert(&[input], &blocker.join("pdfs"), &mut NoProgress)
        .await
        .unwrap_err();

    assert!(matches!(err, SlideCatError::FailedToCreateDirectory { .. }));
}

#[tokio::test]
async fn test_slow_conversion_times_out() {
    let dir = TempDir::new().unwrap();
    let inputs = vec![
        write_file(dir.path(), "slow.pptx", b"deck"),
        write_file(dir.path(), "quick.pptx", b"deck"),
    ];
    let outdir = dir.path().join("out");

    let report = converter_in(&dir, Duration::from_secs(1))
        .convert(&inputs, &outdir, &mut NoProgress)
        .await
        .unwrap();

    assert_eq!(report.successes, vec![outdir.join("quick.pdf")]);
    assert!(matches!(
        &report.failures[0],
        ItemError::Timeout { seconds: 1, .. }
    ));
}

#[tokio::test]
async fn test_error_text_on_stderr_fails_the_item() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "noisy.pptx", b"deck");

    let err = converter_in(&dir, Duration::from_secs(30))
        .convert_one(&input, dir.path())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ItemError::ExternalTool {
            failure: ToolFailure::ReportedError { .. },
            ..
        }
    ));
}

#[tokio::test]
async fn test_clean_exit_without_output_fails_the_item() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "ghost.pptx", b"deck");

    let err = converter_in(&dir, Duration::from_secs(30))
        .convert_one(&input, dir.path())
        .await
        .unwrap_err();

    match err {
        ItemError::ExternalTool {
            failure: ToolFailure::MissingOutput { expected },
            ..
        } => assert!(expected.ends_with("ghost.pdf")),
        other => panic!("unexpected failure: {other:?}"),
    }
}

#[tokio::test]
async fn test_vanished_converter_is_isolated_per_item() {
    let dir = TempDir::new().unwrap();
    let script = fake_converter(dir.path());
    fs::remove_file(&script).unwrap();
    let inputs: Vec<PathBuf> = ["a.pptx", "b.pptx"]
        .iter()
        .map(|name| write_file(dir.path(), name, b"deck"))
        .collect();

    let report = Converter::new(ConverterCommand::new(script), Duration::from_secs(5))
        .convert(&inputs, &dir.path().join("out"), &mut NoProgress)
        .await
        .unwrap();

    assert!(report.successes.is_empty());
    assert_eq!(report.failures.len(), 2);
    assert!(
        report
            .failures
            .iter()
            .all(|f| matches!(f, ItemError::CommandVanished { .. }) && f.is_severe())
    );
}

#[tokio::test]
async fn test_unrunnable_converter_is_unexpected_per_item() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let script = write_file(dir.path(), "soffice", b"#!/bin/sh\nexit 0\n");
    fs::set_permissions(&script, fs::Permissions::from_mode(0o644)).unwrap();
    let inputs: Vec<PathBuf> = ["a.pptx", "b.pptx"]
        .iter()
        .map(|name| write_file(dir.path(), name, b"deck"))
        .collect();
    let mut observer = CountingObserver::default();

    let report = Converter::new(ConverterCommand::new(script), Duration::from_secs(5))
        .convert(&inputs, &dir.path().join("out"), &mut observer)
        .await
        .unwrap();

    assert_eq!(observer.started, vec!["a.pptx", "b.pptx"]);
    assert!(report.successes.is_empty());
    assert_eq!(report.failures.len(), 2);
    for (failure, input) in report.failures.iter().zip(&inputs) {
        assert_eq!(failure.kind(), ItemErrorKind::UnexpectedError);
        assert_eq!(failure.path(), input.as_path());
        assert!(!failure.is_severe());
        match failure {
            ItemError::Unexpected { category, .. } => assert_eq!(category, "PermissionDenied"),
            other => panic!("unexpected failure: {other:?}"),
        }
    }
}
