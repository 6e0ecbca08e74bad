//! Integration tests for merging real (synthesised) PDFs.

use std::fs;
use tempfile::TempDir;

use slidecat::batch::NoProgress;
use slidecat::error::{ItemError, ItemErrorKind, SlideCatError};
use slidecat::io::{PdfWriter, WriteOptions};
use slidecat::merge::Merger;

use crate::common::{CountingObserver, page_texts, write_encrypted_pdf, write_file, write_pdf};

#[tokio::test]
async fn test_merge_keeps_caller_order() {
    let dir = TempDir::new().unwrap();
    let a = write_pdf(dir.path(), "doc_a.pdf", "Document A", 1);
    let c = write_pdf(dir.path(), "doc_c_multipage.pdf", "Document C", 2);
    let output = dir.path().join("merged.pdf");

    let outcome = Merger::new()
        .merge(&[c.clone(), a.clone()], &output, &mut NoProgress)
        .await;

    assert!(outcome.success);
    assert_eq!(outcome.pages_added, 3);
    assert_eq!(outcome.files_merged(), 2);
    assert_eq!(outcome.merged[0].path, c);
    assert_eq!(outcome.merged[1].path, a);

    let texts = page_texts(&output);
    assert_eq!(texts.len(), 3);
    assert!(texts[0].contains("Document C - Page 1"));
    assert!(texts[1].contains("Document C - Page 2"));
    assert!(texts[2].contains("Document A - Page 1"));
}

#[tokio::test]
async fn test_unreadable_files_are_skipped() {
    let dir = TempDir::new().unwrap();
    let a = write_pdf(dir.path(), "a.pdf", "Alpha", 2);
    let corrupt = write_file(dir.path(), "corrupt.pdf", b"this is not a pdf at all");
    let missing = dir.path().join("missing.pdf");
    let b = write_pdf(dir.path(), "b.pdf", "Beta", 1);
    let output = dir.path().join("merged.pdf");
    let mut observer = CountingObserver::default();

    let outcome = Merger::new()
        .merge(
            &[a, corrupt.clone(), missing.clone(), b],
            &output,
            &mut observer,
        )
        .await;

    assert!(outcome.success);
    assert_eq!(outcome.pages_added, 3);
    assert_eq!(outcome.skipped_count(), 2);
    assert_eq!(outcome.skipped[0].path(), corrupt.as_path());
    assert_eq!(outcome.skipped[0].kind(), ItemErrorKind::ReadError);
    assert!(matches!(&outcome.skipped[1], ItemError::NotFound { path } if *path == missing));

    assert_eq!(observer.started.len(), 4);
    assert_eq!(observer.failed, 2);

    let texts = page_texts(&output);
    assert!(texts[0].contains("Alpha - Page 1"));
    assert!(texts[2].contains("Beta - Page 1"));
}

#[tokio::test]
async fn test_restricted_pdf_is_merged_and_locked_pdf_skipped() {
    let dir = TempDir::new().unwrap();
    let plain = write_pdf(dir.path(), "plain.pdf", "Plain", 1);
    let restricted =
        write_encrypted_pdf(dir.path(), "restricted.pdf", "Restricted", "owner-secret", "");
    let locked = write_encrypted_pdf(
        dir.path(),
        "locked.pdf",
        "Locked",
        "owner-secret",
        "user-secret",
    );
    let output = dir.path().join("merged.pdf");

    let outcome = Merger::new()
        .merge(
            &[restricted.clone(), locked.clone(), plain],
            &output,
            &mut NoProgress,
        )
        .await;

    assert!(outcome.success);
    assert_eq!(outcome.pages_added, 2);
    assert_eq!(outcome.merged[0].path, restricted);
    assert_eq!(outcome.skipped_count(), 1);
    assert_eq!(outcome.skipped[0].path(), locked.as_path());
    assert_eq!(outcome.skipped[0].kind(), ItemErrorKind::ReadError);

    let texts = page_texts(&output);
    assert_eq!(texts.len(), 2);
    assert!(texts[0].contains("Restricted - Page 1"));
    assert!(texts[1].contains("Plain - Page 1"));
}

#[tokio::test]
async fn test_nothing_readable_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let bad = write_file(dir.path(), "bad.pdf", b"%PDF-1.4 truncated");
    let output = dir.path().join("merged.pdf");

    let outcome = Merger::new()
        .merge(std::slice::from_ref(&bad), &output, &mut NoProgress)
        .await;

    assert!(!outcome.success);
    assert_eq!(outcome.pages_added, 0);
    assert_eq!(outcome.skipped_count(), 1);
    assert!(!output.exists());

    let err = outcome.into_result().unwrap_err();
    assert!(matches!(err, SlideCatError::NoPagesMerged { skipped: 1 }));
    assert_eq!(err.exit_code(), 1);
}

#[tokio::test]
async fn test_empty_input_list() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("merged.pdf");

    let outcome = Merger::new().merge(&[], &output, &mut NoProgress).await;

    assert!(!outcome.success);
    assert_eq!(outcome.pages_added, 0);
    assert!(outcome.skipped.is_empty());
    assert!(!output.exists());
}

#[tokio::test]
async fn test_output_parent_directories_are_created() {
    let dir = TempDir::new().unwrap();
    let a = write_pdf(dir.path(), "a.pdf", "Alpha", 1);
    let output = dir.path().join("reports").join("2026").join("all.pdf");

    let outcome = Merger::new().merge(&[a], &output, &mut NoProgress).await;

    assert!(outcome.success);
    assert!(output.is_file());
    assert_eq!(page_texts(&output).len(), 1);
}

#[tokio::test]
async fn test_write_failure_reports_whole_merge_failure() {
    let dir = TempDir::new().unwrap();
    let a = write_pdf(dir.path(), "a.pdf", "Alpha", 2);
    let output = dir.path().join("occupied.pdf");
    fs::create_dir(&output).unwrap();
    fs::write(output.join("keep.txt"), b"x").unwrap();

    let outcome = Merger::new().merge(&[a], &output, &mut NoProgress).await;

    assert!(!outcome.success);
    assert_eq!(outcome.pages_added, 0);
    assert!(outcome.failure.is_some());
    assert!(output.is_dir());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);

    let err = outcome.into_result().unwrap_err();
    assert!(matches!(err, SlideCatError::MergeFailed { .. }));
}

#[tokio::test]
async fn test_existing_output_is_replaced() {
    let dir = TempDir::new().unwrap();
    let a = write_pdf(dir.path(), "a.pdf", "Alpha", 1);
    let b = write_pdf(dir.path(), "b.pdf", "Beta", 2);
    let output = dir.path().join("merged.pdf");

    let merger = Merger::new();
    assert!(merger.merge(&[a], &output, &mut NoProgress).await.success);
    assert!(merger.merge(&[b], &output, &mut NoProgress).await.success);

    let texts = page_texts(&output);
    assert_eq!(texts.len(), 2);
    assert!(texts[0].contains("Beta - Page 1"));
}

#[tokio::test]
async fn test_uncompressed_writer() {
    let dir = TempDir::new().unwrap();
    let a = write_pdf(dir.path(), "a.pdf", "Alpha", 1);
    let b = write_pdf(dir.path(), "b.pdf", "Beta", 1);
    let output = dir.path().join("plain.pdf");

    let writer = PdfWriter::with_options(WriteOptions {
        compress: false,
        ..WriteOptions::default()
    });
    let outcome = Merger::with_writer(writer)
        .merge(&[a, b], &output, &mut NoProgress)
        .await;

    assert!(outcome.success);
    let raw = fs::read(&output).unwrap();
    assert!(
        raw.windows(b"Beta - Page 1".len())
            .any(|w| w == b"Beta - Page 1")
    );
}
