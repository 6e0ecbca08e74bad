//! Shared helpers for the integration tests.
//!
//! PDFs are synthesised with lopdf instead of being checked in: every page
//! carries a `"<label> - Page <n>"` marker so tests can check page order in
//! the merged output.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{Document, EncryptionState, EncryptionVersion, Object, Permissions, Stream, dictionary};
use std::fs;
use std::path::{Path, PathBuf};

use slidecat::batch::{BatchSummary, ItemStatus, ProgressObserver};

/// Build an in-memory PDF with `pages` text pages.
pub fn text_pdf(label: &str, pages: usize) -> Vec<u8> {
    let mut buf = Vec::new();
    text_document(label, pages).save_to(&mut buf).unwrap();
    buf
}

fn text_document(label: &str, pages: usize) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let kids: Vec<Object> = (1..=pages)
        .map(|n| {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 18.into()]),
                    Operation::new("Td", vec![100.into(), 600.into()]),
                    Operation::new(
                        "Tj",
                        vec![Object::string_literal(format!("{label} - Page {n}"))],
                    ),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// Write a text PDF into `dir` and return its path.
pub fn write_pdf(dir: &Path, name: &str, label: &str, pages: usize) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text_pdf(label, pages)).unwrap();
    path
}

/// Write a one-page text PDF encrypted with RC4-128 and print-only permissions.
///
/// An empty `user_password` gives a restricted file any reader can open.
pub fn write_encrypted_pdf(
    dir: &Path,
    name: &str,
    label: &str,
    owner_password: &str,
    user_password: &str,
) -> PathBuf {
    let mut doc = text_document(label, 1);
    let file_id = Object::string_literal(b"slidecat-test-id".to_vec());
    doc.trailer.set("ID", vec![file_id.clone(), file_id]);
    let state = EncryptionState::try_from(EncryptionVersion::V2 {
        document: &doc,
        owner_password,
        user_password,
        key_length: 128,
        permissions: Permissions::PRINTABLE,
    })
    .unwrap();
    doc.encrypt(&state).unwrap();

    let path = dir.join(name);
    doc.save(&path).unwrap();
    path
}

/// Write arbitrary bytes into `dir` and return the path.
pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

/// Decoded content of every page of the PDF at `path`, in page order.
pub fn page_texts(path: &Path) -> Vec<String> {
    let doc = Document::load_mem(&fs::read(path).unwrap()).unwrap();
    doc.get_pages()
        .values()
        .map(|id| String::from_utf8_lossy(&doc.get_page_content(*id).unwrap()).into_owned())
        .collect()
}

/// Install a stand-in for `soffice` into `dir`.
///
/// The script honours `--outdir` and writes `<outdir>/<stem>.pdf`, except
/// when the input name contains one of these markers:
/// - `bad`: exit status 3 with a message on stderr
/// - `slow`: sleep for ten seconds
/// - `noisy`: exit 0 but print an error on stderr
/// - `ghost`: exit 0 without writing anything
///
/// Produced files are copies of `template.pdf` next to the script when that
/// exists, otherwise a placeholder that is not a readable PDF.
#[cfg(unix)]
pub fn fake_converter(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    const SCRIPT: &str = r#"#!/bin/sh
outdir=""
input=""
while [ $# -gt 0 ]; do
    case "$1" in
        --outdir) outdir="$2"; shift 2 ;;
        --convert-to) shift 2 ;;
        --headless) shift ;;
        *) input="$1"; shift ;;
    esac
done
name=$(basename "$input")
stem="${name%.*}"
case "$name" in
    *bad*) echo "conversion crashed on $name" >&2; exit 3 ;;
    *slow*) exec sleep 10 ;;
    *noisy*) echo "Error: source file could not be loaded" >&2; exit 0 ;;
    *ghost*) exit 0 ;;
esac
template="$(dirname "$0")/template.pdf"
if [ -f "$template" ]; then
    cp "$template" "$outdir/$stem.pdf"
else
    printf '%%PDF-1.4\n%% converted from %s\n' "$name" > "$outdir/$stem.pdf"
fi
"#;

    let path = dir.join("fake-soffice");
    fs::write(&path, SCRIPT).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Observer that keeps the name of every started item and the final counts.
#[derive(Debug, Default)]
pub struct CountingObserver {
    pub started: Vec<String>,
    pub failed: usize,
    pub summaries: Vec<BatchSummary>,
}

impl ProgressObserver for CountingObserver {
    fn on_item_start(&mut self, _index: usize, _total: usize, name: &str) {
        self.started.push(name.to_string());
    }

    fn on_item_done(&mut self, _index: usize, status: ItemStatus<'_>) {
        if let ItemStatus::Failed(_) = status {
            self.failed += 1;
        }
    }

    fn on_batch_done(&mut self, summary: &BatchSummary) {
        self.summaries.push(summary.clone());
    }
}
