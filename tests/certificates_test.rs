mod common;

use cert_crawl::config::CertificateConfig;
use cert_crawl::core::certificates::CertificateGenerator;
use cert_crawl::core::font::TrueTypeFont;
use cert_crawl::core::overlay::Template;
use cert_crawl::{CertificateJob, CrawlError, JobEngine, LocalStorage};
use lopdf::{Document, Object};
use std::path::Path;
use tempfile::TempDir;

/// DejaVu Serif, bundled with its license under `tests/fixtures`.
const FONT_FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/DejaVuSerif.ttf");

fn prepare_inputs(dir: &Path, names: &str) {
    std::fs::write(dir.join("instruistoj.txt"), names).unwrap();
    std::fs::write(dir.join("sxablono_instruistoj.pdf"), common::blank_template()).unwrap();
    std::fs::copy(FONT_FIXTURE, dir.join("DejaVuSerif.ttf")).unwrap();
}

fn config() -> CertificateConfig {
    CertificateConfig {
        font_file: "DejaVuSerif.ttf".to_string(),
        ..CertificateConfig::default()
    }
}

fn font_resources(doc: &Document) -> lopdf::Dictionary {
    let page_id = *doc.get_pages().get(&1).unwrap();
    let page = doc.get_dictionary(page_id).unwrap();
    let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
    resources.get(b"Font").unwrap().as_dict().unwrap().clone()
}

#[tokio::test]
async fn test_one_certificate_per_name() {
    let temp_dir = TempDir::new().unwrap();
    prepare_inputs(
        temp_dir.path(),
        "María López\n\n  Juan Pérez.pdf  \nMaría López\n",
    );

    let job = CertificateJob::new(LocalStorage::new(temp_dir.path()), config());
    let summary = JobEngine::new(job).run().await.unwrap();

    assert_eq!(summary.records, 3);
    let output_dir = temp_dir.path().join("Atestiloj");
    let mut files: Vec<String> = std::fs::read_dir(&output_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    files.sort();
    assert_eq!(files, vec!["KEL_Juan Pérez.pdf", "KEL_María López.pdf"]);

    let doc = Document::load(output_dir.join("KEL_Juan Pérez.pdf")).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
    let fonts = font_resources(&doc);
    let font_id = fonts.get(b"FCert").unwrap().as_reference().unwrap();
    let font_dict = doc.get_dictionary(font_id).unwrap();
    assert_eq!(font_dict.get(b"Subtype").unwrap().as_name().unwrap(), b"Type0");
}

#[tokio::test]
async fn test_existing_output_directory_is_reused() {
    let temp_dir = TempDir::new().unwrap();
    prepare_inputs(temp_dir.path(), "Ana\n");
    std::fs::create_dir(temp_dir.path().join("Atestiloj")).unwrap();
    std::fs::write(temp_dir.path().join("Atestiloj/KEL_Ana.pdf"), b"stale").unwrap();

    let job = CertificateJob::new(LocalStorage::new(temp_dir.path()), config());
    JobEngine::new(job).run().await.unwrap();

    let written = std::fs::read(temp_dir.path().join("Atestiloj/KEL_Ana.pdf")).unwrap();
    assert!(written.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn test_unrenderable_name_stops_batch_keeping_earlier_files() {
    let temp_dir = TempDir::new().unwrap();
    // U+10FFFF has no glyph in any font.
    prepare_inputs(temp_dir.path(), "Ana\nBad \u{10FFFF}\nLuis\n");

    let job = CertificateJob::new(LocalStorage::new(temp_dir.path()), config());
    let err = JobEngine::new(job).run().await.unwrap_err();

    assert!(matches!(err, CrawlError::MissingGlyphError { .. }));
    let output_dir = temp_dir.path().join("Atestiloj");
    assert!(output_dir.join("KEL_Ana.pdf").exists());
    assert!(!output_dir.join("KEL_Luis.pdf").exists());
}

#[tokio::test]
async fn test_missing_font_aborts_before_rendering() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("instruistoj.txt"), "Ana\n").unwrap();
    std::fs::write(
        temp_dir.path().join("sxablono_instruistoj.pdf"),
        common::blank_template(),
    )
    .unwrap();

    let job = CertificateJob::new(LocalStorage::new(temp_dir.path()), config());
    let err = JobEngine::new(job).run().await.unwrap_err();

    assert!(matches!(err, CrawlError::FontError { .. }));
    assert!(!temp_dir.path().join("Atestiloj").exists());
}

#[test]
fn test_generator_keeps_template_content() {
    let template = Template::from_bytes(&common::blank_template(), "template.pdf").unwrap();
    let font =
        TrueTypeFont::from_bytes(std::fs::read(FONT_FIXTURE).unwrap(), "DejaVuSerif.ttf").unwrap();
    let generator = CertificateGenerator::new(template, font, 48.0, 470.0);

    let placement = generator.placement_for("Ana").unwrap();
    assert!(placement.x > 0.0 && placement.x < 306.0);

    let doc = Document::load_mem(&generator.render("Ana").unwrap()).unwrap();
    let page_id = *doc.get_pages().get(&1).unwrap();
    let contents = doc
        .get_dictionary(page_id)
        .unwrap()
        .get(b"Contents")
        .unwrap()
        .as_array()
        .unwrap()
        .clone();
    assert_eq!(contents.len(), 3);
    assert!(contents.iter().all(|c| matches!(c, Object::Reference(_))));
}
