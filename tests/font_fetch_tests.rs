//! Integration tests for font download and conversion

mod common;

use std::fs;

use common::{
    build_woff2_tagged, head_table, sample_woff2, stylesheet, RecordingTransport, Woff2Table,
    ARBITRARY_TAG_INDEX,
};
use grubtheme::config::LEGACY_USER_AGENT;
use grubtheme::fonts::sfnt::checksum;
use grubtheme::fonts::{convert_to_truetype, FontFormat, FontOutcome};
use grubtheme::{FontError, FontFetcher, FontSource, ThemeLayout};
use pretty_assertions::assert_eq;
use tempfile::tempdir;
use ttf_parser::{Face, GlyphId, Rect};

const INTER_FONT_URL: &str =
    "https://fonts.gstatic.com/s/inter/v13/UcC73FwrK3iLTeHuS_fvQtMwCp50KnMa1ZL7.woff2";

fn inter() -> FontSource {
    FontSource::defaults().remove(0)
}

fn jetbrains_mono() -> FontSource {
    FontSource::defaults().remove(1)
}

#[test]
fn test_woff2_converts_to_valid_truetype() {
    let ttf = convert_to_truetype(&sample_woff2(), FontFormat::Woff2).expect("conversion failed");

    assert_eq!(checksum(&ttf), 0xB1B0_AFBA);

    let face = Face::parse(&ttf, 0).expect("converted font should parse");
    assert_eq!(face.number_of_glyphs(), 2);
    assert_eq!(face.units_per_em(), 1000);
    assert_eq!(
        face.glyph_bounding_box(GlyphId(1)),
        Some(Rect {
            x_min: 10,
            y_min: 0,
            x_max: 60,
            y_max: 100
        })
    );
    assert_eq!(face.glyph_bounding_box(GlyphId(0)), None);
    assert_eq!(face.glyph_hor_advance(GlyphId(1)), Some(600));
    // Left side bearings are rebuilt from the glyph bounding boxes
    assert_eq!(face.glyph_hor_side_bearing(GlyphId(1)), Some(10));
}

#[test]
fn test_fetch_requests_exact_url_and_removes_woff2() {
    let dir = tempdir().unwrap();
    let source = inter();
    let transport = RecordingTransport::default()
        .with_stylesheet(&source.stylesheet_url, stylesheet("Inter", INTER_FONT_URL))
        .with_binary(INTER_FONT_URL, sample_woff2());
    let log = transport.log();

    let fetcher = FontFetcher::new(transport, ThemeLayout::new(dir.path()));
    let outcome = fetcher.fetch_family(&source);

    let fonts_dir = dir.path().join("fonts");
    match outcome {
        FontOutcome::Ready(path) => assert_eq!(path, fonts_dir.join("Inter.ttf")),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(!fonts_dir.join("Inter.woff2").exists());
    assert!(Face::parse(&fs::read(fonts_dir.join("Inter.ttf")).unwrap(), 0).is_ok());

    assert_eq!(
        log.urls(),
        vec![source.stylesheet_url.clone(), INTER_FONT_URL.to_string()]
    );
    assert_eq!(log.user_agents(), vec![Some(LEGACY_USER_AGENT.to_string()), None]);
}

#[test]
fn test_failed_conversion_keeps_woff2() {
    let dir = tempdir().unwrap();
    let source = inter();
    let mut broken = sample_woff2();
    // Cut the Brotli stream short; the header length no longer matches either
    broken.truncate(broken.len() - 10);

    let transport = RecordingTransport::default()
        .with_stylesheet(&source.stylesheet_url, stylesheet("Inter", INTER_FONT_URL))
        .with_binary(INTER_FONT_URL, broken.clone());
    let fetcher = FontFetcher::new(transport, ThemeLayout::new(dir.path()));

    match fetcher.fetch_family(&source) {
        FontOutcome::Unconverted { path, error } => {
            assert_eq!(path, dir.path().join("fonts").join("Inter.woff2"));
            assert_eq!(fs::read(&path).unwrap(), broken);
            assert!(matches!(error, FontError::Malformed(_)));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(!dir.path().join("fonts").join("Inter.ttf").exists());
}

#[test]
fn test_fetch_all_isolates_failures() {
    let dir = tempdir().unwrap();
    let inter = inter();
    let mono = jetbrains_mono();
    // No stylesheet registered for Inter: the transport answers 404
    let transport = RecordingTransport::default()
        .with_stylesheet(
            &mono.stylesheet_url,
            stylesheet("JetBrains Mono", "https://fonts.example/jbm.ttf"),
        )
        .with_binary("https://fonts.example/jbm.ttf", vec![0, 1, 0, 0]);
    let log = transport.log();

    let fetcher = FontFetcher::new(transport, ThemeLayout::new(dir.path()));
    let reports = fetcher.fetch_all(&[inter.clone(), mono.clone()]);

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].family, "Inter");
    assert!(matches!(
        reports[0].outcome,
        FontOutcome::Failed(FontError::Status { status: 404, .. })
    ));
    assert_eq!(reports[1].family, "JetBrainsMono");
    assert!(reports[1].is_success());
    assert!(dir.path().join("fonts").join("JetBrainsMono.ttf").exists());

    // The failed family made exactly one request
    assert_eq!(
        log.urls(),
        vec![
            inter.stylesheet_url,
            mono.stylesheet_url,
            "https://fonts.example/jbm.ttf".to_string()
        ]
    );
}

#[test]
fn test_stylesheet_without_src_is_reported() {
    let dir = tempdir().unwrap();
    let source = inter();
    let transport = RecordingTransport::default()
        .with_stylesheet(&source.stylesheet_url, "/* rate limited */".to_string());
    let log = transport.log();
    let fetcher = FontFetcher::new(transport, ThemeLayout::new(dir.path()));

    match fetcher.fetch_family(&source) {
        FontOutcome::Failed(err) => {
            assert_eq!(err.to_string(), "Could not find font URL for Inter")
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(log.urls().len(), 1);
}

/// `head` followed by `extra` empty tables with made-up tags
fn woff2_with_extra_tables(extra: u32) -> Vec<u8> {
    let head = Woff2Table::plain(1, head_table());
    let empty = Woff2Table::plain(ARBITRARY_TAG_INDEX, Vec::new());
    let mut tables = vec![(&head, None)];
    for i in 0..extra {
        tables.push((&empty, Some(i.to_be_bytes())));
    }
    build_woff2_tagged(&tables)
}

#[test]
fn test_oversized_table_directory_is_an_error() {
    let hostile = woff2_with_extra_tables(4096);
    let result = std::panic::catch_unwind(|| convert_to_truetype(&hostile, FontFormat::Woff2));

    match result {
        Ok(Err(FontError::Malformed(_))) => {}
        Ok(other) => panic!("unexpected result: {:?}", other.map(|ttf| ttf.len())),
        Err(_) => panic!("conversion panicked"),
    }
}

#[test]
fn test_oversized_font_does_not_stop_the_next_family() {
    let dir = tempdir().unwrap();
    let inter = inter();
    let mono = jetbrains_mono();
    let mono_url = "https://fonts.example/jbm.woff2";
    let transport = RecordingTransport::default()
        .with_stylesheet(&inter.stylesheet_url, stylesheet("Inter", INTER_FONT_URL))
        .with_binary(INTER_FONT_URL, woff2_with_extra_tables(4096))
        .with_stylesheet(&mono.stylesheet_url, stylesheet("JetBrains Mono", mono_url))
        .with_binary(mono_url, sample_woff2());

    let fetcher = FontFetcher::new(transport, ThemeLayout::new(dir.path()));
    let reports = fetcher.fetch_all(&[inter, mono]);

    assert!(matches!(
        reports[0].outcome,
        FontOutcome::Unconverted {
            error: FontError::Malformed(_),
            ..
        }
    ));
    assert!(reports[1].is_success());
    assert!(dir.path().join("fonts").join("JetBrainsMono.ttf").exists());
}
