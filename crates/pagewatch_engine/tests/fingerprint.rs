use pagewatch_engine::{
    digest_text, normalize, ContentDigest, ContentFingerprinter, FetchMetadata, PageSnapshot,
    Region,
};
use pretty_assertions::assert_eq;

fn snapshot(text: &str) -> PageSnapshot {
    PageSnapshot {
        text: text.to_string(),
        metadata: FetchMetadata {
            original_url: "https://example.com".to_string(),
            final_url: "https://example.com".to_string(),
            redirect_count: 0,
            content_type: Some("text/html".to_string()),
            encoding_label: "UTF-8".to_string(),
            byte_len: text.len() as u64,
        },
    }
}

#[test]
fn digest_is_md5_of_utf8_bytes() {
    assert_eq!(digest_text("abc").to_hex(), "900150983cd24fb0d6963f7d28e17f72");
}

#[test]
fn fingerprint_is_deterministic() {
    let page = snapshot("<html><body><p>Shows: 3</p></body></html>");
    let first = ContentFingerprinter.fingerprint(Some(&page));
    let second = ContentFingerprinter.fingerprint(Some(&page.clone()));
    assert_eq!(first, second);
    assert!(first.fingerprint().is_some());
}

#[test]
fn body_region_ignores_head_churn() {
    let morning = "<html><head><title>t</title><meta name=\"ts\" content=\"0800\"></head>\
                   <body><p>Shows: 3</p></body></html>";
    let evening = "<html><head><title>t</title><meta name=\"ts\" content=\"2000\"></head>\
                   <body><p>Shows: 3</p></body></html>";

    let a = ContentFingerprinter.fingerprint(Some(&snapshot(morning)));
    let b = ContentFingerprinter.fingerprint(Some(&snapshot(evening)));
    assert_eq!(a, b);
    assert!(matches!(
        a,
        ContentDigest::Fingerprint {
            region: Region::Body,
            ..
        }
    ));
}

#[test]
fn body_changes_change_the_fingerprint() {
    let before = snapshot("<html><body><p>Shows: 3</p></body></html>");
    let after = snapshot("<html><body><p>Shows: 4</p></body></html>");
    assert_ne!(
        ContentFingerprinter.fingerprint(Some(&before)).fingerprint(),
        ContentFingerprinter.fingerprint(Some(&after)).fingerprint()
    );
}

#[test]
fn normalize_extracts_body_inner_markup() {
    let normalized = normalize("<html><head><title>x</title></head><body><p>A</p></body></html>");
    assert_eq!(normalized.region, Region::Body);
    assert_eq!(normalized.text, "<p>A</p>");
}

#[test]
fn markup_without_body_falls_back_to_whole_document() {
    let raw = "<p>fragment</p>\n<p>second</p>";
    let normalized = normalize(raw);
    assert_eq!(normalized.region, Region::WholeDocument);
    assert_eq!(normalized.text, raw);

    let digest = ContentFingerprinter.fingerprint(Some(&snapshot(raw)));
    assert_eq!(
        digest,
        ContentDigest::Fingerprint {
            fingerprint: digest_text(raw),
            region: Region::WholeDocument,
        }
    );
}

#[test]
fn absent_or_blank_snapshot_is_empty() {
    assert_eq!(ContentFingerprinter.fingerprint(None), ContentDigest::Empty);
    assert_eq!(
        ContentFingerprinter.fingerprint(Some(&snapshot(" \n\t "))),
        ContentDigest::Empty
    );
    assert_eq!(ContentDigest::Empty.fingerprint(), None);
}
