use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use pagewatch_logging::watch_warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding_label: String,
}

/// Decode a response body to UTF-8: BOM -> Content-Type charset -> chardetng guess.
///
/// Malformed sequences become U+FFFD; a page with one bad byte still gets monitored.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> DecodedText {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Some(enc) = content_type
        .and_then(charset_param)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return decode_with(bytes, enc);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    decode_with(bytes, detector.guess(None, true))
}

fn charset_param(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|part| {
        let (name, value) = part.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(&['"', '\''][..]).to_string())
    })
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> DecodedText {
    let (text, actual, had_errors) = enc.decode(bytes);
    if had_errors {
        watch_warn!(
            "Body is not valid {}; malformed bytes were replaced",
            actual.name()
        );
    }
    DecodedText {
        text: text.into_owned(),
        encoding_label: actual.name().to_string(),
    }
}
