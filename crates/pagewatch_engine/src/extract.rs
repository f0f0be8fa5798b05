use scraper::{Html, Selector};

/// Which part of the snapshot the fingerprint covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// Inner markup of the `<body>` element.
    Body,
    /// No body in the markup; the snapshot is used as-is.
    WholeDocument,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedContent {
    pub text: String,
    pub region: Region,
}

/// Reduce a snapshot to the part worth comparing.
///
/// The HTML parser synthesizes a `<body>` for any input, so the raw markup is
/// checked for a real body tag first. Without one the snapshot passes through
/// untouched.
pub fn normalize(snapshot: &str) -> NormalizedContent {
    if has_body_tag(snapshot) {
        if let Some(body) = body_inner_html(snapshot) {
            return NormalizedContent {
                text: body,
                region: Region::Body,
            };
        }
    }
    NormalizedContent {
        text: snapshot.to_string(),
        region: Region::WholeDocument,
    }
}

fn body_inner_html(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let body_sel = Selector::parse("body").ok()?;
    doc.select(&body_sel).next().map(|node| node.inner_html())
}

fn has_body_tag(html: &str) -> bool {
    let bytes = html.as_bytes();
    bytes.windows(5).enumerate().any(|(idx, window)| {
        window.eq_ignore_ascii_case(b"<body")
            && matches!(
                bytes.get(idx + 5),
                Some(b'>' | b' ' | b'\t' | b'\n' | b'\r' | b'/')
            )
    })
}

#[cfg(test)]
mod tests {
    use super::has_body_tag;

    #[test]
    fn body_tag_detection() {
        assert!(has_body_tag("<html><BODY class=\"x\">hi</BODY></html>"));
        assert!(has_body_tag("<body>"));
        assert!(!has_body_tag("<p>no body</p>"));
        assert!(!has_body_tag("<bodyguard>not it</bodyguard>"));
        assert!(!has_body_tag("<body"));
    }
}
