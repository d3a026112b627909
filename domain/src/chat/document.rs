//! Uploaded document sources.

/// An uploaded file, classified by declared MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Pdf(Vec<u8>),
    Epub(Vec<u8>),
    PlainText(Vec<u8>),
    Unsupported { mime_type: String },
}

impl DocumentSource {
    pub fn from_upload(bytes: Vec<u8>, mime_type: &str) -> Self {
        let essence = mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "application/pdf" => DocumentSource::Pdf(bytes),
            "application/epub+zip" => DocumentSource::Epub(bytes),
            "text/plain" | "text/markdown" => DocumentSource::PlainText(bytes),
            _ => DocumentSource::Unsupported { mime_type: essence },
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DocumentSource::Pdf(_) => "pdf",
            DocumentSource::Epub(_) => "epub",
            DocumentSource::PlainText(_) => "text",
            DocumentSource::Unsupported { .. } => "unsupported",
        }
    }

    /// Text content for plain-text uploads. PDF and EPUB need an
    /// external extractor; unsupported types have none.
    pub fn plain_text(&self) -> Option<String> {
        match self {
            DocumentSource::PlainText(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_mime() {
        assert_eq!(DocumentSource::from_upload(vec![], "application/pdf").kind(), "pdf");
        assert_eq!(DocumentSource::from_upload(vec![], "application/epub+zip").kind(), "epub");
        assert_eq!(
            DocumentSource::from_upload(vec![], "text/plain; charset=utf-8").kind(),
            "text"
        );
        assert_eq!(
            DocumentSource::from_upload(vec![], "image/png"),
            DocumentSource::Unsupported {
                mime_type: "image/png".to_string()
            }
        );
    }

    #[test]
    fn test_plain_text_extraction() {
        let doc = DocumentSource::from_upload("zdravo".as_bytes().to_vec(), "TEXT/PLAIN");
        assert_eq!(doc.plain_text().as_deref(), Some("zdravo"));
        assert!(DocumentSource::Pdf(vec![1, 2]).plain_text().is_none());
    }
}
