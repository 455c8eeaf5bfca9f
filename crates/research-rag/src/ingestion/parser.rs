//! Text extraction for PDF and plain-text uploads

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::types::FileType;

/// How long pdf-extract may run before falling back to the content-stream scan
const PDF_EXTRACT_TIMEOUT: Duration = Duration::from_secs(60);

static INLINE_WHITESPACE: Lazy<Regex> = Lazy::new(|| compile(r"[ \t\x0B\x0C\r]+"));
static BLANK_LINES: Lazy<Regex> = Lazy::new(|| compile(r"\n{3,}"));

fn compile(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(err) => panic!("cleanup regex {pattern:?} is invalid: {err}"),
    }
}

/// Extracted text and metadata
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub file_type: FileType,
    /// Full extracted text
    pub content: String,
    /// Page count (PDF only)
    pub total_pages: Option<u32>,
}

/// PDF / TXT parser
pub struct FileParser;

impl FileParser {
    /// Read and parse a stored file
    pub fn parse_path(path: &Path) -> Result<ParsedDocument> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        // Reject by extension before touching the disk
        Self::file_type_of(&filename)?;

        let data = std::fs::read(path)?;
        Self::parse(&filename, &data)
    }

    /// Parse file contents based on the filename's extension
    pub fn parse(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        match Self::file_type_of(filename)? {
            FileType::Pdf => Self::parse_pdf(filename, data),
            FileType::Txt => Ok(Self::parse_text(data)),
        }
    }

    fn file_type_of(filename: &str) -> Result<FileType> {
        FileType::from_path(filename).ok_or_else(|| {
            let extension = Path::new(filename)
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            Error::UnsupportedFileType(if extension.is_empty() {
                format!("'{}' has no extension (expected .pdf or .txt)", filename)
            } else {
                format!(".{} (expected .pdf or .txt)", extension)
            })
        })
    }

    fn parse_text(data: &[u8]) -> ParsedDocument {
        ParsedDocument {
            file_type: FileType::Txt,
            content: String::from_utf8_lossy(data).into_owned(),
            total_pages: None,
        }
    }

    fn parse_pdf(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        let raw = Self::extract_pdf_with_timeout(filename, data)?;
        let content = cleanup_pdf_text(&raw);

        if content.trim().is_empty() {
            return Err(Error::file_parse(
                filename,
                "No text content could be extracted from PDF",
            ));
        }

        let total_pages = match lopdf::Document::load_mem(data) {
            Ok(doc) => Some(doc.get_pages().len() as u32),
            Err(_) => None,
        };

        Ok(ParsedDocument {
            file_type: FileType::Pdf,
            content,
            total_pages,
        })
    }

    /// Run pdf-extract on its own thread so a panic or a hang in font
    /// handling falls back to the lopdf scan instead of taking the worker down.
    fn extract_pdf_with_timeout(filename: &str, data: &[u8]) -> Result<String> {
        use std::sync::mpsc;

        let data_vec = data.to_vec();
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || {
            let result = pdf_extract::extract_text_from_mem(&data_vec);
            let _ = tx.send(result);
        });

        match rx.recv_timeout(PDF_EXTRACT_TIMEOUT) {
            Ok(Ok(text)) if !text.trim().is_empty() => Ok(text),
            Ok(Ok(_)) => {
                tracing::warn!("pdf-extract found no text in {}, trying fallback", filename);
                Self::extract_pdf_text_fallback(filename, data)
            }
            Ok(Err(e)) => {
                tracing::warn!("pdf-extract failed on {}: {}, trying fallback", filename, e);
                Self::extract_pdf_text_fallback(filename, data)
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tracing::error!(
                    "PDF extraction of {} timed out after {}s",
                    filename,
                    PDF_EXTRACT_TIMEOUT.as_secs()
                );
                Self::extract_pdf_text_fallback(filename, data)
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                tracing::error!("PDF extraction thread crashed on {}", filename);
                Self::extract_pdf_text_fallback(filename, data)
            }
        }
    }

    /// Scan page content streams for text-showing operators
    fn extract_pdf_text_fallback(filename: &str, data: &[u8]) -> Result<String> {
        let doc = lopdf::Document::load_mem(data)
            .map_err(|e| Error::file_parse(filename, format!("Failed to load PDF: {}", e)))?;

        let mut all_text = String::new();
        for (page_num, page_id) in doc.get_pages() {
            match doc.get_page_content(page_id) {
                Ok(content) => {
                    let text = extract_text_from_content(&content);
                    if !text.trim().is_empty() {
                        all_text.push_str(&text);
                        all_text.push('\n');
                    }
                }
                Err(e) => {
                    tracing::debug!("No content stream for page {}: {}", page_num, e);
                }
            }
        }

        if all_text.trim().is_empty() {
            return Err(Error::file_parse(
                filename,
                "PDF appears to be image-based or has no extractable text",
            ));
        }

        Ok(all_text)
    }
}

/// Pull literal strings out of `Tj` / `TJ` operators between `BT` and `ET`
fn extract_text_from_content(content: &[u8]) -> String {
    let content_str = String::from_utf8_lossy(content);
    let mut text = String::new();
    let mut in_text_block = false;

    for line in content_str.lines() {
        let line = line.trim();

        match line {
            "BT" => in_text_block = true,
            "ET" => {
                in_text_block = false;
                if !text.ends_with(char::is_whitespace) && !text.is_empty() {
                    text.push(' ');
                }
            }
            _ if in_text_block && (line.ends_with("Tj") || line.ends_with("TJ")) => {
                if let (Some(start), Some(end)) = (line.find('('), line.rfind(')')) {
                    if start < end {
                        text.push_str(&unescape_pdf_string(&line[start + 1..end]));
                    }
                }
            }
            _ => {}
        }
    }

    text
}

fn unescape_pdf_string(s: &str) -> String {
    s.replace("\\n", "\n")
        .replace("\\r", "\r")
        .replace("\\t", "\t")
        .replace("\\(", "(")
        .replace("\\)", ")")
        .replace("\\\\", "\\")
}

/// Normalise extracted PDF text: typographic glyphs to ASCII, NULs removed,
/// runs of inline whitespace collapsed and at most one blank line kept.
pub fn cleanup_pdf_text(text: &str) -> String {
    let replaced: String = text
        .chars()
        .filter(|c| *c != '\0')
        .map(|c| match c {
            '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' => "-".to_string(),
            '\u{2014}' | '\u{2015}' => "--".to_string(),
            '\u{2018}' | '\u{2019}' | '\u{201A}' => "'".to_string(),
            '\u{201C}' | '\u{201D}' | '\u{201E}' => "\"".to_string(),
            '\u{2022}' => "* ".to_string(),
            '\u{2026}' => "...".to_string(),
            '\u{00A0}' | '\u{2002}' | '\u{2003}' | '\u{2009}' => " ".to_string(),
            '\u{FB00}' => "ff".to_string(),
            '\u{FB01}' => "fi".to_string(),
            '\u{FB02}' => "fl".to_string(),
            '\u{FB03}' => "ffi".to_string(),
            '\u{FB04}' => "ffl".to_string(),
            other => other.to_string(),
        })
        .collect();

    let collapsed = INLINE_WHITESPACE.replace_all(&replaced, " ");
    let lines = collapsed
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");

    BLANK_LINES.replace_all(&lines, "\n\n").trim().to_string()
}

/// One-page PDF showing `text` in Courier
#[cfg(test)]
pub(crate) fn sample_pdf(text: &str) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 24.into()]),
            Operation::new("Td", vec![100.into(), 600.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut data = Vec::new();
    doc.save_to(&mut data).unwrap();
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_lossy_utf8() {
        let parsed = FileParser::parse("notes.TXT", b"caf\xc3\xa9 \xff ok").unwrap();
        assert_eq!(parsed.file_type, FileType::Txt);
        assert!(parsed.content.starts_with("café"));
        assert!(parsed.content.contains('\u{FFFD}'));
        assert!(parsed.total_pages.is_none());
    }

    #[test]
    fn test_unsupported_extension() {
        let err = FileParser::parse("slides.pptx", b"").unwrap_err();
        assert!(matches!(err, Error::UnsupportedFileType(_)));
        assert!(err.to_string().contains(".pptx"));

        let err = FileParser::parse("README", b"text").unwrap_err();
        assert!(matches!(err, Error::UnsupportedFileType(_)));
    }

    #[test]
    fn test_garbage_pdf_is_parse_error() {
        let err = FileParser::parse("broken.pdf", b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, Error::FileParse { .. }));
    }

    #[test]
    fn test_parse_pdf() {
        let parsed = FileParser::parse("notes.pdf", &sample_pdf("Soil carbon notes")).unwrap();
        assert_eq!(parsed.file_type, FileType::Pdf);
        assert!(parsed.content.contains("Soil carbon notes"));
        assert_eq!(parsed.total_pages, Some(1));
    }

    #[test]
    fn test_cleanup_pdf_text() {
        let raw = "The \u{FB01}rst  result\u{2014}see\t\u{201C}Table 1\u{201D}\0\n\n\n\n   next   line  ";
        assert_eq!(
            cleanup_pdf_text(raw),
            "The first result--see \"Table 1\"\n\nnext line"
        );
    }

    #[test]
    fn test_content_stream_scan() {
        let stream = b"q\nBT\n/F1 12 Tf\n(Hello \\(PDF\\)) Tj\nET\nBT\n[(world)] TJ\nET\nQ";
        assert_eq!(extract_text_from_content(stream), "Hello (PDF) world ");
    }

    #[test]
    fn test_parse_path_reads_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("abc_notes.txt");
        std::fs::write(&path, "Soil carbon matters.").unwrap();

        let parsed = FileParser::parse_path(&path).unwrap();
        assert_eq!(parsed.content, "Soil carbon matters.");
    }
}
