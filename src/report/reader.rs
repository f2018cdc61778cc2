//! XML report reader
//!
//! Decodes the raw bytes with the caller's encoding, then builds a
//! [`ReportNode`] tree from quick-xml events. Anything that is not a single
//! well-formed element tree is rejected.

use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use super::node::ReportNode;
use crate::common::{Error, Result};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Parse a report document into its root element
pub fn parse(bytes: &[u8], encoding: &str) -> Result<ReportNode> {
    let xml = decode(bytes, encoding)?;
    parse_str(&xml)
}

/// Read and parse a report file
pub fn parse_file(path: &Path, encoding: &str) -> Result<ReportNode> {
    let bytes = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::ReportNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Error::file_read(path, &e)
        }
    })?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "parsing report");
    parse(&bytes, encoding)
}

fn decode(bytes: &[u8], encoding: &str) -> Result<String> {
    match encoding.trim().to_ascii_uppercase().as_str() {
        "UTF-8" | "UTF8" => {
            let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
            String::from_utf8(bytes.to_vec())
                .map_err(|e| Error::Parse(format!("invalid UTF-8: {}", e)))
        }
        "US-ASCII" | "ASCII" => match bytes.iter().position(|b| !b.is_ascii()) {
            Some(offset) => Err(Error::Parse(format!(
                "non-ASCII byte 0x{:02X} at offset {}",
                bytes[offset], offset
            ))),
            None => Ok(bytes.iter().map(|&b| b as char).collect()),
        },
        "ISO-8859-1" | "LATIN1" | "LATIN-1" => Ok(bytes.iter().map(|&b| b as char).collect()),
        _ => Err(Error::UnsupportedEncoding(encoding.to_string())),
    }
}

fn parse_str(xml: &str) -> Result<ReportNode> {
    let mut reader = Reader::from_str(xml);
    reader.check_end_names(true);

    // Open elements, innermost last
    let mut stack: Vec<ReportNode> = Vec::new();
    let mut root: Option<ReportNode> = None;
    let mut buf = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| malformed(&reader, e))?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                if root.is_some() {
                    return Err(Error::Parse(format!(
                        "second root element at byte {}",
                        reader.buffer_position()
                    )));
                }

                let mut node = ReportNode::new(String::from_utf8_lossy(e.name().as_ref()));
                for attr in e.attributes() {
                    let attr = attr.map_err(|e| malformed(&reader, e))?;
                    let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                    let value = attr
                        .unescape_value()
                        .map_err(|e| malformed(&reader, e))?
                        .into_owned();
                    node.set_attribute(key, value);
                }

                if matches!(event, Event::Start(_)) {
                    stack.push(node);
                } else {
                    close(node, &mut stack, &mut root);
                }
            }
            Event::End(_) => {
                let node = stack.pop().ok_or_else(|| {
                    Error::Parse(format!(
                        "closing tag without opening tag at byte {}",
                        reader.buffer_position()
                    ))
                })?;
                close(node, &mut stack, &mut root);
            }
            Event::Text(ref e) => {
                let text = e.unescape().map_err(|e| malformed(&reader, e))?;
                if text.trim().is_empty() {
                    // formatting whitespace
                } else if let Some(open) = stack.last_mut() {
                    open.push_text(&text);
                } else {
                    return Err(Error::Parse(format!(
                        "text outside the root element at byte {}",
                        reader.buffer_position()
                    )));
                }
            }
            Event::CData(e) => {
                let data = e.into_inner();
                match stack.last_mut() {
                    Some(open) => open.push_text(&String::from_utf8_lossy(&data)),
                    None => {
                        return Err(Error::Parse(
                            "CDATA outside the root element".to_string(),
                        ))
                    }
                }
            }
            Event::Eof => break,
            Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(Error::Parse(format!(
            "unexpected end of document: <{}> is not closed",
            open.tag
        )));
    }

    root.ok_or_else(|| Error::Parse("document has no root element".to_string()))
}

/// Attach a finished element to its parent, or make it the root
fn close(node: ReportNode, stack: &mut [ReportNode], root: &mut Option<ReportNode>) {
    match stack.last_mut() {
        Some(parent) => parent.push_child(node),
        None => *root = Some(node),
    }
}

fn malformed<R>(reader: &Reader<R>, e: impl std::fmt::Display) -> Error {
    Error::Parse(format!("{} (near byte {})", e, reader.buffer_position()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SKIPPED_REPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<testsuite name="TestSuite" tests="1" errors="0" skipped="1" failures="0">
  <properties>
    <property name="testng.version" value="6.8.8"/>
  </properties>
  <testcase name="testDataProvider" classname="testng.DataProviderExceptionReportTest" time="0">
    <skipped message="java.lang.RuntimeException: Exception in data provider" type="java.lang.RuntimeException"><![CDATA[java.lang.RuntimeException: Exception in data provider
	at testng.DataProviderExceptionReportTest.data]]></skipped>
  </testcase>
</testsuite>
"#;

    #[test]
    fn test_parse_surefire_report() {
        let root = parse(SKIPPED_REPORT.as_bytes(), "UTF-8").unwrap();
        assert_eq!(root.tag, "testsuite");
        assert_eq!(root.attribute("skipped"), Some("1"));

        let cases = root.children("testcase");
        assert_eq!(cases.len(), 1);
        assert_eq!(
            cases[0].attribute("classname"),
            Some("testng.DataProviderExceptionReportTest")
        );

        let skipped = cases[0].children("skipped");
        assert_eq!(skipped.len(), 1);
        assert_eq!(
            skipped[0].attribute("type"),
            Some("java.lang.RuntimeException")
        );
        assert!(skipped[0]
            .text()
            .unwrap()
            .starts_with("java.lang.RuntimeException: Exception in data provider\n\tat"));
    }

    #[test]
    fn test_empty_attribute_is_present() {
        let root = parse(br#"<testcase><skipped message=""/></testcase>"#, "UTF-8").unwrap();
        let skipped = root.children("skipped");
        assert_eq!(skipped[0].attribute("message"), Some(""));
        assert_eq!(skipped[0].attribute("type"), None);
    }

    #[test]
    fn test_entities_are_unescaped() {
        let root = parse(
            br#"<failure message="a &lt; b &amp;&amp; &quot;c&quot;">x &gt; y</failure>"#,
            "utf-8",
        )
        .unwrap();
        assert_eq!(root.attribute("message"), Some("a < b && \"c\""));
        assert_eq!(root.text(), Some("x > y"));
    }

    #[test]
    fn test_bom_is_skipped() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"<testsuite/>");
        assert_eq!(parse(&bytes, "UTF-8").unwrap().tag, "testsuite");
    }

    #[test]
    fn test_latin1_decoding() {
        let root = parse(b"<testcase name=\"caf\xE9\"/>", "ISO-8859-1").unwrap();
        assert_eq!(root.attribute("name"), Some("café"));
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let err = parse(b"<testcase name=\"caf\xE9\"/>", "UTF-8").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_unsupported_encoding() {
        let err = parse(b"<a/>", "EBCDIC").unwrap_err();
        assert!(matches!(err, Error::UnsupportedEncoding(ref e) if e == "EBCDIC"));
    }

    #[test]
    fn test_mismatched_end_tag_rejected() {
        let err = parse(b"<testsuite><testcase></testsuite>", "UTF-8").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_unclosed_root_rejected() {
        let err = parse(b"<testsuite><testcase/>", "UTF-8").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_second_root_rejected() {
        let err = parse(b"<a/><b/>", "UTF-8").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_empty_document_rejected() {
        let err = parse(b"<?xml version=\"1.0\"?>\n", "UTF-8").unwrap_err();
        assert!(matches!(err, Error::Parse(ref m) if m.contains("no root")));
    }

    #[test]
    fn test_duplicate_attribute_rejected() {
        let err = parse(br#"<skipped type="a" type="b"/>"#, "UTF-8").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_report_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_file(&dir.path().join("TEST-x.xml"), "UTF-8").unwrap_err();
        assert!(matches!(err, Error::ReportNotFound { .. }));
    }
}
