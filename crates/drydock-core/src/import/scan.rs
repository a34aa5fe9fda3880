//! Single-pass scan of the XML documents Drydock reads.
//!
//! Both character dialects and the API responses are flat enough that one
//! streaming pass collecting a handful of facts is all the parsing needed.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use drydock_types::error::ImportError;

/// Attributes of one element, by name.
pub(crate) type Attributes = HashMap<String, String>;

/// Facts collected from a document.
#[derive(Debug, Default)]
pub(crate) struct Scan {
    /// Name of the document element.
    pub root: String,
    /// Text of the first `<name>` element.
    pub name: Option<String>,
    /// `code` attribute and text of an `<error>` element.
    pub error: Option<(String, String)>,
    /// `<row>` elements, tagged with the `name` of their enclosing `<rowset>`.
    pub rows: Vec<(String, Attributes)>,
    /// `<skill>` elements.
    pub skills: Vec<Attributes>,
}

impl Scan {
    /// Rows belonging to the rowset called `rowset`.
    pub fn rowset<'a>(&'a self, rowset: &'a str) -> impl Iterator<Item = &'a Attributes> + 'a {
        self.rows
            .iter()
            .filter(move |(name, _)| name == rowset)
            .map(|(_, attrs)| attrs)
    }
}

fn malformed(e: impl std::fmt::Display) -> ImportError {
    ImportError::Malformed(e.to_string())
}

fn tag_name(name: &[u8]) -> String {
    String::from_utf8_lossy(name).into_owned()
}

fn attributes(element: &BytesStart<'_>) -> Result<Attributes, ImportError> {
    let mut attrs = Attributes::new();
    for attr in element.attributes() {
        let attr = attr.map_err(malformed)?;
        let key = tag_name(attr.key.as_ref());
        let value = attr.unescape_value().map_err(malformed)?.into_owned();
        attrs.insert(key, value);
    }
    Ok(attrs)
}

pub(crate) fn scan(xml: &str) -> Result<Scan, ImportError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut result = Scan::default();
    let mut open: Vec<String> = Vec::new();
    let mut rowsets: Vec<String> = Vec::new();

    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Start(element) => {
                let tag = tag_name(element.name().as_ref());
                let attrs = attributes(&element)?;
                visit(&mut result, &tag, &attrs, rowsets.last());
                if tag == "rowset" {
                    rowsets.push(attrs.get("name").cloned().unwrap_or_default());
                }
                open.push(tag);
            }
            Event::Empty(element) => {
                let tag = tag_name(element.name().as_ref());
                let attrs = attributes(&element)?;
                visit(&mut result, &tag, &attrs, rowsets.last());
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(malformed)?;
                match open.last().map(String::as_str) {
                    Some("name") if result.name.is_none() => {
                        result.name = Some(text.into_owned());
                    }
                    Some("error") => {
                        if let Some((_, message)) = result.error.as_mut() {
                            *message = text.into_owned();
                        }
                    }
                    _ => {}
                }
            }
            Event::End(element) => {
                let tag = tag_name(element.name().as_ref());
                if open.pop().as_deref() != Some(tag.as_str()) {
                    return Err(ImportError::Malformed(format!("unexpected </{tag}>")));
                }
                if tag == "rowset" {
                    rowsets.pop();
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if result.root.is_empty() {
        return Err(ImportError::Malformed("document has no root element".to_string()));
    }
    Ok(result)
}

fn visit(result: &mut Scan, tag: &str, attrs: &Attributes, rowset: Option<&String>) {
    if result.root.is_empty() {
        result.root = tag.to_string();
    }
    match tag {
        "row" => {
            if let Some(rowset) = rowset {
                result.rows.push((rowset.clone(), attrs.clone()));
            }
        }
        "skill" => result.skills.push(attrs.clone()),
        "error" => {
            let code = attrs.get("code").cloned().unwrap_or_default();
            result.error = Some((code, String::new()));
        }
        _ => {}
    }
}

/// Parse a required integer attribute.
pub(crate) fn int_attr(attrs: &Attributes, name: &'static str) -> Result<i64, ImportError> {
    let value = attrs.get(name).ok_or(ImportError::MissingElement(name))?;
    value
        .trim()
        .parse()
        .map_err(|_| ImportError::InvalidAttribute {
            name,
            value: value.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_collects_rows_per_rowset() {
        let xml = r#"<eveapi>
            <result>
              <name>Pilot</name>
              <rowset name="skills"><row typeID="1" level="2"/></rowset>
              <rowset name="roles"><row roleID="9"/></rowset>
            </result>
        </eveapi>"#;
        let scan = scan(xml).unwrap();
        assert_eq!(scan.root, "eveapi");
        assert_eq!(scan.name.as_deref(), Some("Pilot"));
        assert_eq!(scan.rowset("skills").count(), 1);
        assert_eq!(scan.rowset("roles").count(), 1);
    }

    #[test]
    fn test_scan_nested_rowsets_tag_inner_rows() {
        let xml = r#"<eveapi><rowset name="outer">
            <row id="1"><rowset name="inner"><row id="2"/></rowset></row>
            <row id="3"/>
        </rowset></eveapi>"#;
        let scan = scan(xml).unwrap();
        let outer: Vec<&str> = scan.rowset("outer").map(|r| r["id"].as_str()).collect();
        assert_eq!(outer, vec!["1", "3"]);
        assert_eq!(scan.rowset("inner").count(), 1);
    }

    #[test]
    fn test_scan_error_element() {
        let scan = scan(r#"<eveapi><error code="203">Authentication failure.</error></eveapi>"#)
            .unwrap();
        assert_eq!(
            scan.error,
            Some(("203".to_string(), "Authentication failure.".to_string()))
        );
    }

    #[test]
    fn test_scan_rejects_garbage() {
        assert!(scan("this is not xml").is_err());
        assert!(scan("<a><b></a>").is_err());
    }

    #[test]
    fn test_int_attr() {
        let mut attrs = Attributes::new();
        attrs.insert("level".into(), "4".into());
        attrs.insert("bad".into(), "x".into());
        assert_eq!(int_attr(&attrs, "level").unwrap(), 4);
        assert!(matches!(
            int_attr(&attrs, "bad"),
            Err(ImportError::InvalidAttribute { name: "bad", .. })
        ));
        assert!(matches!(
            int_attr(&attrs, "missing"),
            Err(ImportError::MissingElement("missing"))
        ));
    }
}
