use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use super::matches::{MatchCollection, MatchRecord};
use crate::errors::TaskError;
use crate::xml::{self, emit, emit_declaration};

pub const ROOT_ELEMENT: &str = "Matches";
pub const MATCH_ELEMENT: &str = "Match";

/// Writes `matches` to `path` as `<Matches><Match><Field>value</Field>...`.
pub fn write_matches(path: &Path, matches: &MatchCollection) -> Result<(), TaskError> {
    let fail = |reason: String| TaskError::ReportWrite {
        path: path.to_path_buf(),
        reason,
    };

    validate(matches).map_err(fail)?;

    let file = File::create(path).map_err(|e| fail(e.to_string()))?;
    let mut out = BufWriter::new(file);
    render(&mut out, matches).map_err(fail)?;
    out.flush().map_err(|e| fail(e.to_string()))
}

/// Renders the report into any writer.
pub fn render<W: io::Write>(out: W, matches: &MatchCollection) -> Result<(), String> {
    let mut writer = Writer::new_with_indent(out, b' ', 2);
    emit_declaration(&mut writer)?;
    emit(&mut writer, Event::Start(BytesStart::new(ROOT_ELEMENT)))?;
    for record in matches {
        emit(&mut writer, Event::Start(BytesStart::new(MATCH_ELEMENT)))?;
        for (name, value) in record.fields() {
            emit(&mut writer, Event::Start(BytesStart::new(name)))?;
            emit(&mut writer, Event::Text(BytesText::new(value)))?;
            emit(&mut writer, Event::End(BytesEnd::new(name)))?;
        }
        emit(&mut writer, Event::End(BytesEnd::new(MATCH_ELEMENT)))?;
    }
    emit(&mut writer, Event::End(BytesEnd::new(ROOT_ELEMENT)))
}

// Everything the writer would otherwise emit as malformed XML.
fn validate(matches: &MatchCollection) -> Result<(), String> {
    for record in matches {
        for (name, value) in record.fields() {
            if !xml::is_xml_name(name) {
                return Err(format!("'{name}' is not a valid element name"));
            }
            if let Some(c) = value.chars().find(|&c| !xml::is_xml_char(c)) {
                return Err(format!(
                    "field '{name}' contains character U+{:04X} which XML cannot represent",
                    c as u32
                ));
            }
        }
    }
    Ok(())
}

/// Reads a report produced by [`write_matches`].
pub fn read_matches(content: &str) -> Result<MatchCollection, xml::XmlError> {
    let root = xml::parse(content)?;
    let mut matches = MatchCollection::default();
    for element in root.elements().filter(|e| e.name == MATCH_ELEMENT) {
        let fields = element
            .elements()
            .map(|field| (field.name.clone(), field.inner_text()))
            .collect();
        matches.push(MatchRecord::from_fields(fields));
    }
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grep::Pattern;

    fn sample() -> MatchCollection {
        let pattern = Pattern::new(r"// (?P<Tag>TODO|HACK): (?P<Text>[^\n]*)").unwrap();
        let mut all = pattern.extract(
            Path::new("src/a.cs"),
            "// TODO: fix <this> & that\nint x;\n// HACK: \"quoted\"\n",
        );
        all.append(pattern.extract(Path::new("b.cs"), "\n\n// TODO: later"));
        all
    }

    #[test]
    fn test_round_trip_preserves_records_and_order() {
        let matches = sample();
        let mut buf = Vec::new();
        render(&mut buf, &matches).unwrap();
        let back = read_matches(std::str::from_utf8(&buf).unwrap()).unwrap();
        assert_eq!(back, matches);
        assert_eq!(back[0].get("Text"), Some("fix <this> & that"));
        assert_eq!(back[2].get("LineNumber"), Some("3"));
    }

    #[test]
    fn test_empty_collection_writes_root_only() {
        let mut buf = Vec::new();
        render(&mut buf, &MatchCollection::default()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("<?xml"));
        assert!(read_matches(&text).unwrap().is_empty());
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.xml");
        write_matches(&out, &sample()).unwrap();
        let content = std::fs::read_to_string(&out).unwrap();
        assert!(content.contains("<Matches>"));
        assert_eq!(read_matches(&content).unwrap().len(), 3);
    }

    #[test]
    fn test_unwritable_path_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("missing").join("out.xml");
        let err = write_matches(&out, &sample()).unwrap_err();
        assert!(matches!(err, TaskError::ReportWrite { .. }));
    }

    #[test]
    fn test_unrepresentable_text_is_reported() {
        let pattern = Pattern::new(r"(?P<ctl>\x01)").unwrap();
        let matches = pattern.extract(Path::new("a.bin"), "a\u{1}b");
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.xml");
        let err = write_matches(&out, &matches).unwrap_err();
        assert!(err.to_string().contains("U+0001"));
        assert!(!out.exists());
    }

    #[test]
    fn test_reader_rejects_malformed_report() {
        assert!(read_matches("<Matches><Match>").is_err());
    }
}
