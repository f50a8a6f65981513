//! INI document parser
//!
//! Line based: `[section]` headers, `option = value` or `option: value`
//! pairs, `#` and `;` comment lines. An indented line continues the value
//! of the previous option. Option names are case-insensitive and stored in
//! lower case; section names are kept as written.

use crate::error::ConfigError;

/// Section whose options every other section falls back to
pub const DEFAULT_SECTION: &str = "DEFAULT";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    pub name: String,
    /// Options in file order
    pub options: Vec<(String, String)>,
}

impl Section {
    fn new(name: &str) -> Self {
        Section { name: name.to_string(), options: Vec::new() }
    }

    /// Look up an option, ignoring case
    pub fn get(&self, option: &str) -> Option<&str> {
        let option = option.to_lowercase();
        self.options.iter()
            .find(|(key, _)| *key == option)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub defaults: Section,
    pub sections: Vec<Section>,
}

impl Default for Document {
    fn default() -> Self {
        Document {
            defaults: Section::new(DEFAULT_SECTION),
            sections: Vec::new(),
        }
    }
}

/// Where options are currently being collected
#[derive(Clone, Copy)]
enum Cursor {
    /// Before the first header
    Start,
    Defaults,
    Section(usize),
}

impl Document {
    fn section_mut(&mut self, cursor: Cursor) -> Option<&mut Section> {
        match cursor {
            Cursor::Start => None,
            Cursor::Defaults => Some(&mut self.defaults),
            Cursor::Section(i) => self.sections.get_mut(i),
        }
    }
}

/// Parse INI text
pub fn parse(input: &str) -> Result<Document, ConfigError> {
    let mut doc = Document::default();
    let mut cursor = Cursor::Start;
    let mut continuing = false;

    for (idx, raw) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();

        if line.is_empty() {
            continuing = false;
            continue;
        }
        if line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        // Indented line: continuation of the previous value
        if continuing && raw.starts_with(char::is_whitespace) {
            if let Some((_, value)) = doc.section_mut(cursor).and_then(|s| s.options.last_mut()) {
                value.push('\n');
                value.push_str(line);
            }
            continue;
        }
        continuing = false;

        if let Some(header) = line.strip_prefix('[') {
            let name = header.strip_suffix(']')
                .ok_or_else(|| ConfigError::parse(line_no, "unterminated section header"))?
                .trim();
            cursor = open_section(&mut doc, name, line_no)?;
            continue;
        }

        let (key, value) = split_option(line)
            .ok_or_else(|| ConfigError::parse(line_no, format!("expected 'option = value', found '{}'", line)))?;
        if key.is_empty() {
            return Err(ConfigError::parse(line_no, "empty option name"));
        }

        let section = doc.section_mut(cursor)
            .ok_or_else(|| ConfigError::parse(line_no, "option outside of a section"))?;
        let key = key.to_lowercase();
        if section.options.iter().any(|(k, _)| *k == key) {
            return Err(ConfigError::parse(
                line_no,
                format!("duplicate option '{}' in section '{}'", key, section.name),
            ));
        }
        section.options.push((key, value.to_string()));
        continuing = true;
    }

    Ok(doc)
}

fn open_section(doc: &mut Document, name: &str, line_no: usize) -> Result<Cursor, ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::parse(line_no, "empty section name"));
    }
    if name == DEFAULT_SECTION {
        return Ok(Cursor::Defaults);
    }
    if doc.sections.iter().any(|s| s.name == name) {
        return Err(ConfigError::parse(line_no, format!("duplicate section '{}'", name)));
    }
    doc.sections.push(Section::new(name));
    Ok(Cursor::Section(doc.sections.len() - 1))
}

/// Split on the first `=` or `:`, whichever comes first
fn split_option(line: &str) -> Option<(&str, &str)> {
    let at = line.find(['=', ':'])?;
    Some((line[..at].trim(), line[at + 1..].trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sections() {
        let doc = parse("[A]\nx = 1\ny: 2 V\n\n[B]\nz=3").unwrap();
        assert_eq!(doc.sections.len(), 2);
        assert_eq!(doc.sections[0].name, "A");
        assert_eq!(doc.sections[0].get("x"), Some("1"));
        assert_eq!(doc.sections[0].get("y"), Some("2 V"));
        assert_eq!(doc.sections[1].get("z"), Some("3"));
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let doc = parse("# header\n; another\n[A]\n\n# inside\nx = 1\n").unwrap();
        assert_eq!(doc.sections[0].options, vec![("x".to_string(), "1".to_string())]);
    }

    #[test]
    fn test_option_names_ignore_case() {
        let doc = parse("[A]\nValue1 = 120").unwrap();
        assert_eq!(doc.sections[0].get("value1"), Some("120"));
        assert_eq!(doc.sections[0].get("VALUE1"), Some("120"));
    }

    #[test]
    fn test_first_delimiter_wins() {
        let doc = parse("[A]\nurl = http://host:80").unwrap();
        assert_eq!(doc.sections[0].get("url"), Some("http://host:80"));
        let doc = parse("[A]\nratio: a=b").unwrap();
        assert_eq!(doc.sections[0].get("ratio"), Some("a=b"));
    }

    #[test]
    fn test_continuation_lines() {
        let doc = parse("[A]\nx = first\n  second\ny = 2").unwrap();
        assert_eq!(doc.sections[0].get("x"), Some("first\nsecond"));
        assert_eq!(doc.sections[0].get("y"), Some("2"));
    }

    #[test]
    fn test_defaults_section() {
        let doc = parse("[DEFAULT]\nunit = V\n[A]\nx = 1").unwrap();
        assert_eq!(doc.defaults.get("unit"), Some("V"));
        assert_eq!(doc.sections.len(), 1);
    }

    #[test]
    fn test_errors() {
        let cases = [
            ("x = 1", 1, "outside of a section"),
            ("[A\nx = 1", 1, "unterminated"),
            ("[A]\nnothing here", 2, "expected 'option = value'"),
            ("[A]\n= 5", 2, "empty option name"),
            ("[A]\nx = 1\nX = 2", 3, "duplicate option"),
            ("[A]\n[B]\n[A]", 3, "duplicate section"),
            ("[ ]", 1, "empty section name"),
        ];
        for (input, expected_line, expected) in cases {
            match parse(input) {
                Err(ConfigError::Parse { line, message }) => {
                    assert_eq!(line, expected_line, "{:?}", input);
                    assert!(message.contains(expected), "{:?}: {}", input, message);
                }
                other => panic!("{:?}: expected a parse error, got {:?}", input, other),
            }
        }
    }
}
