use serde::Serialize;

use super::pattern::Pattern;
use crate::errors::TaskError;

/// An item built from a single match: its identity plus one metadata entry per
/// named group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedItem {
    pub identity: String,
    pub metadata: Vec<(String, String)>,
}

impl CreatedItem {
    pub fn metadata(&self, name: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Matches `pattern` once against `input`.
///
/// With exactly one named group the item identity is that group's capture;
/// otherwise it is the whole input.
pub fn create_item(pattern: &str, input: &str) -> Result<CreatedItem, TaskError> {
    let compiled = Pattern::new(pattern)?;
    let metadata = compiled
        .first_match(input)
        .ok_or_else(|| TaskError::NoMatch {
            pattern: pattern.to_string(),
            input: input.to_string(),
        })?;

    for (name, value) in &metadata {
        tracing::debug!(group = %name, value = %value, "item metadata");
    }

    let identity = match metadata.as_slice() {
        [(_, only)] => only.clone(),
        _ => input.to_string(),
    };
    Ok(CreatedItem { identity, metadata })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_group_becomes_identity() {
        let item = create_item(r"(?P<lastword>\w+)$", "This is a test sentence").unwrap();
        assert_eq!(item.identity, "sentence");
        assert_eq!(item.metadata("lastword"), Some("sentence"));
    }

    #[test]
    fn test_groups_become_metadata() {
        let input = r"d:\Temp\SomeDir\bla.xml";
        let item = create_item(r"^(?P<name>.*)\.(?P<ext>\w+)$", input).unwrap();
        assert_eq!(item.identity, input);
        assert_eq!(item.metadata("name"), Some(r"d:\Temp\SomeDir\bla"));
        assert_eq!(item.metadata("ext"), Some("xml"));
    }

    #[test]
    fn test_path_and_file_split() {
        let item = create_item(
            r"^(?P<path>.*(\\|/)|(/|\\))(?P<file>.*)$",
            r"d:\Temp\SomeDir\SomeDir\bla.xml",
        )
        .unwrap();
        assert_eq!(item.metadata("path"), Some(r"d:\Temp\SomeDir\SomeDir\"));
        assert_eq!(item.metadata("file"), Some("bla.xml"));
    }

    #[test]
    fn test_only_first_match_is_used() {
        let item = create_item(r"(?P<n>\d+)-(?P<m>\d+)", "1-2 3-4").unwrap();
        assert_eq!(item.metadata("n"), Some("1"));
        assert_eq!(item.metadata("m"), Some("2"));
    }

    #[test]
    fn test_no_match_is_an_error() {
        let err = create_item(r"(?P<d>\d+)", "no digits").unwrap_err();
        assert!(matches!(err, TaskError::NoMatch { .. }));
        assert_eq!(err.code(), "BT0008");
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let err = create_item("(?P<x>", "x").unwrap_err();
        assert!(matches!(err, TaskError::Pattern(_)));
    }

    #[test]
    fn test_without_named_groups_identity_is_input() {
        let item = create_item(r"\d+", "abc 42").unwrap();
        assert_eq!(item.identity, "abc 42");
        assert!(item.metadata.is_empty());
    }
}
