use serde::Serialize;

pub const PATH_FIELD: &str = "Path";
pub const FILE_FIELD: &str = "File";
pub const LINE_NUMBER_FIELD: &str = "LineNumber";

/// One regex match: field name to captured text, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchRecord {
    fields: Vec<(String, String)>,
}

impl MatchRecord {
    pub(crate) fn from_fields(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn line_number(&self) -> Option<usize> {
        self.get(LINE_NUMBER_FIELD).and_then(|n| n.parse().ok())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MatchCollection {
    records: Vec<MatchRecord>,
}

impl MatchCollection {
    pub fn push(&mut self, record: MatchRecord) {
        self.records.push(record);
    }

    pub fn append(&mut self, other: MatchCollection) {
        self.records.extend(other.records);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MatchRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a MatchCollection {
    type Item = &'a MatchRecord;
    type IntoIter = std::slice::Iter<'a, MatchRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl std::ops::Index<usize> for MatchCollection {
    type Output = MatchRecord;

    fn index(&self, index: usize) -> &MatchRecord {
        &self.records[index]
    }
}
