use std::collections::HashMap;
use std::ops::Range;

pub mod escape;
pub mod header;
mod parser;
pub(crate) mod write;

pub use header::Header;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Span {
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) value: Option<Range<usize>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub translation: String,
    pub comments: Vec<String>,
    pub(crate) span: Span,
}

impl Entry {
    pub fn new(key: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            translation: translation.into(),
            comments: Vec::new(),
            span: Span::default(),
        }
    }

    pub fn with_comments(mut self, comments: Vec<String>) -> Self {
        self.comments = comments;
        self
    }

    pub fn is_translated(&self) -> bool {
        !self.translation.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    header: Option<Header>,
    entries: Vec<Entry>,
    // A repeated key keeps its first position and takes the later value.
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn parse(text: &str) -> Self {
        parser::parse(text)
    }

    pub fn header(&self) -> Option<&Header> {
        self.header.as_ref()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.index.get(key).map(|&idx| &self.entries[idx])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn language(&self) -> Option<&str> {
        self.header.as_ref().and_then(|header| header.language())
    }

    pub(crate) fn set_header(&mut self, header: Header) {
        self.header = Some(header);
    }

    pub(crate) fn insert(&mut self, entry: Entry) {
        match self.index.get(&entry.key) {
            Some(&idx) => self.entries[idx] = entry,
            None => {
                self.index.insert(entry.key.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }
}
