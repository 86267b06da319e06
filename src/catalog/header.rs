use super::escape::{decode, encode};
use super::write::line_ending;
use super::{Catalog, Entry, Span};

pub const LANGUAGE: &str = "Language";
pub const LANGUAGE_TEAM: &str = "Language-Team";
pub const PO_REVISION_DATE: &str = "PO-Revision-Date";
pub const CONTENT_TYPE: &str = "Content-Type";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub comments: Vec<String>,
    fields: Vec<(String, String)>,
    pub(crate) span: Span,
}

impl Header {
    pub(crate) fn from_entry(entry: Entry) -> Self {
        let fields = entry
            .translation
            .lines()
            .filter_map(|line| line.split_once(':'))
            .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
            .filter(|(name, _)| !name.is_empty())
            .collect();
        Self {
            comments: entry.comments,
            fields,
            span: entry.span,
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn language(&self) -> Option<&str> {
        self.field(LANGUAGE).filter(|value| !value.is_empty())
    }
}

pub(crate) fn field_line(name: &str, value: &str) -> String {
    format!("\"{}\"", encode(&format!("{}: {}\n", name, value)))
}

pub(crate) fn rewrite_fields(
    text: &str,
    updates: &[(&str, String)],
    insert_missing: bool,
) -> Option<String> {
    let catalog = Catalog::parse(text);
    let value = catalog.header()?.span.value.clone()?;

    let mut lines: Vec<String> = text.split_inclusive('\n').map(str::to_string).collect();
    let mut seen = vec![false; updates.len()];
    let mut anchor = value.end - 1;

    for idx in value.clone() {
        let trimmed = lines[idx].trim();
        if !trimmed.starts_with('"') {
            continue;
        }
        let decoded = decode(trimmed);
        let Some((name, _)) = decoded.split_once(':') else {
            continue;
        };
        let name = name.trim();
        if name.eq_ignore_ascii_case(CONTENT_TYPE) {
            anchor = idx;
        }
        if let Some(pos) = updates
            .iter()
            .position(|(field, _)| field.eq_ignore_ascii_case(name))
        {
            let ending = line_ending(&lines[idx]);
            lines[idx] = format!("{}{}", field_line(updates[pos].0, &updates[pos].1), ending);
            seen[pos] = true;
        }
    }

    if insert_missing {
        let missing: Vec<&(&str, String)> = updates
            .iter()
            .zip(&seen)
            .filter(|(_, seen)| !**seen)
            .map(|(update, _)| update)
            .collect();
        if !missing.is_empty() {
            let mut ending = line_ending(&lines[anchor]);
            if ending.is_empty() {
                ending = "\n";
                lines[anchor].push('\n');
            }
            let inserted = missing
                .into_iter()
                .map(|(name, value)| format!("{}{}", field_line(name, value), ending));
            lines.splice(anchor + 1..anchor + 1, inserted);
        }
    }

    Some(lines.concat())
}
