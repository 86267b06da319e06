use std::mem;

use super::escape::decode;
use super::{Catalog, Entry, Header, Span};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PoField {
    None,
    MsgId,
    MsgStr,
}

struct ParseState {
    field: PoField,
    current: Option<Entry>,
    pending_comments: Vec<String>,
}

impl ParseState {
    fn new() -> Self {
        Self {
            field: PoField::None,
            current: None,
            pending_comments: Vec::new(),
        }
    }

    fn finish_entry(&mut self, catalog: &mut Catalog) {
        let Some(entry) = self.current.take() else {
            return;
        };
        if entry.key.is_empty() {
            catalog.set_header(Header::from_entry(entry));
        } else {
            catalog.insert(entry);
        }
    }
}

pub(super) fn parse(text: &str) -> Catalog {
    let mut catalog = Catalog::default();
    let mut state = ParseState::new();

    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim();

        if let Some(literal) = trimmed.strip_prefix("msgid ") {
            state.finish_entry(&mut catalog);
            state.current = Some(Entry {
                key: decode(literal),
                translation: String::new(),
                comments: mem::take(&mut state.pending_comments),
                span: Span {
                    start: idx,
                    end: idx + 1,
                    value: None,
                },
            });
            state.field = PoField::MsgId;
            continue;
        }

        if let Some(literal) = trimmed.strip_prefix("msgstr ") {
            // A msgstr with no msgid before it has nothing to attach to.
            state.field = PoField::None;
            if let Some(entry) = state.current.as_mut() {
                entry.translation = decode(literal);
                entry.span.value = Some(idx..idx + 1);
                entry.span.end = idx + 1;
                state.field = PoField::MsgStr;
            }
            continue;
        }

        if trimmed.starts_with('"') {
            let Some(entry) = state.current.as_mut() else {
                continue;
            };
            match state.field {
                PoField::MsgId => {
                    entry.key.push_str(&decode(trimmed));
                    entry.span.end = idx + 1;
                }
                PoField::MsgStr => {
                    entry.translation.push_str(&decode(trimmed));
                    entry.span.end = idx + 1;
                    if let Some(value) = entry.span.value.as_mut() {
                        value.end = idx + 1;
                    }
                }
                PoField::None => {}
            }
            continue;
        }

        if trimmed.starts_with('#') && state.field == PoField::None {
            state.pending_comments.push(line.to_string());
        }
        // Blank lines, comments and anything unrecognised close the open literal.
        state.field = PoField::None;
    }

    state.finish_entry(&mut catalog);
    catalog
}
