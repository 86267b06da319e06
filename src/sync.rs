use std::collections::HashMap;

use crate::catalog::write::{line_ending, push_entry, push_field};
use crate::catalog::{Catalog, Entry};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    pub to_add: Vec<Entry>,
    pub to_translate: Vec<String>,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_translate.is_empty()
    }
}

pub fn plan(template: &Catalog, target: &Catalog) -> SyncPlan {
    let mut plan = SyncPlan::default();
    for entry in template.entries() {
        // An entry without a msgstr line cannot be patched in place.
        let existing = target
            .get(&entry.key)
            .filter(|current| current.span.value.is_some());
        if existing.is_none() {
            plan.to_add.push(Entry::new(entry.key.clone(), "").with_comments(entry.comments.clone()));
        }
        let untranslated = existing.is_none_or(|current| !current.is_translated());
        if untranslated && !entry.is_translated() {
            plan.to_translate.push(entry.key.clone());
        }
    }
    plan
}

pub fn append_entries(text: &str, entries: &[Entry]) -> String {
    let mut out = String::with_capacity(text.len() + entries.len() * 64);
    out.push_str(text);
    if entries.is_empty() {
        return out;
    }
    let ending = text
        .split_inclusive('\n')
        .next()
        .map(line_ending)
        .filter(|ending| !ending.is_empty())
        .unwrap_or("\n");
    if !out.is_empty() && !out.ends_with('\n') {
        out.push_str(ending);
    }
    for entry in entries {
        let mut block = String::new();
        push_entry(&mut block, &entry.comments, &entry.key, "");
        out.push_str(ending);
        for line in block.lines() {
            out.push_str(line);
            out.push_str(ending);
        }
    }
    out
}

pub fn apply_translations(text: &str, translations: &HashMap<String, String>) -> String {
    if translations.is_empty() {
        return text.to_string();
    }

    let catalog = Catalog::parse(text);
    let mut replacements = HashMap::new();
    for entry in catalog.entries() {
        let (Some(value), Some(translation)) = (&entry.span.value, translations.get(&entry.key))
        else {
            continue;
        };
        replacements.insert(value.start, (value.end, translation.as_str()));
    }

    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    let mut out = String::with_capacity(text.len());
    let mut idx = 0;
    while idx < lines.len() {
        let Some(&(end, translation)) = replacements.get(&idx) else {
            out.push_str(lines[idx]);
            idx += 1;
            continue;
        };
        let indent_len = lines[idx].len() - lines[idx].trim_start().len();
        let ending = match line_ending(lines[end - 1]) {
            "" => "\n",
            ending => ending,
        };
        let mut block = String::new();
        push_field(&mut block, "msgstr", translation);
        for line in block.lines() {
            out.push_str(&lines[idx][..indent_len]);
            out.push_str(line);
            out.push_str(ending);
        }
        idx = end;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = "msgid \"\"\nmsgstr \"\"\n\"Language: en\\n\"\n\n#: app.py:1\nmsgid \"a\"\nmsgstr \"\"\n\n#: app.py:2\nmsgid \"b\"\nmsgstr \"\"\n\n#: app.py:3\n#. keep me\nmsgid \"c\"\nmsgstr \"\"\n\nmsgid \"fixed\"\nmsgstr \"Fixed\"\n";

    const TARGET: &str = "msgid \"\"\nmsgstr \"\"\n\"Language: es\\n\"\n\n# translator note\n#: app.py:1\nmsgid \"a\"\nmsgstr \"A\"\n";

    fn keys(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|entry| entry.key.as_str()).collect()
    }

    #[test]
    fn plan_follows_template_order() {
        let plan = plan(&Catalog::parse(TEMPLATE), &Catalog::parse(TARGET));
        assert_eq!(keys(&plan.to_add), vec!["b", "c", "fixed"]);
        assert_eq!(plan.to_translate, vec!["b", "c"]);
        assert_eq!(
            plan.to_add[1].comments,
            vec!["#: app.py:3".to_string(), "#. keep me".to_string()]
        );
    }

    #[test]
    fn plan_picks_up_existing_gaps() {
        let target = "msgid \"c\"\nmsgstr \"\"\n\nmsgid \"a\"\nmsgstr \"\"\n\nmsgid \"b\"\nmsgstr \"B\"\n\nmsgid \"fixed\"\nmsgstr \"\"\n";
        let plan = plan(&Catalog::parse(TEMPLATE), &Catalog::parse(target));
        assert!(plan.to_add.is_empty());
        assert_eq!(plan.to_translate, vec!["a", "c"]);
    }

    #[test]
    fn appending_leaves_existing_text_untouched() {
        let template = Catalog::parse(TEMPLATE);
        let plan = plan(&template, &Catalog::parse(TARGET));
        let updated = append_entries(TARGET, &plan.to_add);
        assert!(updated.starts_with(TARGET));
        assert_eq!(
            &updated[TARGET.len()..],
            "\n#: app.py:2\nmsgid \"b\"\nmsgstr \"\"\n\n#: app.py:3\n#. keep me\nmsgid \"c\"\nmsgstr \"\"\n\nmsgid \"fixed\"\nmsgstr \"\"\n"
        );
    }

    #[test]
    fn appending_to_text_without_final_newline() {
        let updated = append_entries("msgid \"a\"\nmsgstr \"\"", &[Entry::new("b", "")]);
        assert_eq!(updated, "msgid \"a\"\nmsgstr \"\"\n\nmsgid \"b\"\nmsgstr \"\"\n");
    }

    #[test]
    fn replaces_only_the_translated_msgstr_blocks() {
        let text = "# keep\nmsgid \"a\"\nmsgstr \"\"\n\nmsgid \"b\"\nmsgstr \"\"\n\"old\"\n\nmsgid \"c\"\nmsgstr \"\"\n";
        let translations = HashMap::from([
            ("b".to_string(), "line 1\nline 2".to_string()),
            ("c".to_string(), "C".to_string()),
        ]);
        let updated = apply_translations(text, &translations);
        assert_eq!(
            updated,
            "# keep\nmsgid \"a\"\nmsgstr \"\"\n\nmsgid \"b\"\nmsgstr \"\"\n\"line 1\\n\"\n\"line 2\"\n\nmsgid \"c\"\nmsgstr \"C\"\n"
        );
    }

    #[test]
    fn keeps_crlf_line_endings() {
        let text = "msgid \"a\"\r\nmsgstr \"\"\r\n";
        let translations = HashMap::from([("a".to_string(), "A".to_string())]);
        assert_eq!(
            apply_translations(text, &translations),
            "msgid \"a\"\r\nmsgstr \"A\"\r\n"
        );
    }

    #[test]
    fn appended_entries_follow_crlf_files() {
        let text = "msgid \"a\"\r\nmsgstr \"A\"\r\n";
        let appended = append_entries(
            text,
            &[Entry::new("b", "").with_comments(vec!["#: app.py:2".to_string()])],
        );
        assert_eq!(
            appended,
            "msgid \"a\"\r\nmsgstr \"A\"\r\n\r\n#: app.py:2\r\nmsgid \"b\"\r\nmsgstr \"\"\r\n"
        );

        let translations = HashMap::from([("b".to_string(), "es:b".to_string())]);
        let synced = apply_translations(&appended, &translations);
        assert!(synced.ends_with("msgid \"b\"\r\nmsgstr \"es:b\"\r\n"));
        assert!(!synced.replace("\r\n", "").contains('\n'));
    }

    #[test]
    fn entry_without_msgstr_is_appended_again() {
        let target = Catalog::parse("msgid \"a\"\n\nmsgid \"b\"\nmsgstr \"B\"\n");
        let template = Catalog::parse("msgid \"a\"\nmsgstr \"\"\n\nmsgid \"b\"\nmsgstr \"\"\n");
        let plan = plan(&template, &target);
        assert_eq!(keys(&plan.to_add), vec!["a"]);
        assert_eq!(plan.to_translate, vec!["a"]);
    }

    #[test]
    fn translation_at_end_of_file_without_newline() {
        let text = "msgid \"a\"\nmsgstr \"\"";
        let translations = HashMap::from([("a".to_string(), "A".to_string())]);
        assert_eq!(apply_translations(text, &translations), "msgid \"a\"\nmsgstr \"A\"\n");
    }

    #[test]
    fn second_plan_after_full_sync_is_empty() {
        let template = Catalog::parse(TEMPLATE);
        let first = plan(&template, &Catalog::parse(TARGET));
        let appended = append_entries(TARGET, &first.to_add);
        let translations = first
            .to_translate
            .iter()
            .map(|key| (key.clone(), key.to_uppercase()))
            .collect::<HashMap<_, _>>();
        let synced = apply_translations(&appended, &translations);

        let second = plan(&template, &Catalog::parse(&synced));
        assert!(second.is_empty(), "{:?}", second);
    }
}
