use std::collections::HashMap;

use crate::catalog::Catalog;
use crate::catalog::write::push_entry;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewritePlan {
    header_block: Vec<String>,
    existing: HashMap<String, String>,
    pub to_translate: Vec<String>,
    pub removed: usize,
}

impl RewritePlan {
    pub fn existing_translation(&self, key: &str) -> Option<&str> {
        self.existing.get(key).map(String::as_str)
    }
}

pub fn plan(template: &Catalog, target_text: &str) -> RewritePlan {
    let target = Catalog::parse(target_text);
    let existing: HashMap<String, String> = target
        .entries()
        .iter()
        .map(|entry| (entry.key.clone(), entry.translation.clone()))
        .collect();

    let to_translate = template
        .entries()
        .iter()
        .filter(|entry| existing.get(&entry.key).is_none_or(|value| value.is_empty()))
        .map(|entry| entry.key.clone())
        .collect();
    let removed = existing.keys().filter(|key| !template.contains(key)).count();

    RewritePlan {
        header_block: header_block(target_text, &target),
        existing,
        to_translate,
        removed,
    }
}

pub fn render(
    template: &Catalog,
    plan: &RewritePlan,
    translations: &HashMap<String, String>,
) -> String {
    let mut out = String::new();
    for line in &plan.header_block {
        out.push_str(line);
        out.push('\n');
    }
    for entry in template.entries() {
        if !out.is_empty() {
            out.push('\n');
        }
        let translation = translations
            .get(&entry.key)
            .map(String::as_str)
            .or_else(|| plan.existing_translation(&entry.key))
            .unwrap_or("");
        push_entry(&mut out, &entry.comments, &entry.key, translation);
    }
    out
}

fn header_block(text: &str, target: &Catalog) -> Vec<String> {
    let Some(header) = target.header() else {
        return Vec::new();
    };
    let lines: Vec<&str> = text.lines().collect();

    let mut end = header.span.end;
    while end < lines.len() && lines[end].trim().starts_with('"') {
        end += 1;
    }

    let preceded_by_entry = target
        .entries()
        .iter()
        .any(|entry| entry.span.start < header.span.start);
    if preceded_by_entry {
        header
            .comments
            .iter()
            .cloned()
            .chain(lines[header.span.start..end].iter().map(|line| line.to_string()))
            .collect()
    } else {
        lines[..end].iter().map(|line| line.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = "msgid \"\"\nmsgstr \"\"\n\"Language: en\\n\"\n\n#: src/a.rs:1\nmsgid \"a\"\nmsgstr \"\"\n\n#: src/b.rs:2\nmsgid \"b\"\nmsgstr \"\"\n\n#: src/c.rs:3\nmsgid \"c\"\nmsgstr \"\"\n";

    const TARGET: &str = "# Spanish translation\nmsgid \"\"\nmsgstr \"\"\n\"Language: es\\n\"\n\"PO-Revision-Date: 2024-01-01 10:00+0000\\n\"\n\n# old note\n#: old/c.rs:9\nmsgid \"c\"\nmsgstr \"\"\n\nmsgid \"a\"\nmsgstr \"A-es\"\n\nmsgid \"old\"\nmsgstr \"Viejo\"\n";

    #[test]
    fn plan_reports_gaps_and_removals() {
        let template = Catalog::parse(TEMPLATE);
        let plan = plan(&template, TARGET);
        assert_eq!(plan.to_translate, vec!["b", "c"]);
        assert_eq!(plan.removed, 1);
        assert_eq!(plan.existing_translation("a"), Some("A-es"));
    }

    #[test]
    fn render_uses_template_order_and_comments() {
        let template = Catalog::parse(TEMPLATE);
        let plan = plan(&template, TARGET);
        let translations = HashMap::from([("c".to_string(), "C-es".to_string())]);
        let output = render(&template, &plan, &translations);

        insta::assert_snapshot!(output, @r##"
        # Spanish translation
        msgid ""
        msgstr ""
        "Language: es\n"
        "PO-Revision-Date: 2024-01-01 10:00+0000\n"

        #: src/a.rs:1
        msgid "a"
        msgstr "A-es"

        #: src/b.rs:2
        msgid "b"
        msgstr ""

        #: src/c.rs:3
        msgid "c"
        msgstr "C-es"
        "##);

        let keys: Vec<String> = Catalog::parse(&output)
            .entries()
            .iter()
            .map(|entry| entry.key.clone())
            .collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn header_block_ends_with_header_literals() {
        let text = "msgid \"\"\nmsgstr \"\"\n\"Language: de\\n\"\n# translator comment\n\n#: x\nmsgid \"a\"\nmsgstr \"\"\n";
        let target = Catalog::parse(text);
        assert_eq!(
            header_block(text, &target),
            vec![
                "msgid \"\"".to_string(),
                "msgstr \"\"".to_string(),
                "\"Language: de\\n\"".to_string(),
            ]
        );

        let template = Catalog::parse("#: x\nmsgid \"a\"\nmsgstr \"\"\n");
        let first = plan(&template, text);
        let output = render(&template, &first, &HashMap::new());
        assert_eq!(
            output,
            "msgid \"\"\nmsgstr \"\"\n\"Language: de\\n\"\n\n#: x\nmsgid \"a\"\nmsgstr \"\"\n"
        );
        assert_eq!(render(&template, &plan(&template, &output), &HashMap::new()), output);
    }

    #[test]
    fn target_without_header_renders_entries_only() {
        let template = Catalog::parse("msgid \"a\"\nmsgstr \"\"\n");
        let plan = plan(&template, "msgid \"a\"\nmsgstr \"x\"\n");
        assert_eq!(render(&template, &plan, &HashMap::new()), "msgid \"a\"\nmsgstr \"x\"\n");
    }
}
