use super::escape::encode;

pub(crate) fn push_field(out: &mut String, keyword: &str, text: &str) {
    if !text.contains('\n') {
        out.push_str(&format!("{} \"{}\"\n", keyword, encode(text)));
        return;
    }
    out.push_str(keyword);
    out.push_str(" \"\"\n");
    for part in text.split_inclusive('\n') {
        out.push_str(&format!("\"{}\"\n", encode(part)));
    }
}

pub(crate) fn push_entry(out: &mut String, comments: &[String], key: &str, translation: &str) {
    for comment in comments {
        out.push_str(comment);
        out.push('\n');
    }
    push_field(out, "msgid", key);
    push_field(out, "msgstr", translation);
}

pub(crate) fn line_ending(line: &str) -> &'static str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else if line.ends_with('\n') {
        "\n"
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn single_line_field() {
        let mut out = String::new();
        push_field(&mut out, "msgid", "Say \"hi\"");
        assert_eq!(out, "msgid \"Say \\\"hi\\\"\"\n");
    }

    #[test]
    fn multi_line_field_splits_after_each_newline() {
        let mut out = String::new();
        push_field(&mut out, "msgstr", "one\ntwo\n");
        assert_eq!(out, "msgstr \"\"\n\"one\\n\"\n\"two\\n\"\n");

        let mut out = String::new();
        push_field(&mut out, "msgstr", "one\ntwo");
        assert_eq!(out, "msgstr \"\"\n\"one\\n\"\n\"two\"\n");
    }

    #[test]
    fn rendered_entry_parses_back() {
        let mut out = String::new();
        let comments = vec!["#: app.py:5".to_string()];
        push_entry(&mut out, &comments, "Line one\nLine two", "Zeile\teins\nZeile zwei");
        let catalog = Catalog::parse(&out);
        let entry = catalog.get("Line one\nLine two").expect("entry");
        assert_eq!(entry.translation, "Zeile\teins\nZeile zwei");
        assert_eq!(entry.comments, comments);
    }

    #[test]
    fn detects_line_endings() {
        assert_eq!(line_ending("a\r\n"), "\r\n");
        assert_eq!(line_ending("a\n"), "\n");
        assert_eq!(line_ending("a"), "");
    }
}
