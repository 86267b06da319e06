use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use time::{OffsetDateTime, format_description};

use crate::catalog::header::{self, LANGUAGE, LANGUAGE_TEAM, PO_REVISION_DATE};
use crate::languages::LanguageCode;
use crate::SetupError;

const REVISION_DATE_FORMAT: &str =
    "[year]-[month]-[day] [hour]:[minute][offset_hour sign:mandatory][offset_minute]";

pub fn clone_template(template_text: &str, language: &LanguageCode, revision_date: &str) -> String {
    let updates = [
        (LANGUAGE, language.as_str().to_string()),
        (LANGUAGE_TEAM, language.as_str().to_uppercase()),
        (PO_REVISION_DATE, revision_date.to_string()),
    ];
    header::rewrite_fields(template_text, &updates, false)
        .unwrap_or_else(|| template_text.to_string())
}

pub fn create_language_file(
    template: &Path,
    destination: &Path,
    language: &LanguageCode,
    now: OffsetDateTime,
) -> Result<()> {
    if destination.exists() {
        return Err(SetupError::DestinationExists(destination.to_path_buf()).into());
    }
    let template_text = std::fs::read_to_string(template)
        .with_context(|| format!("failed to read template: {}", template.display()))?;
    let content = clone_template(&template_text, language, &format_revision_date(now)?);

    let mut file = match OpenOptions::new().write(true).create_new(true).open(destination) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            return Err(SetupError::DestinationExists(destination.to_path_buf()).into());
        }
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to create {}", destination.display()));
        }
    };
    file.write_all(content.as_bytes())
        .with_context(|| format!("failed to write {}", destination.display()))?;
    Ok(())
}

pub fn format_revision_date(now: OffsetDateTime) -> Result<String> {
    let format = format_description::parse(REVISION_DATE_FORMAT)
        .with_context(|| "invalid revision date format")?;
    now.format(&format)
        .with_context(|| "failed to format revision date")
}

pub fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}
