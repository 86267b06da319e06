use std::fmt;
use std::path::Path;

use crate::SetupError;
use crate::catalog::Catalog;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageCode(String);

impl LanguageCode {
    pub fn parse(raw: &str) -> Result<Self, SetupError> {
        let code = raw.trim();
        if code.len() != 2 || !code.chars().all(|ch| ch.is_ascii_alphabetic()) {
            return Err(SetupError::InvalidLanguageCode(raw.to_string()));
        }
        Ok(Self(code.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn target_language(path: &Path, domain: &str, catalog: &Catalog) -> Option<String> {
    if let Some(language) = catalog.language() {
        return Some(language.to_string());
    }
    let file_name = path.file_name()?.to_str()?;
    let lang = file_name
        .strip_prefix(domain)
        .and_then(|rest| rest.strip_prefix('_'))
        .or_else(|| file_name.rsplit_once('_').map(|(_, lang)| lang))?
        .strip_suffix(".po")?;
    if lang.is_empty() {
        None
    } else {
        Some(lang.to_string())
    }
}
