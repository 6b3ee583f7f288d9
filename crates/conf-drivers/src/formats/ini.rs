//! INI driver
//!
//! `[section]` headers name categories. Entries are `key = value` or
//! `key: value`; lines starting with `;` or `#` are comments and indented
//! lines continue the previous value.

use super::text_rows;
use crate::driver::Driver;
use crate::{Error, Result};
use conf_model::{Configuration, Layer, Value};
use indexmap::IndexMap;

/// Driver for INI resources.
#[derive(Debug, Default)]
pub struct IniDriver;

impl IniDriver {
    pub fn new() -> Self {
        Self
    }
}

impl Driver for IniDriver {
    fn name(&self) -> &str {
        "INI"
    }

    fn extensions(&self) -> &[&str] {
        &["ini", "cfg", "conf"]
    }

    fn parse(&self, layer_name: &str, text: &str) -> Result<Layer> {
        let mut sections: IndexMap<String, Vec<(String, Value)>> = IndexMap::new();
        let mut current: Option<String> = None;
        let mut continuable = false;

        for (index, line) in text.lines().enumerate() {
            let lineno = index + 1;
            let trimmed = line.trim();

            if trimmed.is_empty() {
                continuable = false;
                continue;
            }
            if trimmed.starts_with(';') || trimmed.starts_with('#') {
                continue;
            }

            if line.starts_with(char::is_whitespace) && continuable {
                if let Some((_, Value::Str(value))) = current
                    .as_ref()
                    .and_then(|section| sections.get_mut(section))
                    .and_then(|pairs| pairs.last_mut())
                {
                    value.push('\n');
                    value.push_str(trimmed);
                    continue;
                }
            }

            if let Some(header) = trimmed.strip_prefix('[') {
                let name = header
                    .strip_suffix(']')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .ok_or_else(|| syntax(lineno, "malformed section header"))?;
                sections.entry(name.to_string()).or_default();
                current = Some(name.to_string());
                continuable = false;
                continue;
            }

            let section = current
                .as_ref()
                .ok_or_else(|| syntax(lineno, "entry outside of a section"))?;
            let (key, value) =
                split_entry(trimmed).ok_or_else(|| syntax(lineno, "expected key = value"))?;
            if key.is_empty() {
                return Err(syntax(lineno, "empty key"));
            }
            if let Some(pairs) = sections.get_mut(section) {
                pairs.push((key.to_string(), Value::Str(value.to_string())));
            }
            continuable = true;
        }

        let mut layer = Layer::new(layer_name);
        for (section, pairs) in sections {
            layer.push_category(&section, pairs)?;
        }
        Ok(layer)
    }

    fn render(&self, conf: &Configuration) -> Result<String> {
        let mut out = String::new();
        for (index, (category, rows)) in text_rows(conf).into_iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            out.push_str(&format!("[{}]\n", category));
            for (key, text) in rows {
                let text = text.replace('\n', "\n    ");
                out.push_str(&format!("{} = {}\n", key, text));
            }
        }
        Ok(out)
    }
}

/// Split on whichever comes first of `=` and a `:` not part of `::`.
fn split_entry(line: &str) -> Option<(&str, &str)> {
    let bytes = line.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b':' if bytes.get(i + 1) == Some(&b':') => {
                i += 2;
                continue;
            }
            b'=' | b':' => return Some((line[..i].trim(), line[i + 1..].trim())),
            _ => {}
        }
        i += 1;
    }
    None
}

fn syntax(lineno: usize, message: &str) -> Error {
    Error::parse("INI", format!("line {}: {}", lineno, message))
}
