//! Parser for the Dataset Attribute Structure (`.das`).
//!
//! The extractor reads two kinds of attributes from it: the `units` of the time
//! axis, and the `_FillValue` / `missing_value` of each forecast variable.

use crate::dataset::error::DatasetError;
use log::debug;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Number(f64),
    Text(String),
}

/// Attributes grouped by the container (usually a variable name) they belong to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetAttributes {
    containers: HashMap<String, HashMap<String, AttributeValue>>,
}

impl DatasetAttributes {
    /// Parses a DAS document. Lines that are not attribute declarations, such as the
    /// continuation of a multi-line string, are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::MalformedResponse`] if the document does not start with
    /// an `Attributes` block.
    pub fn parse(text: &str, url: &str) -> Result<Self, DatasetError> {
        if !text.trim_start().starts_with("Attributes") {
            return Err(DatasetError::MalformedResponse {
                url: url.to_string(),
                message: "expected a DAS document starting with 'Attributes'".into(),
            });
        }

        let mut attributes = DatasetAttributes::default();
        let mut containers: Vec<String> = Vec::new();

        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if let Some(name) = line.strip_suffix('{') {
                containers.push(name.trim().to_string());
                continue;
            }
            if line.starts_with('}') {
                containers.pop();
                continue;
            }
            let Some(container) = containers.last() else {
                continue;
            };
            match parse_attribute(line) {
                Some((name, value)) => {
                    attributes
                        .containers
                        .entry(container.clone())
                        .or_default()
                        .insert(name, value);
                }
                None => debug!("Skipping unreadable DAS line in {}: {}", url, line),
            }
        }

        Ok(attributes)
    }

    pub fn get(&self, container: &str, attribute: &str) -> Option<&AttributeValue> {
        self.containers.get(container)?.get(attribute)
    }

    pub fn text(&self, container: &str, attribute: &str) -> Option<&str> {
        match self.get(container, attribute)? {
            AttributeValue::Text(text) => Some(text),
            AttributeValue::Number(_) => None,
        }
    }

    pub fn number(&self, container: &str, attribute: &str) -> Option<f64> {
        match self.get(container, attribute)? {
            AttributeValue::Number(value) => Some(*value),
            AttributeValue::Text(text) => text.trim().parse().ok(),
        }
    }

    /// The value marking missing data for `variable`, from `_FillValue` or, failing
    /// that, `missing_value`.
    pub fn fill_value(&self, variable: &str) -> Option<f64> {
        self.number(variable, "_FillValue")
            .or_else(|| self.number(variable, "missing_value"))
    }
}

/// Parses `Float32 missing_value 9.999E20;` or `String units "days since 1-1-1";`.
fn parse_attribute(line: &str) -> Option<(String, AttributeValue)> {
    let declaration = line.strip_suffix(';')?.trim();
    let (data_type, rest) = declaration.split_once(char::is_whitespace)?;
    let (name, raw_value) = rest.trim().split_once(char::is_whitespace)?;
    let raw_value = raw_value.trim();

    let value = match data_type {
        "String" | "Url" => AttributeValue::Text(unquote(raw_value).to_string()),
        _ => {
            // numeric attributes may hold a list; only the first element is kept
            let first = raw_value.split(',').next().unwrap_or(raw_value).trim();
            first
                .parse()
                .map(AttributeValue::Number)
                .unwrap_or_else(|_| AttributeValue::Text(raw_value.to_string()))
        }
    };
    Some((name.to_string(), value))
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
