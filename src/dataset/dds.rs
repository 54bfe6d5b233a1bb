//! Parser for the Dataset Descriptor Structure (`.dds`) returned by a GrADS Data Server.
//!
//! Only the parts the point extractor needs are kept: each variable's name, data
//! type, and named dimensions with their sizes. A GDS schema for the hourly GFS
//! product looks like this:
//!
//! ```text
//! Dataset {
//!     Float64 time[time = 121];
//!     Float64 lat[lat = 721];
//!     Float64 lon[lon = 1440];
//!     Grid {
//!      ARRAY:
//!         Float32 tmp2m[time = 121][lat = 721][lon = 1440];
//!      MAPS:
//!         Float64 time[time = 121];
//!         Float64 lat[lat = 721];
//!         Float64 lon[lon = 1440];
//!     } tmp2m;
//! } gfs_0p25_1hr_00z;
//! ```

use crate::dataset::error::DatasetError;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    pub name: String,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableShape {
    /// DAP atomic type, e.g. `Float32`.
    pub data_type: String,
    pub dimensions: Vec<Dimension>,
}

impl VariableShape {
    /// Total number of values in the variable.
    pub fn len(&self) -> usize {
        self.dimensions.iter().map(|d| d.size).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The variables declared by a dataset, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetSchema {
    pub name: Option<String>,
    variables: BTreeMap<String, VariableShape>,
}

impl DatasetSchema {
    /// Parses a DDS document. `url` is only used for error reporting.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::MalformedResponse`] if the document is not a DDS,
    /// has unbalanced braces, contains an unreadable declaration, or declares
    /// no variables.
    pub fn parse(text: &str, url: &str) -> Result<Self, DatasetError> {
        let malformed = |message: String| DatasetError::MalformedResponse {
            url: url.to_string(),
            message,
        };

        if !text.trim_start().starts_with("Dataset") {
            return Err(malformed("expected a DDS document starting with 'Dataset'".into()));
        }

        let mut schema = DatasetSchema::default();
        let mut depth: usize = 0;

        for (line_no, raw_line) in text.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.ends_with(':') {
                // blank lines and the ARRAY: / MAPS: markers of a Grid
                continue;
            }
            if line.ends_with('{') {
                depth += 1;
                continue;
            }
            if let Some(rest) = line.strip_prefix('}') {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| malformed(format!("unexpected '}}' on line {}", line_no + 1)))?;
                if depth == 0 {
                    let name = rest.trim().trim_end_matches(';').trim();
                    if !name.is_empty() {
                        schema.name = Some(name.to_string());
                    }
                }
                continue;
            }

            let (name, shape) = parse_declaration(line).ok_or_else(|| {
                malformed(format!("unreadable declaration on line {}: '{}'", line_no + 1, line))
            })?;
            // A Grid's ARRAY comes before its MAPS, and the maps repeat the
            // top-level coordinate declarations, so the first declaration wins.
            schema.variables.entry(name).or_insert(shape);
        }

        if depth != 0 {
            return Err(malformed("unbalanced braces".into()));
        }
        if schema.variables.is_empty() {
            return Err(malformed("no variables declared".into()));
        }
        Ok(schema)
    }

    pub fn variable(&self, name: &str) -> Option<&VariableShape> {
        self.variables.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }
}

/// Parses `Float32 tmp2m[time = 121][lat = 721][lon = 1440];`.
fn parse_declaration(line: &str) -> Option<(String, VariableShape)> {
    let declaration = line.strip_suffix(';')?.trim();
    let (data_type, rest) = declaration.split_once(char::is_whitespace)?;
    let rest = rest.trim();

    let name_end = rest.find('[').unwrap_or(rest.len());
    let name = rest[..name_end].trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return None;
    }

    let mut dimensions = Vec::new();
    let mut remaining = &rest[name_end..];
    while let Some(open) = remaining.find('[') {
        let close = remaining[open..].find(']')? + open;
        let inner = &remaining[open + 1..close];
        let dimension = match inner.split_once('=') {
            Some((dim_name, size)) => Dimension {
                name: dim_name.trim().to_string(),
                size: size.trim().parse().ok()?,
            },
            None => Dimension {
                name: format!("dim_{}", dimensions.len()),
                size: inner.trim().parse().ok()?,
            },
        };
        dimensions.push(dimension);
        remaining = &remaining[close + 1..];
    }
    if !remaining.trim().is_empty() {
        return None;
    }

    Some((
        name.to_string(),
        VariableShape {
            data_type: data_type.to_string(),
            dimensions,
        },
    ))
}
