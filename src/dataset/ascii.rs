//! Parser for the ASCII data responses (`.ascii?{constraint}`) of a GrADS Data Server.
//!
//! A response is a sequence of sections, each introduced by a header naming the
//! variable and its shape, followed by the values in row-major order. Rows of
//! multi-dimensional arrays carry their leading indices:
//!
//! ```text
//! tmp2m, [3][1][1]
//! [0][0], 300.1
//! [1][0], 299.2
//! [2][0], 298.7
//!
//!
//! time, [3]
//! 738918.0, 738918.0416666667, 738918.0833333333
//! ```

use crate::dataset::error::DatasetError;

#[derive(Debug, Clone, PartialEq)]
pub struct AsciiSection {
    pub name: String,
    pub shape: Vec<usize>,
    pub values: Vec<f64>,
}

/// Splits an ASCII response into its sections.
///
/// # Errors
///
/// Returns [`DatasetError::MalformedResponse`] when a value cannot be parsed, when
/// values appear before any section header, when a section's value count does not
/// match its declared shape, or when the response contains no section at all.
pub fn parse_ascii(text: &str, url: &str) -> Result<Vec<AsciiSection>, DatasetError> {
    let malformed = |message: String| DatasetError::MalformedResponse {
        url: url.to_string(),
        message,
    };

    let mut sections: Vec<AsciiSection> = Vec::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line.starts_with("Dataset:") || line.chars().all(|c| c == '-') {
            continue;
        }
        if let Some((name, shape)) = parse_header(line) {
            sections.push(AsciiSection {
                name,
                shape,
                values: Vec::new(),
            });
            continue;
        }

        let section = sections
            .last_mut()
            .ok_or_else(|| malformed(format!("values before any section header: '{line}'")))?;
        let values = if line.starts_with('[') {
            line.split_once(',')
                .map(|(_, values)| values)
                .ok_or_else(|| malformed(format!("row without values: '{line}'")))?
        } else {
            line
        };
        for token in values.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let value = token
                .parse::<f64>()
                .map_err(|_| malformed(format!("'{}' in section '{}' is not a number", token, section.name)))?;
            section.values.push(value);
        }
    }

    if sections.is_empty() {
        return Err(malformed("no data sections".into()));
    }
    for section in &sections {
        let expected: usize = section.shape.iter().product();
        if section.values.len() != expected {
            return Err(malformed(format!(
                "section '{}' declares {} values but holds {}",
                section.name,
                expected,
                section.values.len()
            )));
        }
    }
    Ok(sections)
}

/// Recognises `tmp2m, [3][1][1]` and returns the name and shape.
fn parse_header(line: &str) -> Option<(String, Vec<usize>)> {
    let (name, rest) = line.split_once(',')?;
    let name = name.trim();
    // `grid.tmp2m` style names keep only the last component
    let name = name.rsplit('.').next().unwrap_or(name);
    let first = name.chars().next()?;
    if !(first.is_ascii_alphabetic() || first == '_')
        || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return None;
    }

    let rest = rest.trim();
    if !rest.starts_with('[') || !rest.ends_with(']') {
        return None;
    }
    let shape = rest[1..rest.len() - 1]
        .split("][")
        .map(|size| size.trim().parse::<usize>().ok())
        .collect::<Option<Vec<_>>>()?;
    Some((name.to_string(), shape))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point_series_with_maps() {
        let text = "tmp2m, [3][1][1]
[0][0], 300.1
[1][0], 299.2
[2][0], 9.999E20


time, [3]
738918.0, 738918.0416666667, 738918.0833333333
lat, [1]
-6.25
lon, [1]
106.75
";
        let sections = parse_ascii(text, "test").unwrap();
        assert_eq!(sections.len(), 4);
        assert_eq!(sections[0].name, "tmp2m");
        assert_eq!(sections[0].shape, vec![3, 1, 1]);
        assert_eq!(sections[0].values, vec![300.1, 299.2, 9.999e20]);
        assert_eq!(sections[1].name, "time");
        assert_eq!(sections[1].values.len(), 3);
        assert_eq!(sections[2].values, vec![-6.25]);
        assert_eq!(sections[3].values, vec![106.75]);
    }

    #[test]
    fn test_parse_multi_column_rows() {
        let text = "ugrd10m, [2][1][3]\n[0][0], 1.0, 2.0, 3.0\n[1][0], 4.0, 5.0, 6.0\n";
        let sections = parse_ascii(text, "test").unwrap();
        assert_eq!(sections[0].values, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_parse_coordinate_axis() {
        let sections = parse_ascii("lat, [4]\n-90.0, -89.75, -89.5, -89.25\n", "test").unwrap();
        assert_eq!(sections[0].values, vec![-90.0, -89.75, -89.5, -89.25]);
    }

    #[test]
    fn test_rejects_malformed_responses() {
        for text in [
            "",
            "300.1, 299.2",
            "tmp2m, [2]\n300.1, abc\n",
            "tmp2m, [3]\n300.1, 299.2\n",
            "tmp2m, [1][1]\n[0]\n",
        ] {
            assert!(
                matches!(
                    parse_ascii(text, "test"),
                    Err(DatasetError::MalformedResponse { .. })
                ),
                "expected rejection of {text:?}"
            );
        }
    }
}
