use std::io::Read;

use serde::{Deserialize, Deserializer};

use super::package::LineItem;

/// Error raised while reading cart lines from CSV.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read cart lines: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: {message}")]
    InvalidLine { line: usize, message: String },
}

/// Read cart lines from CSV with `quantity,line_subtotal,weight,virtual,shipping_class`
/// headers. Cells are trimmed and empty cells count as absent.
pub fn read_line_items<R: Read>(reader: R) -> Result<Vec<LineItem>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut items = Vec::new();

    for (offset, record) in csv_reader.deserialize::<LineRow>().enumerate() {
        let row = record?;
        // Header is line 1.
        items.push(row.into_item(offset + 2)?);
    }

    Ok(items)
}

#[derive(Debug, Deserialize)]
struct LineRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    quantity: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    line_subtotal: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    weight: Option<String>,
    #[serde(default, rename = "virtual", deserialize_with = "empty_string_as_none")]
    is_virtual: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    shipping_class: Option<String>,
}

impl LineRow {
    fn into_item(self, line: usize) -> Result<LineItem, ImportError> {
        let quantity = match self.quantity.as_deref() {
            Some(raw) => raw.parse::<i64>().map_err(|_| ImportError::InvalidLine {
                line,
                message: format!("quantity '{raw}' is not a whole number"),
            })?,
            None => 1,
        };

        Ok(LineItem {
            quantity,
            line_subtotal: parse_decimal(line, "line_subtotal", self.line_subtotal.as_deref())?
                .unwrap_or(0.0),
            weight: parse_decimal(line, "weight", self.weight.as_deref())?,
            is_virtual: parse_flag(self.is_virtual.as_deref()),
            shipping_class: self.shipping_class,
        })
    }
}

fn parse_decimal(line: usize, field: &str, raw: Option<&str>) -> Result<Option<f64>, ImportError> {
    raw.map(|raw| {
        raw.parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| ImportError::InvalidLine {
                line,
                message: format!("{field} '{raw}' is not a number"),
            })
    })
    .transpose()
}

fn parse_flag(raw: Option<&str>) -> bool {
    matches!(
        raw.map(|value| value.to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes" | "y")
    )
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|raw| !raw.trim().is_empty()))
}
