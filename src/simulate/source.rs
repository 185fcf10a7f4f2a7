// source.rs - review text inputs for the simulator
use super::SimulationError;
use std::fs;
use std::path::Path;

pub const CSV_PRODUCT_COLUMN: &str = "product_id";
pub const CSV_REVIEW_COLUMN: &str = "review_body";

/// One review per non-blank line, trimmed, at most `limit` of them
pub fn load_lines(path: &Path, limit: Option<usize>) -> Result<Vec<String>, SimulationError> {
    let text = fs::read_to_string(path)?;
    let lines = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string);

    Ok(match limit {
        Some(limit) => lines.take(limit).collect(),
        None => lines.collect(),
    })
}

/// Review bodies from a review export, keeping rows for `product_id` only
pub fn load_csv(path: &Path, product_id: &str) -> Result<Vec<String>, SimulationError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| SimulationError::MissingColumn(name.to_string()))
    };
    let product_col = column(CSV_PRODUCT_COLUMN)?;
    let review_col = column(CSV_REVIEW_COLUMN)?;

    let mut reviews = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.get(product_col) != Some(product_id) {
            continue;
        }
        match record.get(review_col) {
            Some(body) if !body.trim().is_empty() => reviews.push(body.to_string()),
            _ => {}
        }
    }

    Ok(reviews)
}
