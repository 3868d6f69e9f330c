use crate::error::BotError;
use crate::Result;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Name of the header column holding ticker symbols.
const SYMBOL_COLUMN: &str = "Symbol";

/// Split one CSV record into fields, honoring RFC-4180 quoting.
///
/// Constituents files carry company names like `"Apple, Inc."`; a bare
/// split on `,` would shift every column after such a field.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                // Doubled quote inside a quoted field is a literal quote.
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

/// Load ticker symbols from the constituents CSV file.
///
/// The file must have a header row containing a `Symbol` column (any
/// position). Rows contribute that column's value verbatim: no syntax
/// validation, duplicates pass through, order is preserved.
pub fn load_symbols(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|e| {
        BotError::Configuration(format!("cannot read symbol file {}: {}", path.display(), e))
    })?;
    let mut lines = BufReader::new(file).lines();

    let header = match lines.next() {
        Some(line) => line.map_err(|e| BotError::Parse(format!("reading header: {}", e)))?,
        None => return Err(BotError::Parse("symbol file is empty".to_string())),
    };

    let columns = split_fields(&header);
    tracing::debug!("symbol file columns: {}", columns.join(", "));

    let symbol_idx = columns
        .iter()
        .position(|c| c.trim() == SYMBOL_COLUMN)
        .ok_or_else(|| {
            BotError::Parse(format!(
                "symbol file has no '{}' column (found: {})",
                SYMBOL_COLUMN,
                columns.join(", ")
            ))
        })?;

    let mut symbols = Vec::new();
    for line in lines {
        let line = line.map_err(|e| BotError::Parse(format!("reading row: {}", e)))?;
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_fields(&line);
        match fields.get(symbol_idx) {
            Some(field) => symbols.push(field.trim().to_string()),
            None => {
                return Err(BotError::Parse(format!(
                    "row has {} fields, expected at least {}",
                    fields.len(),
                    symbol_idx + 1
                )))
            }
        }
    }

    tracing::debug!("loaded {} symbols", symbols.len());
    Ok(symbols)
}
