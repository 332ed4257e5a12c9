// src/record/matrix.rs

use serde_json::{Map, Value};

/// Parse raw delimited text into rows of fields.
///
/// Comma-separated, double-quote escaped (`""` inside a quoted field is a
/// literal quote), newlines allowed inside quotes, `\r` dropped outside them.
/// An unterminated quote consumes the rest of the input rather than erroring;
/// feeds in the wild contain enough sloppy quoting that best-effort beats
/// rejection here.
pub fn parse_matrix(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(ch);
            }
        } else {
            match ch {
                '"' => in_quotes = true,
                ',' => row.push(std::mem::take(&mut field)),
                '\r' => {}
                '\n' => {
                    row.push(std::mem::take(&mut field));
                    rows.push(std::mem::take(&mut row));
                }
                _ => field.push(ch),
            }
        }
    }
    row.push(field);
    rows.push(row);
    rows
}

/// Convert delimited text into header-keyed records, one per data row.
/// The first row is the header; blank header cells become `col_{index}`.
/// Rows that are a single empty field (trailing blank lines) are skipped,
/// short rows are padded with empty strings, and cells beyond the header
/// width are dropped.
pub fn rows_to_records(text: &str) -> Vec<Map<String, Value>> {
    let mut rows: Vec<Vec<String>> = parse_matrix(text)
        .into_iter()
        .filter(|r| !(r.len() == 1 && r[0].trim().is_empty()))
        .collect();
    if rows.is_empty() {
        return Vec::new();
    }

    let header: Vec<String> = rows
        .remove(0)
        .iter()
        .enumerate()
        .map(|(c, h)| {
            let h = h.trim();
            if h.is_empty() {
                format!("col_{c}")
            } else {
                h.to_string()
            }
        })
        .collect();

    rows.into_iter()
        .map(|vals| {
            let mut record = Map::new();
            for (c, key) in header.iter().enumerate() {
                let value = vals.get(c).cloned().unwrap_or_default();
                record.insert(key.clone(), Value::String(value));
            }
            record
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quotes_embedded_newlines_and_escapes() {
        let text = "a,b,c\n\"1,5\",\"say \"\"hi\"\"\",\"line\nbreak\"\n";
        let rows = parse_matrix(text);
        assert_eq!(rows[0], vec!["a", "b", "c"]);
        assert_eq!(rows[1], vec!["1,5", "say \"hi\"", "line\nbreak"]);
    }

    #[test]
    fn unterminated_quote_consumes_rest_of_input() {
        let rows = parse_matrix("a,\"never closed\nstill,the,same,field");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], vec!["a", "never closed\nstill,the,same,field"]);
    }

    #[test]
    fn records_pad_short_rows_and_skip_trailing_blank_line() {
        let text = "Name,City,Zip\nAlice,Springfield\n\n";
        let records = rows_to_records(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["Name"], "Alice");
        assert_eq!(records[0]["City"], "Springfield");
        assert_eq!(records[0]["Zip"], "");
    }

    #[test]
    fn blank_header_cells_get_positional_names() {
        let records = rows_to_records("a,,c\n1,2,3\n");
        assert_eq!(records[0]["col_1"], "2");
    }
}
