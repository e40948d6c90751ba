//! Comma-separated value helpers.
//!
//! Several records store short lists as one CSV column (application
//! features, violation bundle names). Values containing a comma or a
//! double quote are quoted; everything else is written bare.

/// Joins values into a CSV string. Returns `None` for an empty list.
#[must_use]
pub fn list_to_csv<S: AsRef<str>>(values: &[S]) -> Option<String> {
    if values.is_empty() {
        return None;
    }
    let joined = values
        .iter()
        .map(|v| quote(v.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    Some(joined)
}

/// Splits a CSV string into trimmed values, skipping empty pieces.
#[must_use]
pub fn csv_to_list(src: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = src.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if current.trim().is_empty() => {
                current.clear();
                in_quotes = true;
            }
            ',' if !in_quotes => {
                push_trimmed(&mut values, &current);
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    push_trimmed(&mut values, &current);
    values
}

fn push_trimmed(values: &mut Vec<String>, piece: &str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        values.push(piece.to_string());
    }
}

fn quote(value: &str) -> String {
    if value.contains(',') || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
