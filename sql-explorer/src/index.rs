//! Index column resolution
//!
//! The backend only hands out the raw `CREATE INDEX` text of an index, so the
//! covered columns are recovered by scanning that text.
//!
//! ## Limitations
//!
//! This is a text scan, not a SQL parser. It assumes every indexed column is
//! double-quoted, in declaration order, after the quoted table name. Unquoted
//! identifiers, expressions and function calls yield an empty or partial
//! list; callers render that as blank.

/// Extract the ordered column names covered by an index definition
///
/// Returns an empty list when `definition_sql` is empty, when the quoted
/// table name does not occur in it, or when no quoted column follows.
///
/// # Example
///
/// ```
/// use sql_explorer::resolve_index_columns;
///
/// let columns = resolve_index_columns("users", r#"CREATE INDEX idx ON "users" ("id", "email")"#);
/// assert_eq!(columns, vec!["id", "email"]);
/// ```
pub fn resolve_index_columns(table_name: &str, definition_sql: &str) -> Vec<String> {
    if definition_sql.is_empty() {
        return Vec::new();
    }

    let marker = format!("\"{}\"", table_name);
    let Some(position) = definition_sql.find(&marker) else {
        return Vec::new();
    };

    // Column list runs from after the table name up to the closing parenthesis
    let start = position + marker.len();
    let end = definition_sql
        .char_indices()
        .last()
        .map(|(index, _)| index)
        .unwrap_or(0);
    if start >= end {
        return Vec::new();
    }

    quoted_tokens(&definition_sql[start..end])
}

/// All non-overlapping `"..."` tokens made of word characters or whitespace
fn quoted_tokens(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find('"') {
        let after_open = &rest[open + 1..];
        let body_length: usize = after_open
            .chars()
            .take_while(|character| is_token_character(*character))
            .map(char::len_utf8)
            .sum();

        if body_length > 0 && after_open[body_length..].starts_with('"') {
            tokens.push(after_open[..body_length].to_string());
            rest = &after_open[body_length + 1..];
        } else {
            rest = after_open;
        }
    }

    tokens
}

fn is_token_character(character: char) -> bool {
    character.is_ascii_alphanumeric() || character == '_' || character.is_whitespace()
}
