//! Read-only SQL safety gate.
//!
//! Every statement is checked before submission, no exceptions. The gate is
//! deliberately conservative: multiple statements are refused, the first
//! keyword must start a read, and any mutating keyword anywhere in the text
//! is grounds for rejection, comments and string literals included. A
//! rejected statement produces [`QueryError::Rejected`], which is never
//! retried.

use datascout_core::error::QueryError;

/// Keywords that mutate data or schema. Matched as whole word tokens,
/// case-insensitive, anywhere in the statement.
const BLOCKED_KEYWORDS: &[&str] = &[
    "INSERT", "UPDATE", "DELETE", "DROP", "ALTER", "TRUNCATE", "CREATE", "MSCK", "GRANT", "REVOKE",
];

/// Keywords a statement may start with.
const ALLOWED_LEADING: &[&str] = &["SELECT", "WITH", "EXPLAIN"];

/// Check that `sql` is a single read-only statement.
///
/// Returns the trimmed statement (one trailing `;` removed) on success.
pub fn validate_read_only(sql: &str) -> Result<String, QueryError> {
    let trimmed = sql.trim();
    if trimmed.is_empty() {
        return Err(QueryError::Rejected("Empty statement".into()));
    }

    // One trailing semicolon is tolerated; any other semicolon means
    // multiple statements.
    let statement = trimmed.strip_suffix(';').unwrap_or(trimmed).trim_end();
    if statement.contains(';') {
        return Err(QueryError::Rejected(
            "Multiple statements are not allowed".into(),
        ));
    }
    if statement.is_empty() {
        return Err(QueryError::Rejected("Empty statement".into()));
    }

    let first_word = statement
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_ascii_uppercase();
    if !ALLOWED_LEADING.contains(&first_word.as_str()) {
        return Err(QueryError::Rejected(format!(
            "Only SELECT, WITH, and EXPLAIN statements are allowed (got: {first_word})"
        )));
    }

    // Word-token scan over the whole text. Splitting on non-alphanumerics
    // means comments and string literals are scanned too, which is the
    // intent: "SELECT 1 -- DROP TABLE x" is refused rather than trusted.
    for token in statement.split(|c: char| !c.is_ascii_alphanumeric() && c != '_') {
        if token.is_empty() {
            continue;
        }
        let upper = token.to_ascii_uppercase();
        if BLOCKED_KEYWORDS.contains(&upper.as_str()) {
            return Err(QueryError::Rejected(format!(
                "Statement contains blocked keyword: {upper}"
            )));
        }
    }

    Ok(statement.to_string())
}
