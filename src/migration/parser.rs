use crate::constants::{DOWN_MARKER, UP_MARKER};
use crate::error::{MigrateError, Result};

/// The two halves of a migration script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sections {
    pub up: String,
    /// Absent when the file has no `-- DOWN` delimiter. That is a valid
    /// up-only migration, not an error, until a rollback targets it.
    pub down: Option<String>,
}

/// Split a migration file into its UP and DOWN sections.
///
/// The file is cut at the first `-- DOWN` line; everything before it (with a
/// leading `-- UP` marker removed) is the up section, everything after it is
/// the down section. `filename` is only used for error messages.
pub fn split_sections(filename: &str, raw: &str) -> Result<Sections> {
    let (up_part, down_part) = match raw.split_once(DOWN_MARKER) {
        Some((up, down)) => (up, Some(down)),
        None => (raw, None),
    };

    let up = up_part.replacen(UP_MARKER, "", 1).trim().to_string();
    if up.is_empty() {
        return Err(MigrateError::EmptyUpSection {
            script: filename.to_string(),
        });
    }

    Ok(Sections {
        up,
        down: down_part.map(|d| d.trim().to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_up_and_down() {
        let raw = "-- UP\nCREATE TABLE users (id SERIAL);\n\n-- DOWN\nDROP TABLE users;\n";
        let sections = split_sections("001_users.sql", raw).unwrap();

        assert_eq!(sections.up, "CREATE TABLE users (id SERIAL);");
        assert_eq!(sections.down.as_deref(), Some("DROP TABLE users;"));
    }

    #[test]
    fn test_split_without_delimiter_is_up_only() {
        let raw = "-- UP\nCREATE TABLE users (id SERIAL);\n";
        let sections = split_sections("001_users.sql", raw).unwrap();

        assert_eq!(sections.up, "CREATE TABLE users (id SERIAL);");
        assert!(sections.down.is_none());
    }

    #[test]
    fn test_split_without_up_marker() {
        let raw = "CREATE TABLE users (id SERIAL);\n-- DOWN\nDROP TABLE users;";
        let sections = split_sections("001_users.sql", raw).unwrap();

        assert_eq!(sections.up, "CREATE TABLE users (id SERIAL);");
        assert_eq!(sections.down.as_deref(), Some("DROP TABLE users;"));
    }

    #[test]
    fn test_split_empty_down_section() {
        // A delimiter followed by nothing still counts as a present, empty
        // down section
        let raw = "CREATE TABLE users (id SERIAL);\n-- DOWN\n";
        let sections = split_sections("001_users.sql", raw).unwrap();

        assert_eq!(sections.down.as_deref(), Some(""));
    }

    #[test]
    fn test_split_empty_up_is_invalid() {
        let err = split_sections("001_users.sql", "-- UP\n\n-- DOWN\nDROP TABLE users;")
            .unwrap_err();

        assert!(matches!(err, MigrateError::EmptyUpSection { .. }));
        assert!(err.to_string().contains("001_users.sql"));
    }

    #[test]
    fn test_split_multi_statement_up() {
        let raw = "-- UP\nCREATE TABLE a (id INT);\nCREATE TABLE b (id INT);\n-- DOWN\nDROP TABLE b;\nDROP TABLE a;";
        let sections = split_sections("002_pair.sql", raw).unwrap();

        assert_eq!(
            sections.up,
            "CREATE TABLE a (id INT);\nCREATE TABLE b (id INT);"
        );
        assert_eq!(
            sections.down.as_deref(),
            Some("DROP TABLE b;\nDROP TABLE a;")
        );
    }
}
