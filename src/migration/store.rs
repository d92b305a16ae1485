use crate::constants::{SEED_FILENAME_PREFIX, SQL_SUFFIX};
use crate::error::{MigrateError, Result};
use std::path::Path;

/// Find all migration files in a directory, sorted ascending by filename.
///
/// The filename is the migration's version: lexicographic order is execution
/// order. Files named `seed_*` are reserved for seeds and excluded. A missing
/// directory yields an empty list, not an error.
pub fn list_migrations(migrations_dir: &Path) -> Result<Vec<String>> {
    let mut migrations = Vec::new();

    if !migrations_dir.exists() {
        return Ok(migrations);
    }

    for entry in read_dir(migrations_dir)? {
        let entry = entry.map_err(|source| MigrateError::Io {
            path: migrations_dir.to_path_buf(),
            source,
        })?;

        if !entry.path().is_file() {
            continue;
        }

        if let Some(filename) = entry.file_name().to_str()
            && filename.ends_with(SQL_SUFFIX)
            && !filename.starts_with(SEED_FILENAME_PREFIX)
        {
            migrations.push(filename.to_string());
        }
    }

    migrations.sort();
    Ok(migrations)
}

/// Find all seed files under the seeds directory, sorted ascending.
///
/// Returns `None` when the directory does not exist at all: the caller
/// reports that and exits cleanly rather than treating it as a failure.
pub fn list_seeds(seeds_dir: &Path) -> Result<Option<Vec<String>>> {
    if !seeds_dir.exists() {
        return Ok(None);
    }

    let mut seeds = Vec::new();

    for entry in read_dir(seeds_dir)? {
        let entry = entry.map_err(|source| MigrateError::Io {
            path: seeds_dir.to_path_buf(),
            source,
        })?;

        if !entry.path().is_file() {
            continue;
        }

        if let Some(filename) = entry.file_name().to_str()
            && filename.ends_with(SQL_SUFFIX)
        {
            seeds.push(filename.to_string());
        }
    }

    seeds.sort();
    Ok(Some(seeds))
}

/// Read one script's raw text. Scripts are re-read on every invocation;
/// nothing is cached between runs.
pub fn read_script(dir: &Path, filename: &str) -> Result<String> {
    let path = dir.join(filename);
    std::fs::read_to_string(&path).map_err(|source| MigrateError::Io { path, source })
}

fn read_dir(dir: &Path) -> Result<std::fs::ReadDir> {
    std::fs::read_dir(dir).map_err(|source| MigrateError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_migrations_sorted() {
        let temp_dir = tempfile::tempdir().unwrap();

        // Written out of order on purpose
        std::fs::write(temp_dir.path().join("002_add_users.sql"), "CREATE TABLE users;")
            .unwrap();
        std::fs::write(temp_dir.path().join("001_init.sql"), "CREATE SCHEMA app;").unwrap();
        std::fs::write(temp_dir.path().join("010_add_index.sql"), "CREATE INDEX i;").unwrap();

        let migrations = list_migrations(temp_dir.path()).unwrap();

        assert_eq!(
            migrations,
            vec!["001_init.sql", "002_add_users.sql", "010_add_index.sql"]
        );
    }

    #[test]
    fn test_list_migrations_excludes_seeds_and_non_sql() {
        let temp_dir = tempfile::tempdir().unwrap();

        std::fs::write(temp_dir.path().join("001_init.sql"), "CREATE SCHEMA app;").unwrap();
        std::fs::write(temp_dir.path().join("seed_users.sql"), "INSERT INTO users;").unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), "not sql").unwrap();
        std::fs::create_dir(temp_dir.path().join("seeds")).unwrap();

        let migrations = list_migrations(temp_dir.path()).unwrap();

        assert_eq!(migrations, vec!["001_init.sql"]);
    }

    #[test]
    fn test_list_migrations_missing_dir_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("does_not_exist");

        let migrations = list_migrations(&missing).unwrap();
        assert!(migrations.is_empty());
    }

    #[test]
    fn test_list_seeds_missing_dir_is_none() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("seeds");

        assert!(list_seeds(&missing).unwrap().is_none());
    }

    #[test]
    fn test_list_seeds_keeps_seed_prefix() {
        let temp_dir = tempfile::tempdir().unwrap();

        // In the seeds directory every .sql file is a seed, prefix or not
        std::fs::write(temp_dir.path().join("seed_users.sql"), "INSERT;").unwrap();
        std::fs::write(temp_dir.path().join("01_accounts.sql"), "INSERT;").unwrap();

        let seeds = list_seeds(temp_dir.path()).unwrap().unwrap();
        assert_eq!(seeds, vec!["01_accounts.sql", "seed_users.sql"]);
    }

    #[test]
    fn test_read_script_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();

        let err = read_script(temp_dir.path(), "001_init.sql").unwrap_err();
        assert!(matches!(err, MigrateError::Io { .. }));
        assert!(err.to_string().contains("001_init.sql"));
    }
}
