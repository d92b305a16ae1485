// Migration file naming conventions
pub const SQL_SUFFIX: &str = ".sql";
pub const SEED_FILENAME_PREFIX: &str = "seed_";
pub const SEEDS_SUBDIR: &str = "seeds";

// Section markers inside a migration file
pub const UP_MARKER: &str = "-- UP";
pub const DOWN_MARKER: &str = "-- DOWN";

// Ledger table holding applied migration versions
pub const TRACKING_TABLE: &str = "schema_migrations";

// Default locations and connection parameters
pub const DEFAULT_MIGRATIONS_DIR: &str = "migrations";
pub const DEFAULT_DB_HOST: &str = "localhost";
pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_DB_NAME: &str = "database";
pub const DEFAULT_DB_USER: &str = "postgres";
pub const DEFAULT_DB_PASSWORD: &str = "123123";
