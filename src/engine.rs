use crate::config::Config;
use crate::db;
use crate::error::{MigrateError, Result};
use crate::ledger;
use crate::migration::{list_migrations, list_seeds, read_script, split_sections};
use sqlx::PgPool;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info};

/// The migration state machine.
///
/// Each migration is either pending (file on disk, no ledger entry) or
/// applied (ledger entry present); `up` and `down` move single migrations
/// between those states, one transaction per step. A script's SQL and its
/// ledger bookkeeping commit together or not at all, so a failed step leaves
/// the migration exactly where it was.
pub struct Engine {
    pool: PgPool,
    migrations_dir: PathBuf,
    seeds_dir: PathBuf,
}

/// Migrations present on disk but absent from the ledger, in disk order
/// (ascending by version).
pub fn pending_migrations(discovered: Vec<String>, applied: &[String]) -> Vec<String> {
    let applied: HashSet<&str> = applied.iter().map(String::as_str).collect();
    discovered
        .into_iter()
        .filter(|version| !applied.contains(version.as_str()))
        .collect()
}

/// Rollback order for a set of applied migrations: strictly newest first.
pub fn rollback_order(applied: Vec<String>) -> Vec<String> {
    let mut order = applied;
    order.reverse();
    order
}

impl Engine {
    pub async fn connect(config: &Config) -> Result<Self> {
        let pool = db::connect(&config.database).await?;
        Ok(Self {
            pool,
            migrations_dir: config.migrations_dir.clone(),
            seeds_dir: config.seeds_dir.clone(),
        })
    }

    /// Apply every pending migration in ascending version order.
    ///
    /// Aborts on the first failure; later pending migrations may depend on
    /// the broken one and are never attempted.
    pub async fn up(&self) -> Result<()> {
        ledger::ensure_schema(&self.pool).await?;

        let applied = ledger::applied(&self.pool).await?;
        let discovered = list_migrations(&self.migrations_dir)?;
        let pending = pending_migrations(discovered, &applied);

        if pending.is_empty() {
            println!("No pending migrations");
            return Ok(());
        }

        info!("Applying {} pending migration(s)", pending.len());
        for version in &pending {
            self.apply_up(version).await?;
        }

        Ok(())
    }

    /// Roll back the most recently applied migration.
    ///
    /// The target comes from the ledger, not a directory listing, so a
    /// migration whose file was deleted after being applied still gets
    /// selected (and then fails loudly on read).
    pub async fn down(&self) -> Result<()> {
        ledger::ensure_schema(&self.pool).await?;

        let applied = ledger::applied(&self.pool).await?;
        let Some(last) = applied.last() else {
            println!("No migrations to rollback");
            return Ok(());
        };

        self.rollback_one(last).await?;
        Ok(())
    }

    /// Roll back every applied migration, newest first.
    ///
    /// An up-only migration is reported and skipped (its ledger entry
    /// stays); a SQL failure aborts the remaining sequence.
    pub async fn reset(&self) -> Result<()> {
        ledger::ensure_schema(&self.pool).await?;

        let applied = ledger::applied(&self.pool).await?;
        if applied.is_empty() {
            println!("No migrations to rollback");
            return Ok(());
        }

        for version in rollback_order(applied) {
            self.rollback_one(&version).await?;
        }

        Ok(())
    }

    /// Run every seed file in ascending order, each in its own transaction.
    ///
    /// Seeds are untracked and re-runnable; a failed seed rolls back alone
    /// and the batch continues, so one bad file never blocks the rest.
    pub async fn seed(&self) -> Result<()> {
        let Some(seeds) = list_seeds(&self.seeds_dir)? else {
            println!("Seeds directory not found: {}", self.seeds_dir.display());
            return Ok(());
        };

        if seeds.is_empty() {
            println!("No seed files found");
            return Ok(());
        }

        for seed in &seeds {
            let body = read_script(&self.seeds_dir, seed)?;
            let result = self.run_in_transaction(seed, &body, None).await;
            report_seed_result(seed, result)?;
        }

        Ok(())
    }

    /// Print applied and pending migrations without changing anything.
    pub async fn status(&self) -> Result<()> {
        ledger::ensure_schema(&self.pool).await?;

        let entries = ledger::applied_entries(&self.pool).await?;
        if entries.is_empty() {
            println!("No migrations have been applied");
        } else {
            println!("Applied migrations:");
            for (version, applied_at) in &entries {
                println!("  {} (applied: {})", version, applied_at);
            }
        }

        let applied: Vec<String> = entries.into_iter().map(|(version, _)| version).collect();
        let pending = pending_migrations(list_migrations(&self.migrations_dir)?, &applied);
        if pending.is_empty() {
            println!("No pending migrations");
        } else {
            println!("Pending migrations:");
            for version in &pending {
                println!("  {}", version);
            }
        }

        Ok(())
    }

    /// Apply one migration: its UP SQL and the ledger insert commit together.
    async fn apply_up(&self, version: &str) -> Result<()> {
        let raw = read_script(&self.migrations_dir, version)?;
        let sections = split_sections(version, &raw)?;

        match self
            .run_in_transaction(version, &sections.up, Some(LedgerWrite::Record))
            .await
        {
            Ok(()) => {
                println!("✓ Applied: {}", version);
                Ok(())
            }
            Err(err) => {
                println!("✗ Error applying {}: {}", version, sql_cause(&err));
                Err(err)
            }
        }
    }

    /// Roll back one migration. A migration with no DOWN section is
    /// reported and left alone: its ledger entry stays put.
    async fn rollback_one(&self, version: &str) -> Result<()> {
        let raw = read_script(&self.migrations_dir, version)?;
        let sections = split_sections(version, &raw)?;

        let Some(down) = sections.down else {
            let err = MigrateError::MissingDownScript {
                script: version.to_string(),
            };
            println!("✗ {}", err);
            return Ok(());
        };

        match self
            .run_in_transaction(version, &down, Some(LedgerWrite::Forget))
            .await
        {
            Ok(()) => {
                println!("✓ Rolled back: {}", version);
                Ok(())
            }
            Err(err) => {
                println!("✗ Error rolling back {}: {}", version, sql_cause(&err));
                Err(err)
            }
        }
    }

    /// Execute one script body and its optional ledger write as a single
    /// atomic unit. Any failure rolls back the whole unit, including the
    /// database-side effects of the script.
    ///
    /// Script-body errors are always `Execution` failures, whatever their
    /// SQLSTATE: a unique violation raised by the script's own SQL is the
    /// script failing, not a ledger conflict. Only `ledger::record` maps
    /// unique violations to `LedgerConflict`.
    async fn run_in_transaction(
        &self,
        script: &str,
        sql: &str,
        ledger_write: Option<LedgerWrite>,
    ) -> Result<()> {
        let execution_error = |source: sqlx::Error| MigrateError::Execution {
            script: script.to_string(),
            source,
        };

        let mut tx = self.pool.begin().await.map_err(execution_error)?;

        let result: Result<()> = async {
            sqlx::raw_sql(sql)
                .execute(&mut *tx)
                .await
                .map_err(execution_error)?;

            match ledger_write {
                Some(LedgerWrite::Record) => ledger::record(&mut tx, script).await?,
                Some(LedgerWrite::Forget) => ledger::forget(&mut tx, script).await?,
                None => {}
            }

            Ok(())
        }
        .await;

        match result {
            Ok(()) => {
                tx.commit().await.map_err(execution_error)?;
                debug!("Committed {}", script);
                Ok(())
            }
            Err(err) => {
                // Keep the script failure even if the rollback itself errors
                if let Err(rollback_err) = tx.rollback().await {
                    debug!("Rollback of {} failed: {}", script, rollback_err);
                }
                Err(err)
            }
        }
    }
}

/// Ledger bookkeeping that commits together with a script body.
enum LedgerWrite {
    Record,
    Forget,
}

/// Seed failure policy: an execution failure is reported and absorbed so the
/// rest of the batch still runs; anything else (unreadable file, broken
/// connection) aborts the batch.
fn report_seed_result(seed: &str, result: Result<()>) -> Result<()> {
    match result {
        Ok(()) => {
            println!("✓ Seeded: {}", seed);
            Ok(())
        }
        Err(MigrateError::Execution { source, .. }) => {
            println!("✗ Error seeding {}: {}", seed, source);
            Ok(())
        }
        Err(err) => Err(err),
    }
}

/// Underlying database cause for the ✗ report lines. The wrapping variants
/// already name the script, so printing them verbatim would repeat it.
fn sql_cause(err: &MigrateError) -> String {
    match err {
        MigrateError::Execution { source, .. } => source.to_string(),
        other => other.to_string(),
    }
}
