//! SQLite-backed registry storage.
//!
//! Three tables mirror the registry's state: the owner row, the registered
//! fingerprints, and the claims. Fingerprints and identities are stored as hex
//! text. Writes for one registry operation happen inside one transaction.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, bail};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use invite_core::RegistrySnapshot;
use invite_types::{ClaimRecord, Fingerprint, Identity, Scope};

use crate::fs_security::prepare_db_path;

pub struct SqliteStore {
    db: Connection,
}

impl SqliteStore {
    const SCHEMA: &'static str = r"
        CREATE TABLE IF NOT EXISTS registry_meta (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            owner TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS registered (
            fingerprint TEXT PRIMARY KEY,
            registered_at INTEGER NOT NULL
        );

        -- One row per fingerprint: the primary key is the single-claim guarantee
        CREATE TABLE IF NOT EXISTS claims (
            fingerprint TEXT PRIMARY KEY,
            claimant TEXT NOT NULL,
            scope TEXT NOT NULL,
            claimed_at INTEGER NOT NULL,
            FOREIGN KEY (fingerprint) REFERENCES registered(fingerprint)
        );

        CREATE INDEX IF NOT EXISTS idx_claims_claimant
        ON claims(claimant, scope);
    ";

    /// Open or create a registry database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        prepare_db_path(path)?;

        let db = Connection::open(path)
            .with_context(|| format!("Failed to open registry store at {}", path.display()))?;
        Self::initialize(db)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory().context("Failed to open in-memory registry store")?;
        Self::initialize(db)
    }

    fn initialize(db: Connection) -> Result<Self> {
        db.execute_batch(
            "PRAGMA journal_mode=WAL; PRAGMA synchronous=FULL; PRAGMA foreign_keys=ON;",
        )
        .context("Failed to set registry store pragmas")?;
        db.execute_batch(Self::SCHEMA)
            .context("Failed to create registry store schema")?;
        Ok(Self { db })
    }

    #[cfg(test)]
    pub(crate) fn db_for_tests(&self) -> &Connection {
        &self.db
    }

    /// The owner recorded when the store was first initialized.
    pub fn owner(&self) -> Result<Option<Identity>> {
        let owner: Option<String> = self
            .db
            .query_row("SELECT owner FROM registry_meta WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()
            .context("Failed to read registry owner")?;

        owner
            .map(|text| {
                text.parse::<Identity>()
                    .with_context(|| format!("Corrupt owner identity in store: {text}"))
            })
            .transpose()
    }

    /// Record the owner of a fresh store. The owner can be written exactly once.
    pub fn init_owner(&mut self, owner: Identity) -> Result<()> {
        if let Some(existing) = self.owner()? {
            bail!("Registry store already owned by {existing}");
        }
        self.db
            .execute(
                "INSERT INTO registry_meta (id, owner, created_at) VALUES (1, ?1, ?2)",
                params![owner.to_string(), unix_now()],
            )
            .context("Failed to record registry owner")?;
        Ok(())
    }

    /// Insert fingerprints in one transaction. Already-present rows are left untouched.
    pub fn insert_registered(&mut self, fingerprints: &[Fingerprint]) -> Result<()> {
        let now = unix_now();
        let tx = self
            .db
            .transaction()
            .context("Failed to start registry store transaction")?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT OR IGNORE INTO registered (fingerprint, registered_at)
                     VALUES (?1, ?2)",
                )
                .context("Failed to prepare registration insert")?;
            for fingerprint in fingerprints {
                stmt.execute(params![fingerprint.to_hex(), now])
                    .with_context(|| format!("Failed to insert fingerprint {fingerprint}"))?;
            }
        }
        tx.commit()
            .context("Failed to commit registry store transaction")?;

        debug!(count = fingerprints.len(), "Persisted registrations");
        Ok(())
    }

    /// Insert a claim. Fails if the fingerprint is unregistered or already claimed.
    pub fn insert_claim(&mut self, record: &ClaimRecord) -> Result<()> {
        self.db
            .execute(
                "INSERT INTO claims (fingerprint, claimant, scope, claimed_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    record.fingerprint.to_hex(),
                    record.claimant.to_string(),
                    record.scope.to_string(),
                    unix_now()
                ],
            )
            .with_context(|| format!("Failed to persist claim for {}", record.fingerprint))?;

        debug!(fingerprint = %record.fingerprint, "Persisted claim");
        Ok(())
    }

    /// Read the full stored state. `None` for a store that has never been initialized.
    pub fn load(&self) -> Result<Option<RegistrySnapshot>> {
        let Some(owner) = self.owner()? else {
            return Ok(None);
        };

        let mut stmt = self
            .db
            .prepare("SELECT fingerprint FROM registered ORDER BY fingerprint ASC")
            .context("Failed to prepare registered query")?;
        let registered = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .context("Failed to query registered fingerprints")?
            .map(|row| parse_fingerprint(&row.context("Failed to read registered row")?))
            .collect::<Result<Vec<_>>>()?;

        let mut stmt = self
            .db
            .prepare(
                "SELECT fingerprint, claimant, scope FROM claims
                 ORDER BY fingerprint ASC",
            )
            .context("Failed to prepare claims query")?;
        let claims = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .context("Failed to query claims")?
            .map(|row| {
                let (fingerprint, claimant, scope) = row.context("Failed to read claim row")?;
                Ok(ClaimRecord {
                    fingerprint: parse_fingerprint(&fingerprint)?,
                    claimant: claimant
                        .parse::<Identity>()
                        .with_context(|| format!("Corrupt claimant in store: {claimant}"))?,
                    scope: scope
                        .parse::<Scope>()
                        .with_context(|| format!("Corrupt scope in store: {scope}"))?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(RegistrySnapshot {
            owner,
            registered,
            claims,
        }))
    }
}

fn parse_fingerprint(text: &str) -> Result<Fingerprint> {
    text.parse()
        .with_context(|| format!("Corrupt fingerprint in store: {text}"))
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
