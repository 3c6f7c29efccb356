//! Unit of work.
//!
//! A [`Session`] owns a database handle and an ordered list of staged writes.
//! Repositories borrowed from the same session stage into the same list, and
//! [`Session::save_changes`] applies all of them inside one database
//! transaction: either every staged write lands or none does.
//!
//! Reads never see staged writes, they always go to the database.

use std::{
    fmt,
    future::Future,
    pin::Pin,
    sync::{Mutex, MutexGuard, PoisonError},
};

use sea_orm::{DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, TransactionTrait};

use crate::{
    ResultStore, accounts, categories, expense_tags, expenses, incomes,
    repository::{
        AccountRepository, CategoryRepository, ExpenseRepository, ExpenseTagRepository,
        IncomeRepository, Repository, TagRepository, TransferRepository,
    },
    tags, transfers,
};

pub(crate) type ChangeFuture<'c> = Pin<Box<dyn Future<Output = Result<u64, DbErr>> + Send + 'c>>;

type ApplyFn = Box<dyn for<'c> FnOnce(&'c DatabaseTransaction) -> ChangeFuture<'c> + Send>;

/// A write waiting for the next [`Session::save_changes`].
pub(crate) struct StagedChange {
    label: String,
    apply: ApplyFn,
}

impl StagedChange {
    pub(crate) fn new<F>(label: String, apply: F) -> Self
    where
        F: for<'c> FnOnce(&'c DatabaseTransaction) -> ChangeFuture<'c> + Send + 'static,
    {
        Self {
            label,
            apply: Box::new(apply),
        }
    }
}

pub struct Session {
    connection: DatabaseConnection,
    staged: Mutex<Vec<StagedChange>>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(connection: DatabaseConnection) -> Self {
        Self {
            connection,
            staged: Mutex::new(Vec::new()),
        }
    }

    /// The underlying connection, for reads and hand-built queries.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    /// A repository for any entity, bound to this session.
    pub fn repository<E: EntityTrait>(&self) -> Repository<'_, E> {
        Repository::new(self)
    }

    pub fn accounts(&self) -> AccountRepository<'_> {
        self.repository::<accounts::Entity>()
    }

    pub fn categories(&self) -> CategoryRepository<'_> {
        self.repository::<categories::Entity>()
    }

    pub fn tags(&self) -> TagRepository<'_> {
        self.repository::<tags::Entity>()
    }

    pub fn expenses(&self) -> ExpenseRepository<'_> {
        self.repository::<expenses::Entity>()
    }

    pub fn expense_tags(&self) -> ExpenseTagRepository<'_> {
        self.repository::<expense_tags::Entity>()
    }

    pub fn incomes(&self) -> IncomeRepository<'_> {
        self.repository::<incomes::Entity>()
    }

    pub fn transfers(&self) -> TransferRepository<'_> {
        self.repository::<transfers::Entity>()
    }

    /// Number of writes staged since the last commit.
    pub fn pending(&self) -> usize {
        self.lock_staged().len()
    }

    /// Drops every staged write without touching the database.
    pub fn discard(&self) {
        let dropped = std::mem::take(&mut *self.lock_staged()).len();
        if dropped > 0 {
            tracing::debug!(dropped, "discarded staged changes");
        }
    }

    pub(crate) fn stage(&self, change: StagedChange) {
        tracing::debug!(change = %change.label, "staged change");
        self.lock_staged().push(change);
    }

    /// Applies every staged write in staging order inside one transaction.
    ///
    /// Returns the number of affected rows. On error the transaction is rolled
    /// back and the staged writes are gone; the session can be reused.
    pub async fn save_changes(&self) -> ResultStore<u64> {
        let changes = std::mem::take(&mut *self.lock_staged());
        if changes.is_empty() {
            return Ok(0);
        }

        let db_tx = self.connection.begin().await?;
        let mut affected = 0u64;
        for StagedChange { label, apply } in changes {
            // Returning early drops `db_tx`, which rolls it back.
            let rows = apply(&db_tx).await?;
            tracing::debug!(change = %label, rows, "applied staged change");
            affected += rows;
        }
        db_tx.commit().await?;

        tracing::debug!(affected, "committed unit of work");
        Ok(affected)
    }

    fn lock_staged(&self) -> MutexGuard<'_, Vec<StagedChange>> {
        self.staged.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
