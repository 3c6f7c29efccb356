//! Persistence layer of Tallybook.
//!
//! Entities are plain `sea-orm` models. Access goes through a [`Session`]
//! (the unit of work) and the [`Repository`] it hands out:
//!
//! ```ignore
//! let session = Session::new(db);
//! let checking = accounts::Model::new("Checking");
//! session.accounts().insert(&checking);
//! session.save_changes().await?;
//!
//! let found = session.accounts().get_by_name("Checking").await?;
//! ```

pub use error::StoreError;
pub use money::Money;
pub use repository::{
    AccountRepository, CategoryRepository, ExpenseRepository, ExpenseTagRepository,
    IncomeRepository, LedgerEntity, NamedEntity, Repository, TagRepository, TransferRepository,
};
pub use session::Session;

pub mod accounts;
pub mod categories;
pub mod expense_tags;
pub mod expenses;
pub mod incomes;
pub mod tags;
pub mod transfers;

mod error;
mod money;
mod repository;
mod session;

pub type ResultStore<T> = Result<T, StoreError>;
