//! Generic repository over any `sea-orm` entity.
//!
//! Reads run immediately against the session's connection. Writes are only
//! staged; nothing is persisted until [`Repository::save_changes`] (or
//! [`Session::save_changes`]) commits the unit of work.
//!
//! Entity-specific queries live in the submodules as extra `impl` blocks on
//! `Repository<'_, E>` for the entities they apply to.

use std::marker::PhantomData;

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, Condition, DatabaseConnection, EntityTrait,
    IntoActiveModel, ModelTrait, PaginatorTrait, PrimaryKeyTrait, QueryFilter, Select,
    sea_query::IntoCondition,
};

use crate::{
    ResultStore, accounts, categories, expense_tags, expenses, incomes,
    session::{Session, StagedChange},
    tags, transfers,
};

mod expenses_ext;
mod ledger;
mod named;
mod transfers_ext;

pub use ledger::LedgerEntity;
pub use named::NamedEntity;

pub type AccountRepository<'s> = Repository<'s, accounts::Entity>;
pub type CategoryRepository<'s> = Repository<'s, categories::Entity>;
pub type TagRepository<'s> = Repository<'s, tags::Entity>;
pub type ExpenseRepository<'s> = Repository<'s, expenses::Entity>;
pub type ExpenseTagRepository<'s> = Repository<'s, expense_tags::Entity>;
pub type IncomeRepository<'s> = Repository<'s, incomes::Entity>;
pub type TransferRepository<'s> = Repository<'s, transfers::Entity>;

/// CRUD and query primitives for the entity `E`, bound to a [`Session`].
pub struct Repository<'s, E> {
    session: &'s Session,
    entity: PhantomData<E>,
}

impl<E> Clone for Repository<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Repository<'_, E> {}

impl<'s, E: EntityTrait> Repository<'s, E> {
    pub(crate) fn new(session: &'s Session) -> Self {
        Self {
            session,
            entity: PhantomData,
        }
    }

    pub fn session(&self) -> &'s Session {
        self.session
    }

    fn connection(&self) -> &'s DatabaseConnection {
        self.session.connection()
    }

    fn table(&self) -> String {
        E::default().table_name().to_string()
    }

    /// Composable query over the whole table.
    ///
    /// Execute it against [`Session::connection`]:
    ///
    /// ```ignore
    /// let page = repo
    ///     .query()
    ///     .order_by_asc(accounts::Column::Name)
    ///     .limit(10)
    ///     .all(session.connection())
    ///     .await?;
    /// ```
    pub fn query(&self) -> Select<E> {
        E::find()
    }

    /// Commits everything staged on the session, not only this repository.
    pub async fn save_changes(&self) -> ResultStore<u64> {
        self.session.save_changes().await
    }
}

impl<'s, E> Repository<'s, E>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel> + Send + Sync,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + 'static,
    for<'m> E::ActiveModel: From<&'m E::Model>,
{
    pub async fn get_by_id<K>(&self, id: K) -> ResultStore<Option<E::Model>>
    where
        K: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
    {
        Ok(E::find_by_id(id).one(self.connection()).await?)
    }

    pub async fn get_all(&self) -> ResultStore<Vec<E::Model>> {
        Ok(E::find().all(self.connection()).await?)
    }

    pub async fn get_with_filter<F>(&self, filter: F) -> ResultStore<Vec<E::Model>>
    where
        F: IntoCondition,
    {
        Ok(E::find().filter(filter).all(self.connection()).await?)
    }

    pub async fn exists<F>(&self, filter: F) -> ResultStore<bool>
    where
        F: IntoCondition,
    {
        Ok(E::find()
            .filter(filter)
            .one(self.connection())
            .await?
            .is_some())
    }

    /// Counts rows, optionally restricted by `filter`.
    pub async fn count(&self, filter: Option<Condition>) -> ResultStore<u64> {
        let mut select = E::find();
        if let Some(filter) = filter {
            select = select.filter(filter);
        }
        Ok(select.count(self.connection()).await?)
    }

    /// Loads the entities related to `model` through `E: Related<R>`.
    pub async fn find_related<R>(&self, model: &E::Model) -> ResultStore<Vec<R::Model>>
    where
        R: EntityTrait,
        E: sea_orm::Related<R>,
    {
        Ok(model.find_related(R::default()).all(self.connection()).await?)
    }

    /// Like [`find_related`](Self::find_related) for a `belongs_to` side.
    pub async fn find_related_one<R>(&self, model: &E::Model) -> ResultStore<Option<R::Model>>
    where
        R: EntityTrait,
        E: sea_orm::Related<R>,
    {
        Ok(model.find_related(R::default()).one(self.connection()).await?)
    }

    pub fn insert(&self, model: &E::Model) {
        let insert = E::insert(E::ActiveModel::from(model));
        self.session.stage(StagedChange::new(
            format!("insert into {}", self.table()),
            move |db_tx| Box::pin(async move { insert.exec_without_returning(db_tx).await }),
        ));
    }

    pub fn insert_range<'m, I>(&self, models: I)
    where
        I: IntoIterator<Item = &'m E::Model>,
        E::Model: 'm,
    {
        for model in models {
            self.insert(model);
        }
    }

    /// Stages a full-row update keyed by the model's primary key.
    ///
    /// Committing fails with `DbErr::RecordNotUpdated` if the row is gone.
    pub fn update(&self, model: &E::Model) {
        let update = E::update(E::ActiveModel::from(model));
        self.session.stage(StagedChange::new(
            format!("update {}", self.table()),
            move |db_tx| Box::pin(async move { update.exec(db_tx).await.map(|_| 1) }),
        ));
    }

    pub fn update_range<'m, I>(&self, models: I)
    where
        I: IntoIterator<Item = &'m E::Model>,
        E::Model: 'm,
    {
        for model in models {
            self.update(model);
        }
    }

    pub fn delete(&self, model: &E::Model) {
        let delete = E::delete(E::ActiveModel::from(model));
        self.session.stage(StagedChange::new(
            format!("delete from {}", self.table()),
            move |db_tx| {
                Box::pin(async move { delete.exec(db_tx).await.map(|res| res.rows_affected) })
            },
        ));
    }

    /// Stages a delete by primary key. A missing id deletes nothing.
    pub fn delete_by_id<K>(&self, id: K)
    where
        K: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
    {
        let delete = E::delete_by_id(id);
        self.session.stage(StagedChange::new(
            format!("delete by id from {}", self.table()),
            move |db_tx| {
                Box::pin(async move { delete.exec(db_tx).await.map(|res| res.rows_affected) })
            },
        ));
    }

    pub fn delete_range<'m, I>(&self, models: I)
    where
        I: IntoIterator<Item = &'m E::Model>,
        E::Model: 'm,
    {
        for model in models {
            self.delete(model);
        }
    }

    /// Stages a bulk delete of every row matching `filter`.
    pub fn delete_with_filter<F>(&self, filter: F)
    where
        F: IntoCondition,
    {
        let delete = E::delete_many().filter(filter);
        self.session.stage(StagedChange::new(
            format!("delete matching from {}", self.table()),
            move |db_tx| {
                Box::pin(async move { delete.exec(db_tx).await.map(|res| res.rows_affected) })
            },
        ));
    }
}
