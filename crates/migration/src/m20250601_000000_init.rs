//! Initial schema migration.
//!
//! - `accounts`, `categories`, `tags`: named lookups, names unique
//! - `expenses`, `incomes`: money booked on an account under a category
//! - `transfers`: money moved between two accounts
//! - `expense_tags`: many-to-many between expenses and tags
//!
//! Accounts and categories cannot be deleted while rows reference them
//! (`ON DELETE RESTRICT`). Tag links follow their expense or tag.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum Tags {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    CategoryId,
    AccountId,
    Amount,
    Timestamp,
    Comment,
}

#[derive(Iden)]
enum Incomes {
    Table,
    Id,
    CategoryId,
    AccountId,
    Amount,
    Timestamp,
    Comment,
}

#[derive(Iden)]
enum Transfers {
    Table,
    Id,
    OutgoingAccountId,
    IncomingAccountId,
    Amount,
    Timestamp,
    Comment,
}

#[derive(Iden)]
enum ExpenseTags {
    Table,
    ExpenseId,
    TagId,
}

fn index<T, C>(name: &str, table: T, column: C) -> IndexCreateStatement
where
    T: IntoIden + 'static,
    C: IntoIndexColumn,
{
    Index::create()
        .name(name)
        .table(table)
        .col(column)
        .to_owned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Named lookups
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Accounts::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Accounts::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Categories::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tags::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Tags::Name).string().not_null().unique_key())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Expenses
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Expenses::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Expenses::CategoryId).uuid().not_null())
                    .col(ColumnDef::new(Expenses::AccountId).uuid().not_null())
                    .col(ColumnDef::new(Expenses::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(Expenses::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Expenses::Comment).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-category_id")
                            .from(Expenses::Table, Expenses::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-account_id")
                            .from(Expenses::Table, Expenses::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(index(
                "idx-expenses-account_id",
                Expenses::Table,
                Expenses::AccountId,
            ))
            .await?;
        manager
            .create_index(index(
                "idx-expenses-category_id",
                Expenses::Table,
                Expenses::CategoryId,
            ))
            .await?;
        manager
            .create_index(index(
                "idx-expenses-timestamp",
                Expenses::Table,
                Expenses::Timestamp,
            ))
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Incomes
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Incomes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Incomes::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Incomes::CategoryId).uuid().not_null())
                    .col(ColumnDef::new(Incomes::AccountId).uuid().not_null())
                    .col(ColumnDef::new(Incomes::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(Incomes::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Incomes::Comment).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-incomes-category_id")
                            .from(Incomes::Table, Incomes::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-incomes-account_id")
                            .from(Incomes::Table, Incomes::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(index(
                "idx-incomes-account_id",
                Incomes::Table,
                Incomes::AccountId,
            ))
            .await?;
        manager
            .create_index(index(
                "idx-incomes-category_id",
                Incomes::Table,
                Incomes::CategoryId,
            ))
            .await?;
        manager
            .create_index(index(
                "idx-incomes-timestamp",
                Incomes::Table,
                Incomes::Timestamp,
            ))
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Transfers
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transfers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Transfers::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Transfers::OutgoingAccountId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transfers::IncomingAccountId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transfers::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(Transfers::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transfers::Comment).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transfers-outgoing_account_id")
                            .from(Transfers::Table, Transfers::OutgoingAccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transfers-incoming_account_id")
                            .from(Transfers::Table, Transfers::IncomingAccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(index(
                "idx-transfers-outgoing_account_id",
                Transfers::Table,
                Transfers::OutgoingAccountId,
            ))
            .await?;
        manager
            .create_index(index(
                "idx-transfers-incoming_account_id",
                Transfers::Table,
                Transfers::IncomingAccountId,
            ))
            .await?;
        manager
            .create_index(index(
                "idx-transfers-timestamp",
                Transfers::Table,
                Transfers::Timestamp,
            ))
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Expense tags
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ExpenseTags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ExpenseTags::ExpenseId).uuid().not_null())
                    .col(ColumnDef::new(ExpenseTags::TagId).uuid().not_null())
                    .primary_key(
                        Index::create()
                            .col(ExpenseTags::ExpenseId)
                            .col(ExpenseTags::TagId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_tags-expense_id")
                            .from(ExpenseTags::Table, ExpenseTags::ExpenseId)
                            .to(Expenses::Table, Expenses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_tags-tag_id")
                            .from(ExpenseTags::Table, ExpenseTags::TagId)
                            .to(Tags::Table, Tags::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(index(
                "idx-expense_tags-tag_id",
                ExpenseTags::Table,
                ExpenseTags::TagId,
            ))
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(ExpenseTags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transfers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Incomes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        Ok(())
    }
}
