use sea_orm::{ColumnTrait, Condition};
use store::{Session, categories, expenses, incomes};

use crate::ServerError;

named_handlers!(categories, categories, "category", "categories", guard = delete_guard);

async fn delete_guard(
    session: &Session,
    category: &categories::Model,
) -> Result<(), ServerError> {
    let id = category.id;
    let expenses = session
        .expenses()
        .count(Some(Condition::all().add(expenses::Column::CategoryId.eq(id))))
        .await?;
    let incomes = session
        .incomes()
        .count(Some(Condition::all().add(incomes::Column::CategoryId.eq(id))))
        .await?;

    if expenses + incomes > 0 {
        return Err(ServerError::Conflict(format!(
            "category {id} is used by {expenses} expenses and {incomes} incomes"
        )));
    }
    Ok(())
}
