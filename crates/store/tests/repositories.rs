use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{ColumnTrait, Condition, Database, DatabaseConnection, QueryOrder, QuerySelect};

use migration::MigratorTrait;
use store::{
    Money, Session, StoreError, accounts, categories, expense_tags, expenses, incomes, tags,
    transfers,
};
use uuid::Uuid;

async fn database() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

async fn session() -> Session {
    Session::new(database().await)
}

fn day(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

fn money(value: &str) -> Money {
    value.parse().unwrap()
}

struct Fixture {
    checking: accounts::Model,
    savings: accounts::Model,
    groceries: categories::Model,
}

async fn seeded() -> (Session, Fixture) {
    let session = session().await;
    let fixture = Fixture {
        checking: accounts::Model::new("Checking"),
        savings: accounts::Model::new("Savings"),
        groceries: categories::Model::new("Groceries"),
    };
    session
        .accounts()
        .insert_range([&fixture.checking, &fixture.savings]);
    session.categories().insert(&fixture.groceries);
    assert_eq!(session.save_changes().await.unwrap(), 3);
    (session, fixture)
}

#[tokio::test]
async fn inserted_entities_read_back_field_for_field() {
    let (session, fx) = seeded().await;

    let income = incomes::Model::new(
        fx.groceries.id,
        fx.checking.id,
        money("1000.00"),
        day(2025, 1, 15),
        Some("salary".to_string()),
    );
    session.incomes().insert(&income);
    session.save_changes().await.unwrap();

    let account = session.accounts().get_by_id(fx.checking.id).await.unwrap();
    assert_eq!(account, Some(fx.checking.clone()));
    let fetched = session.incomes().get_by_id(income.id).await.unwrap();
    assert_eq!(fetched, Some(income));
}

#[tokio::test]
async fn staged_writes_are_invisible_until_saved() {
    let session = session().await;
    let account = accounts::Model::new("Cash");

    session.accounts().insert(&account);
    assert_eq!(session.pending(), 1);
    assert_eq!(session.accounts().get_by_id(account.id).await.unwrap(), None);

    session.discard();
    assert_eq!(session.pending(), 0);
    assert_eq!(session.save_changes().await.unwrap(), 0);
    assert_eq!(session.accounts().count(None).await.unwrap(), 0);

    session.accounts().insert(&account);
    assert_eq!(session.accounts().save_changes().await.unwrap(), 1);
    assert_eq!(session.pending(), 0);
    assert!(session.accounts().get_by_id(account.id).await.unwrap().is_some());
}

#[tokio::test]
async fn deleted_entities_are_absent() {
    let (session, fx) = seeded().await;

    session.accounts().delete(&fx.savings);
    assert_eq!(session.save_changes().await.unwrap(), 1);
    assert_eq!(session.accounts().get_by_id(fx.savings.id).await.unwrap(), None);

    session.categories().delete_by_id(fx.groceries.id);
    assert_eq!(session.save_changes().await.unwrap(), 1);
    assert_eq!(
        session.categories().get_by_id(fx.groceries.id).await.unwrap(),
        None
    );
}

#[tokio::test]
async fn delete_by_missing_id_is_a_no_op() {
    let (session, _fx) = seeded().await;

    session.accounts().delete_by_id(Uuid::new_v4());
    assert_eq!(session.save_changes().await.unwrap(), 0);
    assert_eq!(session.accounts().count(None).await.unwrap(), 2);
}

#[tokio::test]
async fn update_replaces_mutable_fields() {
    let (session, fx) = seeded().await;
    let mut income = incomes::Model::new(
        fx.groceries.id,
        fx.checking.id,
        money("10.00"),
        day(2025, 1, 1),
        None,
    );
    session.incomes().insert(&income);
    session.save_changes().await.unwrap();

    income.account_id = fx.savings.id;
    income.amount = money("12.34");
    income.comment = Some("fixed".to_string());
    session.incomes().update(&income);
    assert_eq!(session.save_changes().await.unwrap(), 1);

    let fetched = session.incomes().get_by_id(income.id).await.unwrap();
    assert_eq!(fetched, Some(income));
}

#[tokio::test]
async fn update_of_missing_row_fails_on_save() {
    let session = session().await;

    session.accounts().update(&accounts::Model::new("Ghost"));
    let err = session.save_changes().await.unwrap_err();
    assert!(matches!(err, StoreError::Database(_)));
    assert_eq!(session.pending(), 0);
}

#[tokio::test]
async fn range_update_and_range_delete() {
    let (session, fx) = seeded().await;
    let incomes_repo = session.incomes();
    let mut rows: Vec<incomes::Model> = (1..=3)
        .map(|d| {
            incomes::Model::new(
                fx.groceries.id,
                fx.checking.id,
                money("5.00"),
                day(2025, 3, d),
                None,
            )
        })
        .collect();
    incomes_repo.insert_range(&rows);
    assert_eq!(session.save_changes().await.unwrap(), 3);

    for row in &mut rows {
        row.account_id = fx.savings.id;
        row.amount = money("7.50");
    }
    incomes_repo.update_range(&rows);
    assert_eq!(session.pending(), 3);
    assert_eq!(session.save_changes().await.unwrap(), 3);

    let moved = incomes_repo.get_by_account(fx.savings.id).await.unwrap();
    assert_eq!(moved.len(), 3);
    assert!(moved.iter().all(|row| row.amount == money("7.50")));
    assert!(
        incomes_repo
            .get_by_account(fx.checking.id)
            .await
            .unwrap()
            .is_empty()
    );

    incomes_repo.delete_range(&rows[..2]);
    assert_eq!(session.save_changes().await.unwrap(), 2);

    let left = incomes_repo.get_all().await.unwrap();
    assert_eq!(left, vec![rows[2].clone()]);
}

#[tokio::test]
async fn filter_exists_and_count() {
    let (session, fx) = seeded().await;

    let found = session
        .accounts()
        .get_with_filter(accounts::Column::Name.eq("Savings"))
        .await
        .unwrap();
    assert_eq!(found, vec![fx.savings.clone()]);

    assert!(
        session
            .accounts()
            .exists(accounts::Column::Id.eq(fx.checking.id))
            .await
            .unwrap()
    );
    assert!(
        !session
            .accounts()
            .exists(accounts::Column::Name.eq("Brokerage"))
            .await
            .unwrap()
    );

    assert_eq!(session.accounts().count(None).await.unwrap(), 2);
    let only_checking = Condition::all().add(accounts::Column::Name.eq("Checking"));
    assert_eq!(
        session.accounts().count(Some(only_checking)).await.unwrap(),
        1
    );
    assert_eq!(session.accounts().get_all().await.unwrap().len(), 2);
}

#[tokio::test]
async fn query_composes_ordering_and_paging() {
    let (session, fx) = seeded().await;

    let first = session
        .accounts()
        .query()
        .order_by_desc(accounts::Column::Name)
        .limit(1)
        .all(session.connection())
        .await
        .unwrap();
    assert_eq!(first, vec![fx.savings]);
}

#[tokio::test]
async fn account_name_lookups() {
    let (session, fx) = seeded().await;
    let accounts = session.accounts();

    assert_eq!(
        accounts.get_by_name("Checking").await.unwrap(),
        Some(fx.checking.clone())
    );
    assert_eq!(accounts.get_by_name("checking").await.unwrap(), None);
    assert!(accounts.exists_by_name("Savings").await.unwrap());
    assert!(!accounts.exists_by_name("Brokerage").await.unwrap());

    assert!(matches!(
        accounts.get_by_name("   ").await,
        Err(StoreError::InvalidArgument(_))
    ));
    assert!(matches!(
        accounts.exists_by_name("").await,
        Err(StoreError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn account_search_is_case_insensitive_substring() {
    let (session, fx) = seeded().await;
    let percent = accounts::Model::new("100% Cash");
    session.accounts().insert(&percent);
    session.save_changes().await.unwrap();
    let accounts = session.accounts();

    let ordered = accounts.get_all_ordered_by_name().await.unwrap();
    let names: Vec<_> = ordered.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["100% Cash", "Checking", "Savings"]);

    assert_eq!(
        accounts.search_by_name("HECK").await.unwrap(),
        vec![fx.checking.clone()]
    );
    assert_eq!(
        accounts.search_by_name("%").await.unwrap(),
        vec![percent.clone()]
    );
    assert!(accounts.search_by_name("zzz").await.unwrap().is_empty());
    assert_eq!(accounts.search_by_name("").await.unwrap(), ordered);
    assert_eq!(accounts.search_by_name("  ").await.unwrap(), ordered);
}

#[tokio::test]
async fn account_search_folds_non_ascii_case() {
    let (session, _fx) = seeded().await;
    let accounts = session.accounts();
    let epargne = accounts::Model::new("Épargne");
    accounts.insert(&epargne);
    session.save_changes().await.unwrap();

    for pattern in ["Épargne", "épargne", "ÉPARGNE", "parg"] {
        assert_eq!(
            accounts.search_by_name(pattern).await.unwrap(),
            vec![epargne.clone()],
            "{pattern}"
        );
    }
}

#[tokio::test]
async fn account_search_keeps_surrounding_spaces() {
    let (session, fx) = seeded().await;
    let accounts = session.accounts();
    let joint = accounts::Model::new("Joint Checking");
    accounts.insert(&joint);
    session.save_changes().await.unwrap();

    assert_eq!(
        accounts.search_by_name(" check").await.unwrap(),
        vec![joint.clone()]
    );
    assert_eq!(
        accounts.search_by_name("check").await.unwrap(),
        vec![fx.checking.clone(), joint]
    );
}

#[tokio::test]
async fn duplicate_names_are_rejected_and_nothing_is_committed() {
    let (session, _fx) = seeded().await;

    let fresh = accounts::Model::new("Brokerage");
    session.accounts().insert(&fresh);
    session.accounts().insert(&accounts::Model::new("Checking"));
    let err = session.save_changes().await.unwrap_err();

    assert!(matches!(err, StoreError::Database(_)));
    assert_eq!(session.accounts().get_by_id(fresh.id).await.unwrap(), None);
    assert_eq!(session.accounts().count(None).await.unwrap(), 2);
}

#[tokio::test]
async fn income_date_range_and_totals() {
    let (session, fx) = seeded().await;
    let inside = incomes::Model::new(
        fx.groceries.id,
        fx.checking.id,
        money("1000.00"),
        day(2025, 1, 15),
        None,
    );
    let outside = incomes::Model::new(
        fx.groceries.id,
        fx.checking.id,
        money("2000.00"),
        day(2025, 1, 1),
        None,
    );
    session.incomes().insert_range([&inside, &outside]);
    session.save_changes().await.unwrap();
    let incomes = session.incomes();

    let in_range = incomes
        .get_by_date_range(day(2025, 1, 10), day(2025, 1, 31))
        .await
        .unwrap();
    assert_eq!(in_range, vec![inside.clone()]);

    assert_eq!(
        incomes.get_total_by_account(fx.checking.id).await.unwrap(),
        money("3000.00")
    );
    assert_eq!(
        incomes.get_total_by_category(fx.groceries.id).await.unwrap(),
        money("3000.00")
    );
    assert_eq!(
        incomes.get_total_by_account(fx.savings.id).await.unwrap(),
        Money::ZERO
    );
}

#[tokio::test]
async fn date_ranges_include_both_bounds() {
    let (session, fx) = seeded().await;
    let start = day(2025, 3, 1);
    let end = day(2025, 3, 31);
    let before = start - chrono::Duration::seconds(1);
    let after = end + chrono::Duration::seconds(1);

    let rows: Vec<_> = [before, start, end, after]
        .into_iter()
        .map(|ts| incomes::Model::new(fx.groceries.id, fx.checking.id, money("1"), ts, None))
        .collect();
    session.incomes().insert_range(&rows);
    session.save_changes().await.unwrap();

    let found = session.incomes().get_by_date_range(start, end).await.unwrap();
    let stamps: Vec<_> = found.iter().map(|i| i.timestamp).collect();
    assert_eq!(stamps, vec![end, start]);
}

#[tokio::test]
async fn income_filters_are_newest_first_and_combine() {
    let (session, fx) = seeded().await;
    let salary = categories::Model::new("Salary");
    session.categories().insert(&salary);
    let older = incomes::Model::new(salary.id, fx.checking.id, money("1"), day(2025, 1, 1), None);
    let newer = incomes::Model::new(salary.id, fx.checking.id, money("2"), day(2025, 2, 1), None);
    let other_account = incomes::Model::new(
        fx.groceries.id,
        fx.savings.id,
        money("3"),
        day(2025, 1, 20),
        None,
    );
    session
        .incomes()
        .insert_range([&older, &newer, &other_account]);
    session.save_changes().await.unwrap();
    let incomes = session.incomes();

    assert_eq!(
        incomes.get_by_account(fx.checking.id).await.unwrap(),
        vec![newer.clone(), older.clone()]
    );
    assert_eq!(
        incomes.get_by_category(salary.id).await.unwrap(),
        vec![newer.clone(), older.clone()]
    );
    assert_eq!(
        incomes.get_all_ordered_by_date().await.unwrap(),
        vec![newer.clone(), other_account.clone(), older.clone()]
    );
    assert_eq!(
        incomes
            .get_by_account_and_date_range(fx.checking.id, day(2025, 1, 1), day(2025, 1, 31))
            .await
            .unwrap(),
        vec![older]
    );
}

#[tokio::test]
async fn expense_queries_mirror_incomes() {
    let (session, fx) = seeded().await;
    let lunch = expenses::Model::new(
        fx.groceries.id,
        fx.checking.id,
        money("12.50"),
        day(2025, 4, 2),
        None,
    );
    let dinner = expenses::Model::new(
        fx.groceries.id,
        fx.checking.id,
        money("30.25"),
        day(2025, 4, 3),
        None,
    );
    session.expenses().insert_range([&lunch, &dinner]);
    session.save_changes().await.unwrap();

    assert_eq!(
        session.expenses().get_by_account(fx.checking.id).await.unwrap(),
        vec![dinner.clone(), lunch.clone()]
    );
    assert_eq!(
        session
            .expenses()
            .get_total_by_category(fx.groceries.id)
            .await
            .unwrap(),
        money("42.75")
    );
}

#[tokio::test]
async fn transfers_by_side_and_union() {
    let (session, fx) = seeded().await;
    let transfer = transfers::Model::new(
        fx.checking.id,
        fx.savings.id,
        money("500.00"),
        day(2025, 1, 5),
        None,
    );
    session.transfers().insert(&transfer);
    session.save_changes().await.unwrap();
    let transfers = session.transfers();

    assert_eq!(
        transfers.get_by_outgoing_account(fx.checking.id).await.unwrap(),
        vec![transfer.clone()]
    );
    assert!(
        transfers
            .get_by_incoming_account(fx.checking.id)
            .await
            .unwrap()
            .is_empty()
    );
    assert_eq!(
        transfers.get_by_account(fx.checking.id).await.unwrap(),
        vec![transfer.clone()]
    );
    assert_eq!(
        transfers.get_by_account(fx.savings.id).await.unwrap(),
        vec![transfer.clone()]
    );

    assert_eq!(
        transfers.outgoing_account(&transfer).await.unwrap(),
        Some(fx.checking.clone())
    );
    assert_eq!(
        transfers.incoming_account(&transfer).await.unwrap(),
        Some(fx.savings.clone())
    );
}

#[tokio::test]
async fn transfer_union_has_no_duplicates() {
    let (session, fx) = seeded().await;
    // The data layer accepts a self-transfer; it must still be listed once.
    let to_self = transfers::Model::new(
        fx.checking.id,
        fx.checking.id,
        money("1.00"),
        day(2025, 1, 1),
        None,
    );
    let incoming = transfers::Model::new(
        fx.savings.id,
        fx.checking.id,
        money("2.00"),
        day(2025, 1, 2),
        None,
    );
    session.transfers().insert_range([&to_self, &incoming]);
    session.save_changes().await.unwrap();

    assert_eq!(
        session.transfers().get_by_account(fx.checking.id).await.unwrap(),
        vec![incoming.clone(), to_self.clone()]
    );
    assert_eq!(
        session
            .transfers()
            .get_by_account_and_date_range(fx.checking.id, day(2025, 1, 2), day(2025, 1, 2))
            .await
            .unwrap(),
        vec![incoming.clone()]
    );
    assert_eq!(
        session
            .transfers()
            .get_by_date_range(day(2025, 1, 1), day(2025, 1, 1))
            .await
            .unwrap(),
        vec![to_self]
    );
}

#[tokio::test]
async fn referenced_category_cannot_be_deleted() {
    let (session, fx) = seeded().await;
    let expense = expenses::Model::new(
        fx.groceries.id,
        fx.checking.id,
        money("5.00"),
        day(2025, 1, 1),
        None,
    );
    session.expenses().insert(&expense);
    session.save_changes().await.unwrap();

    session.categories().delete(&fx.groceries);
    let err = session.save_changes().await.unwrap_err();
    assert!(matches!(err, StoreError::Database(_)));

    assert_eq!(
        session.categories().get_by_id(fx.groceries.id).await.unwrap(),
        Some(fx.groceries.clone())
    );
    assert_eq!(
        session.expenses().get_by_id(expense.id).await.unwrap(),
        Some(expense)
    );
}

#[tokio::test]
async fn referenced_account_cannot_be_deleted_by_transfer() {
    let (session, fx) = seeded().await;
    let transfer = transfers::Model::new(
        fx.checking.id,
        fx.savings.id,
        money("1.00"),
        day(2025, 1, 1),
        None,
    );
    session.transfers().insert(&transfer);
    session.save_changes().await.unwrap();

    session.accounts().delete_by_id(fx.savings.id);
    assert!(session.save_changes().await.is_err());
    assert!(
        session
            .accounts()
            .get_by_id(fx.savings.id)
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn related_rows_load_explicitly() {
    let (session, fx) = seeded().await;
    let income = incomes::Model::new(
        fx.groceries.id,
        fx.savings.id,
        money("9.99"),
        day(2025, 1, 1),
        None,
    );
    session.incomes().insert(&income);
    session.save_changes().await.unwrap();

    let account = session
        .incomes()
        .find_related_one::<accounts::Entity>(&income)
        .await
        .unwrap();
    assert_eq!(account, Some(fx.savings.clone()));

    let of_savings = session
        .accounts()
        .find_related::<incomes::Entity>(&fx.savings)
        .await
        .unwrap();
    assert_eq!(of_savings, vec![income]);
}

#[tokio::test]
async fn expense_and_tags_commit_together() {
    let (session, fx) = seeded().await;
    let food = tags::Model::new("food");
    let work = tags::Model::new("work");
    let travel = tags::Model::new("travel");
    session.tags().insert_range([&food, &work, &travel]);
    session.save_changes().await.unwrap();

    let expense = expenses::Model::new(
        fx.groceries.id,
        fx.checking.id,
        money("18.00"),
        day(2025, 5, 1),
        Some("team lunch".to_string()),
    );
    session.expenses().insert(&expense);
    session
        .expenses()
        .stage_tags(expense.id, &[food.id, work.id, food.id]);
    assert_eq!(session.save_changes().await.unwrap(), 3);

    let mut expected = vec![food.id, work.id];
    expected.sort();
    assert_eq!(session.expenses().tag_ids(expense.id).await.unwrap(), expected);

    let mut names: Vec<_> = session
        .expenses()
        .tags(&expense)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    names.sort();
    assert_eq!(names, vec!["food", "work"]);

    session.expenses().replace_tags(expense.id, &[travel.id]);
    session.save_changes().await.unwrap();
    assert_eq!(
        session.expenses().tag_ids(expense.id).await.unwrap(),
        vec![travel.id]
    );

    let by_expense = session
        .expenses()
        .tag_ids_for(&[expense.id, Uuid::new_v4()])
        .await
        .unwrap();
    assert_eq!(by_expense.len(), 1);

    session.expenses().delete(&expense);
    session.save_changes().await.unwrap();
    assert_eq!(session.expense_tags().count(None).await.unwrap(), 0);
    assert_eq!(session.tags().count(None).await.unwrap(), 3);
}

#[tokio::test]
async fn failed_tag_link_rolls_back_the_expense() {
    let (session, fx) = seeded().await;
    let expense = expenses::Model::new(
        fx.groceries.id,
        fx.checking.id,
        money("1.00"),
        day(2025, 5, 1),
        None,
    );
    session.expenses().insert(&expense);
    session.expense_tags().insert(&expense_tags::Model {
        expense_id: expense.id,
        tag_id: Uuid::new_v4(),
    });

    assert!(session.save_changes().await.is_err());
    assert_eq!(session.expenses().get_by_id(expense.id).await.unwrap(), None);
}
