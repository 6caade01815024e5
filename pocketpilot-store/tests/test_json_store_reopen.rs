use pocketpilot_core::{
    Currency, ExpensePatch, ExpenseStore, GoalStore, NewExpense, NewGoal, ProfilePatch,
    ProfileStore, SplitShare, StoreError, UserId,
};
use pocketpilot_store::{ActivityKind, JsonStore};

fn user() -> UserId {
    UserId::from("local")
}

#[tokio::test]
async fn test_records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("store.json");

    let split_id = {
        let store = JsonStore::open(&path).unwrap();
        store
            .add_expense(&user(), NewExpense::new(45.0).with_category(Some("Groceries".into())))
            .await
            .unwrap();
        let split = NewExpense {
            amount: 60.0,
            total_amount: Some(100.0),
            category: Some("Dining Out".into()),
            note: None,
            splits: Some(vec![SplitShare::new("Me", 60.0), SplitShare::new("Alex", 40.0)]),
        };
        let id = store.add_expense(&user(), split).await.unwrap();
        store.add_goal(&user(), NewGoal::new("Vacation", 1200.0)).await.unwrap();
        store
            .upsert_user_profile(
                &user(),
                ProfilePatch { monthly_income: Some(5000.0), currency: Some(Currency::Usd) },
            )
            .await
            .unwrap();
        id
    };

    assert!(path.exists());
    assert!(!path.with_extension("json.tmp").exists());

    let reopened = JsonStore::open(&path).unwrap();
    let expenses = reopened.fetch_recent_expenses(&user(), 120).await.unwrap();
    assert_eq!(expenses.len(), 2);

    let split = expenses.iter().find(|e| e.id == split_id).unwrap();
    assert_eq!(split.total(), 100.0);
    assert!(split.is_split());

    let activity = reopened.recent_activity(&user(), 10).await;
    assert_eq!(activity.len(), 3);
    assert!(activity.iter().any(|a| a.kind == ActivityKind::Goal && a.title == "Vacation"));
}

#[tokio::test]
async fn test_update_and_delete_persist() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    let store = JsonStore::open(&path).unwrap();
    let keep = store.add_expense(&user(), NewExpense::new(20.0)).await.unwrap();
    let gone = store.add_expense(&user(), NewExpense::new(8.0)).await.unwrap();

    store
        .update_expense(
            &user(),
            &keep,
            ExpensePatch { amount: Some(75.0), total_amount: Some(75.0), ..ExpensePatch::default() },
        )
        .await
        .unwrap();
    store.delete_expense(&user(), &gone).await.unwrap();
    drop(store);

    let reopened = JsonStore::open(&path).unwrap();
    let expenses = reopened.fetch_recent_expenses(&user(), 10).await.unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].amount, 75.0);
}

#[tokio::test]
async fn test_failed_write_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    let store = JsonStore::open(&path).unwrap();
    store.add_expense(&user(), NewExpense::new(10.0)).await.unwrap();
    let before = std::fs::read_to_string(&path).unwrap();

    let err = store
        .delete_expense(&UserId::from("intruder"), "missing")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn test_corrupt_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = JsonStore::open(&path).unwrap_err();
    assert!(err.to_string().contains("parse"));
}

#[tokio::test]
async fn test_goal_delete_and_profile_persist() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    {
        let store = JsonStore::open(&path).unwrap();
        let keep = store.add_goal(&user(), NewGoal::new("Vacation", 1200.0)).await.unwrap();
        let drop = store.add_goal(&user(), NewGoal::new("Laptop", 900.0)).await.unwrap();
        store.delete_goal(&user(), &drop).await.unwrap();
        store
            .upsert_user_profile(
                &user(),
                ProfilePatch { monthly_income: Some(4200.0), currency: None },
            )
            .await
            .unwrap();

        let err = store.delete_goal(&user(), &drop).await.unwrap_err();
        assert!(matches!(err, StoreError::GoalNotFound { .. }));
        assert_eq!(store.fetch_goals(&user()).await.unwrap()[0].id, keep);
    }

    let reopened = JsonStore::open(&path).unwrap();
    let goals = reopened.fetch_goals(&user()).await.unwrap();
    assert_eq!(goals.len(), 1);
    assert_eq!(goals[0].title, "Vacation");

    let profile = reopened.fetch_user_profile(&user()).await.unwrap().unwrap();
    assert_eq!(profile.monthly_income, Some(4200.0));
    assert_eq!(reopened.fetch_user_profile(&UserId::from("someone")).await.unwrap(), None);
}
