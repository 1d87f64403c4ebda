use chrono::{Duration, TimeZone, Utc};
use sea_orm::{Database, DatabaseConnection};

use engine::{
    Engine, EngineError, MoneyCents, NewTransactionCmd, TransactionKind, TransactionListFilter,
    UpdateTransactionCmd, analytics,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn at(year: i32, month: u32, day: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

#[tokio::test]
async fn add_and_list_partitions_by_user_and_kind() {
    let (engine, _db) = engine_with_db().await;

    engine
        .add_transaction(
            NewTransactionCmd::new("alice", TransactionKind::Expense, MoneyCents::new(1500), "food")
                .occurred_at(at(2024, 2, 1)),
        )
        .await
        .unwrap();
    engine
        .add_transaction(
            NewTransactionCmd::new("alice", TransactionKind::Expense, MoneyCents::new(900), "Taxi")
                .description("  airport ")
                .occurred_at(at(2024, 1, 15)),
        )
        .await
        .unwrap();
    engine
        .add_transaction(NewTransactionCmd::new(
            "alice",
            TransactionKind::Income,
            MoneyCents::new(200_000),
            "salary",
        ))
        .await
        .unwrap();
    engine
        .add_transaction(NewTransactionCmd::new(
            "bob",
            TransactionKind::Expense,
            MoneyCents::new(100),
            "food",
        ))
        .await
        .unwrap();

    let expenses = engine
        .list_transactions("alice", TransactionKind::Expense)
        .await
        .unwrap();
    assert_eq!(expenses.len(), 2);
    // Oldest first.
    assert_eq!(expenses[0].category, "taxi");
    assert_eq!(expenses[0].description.as_deref(), Some("airport"));
    assert_eq!(expenses[1].amount, MoneyCents::new(1500));

    let incomes = engine
        .list_transactions("alice", TransactionKind::Income)
        .await
        .unwrap();
    assert_eq!(incomes.len(), 1);

    assert_eq!(
        engine.total("alice", TransactionKind::Expense).await.unwrap(),
        MoneyCents::new(2400)
    );
}

#[tokio::test]
async fn add_defaults_date_to_now() {
    let (engine, _db) = engine_with_db().await;
    let before = Utc::now() - Duration::seconds(1);
    let tx = engine
        .add_transaction(NewTransactionCmd::new(
            "alice",
            TransactionKind::Expense,
            MoneyCents::new(100),
            "food",
        ))
        .await
        .unwrap();
    assert!(tx.occurred_at >= before);
}

#[tokio::test]
async fn add_rejects_invalid_amount_and_category() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .add_transaction(NewTransactionCmd::new(
            "alice",
            TransactionKind::Expense,
            MoneyCents::new(-5),
            "food",
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .add_transaction(NewTransactionCmd::new(
            "alice",
            TransactionKind::Income,
            MoneyCents::new(5),
            "groceries",
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidCategory(_)));

    let err = engine
        .add_transaction(NewTransactionCmd::new(
            "  ",
            TransactionKind::Expense,
            MoneyCents::new(5),
            "food",
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidUser(_)));
}

#[tokio::test]
async fn amounts_above_cap_are_rejected_and_totals_stay_positive() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .add_transaction(NewTransactionCmd::new(
            "alice",
            TransactionKind::Expense,
            MoneyCents::new(i64::MAX),
            "food",
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let tx = engine
        .add_transaction(NewTransactionCmd::new(
            "alice",
            TransactionKind::Expense,
            MoneyCents::MAX_AMOUNT,
            "food",
        ))
        .await
        .unwrap();
    engine
        .add_transaction(NewTransactionCmd::new(
            "alice",
            TransactionKind::Expense,
            MoneyCents::MAX_AMOUNT,
            "rent",
        ))
        .await
        .unwrap();

    let err = engine
        .update_transaction(UpdateTransactionCmd::new(
            tx.id,
            TransactionKind::Expense,
            MoneyCents::new(MoneyCents::MAX_AMOUNT.cents() + 1),
            "food",
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let total = engine
        .total("alice", TransactionKind::Expense)
        .await
        .unwrap();
    assert_eq!(total.cents(), 2 * MoneyCents::MAX_AMOUNT.cents());
}

#[tokio::test]
async fn update_replaces_fields_and_keeps_date_when_omitted() {
    let (engine, _db) = engine_with_db().await;
    let tx = engine
        .add_transaction(
            NewTransactionCmd::new("alice", TransactionKind::Expense, MoneyCents::new(1500), "food")
                .description("lunch")
                .occurred_at(at(2024, 2, 1)),
        )
        .await
        .unwrap();

    let updated = engine
        .update_transaction(UpdateTransactionCmd::new(
            tx.id,
            TransactionKind::Expense,
            MoneyCents::new(2500),
            "groceries",
        ))
        .await
        .unwrap();
    assert_eq!(updated.amount, MoneyCents::new(2500));
    assert_eq!(updated.category, "groceries");
    assert_eq!(updated.description, None);
    assert_eq!(updated.occurred_at, at(2024, 2, 1));

    let moved = engine
        .update_transaction(
            UpdateTransactionCmd::new(tx.id, TransactionKind::Expense, MoneyCents::new(2500), "food")
                .occurred_at(at(2024, 3, 3)),
        )
        .await
        .unwrap();
    assert_eq!(moved.occurred_at, at(2024, 3, 3));
}

#[tokio::test]
async fn update_through_wrong_kind_is_not_found() {
    let (engine, _db) = engine_with_db().await;
    let tx = engine
        .add_transaction(NewTransactionCmd::new(
            "alice",
            TransactionKind::Expense,
            MoneyCents::new(1500),
            "other",
        ))
        .await
        .unwrap();

    let err = engine
        .update_transaction(UpdateTransactionCmd::new(
            tx.id,
            TransactionKind::Income,
            MoneyCents::new(1500),
            "other",
        ))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("transaction not exists".to_string())
    );

    let err = engine
        .update_transaction(UpdateTransactionCmd::new(
            Uuid::new_v4(),
            TransactionKind::Expense,
            MoneyCents::new(1500),
            "other",
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn delete_is_idempotent() {
    let (engine, _db) = engine_with_db().await;
    let tx = engine
        .add_transaction(NewTransactionCmd::new(
            "alice",
            TransactionKind::Income,
            MoneyCents::new(1500),
            "bonus",
        ))
        .await
        .unwrap();

    assert!(!engine
        .delete_transaction(TransactionKind::Expense, tx.id)
        .await
        .unwrap());
    assert!(engine
        .delete_transaction(TransactionKind::Income, tx.id)
        .await
        .unwrap());
    assert!(!engine
        .delete_transaction(TransactionKind::Income, tx.id)
        .await
        .unwrap());
    assert!(engine
        .list_transactions("alice", TransactionKind::Income)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn filtered_listing_respects_range() {
    let (engine, _db) = engine_with_db().await;
    for (day, cents) in [(1, 100), (10, 200), (20, 300)] {
        engine
            .add_transaction(
                NewTransactionCmd::new(
                    "alice",
                    TransactionKind::Expense,
                    MoneyCents::new(cents),
                    "food",
                )
                .occurred_at(at(2024, 2, day)),
            )
            .await
            .unwrap();
    }

    let filter = TransactionListFilter {
        from: Some(at(2024, 2, 5)),
        to: Some(at(2024, 2, 20)),
    };
    let txs = engine
        .list_transactions_filtered("alice", TransactionKind::Expense, &filter)
        .await
        .unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].amount, MoneyCents::new(200));

    let bad = TransactionListFilter {
        from: Some(at(2024, 2, 20)),
        to: Some(at(2024, 2, 5)),
    };
    let err = engine
        .list_transactions_filtered("alice", TransactionKind::Expense, &bad)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidRange(_)));
}

#[tokio::test]
async fn stored_history_feeds_advice() {
    let (engine, _db) = engine_with_db().await;
    for (kind, cents, category, when) in [
        (TransactionKind::Expense, 10_000, "food", at(2024, 1, 1)),
        (TransactionKind::Expense, 15_000, "food", at(2024, 2, 1)),
        (TransactionKind::Income, 50_000, "salary", at(2024, 1, 1)),
    ] {
        engine
            .add_transaction(
                NewTransactionCmd::new("alice", kind, MoneyCents::new(cents), category)
                    .occurred_at(when),
            )
            .await
            .unwrap();
    }

    let mut history = engine
        .list_transactions("alice", TransactionKind::Expense)
        .await
        .unwrap();
    history.extend(
        engine
            .list_transactions("alice", TransactionKind::Income)
            .await
            .unwrap(),
    );

    let today = chrono::NaiveDate::from_ymd_opt(2024, 2, 15).unwrap();
    let tips = analytics::generate_advice(&history, today, None);
    assert_eq!(tips[0], analytics::Tip::SpendingUp { percent: 50.0 });
    assert_eq!(
        tips[1],
        analytics::Tip::TopCategory {
            category: "food".to_string(),
            amount: MoneyCents::new(15_000)
        }
    );
}
