use chrono::{Datelike, Days, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    AddTransactionCmd, Engine, EngineError, Money, NewAccountCmd, NewUserCmd, TransactionKind,
    TransactionListFilter, TransferCmd, UpdateUserCmd,
};
use migration::MigratorTrait;
use tempfile::TempDir;

async fn engine_on(url: &str) -> (Engine, DatabaseConnection, i32) {
    let db = Database::connect(url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    let alice = sign_up(&engine, "alice@example.com").await;
    (engine, db, alice)
}

async fn engine_with_db() -> (Engine, DatabaseConnection, i32) {
    engine_on("sqlite::memory:").await
}

/// A file-backed database, so the pool hands out several connections at once.
async fn engine_on_file() -> (Engine, TempDir, i32) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}?mode=rwc", dir.path().join("ledger.db").display());
    let (engine, _db, alice) = engine_on(&url).await;
    (engine, dir, alice)
}

async fn sign_up(engine: &Engine, email: &str) -> i32 {
    engine
        .sign_up(NewUserCmd {
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            ..Default::default()
        })
        .await
        .unwrap()
        .id
}

async fn open(engine: &Engine, user_id: i32, name: &str, cents: i64) -> i32 {
    engine
        .new_account(NewAccountCmd::new(user_id, name, Money::new(cents)))
        .await
        .unwrap()
        .id
}

async fn balance(engine: &Engine, account_id: i32, user_id: i32) -> i64 {
    engine
        .account(account_id, user_id)
        .await
        .unwrap()
        .balance
        .cents()
}

async fn ledger_len(engine: &Engine, user_id: i32) -> usize {
    engine
        .list_transactions(user_id, &TransactionListFilter::default())
        .await
        .unwrap()
        .len()
}

fn entry(user_id: i32, account_id: i32, kind: TransactionKind, cents: i64) -> AddTransactionCmd {
    AddTransactionCmd::new(user_id, account_id, kind, Money::new(cents))
        .description("Morning Coffee")
        .status("completed")
        .source("Cafe")
}

#[tokio::test]
async fn new_account_records_initial_deposit() {
    let (engine, _db, alice) = engine_with_db().await;

    let account = engine
        .new_account(NewAccountCmd::new(alice, "Bank1", Money::new(10_000)).number("X"))
        .await
        .unwrap();
    assert_eq!(account.balance, Money::new(10_000));
    assert_eq!(account.number.as_deref(), Some("X"));

    let ledger = engine
        .list_transactions(alice, &TransactionListFilter::default())
        .await
        .unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].kind, TransactionKind::Deposit);
    assert_eq!(ledger[0].amount, Money::new(10_000));
    assert_eq!(ledger[0].description, "Bank1 - Initial Deposit");
    assert_eq!(ledger[0].account_id, Some(account.id));
}

#[tokio::test]
async fn zero_initial_balance_writes_no_ledger_row() {
    let (engine, _db, alice) = engine_with_db().await;

    open(&engine, alice, "Wallet", 0).await;
    assert_eq!(ledger_len(&engine, alice).await, 0);

    let err = engine
        .new_account(NewAccountCmd::new(alice, "Debt", Money::new(-1)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument(_)));
}

#[tokio::test]
async fn duplicate_name_or_number_conflicts() {
    let (engine, _db, alice) = engine_with_db().await;
    engine
        .new_account(NewAccountCmd::new(alice, "Bank1", Money::new(100)).number("IT-1"))
        .await
        .unwrap();

    let same_name = engine
        .new_account(NewAccountCmd::new(alice, "bank1", Money::new(100)))
        .await
        .unwrap_err();
    assert!(matches!(same_name, EngineError::ExistingKey(_)));

    let same_number = engine
        .new_account(NewAccountCmd::new(alice, "Bank2", Money::new(100)).number("IT-1"))
        .await
        .unwrap_err();
    assert!(matches!(same_number, EngineError::ExistingKey(_)));

    assert_eq!(engine.accounts(alice).await.unwrap().len(), 1);
    assert_eq!(ledger_len(&engine, alice).await, 1);

    // Empty numbers never collide.
    engine
        .new_account(NewAccountCmd::new(alice, "Cash", Money::ZERO).number(""))
        .await
        .unwrap();
    engine
        .new_account(NewAccountCmd::new(alice, "Piggy", Money::ZERO).number(" "))
        .await
        .unwrap();
}

#[tokio::test]
async fn accounts_are_scoped_by_owner() {
    let (engine, _db, alice) = engine_with_db().await;
    let bob = sign_up(&engine, "bob@example.com").await;
    let account = open(&engine, alice, "Bank1", 1_000).await;

    assert!(matches!(
        engine.account(account, bob).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.accounts(bob).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.add_money(account, bob, Money::new(500)).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert_eq!(balance(&engine, account, alice).await, 1_000);
}

#[tokio::test]
async fn add_money_credits_with_a_deposit_entry() {
    let (engine, _db, alice) = engine_with_db().await;
    let account = open(&engine, alice, "Bank1", 1_000).await;

    let updated = engine
        .add_money(account, alice, Money::new(250))
        .await
        .unwrap();
    assert_eq!(updated.balance, Money::new(1_250));

    let ledger = engine
        .list_transactions(alice, &TransactionListFilter::default())
        .await
        .unwrap();
    assert_eq!(ledger[0].description, "Added 2.50 to account Bank1");
    assert_eq!(ledger[0].kind, TransactionKind::Deposit);

    assert!(matches!(
        engine.add_money(account, alice, Money::ZERO).await,
        Err(EngineError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn income_credits_and_expense_debits() {
    let (engine, _db, alice) = engine_with_db().await;
    let account = open(&engine, alice, "Bank1", 10_000).await;

    engine
        .add_transaction(entry(alice, account, TransactionKind::Income, 5_000))
        .await
        .unwrap();
    assert_eq!(balance(&engine, account, alice).await, 15_000);

    let expense = engine
        .add_transaction(entry(alice, account, TransactionKind::Expense, 3_000))
        .await
        .unwrap();
    assert_eq!(expense.amount, Money::new(3_000));
    assert_eq!(balance(&engine, account, alice).await, 12_000);

    let overdraw = engine
        .add_transaction(entry(alice, account, TransactionKind::Expense, 12_001))
        .await
        .unwrap_err();
    assert!(matches!(overdraw, EngineError::InsufficientFunds(_)));
    assert_eq!(balance(&engine, account, alice).await, 12_000);
    assert_eq!(ledger_len(&engine, alice).await, 3);
}

#[tokio::test]
async fn invalid_transaction_input_writes_nothing() {
    let (engine, _db, alice) = engine_with_db().await;
    let account = open(&engine, alice, "Bank1", 10_000).await;

    let negative = engine
        .add_transaction(entry(alice, account, TransactionKind::Expense, -500))
        .await
        .unwrap_err();
    assert!(matches!(negative, EngineError::InvalidArgument(_)));

    let deposit = engine
        .add_transaction(entry(alice, account, TransactionKind::Deposit, 500))
        .await
        .unwrap_err();
    assert!(matches!(deposit, EngineError::InvalidArgument(_)));

    let blank = engine
        .add_transaction(entry(alice, account, TransactionKind::Income, 500).status("  "))
        .await
        .unwrap_err();
    assert!(matches!(blank, EngineError::InvalidArgument(_)));

    let missing = engine
        .add_transaction(entry(alice, account + 100, TransactionKind::Income, 500))
        .await
        .unwrap_err();
    assert!(matches!(missing, EngineError::KeyNotFound(_)));

    assert_eq!(balance(&engine, account, alice).await, 10_000);
    assert_eq!(ledger_len(&engine, alice).await, 1);
}

#[tokio::test]
async fn transfer_conserves_money_and_pairs_legs() {
    let (engine, _db, alice) = engine_with_db().await;
    let from = open(&engine, alice, "Checking", 10_000).await;
    let to = open(&engine, alice, "Savings", 2_000).await;

    let transfer = engine
        .transfer(TransferCmd::new(alice, from, to, Money::new(4_000)))
        .await
        .unwrap();

    let from_after = balance(&engine, from, alice).await;
    let to_after = balance(&engine, to, alice).await;
    assert_eq!(from_after, 6_000);
    assert_eq!(to_after, 6_000);
    assert_eq!(from_after + to_after, 12_000);

    assert_eq!(transfer.from.kind, TransactionKind::Expense);
    assert_eq!(transfer.from.description, "Transfer to Account");
    assert_eq!(transfer.to.kind, TransactionKind::Income);
    assert_eq!(transfer.to.description, "Transfer from Account");
    assert_eq!(transfer.from.source, "Transfer");
    assert_eq!(transfer.from.status, "Completed");
    assert_eq!(transfer.from.created_at, transfer.to.created_at);
    assert!(transfer.from.transfer_id.is_some());
    assert_eq!(transfer.from.transfer_id, transfer.to.transfer_id);
}

#[tokio::test]
async fn overdrawing_transfer_changes_nothing() {
    let (engine, _db, alice) = engine_with_db().await;
    let from = open(&engine, alice, "Checking", 1_000).await;
    let to = open(&engine, alice, "Savings", 0).await;
    let before = ledger_len(&engine, alice).await;

    let err = engine
        .transfer(TransferCmd::new(alice, from, to, Money::new(1_001)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds(_)));
    assert_eq!(balance(&engine, from, alice).await, 1_000);
    assert_eq!(balance(&engine, to, alice).await, 0);
    assert_eq!(ledger_len(&engine, alice).await, before);

    let same = engine
        .transfer(TransferCmd::new(alice, from, from, Money::new(10)))
        .await
        .unwrap_err();
    assert!(matches!(same, EngineError::InvalidArgument(_)));
}

#[tokio::test]
async fn transfer_to_foreign_account_is_not_found() {
    let (engine, _db, alice) = engine_with_db().await;
    let bob = sign_up(&engine, "bob@example.com").await;
    let from = open(&engine, alice, "Checking", 1_000).await;
    let foreign = open(&engine, bob, "Checking", 0).await;

    let err = engine
        .transfer(TransferCmd::new(alice, from, foreign, Money::new(100)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    assert_eq!(balance(&engine, from, alice).await, 1_000);
    assert_eq!(balance(&engine, foreign, bob).await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_transfers_never_overdraw() {
    let (engine, _db, alice) = engine_with_db().await;
    let from = open(&engine, alice, "Checking", 10_000).await;
    let to = open(&engine, alice, "Savings", 0).await;

    let mut handles = Vec::new();
    for _ in 0..4 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            engine
                .transfer(TransferCmd::new(alice, from, to, Money::new(4_000)))
                .await
        }));
    }

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(EngineError::InsufficientFunds(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(succeeded, 2);
    assert_eq!(balance(&engine, from, alice).await, 2_000);
    assert_eq!(balance(&engine, to, alice).await, 8_000);
    assert!(engine.verify_balances(alice).await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_transfers_on_a_shared_file_never_overdraw() {
    let (engine, _dir, alice) = engine_on_file().await;
    let from = open(&engine, alice, "Checking", 30_000).await;
    let to = open(&engine, alice, "Savings", 0).await;

    let mut handles = Vec::new();
    for _ in 0..64 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            engine
                .transfer(TransferCmd::new(alice, from, to, Money::new(1_000)))
                .await
        }));
    }

    let mut succeeded = 0;
    let mut refused = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(EngineError::InsufficientFunds(_)) => refused += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(succeeded, 30);
    assert_eq!(refused, 34);
    assert_eq!(balance(&engine, from, alice).await, 0);
    assert_eq!(balance(&engine, to, alice).await, 30_000);
    assert_eq!(ledger_len(&engine, alice).await, 61);
    assert!(engine.verify_balances(alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_missing_or_foreign_is_not_found() {
    let (engine, _db, alice) = engine_with_db().await;
    let bob = sign_up(&engine, "bob@example.com").await;
    let account = open(&engine, alice, "Bank1", 1_000).await;
    let expense = engine
        .add_transaction(entry(alice, account, TransactionKind::Expense, 100))
        .await
        .unwrap();

    assert!(matches!(
        engine.delete_transaction(expense.id + 100, alice).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.delete_transaction(expense.id, bob).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert_eq!(ledger_len(&engine, alice).await, 2);
    assert_eq!(balance(&engine, account, alice).await, 900);
}

#[tokio::test]
async fn delete_reverses_the_balance_effect() {
    let (engine, _db, alice) = engine_with_db().await;
    let account = open(&engine, alice, "Bank1", 10_000).await;
    let expense = engine
        .add_transaction(entry(alice, account, TransactionKind::Expense, 3_000))
        .await
        .unwrap();

    engine.delete_transaction(expense.id, alice).await.unwrap();
    assert_eq!(balance(&engine, account, alice).await, 10_000);
    assert_eq!(ledger_len(&engine, alice).await, 1);

    // Removing a credit that has already been spent would overdraw.
    let empty = open(&engine, alice, "Empty", 0).await;
    let income = engine
        .add_transaction(entry(alice, empty, TransactionKind::Income, 5_000))
        .await
        .unwrap();
    engine
        .add_transaction(entry(alice, empty, TransactionKind::Expense, 4_000))
        .await
        .unwrap();
    let err = engine.delete_transaction(income.id, alice).await.unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds(_)));
    assert_eq!(balance(&engine, empty, alice).await, 1_000);
    assert!(engine.verify_balances(alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_transfer_leg_removes_both() {
    let (engine, _db, alice) = engine_with_db().await;
    let from = open(&engine, alice, "Checking", 10_000).await;
    let to = open(&engine, alice, "Savings", 0).await;
    let transfer = engine
        .transfer(TransferCmd::new(alice, from, to, Money::new(4_000)))
        .await
        .unwrap();

    engine.delete_transaction(transfer.to.id, alice).await.unwrap();

    assert_eq!(balance(&engine, from, alice).await, 10_000);
    assert_eq!(balance(&engine, to, alice).await, 0);
    assert_eq!(ledger_len(&engine, alice).await, 1);
    assert!(engine.verify_balances(alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_filters_by_day_and_search() {
    let (engine, _db, alice) = engine_with_db().await;
    let bob = sign_up(&engine, "bob@example.com").await;
    let account = open(&engine, alice, "Bank1", 10_000).await;
    engine
        .add_transaction(entry(alice, account, TransactionKind::Expense, 450))
        .await
        .unwrap();
    engine
        .add_transaction(
            entry(alice, account, TransactionKind::Income, 90_000)
                .description("Salary")
                .source("ACME Corp")
                .status("pending"),
        )
        .await
        .unwrap();
    open(&engine, bob, "Bank1", 500).await;

    let all = engine
        .list_transactions(alice, &TransactionListFilter::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.windows(2).all(|w| w[0].id > w[1].id));
    assert!(all.iter().all(|t| t.user_id == alice));

    let search = |term: &str| TransactionListFilter {
        search: Some(term.to_string()),
        ..Default::default()
    };
    let coffee = engine.list_transactions(alice, &search("COFFEE")).await.unwrap();
    assert_eq!(coffee.len(), 1);
    let acme = engine.list_transactions(alice, &search("acme")).await.unwrap();
    assert_eq!(acme.len(), 1);
    let pending = engine.list_transactions(alice, &search("Pend")).await.unwrap();
    assert_eq!(pending[0].description, "Salary");

    let today = Utc::now().date_naive();
    let only_today = TransactionListFilter {
        from: Some(today),
        to: Some(today),
        search: None,
    };
    assert_eq!(
        engine.list_transactions(alice, &only_today).await.unwrap().len(),
        3
    );

    let tomorrow = today.checked_add_days(Days::new(1)).unwrap();
    let future = TransactionListFilter {
        from: Some(tomorrow),
        to: Some(tomorrow),
        search: None,
    };
    assert!(engine.list_transactions(alice, &future).await.unwrap().is_empty());

    let reversed = TransactionListFilter {
        from: Some(tomorrow),
        to: Some(today),
        search: None,
    };
    assert!(matches!(
        engine.list_transactions(alice, &reversed).await,
        Err(EngineError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn search_matches_non_ascii_text_in_any_case() {
    let (engine, _db, alice) = engine_with_db().await;
    let account = open(&engine, alice, "Bank1", 10_000).await;
    engine
        .add_transaction(
            entry(alice, account, TransactionKind::Expense, 450).description("Éclair Café"),
        )
        .await
        .unwrap();

    for term in ["Éclair", "éclair", "CAFÉ", "café"] {
        let filter = TransactionListFilter {
            search: Some(term.to_string()),
            ..Default::default()
        };
        let hits = engine.list_transactions(alice, &filter).await.unwrap();
        assert_eq!(hits.len(), 1, "{term}");
        assert_eq!(hits[0].description, "Éclair Café");
    }

    let miss = TransactionListFilter {
        search: Some("bakery".to_string()),
        ..Default::default()
    };
    assert!(engine.list_transactions(alice, &miss).await.unwrap().is_empty());
}

#[tokio::test]
async fn oversized_amounts_are_rejected_and_large_totals_add_up() {
    let (engine, _db, alice) = engine_with_db().await;
    let err = engine
        .new_account(NewAccountCmd::new(
            alice,
            "Vault",
            Money::new(92_233_720_368_547_758),
        ))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InvalidArgument("amount too large".to_string()));
    assert_eq!(
        "92233720368547758.07".parse::<Money>(),
        Err(EngineError::InvalidArgument("amount too large".to_string()))
    );

    let first = open(&engine, alice, "Vault A", Money::MAX_AMOUNT.cents()).await;
    open(&engine, alice, "Vault B", Money::MAX_AMOUNT.cents()).await;
    let err = engine
        .add_money(first, alice, Money::new(Money::MAX_AMOUNT.cents() + 1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument(_)));

    let dashboard = engine.dashboard(alice).await.unwrap();
    assert_eq!(dashboard.total_income.cents(), 2 * Money::MAX_AMOUNT.cents());
    assert_eq!(dashboard.available_balance, dashboard.total_income);

    let monthly = engine
        .sum_by_month_and_type(alice, Utc::now().year())
        .await
        .unwrap();
    assert_eq!(monthly.len(), 1);
    assert_eq!(monthly[0].total.cents(), 2 * Money::MAX_AMOUNT.cents());
}

#[tokio::test]
async fn dashboard_aggregates_current_year() {
    let (engine, _db, alice) = engine_with_db().await;
    let account = open(&engine, alice, "Bank1", 10_000).await;
    engine
        .add_transaction(entry(alice, account, TransactionKind::Income, 5_000))
        .await
        .unwrap();
    engine
        .add_transaction(entry(alice, account, TransactionKind::Expense, 3_000))
        .await
        .unwrap();

    let dashboard = engine.dashboard(alice).await.unwrap();
    assert_eq!(dashboard.total_income, Money::new(15_000));
    assert_eq!(dashboard.total_expense, Money::new(3_000));
    assert_eq!(
        dashboard.available_balance,
        dashboard.total_income - dashboard.total_expense
    );
    assert_eq!(dashboard.chart_data.len(), 12);

    let month = Utc::now().month();
    for point in &dashboard.chart_data {
        if point.month == month {
            assert_eq!(point.income, Money::new(15_000));
            assert_eq!(point.expense, Money::new(3_000));
        } else {
            assert_eq!(point.income, Money::ZERO);
            assert_eq!(point.expense, Money::ZERO);
        }
    }

    assert_eq!(dashboard.last_transactions.len(), 3);
    assert_eq!(dashboard.last_transactions[0].kind, TransactionKind::Expense);
    assert_eq!(dashboard.last_accounts.len(), 1);

    let by_type = engine.sum_by_type(alice).await.unwrap();
    assert_eq!(by_type.get(&TransactionKind::Deposit), Some(&Money::new(10_000)));

    let monthly = engine
        .sum_by_month_and_type(alice, Utc::now().year())
        .await
        .unwrap();
    assert_eq!(monthly.len(), 3);
    assert!(monthly.iter().all(|bucket| bucket.month == month));
}

#[tokio::test]
async fn dashboard_for_new_user_is_empty() {
    let (engine, _db, alice) = engine_with_db().await;
    let dashboard = engine.dashboard(alice).await.unwrap();
    assert_eq!(dashboard.available_balance, Money::ZERO);
    assert_eq!(dashboard.chart_data.len(), 12);
    assert!(dashboard.last_transactions.is_empty());
    assert!(dashboard.last_accounts.is_empty());
}

#[tokio::test]
async fn recompute_repairs_a_drifted_balance() {
    let (engine, db, alice) = engine_with_db().await;
    let account = open(&engine, alice, "Bank1", 10_000).await;
    engine
        .add_transaction(entry(alice, account, TransactionKind::Expense, 2_500))
        .await
        .unwrap();
    assert!(engine.verify_balances(alice).await.unwrap().is_empty());

    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "UPDATE accounts SET balance_minor = 1 WHERE id = ?",
        vec![account.into()],
    ))
    .await
    .unwrap();

    let mismatches = engine.verify_balances(alice).await.unwrap();
    assert_eq!(mismatches.len(), 1);
    assert_eq!(mismatches[0].stored, Money::new(1));
    assert_eq!(mismatches[0].ledger, Money::new(7_500));

    engine.recompute_balances(alice).await.unwrap();
    assert_eq!(balance(&engine, account, alice).await, 7_500);
    assert!(engine.verify_balances(alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn users_have_unique_emails() {
    let (engine, _db, alice) = engine_with_db().await;
    let bob = sign_up(&engine, "bob@example.com").await;

    let duplicate = engine
        .sign_up(NewUserCmd {
            first_name: "Other".to_string(),
            last_name: "Alice".to_string(),
            email: "ALICE@example.com".to_string(),
            password_hash: "hash".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(duplicate, EngineError::ExistingKey(_)));

    let taken = engine
        .update_user(
            alice,
            UpdateUserCmd {
                email: Some("bob@example.com".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(taken, EngineError::ExistingKey(_)));

    let updated = engine
        .update_user(
            bob,
            UpdateUserCmd {
                country: Some("Italy".to_string()),
                accounts: Some(vec!["Bank1".to_string()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.country.as_deref(), Some("Italy"));
    assert_eq!(updated.accounts, vec!["Bank1".to_string()]);
    assert_eq!(updated.currency, "USD");

    engine
        .set_password(bob, "new-hash".to_string())
        .await
        .unwrap();
    let credentials = engine.user_by_email("Bob@Example.com").await.unwrap();
    assert_eq!(credentials.user.id, bob);
    assert_eq!(credentials.password_hash, "new-hash");

    assert!(matches!(
        engine.user_by_email("nobody@example.com").await,
        Err(EngineError::KeyNotFound(_))
    ));
}
