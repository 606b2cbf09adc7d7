//! Database-backed tests for order persistence.
//!
//! These run only when `TEST_DATABASE_URL` points at a disposable
//! `PostgreSQL` database; without it each test is a no-op so the suite
//! stays green on machines without a database.

#![allow(clippy::unwrap_used, clippy::print_stderr)]

use chrono::Utc;
use rust_decimal::Decimal;
use secrecy::SecretString;
use sqlx::PgPool;

use brewhouse_core::{Email, UserId, Username};
use brewhouse_site::db::orders::OrderRepository;
use brewhouse_site::db::users::UserRepository;
use brewhouse_site::db::{self, RepositoryError};
use brewhouse_site::models::{CartItem, NewOrder};

async fn test_pool() -> Option<PgPool> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set; skipping database test");
        return None;
    };

    let pool = db::create_pool(&SecretString::from(url)).await.unwrap();
    db::run_migrations(&pool).await.unwrap();
    Some(pool)
}

/// Create a throwaway user so the order's foreign key is satisfied.
async fn create_test_user(pool: &PgPool) -> (UserId, Username, Email) {
    let nonce = Utc::now().timestamp_nanos_opt().unwrap() % 1_000_000_000;
    let username = Username::parse(&format!("order_test_{nonce}")).unwrap();
    let email = Email::parse(&format!("order_test_{nonce}@example.com")).unwrap();

    let user = UserRepository::new(pool)
        .create(&username, &email, "not-a-real-hash")
        .await
        .unwrap();

    (user.id, username, email)
}

async fn count_orders_for(pool: &PgPool, user_id: UserId) -> i64 {
    let (count,) = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM orders WHERE user_id = $1")
        .bind(user_id.as_i32())
        .fetch_one(pool)
        .await
        .unwrap();
    count
}

#[tokio::test]
async fn test_failed_item_insert_rolls_back_order_row() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let (user_id, username, email) = create_test_user(&pool).await;

    let order = NewOrder {
        user_id,
        username,
        email,
        total_amount: Decimal::new(640, 2),
        delivery_address: "12 Roastery Lane".to_owned(),
        order_date: Utc::now(),
    };

    // The second item violates the price > 0 check, so the item insert
    // fails after the order row has already been written inside the
    // transaction.
    let items = vec![
        CartItem {
            name: "Espresso".to_owned(),
            quantity: 2,
            price: Decimal::new(320, 2),
        },
        CartItem {
            name: "Phantom".to_owned(),
            quantity: 1,
            price: Decimal::ZERO,
        },
    ];

    let result = OrderRepository::new(&pool)
        .create_with_items(&order, &items)
        .await;

    assert!(matches!(result, Err(RepositoryError::Database(_))));
    assert_eq!(
        count_orders_for(&pool, user_id).await,
        0,
        "order row must not survive a failed item insert"
    );
}

#[tokio::test]
async fn test_committed_order_persists_all_items() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let (user_id, username, email) = create_test_user(&pool).await;

    let order = NewOrder {
        user_id,
        username,
        email,
        total_amount: Decimal::new(1090, 2),
        delivery_address: "12 Roastery Lane".to_owned(),
        order_date: Utc::now(),
    };

    let items = vec![
        CartItem {
            name: "Espresso".to_owned(),
            quantity: 2,
            price: Decimal::new(320, 2),
        },
        CartItem {
            name: "Flat White".to_owned(),
            quantity: 1,
            price: Decimal::new(450, 2),
        },
    ];

    let order_id = OrderRepository::new(&pool)
        .create_with_items(&order, &items)
        .await
        .unwrap();

    assert_eq!(count_orders_for(&pool, user_id).await, 1);

    let (item_count,) =
        sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM order_items WHERE order_id = $1")
            .bind(order_id.as_i32())
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(item_count, 2);
}
