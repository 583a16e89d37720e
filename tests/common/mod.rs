#![allow(dead_code)]

use cobalto_table::orm::{Db, Model};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl Model for User {
    fn table_name() -> &'static str {
        "users_test"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Company {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub turnover: i64,
}

impl Model for Company {
    fn table_name() -> &'static str {
        "companies_test"
    }
}

/// Company joined with its owner's name.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct CompanyWithOwner {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub turnover: i64,
    pub owner: String,
}

impl Model for CompanyWithOwner {
    fn table_name() -> &'static str {
        "companies_test"
    }
}

pub const USERS: &[(&str, &str)] = &[
    ("Bob", "bob@example.com"),
    ("Alice", "dave@example.com"),
    ("Eve", "alice@example.com"),
    ("Carol", "eve@example.com"),
    ("Dave", "carol@example.com"),
];

/// Total turnover of the ten seeded companies (100 + 200 + ... + 1000).
pub const TOTAL_TURNOVER: i64 = 5500;

/// In-memory database with five users and ten companies owned round-robin.
pub async fn setup_db() -> Db {
    let db = Db::connect("sqlite::memory:").await.unwrap();
    db.execute("CREATE TABLE users_test (id INTEGER PRIMARY KEY, name TEXT NOT NULL, email TEXT NOT NULL)")
        .await
        .unwrap();
    db.execute(
        "CREATE TABLE companies_test (id INTEGER PRIMARY KEY, owner_id INTEGER NOT NULL, name TEXT NOT NULL, turnover INTEGER NOT NULL)",
    )
    .await
    .unwrap();
    for (name, email) in USERS {
        db.execute(&format!(
            "INSERT INTO users_test (name, email) VALUES ('{}', '{}')",
            name, email
        ))
        .await
        .unwrap();
    }
    for i in 1..=10i64 {
        db.execute(&format!(
            "INSERT INTO companies_test (owner_id, name, turnover) VALUES ({}, 'Company {:02}', {})",
            (i - 1) % 5 + 1,
            i,
            i * 100
        ))
        .await
        .unwrap();
    }
    db
}
