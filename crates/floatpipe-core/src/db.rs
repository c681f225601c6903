// crates/floatpipe-core/src/db.rs

use std::str::FromStr;

use chrono::Utc;
use polars::prelude::DataFrame;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

use crate::config::{
    MissingFieldPolicy, DEFAULT_CHLOROPHYLL_MG_M3, DEFAULT_OXYGEN_UMOL_KG, DEFAULT_SALINITY_PSU,
};
use crate::error::Result;

pub type DbPool = Pool<Sqlite>;

pub const PROFILE_TABLE: &str = "argo_profiles";

/// Establishes a SQLite connection pool, creating the database file if it
/// does not exist yet. The store is single-writer; concurrent batch runs
/// against the same file are out of contract.
pub async fn connect(database_url: &str) -> Result<DbPool> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Creates the profile table and its query indexes if absent.
pub async fn init_schema(pool: &DbPool) -> Result<()> {
    sqlx::query(
        r#"
            CREATE TABLE IF NOT EXISTS argo_profiles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                float_id TEXT,
                cycle_number INTEGER,
                latitude REAL,
                longitude REAL,
                date_time TEXT,
                pressure REAL,
                temperature REAL,
                salinity REAL,
                oxygen REAL,
                chlorophyll REAL,
                source_file TEXT,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
        "#,
    )
    .execute(pool)
    .await?;

    for statement in [
        "CREATE INDEX IF NOT EXISTS idx_location ON argo_profiles (latitude, longitude)",
        "CREATE INDEX IF NOT EXISTS idx_time ON argo_profiles (date_time)",
        "CREATE INDEX IF NOT EXISTS idx_float ON argo_profiles (float_id)",
    ] {
        sqlx::query(statement).execute(pool).await?;
    }

    Ok(())
}

/// Replaces the persisted rows for `source_file` with the given output rows,
/// inside one transaction so a failure never leaves the store half-replaced.
/// This is deliberately delete-then-insert, not an upsert: re-ingesting a
/// source is idempotent at whole-file granularity only.
pub async fn replace_profiles(
    pool: &DbPool,
    df: &DataFrame,
    float_id: &str,
    source_file: &str,
    policy: MissingFieldPolicy,
) -> Result<u64> {
    let number = |name: &str| df.column(name).ok().and_then(|c| c.f64().ok().cloned());
    let latitude = number("LATITUDE");
    let longitude = number("LONGITUDE");
    let pressure = number("PRES");
    let temperature = number("TEMP");
    let salinity = number("PSAL");
    let oxygen = number("DOXY");
    let chlorophyll = number("CHLA");
    let time = df.column("TIME").ok().and_then(|c| c.str().ok().cloned());

    let imputed = |current: Option<f64>, column_present: bool, default: f64| match current {
        Some(v) => Some(v),
        None if !column_present && policy == MissingFieldPolicy::Impute => Some(default),
        None => None,
    };

    let fallback_date = Utc::now().format("%Y-%m-%d").to_string();

    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM argo_profiles WHERE source_file = ?")
        .bind(source_file)
        .execute(tx.as_mut())
        .await?;

    let rows = df.height();
    for idx in 0..rows {
        let get = |col: &Option<polars::prelude::Float64Chunked>| {
            col.as_ref().and_then(|c| c.get(idx))
        };

        let date_time = time
            .as_ref()
            .and_then(|c| c.get(idx))
            .map(str::to_string)
            .unwrap_or_else(|| fallback_date.clone());

        sqlx::query(
            r#"
                INSERT INTO argo_profiles (
                    float_id, cycle_number, latitude, longitude, date_time,
                    pressure, temperature, salinity, oxygen, chlorophyll,
                    source_file
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(float_id)
        .bind((idx % 100) as i64)
        .bind(get(&latitude))
        .bind(get(&longitude))
        .bind(date_time)
        .bind(get(&pressure))
        .bind(get(&temperature))
        .bind(imputed(get(&salinity), salinity.is_some(), DEFAULT_SALINITY_PSU))
        .bind(imputed(get(&oxygen), oxygen.is_some(), DEFAULT_OXYGEN_UMOL_KG))
        .bind(imputed(
            get(&chlorophyll),
            chlorophyll.is_some(),
            DEFAULT_CHLOROPHYLL_MG_M3,
        ))
        .bind(source_file)
        .execute(tx.as_mut())
        .await?;
    }

    tx.commit().await?;
    Ok(rows as u64)
}
