// crates/floatpipe-core/src/query.rs

use once_cell::sync::Lazy;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::warn;

use crate::db::DbPool;

pub const RESULT_LIMIT: usize = 1000;

/// One trigger phrase and the filter clause it activates. This is a fixed
/// tagged-variant dispatch table, not a parser: no negation, disjunction, or
/// numeric extraction happens here.
#[derive(Debug, Clone, Copy)]
pub struct Trigger {
    pub keyword: &'static str,
    pub clause: &'static str,
}

static TRIGGERS: Lazy<Vec<Trigger>> = Lazy::new(|| {
    vec![
        Trigger {
            keyword: "temperature",
            clause: "temperature IS NOT NULL",
        },
        Trigger {
            keyword: "salinity",
            clause: "salinity IS NOT NULL",
        },
        Trigger {
            keyword: "oxygen",
            clause: "oxygen IS NOT NULL",
        },
        Trigger {
            keyword: "deep",
            clause: "pressure > 500",
        },
        Trigger {
            keyword: "shallow",
            clause: "pressure < 100",
        },
    ]
});

#[derive(Debug, Clone, Serialize)]
pub struct TranslatedQuery {
    pub sql: String,
    pub matched_keywords: Vec<String>,
}

/// Lower-cases the input and conjoins every matching trigger's clause, in
/// table order, onto a select-all base. A fixed ordering (most recent first)
/// and row cap complete the query.
pub fn translate(text: &str) -> TranslatedQuery {
    let lowered = text.to_lowercase();

    let mut sql = String::from("SELECT * FROM argo_profiles WHERE 1=1");
    let mut matched = Vec::new();

    for trigger in TRIGGERS.iter() {
        if lowered.contains(trigger.keyword) {
            sql.push_str(" AND ");
            sql.push_str(trigger.clause);
            matched.push(trigger.keyword.to_string());
        }
    }

    sql.push_str(&format!(" ORDER BY date_time DESC LIMIT {RESULT_LIMIT}"));

    TranslatedQuery {
        sql,
        matched_keywords: matched,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileRecord {
    pub id: i64,
    pub float_id: Option<String>,
    pub cycle_number: Option<i64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub date_time: Option<String>,
    pub pressure: Option<f64>,
    pub temperature: Option<f64>,
    pub salinity: Option<f64>,
    pub oxygen: Option<f64>,
    pub chlorophyll: Option<f64>,
    pub source_file: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub success: bool,
    pub results: Vec<ProfileRecord>,
    pub generated_query: String,
    pub matched_keywords: Vec<String>,
    pub message: String,
}

/// Translates `text` and runs the generated query against the store.
/// Execution failures are caught and surfaced as a failure-flagged empty
/// response; they never propagate to the caller.
pub async fn ask(pool: &DbPool, text: &str) -> QueryResponse {
    let TranslatedQuery {
        sql,
        matched_keywords,
    } = translate(text);

    match fetch(pool, &sql).await {
        Ok(results) => QueryResponse {
            success: true,
            message: format!("Found {} matching profiles", results.len()),
            results,
            generated_query: sql,
            matched_keywords,
        },
        Err(err) => {
            warn!("query execution failed: {err}");
            QueryResponse {
                success: false,
                results: Vec::new(),
                generated_query: sql,
                matched_keywords,
                message: format!("query failed: {err}"),
            }
        }
    }
}

async fn fetch(pool: &DbPool, sql: &str) -> sqlx::Result<Vec<ProfileRecord>> {
    let rows = sqlx::query(sql).fetch_all(pool).await?;
    rows.iter().map(record_from_row).collect()
}

fn record_from_row(row: &SqliteRow) -> sqlx::Result<ProfileRecord> {
    Ok(ProfileRecord {
        id: row.try_get("id")?,
        float_id: row.try_get("float_id")?,
        cycle_number: row.try_get("cycle_number")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        date_time: row.try_get("date_time")?,
        pressure: row.try_get("pressure")?,
        temperature: row.try_get("temperature")?,
        salinity: row.try_get("salinity")?,
        oxygen: row.try_get("oxygen")?,
        chlorophyll: row.try_get("chlorophyll")?,
        source_file: row.try_get("source_file")?,
        created_at: row.try_get("created_at")?,
    })
}
