//! Fixture explorer backend
//!
//! Serves the explorer REST surface from an in-memory SQLite database so the
//! client can be exercised over real HTTP.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row, ValueRef};

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE "users" (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        status TEXT DEFAULT 'active'
    )"#,
    r#"CREATE UNIQUE INDEX "idx_users_email" ON "users" ("email")"#,
    r#"CREATE INDEX "idx_users_name_status" ON "users" ("name", "status")"#,
    r#"CREATE TABLE "logs" (line TEXT)"#,
    r#"INSERT INTO users (name, email, status) VALUES
        ('Ada', 'ada@example.com', 'active'),
        ('Linus', 'linus@example.com', NULL)"#,
];

#[derive(Clone)]
struct ApplicationState {
    pool: SqlitePool,
}

#[derive(Deserialize)]
struct TableParameter {
    table: String,
}

#[derive(Deserialize)]
struct QueryForm {
    query: String,
}

#[derive(Deserialize)]
struct ExportParameters {
    format: Option<String>,
    query: String,
}

pub struct Backend {
    pub base_url: String,
}

/// Start the fixture backend on an ephemeral port
pub async fn spawn_backend() -> Backend {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(&pool)
            .await
            .expect("Failed to seed fixture database");
    }

    let app = Router::new()
        .route("/api/info", get(info_handler))
        .route("/api/tables", get(tables_handler))
        .route("/api/table", get(table_handler))
        .route("/api/table/info", get(table_info_handler))
        .route("/api/table/sql", get(table_sql_handler))
        .route("/api/table/indexes", get(table_indexes_handler))
        .route("/api/query", get(export_handler).post(query_handler))
        .with_state(ApplicationState { pool });

    serve(app).await
}

/// Serve `app` on an ephemeral port
pub async fn serve(app: Router) -> Backend {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fixture backend");
    let address = listener.local_addr().expect("No local address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Fixture backend error");
    });

    Backend {
        base_url: format!("http://{}/", address),
    }
}

fn render_error(status: StatusCode, error: impl ToString) -> Response {
    (
        status,
        Json(json!({
            "code": "error",
            "message": error.to_string()
        })),
    )
        .into_response()
}

/// Column names and positional values of a statement result
async fn run(
    pool: &SqlitePool,
    sql: &str,
) -> Result<(Vec<String>, Vec<Vec<Value>>), sqlx::Error> {
    let rows = sqlx::query(sql).fetch_all(pool).await?;

    let columns = rows
        .first()
        .map(|row| {
            row.columns()
                .iter()
                .map(|column| column.name().to_string())
                .collect()
        })
        .unwrap_or_default();

    let values = rows.iter().map(row_values).collect();
    Ok((columns, values))
}

/// Rows keyed by column name; `null` when there are none
async fn run_as_objects(pool: &SqlitePool, sql: &str) -> Result<Value, sqlx::Error> {
    let (columns, rows) = run(pool, sql).await?;
    if rows.is_empty() {
        return Ok(Value::Null);
    }

    let objects = rows
        .into_iter()
        .map(|row| {
            let object: Map<String, Value> = columns.iter().cloned().zip(row).collect();
            Value::Object(object)
        })
        .collect();
    Ok(Value::Array(objects))
}

fn row_values(row: &SqliteRow) -> Vec<Value> {
    (0..row.columns().len())
        .map(|index| cell_value(row, index))
        .collect()
}

fn cell_value(row: &SqliteRow, index: usize) -> Value {
    match row.try_get_raw(index) {
        Ok(raw) if !raw.is_null() => {}
        _ => return Value::Null,
    }

    if let Ok(value) = row.try_get::<i64, _>(index) {
        return json!(value);
    }
    if let Ok(value) = row.try_get::<f64, _>(index) {
        return json!(value);
    }
    if let Ok(value) = row.try_get::<String, _>(index) {
        return Value::String(value);
    }
    if let Ok(value) = row.try_get::<Vec<u8>, _>(index) {
        return Value::String(String::from_utf8_lossy(&value).into_owned());
    }
    Value::Null
}

async fn info_handler(State(state): State<ApplicationState>) -> Response {
    let counts = sqlx::query(
        "SELECT (SELECT COUNT(*) FROM sqlite_master WHERE type='table'), \
                (SELECT COUNT(*) FROM sqlite_master WHERE type='index')",
    )
    .fetch_one(&state.pool)
    .await;

    let page_count = sqlx::query_scalar::<_, i64>("PRAGMA page_count")
        .fetch_one(&state.pool)
        .await;
    let page_size = sqlx::query_scalar::<_, i64>("PRAGMA page_size")
        .fetch_one(&state.pool)
        .await;

    match (counts, page_count, page_size) {
        (Ok(counts), Ok(page_count), Ok(page_size)) => {
            let tables: i64 = counts.get(0);
            let indexes: i64 = counts.get(1);
            Json(json!({
                "filename": "fixture.db",
                "fullname": "/tmp/fixture.db",
                "size": page_count * page_size,
                "number_of_tables": tables,
                "number_of_indexes": indexes
            }))
            .into_response()
        }
        (Err(error), _, _) | (_, Err(error), _) | (_, _, Err(error)) => {
            render_error(StatusCode::INTERNAL_SERVER_ERROR, error)
        }
    }
}

async fn tables_handler(State(state): State<ApplicationState>) -> Response {
    match run(&state.pool, "SELECT name FROM sqlite_master WHERE type='table';").await {
        Ok((_, rows)) => {
            let tables: Vec<Value> = rows
                .into_iter()
                .filter_map(|row| row.into_iter().next())
                .collect();
            Json(json!({ "tables": tables })).into_response()
        }
        Err(error) => render_error(StatusCode::INTERNAL_SERVER_ERROR, error),
    }
}

async fn table_handler(
    State(state): State<ApplicationState>,
    Query(parameter): Query<TableParameter>,
) -> Response {
    let sql = format!("PRAGMA table_info({});", parameter.table);
    match run_as_objects(&state.pool, &sql).await {
        Ok(columns) => Json(columns).into_response(),
        Err(error) => render_error(StatusCode::INTERNAL_SERVER_ERROR, error),
    }
}

async fn table_info_handler(
    State(state): State<ApplicationState>,
    Query(parameter): Query<TableParameter>,
) -> Response {
    let sql = format!("SELECT COUNT(*) FROM {};", parameter.table);
    match sqlx::query_scalar::<_, i64>(&sql).fetch_one(&state.pool).await {
        Ok(row_count) => {
            Json(json!({ "row_count": row_count, "indexes_count": 0 })).into_response()
        }
        Err(error) => render_error(StatusCode::INTERNAL_SERVER_ERROR, error),
    }
}

async fn table_sql_handler(
    State(state): State<ApplicationState>,
    Query(parameter): Query<TableParameter>,
) -> Response {
    let sql = format!(
        "SELECT sql FROM sqlite_master WHERE type='table' AND name='{}'",
        parameter.table
    );
    match run(&state.pool, &sql).await {
        Ok((_, rows)) => match rows.into_iter().next().and_then(|row| row.into_iter().next()) {
            Some(definition) => Json(json!({ "sql": definition })).into_response(),
            None => render_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("no such table: {}", parameter.table),
            ),
        },
        Err(error) => render_error(StatusCode::INTERNAL_SERVER_ERROR, error),
    }
}

async fn table_indexes_handler(
    State(state): State<ApplicationState>,
    Query(parameter): Query<TableParameter>,
) -> Response {
    let sql = format!(
        "SELECT * FROM sqlite_master WHERE type='index' AND tbl_name='{}'",
        parameter.table
    );
    match run_as_objects(&state.pool, &sql).await {
        Ok(indexes) => Json(indexes).into_response(),
        Err(error) => render_error(StatusCode::INTERNAL_SERVER_ERROR, error),
    }
}

async fn query_handler(
    State(state): State<ApplicationState>,
    Form(form): Form<QueryForm>,
) -> Response {
    if form.query.trim().is_empty() {
        return render_error(StatusCode::BAD_REQUEST, "Query missing");
    }

    match run(&state.pool, &form.query).await {
        Ok((columns, rows)) => Json(json!({ "columns": columns, "rows": rows })).into_response(),
        Err(error) => render_error(StatusCode::INTERNAL_SERVER_ERROR, error),
    }
}

async fn export_handler(
    State(state): State<ApplicationState>,
    Query(parameters): Query<ExportParameters>,
) -> Response {
    let (columns, rows) = match run(&state.pool, &parameters.query).await {
        Ok(result) => result,
        Err(error) => return render_error(StatusCode::INTERNAL_SERVER_ERROR, error),
    };

    match parameters.format.as_deref() {
        Some("csv") => {
            let mut body = columns.join(",");
            body.push('\n');
            for row in rows {
                let record: Vec<String> = row
                    .iter()
                    .map(|value| match value {
                        Value::Null => String::new(),
                        Value::String(text) => text.clone(),
                        other => other.to_string(),
                    })
                    .collect();
                body.push_str(&record.join(","));
                body.push('\n');
            }
            ([(header::CONTENT_TYPE, "text/csv")], body).into_response()
        }
        _ => {
            let objects: Vec<Value> = rows
                .into_iter()
                .map(|row| Value::Object(columns.iter().cloned().zip(row).collect()))
                .collect();
            Json(objects).into_response()
        }
    }
}
