//! PostgreSQL connection implementation

use async_trait::async_trait;
use reschema_core::{
    Connection, QueryResult, Result, Row, SchemaError, SchemaReader, StatementResult, Value,
};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tokio_postgres::types::{ToSql, Type};
use tokio_postgres::{Client, NoTls, Row as PgRow, SimpleQueryMessage};

fn format_postgres_error(error: &tokio_postgres::Error) -> String {
    match error.as_db_error() {
        Some(db_error) => {
            let mut message = db_error.message().to_string();
            if let Some(detail) = db_error.detail()
                && !detail.trim().is_empty()
            {
                message.push_str(&format!(" (detail: {})", detail));
            }
            format!("{} (code: {})", message, db_error.code().code())
        }
        None => error.to_string(),
    }
}

/// PostgreSQL connection wrapper
pub struct PostgresConnection {
    client: Mutex<Client>,
    closed: AtomicBool,
}

impl PostgresConnection {
    /// Connect to a PostgreSQL database.
    pub async fn connect(
        host: &str,
        port: u16,
        database: &str,
        user: Option<&str>,
        password: Option<&str>,
    ) -> Result<Self> {
        tracing::info!(host = %host, port = %port, database = %database, "connecting to PostgreSQL database");

        let mut config = tokio_postgres::Config::new();
        config.host(host).port(port).dbname(database);
        if let Some(u) = user {
            config.user(u);
        }
        if let Some(p) = password {
            config.password(p);
        }

        let (client, connection) = config.connect(NoTls).await.map_err(|e| {
            SchemaError::Connection(format!("Failed to connect to PostgreSQL: {}", e))
        })?;

        // The connection object drives the socket; run it until the client drops.
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "PostgreSQL connection error");
            }
        });

        tracing::info!(host = %host, database = %database, "PostgreSQL connection established");
        Ok(Self {
            client: Mutex::new(client),
            closed: AtomicBool::new(false),
        })
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(SchemaError::Connection("connection is closed".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Connection for PostgresConnection {
    fn driver_name(&self) -> &str {
        "postgres"
    }

    #[tracing::instrument(skip(self, sql, params), fields(sql_preview = %sql.chars().take(100).collect::<String>()))]
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult> {
        self.ensure_open()?;
        let client = self.client.lock().await;

        // Statements without parameters go through the simple protocol:
        // some DDL (CREATE DATABASE) is rejected by the extended protocol.
        let affected_rows = if params.is_empty() {
            let messages = client
                .simple_query(sql)
                .await
                .map_err(|e| SchemaError::Execution(format_postgres_error(&e)))?;
            messages
                .iter()
                .filter_map(|message| match message {
                    SimpleQueryMessage::CommandComplete(count) => Some(*count),
                    _ => None,
                })
                .sum()
        } else {
            let boxed = values_to_pg(params);
            let refs: Vec<&(dyn ToSql + Sync)> = boxed
                .iter()
                .map(|p| p.as_ref() as &(dyn ToSql + Sync))
                .collect();
            client
                .execute(sql, &refs)
                .await
                .map_err(|e| SchemaError::Execution(format_postgres_error(&e)))?
        };

        tracing::debug!(affected_rows, "statement executed");
        Ok(StatementResult { affected_rows })
    }

    #[tracing::instrument(skip(self, sql, params), fields(sql_preview = %sql.chars().take(100).collect::<String>()))]
    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        self.ensure_open()?;
        let client = self.client.lock().await;

        let boxed = values_to_pg(params);
        let refs: Vec<&(dyn ToSql + Sync)> = boxed
            .iter()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect();

        let pg_rows = client
            .query(sql, &refs)
            .await
            .map_err(|e| SchemaError::Execution(format_postgres_error(&e)))?;

        let columns: Vec<String> = pg_rows
            .first()
            .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();

        let mut rows = Vec::with_capacity(pg_rows.len());
        for pg_row in &pg_rows {
            let mut values = Vec::with_capacity(pg_row.len());
            for idx in 0..pg_row.len() {
                values.push(pg_row_value(pg_row, idx)?);
            }
            rows.push(Row::new(columns.clone(), values));
        }

        tracing::debug!(row_count = rows.len(), "query executed");
        Ok(QueryResult { columns, rows })
    }

    async fn close(&self) -> Result<()> {
        tracing::info!("closing PostgreSQL connection");
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn as_schema_reader(&self) -> &dyn SchemaReader {
        self
    }
}

/// Convert bound values to owned ToSql trait objects
fn values_to_pg(values: &[Value]) -> Vec<Box<dyn ToSql + Sync + Send>> {
    values.iter().map(value_to_pg).collect()
}

fn value_to_pg(value: &Value) -> Box<dyn ToSql + Sync + Send> {
    match value {
        Value::Null => Box::new(Option::<i32>::None),
        Value::Bool(v) => Box::new(*v),
        Value::Int16(v) => Box::new(*v),
        Value::Int32(v) => Box::new(*v),
        Value::Int64(v) => Box::new(*v),
        Value::Float32(v) => Box::new(*v),
        Value::Float64(v) => Box::new(*v),
        Value::Decimal(v) => Box::new(v.clone()),
        Value::String(v) => Box::new(v.clone()),
        Value::Bytes(v) => Box::new(v.clone()),
        Value::Uuid(v) => Box::new(*v),
        Value::Date(v) => Box::new(*v),
        Value::Time(v) => Box::new(*v),
        Value::DateTime(v) => Box::new(*v),
        Value::DateTimeUtc(v) => Box::new(*v),
    }
}

/// Decode a result cell into a core value by its wire type.
fn pg_row_value(row: &PgRow, idx: usize) -> Result<Value> {
    let column_type = row.columns()[idx].type_().clone();

    fn get<'a, T>(row: &'a PgRow, idx: usize) -> Result<Option<T>>
    where
        T: tokio_postgres::types::FromSql<'a>,
    {
        row.try_get(idx)
            .map_err(|e| SchemaError::Execution(format_postgres_error(&e)))
    }

    let value = if column_type == Type::BOOL {
        get::<bool>(row, idx)?.map(Value::Bool)
    } else if column_type == Type::INT2 {
        get::<i16>(row, idx)?.map(Value::Int16)
    } else if column_type == Type::INT4 {
        get::<i32>(row, idx)?.map(Value::Int32)
    } else if column_type == Type::INT8 {
        get::<i64>(row, idx)?.map(Value::Int64)
    } else if column_type == Type::OID {
        get::<u32>(row, idx)?.map(|v| Value::Int64(v as i64))
    } else if column_type == Type::FLOAT4 {
        get::<f32>(row, idx)?.map(Value::Float32)
    } else if column_type == Type::FLOAT8 {
        get::<f64>(row, idx)?.map(Value::Float64)
    } else if column_type == Type::BYTEA {
        get::<Vec<u8>>(row, idx)?.map(Value::Bytes)
    } else if column_type == Type::UUID {
        get::<uuid::Uuid>(row, idx)?.map(Value::Uuid)
    } else if column_type == Type::DATE {
        get::<chrono::NaiveDate>(row, idx)?.map(Value::Date)
    } else if column_type == Type::TIME {
        get::<chrono::NaiveTime>(row, idx)?.map(Value::Time)
    } else if column_type == Type::TIMESTAMP {
        get::<chrono::NaiveDateTime>(row, idx)?.map(Value::DateTime)
    } else if column_type == Type::TIMESTAMPTZ {
        get::<chrono::DateTime<chrono::Utc>>(row, idx)?.map(Value::DateTimeUtc)
    } else if column_type == Type::TEXT
        || column_type == Type::VARCHAR
        || column_type == Type::BPCHAR
        || column_type == Type::NAME
    {
        get::<String>(row, idx)?.map(Value::String)
    } else {
        // Anything else (NUMERIC, arrays, …) is surfaced as text when the
        // wire format allows it.
        get::<String>(row, idx).unwrap_or_default().map(Value::String)
    };

    Ok(value.unwrap_or(Value::Null))
}
