//! MySQL connection implementation

use async_trait::async_trait;
use chrono::{Datelike, Timelike};
use mysql_async::consts::ColumnType;
use mysql_async::{Conn, Opts, OptsBuilder, Pool, PoolConstraints, PoolOpts, prelude::*};
use reschema_core::{
    Connection, QueryResult, Result, Row, SchemaError, SchemaReader, StatementResult, Value,
};
use std::sync::atomic::{AtomicBool, Ordering};

/// MySQL connection wrapper.
///
/// The pool is constrained to exactly one connection so that
/// `LAST_INSERT_ID()` and session state behave like a single connection.
pub struct MySqlConnection {
    pool: Pool,
    closed: AtomicBool,
}

impl MySqlConnection {
    /// Connect to a MySQL server, optionally selecting a database.
    pub async fn connect(
        host: &str,
        port: u16,
        database: Option<&str>,
        user: Option<&str>,
        password: Option<&str>,
    ) -> Result<Self> {
        tracing::info!(host = %host, port = %port, database = ?database, "connecting to MySQL database");

        let mut opts_builder = OptsBuilder::from_opts(Opts::default())
            .ip_or_hostname(host)
            .tcp_port(port);

        if let Some(db) = database {
            opts_builder = opts_builder.db_name(Some(db));
        }
        if let Some(u) = user {
            opts_builder = opts_builder.user(Some(u));
        }
        if let Some(p) = password {
            opts_builder = opts_builder.pass(Some(p));
        }

        let constraints = PoolConstraints::new(1, 1).ok_or_else(|| {
            SchemaError::Connection("Failed to configure MySQL pool constraints".into())
        })?;
        let pool_opts = PoolOpts::default()
            .with_constraints(constraints)
            .with_reset_connection(false);
        opts_builder = opts_builder.pool_opts(pool_opts);

        let pool = Pool::new(Opts::from(opts_builder));

        // Verify connectivity by acquiring and releasing a connection.
        pool.get_conn()
            .await
            .map_err(|e| SchemaError::Connection(format!("Failed to connect to MySQL: {}", e)))?;

        tracing::info!(host = %host, "MySQL connection established");
        Ok(Self {
            pool,
            closed: AtomicBool::new(false),
        })
    }

    async fn conn(&self) -> Result<Conn> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(SchemaError::Connection("connection is closed".into()));
        }
        self.pool
            .get_conn()
            .await
            .map_err(|e| SchemaError::Connection(format!("Failed to acquire connection: {}", e)))
    }
}

#[async_trait]
impl Connection for MySqlConnection {
    fn driver_name(&self) -> &str {
        "mysql"
    }

    #[tracing::instrument(skip(self, sql, params), fields(sql_preview = %sql.chars().take(100).collect::<String>()))]
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult> {
        let mut conn = self.conn().await?;

        if params.is_empty() {
            conn.query_drop(sql)
                .await
                .map_err(|e| SchemaError::Execution(e.to_string()))?;
        } else {
            conn.exec_drop(sql, values_to_mysql(params))
                .await
                .map_err(|e| SchemaError::Execution(e.to_string()))?;
        }

        let affected_rows = conn.affected_rows();
        tracing::debug!(affected_rows, "statement executed");
        Ok(StatementResult { affected_rows })
    }

    #[tracing::instrument(skip(self, sql, params), fields(sql_preview = %sql.chars().take(100).collect::<String>()))]
    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        let mut conn = self.conn().await?;

        let mysql_rows: Vec<mysql_async::Row> = if params.is_empty() {
            conn.query(sql)
                .await
                .map_err(|e| SchemaError::Execution(e.to_string()))?
        } else {
            conn.exec(sql, values_to_mysql(params))
                .await
                .map_err(|e| SchemaError::Execution(e.to_string()))?
        };

        let columns: Vec<String> = mysql_rows
            .first()
            .map(|row| {
                row.columns_ref()
                    .iter()
                    .map(|c| c.name_str().to_string())
                    .collect()
            })
            .unwrap_or_default();

        let mut rows = Vec::with_capacity(mysql_rows.len());
        for mysql_row in mysql_rows {
            let column_types: Vec<ColumnType> = mysql_row
                .columns_ref()
                .iter()
                .map(|c| c.column_type())
                .collect();
            let values = mysql_row
                .unwrap()
                .into_iter()
                .zip(column_types)
                .map(|(value, column_type)| mysql_value_to_value(value, column_type))
                .collect();
            rows.push(Row::new(columns.clone(), values));
        }

        tracing::debug!(row_count = rows.len(), "query executed");
        Ok(QueryResult { columns, rows })
    }

    async fn close(&self) -> Result<()> {
        tracing::info!("closing MySQL connection");
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

/// Convert bound values to mysql_async values (positional parameters)
fn values_to_mysql(values: &[Value]) -> Vec<mysql_async::Value> {
    values.iter().map(value_to_mysql).collect()
}

fn value_to_mysql(value: &Value) -> mysql_async::Value {
    match value {
        Value::Null => mysql_async::Value::NULL,
        Value::Bool(b) => mysql_async::Value::Int(if *b { 1 } else { 0 }),
        Value::Int16(i) => mysql_async::Value::Int(*i as i64),
        Value::Int32(i) => mysql_async::Value::Int(*i as i64),
        Value::Int64(i) => mysql_async::Value::Int(*i),
        Value::Float32(f) => mysql_async::Value::Float(*f),
        Value::Float64(f) => mysql_async::Value::Double(*f),
        Value::Decimal(d) => mysql_async::Value::Bytes(d.clone().into_bytes()),
        Value::String(s) => mysql_async::Value::Bytes(s.clone().into_bytes()),
        Value::Bytes(b) => mysql_async::Value::Bytes(b.clone()),
        Value::Uuid(u) => mysql_async::Value::Bytes(u.to_string().into_bytes()),
        Value::Date(d) => {
            mysql_async::Value::Date(d.year() as u16, d.month() as u8, d.day() as u8, 0, 0, 0, 0)
        }
        Value::Time(t) => mysql_async::Value::Time(
            false,
            0,
            t.hour() as u8,
            t.minute() as u8,
            t.second() as u8,
            t.nanosecond() / 1_000,
        ),
        Value::DateTime(dt) => mysql_async::Value::Date(
            dt.year() as u16,
            dt.month() as u8,
            dt.day() as u8,
            dt.hour() as u8,
            dt.minute() as u8,
            dt.second() as u8,
            dt.nanosecond() / 1_000,
        ),
        Value::DateTimeUtc(dt) => {
            let naive = dt.naive_utc();
            value_to_mysql(&Value::DateTime(naive))
        }
    }
}

/// Convert a mysql_async value to a core value, using column type metadata
/// to interpret byte strings from the text protocol.
fn mysql_value_to_value(value: mysql_async::Value, column_type: ColumnType) -> Value {
    match value {
        mysql_async::Value::NULL => Value::Null,
        mysql_async::Value::Bytes(bytes) => match String::from_utf8(bytes) {
            Ok(s) => match column_type {
                ColumnType::MYSQL_TYPE_TINY
                | ColumnType::MYSQL_TYPE_SHORT
                | ColumnType::MYSQL_TYPE_LONG
                | ColumnType::MYSQL_TYPE_LONGLONG
                | ColumnType::MYSQL_TYPE_INT24
                | ColumnType::MYSQL_TYPE_YEAR => {
                    s.parse::<i64>().map(Value::Int64).unwrap_or(Value::String(s))
                }
                ColumnType::MYSQL_TYPE_FLOAT => s
                    .parse::<f32>()
                    .map(Value::Float32)
                    .unwrap_or(Value::String(s)),
                ColumnType::MYSQL_TYPE_DOUBLE => s
                    .parse::<f64>()
                    .map(Value::Float64)
                    .unwrap_or(Value::String(s)),
                ColumnType::MYSQL_TYPE_DECIMAL | ColumnType::MYSQL_TYPE_NEWDECIMAL => {
                    Value::Decimal(s)
                }
                _ => Value::String(s),
            },
            Err(err) => Value::Bytes(err.into_bytes()),
        },
        mysql_async::Value::Int(i) => Value::Int64(i),
        mysql_async::Value::UInt(u) => {
            if u <= i64::MAX as u64 {
                Value::Int64(u as i64)
            } else {
                Value::String(u.to_string())
            }
        }
        mysql_async::Value::Float(f) => Value::Float32(f),
        mysql_async::Value::Double(d) => Value::Float64(d),
        mysql_async::Value::Date(year, month, day, hour, minute, second, micro) => {
            let date = chrono::NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32);
            match date {
                Some(date) if hour == 0 && minute == 0 && second == 0 && micro == 0 => {
                    Value::Date(date)
                }
                Some(date) => date
                    .and_hms_micro_opt(hour as u32, minute as u32, second as u32, micro)
                    .map(Value::DateTime)
                    .unwrap_or(Value::Null),
                None => Value::Null,
            }
        }
        mysql_async::Value::Time(negative, days, hours, minutes, seconds, micros) => {
            let total_hours = (days as u32) * 24 + (hours as u32);
            let sign = if negative { "-" } else { "" };
            Value::String(format!(
                "{}{:02}:{:02}:{:02}.{:06}",
                sign, total_hours, minutes, seconds, micros
            ))
        }
    }
}
