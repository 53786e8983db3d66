//! MS SQL Server connection implementation using tiberius

use async_trait::async_trait;
use reschema_core::{
    Connection, QueryResult, Result, Row, SchemaError, SchemaReader, StatementResult, Value,
};
use std::sync::atomic::{AtomicBool, Ordering};
use tiberius::{AuthMethod, Client, ColumnData, Config, EncryptionLevel, Row as TiberiusRow};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

/// MS SQL Server connection errors
#[derive(Debug, thiserror::Error)]
pub enum MssqlConnectionError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Connection is closed")]
    ConnectionClosed,

    #[error("Tiberius error: {0}")]
    Tiberius(#[from] tiberius::error::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<MssqlConnectionError> for SchemaError {
    fn from(err: MssqlConnectionError) -> Self {
        SchemaError::Connection(err.to_string())
    }
}

/// MS SQL Server connection using tiberius
pub struct MssqlConnection {
    client: Mutex<Client<Compat<TcpStream>>>,
    closed: AtomicBool,
}

impl MssqlConnection {
    /// Connect to a SQL Server instance.
    #[tracing::instrument(skip(password))]
    pub async fn connect(
        host: &str,
        port: u16,
        database: Option<&str>,
        username: Option<&str>,
        password: Option<&str>,
        trust_cert: bool,
    ) -> std::result::Result<Self, MssqlConnectionError> {
        tracing::debug!("connecting to MS SQL Server at {}:{}", host, port);

        let mut config = Config::new();
        config.host(host);
        config.port(port);

        if let Some(db) = database {
            config.database(db);
        }

        if trust_cert {
            config.trust_cert();
        }

        config.encryption(EncryptionLevel::Required);

        match (username, password) {
            (Some(user), Some(pass)) => {
                config.authentication(AuthMethod::sql_server(user, pass));
            }
            (Some(user), None) => {
                config.authentication(AuthMethod::sql_server(user, ""));
            }
            (None, _) => {
                return Err(MssqlConnectionError::AuthenticationFailed(
                    "SQL Server authentication requires a username".to_string(),
                ));
            }
        }

        let tcp = TcpStream::connect(config.get_addr())
            .await
            .map_err(|e| MssqlConnectionError::ConnectionFailed(e.to_string()))?;
        tcp.set_nodelay(true)?;

        let client = Client::connect(config, tcp.compat_write())
            .await
            .map_err(|e| MssqlConnectionError::ConnectionFailed(e.to_string()))?;

        tracing::debug!("successfully connected to MS SQL Server");
        Ok(Self {
            client: Mutex::new(client),
            closed: AtomicBool::new(false),
        })
    }

    fn ensure_open(&self) -> std::result::Result<(), MssqlConnectionError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(MssqlConnectionError::ConnectionClosed);
        }
        Ok(())
    }
}

#[async_trait]
impl Connection for MssqlConnection {
    fn driver_name(&self) -> &str {
        "mssql"
    }

    #[tracing::instrument(skip(self, sql, params), fields(sql_preview = %sql.chars().take(100).collect::<String>()))]
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult> {
        self.ensure_open()?;
        let mut client = self.client.lock().await;

        let tiberius_params = values_to_tiberius_params(params);
        let param_refs: Vec<&dyn tiberius::ToSql> = tiberius_params
            .iter()
            .map(|p| p as &dyn tiberius::ToSql)
            .collect();

        let exec_result = client
            .execute(sql, &param_refs[..])
            .await
            .map_err(|e| SchemaError::Execution(e.to_string()))?;

        let affected_rows = exec_result.rows_affected().iter().sum::<u64>();
        tracing::debug!(affected_rows, "statement executed");
        Ok(StatementResult { affected_rows })
    }

    #[tracing::instrument(skip(self, sql, params), fields(sql_preview = %sql.chars().take(100).collect::<String>()))]
    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        self.ensure_open()?;
        let mut client = self.client.lock().await;

        let tiberius_params = values_to_tiberius_params(params);
        let param_refs: Vec<&dyn tiberius::ToSql> = tiberius_params
            .iter()
            .map(|p| p as &dyn tiberius::ToSql)
            .collect();

        let stream = client
            .query(sql, &param_refs[..])
            .await
            .map_err(|e| SchemaError::Execution(e.to_string()))?;

        let tiberius_rows = stream
            .into_first_result()
            .await
            .map_err(|e| SchemaError::Execution(e.to_string()))?;

        let columns: Vec<String> = tiberius_rows
            .first()
            .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();

        let mut rows = Vec::with_capacity(tiberius_rows.len());
        for tiberius_row in tiberius_rows {
            let values = tiberius_row_to_values(tiberius_row)?;
            rows.push(Row::new(columns.clone(), values));
        }

        tracing::debug!(row_count = rows.len(), "query executed");
        Ok(QueryResult { columns, rows })
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        tracing::debug!("MS SQL Server connection closed");
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn as_schema_reader(&self) -> &dyn SchemaReader {
        self
    }
}

/// Convert a tiberius row to values by consuming the row
fn tiberius_row_to_values(row: TiberiusRow) -> Result<Vec<Value>> {
    let mut values = Vec::new();
    for col_data in row.into_iter() {
        values.push(column_data_to_value(col_data)?);
    }
    Ok(values)
}

/// Convert tiberius ColumnData to a core value
fn column_data_to_value(col_data: ColumnData<'static>) -> Result<Value> {
    let value = match col_data {
        ColumnData::Bit(v) => v.map(Value::Bool),
        ColumnData::U8(v) => v.map(|v| Value::Int16(v as i16)),
        ColumnData::I16(v) => v.map(Value::Int16),
        ColumnData::I32(v) => v.map(Value::Int32),
        ColumnData::I64(v) => v.map(Value::Int64),
        ColumnData::F32(v) => v.map(Value::Float32),
        ColumnData::F64(v) => v.map(Value::Float64),
        ColumnData::String(v) => v.map(|v| Value::String(v.into_owned())),
        ColumnData::Guid(v) => v.map(Value::Uuid),
        ColumnData::Binary(v) => v.map(|v| Value::Bytes(v.into_owned())),
        ColumnData::Numeric(v) => v.map(|v| Value::Decimal(v.to_string())),
        ColumnData::DateTime(v) => v.map(|v| {
            let dt = chrono::NaiveDateTime::new(
                chrono::NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or_default()
                    + chrono::Duration::days(v.days() as i64),
                chrono::NaiveTime::from_num_seconds_from_midnight_opt(
                    (v.seconds_fragments() as f64 / 300.0) as u32,
                    0,
                )
                .unwrap_or_default(),
            );
            Value::DateTime(dt)
        }),
        ColumnData::SmallDateTime(v) => v.map(|v| {
            let dt = chrono::NaiveDateTime::new(
                chrono::NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or_default()
                    + chrono::Duration::days(v.days() as i64),
                chrono::NaiveTime::from_num_seconds_from_midnight_opt(
                    (v.seconds_fragments() as u32) * 60,
                    0,
                )
                .unwrap_or_default(),
            );
            Value::DateTime(dt)
        }),
        ColumnData::DateTime2(v) => v.map(|v| {
            let date = v.date();
            let time = v.time();
            let dt = chrono::NaiveDateTime::new(
                chrono::NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or_default()
                    + chrono::Duration::days(date.days() as i64),
                chrono::NaiveTime::from_num_seconds_from_midnight_opt(
                    (time.increments() / 10_000_000) as u32,
                    ((time.increments() % 10_000_000) * 100) as u32,
                )
                .unwrap_or_default(),
            );
            Value::DateTime(dt)
        }),
        ColumnData::DateTimeOffset(v) => v.map(|v| {
            let dt2 = v.datetime2();
            let date = dt2.date();
            let time = dt2.time();
            let naive = chrono::NaiveDateTime::new(
                chrono::NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or_default()
                    + chrono::Duration::days(date.days() as i64),
                chrono::NaiveTime::from_num_seconds_from_midnight_opt(
                    (time.increments() / 10_000_000) as u32,
                    ((time.increments() % 10_000_000) * 100) as u32,
                )
                .unwrap_or_default(),
            );
            Value::DateTimeUtc(chrono::DateTime::from_naive_utc_and_offset(
                naive,
                chrono::Utc,
            ))
        }),
        ColumnData::Date(v) => v.map(|v| {
            Value::Date(
                chrono::NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or_default()
                    + chrono::Duration::days(v.days() as i64),
            )
        }),
        ColumnData::Time(v) => v.map(|v| {
            Value::Time(
                chrono::NaiveTime::from_num_seconds_from_midnight_opt(
                    (v.increments() / 10_000_000) as u32,
                    ((v.increments() % 10_000_000) * 100) as u32,
                )
                .unwrap_or_default(),
            )
        }),
        ColumnData::Xml(v) => v.map(|v| Value::String(v.into_owned().into_string())),
    };

    Ok(value.unwrap_or(Value::Null))
}

/// Container for tiberius parameter values
#[derive(Debug)]
pub(crate) enum TiberiusParam {
    Null,
    Bool(bool),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    String(String),
    Bytes(Vec<u8>),
    Uuid(uuid::Uuid),
}

impl tiberius::ToSql for TiberiusParam {
    fn to_sql(&self) -> ColumnData<'_> {
        match self {
            TiberiusParam::Null => ColumnData::I32(None),
            TiberiusParam::Bool(v) => ColumnData::Bit(Some(*v)),
            TiberiusParam::I16(v) => ColumnData::I16(Some(*v)),
            TiberiusParam::I32(v) => ColumnData::I32(Some(*v)),
            TiberiusParam::I64(v) => ColumnData::I64(Some(*v)),
            TiberiusParam::F32(v) => ColumnData::F32(Some(*v)),
            TiberiusParam::F64(v) => ColumnData::F64(Some(*v)),
            TiberiusParam::String(v) => {
                ColumnData::String(Some(std::borrow::Cow::Borrowed(v.as_str())))
            }
            TiberiusParam::Bytes(v) => {
                ColumnData::Binary(Some(std::borrow::Cow::Borrowed(v.as_slice())))
            }
            TiberiusParam::Uuid(v) => ColumnData::Guid(Some(*v)),
        }
    }
}

/// Convert bound values to tiberius parameters
pub(crate) fn values_to_tiberius_params(values: &[Value]) -> Vec<TiberiusParam> {
    values
        .iter()
        .map(|value| match value {
            Value::Null => TiberiusParam::Null,
            Value::Bool(b) => TiberiusParam::Bool(*b),
            Value::Int16(i) => TiberiusParam::I16(*i),
            Value::Int32(i) => TiberiusParam::I32(*i),
            Value::Int64(i) => TiberiusParam::I64(*i),
            Value::Float32(f) => TiberiusParam::F32(*f),
            Value::Float64(f) => TiberiusParam::F64(*f),
            Value::Decimal(d) => TiberiusParam::String(d.clone()),
            Value::String(s) => TiberiusParam::String(s.clone()),
            Value::Bytes(b) => TiberiusParam::Bytes(b.clone()),
            Value::Uuid(u) => TiberiusParam::Uuid(*u),
            Value::Date(d) => TiberiusParam::String(d.to_string()),
            Value::Time(t) => TiberiusParam::String(t.to_string()),
            Value::DateTime(dt) => TiberiusParam::String(dt.to_string()),
            Value::DateTimeUtc(dt) => TiberiusParam::String(dt.to_string()),
        })
        .collect()
}

impl std::fmt::Debug for MssqlConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MssqlConnection")
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish()
    }
}
