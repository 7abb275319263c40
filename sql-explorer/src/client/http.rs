//! HTTP metadata client for the explorer backend REST surface

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, PRAGMA};
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::traits::MetadataSource;
use crate::schema::{
    ColumnDescriptor, DatabaseInfo, ExportFormat, IndexDescriptor, ResultSet, RowCount,
    TableDefinition, TableList,
};
use crate::{Error, Result};

/// Connection settings for [`MetadataClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: Url,
    timeout: Option<Duration>,
}

impl ClientConfig {
    /// Create a configuration for the backend mounted at `base_url`
    ///
    /// Endpoint paths are resolved relative to the base URL, so a trailing
    /// slash is appended when missing.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let mut raw = base_url.as_ref().trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }

        let base_url =
            Url::parse(&raw).map_err(|error| Error::InvalidUrl(format!("{}: {}", raw, error)))?;

        Ok(Self {
            base_url,
            timeout: None,
        })
    }

    /// Abort requests that take longer than `timeout`
    ///
    /// No timeout is applied unless this is set.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// [`MetadataSource`] backed by the explorer REST API
///
/// # Example
///
/// ```rust,no_run
/// use sql_explorer::{ClientConfig, MetadataClient, MetadataSource};
///
/// # async fn example() -> sql_explorer::Result<()> {
/// let client = MetadataClient::new(ClientConfig::new("http://localhost:8000")?)?;
/// let tables = client.fetch_table_names().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MetadataClient {
    http: reqwest::Client,
    base_url: Url,
}

impl MetadataClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        // Every call must reach the backend; schema is never cached.
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: config.base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|error| Error::InvalidUrl(format!("{}: {}", path, error)))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, table: Option<&str>) -> Result<T> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, ?table, "GET");

        let mut request = self.http.get(url);
        if let Some(table) = table {
            request = request.query(&[("table", table)]);
        }

        match request.send().await {
            Ok(response) => Self::decode(path, response).await,
            Err(error) => {
                tracing::warn!("Request to {} failed: {}", path, error);
                Err(error.into())
            }
        }
    }

    /// Turn a backend response into a payload or a structured failure
    ///
    /// Failed responses carry a JSON body; anything else is kept as a JSON
    /// string so callers always get something to show.
    async fn decode<T: DeserializeOwned>(path: &str, response: Response) -> Result<T> {
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let body = serde_json::from_slice::<Value>(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
            tracing::warn!("Backend call {} failed with {}: {}", path, status, body);
            return Err(Error::Backend {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl MetadataSource for MetadataClient {
    async fn fetch_database_info(&self) -> Result<DatabaseInfo> {
        self.get("api/info", None).await
    }

    async fn fetch_table_names(&self) -> Result<TableList> {
        self.get("api/tables", None).await
    }

    async fn fetch_table_row_count(&self, table: &str) -> Result<RowCount> {
        self.get("api/table/info", Some(table)).await
    }

    async fn fetch_table_columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        // An empty list is encoded as `null`
        let columns: Option<Vec<ColumnDescriptor>> = self.get("api/table", Some(table)).await?;
        Ok(columns.unwrap_or_default())
    }

    async fn fetch_table_definition_sql(&self, table: &str) -> Result<TableDefinition> {
        self.get("api/table/sql", Some(table)).await
    }

    async fn fetch_table_indexes(&self, table: &str) -> Result<Vec<IndexDescriptor>> {
        let indexes: Option<Vec<IndexDescriptor>> =
            self.get("api/table/indexes", Some(table)).await?;
        Ok(indexes.unwrap_or_default())
    }

    async fn execute_query(&self, sql: &str) -> Result<ResultSet> {
        let url = self.endpoint("api/query")?;
        tracing::debug!(%url, "POST query");

        match self.http.post(url).form(&[("query", sql)]).send().await {
            Ok(response) => Self::decode("api/query", response).await,
            Err(error) => {
                tracing::warn!("Query request failed: {}", error);
                Err(error.into())
            }
        }
    }

    fn export_url(&self, query: &str, format: ExportFormat) -> Result<Url> {
        let mut url = self.endpoint("api/query")?;
        let query = query.replace('\n', " ");
        url.set_query(Some(&format!(
            "format={}&query={}",
            format.as_str(),
            urlencoding::encode(&query)
        )));
        Ok(url)
    }
}
