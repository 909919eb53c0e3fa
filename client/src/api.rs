use crate::auth::{api_scope, TokenProvider};
use crate::config::ClientConfig;
use iqcore::metadata::{DataSource, TraceabilityOrigin};
use iqcore::telemetry::MetricsRecorder;
use log::debug;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::future::Future;

/// Static capability flags advertised by a client implementation. Callers
/// branch on these instead of assuming every operation is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientFeatures {
    pub update_meta: bool,
    pub sync: bool,
    pub query: bool,
}

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("unexpected status code: {0}")]
    UnexpectedStatus(u16),
    #[error("request cancelled")]
    Cancelled,
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("decoding response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The datasource operations every client implementation exposes.
#[allow(async_fn_in_trait)]
pub trait DataSourceClient {
    async fn sync(&self, account: &str, container: &str) -> Result<(), ClientError>;
    async fn query<F>(
        &self,
        query_string: &str,
        cancel: F,
    ) -> Result<Vec<TraceabilityOrigin>, ClientError>
    where
        F: Future<Output = ()> + Send;
    async fn list(&self) -> Result<Option<Vec<DataSource>>, ClientError>;
    async fn get(&self, account: &str, container: &str)
        -> Result<Option<DataSource>, ClientError>;
    async fn create(&self, data_source: &DataSource) -> Result<Option<DataSource>, ClientError>;
    fn features(&self) -> ClientFeatures;
}

/// REST client for the IQEngine datasource API.
///
/// Token acquisition is best-effort: any provider failure is logged and the
/// request goes out without an `Authorization` header.
pub struct ApiClient<P> {
    http: reqwest::Client,
    base_url: String,
    scope: String,
    provider: Option<P>,
    metrics: MetricsRecorder,
}

impl<P: TokenProvider> ApiClient<P> {
    pub fn new(config: &ClientConfig, provider: Option<P>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            scope: api_scope(&config.app_id),
            provider,
            metrics: MetricsRecorder::new(),
        }
    }

    /// Snapshot of (requests issued, failures observed) for this client.
    pub fn metrics(&self) -> (usize, usize) {
        self.metrics.snapshot()
    }

    async fn bearer(&self) -> Option<String> {
        let provider = self.provider.as_ref()?;
        match provider.acquire_token(&self.scope).await {
            Ok(token) => Some(token),
            Err(err) => {
                debug!("token acquisition failed, proceeding unauthenticated: {err}");
                None
            }
        }
    }

    fn with_auth(&self, request: RequestBuilder, token: Option<String>) -> RequestBuilder {
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn observe<T>(&self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        self.metrics.record_request();
        if result.is_err() {
            self.metrics.record_failure();
        }
        result
    }
}

/// Normalizes a response into `Ok(None)` for empty-body successes,
/// `UnexpectedStatus` for anything other than the expected code. A 204 on a
/// GET counts as an empty-body success.
async fn read_optional<T: DeserializeOwned>(
    response: reqwest::Response,
    expected: StatusCode,
) -> Result<Option<T>, ClientError> {
    let status = response.status();
    if status == StatusCode::NO_CONTENT && expected == StatusCode::OK {
        return Ok(None);
    }
    if status != expected {
        return Err(ClientError::UnexpectedStatus(status.as_u16()));
    }
    let body = response.text().await?;
    if body.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(&body)?))
}

impl<P: TokenProvider> DataSourceClient for ApiClient<P> {
    /// Fire-and-forget metadata sync for one data source.
    async fn sync(&self, account: &str, container: &str) -> Result<(), ClientError> {
        let url = format!(
            "{}/api/datasources/{}/{}/sync",
            self.base_url, account, container
        );
        let token = self.bearer().await;
        let result = async {
            let response = self.with_auth(self.http.get(url), token).send().await?;
            response.error_for_status()?;
            Ok(())
        }
        .await;
        self.observe(result)
    }

    async fn query<F>(
        &self,
        query_string: &str,
        cancel: F,
    ) -> Result<Vec<TraceabilityOrigin>, ClientError>
    where
        F: Future<Output = ()> + Send,
    {
        let url = format!("{}/api/datasources/query?{}", self.base_url, query_string);
        let token = self.bearer().await;
        let request = self.with_auth(self.http.get(url), token);
        let fetch = async move {
            let response = request.send().await?.error_for_status()?;
            let items: Vec<serde_json::Value> = response.json().await?;
            items
                .into_iter()
                .map(|item| serde_json::from_value(item).map_err(ClientError::from))
                .collect()
        };
        let result = tokio::select! {
            result = fetch => result,
            _ = cancel => Err(ClientError::Cancelled),
        };
        self.observe(result)
    }

    async fn list(&self) -> Result<Option<Vec<DataSource>>, ClientError> {
        let url = format!("{}/api/datasources", self.base_url);
        let token = self.bearer().await;
        let result = async {
            let response = self.with_auth(self.http.get(url), token).send().await?;
            read_optional(response, StatusCode::OK).await
        }
        .await;
        self.observe(result)
    }

    async fn get(
        &self,
        account: &str,
        container: &str,
    ) -> Result<Option<DataSource>, ClientError> {
        let url = format!(
            "{}/api/datasources/{}/{}/datasource",
            self.base_url, account, container
        );
        let token = self.bearer().await;
        let result = async {
            let response = self.with_auth(self.http.get(url), token).send().await?;
            read_optional(response, StatusCode::OK).await
        }
        .await;
        self.observe(result)
    }

    async fn create(&self, data_source: &DataSource) -> Result<Option<DataSource>, ClientError> {
        let url = format!("{}/api/datasources", self.base_url);
        let token = self.bearer().await;
        let result = async {
            let response = self
                .with_auth(self.http.post(url), token)
                .json(data_source)
                .send()
                .await?;
            read_optional(response, StatusCode::CREATED).await
        }
        .await;
        self.observe(result)
    }

    fn features(&self) -> ClientFeatures {
        ClientFeatures {
            update_meta: true,
            sync: true,
            query: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{StaticTokenProvider, TokenError};
    use serde_json::json;
    use std::future;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use warp::filters::BoxedFilter;
    use warp::http::StatusCode as HttpStatus;
    use warp::Filter;

    struct FailingProvider;

    impl TokenProvider for FailingProvider {
        async fn acquire_token(&self, _scope: &str) -> Result<String, TokenError> {
            Err(TokenError::Provider("simulated outage".into()))
        }
    }

    fn serve<T: warp::Reply + Send + 'static>(routes: BoxedFilter<(T,)>) -> SocketAddr {
        let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        addr
    }

    fn client_for(addr: SocketAddr) -> ApiClient<StaticTokenProvider> {
        let config = ClientConfig {
            base_url: format!("http://{}", addr),
            app_id: "test-app".into(),
        };
        ApiClient::new(&config, None)
    }

    #[tokio::test]
    async fn list_parses_response_body() {
        let route = warp::path!("api" / "datasources")
            .and(warp::get())
            .map(|| warp::reply::json(&json!([{ "account": "a", "container": "b" }])));
        let client = client_for(serve(route.boxed()));

        let sources = client.list().await.unwrap().unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].account, "a");
        assert_eq!(client.metrics(), (1, 0));
    }

    #[tokio::test]
    async fn list_no_content_is_none_not_error() {
        let route = warp::path!("api" / "datasources")
            .map(|| warp::reply::with_status(warp::reply(), HttpStatus::NO_CONTENT));
        let client = client_for(serve(route.boxed()));

        assert!(client.list().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_surfaces_unexpected_status() {
        let route = warp::path!("api" / "datasources")
            .map(|| warp::reply::with_status(warp::reply(), HttpStatus::INTERNAL_SERVER_ERROR));
        let client = client_for(serve(route.boxed()));

        let err = client.list().await.unwrap_err();
        assert!(matches!(err, ClientError::UnexpectedStatus(500)));
        assert_eq!(client.metrics(), (1, 1));
    }

    #[tokio::test]
    async fn get_fetches_single_source() {
        let route = warp::path!("api" / "datasources" / String / String / "datasource").map(
            |account: String, container: String| {
                warp::reply::json(&json!({ "account": account, "container": container }))
            },
        );
        let client = client_for(serve(route.boxed()));

        let source = client.get("acct", "cont").await.unwrap().unwrap();
        assert_eq!(source.container, "cont");
    }

    #[tokio::test]
    async fn create_rejects_non_created_status() {
        let route = warp::path!("api" / "datasources").and(warp::post()).map(|| {
            warp::reply::with_status(warp::reply::json(&json!({})), HttpStatus::OK)
        });
        let client = client_for(serve(route.boxed()));

        let err = client.create(&DataSource::default()).await.unwrap_err();
        assert!(err.to_string().contains("200"), "got: {err}");
    }

    #[tokio::test]
    async fn create_returns_created_body() {
        let route = warp::path!("api" / "datasources").and(warp::post()).map(|| {
            warp::reply::with_status(
                warp::reply::json(&json!({ "account": "a", "container": "c" })),
                HttpStatus::CREATED,
            )
        });
        let client = client_for(serve(route.boxed()));

        let created = client.create(&DataSource::default()).await.unwrap().unwrap();
        assert_eq!(created.account, "a");
    }

    #[tokio::test]
    async fn sync_propagates_http_failure() {
        let route = warp::path!("api" / "datasources" / String / String / "sync").map(
            |_: String, _: String| {
                warp::reply::with_status(warp::reply(), HttpStatus::INTERNAL_SERVER_ERROR)
            },
        );
        let client = client_for(serve(route.boxed()));

        assert!(client.sync("acct", "cont").await.is_err());
    }

    #[tokio::test]
    async fn sync_succeeds_on_ok() {
        let route = warp::path!("api" / "datasources" / String / String / "sync")
            .map(|_: String, _: String| warp::reply());
        let client = client_for(serve(route.boxed()));

        client.sync("acct", "cont").await.unwrap();
    }

    fn auth_capturing_query_route(
        seen: Arc<Mutex<Option<String>>>,
    ) -> BoxedFilter<(warp::reply::Json,)> {
        warp::path!("api" / "datasources" / "query")
            .and(warp::header::optional::<String>("authorization"))
            .map(move |auth: Option<String>| {
                *seen.lock().unwrap() = auth;
                warp::reply::json(&json!([{ "account": "a", "container": "c" }]))
            })
            .boxed()
    }

    #[tokio::test]
    async fn query_attaches_bearer_token() {
        let seen = Arc::new(Mutex::new(None));
        let addr = serve(auth_capturing_query_route(seen.clone()));
        let config = ClientConfig {
            base_url: format!("http://{}", addr),
            app_id: "test-app".into(),
        };
        let client = ApiClient::new(&config, Some(StaticTokenProvider::new("sekrit")));

        let origins = client
            .query("account=a&container=c", future::pending())
            .await
            .unwrap();
        assert_eq!(origins[0].account, "a");
        assert_eq!(seen.lock().unwrap().as_deref(), Some("Bearer sekrit"));
    }

    #[tokio::test]
    async fn failed_token_acquisition_still_issues_request_without_header() {
        let seen = Arc::new(Mutex::new(None));
        let addr = serve(auth_capturing_query_route(seen.clone()));
        let config = ClientConfig {
            base_url: format!("http://{}", addr),
            app_id: "test-app".into(),
        };
        let client = ApiClient::new(&config, Some(FailingProvider));

        let origins = client
            .query("account=a&container=c", future::pending())
            .await
            .unwrap();
        assert_eq!(origins.len(), 1);
        assert!(seen.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_provider_sends_no_header() {
        let seen = Arc::new(Mutex::new(None));
        let client = client_for(serve(auth_capturing_query_route(seen.clone())));

        client
            .query("account=a&container=c", future::pending())
            .await
            .unwrap();
        assert!(seen.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn query_honors_cancellation_signal() {
        let route = warp::path!("api" / "datasources" / "query").and_then(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, warp::Rejection>(warp::reply::json(&Vec::<serde_json::Value>::new()))
        });
        let client = client_for(serve(route.boxed()));

        let cancel = tokio::time::sleep(Duration::from_millis(50));
        let result = client.query("account=a", cancel).await;
        assert!(matches!(result, Err(ClientError::Cancelled)));
    }

    #[tokio::test]
    async fn features_advertise_full_support() {
        let config = ClientConfig::default();
        let client: ApiClient<StaticTokenProvider> = ApiClient::new(&config, None);
        let features = client.features();
        assert!(features.update_meta && features.sync && features.query);
    }
}
