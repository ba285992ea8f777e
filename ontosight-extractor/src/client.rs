//! Concurrency-bounded, throttled SPARQL query client.

use crate::bindings::parse_solutions;
use crate::config::SharedConfig;
use crate::error::{ExtractError, Result};
use crate::lock;
use crate::stats::{FailureRecord, RequestStats};
use reqwest::Client;
use sparesults::QuerySolution;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

struct QueuedRequest {
    query: String,
    token: CancellationToken,
    done: oneshot::Sender<Result<Vec<QuerySolution>>>,
}

#[derive(Default)]
struct QueueState {
    queue: VecDeque<QueuedRequest>,
    active: usize,
}

/// Executes SPARQL SELECT queries against one endpoint.
///
/// Every call enqueues onto an unbounded FIFO; a pump admits at most
/// `concurrency` requests at once and sleeps `query_delay` before each
/// dispatch. Completions re-invoke the pump, so there is no idle polling.
/// Submission order determines admission order; completion order is
/// unspecified.
#[derive(Clone)]
pub struct SparqlClient {
    http: Client,
    config: SharedConfig,
    stats: Arc<RequestStats>,
    state: Arc<Mutex<QueueState>>,
}

impl SparqlClient {
    pub fn new(config: SharedConfig, stats: Arc<RequestStats>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("ontosight/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(8)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            http,
            config,
            stats,
            state: Arc::new(Mutex::new(QueueState::default())),
        })
    }

    pub async fn query(&self, query: &str) -> Result<Vec<QuerySolution>> {
        self.query_with_token(query, CancellationToken::new()).await
    }

    /// A fired token resolves the call with `ExtractError::Cancelled`, which
    /// callers must treat as abandoned, not errored.
    pub async fn query_with_token(
        &self,
        query: &str,
        token: CancellationToken,
    ) -> Result<Vec<QuerySolution>> {
        let (done_tx, done_rx) = oneshot::channel();
        {
            let mut state = lock(&self.state);
            state.queue.push_back(QueuedRequest {
                query: query.to_string(),
                token,
                done: done_tx,
            });
        }
        self.pump();
        done_rx.await.map_err(|_| ExtractError::Cancelled)?
    }

    pub fn stats(&self) -> Arc<RequestStats> {
        self.stats.clone()
    }

    /// Admits queued requests while the active count is below the configured
    /// concurrency. Invoked after every enqueue and every completion.
    fn pump(&self) {
        loop {
            let concurrency = lock(&self.config).concurrency.max(1);
            let job = {
                let mut state = lock(&self.state);
                if state.active >= concurrency {
                    return;
                }
                match state.queue.pop_front() {
                    Some(job) => {
                        state.active += 1;
                        job
                    }
                    None => return,
                }
            };
            let client = self.clone();
            tokio::spawn(async move { client.run_one(job).await });
        }
    }

    async fn run_one(&self, job: QueuedRequest) {
        let delay = lock(&self.config).query_delay;
        tokio::time::sleep(delay).await;

        let endpoint = lock(&self.config).endpoint.clone();
        self.stats.begin_request();
        let result = tokio::select! {
            biased;
            _ = job.token.cancelled() => Err(ExtractError::Cancelled),
            result = self.execute(&job.query) => result,
        };
        match &result {
            Ok(rows) => {
                debug!("Query returned {} rows", rows.len());
                self.stats.finish_success();
            }
            Err(error) if error.is_cancelled() => {
                debug!("Query cancelled before completion");
                self.stats.finish_cancelled();
            }
            Err(error) => {
                warn!("Query against {} failed: {}", endpoint, error);
                self.stats.finish_failure(FailureRecord {
                    query: job.query.clone(),
                    endpoint: endpoint.to_string(),
                    message: error.to_string(),
                });
            }
        }
        let _ = job.done.send(result);

        {
            let mut state = lock(&self.state);
            state.active = state.active.saturating_sub(1);
        }
        self.pump();
    }

    async fn execute(&self, query: &str) -> Result<Vec<QuerySolution>> {
        let (endpoint, timeout_hint) = {
            let config = lock(&self.config);
            (config.endpoint.clone(), config.timeout_hint.clone())
        };
        debug!("Dispatching query to {}", endpoint);

        let response = self
            .http
            .get(endpoint.clone())
            .query(&[
                ("query", query),
                ("format", SPARQL_RESULTS_JSON),
                ("timeout", timeout_hint.as_str()),
            ])
            .header(reqwest::header::ACCEPT, SPARQL_RESULTS_JSON)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::Status {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
            });
        }

        let body = response.bytes().await?;
        parse_solutions(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RequestConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use url::Url;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const EMPTY_BODY: &str =
        r#"{ "head": { "vars": ["prop"] }, "results": { "bindings": [] } }"#;

    fn client_for(server: &MockServer, concurrency: usize) -> SparqlClient {
        let endpoint = Url::parse(&server.uri()).unwrap();
        let config = RequestConfig::new(endpoint)
            .with_query_delay(Duration::from_millis(5))
            .with_concurrency(concurrency)
            .into_shared();
        SparqlClient::new(config, Arc::new(RequestStats::new())).unwrap()
    }

    #[tokio::test]
    async fn concurrency_cap_bounds_in_flight_requests() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(EMPTY_BODY, SPARQL_RESULTS_JSON)
                    .set_delay(Duration::from_millis(100)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, 2);
        let max_pending = Arc::new(AtomicUsize::new(0));
        let max_pending_clone = max_pending.clone();
        client.stats().subscribe(Arc::new(move |snapshot| {
            max_pending_clone.fetch_max(snapshot.pending, Ordering::SeqCst);
        }));

        let mut handles = Vec::new();
        for _ in 0..6 {
            let client = client.clone();
            handles.push(tokio::spawn(async move {
                client.query("SELECT DISTINCT ?prop WHERE { ?s ?prop ?o }").await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }

        assert!(
            max_pending.load(Ordering::SeqCst) <= 2,
            "more than 2 requests were in flight at once"
        );
        let snapshot = client.stats().snapshot();
        assert_eq!(snapshot.successful, 6);
        assert_eq!(snapshot.pending, 0);
    }

    #[tokio::test]
    async fn cancelled_requests_do_not_count_as_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(EMPTY_BODY, SPARQL_RESULTS_JSON)
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, 1);
        let token = CancellationToken::new();
        let cancel = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            cancel.cancel();
        });

        let result = client
            .query_with_token("SELECT DISTINCT ?prop WHERE { ?s ?prop ?o }", token)
            .await;
        assert!(matches!(result, Err(ExtractError::Cancelled)));

        let snapshot = client.stats().snapshot();
        assert_eq!(snapshot.failed, 0);
        assert_eq!(snapshot.pending, 0);
        assert_eq!(snapshot.successful, 0);
    }

    #[tokio::test]
    async fn http_errors_are_counted_and_recorded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server, 1);
        let result = client.query("SELECT ?class WHERE { ?s a ?class }").await;
        assert!(matches!(result, Err(ExtractError::Status { status: 500, .. })));

        let stats = client.stats();
        assert_eq!(stats.snapshot().failed, 1);
        let failures = stats.failures();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].message.contains("500"));
        assert!(failures[0].query.contains("SELECT ?class"));
    }

    #[tokio::test]
    async fn queued_requests_all_complete_under_concurrency_one() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(EMPTY_BODY, SPARQL_RESULTS_JSON))
            .mount(&server)
            .await;

        let client = client_for(&server, 1);
        let mut handles = Vec::new();
        for _ in 0..4 {
            let client = client.clone();
            handles.push(tokio::spawn(async move {
                client.query("SELECT DISTINCT ?prop WHERE { ?s ?prop ?o }").await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }
        assert_eq!(client.stats().snapshot().successful, 4);
    }
}
