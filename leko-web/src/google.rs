use crate::recency::extract_date;
use chrono::NaiveDate;
use leko_http::{Auth, HttpClient, HttpError, RequestOpts};
use serde::Deserialize;
use std::borrow::Cow;
use std::time::Duration;

/// Google caps `num` at 10 per request.
const MAX_RESULTS_PER_CALL: u32 = 10;

/// One search hit, ordered by provider relevance. `date` is best-effort,
/// pulled out of the title/snippet text; hits without one are kept.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
    pub link: String,
    pub date: Option<NaiveDate>,
}

/// Client for the Google Custom Search JSON API (web vertical).
#[derive(Clone)]
pub struct GoogleSearchClient {
    http: HttpClient,
    api_key: String,
    engine_id: String,
    gl: String,
    hl: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct CseResponse {
    #[serde(default)]
    items: Vec<CseItem>,
}

#[derive(Debug, Deserialize)]
struct CseItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    link: String,
}

impl GoogleSearchClient {
    pub fn new(
        api_key: String,
        engine_id: String,
        endpoint: &str,
        gl: String,
        hl: String,
        timeout: Duration,
    ) -> Result<Self, HttpError> {
        let http = HttpClient::new(endpoint)?;
        Ok(Self {
            http,
            api_key,
            engine_id,
            gl,
            hl,
            timeout,
        })
    }

    /// Fetch up to `limit` hits for `query` (clamped to the provider's 1..=10).
    ///
    /// This boundary never raises: credentials problems, timeouts, non-2xx
    /// responses, and decode failures all come back as an empty list so the
    /// caller degrades to an ungrounded answer.
    pub async fn search(&self, query: &str, limit: u32) -> Vec<SearchHit> {
        let count = limit.clamp(1, MAX_RESULTS_PER_CALL);
        let count_str = count.to_string();

        let params: Vec<(&str, Cow<'_, str>)> = vec![
            ("cx", Cow::Borrowed(self.engine_id.as_str())),
            ("q", Cow::Borrowed(query)),
            ("num", Cow::Borrowed(count_str.as_str())),
            ("gl", Cow::Borrowed(self.gl.as_str())),
            ("hl", Cow::Borrowed(self.hl.as_str())),
        ];

        let resp: Result<CseResponse, HttpError> = self
            .http
            .get_json(
                "customsearch/v1",
                RequestOpts {
                    auth: Some(Auth::Query {
                        name: "key",
                        value: Cow::Borrowed(self.api_key.as_str()),
                    }),
                    query: Some(params),
                    timeout: Some(self.timeout),
                    // Interactive path; stale retries cost more than a miss.
                    retries: Some(0),
                    ..Default::default()
                },
            )
            .await;

        match resp {
            Ok(body) => {
                let hits: Vec<SearchHit> = body
                    .items
                    .into_iter()
                    .map(|item| {
                        let date = extract_date(&format!("{} {}", item.title, item.snippet));
                        SearchHit {
                            title: item.title,
                            snippet: item.snippet,
                            link: item.link,
                            date,
                        }
                    })
                    .collect();
                tracing::info!(
                    target: "web.google",
                    query = %query_snippet(query),
                    hit_count = hits.len(),
                    "google.search.success"
                );
                hits
            }
            Err(e) => {
                tracing::warn!(
                    target: "web.google",
                    query = %query_snippet(query),
                    error = %e,
                    "google.search.degraded_to_empty"
                );
                Vec::new()
            }
        }
    }
}

fn query_snippet(query: &str) -> String {
    if query.chars().count() > 120 {
        let cut: String = query.chars().take(120).collect();
        format!("{cut}…")
    } else {
        query.to_string()
    }
}
