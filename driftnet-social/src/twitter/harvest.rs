//! Time-budgeted pagination loop over the keyword-search endpoint.
//!
//! The loop is an explicit state machine so the timing policy and the
//! suspension points are visible as data rather than buried in control
//! flow. Results are accumulated best-effort: on timeout or terminal
//! failure the caller gets whatever was collected so far, never an error.

use std::time::{Duration, Instant};

use driftnet_config::SearchSettings;
use driftnet_http::{HttpError, StatusCode};
use tokio::time::sleep;

use crate::twitter::canon::{normalize, CanonicalPost};
use crate::twitter::client::SearchApi;

/// Pause between successful page fetches.
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_secs(5);
/// Pause before retrying the same cursor after a rate-limit response.
/// Equal to the page delay today, but an independent policy knob.
pub const DEFAULT_BACKOFF_DELAY: Duration = Duration::from_secs(5);

/// Loop states. `Backoff` retries the same cursor; the page is not
/// considered consumed until it comes back without a 429.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Fetching,
    Backoff,
    Done,
}

pub struct Harvester {
    api: SearchApi,
    budget: Duration,
    page_delay: Duration,
    backoff_delay: Duration,
}

impl Harvester {
    /// Build a harvester from validated settings. This is the only
    /// fallible step; once constructed, [`Harvester::harvest`] cannot
    /// fail, only come back partial.
    pub fn new(settings: &SearchSettings) -> Result<Self, HttpError> {
        Ok(Self {
            api: SearchApi::new(settings)?,
            budget: settings.max_duration,
            page_delay: DEFAULT_PAGE_DELAY,
            backoff_delay: DEFAULT_BACKOFF_DELAY,
        })
    }

    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    pub fn with_backoff_delay(mut self, delay: Duration) -> Self {
        self.backoff_delay = delay;
        self
    }

    /// Collect every page of results for `keyword` within the time budget.
    ///
    /// The budget is checked before each request is issued, never after:
    /// a request already in flight when the budget runs out is allowed to
    /// complete and its records are kept.
    pub async fn harvest(&self, keyword: &str) -> Vec<CanonicalPost> {
        let keyword = sanitize_keyword(keyword);
        let started = Instant::now();

        let mut posts: Vec<CanonicalPost> = Vec::new();
        let mut cursor = String::new();
        let mut state = LoopState::Fetching;

        tracing::info!(%keyword, budget_secs = self.budget.as_secs(), "harvest.start");

        loop {
            match state {
                LoopState::Fetching => {
                    if started.elapsed() >= self.budget {
                        tracing::info!(collected = posts.len(), "harvest.budget_exhausted");
                        state = LoopState::Done;
                        continue;
                    }

                    match self.api.search(&keyword, &cursor).await {
                        Ok(page) => {
                            let next = page.next_cursor();
                            let batch = page.tweets.unwrap_or_default();
                            posts.extend(batch.iter().map(normalize));
                            tracing::info!(
                                page_size = batch.len(),
                                collected = posts.len(),
                                cursor = %cursor,
                                "harvest.page"
                            );

                            match next {
                                Some(next) => {
                                    cursor = next;
                                    sleep(self.page_delay).await;
                                }
                                None => {
                                    tracing::info!(collected = posts.len(), "harvest.exhausted");
                                    state = LoopState::Done;
                                }
                            }
                        }
                        Err(err) if err.is_status(StatusCode::TOO_MANY_REQUESTS) => {
                            state = LoopState::Backoff;
                        }
                        Err(err) => {
                            // Terminal for this invocation: keep the partial
                            // accumulator, surface nothing to the caller.
                            tracing::error!(
                                error = %err,
                                collected = posts.len(),
                                cursor = %cursor,
                                "harvest.request_failed"
                            );
                            state = LoopState::Done;
                        }
                    }
                }
                LoopState::Backoff => {
                    tracing::warn!(
                        backoff_ms = self.backoff_delay.as_millis() as u64,
                        cursor = %cursor,
                        "harvest.rate_limited"
                    );
                    sleep(self.backoff_delay).await;
                    state = LoopState::Fetching;
                }
                LoopState::Done => break,
            }
        }

        tracing::info!(
            collected = posts.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "harvest.done"
        );
        posts
    }
}

/// Strip at most one leading and one trailing literal double quote.
/// Interior quotes are left untouched.
fn sanitize_keyword(raw: &str) -> String {
    let s = raw.strip_prefix('"').unwrap_or(raw);
    let s = s.strip_suffix('"').unwrap_or(s);
    s.to_string()
}
