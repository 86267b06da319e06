use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

const MAX_ATTEMPTS: usize = 5;
const BASE_DELAY: Duration = Duration::from_secs(2);
const MAX_DELAY: Duration = Duration::from_secs(60);

pub(crate) fn is_rate_limited(status: StatusCode, body: &str) -> bool {
    if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::SERVICE_UNAVAILABLE {
        return true;
    }
    let lower = body.to_lowercase();
    lower.contains("rate limit")
        || lower.contains("rate_limit")
        || lower.contains("too many requests")
        || lower.contains("quota")
}

pub(crate) fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get("retry-after")?.to_str().ok()?.trim();
    value.parse::<u64>().ok().map(Duration::from_secs)
}

#[derive(Debug)]
pub(crate) struct Backoff {
    backend: &'static str,
    attempt: usize,
    delay: Duration,
}

impl Backoff {
    pub(crate) fn new(backend: &'static str) -> Self {
        Self {
            backend,
            attempt: 1,
            delay: BASE_DELAY,
        }
    }

    pub(crate) async fn wait(&mut self, retry_after: Option<Duration>) -> bool {
        if self.attempt >= MAX_ATTEMPTS {
            return false;
        }
        let wait = match retry_after {
            Some(hint) if hint > self.delay => hint,
            _ => self.delay,
        };
        warn!(
            "{} rate limited; retrying in {:.1}s (attempt {}/{})",
            self.backend,
            wait.as_secs_f32(),
            self.attempt,
            MAX_ATTEMPTS
        );
        sleep(wait).await;
        self.attempt += 1;
        self.delay = next_delay(self.delay);
        true
    }
}

fn next_delay(current: Duration) -> Duration {
    current.saturating_mul(2).clamp(BASE_DELAY, MAX_DELAY)
}
