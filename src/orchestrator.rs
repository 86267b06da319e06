use std::collections::HashMap;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::cancel::CancellationToken;
use crate::progress::Progress;
use crate::providers::{Provider, TranslationRequest};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationOutcome {
    pub translations: HashMap<String, String>,
    pub failed: usize,
    pub cancelled: bool,
}

impl TranslationOutcome {
    pub fn translated(&self) -> usize {
        self.translations.len()
    }
}

#[derive(Debug, Clone)]
pub struct Orchestrator<P: Provider> {
    provider: P,
    delay: Duration,
}

impl<P: Provider> Orchestrator<P> {
    pub fn new(provider: P, delay: Duration) -> Self {
        Self { provider, delay }
    }

    pub async fn translate_all(
        &self,
        keys: &[String],
        source_lang: &str,
        target_lang: &str,
        cancel: &CancellationToken,
        progress: &dyn Progress,
    ) -> TranslationOutcome {
        let mut outcome = TranslationOutcome::default();
        for (idx, key) in keys.iter().enumerate() {
            if cancel.is_cancelled() {
                debug!("translation stopped before key {}/{}", idx + 1, keys.len());
                outcome.cancelled = true;
                break;
            }

            let request = TranslationRequest {
                text: key.clone(),
                source_lang: source_lang.to_string(),
                target_lang: target_lang.to_string(),
            };
            match self.provider.translate(request).await {
                Ok(translation) => {
                    outcome.translations.insert(key.clone(), translation);
                    progress.advance(1);
                    if idx + 1 < keys.len() && !self.delay.is_zero() {
                        sleep(self.delay).await;
                    }
                }
                Err(err) => {
                    warn!("failed to translate {:?}: {:#}", key, err);
                    outcome.failed += 1;
                    progress.advance(1);
                }
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use crate::providers::ProviderFuture;
    use anyhow::anyhow;
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    #[derive(Clone, Default)]
    struct FakeProvider {
        calls: Arc<Mutex<Vec<String>>>,
        cancel_after_first: Option<CancellationToken>,
    }

    impl Provider for FakeProvider {
        fn translate(&self, request: TranslationRequest) -> ProviderFuture {
            let calls = self.calls.clone();
            let cancel = self.cancel_after_first.clone();
            Box::pin(async move {
                calls.lock().expect("calls").push(request.text.clone());
                if let Some(cancel) = cancel {
                    cancel.cancel();
                }
                if request.text == "broken" {
                    return Err(anyhow!("backend unavailable"));
                }
                Ok(format!("{}:{}", request.target_lang, request.text))
            })
        }
    }

    fn keys(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[tokio::test]
    async fn translates_in_order_and_skips_failures() {
        let provider = FakeProvider::default();
        let orchestrator = Orchestrator::new(provider.clone(), Duration::ZERO);
        let outcome = orchestrator
            .translate_all(
                &keys(&["a", "broken", "c"]),
                "en",
                "es",
                &CancellationToken::new(),
                &NoProgress,
            )
            .await;

        assert_eq!(outcome.translated(), 2);
        assert_eq!(outcome.failed, 1);
        assert!(!outcome.cancelled);
        assert_eq!(outcome.translations.get("c").map(String::as_str), Some("es:c"));
        assert!(!outcome.translations.contains_key("broken"));
        assert_eq!(*provider.calls.lock().expect("calls"), keys(&["a", "broken", "c"]));
    }

    #[tokio::test]
    async fn stops_when_cancelled_between_calls() {
        let token = CancellationToken::new();
        let provider = FakeProvider {
            cancel_after_first: Some(token.clone()),
            ..FakeProvider::default()
        };
        let orchestrator = Orchestrator::new(provider.clone(), Duration::ZERO);
        let outcome = orchestrator
            .translate_all(&keys(&["a", "b", "c"]), "en", "de", &token, &NoProgress)
            .await;

        assert_eq!(outcome.translated(), 1);
        assert!(outcome.cancelled);
        assert_eq!(provider.calls.lock().expect("calls").len(), 1);
    }

    // The paused clock only moves through timers, so elapsed time is the sum
    // of the sleeps (give or take timer rounding).
    fn assert_slept(started: Instant, expected: Duration) {
        let elapsed = started.elapsed();
        assert!(
            elapsed >= expected && elapsed < expected + Duration::from_millis(100),
            "slept {:?}, expected {:?}",
            elapsed,
            expected
        );
    }

    #[tokio::test(start_paused = true)]
    async fn delay_only_follows_successes_that_have_a_next_key() {
        let delay = Duration::from_secs(10);
        let orchestrator = Orchestrator::new(FakeProvider::default(), delay);
        let cancel = CancellationToken::new();

        let started = Instant::now();
        let outcome = orchestrator
            .translate_all(&keys(&["a", "broken", "c"]), "en", "es", &cancel, &NoProgress)
            .await;
        assert_eq!(outcome.translated(), 2);
        assert_slept(started, delay);

        let started = Instant::now();
        orchestrator
            .translate_all(&keys(&["a", "b", "broken"]), "en", "es", &cancel, &NoProgress)
            .await;
        assert_slept(started, delay * 2);

        let started = Instant::now();
        orchestrator
            .translate_all(&keys(&["a"]), "en", "es", &cancel, &NoProgress)
            .await;
        assert_slept(started, Duration::ZERO);
    }

    #[tokio::test]
    async fn cancelled_token_makes_no_calls() {
        let token = CancellationToken::new();
        token.cancel();
        let provider = FakeProvider::default();
        let outcome = Orchestrator::new(provider.clone(), Duration::ZERO)
            .translate_all(&keys(&["a"]), "en", "de", &token, &NoProgress)
            .await;

        assert_eq!(outcome.translated(), 0);
        assert!(outcome.cancelled);
        assert!(provider.calls.lock().expect("calls").is_empty());
    }
}
