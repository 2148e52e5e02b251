//! Client for the address/geocoding proxy endpoints, plus the debounced
//! autocomplete driver.
//!
//! The widget never talks to a maps provider directly; the backend proxies
//! autocomplete, place details, and reverse geocoding. The driver layers
//! debouncing and a generation counter on top so that rapid typing issues
//! one lookup, and a slow response that arrives after the user has typed
//! again (or left the address form) is discarded instead of applied.

use async_trait::async_trait;
use screener_core::protocol::Address;
use serde::Deserialize;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use std::time::Duration;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum PlacesError {
    #[error("Lookup failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// One autocomplete suggestion.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    pub place_id: String,
    pub description: String,
}

#[derive(Deserialize)]
struct AutocompleteResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

/// Result of reverse-geocoding a GPS capture.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ReverseGeocoded {
    pub formatted_address: String,
    #[serde(default)]
    pub components: GeoComponents,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct GeoComponents {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default)]
    pub country: String,
}

/// Seam for the autocomplete lookup, so the driver is testable without a
/// network.
#[async_trait]
pub trait AutocompleteSource: Send + Sync {
    async fn autocomplete(
        &self,
        input: &str,
        session_token: &str,
    ) -> Result<Vec<Prediction>, PlacesError>;
}

/// HTTP client for the backend's places proxy.
#[derive(Clone)]
pub struct PlacesClient {
    http: reqwest::Client,
    api_base: String,
}

impl PlacesClient {
    pub fn new(http: reqwest::Client, api_base: String) -> Self {
        Self { http, api_base }
    }

    /// Resolves a selected prediction to a structured address.
    pub async fn details(&self, place_id: &str) -> Result<Address, PlacesError> {
        let url = format!("{}/places/details", self.api_base);
        let address = self
            .http
            .get(url)
            .query(&[("place_id", place_id)])
            .send()
            .await?
            .error_for_status()?
            .json::<Address>()
            .await?;
        Ok(address)
    }

    /// Turns a GPS capture into a human-readable address, best-effort.
    pub async fn reverse_geocode(&self, lat: f64, lng: f64) -> Result<ReverseGeocoded, PlacesError> {
        let url = format!("{}/places/reverse-geocode", self.api_base);
        let geocoded = self
            .http
            .get(url)
            .query(&[("lat", lat.to_string()), ("lng", lng.to_string())])
            .send()
            .await?
            .error_for_status()?
            .json::<ReverseGeocoded>()
            .await?;
        Ok(geocoded)
    }
}

#[async_trait]
impl AutocompleteSource for PlacesClient {
    async fn autocomplete(
        &self,
        input: &str,
        session_token: &str,
    ) -> Result<Vec<Prediction>, PlacesError> {
        let url = format!("{}/places/autocomplete", self.api_base);
        let response = self
            .http
            .get(url)
            .query(&[("input", input), ("session_token", session_token)])
            .send()
            .await?
            .error_for_status()?
            .json::<AutocompleteResponse>()
            .await?;
        Ok(response.predictions)
    }
}

/// Suggestions for one input generation. Stale generations must be
/// discarded by the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionBatch {
    pub generation: u64,
    pub predictions: Vec<Prediction>,
}

/// Debounce window between the last keystroke and the lookup.
const DEBOUNCE: Duration = Duration::from_millis(300);

/// Inputs shorter than this never trigger a lookup.
const MIN_QUERY_LEN: usize = 3;

/// Debounced, generation-tagged autocomplete.
///
/// Every keystroke bumps the generation and aborts the previously
/// scheduled lookup. Completed lookups are delivered on the channel with
/// their generation; [`AutocompleteDriver::is_current`] tells the consumer
/// whether a batch is still the latest.
pub struct AutocompleteDriver {
    source: Arc<dyn AutocompleteSource>,
    results_tx: mpsc::Sender<SuggestionBatch>,
    session_token: String,
    generation: Arc<AtomicU64>,
    pending: Option<JoinHandle<()>>,
    debounce: Duration,
}

impl AutocompleteDriver {
    pub fn new(
        source: Arc<dyn AutocompleteSource>,
        results_tx: mpsc::Sender<SuggestionBatch>,
    ) -> Self {
        Self {
            source,
            results_tx,
            session_token: Uuid::new_v4().to_string(),
            generation: Arc::new(AtomicU64::new(0)),
            pending: None,
            debounce: DEBOUNCE,
        }
    }

    #[cfg(test)]
    fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Handles one keystroke's worth of input. Returns the new generation.
    pub fn on_input(&mut self, text: &str) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }

        let query = text.trim().to_string();
        if query.len() < MIN_QUERY_LEN {
            return generation;
        }

        let source = self.source.clone();
        let results_tx = self.results_tx.clone();
        let session_token = self.session_token.clone();
        let debounce = self.debounce;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            let predictions = match source.autocomplete(&query, &session_token).await {
                Ok(predictions) => predictions,
                Err(e) => {
                    warn!(error = %e, "Autocomplete lookup failed");
                    Vec::new()
                }
            };
            let _ = results_tx
                .send(SuggestionBatch {
                    generation,
                    predictions,
                })
                .await;
        }));
        generation
    }

    /// Whether a delivered batch is still the latest input generation.
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Invalidates everything in flight, used when the address form is
    /// hidden so a late response cannot be applied.
    pub fn reset(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeSource;

    #[async_trait]
    impl AutocompleteSource for FakeSource {
        async fn autocomplete(
            &self,
            input: &str,
            _session_token: &str,
        ) -> Result<Vec<Prediction>, PlacesError> {
            Ok(vec![Prediction {
                place_id: format!("place-for-{}", input),
                description: format!("{} Street", input),
            }])
        }
    }

    fn driver(
        debounce_ms: u64,
    ) -> (AutocompleteDriver, mpsc::Receiver<SuggestionBatch>) {
        let (tx, rx) = mpsc::channel(8);
        let driver = AutocompleteDriver::new(Arc::new(FakeSource), tx)
            .with_debounce(Duration::from_millis(debounce_ms));
        (driver, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_typing_yields_only_the_final_lookup() {
        let (mut driver, mut rx) = driver(300);

        driver.on_input("123 ");
        driver.on_input("123 Ma");
        let last = driver.on_input("123 Main");

        let batch = rx.recv().await.unwrap();
        assert_eq!(batch.generation, last);
        assert_eq!(batch.predictions[0].place_id, "place-for-123 Main");
        assert!(driver.is_current(batch.generation));

        // Nothing else was ever issued.
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_batch_is_detectable_after_new_input() {
        let (mut driver, mut rx) = driver(0);

        let first = driver.on_input("123 Main");
        let batch = rx.recv().await.unwrap();
        assert_eq!(batch.generation, first);

        // New typing after the batch arrived makes it stale.
        driver.on_input("456 Oak St");
        assert!(!driver.is_current(batch.generation));
    }

    #[tokio::test(start_paused = true)]
    async fn short_input_triggers_no_lookup() {
        let (mut driver, mut rx) = driver(0);
        driver.on_input("12");
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_invalidates_in_flight_lookups() {
        let (mut driver, mut rx) = driver(300);
        let generation = driver.on_input("123 Main");
        driver.reset();
        assert!(!driver.is_current(generation));

        tokio::time::sleep(Duration::from_secs(1)).await;
        // The scheduled lookup was aborted before the debounce fired.
        assert!(rx.try_recv().is_err());
    }
}
