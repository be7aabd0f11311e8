use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, watch};

use crate::client::CwbClient;
use crate::error::FetchError;
use crate::model::WeatherSnapshot;

/// Identifying parameters of one fetch cycle, immutable per cycle.
#[derive(Debug, Clone)]
pub struct FetchParams {
    /// Station-level name for the observation endpoint.
    pub location_name: String,
    /// County/city-level name for the forecast endpoint.
    pub city_name: String,
}

/// Fetches, merges and publishes weather snapshots.
///
/// The published slot is a watch channel: one writer (the fetch-cycle
/// completion path), any number of readers. A generation counter lets only
/// the latest triggered cycle publish its completion; completions of
/// superseded cycles are discarded.
#[derive(Debug)]
pub struct WeatherService {
    client: CwbClient,
    params: Mutex<FetchParams>,
    snapshot: watch::Sender<WeatherSnapshot>,
    generation: AtomicU64,
}

impl WeatherService {
    pub fn new(client: CwbClient, params: FetchParams) -> Self {
        let (snapshot, _) = watch::channel(WeatherSnapshot::initial());
        Self { client, params: Mutex::new(params), snapshot, generation: AtomicU64::new(0) }
    }

    /// Construct the service and trigger the initial fetch cycle.
    pub fn start(
        client: CwbClient,
        params: FetchParams,
    ) -> (Arc<Self>, watch::Receiver<WeatherSnapshot>) {
        let service = Arc::new(Self::new(client, params));
        let receiver = service.subscribe();

        let task = Arc::clone(&service);
        tokio::spawn(async move {
            if let Err(err) = task.refresh().await {
                tracing::warn!(error = %err, "initial fetch cycle failed");
            }
        });

        (service, receiver)
    }

    /// New receiver for the published snapshot slot.
    pub fn subscribe(&self) -> watch::Receiver<WeatherSnapshot> {
        self.snapshot.subscribe()
    }

    /// Current snapshot, cloned out of the slot.
    pub fn snapshot(&self) -> WeatherSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Swap the identifying parameters and trigger a fetch cycle.
    pub async fn set_location(
        &self,
        location_name: impl Into<String>,
        city_name: impl Into<String>,
    ) -> Result<(), FetchError> {
        {
            let mut params = self.params.lock().await;
            params.location_name = location_name.into();
            params.city_name = city_name.into();
        }
        self.refresh().await
    }

    /// Run one fetch cycle: publish a loading snapshot with the previous
    /// fields intact, run both fetches concurrently, and publish the merged
    /// result once both have settled.
    ///
    /// On failure of either fetch nothing from the succeeding half is
    /// published: the prior fields are retained, `is_loading` is reset and
    /// `last_error` marks the failure. Resolves when publication completes.
    pub async fn refresh(&self) -> Result<(), FetchError> {
        let cycle = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let (location_name, city_name) = {
            let params = self.params.lock().await;
            (params.location_name.clone(), params.city_name.clone())
        };

        // Stale-while-revalidating: same fields, loading flag up.
        let mut loading = self.snapshot.borrow().clone();
        loading.is_loading = true;
        self.snapshot.send_replace(loading);

        tracing::debug!(%location_name, %city_name, cycle, "starting fetch cycle");

        let (observation, forecast) = tokio::join!(
            self.client.fetch_observation(&location_name),
            self.client.fetch_forecast(&city_name),
        );

        if self.generation.load(Ordering::SeqCst) != cycle {
            tracing::debug!(cycle, "discarding superseded fetch cycle");
            return Ok(());
        }

        match (observation, forecast) {
            (Ok(observation), Ok(forecast)) => {
                self.snapshot.send_replace(WeatherSnapshot::from_parts(observation, forecast));
                Ok(())
            }
            (observation, forecast) => {
                let Some(err) = observation.err().or(forecast.err()) else {
                    // Unreachable: the first arm consumed the all-Ok case.
                    return Ok(());
                };

                tracing::warn!(error = %err, cycle, "fetch cycle failed");

                let mut next = self.snapshot.borrow().clone();
                next.is_loading = false;
                next.last_error = Some(err.kind());
                self.snapshot.send_replace(next);

                Err(err)
            }
        }
    }
}
