//! MBTA v3 (JSON:API) transit data client.

use crate::planner::domain::{Alert, Route, RouteId, Stop, StopId};
use crate::planner::ports::{TransitDataError, TransitDataProvider, TransitDataResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Public MBTA v3 API.
pub const DEFAULT_MBTA_BASE_URL: &str = "https://api-v3.mbta.com";

/// Stations only; platforms and entrances are left out.
const STATION_LOCATION_TYPE: &str = "1";
const STOP_SEARCH_LIMIT: &str = "500";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct Document<A> {
    #[serde(default = "Vec::new")]
    data: Vec<Resource<A>>,
}

#[derive(Debug, Deserialize)]
struct Resource<A> {
    id: String,
    attributes: A,
}

#[derive(Debug, Deserialize)]
struct StopAttributes {
    #[serde(default)]
    name: String,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RouteAttributes {
    #[serde(default)]
    long_name: Option<String>,
    #[serde(default)]
    short_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AlertAttributes {
    #[serde(default)]
    header: String,
    #[serde(default)]
    effect: Option<String>,
}

/// Client for the MBTA v3 API.
#[derive(Debug, Clone)]
pub struct MbtaDataProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl MbtaDataProvider {
    /// Creates a client for `base_url`, authenticating with `api_key` when
    /// one is given.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    async fn fetch<A: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> TransitDataResult<Vec<Resource<A>>> {
        let mut request = self
            .client
            .get(format!("{}/{path}", self.base_url))
            .query(query)
            .timeout(REQUEST_TIMEOUT);
        if let Some(key) = &self.api_key {
            request = request.query(&[("api_key", key.as_str())]);
        }

        let response = request.send().await.map_err(TransitDataError::unavailable)?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransitDataError::InvalidResponse(format!(
                "GET /{path} answered HTTP {status}"
            )));
        }
        let document: Document<A> = response
            .json()
            .await
            .map_err(|err| TransitDataError::InvalidResponse(err.to_string()))?;
        Ok(document.data)
    }
}

fn to_stop(resource: Resource<StopAttributes>) -> Option<Stop> {
    let id = StopId::new(resource.id).ok()?;
    Some(Stop {
        id,
        name: resource.attributes.name,
        latitude: resource.attributes.latitude,
        longitude: resource.attributes.longitude,
    })
}

fn to_route(resource: Resource<RouteAttributes>) -> Option<Route> {
    let RouteAttributes {
        long_name,
        short_name,
    } = resource.attributes;
    let name = long_name
        .filter(|name| !name.is_empty())
        .or(short_name.filter(|name| !name.is_empty()))
        .unwrap_or_else(|| resource.id.clone());
    let id = RouteId::new(resource.id).ok()?;
    Some(Route::new(id, name))
}

#[async_trait]
impl TransitDataProvider for MbtaDataProvider {
    async fn stops(&self, route: &RouteId) -> TransitDataResult<Vec<Stop>> {
        let resources = self
            .fetch::<StopAttributes>(
                "stops",
                &[
                    ("filter[route]", route.as_str()),
                    ("filter[location_type]", STATION_LOCATION_TYPE),
                ],
            )
            .await?;
        Ok(resources.into_iter().filter_map(to_stop).collect())
    }

    async fn routes_at(&self, stop: &StopId) -> TransitDataResult<Vec<Route>> {
        let resources = self
            .fetch::<RouteAttributes>("routes", &[("filter[stop]", stop.as_str())])
            .await?;
        Ok(resources.into_iter().filter_map(to_route).collect())
    }

    async fn alerts(&self, route: &RouteId) -> TransitDataResult<Vec<Alert>> {
        let resources = self
            .fetch::<AlertAttributes>("alerts", &[("filter[route]", route.as_str())])
            .await?;
        Ok(resources
            .into_iter()
            .map(|resource| Alert {
                id: resource.id,
                route: route.clone(),
                header: resource.attributes.header,
                effect: resource.attributes.effect,
            })
            .collect())
    }

    async fn find_stop(&self, name: &str) -> TransitDataResult<Option<Stop>> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(None);
        }
        let resources = self
            .fetch::<StopAttributes>(
                "stops",
                &[
                    ("page[limit]", STOP_SEARCH_LIMIT),
                    ("filter[location_type]", STATION_LOCATION_TYPE),
                ],
            )
            .await?;
        let found = resources
            .into_iter()
            .filter_map(to_stop)
            .find(|stop| stop.name.to_lowercase().contains(&needle));
        match &found {
            Some(stop) => tracing::debug!(query = name, stop = %stop.id, "stop resolved"),
            None => tracing::info!(query = name, "no stop matches"),
        }
        Ok(found)
    }

    async fn find_route(&self, name: &str) -> TransitDataResult<Option<Route>> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(None);
        }
        let resources = self.fetch::<RouteAttributes>("routes", &[]).await?;
        Ok(resources.into_iter().filter_map(to_route).find(|route| {
            route.id.as_str().to_lowercase() == needle
                || route.name.to_lowercase().contains(&needle)
        }))
    }

    fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }
}
