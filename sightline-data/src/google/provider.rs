//! HTTP client implementing every collaborator trait against Google APIs.
//!
//! The collaborator traits are synchronous to keep the scoring core
//! embeddable in synchronous contexts. This provider bridges the async HTTP
//! calls to the sync interface by blocking on a Tokio runtime internally.
//!
//! The API key travels as a `key` query parameter on every request. Error
//! values and log records only ever name the endpoint without its query
//! string, and the [`Debug`] output of the configuration redacts the key.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use geo::Coord;
use log::debug;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use sightline_core::{
    DetectedObject, GeoPoint, Geocoder, ImageSize, ImageryProvider, ObjectDetector, RoadSnapper,
    ServiceError, StreetImage,
};
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;

use super::geocoding::GeocodeResponse;
use super::roads::NearestRoadsResponse;
use super::vision::{AnnotateRequest, AnnotateResponse};

/// Default Geocoding API endpoint.
pub const DEFAULT_GEOCODING_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
/// Default Roads API `nearestRoads` endpoint.
pub const DEFAULT_ROADS_URL: &str = "https://roads.googleapis.com/v1/nearestRoads";
/// Default Street View Static API endpoint.
pub const DEFAULT_STREET_VIEW_URL: &str = "https://maps.googleapis.com/maps/api/streetview";
/// Default Cloud Vision `images:annotate` endpoint.
pub const DEFAULT_VISION_URL: &str = "https://vision.googleapis.com/v1/images:annotate";

/// Default user agent for outbound requests.
pub const DEFAULT_USER_AGENT: &str = "sightline/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Error type for [`GoogleServices`] construction failures.
#[derive(Debug, Error)]
pub enum ProviderBuildError {
    /// No API key was supplied.
    #[error("an API key is required")]
    MissingApiKey,
    /// A configured endpoint is not an absolute URL.
    #[error("invalid {name} endpoint {url:?}")]
    InvalidEndpoint {
        /// Which endpoint was rejected.
        name: &'static str,
        /// Rejected value.
        url: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime")]
    Runtime(#[source] std::io::Error),
}

/// Configuration for [`GoogleServices`].
#[derive(Clone)]
pub struct GoogleServicesConfig {
    /// API key sent with every request.
    pub api_key: String,
    /// Geocoding API endpoint.
    pub geocoding_url: String,
    /// Roads API `nearestRoads` endpoint.
    pub roads_url: String,
    /// Street View Static API endpoint.
    pub street_view_url: String,
    /// Cloud Vision `images:annotate` endpoint.
    pub vision_url: String,
    /// Connect and request timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl fmt::Debug for GoogleServicesConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleServicesConfig")
            .field("api_key", &"<redacted>")
            .field("geocoding_url", &self.geocoding_url)
            .field("roads_url", &self.roads_url)
            .field("street_view_url", &self.street_view_url)
            .field("vision_url", &self.vision_url)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Default for GoogleServicesConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            geocoding_url: DEFAULT_GEOCODING_URL.to_owned(),
            roads_url: DEFAULT_ROADS_URL.to_owned(),
            street_view_url: DEFAULT_STREET_VIEW_URL.to_owned(),
            vision_url: DEFAULT_VISION_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl GoogleServicesConfig {
    /// Create a configuration targeting the public Google endpoints.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Set the Geocoding API endpoint.
    #[must_use]
    pub fn with_geocoding_url(mut self, url: impl Into<String>) -> Self {
        self.geocoding_url = url.into();
        self
    }

    /// Set the Roads API endpoint.
    #[must_use]
    pub fn with_roads_url(mut self, url: impl Into<String>) -> Self {
        self.roads_url = url.into();
        self
    }

    /// Set the Street View Static API endpoint.
    #[must_use]
    pub fn with_street_view_url(mut self, url: impl Into<String>) -> Self {
        self.street_view_url = url.into();
        self
    }

    /// Set the Cloud Vision endpoint.
    #[must_use]
    pub fn with_vision_url(mut self, url: impl Into<String>) -> Self {
        self.vision_url = url.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Parsed endpoints; the key is appended per request.
#[derive(Debug, Clone)]
struct Endpoints {
    geocoding: Url,
    roads: Url,
    street_view: Url,
    vision: Url,
}

impl Endpoints {
    fn parse(config: &GoogleServicesConfig) -> Result<Self, ProviderBuildError> {
        Ok(Self {
            geocoding: parse_endpoint("geocoding", &config.geocoding_url)?,
            roads: parse_endpoint("roads", &config.roads_url)?,
            street_view: parse_endpoint("street view", &config.street_view_url)?,
            vision: parse_endpoint("vision", &config.vision_url)?,
        })
    }
}

fn parse_endpoint(name: &'static str, raw: &str) -> Result<Url, ProviderBuildError> {
    Url::parse(raw).map_err(|source| ProviderBuildError::InvalidEndpoint {
        name,
        url: raw.to_owned(),
        source,
    })
}

/// Google-backed geocoder, road snapper, imagery provider and detector.
///
/// One instance owns a single `reqwest` client and Tokio runtime; wrap it in
/// an [`Arc`](std::sync::Arc) to hand it to every pipeline role.
///
/// # Runtime behaviour
///
/// When called from outside any Tokio runtime, the provider uses its own
/// stored runtime. When called from within an existing multi-threaded Tokio
/// runtime (detected via [`Handle::try_current()`] and
/// [`RuntimeFlavor::MultiThread`]), it uses that runtime's handle with
/// [`tokio::task::block_in_place`] to avoid nested runtime panics. Inside a
/// `current_thread` runtime it falls back to its own runtime, which may
/// deadlock if the caller's runtime drives IO this request depends on.
pub struct GoogleServices {
    client: Client,
    config: GoogleServicesConfig,
    endpoints: Endpoints,
    runtime: Runtime,
}

impl fmt::Debug for GoogleServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleServices")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl GoogleServices {
    /// Create a provider for the public Google endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty or the HTTP client or Tokio
    /// runtime fails to build.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(GoogleServicesConfig::new(api_key))
    }

    /// Create a provider with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty, an endpoint is not a valid URL,
    /// or the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: GoogleServicesConfig) -> Result<Self, ProviderBuildError> {
        if config.api_key.trim().is_empty() {
            return Err(ProviderBuildError::MissingApiKey);
        }
        let endpoints = Endpoints::parse(&config)?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProviderBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            endpoints,
            runtime,
        })
    }

    /// Configuration this provider was built with.
    #[must_use]
    pub const fn config(&self) -> &GoogleServicesConfig {
        &self.config
    }

    /// Append `params` and the API key to `endpoint`.
    fn request_url(&self, endpoint: &Url, params: &[(&str, &str)]) -> Url {
        let mut url = endpoint.clone();
        url.query_pairs_mut()
            .extend_pairs(params)
            .append_pair("key", &self.config.api_key);
        url
    }

    fn geocode_url(&self, address: &str) -> Url {
        self.request_url(&self.endpoints.geocoding, &[("address", address)])
    }

    fn nearest_roads_url(&self, point: &GeoPoint) -> Url {
        let points = format_lat_lng(point);
        self.request_url(&self.endpoints.roads, &[("points", &points)])
    }

    /// Street View answers a missing panorama with a grey placeholder image
    /// unless asked to report it as HTTP 404.
    fn street_view_url(&self, point: &GeoPoint, size: ImageSize) -> Url {
        let size = size.to_string();
        let location = format_lat_lng(point);
        self.request_url(
            &self.endpoints.street_view,
            &[
                ("size", &size),
                ("location", &location),
                ("return_error_code", "true"),
            ],
        )
    }

    fn vision_url(&self) -> Url {
        self.request_url(&self.endpoints.vision, &[])
    }

    /// Drive `future` to completion from synchronous code.
    fn block_on<F: Future>(&self, future: F) -> F::Output {
        // block_in_place requires a multi-threaded runtime; for current_thread
        // runtimes we fall back to our own stored runtime.
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &Url,
        url: Url,
    ) -> Result<T, ServiceError> {
        let request = self.client.get(url);
        let body = self.send(endpoint, request).await?.bytes().await;
        decode_json(&body.map_err(|err| self.convert_reqwest_error(err, endpoint))?)
    }

    async fn send(
        &self,
        endpoint: &Url,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ServiceError> {
        debug!("calling {endpoint}");
        request
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(err, endpoint))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(err, endpoint))
    }

    async fn fetch_image_async(
        &self,
        point: &GeoPoint,
        size: ImageSize,
    ) -> Result<StreetImage, ServiceError> {
        let endpoint = &self.endpoints.street_view;
        let request = self.client.get(self.street_view_url(point, size));
        let response = self.send(endpoint, request).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let bytes = response
            .bytes()
            .await
            .map_err(|err| self.convert_reqwest_error(err, endpoint))?;
        Ok(StreetImage {
            bytes: bytes.to_vec(),
            content_type,
        })
    }

    async fn detect_objects_async(
        &self,
        image: &StreetImage,
    ) -> Result<Vec<DetectedObject>, ServiceError> {
        let endpoint = &self.endpoints.vision;
        let request = self
            .client
            .post(self.vision_url())
            .json(&AnnotateRequest::object_localization(&image.bytes));
        let body = self
            .send(endpoint, request)
            .await?
            .bytes()
            .await
            .map_err(|err| self.convert_reqwest_error(err, endpoint))?;
        decode_json::<AnnotateResponse>(&body)?.into_detections()
    }

    /// Convert a reqwest error to a `ServiceError`.
    ///
    /// The URL is stripped from the error first so the API key cannot leak
    /// through its message.
    fn convert_reqwest_error(&self, error: reqwest::Error, endpoint: &Url) -> ServiceError {
        let error = error.without_url();
        let endpoint = endpoint.as_str().to_owned();

        if error.is_timeout() {
            return ServiceError::Timeout {
                endpoint,
                timeout_ms: u64::try_from(self.config.timeout.as_millis()).unwrap_or(u64::MAX),
            };
        }

        if let Some(status) = error.status() {
            return ServiceError::Http {
                endpoint,
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        ServiceError::Network {
            endpoint,
            message: error.to_string(),
        }
    }
}

fn format_lat_lng(point: &GeoPoint) -> String {
    format!("{},{}", point.latitude(), point.longitude())
}

fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ServiceError> {
    serde_json::from_slice(body).map_err(|err| ServiceError::Parse {
        message: err.to_string(),
    })
}

impl Geocoder for GoogleServices {
    fn geocode(&self, address: &str) -> Result<Coord<f64>, ServiceError> {
        let url = self.geocode_url(address);
        let response: GeocodeResponse =
            self.block_on(self.get_json(&self.endpoints.geocoding, url))?;
        response.into_coord()
    }
}

impl RoadSnapper for GoogleServices {
    fn snap_to_road(&self, point: &GeoPoint) -> Result<Option<Coord<f64>>, ServiceError> {
        let url = self.nearest_roads_url(point);
        let response: NearestRoadsResponse =
            self.block_on(self.get_json(&self.endpoints.roads, url))?;
        response.into_nearest()
    }
}

impl ImageryProvider for GoogleServices {
    fn fetch_image(&self, point: &GeoPoint, size: ImageSize) -> Result<StreetImage, ServiceError> {
        self.block_on(self.fetch_image_async(point, size))
    }
}

impl ObjectDetector for GoogleServices {
    fn detect_objects(&self, image: &StreetImage) -> Result<Vec<DetectedObject>, ServiceError> {
        self.block_on(self.detect_objects_async(image))
    }
}
