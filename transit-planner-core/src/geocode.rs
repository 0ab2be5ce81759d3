//! Component I — Geocoder Client: an external oracle mapping a free-text
//! place name to `(lat, lon)` (spec §4.I / §6).

use std::sync::RwLock;

use hashbrown::HashMap;
use serde::Deserialize;

use crate::error::GeocodeError;

/// A resolved geocoding result.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    pub lat: f64,
    pub lon: f64,
    pub formatted_address: String,
}

/// Anything that can resolve a free-text place name to coordinates. The
/// concrete provider URL and key are outside the specification's scope
/// (spec §6); this trait is the seam implementations plug into.
#[async_trait::async_trait]
pub trait GeocodeClient: Send + Sync {
    async fn geocode(&self, place: &str) -> Result<GeocodedPlace, GeocodeError>;
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: GeocodeGeometry,
    formatted_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeGeometry {
    location: GeocodeLocation,
}

#[derive(Debug, Deserialize)]
struct GeocodeLocation {
    lat: f64,
    lng: f64,
}

/// Geocodes against an HTTPS provider matching the contract in spec §6:
/// a URL-encoded address in, a JSON document with `status` and
/// `results[0].geometry.location.{lat,lng}` out.
///
/// Results are cached by `(place, lowercased, trimmed)`, safe for
/// concurrent readers with a single writer at a time (spec §5 "geocode
/// cache").
pub struct HttpGeocoder {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    cache: RwLock<HashMap<String, GeocodedPlace>>,
}

impl HttpGeocoder {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        HttpGeocoder {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn cache_key(place: &str) -> String {
        place.trim().to_lowercase()
    }
}

#[async_trait::async_trait]
impl GeocodeClient for HttpGeocoder {
    async fn geocode(&self, place: &str) -> Result<GeocodedPlace, GeocodeError> {
        let key = Self::cache_key(place);
        if let Some(cached) = self.cache.read().unwrap().get(&key) {
            return Ok(cached.clone());
        }

        log::debug!("geocoding {place:?}");
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("address", place), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| GeocodeError::NetworkError(e.to_string()))?;

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| GeocodeError::ParseError(e.to_string()))?;

        match body.status.as_str() {
            "OK" => {}
            "REQUEST_DENIED" => return Err(GeocodeError::AuthDenied),
            "ZERO_RESULTS" => return Err(GeocodeError::NoResults),
            other => return Err(GeocodeError::ParseError(format!("status {other}"))),
        }

        let first = body.results.into_iter().next().ok_or(GeocodeError::NoResults)?;
        let place = GeocodedPlace {
            lat: first.geometry.location.lat,
            lon: first.geometry.location.lng,
            formatted_address: first.formatted_address.unwrap_or_default(),
        };

        self.cache.write().unwrap().insert(key, place.clone());
        Ok(place)
    }
}

/// Fixed-table geocoder used by tests and offline demos: resolves
/// exactly the places it was built with and fails with `NoResults`
/// otherwise.
pub struct StaticGeocoder {
    places: HashMap<String, GeocodedPlace>,
}

impl StaticGeocoder {
    pub fn new(places: Vec<(&str, f64, f64)>) -> Self {
        let places = places
            .into_iter()
            .map(|(name, lat, lon)| {
                (
                    HttpGeocoder::cache_key(name),
                    GeocodedPlace {
                        lat,
                        lon,
                        formatted_address: name.to_string(),
                    },
                )
            })
            .collect();
        StaticGeocoder { places }
    }
}

#[async_trait::async_trait]
impl GeocodeClient for StaticGeocoder {
    async fn geocode(&self, place: &str) -> Result<GeocodedPlace, GeocodeError> {
        self.places
            .get(&HttpGeocoder::cache_key(place))
            .cloned()
            .ok_or(GeocodeError::NoResults)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_geocoder_resolves_known_place() {
        let geocoder = StaticGeocoder::new(vec![("City Hall", 0.0, 0.021)]);
        let place = geocoder.geocode("  CITY hall  ").await.unwrap();
        assert_eq!(place.lon, 0.021);
    }

    #[tokio::test]
    async fn static_geocoder_rejects_unknown_place() {
        let geocoder = StaticGeocoder::new(vec![("City Hall", 0.0, 0.021)]);
        let err = geocoder.geocode("Nowhere").await.unwrap_err();
        assert_eq!(err, GeocodeError::NoResults);
    }
}
