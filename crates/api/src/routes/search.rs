//! Club locator route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};
use serde::{Deserialize, Deserializer, Serialize};
use sipclub_core::geo::{distance_km, find_nearest};
use sipclub_core::types::{BusinessId, BusinessLocation, Coordinate};
use tracing::instrument;

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Deserialize empty strings as None for optional numeric fields.
fn empty_string_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Search query parameters.
///
/// Accepts a region (`city` + `state`), a point (`lat` + `lng`), a
/// free-text `address`, or a combination; at least one locator is
/// required.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub city: Option<String>,
    pub state: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub lng: Option<f64>,
    pub address: Option<String>,
}

/// Redirect query parameters.
#[derive(Debug, Deserialize)]
pub struct RedirectQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub lng: Option<f64>,
    /// Presence of `near=me` requests nearest-match behavior; it is the
    /// only recognized value.
    pub near: Option<String>,
}

/// One business in a search response.
#[derive(Debug, Serialize)]
pub struct BusinessSummary {
    #[serde(flatten)]
    pub location: BusinessLocation,
    /// Present when the query carried (or resolved to) a point.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

/// Search response body.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub businesses: Vec<BusinessSummary>,
}

/// Resolve the query to an optional reference point.
async fn query_point(state: &AppState, query: &SearchQuery) -> Result<Option<Coordinate>> {
    match (query.lat, query.lng) {
        (Some(lat), Some(lng)) => {
            let point = Coordinate::validated(lat, lng)
                .map_err(|e| ApiError::BadRequest(e.to_string()))?;
            Ok(Some(point))
        }
        (Some(_), None) | (None, Some(_)) => Err(ApiError::BadRequest(
            "lat and lng must be supplied together".to_owned(),
        )),
        (None, None) => match query.address.as_deref().map(str::trim) {
            Some(address) if !address.is_empty() => {
                let geocoder = state.geocoder().ok_or(ApiError::GeocoderDisabled)?;
                Ok(Some(geocoder.resolve(address).await?))
            }
            _ => Ok(None),
        },
    }
}

/// Club search.
///
/// Candidates come from the region listing when `city`/`state` are
/// supplied, otherwise from the full directory (only reachable with a
/// point, so results stay ranked). With a known point the response is
/// annotated with distances and sorted nearest-first.
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>> {
    let point = query_point(&state, &query).await?;
    let region = match (query.city.as_deref(), query.state.as_deref()) {
        (Some(city), Some(st)) if !city.trim().is_empty() && !st.trim().is_empty() => {
            Some((city.trim().to_owned(), st.trim().to_owned()))
        }
        _ => None,
    };

    let candidates = match (&region, point) {
        (Some((city, st)), _) => state.directory().list_by_region(city, st).await?,
        (None, Some(_)) => state.directory().list_all().await?,
        (None, None) => {
            return Err(ApiError::BadRequest(
                "supply city and state, lat and lng, or an address".to_owned(),
            ));
        }
    };

    let mut businesses: Vec<BusinessSummary> = candidates
        .into_iter()
        .map(|location| {
            let distance = point.map(|p| distance_km(p, location.coordinate));
            BusinessSummary {
                location,
                distance_km: distance,
            }
        })
        .collect();

    if point.is_some() {
        businesses.sort_by(|a, b| {
            a.distance_km
                .partial_cmp(&b.distance_km)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    Ok(Json(SearchResponse { businesses }))
}

/// A single club's record, the target of the nearest-club redirect.
#[instrument(skip(state))]
pub async fn club_detail(
    State(state): State<AppState>,
    Path(club_id): Path<String>,
) -> Result<Json<BusinessLocation>> {
    let id = BusinessId::new(club_id);
    let location = state
        .directory()
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("no club with id {id}")))?;
    Ok(Json(location))
}

/// Redirect to the nearest club's page.
///
/// Falls back to the configured directory page when the point is missing
/// or invalid, or when no club exists at all.
#[instrument(skip(state))]
pub async fn redirect_nearest(
    State(state): State<AppState>,
    Query(query): Query<RedirectQuery>,
) -> Result<impl IntoResponse> {
    let fallback = state.config().fallback_page.clone();

    let point = match (query.lat, query.lng) {
        (Some(lat), Some(lng)) => match Coordinate::validated(lat, lng) {
            Ok(point) => point,
            Err(_) => return Ok(Redirect::to(&fallback)),
        },
        _ => return Ok(Redirect::to(&fallback)),
    };

    let candidates = state.directory().list_all().await?;
    match find_nearest(point, &candidates) {
        Some(nearest) => {
            let page = state.config().club_page(nearest.location.id.as_str());
            Ok(Redirect::to(&page))
        }
        None => Ok(Redirect::to(&fallback)),
    }
}
