//! Rewards route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use sipclub_core::rewards::RewardsAccount;
use sipclub_core::types::{ClubId, UserId};
use tracing::instrument;

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Account lookup query parameters.
#[derive(Debug, Deserialize)]
pub struct AccountQuery {
    pub club_id: String,
}

/// Purchase event body.
#[derive(Debug, Deserialize)]
pub struct EarnRequest {
    pub club_id: String,
    pub points: u64,
    pub order_id: Option<String>,
}

/// Administrative credit body.
#[derive(Debug, Deserialize)]
pub struct BonusRequest {
    pub club_id: String,
    pub points: u64,
}

/// Points redemption body.
#[derive(Debug, Deserialize)]
pub struct RedeemRequest {
    pub club_id: String,
    pub points: u64,
}

/// Milestone redemption body: the token string plus the club presenting
/// it.
#[derive(Debug, Deserialize)]
pub struct RedeemTokenRequest {
    pub token: String,
    pub club_id: String,
}

/// Account snapshot response.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub account: RewardsAccount,
}

/// Earn response: the new snapshot plus a redemption token when the
/// free-drink milestone was reached.
#[derive(Debug, Serialize)]
pub struct EarnResponse {
    pub account: RewardsAccount,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redemption_token: Option<String>,
}

fn positive(points: u64, what: &str) -> Result<u64> {
    if points == 0 {
        return Err(ApiError::BadRequest(format!("{what} must be positive")));
    }
    Ok(points)
}

/// Current account snapshot. Never mutates.
#[instrument(skip(state))]
pub async fn get_account(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<AccountQuery>,
) -> Result<Json<AccountResponse>> {
    let user_id = UserId::new(user_id);
    let club_id = ClubId::new(query.club_id);

    let account = state
        .rewards()
        .get_account(&user_id, &club_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("no rewards account for {user_id} at {club_id}"))
        })?;

    Ok(Json(AccountResponse { account }))
}

/// Qualifying purchase event.
#[instrument(skip(state, body))]
pub async fn earn(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<EarnRequest>,
) -> Result<Json<EarnResponse>> {
    let points = positive(body.points, "points")?;
    let outcome = state
        .rewards()
        .earn(
            &UserId::new(user_id),
            &ClubId::new(body.club_id),
            points,
            body.order_id,
        )
        .await?;

    Ok(Json(EarnResponse {
        account: outcome.account,
        redemption_token: outcome.redemption_token,
    }))
}

/// Administrative credit.
#[instrument(skip(state, body))]
pub async fn bonus(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<BonusRequest>,
) -> Result<Json<AccountResponse>> {
    let points = positive(body.points, "points")?;
    let account = state
        .rewards()
        .bonus(&UserId::new(user_id), &ClubId::new(body.club_id), points)
        .await?;

    Ok(Json(AccountResponse { account }))
}

/// Points redemption.
#[instrument(skip(state, body))]
pub async fn redeem_points(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<RedeemRequest>,
) -> Result<Json<AccountResponse>> {
    let points = positive(body.points, "points")?;
    let account = state
        .rewards()
        .redeem_points(&UserId::new(user_id), &ClubId::new(body.club_id), points)
        .await?;

    Ok(Json(AccountResponse { account }))
}

/// Free-drink milestone redemption.
#[instrument(skip(state, body))]
pub async fn redeem_token(
    State(state): State<AppState>,
    Json(body): Json<RedeemTokenRequest>,
) -> Result<Json<AccountResponse>> {
    let account = state
        .rewards()
        .redeem_token(&body.token, &ClubId::new(body.club_id))
        .await?;

    Ok(Json(AccountResponse { account }))
}
