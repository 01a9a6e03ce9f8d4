use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::jwt::AuthUser,
    beers::{
        dto::{
            BeerDetailsResponse, BeersResponse, DeletedBeerResponse, SearchRequest,
            SearchResponse, TopBeersResponse, TopQuery,
        },
        repo,
    },
    checkins,
    error::ApiError,
    state::AppState,
};

pub fn beer_routes() -> Router<AppState> {
    Router::new()
        .route("/beers", get(list_beers))
        .route("/beers/top", get(top_beers))
        .route("/beers/search", post(search_beers))
        .route("/beers/:id", get(get_beer).delete(delete_beer))
        .route("/beers/brewery/:id", get(beers_by_brewery))
}

#[instrument(skip(state))]
pub async fn list_beers(
    State(state): State<AppState>,
    AuthUser(_viewer): AuthUser,
) -> Result<Json<BeersResponse>, ApiError> {
    let beers = repo::list_all(&state.db).await?;
    Ok(Json(BeersResponse { beers }))
}

#[instrument(skip(state))]
pub async fn top_beers(
    State(state): State<AppState>,
    AuthUser(_viewer): AuthUser,
    Query(q): Query<TopQuery>,
) -> Result<Json<TopBeersResponse>, ApiError> {
    let top_beers = checkins::repo::top_rated(&state.db, q.limit).await?;
    Ok(Json(TopBeersResponse { top_beers }))
}

#[instrument(skip(state))]
pub async fn get_beer(
    State(state): State<AppState>,
    AuthUser(_viewer): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<BeerDetailsResponse>, ApiError> {
    let beer = repo::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("beer"))?;
    let checkins = checkins::repo::list_by_beer(&state.db, id).await?;
    Ok(Json(BeerDetailsResponse { beer, checkins }))
}

#[instrument(skip(state))]
pub async fn beers_by_brewery(
    State(state): State<AppState>,
    AuthUser(_viewer): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<BeersResponse>, ApiError> {
    let beers = repo::list_by_brewery(&state.db, id).await?;
    Ok(Json(BeersResponse { beers }))
}

#[instrument(skip(state))]
pub async fn delete_beer(
    State(state): State<AppState>,
    AuthUser(_viewer): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<DeletedBeerResponse>, ApiError> {
    let beer = repo::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("beer"))?;
    repo::delete(&state.db, id).await?;
    info!(beer_id = id, "beer deleted");
    Ok(Json(DeletedBeerResponse {
        message: "The beer is no longer available.".into(),
        deleted_beer: beer,
    }))
}

#[instrument(skip(state, payload))]
pub async fn search_beers(
    State(state): State<AppState>,
    AuthUser(_viewer): AuthUser,
    Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let results = repo::search_by_name(&state.db, &payload.query).await?;
    Ok(Json(SearchResponse { results }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn beer_catalog_sits_behind_the_gate() {
        let app = crate::app::build_app(AppState::fake());
        for uri in ["/beers", "/beers/top", "/beers/7", "/beers/brewery/7"] {
            let res = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{uri}");
        }
    }
}
