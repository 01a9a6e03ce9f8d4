use serde::{Deserialize, Serialize};

use crate::beers::repo_types::BeerView;
use crate::checkins::repo_types::CheckinView;

#[derive(Debug, Serialize)]
pub struct BeersResponse {
    pub beers: Vec<BeerView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopBeersResponse {
    pub top_beers: Vec<CheckinView>,
}

#[derive(Debug, Serialize)]
pub struct BeerDetailsResponse {
    pub beer: BeerView,
    pub checkins: Vec<CheckinView>,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<BeerView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedBeerResponse {
    pub message: String,
    pub deleted_beer: BeerView,
}

#[derive(Debug, Deserialize)]
pub struct TopQuery {
    #[serde(default = "default_top_limit")]
    pub limit: i64,
}

fn default_top_limit() -> i64 {
    25
}
