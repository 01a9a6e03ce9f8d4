use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// One check-in joined with the beer and brewery it refers to.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CheckinView {
    pub id: i64,
    pub user_id: i64,
    pub beer_id: i64,
    pub rating: i32,
    pub comment: Option<String>,
    pub beer_name: String,
    pub brewery_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
