use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// A beer joined with its brewery and style names.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BeerView {
    pub id: i64,
    pub name: String,
    pub abv: Option<f64>,
    pub description: Option<String>,
    pub brewery_id: i64,
    pub brewery_name: String,
    pub beer_type: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
