use anyhow::Context;
use sqlx::PgPool;

use crate::checkins::repo_types::CheckinView;

pub async fn list_by_user(db: &PgPool, user_id: i64) -> anyhow::Result<Vec<CheckinView>> {
    let rows = sqlx::query_as::<_, CheckinView>(
        r#"
        SELECT c.id, c.user_id, c.beer_id, c.rating, c.comment,
               b.name AS beer_name, br.name AS brewery_name, c.created_at
          FROM checkins c
          JOIN beers b ON b.id = c.beer_id
          JOIN breweries br ON br.id = b.brewery_id
         WHERE c.user_id = $1
         ORDER BY c.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("list checkins by user")?;
    Ok(rows)
}

pub async fn list_by_beer(db: &PgPool, beer_id: i64) -> anyhow::Result<Vec<CheckinView>> {
    let rows = sqlx::query_as::<_, CheckinView>(
        r#"
        SELECT c.id, c.user_id, c.beer_id, c.rating, c.comment,
               b.name AS beer_name, br.name AS brewery_name, c.created_at
          FROM checkins c
          JOIN beers b ON b.id = c.beer_id
          JOIN breweries br ON br.id = b.brewery_id
         WHERE c.beer_id = $1
         ORDER BY c.created_at DESC
        "#,
    )
    .bind(beer_id)
    .fetch_all(db)
    .await
    .context("list checkins by beer")?;
    Ok(rows)
}

/// Highest-rated check-ins first, for the top view.
pub async fn top_rated(db: &PgPool, limit: i64) -> anyhow::Result<Vec<CheckinView>> {
    let rows = sqlx::query_as::<_, CheckinView>(
        r#"
        SELECT c.id, c.user_id, c.beer_id, c.rating, c.comment,
               b.name AS beer_name, br.name AS brewery_name, c.created_at
          FROM checkins c
          JOIN beers b ON b.id = c.beer_id
          JOIN breweries br ON br.id = b.brewery_id
         ORDER BY c.rating DESC
         LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(db)
    .await
    .context("list top rated checkins")?;
    Ok(rows)
}
