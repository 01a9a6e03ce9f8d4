use anyhow::Context;
use sqlx::PgPool;

use crate::beers::repo_types::BeerView;

const BEER_VIEW: &str = r#"
    SELECT b.id, b.name, b.abv, b.description, b.brewery_id,
           br.name AS brewery_name, t.name AS beer_type, b.created_at
      FROM beers b
      JOIN breweries br ON br.id = b.brewery_id
      JOIN beer_types t ON t.id = b.beer_type_id
"#;

pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<BeerView>> {
    let rows = sqlx::query_as::<_, BeerView>(&format!("{BEER_VIEW} ORDER BY b.name"))
        .fetch_all(db)
        .await
        .context("list beers")?;
    Ok(rows)
}

pub async fn find_by_id(db: &PgPool, id: i64) -> anyhow::Result<Option<BeerView>> {
    let row = sqlx::query_as::<_, BeerView>(&format!("{BEER_VIEW} WHERE b.id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("find beer by id")?;
    Ok(row)
}

pub async fn list_by_brewery(db: &PgPool, brewery_id: i64) -> anyhow::Result<Vec<BeerView>> {
    let rows = sqlx::query_as::<_, BeerView>(&format!(
        "{BEER_VIEW} WHERE b.brewery_id = $1 ORDER BY b.name"
    ))
    .bind(brewery_id)
    .fetch_all(db)
    .await
    .context("list beers by brewery")?;
    Ok(rows)
}

/// Case-insensitive substring match on the beer name.
pub async fn search_by_name(db: &PgPool, query: &str) -> anyhow::Result<Vec<BeerView>> {
    let rows = sqlx::query_as::<_, BeerView>(&format!(
        "{BEER_VIEW} WHERE b.name ILIKE $1 ORDER BY b.name"
    ))
    .bind(format!("%{query}%"))
    .fetch_all(db)
    .await
    .context("search beers by name")?;
    Ok(rows)
}

pub async fn delete(db: &PgPool, id: i64) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM beers WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("delete beer")?;
    Ok(())
}
