use anyhow::Context;
use sqlx::PgPool;

use crate::users::repo_types::User;

/// Mutable profile fields, applied in one UPDATE.
pub struct ProfileUpdate<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub about_you: Option<&'a str>,
}

const USER_COLUMNS: &str =
    "id, email, username, password_hash, first_name, last_name, about_you, created_at, updated_at";

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    pub async fn create(
        db: &PgPool,
        email: &str,
        username: &str,
        password_hash: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, username, password_hash, first_name, last_name) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .bind(username)
        .bind(password_hash)
        .bind(first_name)
        .bind(last_name)
        .fetch_one(db)
        .await
        .context("create user")?;
        Ok(user)
    }

    /// Overwrite the mutable profile fields and stamp the update time.
    pub async fn update_profile(
        db: &PgPool,
        id: i64,
        changes: ProfileUpdate<'_>,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users \
             SET username = $2, email = $3, first_name = $4, last_name = $5, about_you = $6, \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(changes.username)
        .bind(changes.email)
        .bind(changes.first_name)
        .bind(changes.last_name)
        .bind(changes.about_you)
        .fetch_one(db)
        .await
        .context("update user profile")?;
        Ok(user)
    }

    pub async fn update_password(db: &PgPool, id: i64, password_hash: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(db)
            .await
            .context("update user password")?;
        Ok(())
    }

    /// Remove the user together with every record that exists only because
    /// it references them. One transaction: either everything goes or
    /// nothing does.
    pub async fn delete_cascading(db: &PgPool, id: i64) -> anyhow::Result<()> {
        let mut tx = db.begin().await.context("begin account delete")?;
        sqlx::query("DELETE FROM checkins WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("delete checkins")?;
        sqlx::query("DELETE FROM lists WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("delete lists")?;
        sqlx::query("DELETE FROM liked_breweries WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("delete liked breweries")?;
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("delete user row")?;
        tx.commit().await.context("commit account delete")?;
        Ok(())
    }
}
