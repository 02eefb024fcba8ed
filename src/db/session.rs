use rand::rngs::OsRng;
use rand::RngCore as _;

use crate::prelude::*;

/// A server-side admin session, keyed by a random opaque token.
///
/// The token carries no information itself; validity is a table lookup
/// plus an age check against the configured TTL. Anything that fails to
/// match is simply invalid.
#[derive(Debug, sqlx::FromRow)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Create a new session for `username`, returning the opaque token.
    pub async fn create(db: &Db, username: &str) -> sqlx::Result<String> {
        let mut bytes = [0u8; 16];
        OsRng.fill_bytes(&mut bytes);
        let token = hex::encode(bytes);

        sqlx::query("INSERT INTO sessions (token, username, created_at) VALUES (?, ?, ?)")
            .bind(&token)
            .bind(username)
            .bind(Utc::now())
            .execute(db)
            .await?;

        Ok(token)
    }

    /// Lookup a session by token, returning it only if it has not outlived `ttl`.
    pub async fn lookup_valid(
        db: &Db, token: &str, now: DateTime<Utc>, ttl: chrono::Duration,
    ) -> sqlx::Result<Option<Session>> {
        let session = sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE token = ?")
            .bind(token)
            .fetch_optional(db)
            .await?;

        Ok(session.filter(|s| now.signed_duration_since(s.created_at) < ttl))
    }

    /// Delete a session, invalidating its token. Deleting an unknown token is a no-op.
    pub async fn delete(db: &Db, token: &str) -> sqlx::Result<()> {
        sqlx::query("DELETE FROM sessions WHERE token = ?").bind(token).execute(db).await?;
        Ok(())
    }

    /// Remove sessions past their TTL. Validation ignores them either way.
    pub async fn delete_expired(
        db: &Db, now: DateTime<Utc>, ttl: chrono::Duration,
    ) -> sqlx::Result<()> {
        sqlx::query("DELETE FROM sessions WHERE created_at < ?")
            .bind(now - ttl)
            .execute(db)
            .await?;
        Ok(())
    }
}
