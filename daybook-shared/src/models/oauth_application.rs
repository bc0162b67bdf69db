/// OAuth client application registrations
///
/// Every column apart from the id is optional. `user_id` is a loose reference
/// with no foreign key, so applications outlive the user that registered them.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE "oauth_application" (
///     "id" TEXT PRIMARY KEY NOT NULL,
///     "name" TEXT,
///     "icon" TEXT,
///     "metadata" TEXT,
///     "client_id" TEXT UNIQUE,
///     "client_secret" TEXT,
///     "redirect_u_r_ls" TEXT,
///     "type" TEXT,
///     "disabled" INTEGER,
///     "user_id" TEXT,
///     "created_at" INTEGER,
///     "updated_at" INTEGER
/// );
/// ```

use crate::db::defaults::{id_or_generate, Timestamp};
use crate::error::{DbError, DbResult};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct OAuthApplication {
    pub id: String,
    pub name: Option<String>,
    pub icon: Option<String>,
    pub metadata: Option<String>,

    /// Public client identifier, unique when present
    pub client_id: Option<String>,

    #[serde(skip_serializing)]
    pub client_secret: Option<String>,

    /// Comma separated list of allowed redirect URLs
    #[sqlx(rename = "redirect_u_r_ls")]
    pub redirect_urls: Option<String>,

    /// Client type (e.g. "web", "native")
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub app_type: Option<String>,

    pub disabled: Option<bool>,
    pub user_id: Option<String>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateOAuthApplication {
    pub id: Option<String>,
    pub name: Option<String>,
    pub icon: Option<String>,
    pub metadata: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_urls: Option<String>,
    #[serde(rename = "type")]
    pub app_type: Option<String>,
    pub disabled: Option<bool>,
    pub user_id: Option<String>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

impl OAuthApplication {
    /// Registers an application
    ///
    /// # Errors
    ///
    /// `UniqueConstraintViolation` if the client id is already registered
    pub async fn create(pool: &SqlitePool, data: CreateOAuthApplication) -> DbResult<Self> {

        let app = sqlx::query_as::<_, OAuthApplication>(
            r#"
            INSERT INTO oauth_application (
                id, name, icon, metadata, client_id, client_secret, redirect_u_r_ls,
                type, disabled, user_id, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, name, icon, metadata, client_id, client_secret, redirect_u_r_ls,
                      type, disabled, user_id, created_at, updated_at
            "#,
        )
        .bind(id_or_generate(data.id))
        .bind(data.name)
        .bind(data.icon)
        .bind(data.metadata)
        .bind(data.client_id)
        .bind(data.client_secret)
        .bind(data.redirect_urls)
        .bind(data.app_type)
        .bind(data.disabled)
        .bind(data.user_id)
        .bind(data.created_at)
        .bind(data.updated_at)
        .fetch_one(pool)
        .await?;

        debug!(app_id = %app.id, "Registered OAuth application");
        Ok(app)
    }

    pub async fn find_by_client_id(pool: &SqlitePool, client_id: &str) -> DbResult<Option<Self>> {
        let app = sqlx::query_as::<_, OAuthApplication>(
            r#"
            SELECT id, name, icon, metadata, client_id, client_secret, redirect_u_r_ls,
                   type, disabled, user_id, created_at, updated_at
            FROM oauth_application
            WHERE client_id = ?
            "#,
        )
        .bind(client_id)
        .fetch_optional(pool)
        .await?;

        Ok(app)
    }

    /// Redirect URLs split out of the stored list
    pub fn redirect_url_list(&self) -> Vec<&str> {
        self.redirect_urls
            .as_deref()
            .map(|urls| {
                urls.split(',')
                    .map(str::trim)
                    .filter(|u| !u.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub async fn delete(pool: &SqlitePool, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM oauth_application WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("oauth_application", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(redirect_urls: Option<&str>) -> OAuthApplication {
        OAuthApplication {
            id: "app".to_string(),
            name: None,
            icon: None,
            metadata: None,
            client_id: Some("client".to_string()),
            client_secret: Some("secret".to_string()),
            redirect_urls: redirect_urls.map(String::from),
            app_type: Some("web".to_string()),
            disabled: None,
            user_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_redirect_url_list() {
        let app = app(Some("https://a.example/cb, https://b.example/cb,"));
        assert_eq!(
            app.redirect_url_list(),
            vec!["https://a.example/cb", "https://b.example/cb"]
        );
        assert!(self::app(None).redirect_url_list().is_empty());
    }

    #[test]
    fn test_serializes_type_without_secret() {
        let json = serde_json::to_value(app(None)).unwrap();
        assert_eq!(json["type"], "web");
        assert!(json.get("client_secret").is_none());
    }
}
