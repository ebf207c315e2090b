use super::{Album, AlbumService, Photo};
use crate::config::PhotoprismConfig;
use anyhow::{Context, Result};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Header carrying the session id on every authenticated request
const SESSION_HEADER: &str = "X-Session-ID";

/// HTTP client for the PhotoPrism REST API.
pub struct PhotoprismClient {
    client: Client,
    base_url: String,
    session_id: String,
    access_token: Option<String>,
    album_limit: usize,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct SessionResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
}

#[derive(Serialize)]
struct CreateAlbumRequest<'a> {
    #[serde(rename = "Title")]
    title: &'a str,
}

#[derive(Serialize)]
struct PhotoSelection<'a> {
    photos: &'a [String],
}

impl PhotoprismClient {
    /// Open a session with the credentials from `config`.
    pub async fn login(config: &PhotoprismConfig) -> Result<Self> {
        let url = required(&config.url, "url")?;
        let user = required(&config.user, "user")?;
        let pass = required(&config.pass, "pass")?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                Client::new()
            });
        let base_url = url.trim_end_matches('/').to_string();

        let response = client
            .post(format!("{}/api/v1/session", base_url))
            .json(&LoginRequest {
                username: user,
                password: pass,
            })
            .send()
            .await
            .with_context(|| format!("Failed to connect to PhotoPrism at {}", base_url))?;
        let response = check_status(response, "PhotoPrism login failed").await?;

        let header_id = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let session: SessionResponse = response
            .json()
            .await
            .context("Invalid PhotoPrism session response")?;

        let access_token = non_empty(session.access_token);
        let session_id = non_empty(header_id)
            .or_else(|| non_empty(session.id))
            .or_else(|| access_token.clone())
            .ok_or_else(|| anyhow::anyhow!("PhotoPrism login returned no session id"))?;

        tracing::debug!("Logged in to PhotoPrism at {} as {}", base_url, user);

        Ok(Self {
            client,
            base_url,
            session_id,
            access_token,
            album_limit: config.album_limit,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}/api/v1{}", self.base_url, path))
            .header(SESSION_HEADER, &self.session_id);

        match self.access_token {
            Some(ref token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, context_msg: &str) -> Result<Response> {
        let response = builder
            .send()
            .await
            .with_context(|| context_msg.to_string())?;
        check_status(response, context_msg).await
    }

    async fn photos(&self, query: &[(&str, String)], context_msg: &str) -> Result<Vec<Photo>> {
        let builder = self.request(Method::GET, "/photos").query(query);
        let response = self.send(builder, context_msg).await?;
        response
            .json()
            .await
            .with_context(|| format!("{}: invalid response", context_msg))
    }
}

#[async_trait::async_trait]
impl AlbumService for PhotoprismClient {
    async fn list_albums(&self) -> Result<Vec<Album>> {
        let builder = self.request(Method::GET, "/albums").query(&[
            ("count", self.album_limit.to_string()),
            ("offset", "0".to_string()),
            ("type", "album".to_string()),
        ]);
        let response = self.send(builder, "Failed to list PhotoPrism albums").await?;
        response
            .json()
            .await
            .context("Invalid PhotoPrism album list")
    }

    async fn create_album(&self, title: &str) -> Result<Album> {
        let builder = self
            .request(Method::POST, "/albums")
            .json(&CreateAlbumRequest { title });
        let context_msg = format!("Failed to create PhotoPrism album {}", title);
        let response = self.send(builder, &context_msg).await?;
        response
            .json()
            .await
            .with_context(|| format!("{}: invalid response", context_msg))
    }

    async fn album_photos(&self, album_uid: &str, limit: usize) -> Result<Vec<Photo>> {
        self.photos(
            &[
                ("count", limit.to_string()),
                ("offset", "0".to_string()),
                ("album", album_uid.to_string()),
            ],
            &format!("Failed to list photos of album {}", album_uid),
        )
        .await
    }

    async fn find_photos_by_filename(&self, query: &str, limit: usize) -> Result<Vec<Photo>> {
        self.photos(
            &[
                ("count", limit.to_string()),
                ("offset", "0".to_string()),
                ("q", format!("filename:\"*{}*\"", query)),
            ],
            &format!("Failed to search PhotoPrism for {}", query),
        )
        .await
    }

    async fn add_photos(&self, album_uid: &str, photo_uids: &[String]) -> Result<()> {
        let builder = self
            .request(Method::POST, &format!("/albums/{}/photos", album_uid))
            .json(&PhotoSelection { photos: photo_uids });
        self.send(builder, &format!("Failed to add photos to album {}", album_uid))
            .await?;
        Ok(())
    }

    async fn remove_photos(&self, album_uid: &str, photo_uids: &[String]) -> Result<()> {
        let builder = self
            .request(Method::DELETE, &format!("/albums/{}/photos", album_uid))
            .json(&PhotoSelection { photos: photo_uids });
        self.send(
            builder,
            &format!("Failed to remove photos from album {}", album_uid),
        )
        .await?;
        Ok(())
    }
}

async fn check_status(response: Response, context_msg: &str) -> Result<Response> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("{} ({}): {}", context_msg, status, body);
    }
    Ok(response)
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| anyhow::anyhow!("PhotoPrism {} is not configured (use --{})", name, name))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
