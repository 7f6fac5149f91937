/*
    common-likes | Rust CLI tool to find tracks liked by several artists.
    Copyright (C) 2025  Israel Alberto Roldan Vega

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use crate::likes::LikesSource;
use crate::models::Track;
use crate::retry::{is_transient_status, RetryPolicy};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://api-v2.soundcloud.com";
const PROFILE_URL: &str = "https://soundcloud.com";
const MAX_PAGE_SIZE: usize = 200;

#[derive(Error, Debug)]
pub enum SoundCloudError {
    #[error("SoundCloud request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to initialize SoundCloud client: {0}")]
    ClientConfig(String),
    #[error("{0} is not a SoundCloud user profile")]
    NotAUser(String),
}

impl SoundCloudError {
    /// Rate limiting, server errors and dropped connections may succeed on a
    /// later attempt. Everything else is final.
    pub fn is_transient(&self) -> bool {
        match self {
            SoundCloudError::Http(e) => match e.status() {
                Some(status) => is_transient_status(status.as_u16()),
                None => e.is_timeout() || e.is_connect(),
            },
            _ => false,
        }
    }
}

/// Turns a bare username into a profile URL. Full URLs are kept as-is.
pub fn normalize_artist_url(artist: &str) -> String {
    let artist = artist.trim();
    if artist.starts_with("http") {
        artist.to_string()
    } else {
        format!("{}/{}", PROFILE_URL, artist.trim_start_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct ResolvedResource {
    id: u64,
    kind: String,
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiTrack {
    id: u64,
    title: Option<String>,
    permalink_url: Option<String>,
    user: Option<ApiUser>,
}

impl From<ApiTrack> for Track {
    fn from(t: ApiTrack) -> Track {
        Track::new(
            t.id.to_string(),
            t.title,
            t.user.and_then(|u| u.username),
            t.permalink_url,
        )
    }
}

// A like is either a track or a playlist; only tracks are kept.
#[derive(Debug, Deserialize)]
struct LikeItem {
    track: Option<ApiTrack>,
}

#[derive(Debug, Deserialize)]
struct LikesPage {
    #[serde(default)]
    collection: Vec<LikeItem>,
    next_href: Option<String>,
}

impl LikesPage {
    fn into_tracks(self) -> Vec<Track> {
        self.collection
            .into_iter()
            .filter_map(|like| like.track)
            .map(Track::from)
            .collect()
    }
}

/// A SoundCloud user resolved from a profile URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundCloudUser {
    pub id: u64,
    pub username: String,
}

pub struct SoundCloudClient {
    http: Client,
    client_id: String,
    api_url: String,
    retry: RetryPolicy,
}

impl SoundCloudClient {
    pub fn new(client_id: String, api_url: String, retry: RetryPolicy) -> Self {
        Self {
            http: Client::new(),
            client_id,
            api_url: api_url.trim_end_matches('/').to_string(),
            retry,
        }
    }

    /// Builds a client from `SOUNDCLOUD_CLIENT_ID` and the optional
    /// `SOUNDCLOUD_API_URL`.
    pub fn from_env(retry: RetryPolicy) -> Result<Self, SoundCloudError> {
        let client_id = std::env::var("SOUNDCLOUD_CLIENT_ID")
            .ok()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                SoundCloudError::ClientConfig("Missing SOUNDCLOUD_CLIENT_ID".to_string())
            })?;
        let api_url =
            std::env::var("SOUNDCLOUD_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        Ok(Self::new(client_id, api_url, retry))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, SoundCloudError> {
        let response = self
            .http
            .get(url)
            .query(&[("client_id", self.client_id.as_str())])
            .query(query)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json::<T>().await?)
    }

    /// Resolves a profile URL to the user behind it.
    pub async fn resolve_user(
        &self,
        profile_url: &str,
    ) -> Result<SoundCloudUser, SoundCloudError> {
        let endpoint = format!("{}/resolve", self.api_url);
        let query = [("url", profile_url.to_string())];

        let resource: ResolvedResource = self
            .retry
            .run("SoundCloud resolve", SoundCloudError::is_transient, || {
                self.get_json(&endpoint, &query)
            })
            .await?;

        if resource.kind != "user" {
            return Err(SoundCloudError::NotAUser(profile_url.to_string()));
        }

        debug!("Resolved {} to user id {}", profile_url, resource.id);
        Ok(SoundCloudUser {
            id: resource.id,
            username: resource
                .username
                .unwrap_or_else(|| resource.id.to_string()),
        })
    }

    /// Fetches up to `limit` liked tracks of a user, newest first, following
    /// pagination as needed.
    pub async fn user_likes(
        &self,
        user_id: u64,
        limit: usize,
    ) -> Result<Vec<Track>, SoundCloudError> {
        let mut tracks: Vec<Track> = Vec::new();
        let mut next = Some(format!("{}/users/{}/likes", self.api_url, user_id));
        let mut query = vec![
            ("limit", limit.clamp(1, MAX_PAGE_SIZE).to_string()),
            ("linked_partitioning", "1".to_string()),
        ];

        while let Some(url) = next.take() {
            if tracks.len() >= limit {
                break;
            }

            let page: LikesPage = self
                .retry
                .run("SoundCloud likes", SoundCloudError::is_transient, || {
                    self.get_json(&url, &query)
                })
                .await?;

            // next_href already carries the paging parameters
            query.clear();

            if page.collection.is_empty() {
                break;
            }
            next = page.next_href.clone();

            let remaining = limit - tracks.len();
            tracks.extend(page.into_tracks().into_iter().take(remaining));
            debug!("Fetched {} likes of user {} so far", tracks.len(), user_id);
        }

        Ok(tracks)
    }
}

#[async_trait]
impl LikesSource for SoundCloudClient {
    type Error = SoundCloudError;

    async fn fetch_likes(
        &self,
        artist: &str,
        limit: usize,
    ) -> Result<(String, Vec<Track>), SoundCloudError> {
        let profile_url = normalize_artist_url(artist);
        let user = self.resolve_user(&profile_url).await?;
        let tracks = self.user_likes(user.id, limit).await?;
        Ok((user.username, tracks))
    }
}
