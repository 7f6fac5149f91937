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

use crate::models::{ReportTrack, UNKNOWN};
use crate::retry::{is_transient_status, RetryPolicy};
use crate::title::{clean_title, titles_overlap};
use log::{debug, info, warn};
use rspotify::{
    http::HttpError,
    model::{FullTrack, PlayableId, SearchResult, SearchType, TrackId},
    prelude::*,
    AuthCodeSpotify, ClientError,
};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

const PLAYLIST_PREFIX: &str = "[Common Likes]";
const ADD_BATCH_SIZE: usize = 100;

#[derive(Error, Debug)]
pub enum PlaylistError {
    #[error("Spotify API error: {0}")]
    Spotify(#[from] ClientError),
}

// Only HTTP failures that may clear up (429, 5xx, timeouts) are retried.
fn is_transient_spotify_error(err: &ClientError) -> bool {
    match err {
        ClientError::Http(http) => match http.as_ref() {
            HttpError::StatusCode(response) => is_transient_status(response.status().as_u16()),
            HttpError::Client(e) => e.is_timeout() || e.is_connect(),
        },
        _ => false,
    }
}

/// A Spotify track found for a source track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotifyMatch {
    pub id: TrackId<'static>,
    pub track_name: String,
    pub artist_name: String,
}

impl SpotifyMatch {
    fn from_track(track: FullTrack) -> Option<Self> {
        let artist_name = track
            .artists
            .first()
            .map(|a| a.name.clone())
            .unwrap_or_else(|| UNKNOWN.to_string());
        Some(Self {
            id: track.id?,
            track_name: track.name,
            artist_name,
        })
    }
}

impl fmt::Display for SpotifyMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.artist_name, self.track_name)
    }
}

/// Outcome of looking up a list of tracks on Spotify.
#[derive(Debug, Default)]
pub struct MatchReport {
    pub found: Vec<SpotifyMatch>,
    pub not_found: Vec<ReportTrack>,
}

/// Playlist name used when none is given: the artist names joined by " × ".
pub fn default_playlist_name(artists: &[String]) -> String {
    artists.join(" × ")
}

pub fn playlist_description(artists: &[String]) -> String {
    format!("Tracks liked by: {}", artists.join(", "))
}

// Prefers a candidate whose name overlaps the cleaned title, else the first.
fn pick_candidate(clean_title: &str, names: &[&str]) -> Option<usize> {
    if names.is_empty() {
        return None;
    }
    names
        .iter()
        .position(|name| titles_overlap(clean_title, name))
        .or(Some(0))
}

pub struct PlaylistBuilder {
    spotify: Arc<AuthCodeSpotify>,
    retry: RetryPolicy,
}

impl PlaylistBuilder {
    pub fn new(spotify: AuthCodeSpotify, retry: RetryPolicy) -> Self {
        Self {
            spotify: Arc::new(spotify),
            retry,
        }
    }

    async fn search_tracks(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<FullTrack>, PlaylistError> {
        let result = self
            .retry
            .run("Spotify search", is_transient_spotify_error, || {
                self.spotify
                    .search(query, SearchType::Track, None, None, Some(limit), None)
            })
            .await?;

        match result {
            SearchResult::Tracks(page) => Ok(page.items),
            _ => Ok(Vec::new()),
        }
    }

    /// Looks a track up on Spotify: first an exact `track:`/`artist:` query,
    /// then a relaxed free-text query.
    pub async fn search_track(
        &self,
        title: &str,
        artist: &str,
    ) -> Result<Option<SpotifyMatch>, PlaylistError> {
        let clean = clean_title(title);

        let exact = format!("track:{} artist:{}", clean, artist);
        let found = self
            .search_tracks(&exact, 1)
            .await?
            .into_iter()
            .find_map(SpotifyMatch::from_track);
        if found.is_some() {
            return Ok(found);
        }

        let relaxed = format!("{} {}", artist, clean);
        debug!("No exact match, trying relaxed query: {}", relaxed);
        let mut candidates: Vec<SpotifyMatch> = self
            .search_tracks(&relaxed, 3)
            .await?
            .into_iter()
            .filter_map(SpotifyMatch::from_track)
            .collect();

        let names: Vec<&str> = candidates.iter().map(|c| c.track_name.as_str()).collect();
        Ok(pick_candidate(&clean, &names).map(|i| candidates.swap_remove(i)))
    }

    /// Searches every track. Search failures count as not found.
    pub async fn match_tracks(&self, tracks: &[ReportTrack]) -> MatchReport {
        let mut report = MatchReport::default();

        for track in tracks {
            match self.search_track(&track.title, &track.artist).await {
                Ok(Some(found)) => {
                    info!("Found: {}", found);
                    report.found.push(found);
                }
                Ok(None) => {
                    info!("Not found: {} - {}", track.artist, track.title);
                    report.not_found.push(track.clone());
                }
                Err(e) => {
                    warn!("Search failed for {} - {}: {}", track.artist, track.title, e);
                    report.not_found.push(track.clone());
                }
            }
        }

        report
    }

    /// Creates a public playlist and fills it in batches. Returns its URL.
    pub async fn create_playlist(
        &self,
        name: &str,
        tracks: &[SpotifyMatch],
        description: &str,
    ) -> Result<String, PlaylistError> {
        let user = self.spotify.me().await?;

        let playlist = self
            .spotify
            .user_playlist_create(
                user.id,
                &format!("{} {}", PLAYLIST_PREFIX, name),
                Some(true),
                None,
                Some(description),
            )
            .await?;

        let items: Vec<PlayableId> = tracks
            .iter()
            .map(|t| PlayableId::Track(t.id.clone()))
            .collect();
        for chunk in items.chunks(ADD_BATCH_SIZE) {
            self.spotify
                .playlist_add_items(playlist.id.clone(), chunk.iter().cloned(), None)
                .await?;
        }

        info!(
            "Created playlist {} with {} tracks",
            playlist.id,
            items.len()
        );

        Ok(playlist
            .external_urls
            .get("spotify")
            .cloned()
            .unwrap_or_else(|| playlist.id.url()))
    }
}
