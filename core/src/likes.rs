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

use crate::models::{ArtistLikes, Track};
use async_trait::async_trait;
use log::{info, warn};

/// Something that can list the tracks an artist has liked.
#[async_trait]
pub trait LikesSource {
    type Error: std::error::Error + Send + Sync;

    /// Returns the artist's display name and up to `limit` liked tracks.
    async fn fetch_likes(
        &self,
        artist: &str,
        limit: usize,
    ) -> Result<(String, Vec<Track>), Self::Error>;
}

/// An artist that was left out of the aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedArtist {
    pub artist: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct CollectOutcome {
    pub likes: ArtistLikes,
    pub skipped: Vec<SkippedArtist>,
}

/// Fetches likes for every artist in order. Failures and empty like lists
/// are recorded in `skipped` and never abort the run.
pub async fn collect_artist_likes<S>(
    source: &S,
    artists: &[String],
    limit: usize,
) -> CollectOutcome
where
    S: LikesSource + Sync,
{
    let mut outcome = CollectOutcome::default();

    for artist in artists {
        info!("Fetching likes from: {}", artist);
        match source.fetch_likes(artist, limit).await {
            Ok((_, tracks)) if tracks.is_empty() => {
                warn!("{} has no liked tracks", artist);
                outcome.skipped.push(SkippedArtist {
                    artist: artist.clone(),
                    reason: "no liked tracks".to_string(),
                });
            }
            Ok((name, tracks)) => {
                info!("{}: {} likes", name, tracks.len());
                outcome.likes.insert(name, tracks);
            }
            Err(e) => {
                warn!("Could not fetch likes for {}: {}", artist, e);
                outcome.skipped.push(SkippedArtist {
                    artist: artist.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    outcome
}
