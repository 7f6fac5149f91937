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

use crate::models::{ArtistLikes, CommonTrack};
use log::debug;
use std::cmp::Reverse;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AggregateError {
    #[error("Track '{title}' liked by '{artist}' has no id")]
    MissingTrackId { artist: String, title: String },
}

/// Finds the tracks liked by at least `min_artists` distinct artists.
///
/// Each result carries the first-seen copy of the track and the artists that
/// liked it, in artist iteration order. Results are ordered by number of
/// artists (descending), then by lowercased title; ties keep first-seen order.
///
/// `min_artists` below 1 is treated as 1. An artist listing the same track
/// twice is only counted once.
pub fn find_common(
    artist_likes: &ArtistLikes,
    min_artists: usize,
) -> Result<Vec<CommonTrack>, AggregateError> {
    let min_artists = min_artists.max(1);

    let mut by_id: HashMap<&str, usize> = HashMap::new();
    let mut entries: Vec<CommonTrack> = Vec::new();

    for (artist, tracks) in artist_likes.iter() {
        for track in tracks {
            if track.id.is_empty() {
                return Err(AggregateError::MissingTrackId {
                    artist: artist.to_string(),
                    title: track.title.clone(),
                });
            }

            let index = *by_id.entry(track.id.as_str()).or_insert_with(|| {
                entries.push(CommonTrack {
                    track: track.clone(),
                    liked_by: Vec::new(),
                });
                entries.len() - 1
            });

            let liked_by = &mut entries[index].liked_by;
            if !liked_by.iter().any(|name| name == artist) {
                liked_by.push(artist.to_string());
            }
        }
    }

    debug!(
        "Indexed {} distinct tracks across {} artists",
        entries.len(),
        artist_likes.len()
    );

    entries.retain(|entry| entry.artist_count() >= min_artists);
    entries.sort_by_cached_key(|entry| {
        (
            Reverse(entry.artist_count()),
            entry.track.title.to_lowercase(),
        )
    });

    Ok(entries)
}
