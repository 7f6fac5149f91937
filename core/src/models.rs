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

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Placeholder used when the source platform omits a title or artist name.
pub const UNKNOWN: &str = "Unknown";

/// A single liked track as fetched from the source platform.
///
/// Identity is the platform id alone: two values with the same `id` compare
/// equal even if their title, artist or url differ.
#[derive(Debug, Clone)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub url: String,
}

impl Track {
    pub fn new(
        id: impl Into<String>,
        title: Option<String>,
        artist: Option<String>,
        url: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.unwrap_or_else(|| UNKNOWN.to_string()),
            artist: artist.unwrap_or_else(|| UNKNOWN.to_string()),
            url: url.unwrap_or_default(),
        }
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Track {}

impl Hash for Track {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.artist, self.title)
    }
}

/// Liked tracks per artist, kept in the order the artists were added.
#[derive(Debug, Clone, Default)]
pub struct ArtistLikes {
    entries: Vec<(String, Vec<Track>)>,
}

impl ArtistLikes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an artist's likes. Re-inserting a known artist replaces its
    /// tracks but keeps its original position.
    pub fn insert(&mut self, artist: impl Into<String>, tracks: Vec<Track>) {
        let artist = artist.into();
        match self.entries.iter_mut().find(|(name, _)| *name == artist) {
            Some((_, existing)) => *existing = tracks,
            None => self.entries.push((artist, tracks)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Track])> {
        self.entries
            .iter()
            .map(|(name, tracks)| (name.as_str(), tracks.as_slice()))
    }

    pub fn artists(&self) -> Vec<String> {
        self.entries.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Vec<Track>)> for ArtistLikes {
    fn from_iter<I: IntoIterator<Item = (S, Vec<Track>)>>(iter: I) -> Self {
        let mut likes = ArtistLikes::new();
        for (artist, tracks) in iter {
            likes.insert(artist, tracks);
        }
        likes
    }
}

/// A track liked by several artists, with the artists who liked it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonTrack {
    pub track: Track,
    pub liked_by: Vec<String>,
}

impl CommonTrack {
    pub fn artist_count(&self) -> usize {
        self.liked_by.len()
    }
}

impl fmt::Display for CommonTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.track)
    }
}

/// One entry of a saved report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTrack {
    pub title: String,
    pub artist: String,
    pub url: String,
    pub liked_by: Vec<String>,
}

impl From<&CommonTrack> for ReportTrack {
    fn from(common: &CommonTrack) -> Self {
        Self {
            title: common.track.title.clone(),
            artist: common.track.artist.clone(),
            url: common.track.url.clone(),
            liked_by: common.liked_by.clone(),
        }
    }
}

/// The JSON document written by `find --json` and read by `playlist`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonLikesReport {
    pub artists: Vec<String>,
    pub min_artists: usize,
    pub common_tracks: Vec<ReportTrack>,
}

impl CommonLikesReport {
    pub fn new(artist_likes: &ArtistLikes, min_artists: usize, common: &[CommonTrack]) -> Self {
        Self {
            artists: artist_likes.artists(),
            min_artists,
            common_tracks: common.iter().map(ReportTrack::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn track(id: &str, title: &str) -> Track {
        Track::new(id, Some(title.to_string()), Some("Foo".to_string()), None)
    }

    #[test]
    fn test_track_defaults_to_placeholders() {
        let t = Track::new("42", None, None, None);
        assert_eq!(t.title, UNKNOWN);
        assert_eq!(t.artist, UNKNOWN);
        assert_eq!(t.url, "");
        assert_eq!(format!("{}", t), "Unknown - Unknown");
    }

    #[test]
    fn test_track_identity_is_id_only() {
        let a = track("1", "Song X");
        let b = Track::new(
            "1",
            Some("Song X (Repost)".to_string()),
            Some("Bar".to_string()),
            Some("u2".to_string()),
        );
        assert_eq!(a, b);

        let set: HashSet<Track> = [a, b, track("2", "Song Y")].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_artist_likes_keeps_insertion_order() {
        let mut likes = ArtistLikes::new();
        likes.insert("Zed", vec![track("1", "A")]);
        likes.insert("Amy", vec![]);
        likes.insert("Zed", vec![track("2", "B")]);

        assert_eq!(likes.len(), 2);
        assert_eq!(likes.artists(), vec!["Zed", "Amy"]);

        let (first, tracks) = likes.iter().next().unwrap();
        assert_eq!(first, "Zed");
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].id, "2");
    }

    #[test]
    fn test_report_serializes_contract_fields() {
        let likes: ArtistLikes = vec![("A", vec![track("1", "Song X")]), ("B", vec![])]
            .into_iter()
            .collect();
        let common = vec![CommonTrack {
            track: Track::new(
                "1",
                Some("Song X".to_string()),
                Some("Foo".to_string()),
                Some("u1".to_string()),
            ),
            liked_by: vec!["A".to_string(), "B".to_string()],
        }];

        let report = CommonLikesReport::new(&likes, 2, &common);
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "artists": ["A", "B"],
                "min_artists": 2,
                "common_tracks": [
                    {"title": "Song X", "artist": "Foo", "url": "u1", "liked_by": ["A", "B"]}
                ]
            })
        );

        let parsed: CommonLikesReport = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, report);
    }
}
