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

pub mod aggregate;
pub mod auth;
pub mod likes;
pub mod models;
pub mod playlist;
pub mod retry;
pub mod soundcloud;
pub mod title;

// Re-export key items for convenience
pub use aggregate::{find_common, AggregateError};
pub use auth::{get_spotify_client, spotify_credentials_present};
pub use likes::{collect_artist_likes, LikesSource};
pub use models::{ArtistLikes, CommonLikesReport, CommonTrack, ReportTrack, Track};
pub use playlist::PlaylistBuilder;
pub use retry::RetryPolicy;
pub use soundcloud::SoundCloudClient;
