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

use rspotify::{prelude::*, scopes, AuthCodeSpotify, Config, Credentials, OAuth};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Failed to initialize Spotify client: {0}")]
    ClientConfig(String),
    #[error("Spotify authentication failed: {0}")]
    Spotify(#[from] rspotify::ClientError),
}

/// True when both Spotify app credentials are set in the environment.
pub fn spotify_credentials_present() -> bool {
    ["RSPOTIFY_CLIENT_ID", "RSPOTIFY_CLIENT_SECRET"]
        .iter()
        .all(|key| std::env::var(key).is_ok_and(|v| !v.trim().is_empty()))
}

/// Initializes and authenticates a Spotify client using the Authorization Code Flow.
///
/// This function:
/// 1. Reads credentials from `RSPOTIFY_CLIENT_ID` and `RSPOTIFY_CLIENT_SECRET`.
/// 2. Reads the redirect URI from `RSPOTIFY_REDIRECT_URI`.
/// 3. Requests the playlist-modify scopes needed to create playlists.
/// 4. Reuses the cached token (refreshing it when expired) or asks the user to
///    open the authorization URL.
pub async fn get_spotify_client() -> Result<AuthCodeSpotify, AuthError> {
    let creds = Credentials::from_env().ok_or_else(|| {
        AuthError::ClientConfig("Missing RSPOTIFY_CLIENT_ID or RSPOTIFY_CLIENT_SECRET".to_string())
    })?;

    // Only playlist creation is needed: searching works with any token.
    let scopes = scopes!("playlist-modify-public", "playlist-modify-private");

    let oauth = OAuth::from_env(scopes)
        .ok_or_else(|| AuthError::ClientConfig("Missing RSPOTIFY_REDIRECT_URI".to_string()))?;

    let config = Config {
        token_cached: true,
        token_refreshing: true,
        ..Default::default()
    };

    let spotify = AuthCodeSpotify::with_config(creds, oauth, config);

    let url = spotify.get_authorize_url(false)?;

    // Opens the browser (or prints the URL) and waits for the redirect.
    spotify.prompt_for_token(&url).await?;

    Ok(spotify)
}
