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

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use dotenvy::dotenv;
use likes_core::playlist::{default_playlist_name, playlist_description};
use likes_core::{
    collect_artist_likes, find_common, get_spotify_client, spotify_credentials_present,
    CommonLikesReport, CommonTrack, PlaylistBuilder, RetryPolicy, SoundCloudClient,
};
use log::debug;
use std::fmt::Write as _;
use std::path::Path;
use std::process;
use std::time::Duration;

const RULE_WIDTH: usize = 60;

#[derive(Parser)]
#[command(name = "common-likes")]
#[command(
    about = "Finds tracks liked by several SoundCloud artists and turns them into a Spotify playlist",
    long_about = None
)]
struct Cli {
    /// Attempts per API call before giving up
    #[arg(long, global = true, default_value_t = 3)]
    retries: u32,

    /// Seconds to wait before the first retry (doubles on each retry)
    #[arg(long, global = true, default_value_t = 2)]
    retry_delay: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Finds tracks liked by several artists (e.g. `find janefitz bobby chez-demilo`)
    Find(FindArgs),
    /// Creates a Spotify playlist from a report saved with `find --json`
    Playlist {
        /// Path of the saved JSON report
        #[arg(value_name = "REPORT_JSON")]
        report: String,
        /// Playlist name (default: the artist names)
        #[arg(long, short = 'n')]
        name: Option<String>,
    },
}

#[derive(Args)]
struct FindArgs {
    /// SoundCloud artist URLs or usernames
    #[arg(required = true, value_name = "ARTIST")]
    artists: Vec<String>,

    /// Minimum number of artists that must like a track
    #[arg(long, short = 'm', default_value_t = 2)]
    min_artists: usize,

    /// Maximum likes to fetch per artist
    #[arg(long, short = 'l', default_value_t = 200)]
    limit: usize,

    /// Playlist name (default: the artist names)
    #[arg(long, short = 'n')]
    name: Option<String>,

    /// Save the results to a JSON file (e.g., --json=results.json)
    #[arg(long, short = 'j')]
    json: Option<String>,

    /// Don't create a Spotify playlist, just show results
    #[arg(long)]
    no_spotify: bool,

    /// How many tracks to print
    #[arg(long, default_value_t = 30)]
    show: usize,
}

#[tokio::main]
async fn main() {
    env_logger::init();

    if dotenv().is_err() {
        // Silently ignore
    }

    let cli = Cli::parse();
    let retry = RetryPolicy::new(cli.retries, Duration::from_secs(cli.retry_delay));
    debug!("Retry policy: {:?}", retry);

    match cli.command {
        Commands::Find(args) => {
            handle_find(args, retry).await;
        }
        Commands::Playlist { report, name } => {
            handle_playlist(&report, name, retry).await;
        }
    }
}

async fn handle_find(args: FindArgs, retry: RetryPolicy) {
    let soundcloud = match SoundCloudClient::from_env(retry.clone()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error initializing SoundCloud client: {}", e);
            process::exit(1);
        }
    };

    println!("Analyzing {} artists...", args.artists.len());
    println!();

    let outcome = collect_artist_likes(&soundcloud, &args.artists, args.limit).await;

    for (name, tracks) in outcome.likes.iter() {
        println!("   [OK] {}: {} likes", name, tracks.len());
    }
    for skipped in &outcome.skipped {
        println!("   [SKIPPED] {}: {}", skipped.artist, skipped.reason);
    }

    let likes = outcome.likes;
    if likes.len() < 2 {
        eprintln!();
        eprintln!("[ERROR] Need at least 2 artists to find common likes!");
        process::exit(1);
    }

    let min_artists = args.min_artists.max(1);
    println!();
    println!("Finding tracks liked by {}+ artists...", min_artists);

    let common = match find_common(&likes, min_artists) {
        Ok(common) => common,
        Err(e) => {
            eprintln!();
            eprintln!("[ERROR] Aggregation failed: {}", e);
            process::exit(1);
        }
    };

    if common.is_empty() {
        println!();
        println!("No tracks found that {}+ artists have in common.", min_artists);
        println!("Try lowering --min-artists or fetching more --limit likes.");
        return;
    }

    println!();
    println!("Found {} tracks in common!", common.len());
    println!();
    print!("{}", render_common(&common, args.show));

    let report = CommonLikesReport::new(&likes, min_artists, &common);

    let saved = save_requested_report(args.json.as_deref(), &report);

    if !args.no_spotify {
        if spotify_credentials_present() {
            let name = args
                .name
                .unwrap_or_else(|| default_playlist_name(&report.artists));
            build_playlist(&report, &name, retry).await;
        } else {
            println!();
            println!("No Spotify credentials found. Skipping playlist creation.");
            println!("Set RSPOTIFY_CLIENT_ID and RSPOTIFY_CLIENT_SECRET in .env");
        }
    }

    // A report that could not be written still fails the run.
    if !saved {
        process::exit(1);
    }
}

/// Writes the report when `--json` was given. Returns false if writing failed.
fn save_requested_report(path: Option<&str>, report: &CommonLikesReport) -> bool {
    let Some(path) = path else {
        return true;
    };
    match save_report(Path::new(path), report) {
        Ok(()) => {
            println!();
            println!("[SAVED] Results saved to: {}", path);
            true
        }
        Err(e) => {
            eprintln!();
            eprintln!("[ERROR] {:#}", e);
            false
        }
    }
}

async fn handle_playlist(report_path: &str, name: Option<String>, retry: RetryPolicy) {
    let report = match load_report(Path::new(report_path)) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("[ERROR] {:#}", e);
            process::exit(1);
        }
    };

    if report.common_tracks.is_empty() {
        println!("The report contains no tracks. Nothing to do.");
        return;
    }

    if !spotify_credentials_present() {
        eprintln!("[ERROR] Set RSPOTIFY_CLIENT_ID and RSPOTIFY_CLIENT_SECRET in .env");
        process::exit(1);
    }

    let name = name.unwrap_or_else(|| default_playlist_name(&report.artists));
    build_playlist(&report, &name, retry).await;
}

async fn build_playlist(report: &CommonLikesReport, name: &str, retry: RetryPolicy) {
    let spotify = match get_spotify_client().await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error initializing Spotify client: {}", e);
            process::exit(1);
        }
    };
    let builder = PlaylistBuilder::new(spotify, retry);

    println!();
    println!("Searching {} tracks on Spotify...", report.common_tracks.len());

    let matches = builder.match_tracks(&report.common_tracks).await;

    for found in &matches.found {
        println!("   [FOUND] {}", found);
    }
    for missing in &matches.not_found {
        println!("   [MISSING] {} - {}", missing.artist, missing.title);
    }

    if matches.found.is_empty() {
        eprintln!();
        eprintln!("[ERROR] No tracks found on Spotify!");
        process::exit(1);
    }

    let description = playlist_description(&report.artists);
    match builder
        .create_playlist(name, &matches.found, &description)
        .await
    {
        Ok(url) => {
            println!();
            println!("{}", "=".repeat(RULE_WIDTH));
            println!("PLAYLIST CREATED");
            println!("{}", "=".repeat(RULE_WIDTH));
            println!("Link:              {}", url);
            println!("Added:             {} tracks", matches.found.len());
            if !matches.not_found.is_empty() {
                println!("Not on Spotify:    {} tracks", matches.not_found.len());
            }
        }
        Err(e) => {
            eprintln!();
            eprintln!("[ERROR] Playlist creation failed: {}", e);
            process::exit(1);
        }
    }
}

/// Ranked listing of the first `show` tracks.
fn render_common(common: &[CommonTrack], show: usize) -> String {
    let mut out = String::new();
    let rule = "=".repeat(RULE_WIDTH);

    let _ = writeln!(out, "{}", rule);
    for (i, entry) in common.iter().take(show).enumerate() {
        let _ = writeln!(out, "{:2}. {}", i + 1, entry);
        let _ = writeln!(out, "    Liked by: {}", entry.liked_by.join(", "));
        let _ = writeln!(out, "    {}", entry.track.url);
        let _ = writeln!(out);
    }
    if common.len() > show {
        let _ = writeln!(out, "   ... and {} more tracks", common.len() - show);
        let _ = writeln!(out);
    }
    let _ = writeln!(out, "{}", rule);

    out
}

fn save_report(path: &Path, report: &CommonLikesReport) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write report to '{}'", path.display()))
}

fn load_report(path: &Path) -> anyhow::Result<CommonLikesReport> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read report '{}'", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("'{}' is not a common likes report", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use likes_core::{ArtistLikes, Track};

    fn common(id: &str, title: &str, liked_by: &[&str]) -> CommonTrack {
        CommonTrack {
            track: Track::new(
                id,
                Some(title.to_string()),
                Some("Foo".to_string()),
                Some(format!("https://soundcloud.com/foo/{}", id)),
            ),
            liked_by: liked_by.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_find_args_parsing() {
        let cli = Cli::try_parse_from([
            "common-likes",
            "find",
            "janefitz",
            "bobby",
            "-m",
            "3",
            "--json",
            "out.json",
            "--no-spotify",
            "--retries",
            "5",
        ])
        .unwrap();

        assert_eq!(cli.retries, 5);
        assert_eq!(cli.retry_delay, 2);
        match cli.command {
            Commands::Find(args) => {
                assert_eq!(args.artists, vec!["janefitz", "bobby"]);
                assert_eq!(args.min_artists, 3);
                assert_eq!(args.limit, 200);
                assert_eq!(args.json.as_deref(), Some("out.json"));
                assert!(args.no_spotify);
                assert_eq!(args.show, 30);
            }
            _ => panic!("expected find"),
        }
    }

    #[test]
    fn test_find_requires_artists() {
        assert!(Cli::try_parse_from(["common-likes", "find"]).is_err());
    }

    #[test]
    fn test_render_common_limits_output() {
        let entries = vec![
            common("1", "Song X", &["A", "B"]),
            common("2", "Song Y", &["C"]),
            common("3", "Song Z", &["D"]),
        ];

        let out = render_common(&entries, 2);

        assert!(out.contains(" 1. Foo - Song X"));
        assert!(out.contains("    Liked by: A, B"));
        assert!(out.contains("https://soundcloud.com/foo/1"));
        assert!(out.contains(" 2. Foo - Song Y"));
        assert!(!out.contains("Song Z"));
        assert!(out.contains("... and 1 more tracks"));
    }

    #[test]
    fn test_report_file_round_trip() {
        let likes: ArtistLikes = vec![("A", vec![]), ("B", vec![])].into_iter().collect();
        let report = CommonLikesReport::new(&likes, 2, &[common("1", "Song X", &["A", "B"])]);

        let path = std::env::temp_dir().join(format!("common-likes-{}.json", process::id()));
        save_report(&path, &report).unwrap();
        let loaded = load_report(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, report);
    }

    #[test]
    fn test_failed_report_write_is_reported() {
        let likes: ArtistLikes = vec![("A", vec![]), ("B", vec![])].into_iter().collect();
        let report = CommonLikesReport::new(&likes, 2, &[]);
        let missing_dir = std::env::temp_dir()
            .join(format!("common-likes-missing-{}", process::id()))
            .join("out.json");

        assert!(!save_requested_report(missing_dir.to_str(), &report));
        assert!(save_requested_report(None, &report));
    }

    #[test]
    fn test_load_report_rejects_other_json() {
        let path = std::env::temp_dir().join(format!("common-likes-bad-{}.json", process::id()));
        std::fs::write(&path, r#"{"total_tracks_scanned": 3}"#).unwrap();
        let result = load_report(&path);
        let _ = std::fs::remove_file(&path);

        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("is not a common likes report"));
    }
}
