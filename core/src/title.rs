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

use once_cell::sync::Lazy;
use regex::Regex;

// Bracketed suffixes such as "(Original Mix)" or "[Extended Edit]".
static VERSION_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*[\[(][^\[\]()]*?(?:remix|mix|edit|version|original)[^\[\]()]*?[\])]")
        .expect("static pattern")
});

/// Removes remix/edit/version annotations from a track title so it can be
/// searched on another platform.
pub fn clean_title(title: &str) -> String {
    VERSION_SUFFIX.replace_all(title, "").trim().to_string()
}

/// Naive fuzzy match: true when either lowercased title contains the other.
pub fn titles_overlap(a: &str, b: &str) -> bool {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    a.contains(&b) || b.contains(&a)
}
