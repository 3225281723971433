// Lookups built once per load: player id -> display name and
// (season, team) -> league.

use crate::lines::{PlayerBio, TeamSeason};
use std::collections::HashMap;
use tracing::warn;

// ---------------------------------------------------------------------------
// Display names
// ---------------------------------------------------------------------------

/// Display name for one biographical record.
///
/// "First Last" trimmed; falls back to the given name, then the raw id.
pub fn display_name(bio: &PlayerBio) -> String {
    let first = bio.name_first.as_deref().unwrap_or("").trim();
    let last = bio.name_last.as_deref().unwrap_or("").trim();
    let full = format!("{first} {last}");
    let full = full.trim();
    if !full.is_empty() {
        return full.to_string();
    }

    match bio.name_given.as_deref().map(str::trim) {
        Some(given) if !given.is_empty() => given.to_string(),
        _ => bio.player_id.trim().to_string(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct NameBook {
    names: HashMap<String, String>,
}

impl NameBook {
    pub fn from_bios(bios: &[PlayerBio]) -> Self {
        let mut names = HashMap::with_capacity(bios.len());
        for bio in bios {
            let id = bio.player_id.trim();
            if names.contains_key(id) {
                warn!("duplicate biographical record for '{}', using latest", id);
            }
            names.insert(id.to_string(), display_name(bio));
        }
        Self { names }
    }

    /// Display name for `player_id`, or the id itself when unknown.
    pub fn name_for<'a>(&'a self, player_id: &'a str) -> &'a str {
        self.names
            .get(player_id)
            .map(String::as_str)
            .unwrap_or(player_id)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Leagues
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct LeagueBook {
    leagues: HashMap<(i32, String), String>,
}

impl LeagueBook {
    pub fn from_team_seasons(teams: &[TeamSeason]) -> Self {
        let leagues = teams
            .iter()
            .map(|t| ((t.year, t.team_id.clone()), t.league_id.clone()))
            .collect();
        Self { leagues }
    }

    pub fn league_for(&self, year: i32, team_id: &str) -> Option<&str> {
        self.leagues
            .get(&(year, team_id.to_string()))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.leagues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leagues.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn bio(id: &str, first: Option<&str>, last: Option<&str>, given: Option<&str>) -> PlayerBio {
        PlayerBio {
            player_id: id.into(),
            name_first: first.map(Into::into),
            name_last: last.map(Into::into),
            name_given: given.map(Into::into),
        }
    }

    #[test]
    fn first_and_last_joined() {
        let b = bio("ryanno01", Some("Nolan"), Some("Ryan"), Some("Lynn Nolan"));
        assert_eq!(display_name(&b), "Nolan Ryan");
    }

    #[test]
    fn single_part_names_trimmed() {
        assert_eq!(display_name(&bio("x", Some("Ichiro"), None, None)), "Ichiro");
        assert_eq!(display_name(&bio("x", None, Some(" Suzuki "), None)), "Suzuki");
    }

    #[test]
    fn falls_back_to_given_then_id() {
        assert_eq!(
            display_name(&bio("x", Some(" "), None, Some("George Herman"))),
            "George Herman"
        );
        assert_eq!(display_name(&bio("ruthba01", None, None, Some(""))), "ruthba01");
        assert_eq!(display_name(&bio("ruthba01", None, None, None)), "ruthba01");
    }

    #[test]
    fn name_book_lookup_and_unknown_ids() {
        let book = NameBook::from_bios(&[
            bio("aaronha01", Some("Hank"), Some("Aaron"), None),
            bio("mayswi01", Some("Willie"), Some("Mays"), None),
        ]);
        assert_eq!(book.len(), 2);
        assert_eq!(book.name_for("aaronha01"), "Hank Aaron");
        assert_eq!(book.name_for("nobody01"), "nobody01");
    }

    #[test]
    fn league_book_lookup() {
        let book = LeagueBook::from_team_seasons(&[
            TeamSeason {
                year: 1998,
                team_id: "MIL".into(),
                league_id: "NL".into(),
            },
            TeamSeason {
                year: 1997,
                team_id: "MIL".into(),
                league_id: "AL".into(),
            },
        ]);
        assert_eq!(book.league_for(1998, "MIL"), Some("NL"));
        assert_eq!(book.league_for(1997, "MIL"), Some("AL"));
        assert_eq!(book.league_for(1996, "MIL"), None);
        assert_eq!(book.len(), 2);
        assert!(LeagueBook::default().is_empty());
    }
}
