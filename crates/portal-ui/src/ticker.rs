//! Sports ticker: which matches the home page scrolls through.

use portal_services::{Match, MatchList, MatchStatus};

pub const TICKER_LIMIT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerItem {
    pub home_team: String,
    pub away_team: String,
    pub score: String,
    pub is_live: bool,
}

impl From<&Match> for TickerItem {
    fn from(m: &Match) -> Self {
        Self {
            home_team: m.home_team.clone(),
            away_team: m.away_team.clone(),
            score: m.score.clone(),
            is_live: m.is_live,
        }
    }
}

fn item(home: &str, away: &str, score: &str) -> TickerItem {
    TickerItem {
        home_team: home.to_string(),
        away_team: away.to_string(),
        score: score.to_string(),
        is_live: false,
    }
}

/// Local results shown when there is nothing to show from the feed
pub fn default_ticker() -> Vec<TickerItem> {
    vec![
        item("Sundowns", "Pirates", "2-1"),
        item("Chiefs", "Cape Town City", "1-1"),
        item("SuperSport", "Stellenbosch", "2-0"),
    ]
}

/// Live matches first; without any, upcoming ones; without either, the
/// default set
pub fn select_ticker(matches: &[Match]) -> Vec<TickerItem> {
    let live: Vec<TickerItem> = matches
        .iter()
        .filter(|m| m.is_live)
        .take(TICKER_LIMIT)
        .map(TickerItem::from)
        .collect();
    if !live.is_empty() {
        return live;
    }

    let upcoming: Vec<TickerItem> = matches
        .iter()
        .filter(|m| m.status == MatchStatus::Upcoming)
        .take(TICKER_LIMIT)
        .map(TickerItem::from)
        .collect();
    if !upcoming.is_empty() {
        return upcoming;
    }

    default_ticker()
}

/// Ticker for the result of fetching today's matches; a failed or
/// unsuccessful fetch gets the default set
pub fn ticker_for<E: std::fmt::Display>(response: Result<MatchList, E>) -> Vec<TickerItem> {
    match response {
        Ok(list) if list.success => select_ticker(&list.matches),
        Ok(_) => default_ticker(),
        Err(e) => {
            tracing::error!("Sports ticker error: {}", e);
            default_ticker()
        }
    }
}
