// crates/portal-services/src/sports.rs

//! football-data.org v4 client.
//!
//! Every operation answers with a successful result: when the upstream call
//! fails the lists are simply empty. Fresh results are cached per operation
//! and served with `cached: true` until they age out.

use crate::retry::{with_retry, RetryError, RetryPolicy};
use crate::{sa_date, sa_timestamp};
use anyhow::{Context, Result};
use chrono::{DateTime, Days, NaiveDate, Utc};
use chrono_tz::Africa::Johannesburg;
use portal_core::{AppError, ConfigError, ReqwestErrorExt, SportsConfig, SportsError, TtlCache};
use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;
use url::Url;

const LIVE_KEY: &str = "football_live_matches";
const TODAY_KEY: &str = "football_todays_matches";
const STANDINGS_KEY: &str = "football_standings";
const FIXTURES_KEY: &str = "football_upcoming_fixtures";

const LIVE_MAX_AGE: Duration = Duration::from_secs(60);
const TODAY_MAX_AGE: Duration = Duration::from_secs(300);
const STANDINGS_MAX_AGE: Duration = Duration::from_secs(3600);
const FIXTURES_MAX_AGE: Duration = Duration::from_secs(600);

const FIXTURE_WINDOW_DAYS: u64 = 7;
const SOURCE: &str = "Football-Data.org";
const DEFAULT_FORM: &str = "-----";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchStatus {
    Live,
    Completed,
    Upcoming,
}

impl MatchStatus {
    /// Maps an upstream status (`LIVE`, `FINISHED`, `SCHEDULED`, ...)
    pub fn from_upstream(status: &str) -> Self {
        match status {
            "LIVE" => MatchStatus::Live,
            "FINISHED" => MatchStatus::Completed,
            _ => MatchStatus::Upcoming,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: Option<u64>,
    pub home_team: String,
    pub away_team: String,
    /// `"2-1"`, `"vs"` before kick-off, `"0-0"` otherwise
    pub score: String,
    pub status: MatchStatus,
    pub is_live: bool,
    /// Kick-off date in South Africa, `YYYY-MM-DD`
    pub date: String,
    /// Kick-off time in South Africa, `HH:MM`
    pub time: String,
    pub venue: String,
    pub competition: String,
    pub competition_code: Option<String>,
    pub matchday: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minute: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchList {
    pub success: bool,
    pub matches: Vec<Match>,
    pub total: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub last_updated: String,
    #[serde(default)]
    pub cached: bool,
}

impl MatchList {
    fn new(matches: Vec<Match>, now: DateTime<Utc>) -> Self {
        Self {
            success: true,
            total: matches.len(),
            matches,
            date: None,
            date_range: None,
            source: None,
            last_updated: sa_timestamp(now),
            cached: false,
        }
    }

    fn empty(now: DateTime<Utc>) -> Self {
        Self::new(Vec::new(), now)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingRow {
    pub position: u32,
    pub team: String,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,
    pub points: u32,
    pub form: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standings {
    pub success: bool,
    pub standings: Vec<StandingRow>,
    pub competition: String,
    /// Current matchday
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    pub last_updated: String,
    #[serde(default)]
    pub cached: bool,
}

// Upstream shapes. Nearly every field may be missing or null.

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawMatches {
    matches: Vec<RawMatch>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawMatch {
    id: Option<u64>,
    status: Option<String>,
    utc_date: Option<String>,
    minute: Option<serde_json::Value>,
    matchday: Option<u32>,
    venue: Option<String>,
    home_team: Option<RawTeam>,
    away_team: Option<RawTeam>,
    competition: Option<RawCompetition>,
    score: Option<RawScore>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawTeam {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCompetition {
    name: Option<String>,
    code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawScore {
    full_time: Option<RawGoals>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawGoals {
    home: Option<u32>,
    away: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawStandings {
    competition: Option<RawCompetition>,
    season: Option<RawSeason>,
    standings: Vec<RawTable>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawSeason {
    current_matchday: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawTable {
    table: Vec<RawTableRow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawTableRow {
    position: Option<u32>,
    team: Option<RawTeam>,
    played_games: Option<u32>,
    won: Option<u32>,
    draw: Option<u32>,
    lost: Option<u32>,
    goals_for: Option<u32>,
    goals_against: Option<u32>,
    goal_difference: Option<i32>,
    points: Option<u32>,
    form: Option<String>,
}

fn team_name(team: Option<RawTeam>, fallback: &str) -> String {
    team.and_then(|t| t.name).unwrap_or_else(|| fallback.to_string())
}

fn minute_label(minute: Option<serde_json::Value>) -> String {
    match minute {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => "LIVE".to_string(),
    }
}

/// Kick-off date and time in South Africa. Unparsable timestamps fall back
/// to `today` and `TBC`; a missing one leaves both empty.
fn kick_off(utc_date: Option<&str>, today: NaiveDate) -> (String, String) {
    let Some(raw) = utc_date else {
        return (String::new(), String::new());
    };
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => {
            let local = dt.with_timezone(&Johannesburg);
            (
                local.format("%Y-%m-%d").to_string(),
                local.format("%H:%M").to_string(),
            )
        }
        Err(e) => {
            tracing::debug!("Unparsable kick-off {:?}: {}", raw, e);
            (today.format("%Y-%m-%d").to_string(), "TBC".to_string())
        }
    }
}

fn process_match(raw: RawMatch, upcoming: bool, today: NaiveDate) -> Match {
    let status = MatchStatus::from_upstream(raw.status.as_deref().unwrap_or("SCHEDULED"));
    let is_live = status == MatchStatus::Live;

    let goals = raw.score.and_then(|s| s.full_time).unwrap_or_default();
    let score = match (goals.home, goals.away) {
        (Some(home), Some(away)) => format!("{}-{}", home, away),
        _ if status == MatchStatus::Upcoming || upcoming => "vs".to_string(),
        _ => "0-0".to_string(),
    };

    let (date, time) = kick_off(raw.utc_date.as_deref(), today);
    let competition = raw.competition.unwrap_or_default();

    Match {
        id: raw.id,
        home_team: team_name(raw.home_team, "Home Team"),
        away_team: team_name(raw.away_team, "Away Team"),
        score,
        status,
        is_live,
        date,
        time,
        venue: raw.venue.unwrap_or_else(|| "Football Stadium".to_string()),
        competition: competition
            .name
            .unwrap_or_else(|| "Football Match".to_string()),
        competition_code: competition.code,
        matchday: raw.matchday.unwrap_or(1),
        minute: is_live.then(|| minute_label(raw.minute)),
    }
}

fn process_matches(raw: RawMatches, upcoming: bool, today: NaiveDate) -> Vec<Match> {
    raw.matches
        .into_iter()
        .map(|m| process_match(m, upcoming, today))
        .collect()
}

fn process_standings(raw: &mut RawStandings) -> Vec<StandingRow> {
    let Some(first) = raw.standings.first_mut() else {
        return Vec::new();
    };
    std::mem::take(&mut first.table)
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            let ordinal = u32::try_from(i + 1).unwrap_or(u32::MAX);
            StandingRow {
                position: row.position.unwrap_or(ordinal),
                team: row
                    .team
                    .and_then(|t| t.name)
                    .unwrap_or_else(|| format!("Team {}", ordinal)),
                played: row.played_games.unwrap_or(0),
                won: row.won.unwrap_or(0),
                drawn: row.draw.unwrap_or(0),
                lost: row.lost.unwrap_or(0),
                goals_for: row.goals_for.unwrap_or(0),
                goals_against: row.goals_against.unwrap_or(0),
                goal_difference: row.goal_difference.unwrap_or(0),
                points: row.points.unwrap_or(0),
                form: row
                    .form
                    .filter(|f| !f.is_empty())
                    .unwrap_or_else(|| DEFAULT_FORM.to_string()),
            }
        })
        .collect()
}

fn into_app_error(err: RetryError) -> AppError {
    match err {
        RetryError::Status { status, .. } if status == StatusCode::TOO_MANY_REQUESTS => {
            SportsError::RateLimited.into()
        }
        RetryError::Status { status, .. } => SportsError::ApiError {
            status: status.as_u16(),
            message: status.canonical_reason().unwrap_or("unknown").to_string(),
        }
        .into(),
        RetryError::Transport(e) => AppError::Network(e.into_network_error()),
    }
}

/// football-data.org client
#[derive(Debug)]
pub struct FootballClient {
    base_url: Url,
    client: Arc<Client>,
    token: String,
    competition: String,
    retry: RetryPolicy,
    matches: TtlCache<MatchList>,
    standings: TtlCache<Standings>,
}

impl FootballClient {
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;
        // Trailing slash so `join` appends instead of replacing the last segment
        let base = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&base).with_context(|| format!("Invalid football API URL: {}", base_url))?;

        Ok(Self {
            base_url,
            client: Arc::new(client),
            token: token.into(),
            competition: "PL".to_string(),
            retry: RetryPolicy::default(),
            matches: TtlCache::new(),
            standings: TtlCache::new(),
        })
    }

    pub fn from_config(config: &SportsConfig) -> Result<Self> {
        Ok(Self::new(&config.base_url, config.api_token.clone())?
            .with_competition(config.competition.clone()))
    }

    pub fn with_competition(mut self, code: impl Into<String>) -> Self {
        self.competition = code.into();
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.token.is_empty()
    }

    fn build_request(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("X-Auth-Token", &self.token)
            .header(header::ACCEPT, "application/json")
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, AppError> {
        if !self.is_configured() {
            return Err(SportsError::NotConfigured.into());
        }

        let url = self
            .base_url
            .join(path)
            .map_err(|e| AppError::Config(ConfigError::Invalid(e.to_string())))?;
        tracing::debug!("GET {}", url);

        let response = with_retry(&self.retry, |timeout| {
            self.build_request(self.client.get(url.clone()).query(params))
                .timeout(timeout)
                .send()
        })
        .await
        .map_err(into_app_error)?;

        response
            .json::<T>()
            .await
            .map_err(|e| AppError::Network(e.into_network_error()))
    }

    fn cached_matches(&self, key: &str, max_age: Duration) -> Option<MatchList> {
        self.matches.get(key, max_age).map(|mut hit| {
            hit.cached = true;
            hit
        })
    }

    /// Matches in play right now
    #[instrument(skip(self))]
    pub async fn live_matches(&self) -> MatchList {
        if let Some(hit) = self.cached_matches(LIVE_KEY, LIVE_MAX_AGE) {
            return hit;
        }

        let now = Utc::now();
        let params = [("status", "LIVE".to_string())];
        match self.get_json::<RawMatches>("v4/matches", &params).await {
            Ok(raw) => {
                let mut list = MatchList::new(process_matches(raw, false, sa_date(now)), now);
                list.source = Some(SOURCE.to_string());
                self.matches.set(LIVE_KEY, list.clone());
                list
            }
            Err(e) => {
                tracing::error!("Live matches error: {}", e);
                MatchList::empty(now)
            }
        }
    }

    /// Every match kicking off today (South African date)
    #[instrument(skip(self))]
    pub async fn todays_matches(&self) -> MatchList {
        if let Some(hit) = self.cached_matches(TODAY_KEY, TODAY_MAX_AGE) {
            return hit;
        }

        let now = Utc::now();
        let today = sa_date(now);
        let day = today.format("%Y-%m-%d").to_string();
        let params = [("dateFrom", day.clone()), ("dateTo", day.clone())];

        match self.get_json::<RawMatches>("v4/matches", &params).await {
            Ok(raw) => {
                let mut list = MatchList::new(process_matches(raw, false, today), now);
                list.date = Some(day);
                self.matches.set(TODAY_KEY, list.clone());
                list
            }
            Err(e) => {
                tracing::error!("Today matches error: {}", e);
                let mut list = MatchList::empty(now);
                list.date = Some(day);
                list
            }
        }
    }

    /// Scheduled matches over the next week
    #[instrument(skip(self))]
    pub async fn upcoming_fixtures(&self) -> MatchList {
        if let Some(hit) = self.cached_matches(FIXTURES_KEY, FIXTURES_MAX_AGE) {
            return hit;
        }

        let now = Utc::now();
        let today = sa_date(now);
        let until = today
            .checked_add_days(Days::new(FIXTURE_WINDOW_DAYS))
            .unwrap_or(today);
        let from = today.format("%Y-%m-%d").to_string();
        let to = until.format("%Y-%m-%d").to_string();
        let date_range = format!("{} to {}", from, to);
        let params = [
            ("dateFrom", from),
            ("dateTo", to),
            ("status", "SCHEDULED".to_string()),
        ];

        match self.get_json::<RawMatches>("v4/matches", &params).await {
            Ok(raw) => {
                let mut list = MatchList::new(process_matches(raw, true, today), now);
                list.date_range = Some(date_range);
                self.matches.set(FIXTURES_KEY, list.clone());
                list
            }
            Err(e) => {
                tracing::error!("Fixtures error: {}", e);
                let mut list = MatchList::empty(now);
                list.date_range = Some(date_range);
                list
            }
        }
    }

    /// League table for the configured competition
    #[instrument(skip(self))]
    pub async fn standings(&self) -> Standings {
        if let Some(mut hit) = self.standings.get(STANDINGS_KEY, STANDINGS_MAX_AGE) {
            hit.cached = true;
            return hit;
        }

        let now = Utc::now();
        let path = format!("v4/competitions/{}/standings", self.competition);
        match self.get_json::<RawStandings>(&path, &[]).await {
            Ok(mut raw) => {
                let standings = process_standings(&mut raw);
                let result = Standings {
                    success: true,
                    standings,
                    competition: raw
                        .competition
                        .and_then(|c| c.name)
                        .unwrap_or_else(|| "Premier League".to_string()),
                    season: Some(raw.season.and_then(|s| s.current_matchday).unwrap_or(1)),
                    last_updated: sa_timestamp(now),
                    cached: false,
                };
                self.standings.set(STANDINGS_KEY, result.clone());
                result
            }
            Err(e) => {
                tracing::error!("Standings error: {}", e);
                Standings {
                    success: true,
                    standings: Vec::new(),
                    competition: "Premier League".to_string(),
                    season: None,
                    last_updated: sa_timestamp(now),
                    cached: false,
                }
            }
        }
    }
}
