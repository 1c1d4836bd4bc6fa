//! HTML components rendered by the page controllers.
//!
//! Every component is an askama template with typed props; text coming from
//! users or upstream services is escaped on render.

use askama::Template;
use portal_auth::{Notification, NotificationKind};
use portal_services::{MockStatus, StandingRow};
use portal_weather::{format_temperature, title_case, DisplayState, WeatherSnapshot};

use crate::error_mapping::UiError;
use crate::ticker::TickerItem;

fn km_per_hour(speed: f64) -> String {
    format!("{} km/h", speed.round() as i64)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastCard {
    pub day: String,
    pub month_day: String,
    pub icon: String,
    pub description: String,
    pub temperature: String,
    pub humidity: u8,
    pub wind: String,
}

#[derive(Template, Debug, Clone)]
#[template(path = "components/weather_panel.html")]
pub struct WeatherPanel {
    pub location: String,
    pub temperature: String,
    pub feels_like: String,
    pub humidity: u8,
    pub wind: String,
    pub pressure: u32,
    pub visibility: String,
    pub sunrise: String,
    pub sunset: String,
    pub description: String,
    pub icon: String,
    pub cached: bool,
    pub forecast: Vec<ForecastCard>,
}

impl WeatherPanel {
    pub fn new(heading: &str, snapshot: &WeatherSnapshot) -> Self {
        let current = &snapshot.current;
        Self {
            location: heading.to_string(),
            temperature: format_temperature(current.temp),
            feels_like: format_temperature(current.feels_like),
            humidity: current.humidity,
            wind: km_per_hour(current.wind_speed),
            pressure: current.pressure,
            visibility: format!("{:.1} km", current.visibility),
            sunrise: current.sunrise.clone(),
            sunset: current.sunset.clone(),
            description: title_case(&current.description),
            icon: current.icon.clone(),
            cached: snapshot.cached,
            forecast: snapshot
                .forecast
                .iter()
                .map(|day| ForecastCard {
                    day: day.day.clone(),
                    month_day: day.month_day.clone(),
                    icon: day.icon.clone(),
                    description: day.description.clone(),
                    temperature: format_temperature(day.temp),
                    humidity: day.humidity,
                    wind: km_per_hour(day.wind_speed),
                })
                .collect(),
        }
    }
}

/// The whole weather area: loading overlay, manual-entry prompt, error panel
/// and report, each present only when the display state says so
#[derive(Template, Debug, Clone)]
#[template(path = "components/weather_view.html")]
pub struct WeatherView {
    pub overlay_visible: bool,
    pub prompt: Option<String>,
    pub error: Option<String>,
    pub panel: Option<WeatherPanel>,
}

impl WeatherView {
    pub fn from_state(state: &DisplayState) -> Self {
        let panel = if state.weather_visible {
            state.snapshot.as_ref().map(|snapshot| {
                let heading = state
                    .location
                    .as_ref()
                    .map(|l| l.heading().to_string())
                    .unwrap_or_else(|| snapshot.location.clone());
                WeatherPanel::new(&heading, snapshot)
            })
        } else {
            None
        };

        Self {
            overlay_visible: state.overlay_visible,
            prompt: state.manual_entry_prompt.clone(),
            error: state.error.clone(),
            panel,
        }
    }
}

pub fn render_weather(state: &DisplayState) -> askama::Result<String> {
    WeatherView::from_state(state).render()
}

#[derive(Template, Debug, Clone)]
#[template(path = "components/ticker.html")]
pub struct TickerView {
    pub items: Vec<TickerItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StandingsRowView {
    pub position: u32,
    /// Top three get highlighted
    pub podium: bool,
    pub team: String,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: String,
    /// `up`, `down` or `level`
    pub trend: &'static str,
    pub points: u32,
}

/// `+5`, `0`, `-3`
pub fn goal_difference_label(goal_difference: i32) -> String {
    if goal_difference > 0 {
        format!("+{}", goal_difference)
    } else {
        goal_difference.to_string()
    }
}

impl From<&StandingRow> for StandingsRowView {
    fn from(row: &StandingRow) -> Self {
        Self {
            position: row.position,
            podium: row.position <= 3,
            team: row.team.clone(),
            played: row.played,
            won: row.won,
            drawn: row.drawn,
            lost: row.lost,
            goals_for: row.goals_for,
            goals_against: row.goals_against,
            goal_difference: goal_difference_label(row.goal_difference),
            trend: match row.goal_difference {
                gd if gd > 0 => "up",
                gd if gd < 0 => "down",
                _ => "level",
            },
            points: row.points,
        }
    }
}

#[derive(Template, Debug, Clone)]
#[template(path = "components/standings_rows.html")]
pub struct StandingsRows {
    pub rows: Vec<StandingsRowView>,
}

impl StandingsRows {
    pub fn new(rows: &[StandingRow]) -> Self {
        Self {
            rows: rows.iter().map(StandingsRowView::from).collect(),
        }
    }
}

#[derive(Template, Debug, Clone)]
#[template(path = "components/sassa_result.html")]
pub struct SassaResultCard {
    pub status: String,
    pub next_payment: String,
    pub helpline: String,
    pub disclaimer: String,
}

impl From<&MockStatus> for SassaResultCard {
    fn from(status: &MockStatus) -> Self {
        Self {
            status: status.status.to_string(),
            next_payment: status.next_payment_label.clone(),
            helpline: status.helpline.to_string(),
            disclaimer: status.disclaimer.to_string(),
        }
    }
}

#[derive(Template, Debug, Clone)]
#[template(path = "components/sassa_error.html")]
pub struct SassaErrorCard {
    pub message: String,
}

impl SassaErrorCard {
    pub fn from_error(err: impl Into<UiError>) -> Self {
        Self {
            message: err.into().user_message(),
        }
    }
}

#[derive(Template, Debug, Clone)]
#[template(path = "components/auth_error.html")]
pub struct AuthErrorBanner {
    pub message: String,
}

impl AuthErrorBanner {
    pub fn from_error(err: impl Into<UiError>) -> Self {
        Self {
            message: err.into().user_message(),
        }
    }
}

#[derive(Template, Debug, Clone)]
#[template(path = "components/notification.html")]
pub struct NotificationToast {
    pub message: String,
    pub kind: &'static str,
    pub icon: &'static str,
}

impl From<&Notification> for NotificationToast {
    fn from(notification: &Notification) -> Self {
        let (kind, icon) = match notification.kind {
            NotificationKind::Success => ("success", "check-circle"),
            NotificationKind::Info => ("info", "info-circle"),
            NotificationKind::Warning => ("warning", "exclamation-triangle"),
            NotificationKind::Error => ("error", "exclamation-circle"),
        };
        Self {
            message: notification.message.clone(),
            kind,
            icon,
        }
    }
}

#[derive(Template, Debug, Clone, Default)]
#[template(path = "components/consent_banner.html")]
pub struct ConsentBanner {
    /// Showing the per-category checkboxes instead of the short notice
    pub customizing: bool,
    pub analytics: bool,
    pub ads: bool,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn test_goal_difference_label() {
        assert_eq!(goal_difference_label(39), "+39");
        assert_eq!(goal_difference_label(0), "0");
        assert_eq!(goal_difference_label(-4), "-4");
    }

    #[test]
    fn test_notification_is_escaped() {
        let html = NotificationToast::from(&Notification::new(
            "<b>Signed in</b>",
            NotificationKind::Success,
        ))
        .render()
        .unwrap();
        assert!(html.contains("notification-success"));
        assert!(html.contains("&lt;b&gt;Signed in"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_consent_banner_modes() {
        let notice = ConsentBanner::default().render().unwrap();
        assert!(notice.contains("We Use Cookies"));
        assert!(notice.contains("gdprAcceptAll"));

        let custom = ConsentBanner {
            customizing: true,
            analytics: true,
            ads: false,
        }
        .render()
        .unwrap();
        assert!(custom.contains("id=\"analyticsCookies\" checked"));
        assert!(!custom.contains("id=\"advertisingCookies\" checked"));
    }
}
