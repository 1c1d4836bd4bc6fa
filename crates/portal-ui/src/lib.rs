//! Page-side pieces of SA Daily Portal: HTML components, the sports ticker,
//! the mobile menu, cookie consent and theme settings, and the mapping of
//! errors to the messages users see.

pub mod components;
pub mod error_mapping;
pub mod menu;
pub mod settings;
pub mod ticker;

pub use components::{
    goal_difference_label, render_weather, AuthErrorBanner, ConsentBanner, ForecastCard,
    NotificationToast, SassaErrorCard, SassaResultCard, StandingsRowView, StandingsRows,
    TickerView, WeatherPanel, WeatherView,
};
pub use error_mapping::{user_message, UiError};
pub use menu::{ClickTarget, MenuState};
pub use settings::{ConsentDecision, PageSettings, SettingsFile, StoredSettings, Theme};
pub use ticker::{default_ticker, select_ticker, ticker_for, TickerItem, TICKER_LIMIT};

use portal_weather::{Geocoder, PositionSource, WeatherApi, WeatherController};

/// Renders the weather area for a controller's current state
pub trait WeatherControllerExt {
    fn render(&self) -> askama::Result<String>;
}

impl<G, P, W> WeatherControllerExt for WeatherController<G, P, W>
where
    G: Geocoder,
    P: PositionSource,
    W: WeatherApi,
{
    fn render(&self) -> askama::Result<String> {
        render_weather(self.state())
    }
}
