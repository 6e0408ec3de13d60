use ratatui::style::Color;

#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display)]
pub enum ApiStatus {
    #[strum(serialize = "Checking API Connection...")]
    Checking,
    #[strum(serialize = "API Connected")]
    Connected,
    #[strum(serialize = "API Disconnected (Messages will not be sent)")]
    Disconnected,
}

impl ApiStatus {
    pub fn color(&self) -> Color {
        match self {
            ApiStatus::Checking => return Color::Yellow,
            ApiStatus::Connected => return Color::Green,
            ApiStatus::Disconnected => return Color::Red,
        }
    }
}
