#[allow(async_fn_in_trait)]
pub trait SettingsService {
    async fn get_settings(&self) -> Result<Settings, String>;
    async fn set_settings(&self, settings: Settings) -> Result<(), String>;
}

#[allow(async_fn_in_trait)]
pub trait SettingsRepository {
    async fn read_settings(&self) -> Result<Settings, String>;
    async fn write_settings(&self, settings: Settings) -> Result<(), String>;
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub theme: Theme,
}

impl Settings {
    /// Effective theme, resolving `System` against the platform preference.
    #[must_use]
    pub fn current_theme(&self, system_prefers_dark: bool) -> Theme {
        match self.theme {
            Theme::System => {
                if system_prefers_dark {
                    Theme::Dark
                } else {
                    Theme::Light
                }
            }
            Theme::Light | Theme::Dark => self.theme,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::System,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    System,
    Light,
    Dark,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Theme::System, true, Theme::Dark)]
    #[case(Theme::System, false, Theme::Light)]
    #[case(Theme::Light, true, Theme::Light)]
    #[case(Theme::Dark, false, Theme::Dark)]
    fn test_current_theme(
        #[case] theme: Theme,
        #[case] system_prefers_dark: bool,
        #[case] expected: Theme,
    ) {
        assert_eq!(Settings { theme }.current_theme(system_prefers_dark), expected);
    }
}
