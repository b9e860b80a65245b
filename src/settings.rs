use std::path::{Path, PathBuf};

use iced::widget::{button, column, container, row, text, text_input, Space};
use iced::{Alignment, Element, Length};
use serde::{Deserialize, Serialize};

use crate::media::{ACCENT_LIGHT, BACKGROUND_DARK, ERROR_RED, TEXT_GRAY, TEXT_WHITE};

const DEFAULT_LANGUAGE: &str = "en-US";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

/// Connection details for the search-count collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AnalyticsSettings {
    pub endpoint: String,
    pub project_id: String,
    pub database_id: String,
    pub collection_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl AnalyticsSettings {
    fn is_complete(&self) -> bool {
        [
            &self.endpoint,
            &self.project_id,
            &self.database_id,
            &self.collection_id,
        ]
        .iter()
        .all(|v| !v.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub tmdb_token: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytics: Option<AnalyticsSettings>,
}

fn default_language() -> String {
    String::from(DEFAULT_LANGUAGE)
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            tmdb_token: String::new(),
            language: default_language(),
            analytics: None,
        }
    }
}

impl AppSettings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("moviescout").join("config.json"))
    }

    /// The config file alone, as it would be written back.
    pub fn load_file() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Overlays the `MOVIESCOUT_*` environment variables.
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn load_from(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %path.display(), "could not read config: {}", e);
                }
                return Self::default();
            }
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), "ignoring malformed config: {}", e);
            Self::default()
        })
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = var("MOVIESCOUT_TMDB_TOKEN") {
            self.tmdb_token = token;
        }
        if let Some(language) = var("MOVIESCOUT_LANGUAGE") {
            self.language = language;
        }

        let mut analytics = self.analytics.take().unwrap_or_default();
        let fields = [
            ("MOVIESCOUT_APPWRITE_ENDPOINT", &mut analytics.endpoint),
            ("MOVIESCOUT_APPWRITE_PROJECT_ID", &mut analytics.project_id),
            ("MOVIESCOUT_APPWRITE_DATABASE_ID", &mut analytics.database_id),
            ("MOVIESCOUT_APPWRITE_COLLECTION_ID", &mut analytics.collection_id),
        ];
        for (key, field) in fields {
            if let Some(value) = var(key) {
                *field = value;
            }
        }
        if let Some(key) = var("MOVIESCOUT_APPWRITE_API_KEY") {
            analytics.api_key = Some(key);
        }
        self.analytics = analytics.is_complete().then_some(analytics);
        self
    }

    pub fn save(&self) -> Result<(), SettingsError> {
        let path = Self::config_path().ok_or(SettingsError::NoConfigDir)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        !self.tmdb_token.trim().is_empty()
    }
}

#[derive(Debug, Clone)]
pub enum SetupMessage {
    TokenChanged(String),
    LanguageChanged(String),
    Submit,
}

/// First-run form asking for the provider access token.
pub struct SetupPage {
    pub token: String,
    pub language: String,
    pub error: Option<String>,
    stored_analytics: Option<AnalyticsSettings>,
    effective_analytics: Option<AnalyticsSettings>,
}

impl Default for SetupPage {
    fn default() -> Self {
        Self::new(&AppSettings::default(), &AppSettings::default())
    }
}

impl SetupPage {
    /// Prefills from `effective` (file plus environment). Only the
    /// analytics block found in `stored` is ever written back.
    pub fn new(stored: &AppSettings, effective: &AppSettings) -> Self {
        Self {
            token: effective.tmdb_token.clone(),
            language: effective.language.clone(),
            error: None,
            stored_analytics: stored.analytics.clone(),
            effective_analytics: effective.analytics.clone(),
        }
    }

    fn to_store(&self, settings: &AppSettings) -> AppSettings {
        AppSettings {
            analytics: self.stored_analytics.clone(),
            ..settings.clone()
        }
    }

    fn submitted(&self) -> Option<AppSettings> {
        let token = self.token.trim();
        if token.is_empty() {
            return None;
        }
        let language = match self.language.trim() {
            "" => default_language(),
            lang => lang.to_string(),
        };
        Some(AppSettings {
            tmdb_token: token.to_string(),
            language,
            analytics: self.effective_analytics.clone(),
        })
    }

    pub fn update(&mut self, message: SetupMessage) -> Option<AppSettings> {
        match message {
            SetupMessage::TokenChanged(token) => {
                self.token = token;
                self.error = None;
                None
            }
            SetupMessage::LanguageChanged(lang) => {
                self.language = lang;
                None
            }
            SetupMessage::Submit => {
                let Some(settings) = self.submitted() else {
                    self.error = Some(String::from("Access token is required"));
                    return None;
                };
                if let Err(e) = self.to_store(&settings).save() {
                    tracing::error!("failed to save settings: {}", e);
                    self.error = Some(format!("Failed to save: {}", e));
                    return None;
                }
                tracing::info!("settings saved");
                Some(settings)
            }
        }
    }

    pub fn view(&self) -> Element<'_, SetupMessage> {
        let logo = text("MovieScout").size(44).color(ACCENT_LIGHT).font(iced::Font {
            weight: iced::font::Weight::Bold,
            ..Default::default()
        });

        let title = text("Find Movies You'll Enjoy Without the Hassle")
            .size(24)
            .color(TEXT_WHITE);
        let subtitle = text("Connect to The Movie Database to get started")
            .size(14)
            .color(TEXT_GRAY);

        let token_label = text("TMDB API Read Access Token").size(14).color(TEXT_WHITE);
        let token_hint = text("Create one at themoviedb.org/settings/api")
            .size(12)
            .color(TEXT_GRAY);
        let token_input = text_input("Paste your access token...", &self.token)
            .on_input(SetupMessage::TokenChanged)
            .on_submit(SetupMessage::Submit)
            .secure(true)
            .padding(12)
            .size(14)
            .width(Length::Fill);

        let lang_label = text("Language").size(14).color(TEXT_WHITE);
        let lang_input = text_input(DEFAULT_LANGUAGE, &self.language)
            .on_input(SetupMessage::LanguageChanged)
            .on_submit(SetupMessage::Submit)
            .padding(12)
            .size(14)
            .width(Length::Fill);

        let submit_button = button(text("Start Browsing").size(16).color(BACKGROUND_DARK))
            .padding([12, 32])
            .style(|_theme, status| {
                let bg = match status {
                    button::Status::Hovered => TEXT_WHITE,
                    _ => ACCENT_LIGHT,
                };
                button::Style {
                    background: Some(iced::Background::Color(bg)),
                    text_color: BACKGROUND_DARK,
                    border: iced::Border::default().rounded(8),
                    ..Default::default()
                }
            })
            .on_press(SetupMessage::Submit);

        let error_text = match &self.error {
            Some(err) => text(err).size(14).color(ERROR_RED),
            None => text("").size(14),
        };

        let spacer = || Space::new().height(16);
        let small_spacer = || Space::new().height(4);

        let form = column![
            logo,
            spacer(),
            title,
            small_spacer(),
            subtitle,
            spacer(),
            token_label,
            small_spacer(),
            token_hint,
            small_spacer(),
            token_input,
            spacer(),
            lang_label,
            small_spacer(),
            lang_input,
            spacer(),
            error_text,
            small_spacer(),
            row![submit_button].width(Length::Fill),
        ]
        .width(Length::Fixed(440.0))
        .align_x(Alignment::Start);

        container(form)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(BACKGROUND_DARK)),
                ..Default::default()
            })
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = AppSettings::load_from(&dir.path().join("config.json"));
        assert_eq!(settings, AppSettings::default());
        assert_eq!(settings.language, "en-US");
        assert!(!settings.is_valid());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moviescout").join("config.json");
        let settings = AppSettings {
            tmdb_token: String::from("token"),
            language: String::from("de-DE"),
            analytics: Some(AnalyticsSettings {
                endpoint: String::from("https://cloud.appwrite.io/v1"),
                project_id: String::from("p"),
                database_id: String::from("d"),
                collection_id: String::from("c"),
                api_key: None,
            }),
        };
        settings.save_to(&path).unwrap();
        assert_eq!(AppSettings::load_from(&path), settings);
    }

    #[test]
    fn file_without_language_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"tmdb_token": "abc"}"#).unwrap();

        let settings = AppSettings::load_from(&path);
        assert!(settings.is_valid());
        assert_eq!(settings.language, "en-US");
        assert_eq!(settings.analytics, None);
    }

    #[test]
    fn environment_overrides_file() {
        let base = AppSettings {
            tmdb_token: String::from("from-file"),
            ..Default::default()
        };
        let settings = base.with_overrides(env(&[
            ("MOVIESCOUT_TMDB_TOKEN", "from-env"),
            ("MOVIESCOUT_LANGUAGE", ""),
        ]));
        assert_eq!(settings.tmdb_token, "from-env");
        assert_eq!(settings.language, "en-US");
    }

    #[test]
    fn partial_analytics_config_disables_tracker() {
        let settings = AppSettings::default().with_overrides(env(&[
            ("MOVIESCOUT_APPWRITE_ENDPOINT", "https://cloud.appwrite.io/v1"),
            ("MOVIESCOUT_APPWRITE_PROJECT_ID", "p"),
        ]));
        assert_eq!(settings.analytics, None);

        let settings = AppSettings::default().with_overrides(env(&[
            ("MOVIESCOUT_APPWRITE_ENDPOINT", "https://cloud.appwrite.io/v1"),
            ("MOVIESCOUT_APPWRITE_PROJECT_ID", "p"),
            ("MOVIESCOUT_APPWRITE_DATABASE_ID", "d"),
            ("MOVIESCOUT_APPWRITE_COLLECTION_ID", "c"),
            ("MOVIESCOUT_APPWRITE_API_KEY", "k"),
        ]));
        let analytics = settings.analytics.unwrap();
        assert_eq!(analytics.collection_id, "c");
        assert_eq!(analytics.api_key.as_deref(), Some("k"));
    }

    #[test]
    fn setup_requires_token() {
        let mut page = SetupPage::default();
        page.update(SetupMessage::TokenChanged(String::from("   ")));
        assert!(page.update(SetupMessage::Submit).is_none());
        assert!(page.error.is_some());

        page.update(SetupMessage::TokenChanged(String::from("abc")));
        assert!(page.error.is_none());
    }

    #[test]
    fn environment_analytics_is_not_written_back() {
        let stored = AppSettings::default();
        let effective = stored.clone().with_overrides(env(&[
            ("MOVIESCOUT_APPWRITE_ENDPOINT", "https://cloud.appwrite.io/v1"),
            ("MOVIESCOUT_APPWRITE_PROJECT_ID", "p"),
            ("MOVIESCOUT_APPWRITE_DATABASE_ID", "d"),
            ("MOVIESCOUT_APPWRITE_COLLECTION_ID", "c"),
            ("MOVIESCOUT_APPWRITE_API_KEY", "secret"),
        ]));
        let mut page = SetupPage::new(&stored, &effective);
        page.update(SetupMessage::TokenChanged(String::from("abc")));

        let settings = page.submitted().unwrap();
        assert!(settings.analytics.is_some());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        page.to_store(&settings).save_to(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains("secret"));
        let reloaded = AppSettings::load_from(&path);
        assert_eq!(reloaded.tmdb_token, "abc");
        assert_eq!(reloaded.analytics, None);
    }

    #[test]
    fn stored_analytics_survives_setup() {
        let stored = AppSettings {
            analytics: Some(AnalyticsSettings {
                endpoint: String::from("https://cloud.appwrite.io/v1"),
                project_id: String::from("p"),
                database_id: String::from("d"),
                collection_id: String::from("c"),
                api_key: None,
            }),
            ..Default::default()
        };
        let mut page = SetupPage::new(&stored, &stored);
        page.update(SetupMessage::TokenChanged(String::from("abc")));

        let settings = page.submitted().unwrap();
        assert_eq!(page.to_store(&settings).analytics, stored.analytics);
    }

    #[test]
    fn setup_fills_blank_language() {
        let mut page = SetupPage::default();
        page.update(SetupMessage::TokenChanged(String::from(" abc ")));
        page.update(SetupMessage::LanguageChanged(String::new()));
        let settings = page.submitted().unwrap();
        assert_eq!(settings.tmdb_token, "abc");
        assert_eq!(settings.language, "en-US");
    }
}
