mod bookmarks;
mod browser;
mod cards;
mod components;
mod debounce;
mod detail;
mod detail_popup;
mod handlers;
mod listing;
mod media;
mod query;
mod settings;
mod tmdb;
mod trending;

use std::sync::Arc;

use iced::widget::container;
use iced::{Element, Font, Length, Size, Task, Theme};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookmarks::BookmarkStore;
use browser::Browser;
use detail::DetailTab;
use media::{ImageCache, Message, ViewMode, BACKGROUND_DARK};
use settings::{AppSettings, SetupPage};
use tmdb::{MetadataProvider, TmdbClient};
use trending::TrendingTracker;

pub struct MovieScout {
    pub setup_page: Option<SetupPage>,
    pub browser: Browser,
    pub provider: Option<Arc<dyn MetadataProvider>>,
    pub tracker: TrendingTracker,
    pub image_cache: ImageCache,
    pub view_mode: ViewMode,
    pub filter_panel_open: bool,
    pub detail_tab: DetailTab,
    pub overview_expanded: bool,
}

impl MovieScout {
    fn new() -> (Self, Task<Message>) {
        let stored = AppSettings::load_file();
        let settings = stored.clone().with_env();
        let bookmarks = BookmarkStore::load(BookmarkStore::default_path());
        tracing::debug!(count = bookmarks.len(), "bookmarks loaded");

        let mut app = Self {
            setup_page: None,
            browser: Browser::new(bookmarks),
            provider: None,
            tracker: TrendingTracker::disabled(),
            image_cache: ImageCache::new(),
            view_mode: ViewMode::default(),
            filter_panel_open: false,
            detail_tab: DetailTab::default(),
            overview_expanded: false,
        };

        if !settings.is_valid() {
            tracing::info!("no access token configured, showing setup");
            app.setup_page = Some(SetupPage::new(&stored, &settings));
            return (app, Task::none());
        }

        let task = app.initialize_with_settings(settings);
        (app, task)
    }

    fn initialize_with_settings(&mut self, settings: AppSettings) -> Task<Message> {
        let provider: Arc<dyn MetadataProvider> = Arc::new(TmdbClient::from_settings(&settings));
        self.provider = Some(provider.clone());
        self.tracker = TrendingTracker::from_settings(settings.analytics.as_ref());
        self.setup_page = None;
        tracing::info!(
            language = %settings.language,
            analytics = self.tracker.is_enabled(),
            "starting browser"
        );

        let start = self.browser.start();
        Task::batch([
            handlers::run_effect(self, start),
            Task::perform(self.tracker.clone().load(), Message::TrendingLoaded),
            Task::perform(
                async move { provider.fetch_popular().await },
                Message::PopularLoaded,
            ),
        ])
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        if let Message::Setup(setup_msg) = message {
            if let Some(setup) = &mut self.setup_page {
                if let Some(settings) = setup.update(setup_msg) {
                    return self.initialize_with_settings(settings);
                }
            }
            return Task::none();
        }
        handlers::handle_message(self, message)
    }

    fn view(&self) -> Element<'_, Message> {
        if let Some(setup) = &self.setup_page {
            return setup.view().map(Message::Setup);
        }

        let main_content = container(self.view_main_content())
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(BACKGROUND_DARK)),
                ..Default::default()
            });

        if self.browser.detail().is_open() {
            let popup_overlay = self.view_detail_popup_overlay();
            return iced::widget::stack![main_content, popup_overlay]
                .width(Length::Fill)
                .height(Length::Fill)
                .into();
        }

        main_content.into()
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moviescout=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    iced::application(MovieScout::new, MovieScout::update, MovieScout::view)
        .title("MovieScout")
        .theme(MovieScout::theme)
        .window_size(Size::new(1280.0, 800.0))
        .font(iced_fonts::BOOTSTRAP_FONT_BYTES)
        .default_font(Font::DEFAULT)
        .run()
}
