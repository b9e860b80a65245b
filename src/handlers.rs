use iced::Task;

use crate::browser::Effect;
use crate::debounce;
use crate::detail::{youtube_thumbnail, DetailState, DetailTab};
use crate::listing::{fetch_list, FetchTicket};
use crate::media::{ApiError, Message, MovieDetail, MoviePage, MovieSummary};
use crate::tmdb::{fetch_image_bytes, image_url, ImageSize};
use crate::MovieScout;

pub fn handle_message(app: &mut MovieScout, message: Message) -> Task<Message> {
    match message {
        Message::Setup(_) => Task::none(),
        Message::SearchInputChanged(input) => {
            let effect = app.browser.search_input_changed(input);
            run_effect(app, effect)
        }
        Message::ClearSearch => {
            let effect = app.browser.clear_search();
            run_effects(app, effect)
        }
        Message::DebounceElapsed(ticket) => {
            let effect = app.browser.debounce_elapsed(ticket);
            run_effects(app, effect)
        }
        Message::PopularChipPressed(title) => {
            let effect = app.browser.choose_popular(title);
            run_effect(app, effect)
        }
        Message::ToggleGenre(genre_id) => {
            let effect = app.browser.toggle_genre(genre_id);
            run_effect(app, effect)
        }
        Message::SetSort(sort) => {
            let effect = app.browser.set_sort(sort);
            run_effects(app, effect)
        }
        Message::YearInputChanged(input) => {
            let effect = app.browser.year_input_changed(input);
            run_effects(app, effect)
        }
        Message::ClearFilters => {
            let effect = app.browser.clear_filters();
            run_effects(app, effect)
        }
        Message::ToggleFilterPanel => {
            app.filter_panel_open = !app.filter_panel_open;
            Task::none()
        }
        Message::SetViewMode(mode) => {
            app.view_mode = mode;
            Task::none()
        }
        Message::ToggleBookmarkedOnly => {
            app.browser.toggle_bookmarked_only();
            Task::none()
        }
        Message::ToggleBookmark(id) => {
            let saved = app.browser.toggle_bookmark(id);
            tracing::debug!(id, saved, "bookmark toggled");
            Task::none()
        }
        Message::LoadMore => {
            let effect = app.browser.load_more();
            run_effects(app, effect)
        }
        Message::ListLoaded(ticket, result) => handle_list_loaded(app, ticket, result),
        Message::TrendingLoaded(result) => {
            app.browser.trending_loaded(result);
            let urls: Vec<String> = app
                .browser
                .trending()
                .iter()
                .filter_map(|entry| entry.poster_url.clone())
                .collect();
            request_images(app, urls)
        }
        Message::PopularLoaded(result) => {
            app.browser.popular_loaded(result);
            Task::none()
        }
        Message::OpenDetail(id) => {
            app.detail_tab = DetailTab::Overview;
            app.overview_expanded = false;
            let effect = app.browser.open_detail(id);
            run_effect(app, effect)
        }
        Message::CloseDetail => {
            app.browser.close_detail();
            Task::none()
        }
        Message::DetailLoaded(id, result) => {
            if !app.browser.detail_loaded(id, result) {
                tracing::debug!(
                    id,
                    open = ?app.browser.detail().open_id(),
                    "dropping detail response"
                );
                return Task::none();
            }
            match app.browser.detail() {
                DetailState::Loaded(detail) => request_images(app, detail_image_urls(detail)),
                _ => Task::none(),
            }
        }
        Message::SelectDetailTab(tab) => {
            app.detail_tab = tab;
            Task::none()
        }
        Message::ToggleFullOverview => {
            app.overview_expanded = !app.overview_expanded;
            Task::none()
        }
        Message::LoadImage(url) => handle_load_image(app, url),
        Message::ImageLoaded(url, result) => {
            match result {
                Ok(handle) => app.image_cache.insert(url, handle),
                Err(e) => {
                    tracing::debug!(url = %url, "image load failed: {}", e);
                    app.image_cache.forget_pending(&url);
                }
            }
            Task::none()
        }
    }
}

fn run_effects(app: &MovieScout, effects: impl IntoIterator<Item = Effect>) -> Task<Message> {
    Task::batch(effects.into_iter().map(|effect| run_effect(app, effect)))
}

/// Turns a controller effect into the async task that performs it.
pub fn run_effect(app: &MovieScout, effect: Effect) -> Task<Message> {
    match effect {
        Effect::ScheduleDebounce { ticket, after } => {
            Task::perform(debounce::wait(ticket, after), Message::DebounceElapsed)
        }
        Effect::FetchList(ticket) => {
            let Some(provider) = app.provider.clone() else {
                return Task::none();
            };
            Task::perform(fetch_list(provider, ticket), |(ticket, result)| {
                Message::ListLoaded(ticket, result)
            })
        }
        Effect::ReportSearch { term, movie } => {
            Task::future(app.tracker.clone().report(term, movie)).discard()
        }
        Effect::FetchDetail(id) => {
            let Some(provider) = app.provider.clone() else {
                return Task::none();
            };
            Task::perform(
                async move { provider.fetch_detail(id).await.map(Box::new) },
                move |result| Message::DetailLoaded(id, result),
            )
        }
    }
}

fn handle_list_loaded(
    app: &mut MovieScout,
    ticket: FetchTicket,
    result: Result<MoviePage, ApiError>,
) -> Task<Message> {
    let report = app.browser.list_loaded(ticket, result);
    let urls: Vec<String> = app
        .browser
        .list()
        .movies()
        .iter()
        .filter_map(poster_url)
        .collect();
    Task::batch([run_effects(app, report), request_images(app, urls)])
}

fn poster_url(movie: &MovieSummary) -> Option<String> {
    movie
        .poster_path
        .as_deref()
        .map(|path| image_url(path, ImageSize::Poster))
}

fn detail_image_urls(detail: &MovieDetail) -> Vec<String> {
    let mut urls = Vec::new();
    if let Some(path) = &detail.backdrop_path {
        urls.push(image_url(path, ImageSize::Backdrop));
    }
    if let Some(path) = &detail.poster_path {
        urls.push(image_url(path, ImageSize::Poster));
    }
    urls.extend(
        detail
            .top_cast()
            .iter()
            .filter_map(|c| c.profile_path.as_deref())
            .map(|path| image_url(path, ImageSize::Profile)),
    );
    urls.extend(
        detail
            .youtube_videos()
            .iter()
            .map(|v| youtube_thumbnail(&v.key)),
    );
    let (_, suggestions) = detail.suggestions();
    urls.extend(suggestions.iter().filter_map(poster_url));
    urls
}

fn request_images(app: &MovieScout, urls: Vec<String>) -> Task<Message> {
    Task::batch(
        urls.into_iter()
            .filter(|url| app.image_cache.get(url).is_none() && !app.image_cache.is_pending(url))
            .map(|url| Task::done(Message::LoadImage(url))),
    )
}

fn handle_load_image(app: &mut MovieScout, url: String) -> Task<Message> {
    if app.image_cache.get(&url).is_some() || app.image_cache.is_pending(&url) {
        return Task::none();
    }
    app.image_cache.mark_pending(url.clone());
    let image_url = url.clone();
    let cache_path = app.image_cache.get_cache_path(&url);

    Task::perform(
        async move {
            if let Some(path) = &cache_path {
                if let Ok(bytes) = tokio::fs::read(path).await {
                    return (image_url, Ok(bytes));
                }
            }
            let result = fetch_image_bytes(image_url.clone()).await;
            if let (Ok(bytes), Some(path)) = (&result, &cache_path) {
                if let Err(e) = tokio::fs::write(path, bytes).await {
                    tracing::debug!("could not cache image: {}", e);
                }
            }
            (image_url, result)
        },
        |(url, result)| {
            Message::ImageLoaded(url, result.map(iced::widget::image::Handle::from_bytes))
        },
    )
}
