use iced::widget::{
    button, column, container, pick_list, row, scrollable, text, text_input, Column, Row, Space,
};
use iced::{Border, Color, Element, Length, Padding, Shadow};

use crate::media::{
    Message, MovieSummary, SortKey, ViewMode, ACCENT_LIGHT, ERROR_RED, GENRE_CATALOGUE,
    SURFACE_DARK, TEXT_GRAY, TEXT_WHITE,
};
use crate::MovieScout;

pub const ICON_SEARCH: char = '\u{F52A}';
pub const ICON_X_LG: char = '\u{F659}';
pub const ICON_HEART: char = '\u{F417}';
pub const ICON_HEART_FILL: char = '\u{F415}';
pub const ICON_STAR_FILL: char = '\u{F586}';
pub const ICON_FILM: char = '\u{F3A9}';
const ICON_GRID: char = '\u{F3FC}';
const ICON_LIST: char = '\u{F478}';
const ICON_FUNNEL: char = '\u{F3E1}';

const GRID_COLUMNS: usize = 5;
const SKELETON_CARDS: usize = 10;

pub fn icon(icon_char: char) -> iced::widget::Text<'static> {
    text(icon_char.to_string()).font(iced::Font {
        family: iced::font::Family::Name("bootstrap-icons"),
        ..Default::default()
    })
}

pub fn bold() -> iced::Font {
    iced::Font {
        weight: iced::font::Weight::Bold,
        ..Default::default()
    }
}

pub fn hidden_vertical_scrollbar_style(
    _theme: &iced::Theme,
    _status: scrollable::Status,
) -> scrollable::Style {
    let rail = || scrollable::Rail {
        background: None,
        border: Border::default(),
        scroller: scrollable::Scroller {
            background: iced::Background::Color(Color::TRANSPARENT),
            border: Border::default(),
        },
    };
    scrollable::Style {
        container: container::Style::default(),
        vertical_rail: rail(),
        horizontal_rail: rail(),
        gap: None,
        auto_scroll: scrollable::AutoScroll {
            background: iced::Background::Color(Color::TRANSPARENT),
            border: Border::default(),
            shadow: Shadow::default(),
            icon: Color::TRANSPARENT,
        },
    }
}

/// Rounded toggle style shared by chips, tabs and view-mode buttons.
pub fn chip_style(active: bool) -> impl Fn(&iced::Theme, button::Status) -> button::Style {
    move |_theme, status| {
        let bg_alpha = if active {
            1.0
        } else if matches!(status, button::Status::Hovered) {
            0.15
        } else {
            0.08
        };
        let background = if active {
            ACCENT_LIGHT
        } else {
            Color::from_rgba(1.0, 1.0, 1.0, bg_alpha)
        };
        button::Style {
            background: Some(iced::Background::Color(background)),
            text_color: if active { SURFACE_DARK } else { TEXT_WHITE },
            border: Border {
                color: Color::from_rgba(1.0, 1.0, 1.0, 0.1),
                width: 1.0,
                radius: 16.0.into(),
            },
            shadow: Shadow::default(),
            snap: false,
        }
    }
}

fn panel_style(_theme: &iced::Theme) -> container::Style {
    container::Style {
        background: Some(iced::Background::Color(SURFACE_DARK)),
        border: Border {
            color: Color::from_rgba(1.0, 1.0, 1.0, 0.08),
            width: 1.0,
            radius: 12.0.into(),
        },
        ..Default::default()
    }
}

impl MovieScout {
    pub fn view_main_content(&self) -> Element<'_, Message> {
        let mut sections: Vec<Element<Message>> = vec![self.view_header(), self.view_search_bar()];

        if !self.browser.query().is_searching() && !self.browser.popular().is_empty() {
            sections.push(self.view_popular_chips());
        }
        if self.browser.shows_trending() {
            sections.push(self.view_trending_row());
        }
        sections.push(self.view_section_header());
        if self.filter_panel_open {
            sections.push(self.view_filter_panel());
        }
        sections.push(self.view_movie_list());
        sections.push(self.view_load_more());

        scrollable(
            Column::with_children(sections)
                .spacing(24)
                .padding(Padding::new(32.0).left(48.0).right(48.0).bottom(48.0))
                .width(Length::Fill),
        )
        .direction(scrollable::Direction::Vertical(
            scrollable::Scrollbar::new().width(0).scroller_width(0),
        ))
        .width(Length::Fill)
        .height(Length::Fill)
        .style(hidden_vertical_scrollbar_style)
        .into()
    }

    fn view_header(&self) -> Element<'_, Message> {
        let logo = text("MovieScout").size(28).color(TEXT_WHITE).font(bold());
        let tagline = text("Find Movies You'll Enjoy Without the Hassle")
            .size(14)
            .color(TEXT_GRAY);

        let showing_saved = self.browser.show_bookmarked();
        let saved_label = format!("Bookmarks ({})", self.browser.bookmarks().len());
        let saved_toggle = button(
            row![
                icon(if showing_saved { ICON_HEART_FILL } else { ICON_HEART }).size(14),
                text(saved_label).size(14),
            ]
            .spacing(8)
            .align_y(iced::Alignment::Center),
        )
        .padding(Padding::new(8.0).left(16.0).right(16.0))
        .style(chip_style(showing_saved))
        .on_press(Message::ToggleBookmarkedOnly);

        row![
            column![logo, tagline].spacing(4),
            Space::new().width(Length::Fill),
            saved_toggle
        ]
        .align_y(iced::Alignment::Center)
        .into()
    }

    fn view_search_bar(&self) -> Element<'_, Message> {
        let search_icon = icon(ICON_SEARCH).size(16).color(TEXT_GRAY);

        let placeholder = "Search through thousands of movies";
        let search_input = text_input(placeholder, self.browser.search_input())
            .on_input(Message::SearchInputChanged)
            .padding(10)
            .size(16)
            .width(Length::Fill)
            .style(|_theme, _status| text_input::Style {
                background: iced::Background::Color(Color::TRANSPARENT),
                border: Border::default(),
                icon: TEXT_GRAY,
                placeholder: TEXT_GRAY,
                value: TEXT_WHITE,
                selection: ACCENT_LIGHT,
            });

        let mut content = row![search_icon, search_input]
            .spacing(8)
            .align_y(iced::Alignment::Center);

        if !self.browser.search_input().is_empty() {
            content = content.push(
                button(icon(ICON_X_LG).size(14).color(TEXT_GRAY))
                    .padding(6)
                    .style(|_theme, _status| button::Style {
                        background: None,
                        text_color: TEXT_GRAY,
                        border: Border::default(),
                        shadow: Shadow::default(),
                        snap: false,
                    })
                    .on_press(Message::ClearSearch),
            );
        }

        container(content)
            .padding(Padding::new(6.0).left(16.0).right(8.0))
            .width(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(SURFACE_DARK)),
                border: Border {
                    color: Color::from_rgba(1.0, 1.0, 1.0, 0.1),
                    width: 1.0,
                    radius: 12.0.into(),
                },
                ..Default::default()
            })
            .into()
    }

    fn view_popular_chips(&self) -> Element<'_, Message> {
        let chips: Vec<Element<Message>> = self
            .browser
            .popular()
            .iter()
            .map(|movie| {
                button(text(movie.display_title()).size(13))
                    .padding(Padding::new(6.0).left(14.0).right(14.0))
                    .style(chip_style(false))
                    .on_press(Message::PopularChipPressed(movie.title.clone()))
                    .into()
            })
            .collect();

        row![
            text("Popular right now:").size(13).color(TEXT_GRAY),
            Row::with_children(chips).spacing(8).wrap()
        ]
        .spacing(12)
        .align_y(iced::Alignment::Center)
        .into()
    }

    fn view_trending_row(&self) -> Element<'_, Message> {
        let title = text("Trending Movies").size(22).color(TEXT_WHITE).font(bold());

        let entries: Vec<Element<Message>> = self
            .browser
            .trending()
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let rank = text(format!("{}", index + 1))
                    .size(64)
                    .color(Color::from_rgba(0.808, 0.808, 0.984, 0.35))
                    .font(bold());
                let poster = self.view_poster(entry.poster_url.as_deref(), 120.0, 180.0);
                iced::widget::mouse_area(
                    row![rank, poster]
                        .spacing(4)
                        .align_y(iced::Alignment::Center),
                )
                .on_press(Message::OpenDetail(entry.movie_id))
                .into()
            })
            .collect();

        column![
            title,
            scrollable(Row::with_children(entries).spacing(24))
                .direction(scrollable::Direction::Horizontal(
                    scrollable::Scrollbar::new().width(0).scroller_width(0),
                ))
                .style(hidden_vertical_scrollbar_style)
        ]
        .spacing(16)
        .into()
    }

    fn view_section_header(&self) -> Element<'_, Message> {
        let query = self.browser.query();
        let heading = if self.browser.show_bookmarked() {
            String::from("Bookmarked Movies")
        } else if query.is_searching() {
            format!("Search results for \"{}\"", query.term())
        } else {
            String::from("All Movies")
        };

        let mode_button = |mode: ViewMode, glyph: char| {
            button(icon(glyph).size(14))
                .padding(8)
                .style(chip_style(self.view_mode == mode))
                .on_press(Message::SetViewMode(mode))
        };

        let filter_label = if query.has_active_filters() {
            format!("Filters ({})", query.genres().len() + usize::from(query.year().is_some()))
        } else {
            String::from("Filters")
        };
        let filters_button = button(
            row![icon(ICON_FUNNEL).size(13), text(filter_label).size(13)]
                .spacing(6)
                .align_y(iced::Alignment::Center),
        )
        .padding(Padding::new(8.0).left(14.0).right(14.0))
        .style(chip_style(self.filter_panel_open))
        .on_press(Message::ToggleFilterPanel);

        row![
            text(heading).size(22).color(TEXT_WHITE).font(bold()),
            Space::new().width(Length::Fill),
            mode_button(ViewMode::Grid, ICON_GRID),
            mode_button(ViewMode::List, ICON_LIST),
            filters_button
        ]
        .spacing(8)
        .align_y(iced::Alignment::Center)
        .into()
    }

    fn view_filter_panel(&self) -> Element<'_, Message> {
        let query = self.browser.query();

        let genre_chips: Vec<Element<Message>> = GENRE_CATALOGUE
            .iter()
            .map(|(id, name)| {
                let active = query.genres().contains(id);
                button(text(*name).size(13))
                    .padding(Padding::new(6.0).left(14.0).right(14.0))
                    .style(chip_style(active))
                    .on_press(Message::ToggleGenre(*id))
                    .into()
            })
            .collect();

        let sort_dropdown = pick_list(&SortKey::ALL[..], Some(query.sort()), Message::SetSort)
            .text_size(13)
            .padding(Padding::new(8.0).left(12.0).right(12.0))
            .style(|_, _| pick_list::Style {
                text_color: TEXT_WHITE,
                placeholder_color: TEXT_GRAY,
                handle_color: TEXT_WHITE,
                background: iced::Background::Color(Color::from_rgba(1.0, 1.0, 1.0, 0.08)),
                border: Border {
                    color: Color::from_rgba(1.0, 1.0, 1.0, 0.2),
                    width: 1.0,
                    radius: 8.0.into(),
                },
            });

        let year_input = text_input("e.g. 2023", self.browser.year_input())
            .on_input(Message::YearInputChanged)
            .padding(8)
            .size(13)
            .width(Length::Fixed(100.0))
            .style(|_theme, _status| text_input::Style {
                background: iced::Background::Color(Color::from_rgba(1.0, 1.0, 1.0, 0.08)),
                border: Border {
                    color: Color::from_rgba(1.0, 1.0, 1.0, 0.2),
                    width: 1.0,
                    radius: 8.0.into(),
                },
                icon: TEXT_GRAY,
                placeholder: TEXT_GRAY,
                value: TEXT_WHITE,
                selection: ACCENT_LIGHT,
            });

        let clear_button = button(text("Clear filters").size(13))
            .padding(Padding::new(8.0).left(16.0).right(16.0))
            .style(chip_style(false))
            .on_press_maybe(query.has_active_filters().then_some(Message::ClearFilters));

        let mut panel = column![
            text("Genres").size(14).color(TEXT_GRAY),
            Row::with_children(genre_chips).spacing(8).wrap(),
            row![
                text("Sort by").size(14).color(TEXT_GRAY),
                sort_dropdown,
                text("Release year").size(14).color(TEXT_GRAY),
                year_input,
                Space::new().width(Length::Fill),
                clear_button
            ]
            .spacing(12)
            .align_y(iced::Alignment::Center),
        ]
        .spacing(12);

        if query.is_searching() {
            panel = panel.push(
                text("Filters apply when browsing; clear the search to use them.")
                    .size(12)
                    .color(TEXT_GRAY),
            );
        }

        container(panel)
            .width(Length::Fill)
            .padding(16)
            .style(panel_style)
            .into()
    }

    fn view_movie_list(&self) -> Element<'_, Message> {
        let list = self.browser.list();
        if list.is_loading() && self.browser.is_first_page() {
            return self.view_skeleton_grid();
        }
        if let Some(error) = list.error() {
            return self.view_error_state(error);
        }

        let movies = self.browser.visible_movies();
        if movies.is_empty() {
            return self.view_empty_state();
        }

        match self.view_mode {
            ViewMode::Grid => self.view_movie_grid(&movies),
            ViewMode::List => Column::with_children(
                movies.iter().map(|movie| self.view_movie_row(movie)),
            )
            .spacing(12)
            .width(Length::Fill)
            .into(),
        }
    }

    fn view_movie_grid(&self, movies: &[&MovieSummary]) -> Element<'_, Message> {
        let rows: Vec<Element<Message>> = movies
            .chunks(GRID_COLUMNS)
            .map(|chunk| {
                let mut cards: Vec<Element<Message>> =
                    chunk.iter().map(|movie| self.view_movie_card(movie)).collect();
                while cards.len() < GRID_COLUMNS {
                    cards.push(Space::new().width(Length::Fill).into());
                }
                Row::with_children(cards)
                    .spacing(16)
                    .align_y(iced::Alignment::Start)
                    .into()
            })
            .collect();

        Column::with_children(rows)
            .spacing(16)
            .width(Length::Fill)
            .into()
    }

    fn view_error_state<'a>(&'a self, error_message: &'a str) -> Element<'a, Message> {
        container(text(error_message).size(16).color(ERROR_RED))
            .width(Length::Fill)
            .height(Length::Fixed(200.0))
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }

    fn view_empty_state(&self) -> Element<'_, Message> {
        let mut content = column![
            icon(ICON_FILM).size(40).color(TEXT_GRAY),
            text("No movies found").size(22).color(TEXT_WHITE).font(bold()),
        ]
        .spacing(12)
        .align_x(iced::Alignment::Center);

        if self.browser.show_bookmarked() {
            content = content
                .push(
                    text("You haven't bookmarked anything in this list yet.")
                        .size(14)
                        .color(TEXT_GRAY),
                )
                .push(
                    button(text("Browse all movies").size(14))
                        .padding(Padding::new(8.0).left(16.0).right(16.0))
                        .style(chip_style(true))
                        .on_press(Message::ToggleBookmarkedOnly),
                );
        } else {
            content = content.push(
                text("Try adjusting your search or filters")
                    .size(14)
                    .color(TEXT_GRAY),
            );
        }

        container(content)
            .width(Length::Fill)
            .height(Length::Fixed(300.0))
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }

    fn view_load_more(&self) -> Element<'_, Message> {
        if self.browser.is_loading_more() {
            return container(text("Loading more...").size(14).color(TEXT_GRAY))
                .width(Length::Fill)
                .center_x(Length::Fill)
                .into();
        }
        if !self.browser.can_load_more() {
            return Space::new().height(0).into();
        }

        let label = if self.browser.list().error().is_some() {
            "Try Again"
        } else {
            "Load More"
        };
        container(
            button(text(label).size(15).font(bold()))
                .padding(Padding::new(12.0).left(32.0).right(32.0))
                .style(chip_style(true))
                .on_press(Message::LoadMore),
        )
        .width(Length::Fill)
        .center_x(Length::Fill)
        .into()
    }

    fn view_skeleton_grid(&self) -> Element<'_, Message> {
        let cards: Vec<Element<Message>> = (0..SKELETON_CARDS)
            .map(|_| {
                container(Space::new().width(Length::Fill).height(300.0))
                    .width(Length::Fill)
                    .style(|_theme| container::Style {
                        background: Some(iced::Background::Color(Color::from_rgba(
                            0.3, 0.3, 0.5, 0.25,
                        ))),
                        border: Border {
                            radius: 12.0.into(),
                            ..Default::default()
                        },
                        ..Default::default()
                    })
                    .into()
            })
            .collect();

        let mut rows: Vec<Element<Message>> = Vec::new();
        let mut cards = cards.into_iter().peekable();
        while cards.peek().is_some() {
            let chunk: Vec<Element<Message>> = cards.by_ref().take(GRID_COLUMNS).collect();
            rows.push(Row::with_children(chunk).spacing(16).into());
        }
        Column::with_children(rows).spacing(16).into()
    }
}
