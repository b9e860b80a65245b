use chrono::Datelike;
use iced::widget::{button, column, container, row, text, Space};
use iced::{Border, Color, Element, Length, Padding, Shadow};

use crate::components::{bold, icon, ICON_FILM, ICON_HEART, ICON_HEART_FILL, ICON_STAR_FILL};
use crate::media::{
    truncate_description, Message, MovieId, MovieSummary, ERROR_RED, STAR_YELLOW, SURFACE_DARK,
    TEXT_GRAY, TEXT_WHITE,
};
use crate::tmdb::{image_url, ImageSize};
use crate::MovieScout;

const GRID_POSTER_HEIGHT: f32 = 300.0;
const LIST_POSTER_WIDTH: f32 = 96.0;
const LIST_POSTER_HEIGHT: f32 = 144.0;
const CARD_OVERVIEW_CHARS: usize = 110;
const NEW_BADGE: Color = Color::from_rgb(0.576, 0.2, 0.918);

fn card_style(_theme: &iced::Theme) -> container::Style {
    container::Style {
        background: Some(iced::Background::Color(SURFACE_DARK)),
        border: Border {
            radius: 16.0.into(),
            ..Default::default()
        },
        shadow: Shadow {
            color: Color::from_rgba(0.0, 0.0, 0.0, 0.3),
            offset: iced::Vector::new(0.0, 4.0),
            blur_radius: 8.0,
        },
        ..Default::default()
    }
}

fn badge(label: &'static str, background: Color) -> Element<'static, Message> {
    container(text(label).size(11).color(TEXT_WHITE).font(bold()))
        .padding(Padding::new(3.0).left(8.0).right(8.0))
        .style(move |_theme| container::Style {
            background: Some(iced::Background::Color(background)),
            border: Border {
                radius: 6.0.into(),
                ..Default::default()
            },
            ..Default::default()
        })
        .into()
}

fn rating(movie: &MovieSummary) -> Element<'static, Message> {
    row![
        icon(ICON_STAR_FILL).size(13).color(STAR_YELLOW),
        text(movie.rating_label()).size(13).color(TEXT_WHITE).font(bold()),
    ]
    .spacing(4)
    .align_y(iced::Alignment::Center)
    .into()
}

fn meta_line(movie: &MovieSummary) -> Element<'static, Message> {
    let year = movie.release_year().unwrap_or("N/A").to_string();
    text(format!("{} • {}", movie.language_label(), year))
        .size(13)
        .color(TEXT_GRAY)
        .into()
}

fn details_button(id: MovieId) -> Element<'static, Message> {
    button(text("Details").size(13))
        .padding(Padding::new(4.0).left(8.0).right(8.0))
        .style(|_theme, status| button::Style {
            background: None,
            text_color: if matches!(status, button::Status::Hovered) {
                TEXT_WHITE
            } else {
                TEXT_GRAY
            },
            border: Border::default(),
            shadow: Shadow::default(),
            snap: false,
        })
        .on_press(Message::OpenDetail(id))
        .into()
}

impl MovieScout {
    /// A cached image for `url`, or a film-strip placeholder of the same size.
    pub fn view_poster(&self, url: Option<&str>, w: f32, h: f32) -> Element<'_, Message> {
        let handle = url.and_then(|url| self.image_cache.get(url).cloned());
        let width = if w > 0.0 {
            Length::Fixed(w)
        } else {
            Length::Fill
        };

        match handle {
            Some(handle) => iced::widget::image(handle)
                .width(width)
                .height(Length::Fixed(h))
                .content_fit(iced::ContentFit::Cover)
                .into(),
            None => container(icon(ICON_FILM).size(28).color(TEXT_GRAY))
                .width(width)
                .height(Length::Fixed(h))
                .center_x(width)
                .center_y(Length::Fixed(h))
                .style(|_theme| container::Style {
                    background: Some(iced::Background::Color(Color::from_rgba(
                        1.0, 1.0, 1.0, 0.05,
                    ))),
                    border: Border {
                        radius: 12.0.into(),
                        ..Default::default()
                    },
                    ..Default::default()
                })
                .into(),
        }
    }

    pub fn view_bookmark_button(&self, id: MovieId) -> Element<'_, Message> {
        let saved = self.browser.bookmarks().contains(id);
        let glyph = if saved { ICON_HEART_FILL } else { ICON_HEART };
        let color = if saved { ERROR_RED } else { TEXT_WHITE };

        button(icon(glyph).size(14).color(color))
            .padding(8)
            .style(|_theme, status| {
                let alpha = if matches!(status, button::Status::Hovered) {
                    0.9
                } else {
                    0.7
                };
                button::Style {
                    background: Some(iced::Background::Color(Color::from_rgba(
                        0.0, 0.0, 0.0, alpha,
                    ))),
                    text_color: TEXT_WHITE,
                    border: Border {
                        radius: 16.0.into(),
                        ..Default::default()
                    },
                    shadow: Shadow::default(),
                    snap: false,
                }
            })
            .on_press(Message::ToggleBookmark(id))
            .into()
    }

    pub fn view_movie_card(&self, movie: &MovieSummary) -> Element<'_, Message> {
        let poster_url = movie
            .poster_path
            .as_deref()
            .map(|path| image_url(path, ImageSize::Poster));
        let poster = self.view_poster(poster_url.as_deref(), 0.0, GRID_POSTER_HEIGHT);

        let mut bottom_badges = row![].spacing(6);
        if movie.is_released_in(chrono::Local::now().year()) {
            bottom_badges = bottom_badges.push(badge("NEW", NEW_BADGE));
        }
        bottom_badges = bottom_badges.push(Space::new().width(Length::Fill));
        if movie.adult {
            bottom_badges = bottom_badges.push(badge("18+", ERROR_RED));
        }

        let overlay = column![
            row![
                self.view_bookmark_button(movie.id),
                Space::new().width(Length::Fill),
                container(rating(movie))
                    .padding(Padding::new(4.0).left(8.0).right(8.0))
                    .style(|_theme| container::Style {
                        background: Some(iced::Background::Color(Color::from_rgba(
                            0.0, 0.0, 0.0, 0.7,
                        ))),
                        border: Border {
                            radius: 12.0.into(),
                            ..Default::default()
                        },
                        ..Default::default()
                    }),
            ]
            .align_y(iced::Alignment::Center),
            Space::new().height(Length::Fill),
            bottom_badges,
        ]
        .padding(12)
        .height(Length::Fixed(GRID_POSTER_HEIGHT));

        let mut info = column![
            text(movie.display_title().to_string())
                .size(16)
                .color(TEXT_WHITE)
                .font(bold())
                .wrapping(text::Wrapping::Word),
            meta_line(movie),
        ]
        .spacing(6);
        if !movie.overview.is_empty() {
            info = info.push(
                text(truncate_description(&movie.overview, CARD_OVERVIEW_CHARS))
                    .size(13)
                    .color(TEXT_GRAY),
            );
        }
        info = info.push(
            row![rating(movie), Space::new().width(Length::Fill), details_button(movie.id)]
                .align_y(iced::Alignment::Center),
        );

        let card = container(
            column![
                iced::widget::stack![poster, overlay],
                container(info).padding(14)
            ]
            .width(Length::Fill),
        )
        .width(Length::Fill)
        .style(card_style);

        iced::widget::mouse_area(card)
            .on_press(Message::OpenDetail(movie.id))
            .into()
    }

    pub fn view_movie_row(&self, movie: &MovieSummary) -> Element<'_, Message> {
        let poster_url = movie
            .poster_path
            .as_deref()
            .map(|path| image_url(path, ImageSize::Poster));
        let poster = self.view_poster(poster_url.as_deref(), LIST_POSTER_WIDTH, LIST_POSTER_HEIGHT);

        let saved = self.browser.bookmarks().contains(movie.id);
        let save_button = button(
            row![
                icon(if saved { ICON_HEART_FILL } else { ICON_HEART })
                    .size(13)
                    .color(if saved { ERROR_RED } else { TEXT_GRAY }),
                text(if saved { "Saved" } else { "Save" }).size(13),
            ]
            .spacing(4)
            .align_y(iced::Alignment::Center),
        )
        .padding(Padding::new(4.0).left(8.0).right(8.0))
        .style(|_theme, status| button::Style {
            background: None,
            text_color: if matches!(status, button::Status::Hovered) {
                TEXT_WHITE
            } else {
                TEXT_GRAY
            },
            border: Border::default(),
            shadow: Shadow::default(),
            snap: false,
        })
        .on_press(Message::ToggleBookmark(movie.id));

        let mut info = column![
            text(movie.display_title().to_string())
                .size(18)
                .color(TEXT_WHITE)
                .font(bold()),
            meta_line(movie),
        ]
        .spacing(4)
        .width(Length::Fill);
        if !movie.overview.is_empty() {
            info = info.push(
                text(truncate_description(&movie.overview, CARD_OVERVIEW_CHARS * 2))
                    .size(13)
                    .color(TEXT_GRAY)
                    .wrapping(text::Wrapping::Word),
            );
        }
        info = info.push(Space::new().height(Length::Fill));
        info = info.push(
            row![
                rating(movie),
                Space::new().width(Length::Fill),
                save_button,
                details_button(movie.id)
            ]
            .spacing(8)
            .align_y(iced::Alignment::Center),
        );

        let card = container(
            row![poster, container(info).padding(14).height(Length::Fixed(LIST_POSTER_HEIGHT))]
                .align_y(iced::Alignment::Start),
        )
        .width(Length::Fill)
        .style(|theme| container::Style {
            border: Border {
                color: Color::from_rgba(0.808, 0.808, 0.984, 0.08),
                width: 1.0,
                radius: 12.0.into(),
            },
            ..card_style(theme)
        });

        iced::widget::mouse_area(card)
            .on_press(Message::OpenDetail(movie.id))
            .into()
    }
}
