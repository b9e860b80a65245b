use iced::widget::{button, column, container, row, scrollable, text, Column, Row, Space};
use iced::{Border, Color, Element, Length, Padding, Shadow};

use crate::components::{
    bold, chip_style, hidden_vertical_scrollbar_style, icon, ICON_HEART, ICON_HEART_FILL,
    ICON_STAR_FILL, ICON_X_LG,
};
use crate::detail::{
    format_currency, format_release_date, format_runtime, youtube_thumbnail, youtube_url,
    DetailState, DetailTab, OVERVIEW_COLLAPSE_CHARS,
};
use crate::media::{
    truncate_description, Message, MovieDetail, BACKGROUND_DARK, ERROR_RED, STAR_YELLOW,
    SURFACE_DARK, TEXT_GRAY, TEXT_WHITE,
};
use crate::tmdb::{image_url, ImageSize};
use crate::MovieScout;

const POPUP_WIDTH: f32 = 920.0;
const BACKDROP_HEIGHT: f32 = 380.0;
const PROFILE_SIZE: f32 = 96.0;
const SUGGESTION_WIDTH: f32 = 130.0;
const SUGGESTION_HEIGHT: f32 = 195.0;

fn popup_container_style(_theme: &iced::Theme) -> container::Style {
    container::Style {
        background: Some(iced::Background::Color(BACKGROUND_DARK)),
        border: Border {
            color: Color::from_rgba(0.808, 0.808, 0.984, 0.1),
            width: 1.0,
            radius: 16.0.into(),
        },
        shadow: Shadow {
            color: Color::from_rgba(0.0, 0.0, 0.0, 0.5),
            offset: iced::Vector::new(0.0, 25.0),
            blur_radius: 50.0,
        },
        ..Default::default()
    }
}

fn section_title(label: &str) -> iced::widget::Text<'_> {
    text(label).size(18).color(TEXT_WHITE).font(bold())
}

fn info_item(label: &'static str, value: String) -> Element<'static, Message> {
    column![
        text(label).size(12).color(TEXT_GRAY),
        text(value).size(14).color(TEXT_WHITE).wrapping(text::Wrapping::Word)
    ]
    .spacing(4)
    .width(Length::FillPortion(1))
    .into()
}

fn link_button_style(_theme: &iced::Theme, status: button::Status) -> button::Style {
    button::Style {
        background: None,
        text_color: if matches!(status, button::Status::Hovered) {
            TEXT_WHITE
        } else {
            Color::from_rgb(0.808, 0.808, 0.984)
        },
        border: Border::default(),
        shadow: Shadow::default(),
        snap: false,
    }
}

impl MovieScout {
    pub fn view_detail_popup_overlay(&self) -> Element<'_, Message> {
        let body = match self.browser.detail() {
            DetailState::Closed => return Space::new().width(0).height(0).into(),
            DetailState::Loading(_) => self.view_detail_loading(),
            DetailState::Failed { message, .. } => self.view_detail_error(message),
            DetailState::Loaded(detail) => self.view_detail_loaded(detail),
        };

        let content = scrollable(body)
            .direction(scrollable::Direction::Vertical(
                scrollable::Scrollbar::new().width(0).scroller_width(0),
            ))
            .width(Length::Fill)
            .height(Length::Fill)
            .style(hidden_vertical_scrollbar_style);

        let popup_with_close = iced::widget::stack![content, self.view_detail_close_button()]
            .width(Length::Fixed(POPUP_WIDTH))
            .height(Length::Fill);

        let popup = container(popup_with_close)
            .max_width(POPUP_WIDTH)
            .clip(true)
            .style(popup_container_style);

        let overlay_bg = iced::widget::mouse_area(
            container(Space::new().width(Length::Fill).height(Length::Fill))
                .width(Length::Fill)
                .height(Length::Fill)
                .style(|_theme| container::Style {
                    background: Some(iced::Background::Color(Color::from_rgba(
                        0.0, 0.0, 0.0, 0.85,
                    ))),
                    ..Default::default()
                }),
        )
        .on_press(Message::CloseDetail);

        let centered_popup = container(iced::widget::mouse_area(popup))
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .padding(Padding::new(40.0));

        iced::widget::stack![overlay_bg, centered_popup]
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn view_detail_close_button(&self) -> Element<'_, Message> {
        let close = button(
            container(icon(ICON_X_LG).size(16).color(TEXT_WHITE))
                .width(Length::Fixed(36.0))
                .height(Length::Fixed(36.0))
                .center_x(Length::Fill)
                .center_y(Length::Fill),
        )
        .padding(0)
        .style(|_theme, status| {
            let alpha = if matches!(status, button::Status::Hovered) {
                0.9
            } else {
                0.6
            };
            button::Style {
                background: Some(iced::Background::Color(Color::from_rgba(
                    0.0, 0.0, 0.0, alpha,
                ))),
                text_color: TEXT_WHITE,
                border: Border {
                    radius: 18.0.into(),
                    ..Default::default()
                },
                shadow: Shadow::default(),
                snap: false,
            }
        })
        .on_press(Message::CloseDetail);

        container(close)
            .width(Length::Fill)
            .align_x(iced::alignment::Horizontal::Right)
            .padding(16)
            .into()
    }

    fn view_detail_loading(&self) -> Element<'_, Message> {
        let block = |w: Length, h: f32| {
            container(Space::new().width(w).height(h)).style(|_theme| container::Style {
                background: Some(iced::Background::Color(Color::from_rgba(
                    0.3, 0.3, 0.5, 0.25,
                ))),
                border: Border {
                    radius: 6.0.into(),
                    ..Default::default()
                },
                ..Default::default()
            })
        };

        column![
            block(Length::Fill, BACKDROP_HEIGHT),
            column![
                block(Length::Fixed(260.0), 32.0),
                block(Length::Fixed(180.0), 16.0),
                block(Length::Fill, 14.0),
                block(Length::Fixed(420.0), 14.0),
                text("Loading movie details...").size(14).color(TEXT_GRAY),
            ]
            .spacing(12)
            .padding(32)
        ]
        .width(Length::Fill)
        .into()
    }

    fn view_detail_error<'a>(&'a self, message: &'a str) -> Element<'a, Message> {
        let go_back = button(text("Go Back").size(15))
            .padding(Padding::new(10.0).left(24.0).right(24.0))
            .style(chip_style(true))
            .on_press(Message::CloseDetail);

        container(
            column![text(message).size(16).color(ERROR_RED), go_back]
                .spacing(20)
                .align_x(iced::Alignment::Center),
        )
        .width(Length::Fill)
        .height(Length::Fixed(400.0))
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
    }

    fn view_detail_loaded<'a>(&'a self, detail: &'a MovieDetail) -> Element<'a, Message> {
        let tabs: Vec<Element<Message>> = DetailTab::ALL
            .iter()
            .map(|tab| {
                button(text(tab.label()).size(14))
                    .padding(Padding::new(8.0).left(16.0).right(16.0))
                    .style(chip_style(self.detail_tab == *tab))
                    .on_press(Message::SelectDetailTab(*tab))
                    .into()
            })
            .collect();

        let tab_body = match self.detail_tab {
            DetailTab::Overview => self.view_detail_overview_tab(detail),
            DetailTab::CastAndCrew => self.view_detail_cast_tab(detail),
            DetailTab::Videos => self.view_detail_videos_tab(detail),
            DetailTab::Details => self.view_detail_info_tab(detail),
            DetailTab::Similar => self.view_detail_similar_tab(detail),
        };

        column![
            self.view_detail_hero(detail),
            column![Row::with_children(tabs).spacing(8).wrap(), tab_body]
                .spacing(24)
                .padding(Padding::new(24.0).left(32.0).right(32.0).bottom(32.0))
        ]
        .width(Length::Fill)
        .into()
    }

    fn view_detail_hero<'a>(&'a self, detail: &'a MovieDetail) -> Element<'a, Message> {
        let backdrop_url = detail
            .backdrop_path
            .as_deref()
            .map(|path| image_url(path, ImageSize::Backdrop));
        let backdrop = self.view_poster(backdrop_url.as_deref(), 0.0, BACKDROP_HEIGHT);

        let mut meta: Vec<String> = Vec::new();
        if let Some(year) = detail.release_date.as_deref().and_then(|d| d.get(..4)) {
            meta.push(year.to_string());
        }
        if detail.runtime.is_some() {
            meta.push(format_runtime(detail.runtime));
        }
        if let Some(lang) = &detail.original_language {
            meta.push(lang.to_uppercase());
        }

        let rating = row![
            icon(ICON_STAR_FILL).size(14).color(STAR_YELLOW),
            text(format!("{:.1}", detail.vote_average))
                .size(14)
                .color(TEXT_WHITE)
                .font(bold()),
            text(format!("({} votes)", detail.vote_count))
                .size(13)
                .color(TEXT_GRAY),
        ]
        .spacing(6)
        .align_y(iced::Alignment::Center);

        let genres: Vec<Element<Message>> = detail
            .genres
            .iter()
            .map(|genre| {
                container(text(genre.name.as_str()).size(12).color(TEXT_WHITE))
                    .padding(Padding::new(4.0).left(10.0).right(10.0))
                    .style(|_theme| container::Style {
                        background: Some(iced::Background::Color(Color::from_rgba(
                            1.0, 1.0, 1.0, 0.12,
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

        let saved = self.browser.bookmarks().contains(detail.id);
        let save_button = button(
            row![
                icon(if saved { ICON_HEART_FILL } else { ICON_HEART })
                    .size(14)
                    .color(if saved { ERROR_RED } else { SURFACE_DARK }),
                text(if saved { "Saved" } else { "Save to bookmarks" }).size(14),
            ]
            .spacing(8)
            .align_y(iced::Alignment::Center),
        )
        .padding(Padding::new(10.0).left(20.0).right(20.0))
        .style(chip_style(true))
        .on_press(Message::ToggleBookmark(detail.id));

        let mut info = column![text(detail.title.as_str())
            .size(34)
            .color(TEXT_WHITE)
            .font(bold())
            .wrapping(text::Wrapping::Word)]
        .spacing(10)
        .max_width(640.0);
        if let Some(tagline) = detail.tagline.as_deref().filter(|t| !t.is_empty()) {
            info = info.push(text(tagline).size(15).color(TEXT_GRAY));
        }
        info = info
            .push(
                row![text(meta.join(" • ")).size(14).color(TEXT_GRAY), rating]
                    .spacing(16)
                    .align_y(iced::Alignment::Center),
            )
            .push(Row::with_children(genres).spacing(6).wrap())
            .push(save_button);

        let overlay = container(info)
            .width(Length::Fill)
            .height(Length::Fixed(BACKDROP_HEIGHT))
            .align_y(iced::alignment::Vertical::Bottom)
            .padding(32)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Gradient(iced::Gradient::Linear(
                    iced::gradient::Linear::new(0.0)
                        .add_stop(0.0, Color::from_rgba(0.012, 0.0, 0.122, 1.0))
                        .add_stop(0.5, Color::from_rgba(0.012, 0.0, 0.122, 0.7))
                        .add_stop(1.0, Color::from_rgba(0.012, 0.0, 0.122, 0.0)),
                ))),
                ..Default::default()
            });

        iced::widget::stack![backdrop, overlay]
            .width(Length::Fill)
            .height(Length::Fixed(BACKDROP_HEIGHT))
            .into()
    }

    fn view_detail_overview_tab<'a>(&'a self, detail: &'a MovieDetail) -> Element<'a, Message> {
        let overview = if detail.overview.is_empty() {
            String::from("No overview available.")
        } else if detail.has_long_overview() && !self.overview_expanded {
            truncate_description(&detail.overview, OVERVIEW_COLLAPSE_CHARS)
        } else {
            detail.overview.clone()
        };

        let mut body = column![
            section_title("Overview"),
            text(overview)
                .size(15)
                .color(TEXT_WHITE)
                .wrapping(text::Wrapping::Word)
        ]
        .spacing(12);

        if detail.has_long_overview() {
            let label = if self.overview_expanded {
                "Show less"
            } else {
                "Read more"
            };
            body = body.push(
                button(text(label).size(14))
                    .padding(0)
                    .style(link_button_style)
                    .on_press(Message::ToggleFullOverview),
            );
        }

        let director = detail
            .director()
            .map(|d| d.name.clone())
            .unwrap_or_else(|| String::from("Unknown"));
        let writers = detail
            .writers()
            .iter()
            .map(|w| w.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let starring = detail
            .top_cast()
            .iter()
            .take(4)
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let mut credits = row![info_item("Director", director)].spacing(24);
        if !writers.is_empty() {
            credits = credits.push(info_item("Writers", writers));
        }
        if !starring.is_empty() {
            credits = credits.push(info_item("Starring", starring));
        }
        body = body.push(Space::new().height(8)).push(credits);

        if let Some(trailer) = detail.trailer() {
            body = body.push(
                row![
                    text("Trailer:").size(14).color(TEXT_GRAY),
                    text(youtube_url(&trailer.key)).size(14).color(TEXT_WHITE)
                ]
                .spacing(8),
            );
        }

        body.into()
    }

    fn view_detail_cast_tab<'a>(&'a self, detail: &'a MovieDetail) -> Element<'a, Message> {
        let cast: Vec<Element<Message>> = detail
            .top_cast()
            .iter()
            .map(|member| {
                let profile_url = member
                    .profile_path
                    .as_deref()
                    .map(|path| image_url(path, ImageSize::Profile));
                column![
                    self.view_poster(profile_url.as_deref(), PROFILE_SIZE, PROFILE_SIZE * 1.5),
                    text(member.name.as_str())
                        .size(13)
                        .color(TEXT_WHITE)
                        .font(bold())
                        .wrapping(text::Wrapping::Word),
                    text(member.character.as_str())
                        .size(12)
                        .color(TEXT_GRAY)
                        .wrapping(text::Wrapping::Word),
                ]
                .spacing(4)
                .width(Length::Fixed(PROFILE_SIZE))
                .into()
            })
            .collect();

        let crew: Vec<Element<Message>> = detail
            .unique_crew()
            .into_iter()
            .map(|member| {
                row![
                    text(member.name.as_str()).size(14).color(TEXT_WHITE),
                    Space::new().width(Length::Fill),
                    text(member.job.as_str()).size(13).color(TEXT_GRAY),
                ]
                .into()
            })
            .collect();

        let mut body = column![section_title("Cast")].spacing(12);
        body = if cast.is_empty() {
            body.push(text("No cast information available.").size(14).color(TEXT_GRAY))
        } else {
            body.push(Row::with_children(cast).spacing(16).wrap())
        };
        body = body.push(Space::new().height(8)).push(section_title("Crew"));
        body = if crew.is_empty() {
            body.push(text("No crew information available.").size(14).color(TEXT_GRAY))
        } else {
            body.push(Column::with_children(crew).spacing(8).max_width(480.0))
        };
        body.into()
    }

    fn view_detail_videos_tab<'a>(&'a self, detail: &'a MovieDetail) -> Element<'a, Message> {
        let videos = detail.youtube_videos();
        if videos.is_empty() {
            return text("No videos available.").size(14).color(TEXT_GRAY).into();
        }

        let items: Vec<Element<Message>> = videos
            .into_iter()
            .map(|video| {
                let thumbnail = youtube_thumbnail(&video.key);
                row![
                    self.view_poster(Some(thumbnail.as_str()), 192.0, 108.0),
                    column![
                        text(video.name.as_str())
                            .size(15)
                            .color(TEXT_WHITE)
                            .font(bold())
                            .wrapping(text::Wrapping::Word),
                        text(video.kind.as_str()).size(13).color(TEXT_GRAY),
                        text(youtube_url(&video.key)).size(13).color(TEXT_GRAY),
                    ]
                    .spacing(6)
                ]
                .spacing(16)
                .into()
            })
            .collect();

        column![section_title("Videos"), Column::with_children(items).spacing(16)]
            .spacing(12)
            .into()
    }

    fn view_detail_info_tab<'a>(&'a self, detail: &'a MovieDetail) -> Element<'a, Message> {
        let or_unknown = |value: Option<&str>| {
            value
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| String::from("Unknown"))
        };
        let companies = detail
            .production_companies
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let items = [
            ("Release Date", format_release_date(detail.release_date.as_deref())),
            ("Status", or_unknown(detail.status.as_deref())),
            ("Original Title", or_unknown(detail.original_title.as_deref())),
            (
                "Original Language",
                or_unknown(detail.original_language.as_deref()).to_uppercase(),
            ),
            ("Runtime", format_runtime(detail.runtime)),
            ("Budget", format_currency(detail.budget)),
            ("Revenue", format_currency(detail.revenue)),
            ("Production Companies", or_unknown(Some(companies.as_str()))),
        ];

        let mut rows: Vec<Element<Message>> = Vec::new();
        let mut items = items.into_iter().peekable();
        while items.peek().is_some() {
            let cells: Vec<Element<Message>> = items
                .by_ref()
                .take(2)
                .map(|(label, value)| info_item(label, value))
                .collect();
            rows.push(Row::with_children(cells).spacing(24).into());
        }

        let mut body = column![section_title("Details"), Column::with_children(rows).spacing(16)]
            .spacing(12);
        if let Some(collection) = &detail.belongs_to_collection {
            body = body.push(info_item("Collection", collection.name.clone()));
        }
        body.into()
    }

    fn view_detail_similar_tab<'a>(&'a self, detail: &'a MovieDetail) -> Element<'a, Message> {
        let (source, movies) = detail.suggestions();
        if movies.is_empty() {
            return text("No similar movies found.").size(14).color(TEXT_GRAY).into();
        }

        let cards: Vec<Element<Message>> = movies
            .iter()
            .map(|movie| {
                let poster_url = movie
                    .poster_path
                    .as_deref()
                    .map(|path| image_url(path, ImageSize::Poster));
                let card = column![
                    self.view_poster(poster_url.as_deref(), SUGGESTION_WIDTH, SUGGESTION_HEIGHT),
                    text(movie.display_title())
                        .size(13)
                        .color(TEXT_WHITE)
                        .wrapping(text::Wrapping::Word),
                    row![
                        icon(ICON_STAR_FILL).size(11).color(STAR_YELLOW),
                        text(movie.rating_label()).size(12).color(TEXT_GRAY),
                    ]
                    .spacing(4)
                    .align_y(iced::Alignment::Center),
                ]
                .spacing(6)
                .width(Length::Fixed(SUGGESTION_WIDTH));

                iced::widget::mouse_area(card)
                    .on_press(Message::OpenDetail(movie.id))
                    .into()
            })
            .collect();

        column![
            section_title(source.label()),
            Row::with_children(cards).spacing(16).wrap()
        ]
        .spacing(12)
        .into()
    }
}
