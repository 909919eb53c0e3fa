use iced::{
    widget::{button, canvas::Canvas, column, scrollable, text, text_input, Column, Container},
    Element, Length, Task, Theme,
};
use iqcore::geotrack::Track;
use log::{error, info};

mod fetch;
mod map;

use fetch::{fetch_tracks, QueryParams};
use map::TrackMap;

fn main() -> iced::Result {
    env_logger::init();
    iced::application(TrackView::boot, TrackView::update, TrackView::view)
        .title(application_title)
        .theme(application_theme)
        .run()
}

fn application_title(_: &TrackView) -> String {
    "IQEngine Track View".into()
}

fn application_theme(_: &TrackView) -> Theme {
    Theme::Dark
}

#[derive(Debug)]
struct TrackView {
    tracks: Vec<Track>,
    status: String,
    history: Vec<String>,
    annotation: String,
}

#[derive(Debug, Clone)]
pub enum Message {
    TracksFetched(Result<Vec<Track>, String>),
    AnnotationChanged(String),
    SubmitAnnotation,
}

impl TrackView {
    fn boot() -> (Self, Task<Message>) {
        (
            TrackView {
                tracks: Vec::new(),
                status: "Fetching tracks...".into(),
                history: Vec::new(),
                annotation: String::new(),
            },
            // One query per mount; no polling and no retry.
            Task::perform(fetch_tracks(QueryParams::default()), Message::TracksFetched),
        )
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::TracksFetched(Ok(tracks)) => {
                state.status = format!("{} tracks loaded", tracks.len());
                state.push_history(format!("Loaded {} tracks", tracks.len()));
                state.tracks = tracks;
                Task::none()
            }
            Message::TracksFetched(Err(err)) => {
                // Single catch-and-log point; the view keeps whatever tracks
                // it already had.
                error!("error fetching track data: {err}");
                state.status = "Track fetch failed (see log)".into();
                Task::none()
            }
            Message::AnnotationChanged(value) => {
                state.annotation = value;
                Task::none()
            }
            Message::SubmitAnnotation => {
                match parse_annotation(&state.annotation) {
                    Ok(shape) => {
                        // Drawn regions are logged only, not persisted.
                        info!("annotation created: {:?}", shape);
                        state.push_history(format!("Annotation with {} vertices logged", shape.len()));
                        state.annotation.clear();
                        state.status = "Annotation logged".into();
                    }
                    Err(err) => {
                        state.status = format!("Annotation error: {err}");
                    }
                }
                Task::none()
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let map_canvas = Canvas::new(TrackMap::new(&state.tracks))
            .width(Length::Fill)
            .height(Length::Fixed(420.0));

        let track_entries = if state.tracks.is_empty() {
            Column::new().push(text("No tracks to render").size(12))
        } else {
            state
                .tracks
                .iter()
                .fold(Column::new().spacing(4), |col, track| {
                    col.push(
                        text(format!(
                            "{}: {} ({} points, mean coverage {:.0} km2)",
                            track.name,
                            track.description,
                            track.positions.len(),
                            track.mean_coverage_km2()
                        ))
                        .size(12),
                    )
                })
        };

        let history_list = if state.history.is_empty() {
            Column::new().push(text("No activity yet").size(12))
        } else {
            state
                .history
                .iter()
                .rev()
                .fold(Column::new().spacing(4), |col, entry| {
                    col.push(text(entry.clone()).size(12))
                })
        };

        let annotation_column = column![
            text("Annotate").size(16),
            text_input("lat,lon; lat,lon; ...", &state.annotation)
                .on_input(Message::AnnotationChanged)
                .padding(6),
            button("Log annotation")
                .on_press(Message::SubmitAnnotation)
                .padding(10),
        ]
        .spacing(10);

        let layout = column![
            text("IQEngine Track View").size(26),
            text(&state.status).size(14),
            map_canvas,
            text("Tracks").size(16),
            Container::new(scrollable(track_entries).height(Length::Fixed(120.0))).padding(6),
            annotation_column,
            text("Activity log").size(16),
            Container::new(scrollable(history_list).height(Length::Fixed(90.0))).padding(6),
        ]
        .spacing(10)
        .padding(16);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn push_history(&mut self, entry: String) {
        self.history.push(entry);
        if self.history.len() > 20 {
            self.history.remove(0);
        }
    }
}

/// Parses a free-form `lat,lon; lat,lon; ...` shape from the annotation box.
fn parse_annotation(input: &str) -> Result<Vec<(f64, f64)>, String> {
    let mut vertices = Vec::new();
    for pair in input.split(';') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let mut parts = pair.split(',');
        let lat = parts
            .next()
            .and_then(|value| value.trim().parse::<f64>().ok())
            .ok_or_else(|| format!("bad vertex '{pair}'"))?;
        let lon = parts
            .next()
            .and_then(|value| value.trim().parse::<f64>().ok())
            .ok_or_else(|| format!("bad vertex '{pair}'"))?;
        if parts.next().is_some() {
            return Err(format!("bad vertex '{pair}'"));
        }
        vertices.push((lat, lon));
    }
    if vertices.is_empty() {
        return Err("no vertices given".into());
    }
    Ok(vertices)
}
