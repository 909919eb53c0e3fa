use iced::{
    mouse,
    widget::canvas::{self, Frame, Geometry, Path, Stroke},
    Color, Point, Rectangle, Renderer, Theme,
};
use iqcore::geotrack::Track;

const MARGIN: f32 = 12.0;

/// Lat/lon bounding box over every track position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

pub fn bounds_of(tracks: &[Track]) -> Option<Bounds> {
    let mut extent: Option<Bounds> = None;
    for (lat, lon) in tracks.iter().flat_map(|track| track.positions.iter()) {
        match extent.as_mut() {
            None => {
                extent = Some(Bounds {
                    min_lat: *lat,
                    max_lat: *lat,
                    min_lon: *lon,
                    max_lon: *lon,
                });
            }
            Some(bounds) => {
                bounds.min_lat = bounds.min_lat.min(*lat);
                bounds.max_lat = bounds.max_lat.max(*lat);
                bounds.min_lon = bounds.min_lon.min(*lon);
                bounds.max_lon = bounds.max_lon.max(*lon);
            }
        }
    }
    extent
}

/// Equirectangular projection of a `(lat, lon)` position into canvas pixels,
/// north up.
pub fn project(position: (f64, f64), bounds: &Bounds, width: f32, height: f32) -> Point {
    let lat_span = (bounds.max_lat - bounds.min_lat).max(1e-6);
    let lon_span = (bounds.max_lon - bounds.min_lon).max(1e-6);
    let x = ((position.1 - bounds.min_lon) / lon_span) as f32 * width;
    let y = height - ((position.0 - bounds.min_lat) / lat_span) as f32 * height;
    Point::new(x, y)
}

/// Canvas program drawing each track as a polyline with a start marker.
#[derive(Clone)]
pub struct TrackMap {
    tracks: Vec<Track>,
}

impl TrackMap {
    pub fn new(tracks: &[Track]) -> Self {
        Self {
            tracks: tracks.to_vec(),
        }
    }
}

impl<Message> canvas::Program<Message> for TrackMap {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.04, 0.05, 0.08),
        );

        if let Some(extent) = bounds_of(&self.tracks) {
            let width = (bounds.width - MARGIN * 2.0).max(1.0);
            let height = (bounds.height - MARGIN * 2.0).max(1.0);

            for track in &self.tracks {
                if track.positions.len() > 1 {
                    let path = Path::new(|builder| {
                        for (i, position) in track.positions.iter().enumerate() {
                            let point = project(*position, &extent, width, height);
                            let point = Point::new(point.x + MARGIN, point.y + MARGIN);
                            if i == 0 {
                                builder.move_to(point);
                            } else {
                                builder.line_to(point);
                            }
                        }
                    });
                    frame.stroke(
                        &path,
                        Stroke::default()
                            .with_width(2.0)
                            .with_color(Color::from_rgb(0.89, 0.24, 0.18)),
                    );
                }

                if let Some(first) = track.positions.first() {
                    let start = project(*first, &extent, width, height);
                    let marker = Path::new(|builder| {
                        builder.circle(Point::new(start.x + MARGIN, start.y + MARGIN), 3.0)
                    });
                    frame.fill(&marker, Color::from_rgb(0.95, 0.75, 0.2));
                }
            }
        }

        vec![frame.into_geometry()]
    }
}
