use dsclient::config::ClientConfig;
use iqcore::geotrack::{Track, TrackBuilder};
use iqcore::metadata::RecordingMetadata;
use iqcore::prelude::TrackConfig;
use serde::Serialize;

/// Capture window for the one-shot query issued at startup.
#[derive(Debug, Clone, Serialize)]
pub struct QueryParams {
    pub account: String,
    pub container: String,
    pub min_datetime: String,
    pub max_datetime: String,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            account: "rfdx4rp5".into(),
            container: "kleos-data".into(),
            min_datetime: "2023-04-11T02:20:00Z".into(),
            max_datetime: "2023-04-13T02:21:00Z".into(),
        }
    }
}

/// Fetches recordings for the capture window and folds them into tracks.
///
/// Talks to the query endpoint directly rather than going through the
/// capability-negotiated client in `dsclient`.
pub async fn fetch_tracks(params: QueryParams) -> Result<Vec<Track>, String> {
    let config = ClientConfig::from_env();
    let url = format!(
        "{}/api/datasources/query",
        config.base_url.trim_end_matches('/')
    );
    let response = reqwest::Client::new()
        .get(url)
        .query(&params)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    let recordings = response
        .json::<Vec<RecordingMetadata>>()
        .await
        .map_err(|e| e.to_string())?;

    TrackBuilder::new(TrackConfig::default())
        .build_all(&recordings)
        .map_err(|e| e.to_string())
}
