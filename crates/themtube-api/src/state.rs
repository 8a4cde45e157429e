//! Shared application state handed to every handler as `State<Arc<AppState>>`.

use std::sync::Arc;
use themtube_core::Config;
use themtube_db::{UserStore, VideoCatalog};
use themtube_processing::VideoProbe;
use themtube_storage::Storage;

use crate::auth::JwtService;
use crate::job_queue::VideoJobQueue;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub users: Arc<dyn UserStore>,
    pub videos: Arc<dyn VideoCatalog>,
    pub storage: Arc<dyn Storage>,
    /// Used at upload time to read the duration before the job is queued
    pub probe: Arc<dyn VideoProbe>,
    pub jwt: JwtService,
    pub jobs: VideoJobQueue,
}
