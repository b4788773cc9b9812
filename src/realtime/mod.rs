mod controller;
mod loop_worker;

pub use controller::RealtimeController;
pub use loop_worker::DETECTION_INTERVAL_MS;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::capture::CameraManager;
use crate::inference::Dispatcher;
use crate::models::SessionState;

/// Everything the polling loop needs, as cheap clonable handles.
#[derive(Clone)]
pub struct LoopContext {
    pub state: Arc<Mutex<SessionState>>,
    pub camera: CameraManager,
    pub dispatcher: Dispatcher,
}
