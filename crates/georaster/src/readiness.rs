//! Readiness gate joining the raster load and the georeference load.
//!
//! Each input moves once from `Pending` to `Ready` or `Failed`, in either
//! order. Whichever transition completes the pair derives the bounding box,
//! inside the same write lock, so readers see either no derived view or a
//! complete one.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use geo_common::{BoundingBox, Georeference, RasterDimensions};
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::error::{Input, LoadError, LoadFailure};
use crate::raster::PixelAccess;

/// Load state of one input.
#[derive(Debug, Clone)]
pub(crate) enum InputState<T> {
    Pending,
    Ready(T),
    Failed(LoadError),
}

impl<T> InputState<T> {
    fn status(&self) -> InputStatus {
        match self {
            InputState::Pending => InputStatus::Pending,
            InputState::Ready(_) => InputStatus::Ready,
            InputState::Failed(_) => InputStatus::Failed,
        }
    }

    fn error(&self) -> Option<&LoadError> {
        match self {
            InputState::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Load status of one input, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputStatus {
    Pending,
    Ready,
    Failed,
}

/// Snapshot of both inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct Readiness {
    pub georeference: InputStatus,
    pub raster: InputStatus,
    failure: Option<LoadFailure>,
}

impl Readiness {
    /// Both inputs are loaded; queries will be answered.
    pub fn is_ready(&self) -> bool {
        self.georeference == InputStatus::Ready && self.raster == InputStatus::Ready
    }

    /// An input failed; the raster will never become ready.
    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// The first input failure, if any.
    pub fn failure(&self) -> Option<&LoadFailure> {
        self.failure.as_ref()
    }
}

/// Everything a query needs, available once both inputs are ready.
#[derive(Clone)]
pub(crate) struct ReadyView {
    pub georef: Georeference,
    pub dims: RasterDimensions,
    pub bbox: BoundingBox,
    pub pixels: Arc<dyn PixelAccess>,
}

struct GateState {
    georef: InputState<Georeference>,
    raster: InputState<Arc<dyn PixelAccess>>,
    derived: Option<ReadyView>,
}

impl GateState {
    fn readiness(&self) -> Readiness {
        let failure = [
            (Input::Georeference, self.georef.error()),
            (Input::Raster, self.raster.error()),
        ]
        .into_iter()
        .find_map(|(input, error)| {
            error.map(|error| LoadFailure {
                input,
                error: error.clone(),
            })
        });

        Readiness {
            georeference: self.georef.status(),
            raster: self.raster.status(),
            failure,
        }
    }

    fn error_of(&self, input: Input) -> Option<&LoadError> {
        match input {
            Input::Georeference => self.georef.error(),
            Input::Raster => self.raster.error(),
        }
    }

    /// Derive the ready view if both inputs are in and it does not exist yet.
    fn derive(&mut self) -> Option<&ReadyView> {
        if self.derived.is_some() {
            return None;
        }

        let (InputState::Ready(georef), InputState::Ready(pixels)) = (&self.georef, &self.raster)
        else {
            return None;
        };

        let dims = pixels.dimensions();
        self.derived = Some(ReadyView {
            georef: *georef,
            dims,
            bbox: georef.bounding_box(dims),
            pixels: Arc::clone(pixels),
        });
        self.derived.as_ref()
    }
}

/// Owner of both input states, the derived view, and the readiness channel.
pub(crate) struct ReadinessGate {
    state: RwLock<GateState>,
    tx: watch::Sender<Readiness>,
}

impl ReadinessGate {
    pub fn new() -> Self {
        let state = GateState {
            georef: InputState::Pending,
            raster: InputState::Pending,
            derived: None,
        };
        let (tx, _rx) = watch::channel(state.readiness());

        Self {
            state: RwLock::new(state),
            tx,
        }
    }

    /// Record the outcome of the georeference load.
    pub fn resolve_georeference(&self, outcome: Result<Georeference, LoadError>) {
        self.transition(Input::Georeference, |state| match outcome {
            Ok(georef) => {
                let applied = set_once(&mut state.georef, InputState::Ready(georef));
                if applied {
                    info!(
                        origin_lng = georef.origin_lng(),
                        origin_lat = georef.origin_lat(),
                        pixel_size_deg = georef.pixel_size_deg(),
                        "Georeference resolved"
                    );
                }
                applied
            }
            Err(e) => set_once(&mut state.georef, InputState::Failed(e)),
        });
    }

    /// Record the outcome of the raster load.
    pub fn resolve_raster(&self, outcome: Result<Arc<dyn PixelAccess>, LoadError>) {
        self.transition(Input::Raster, |state| match outcome {
            Ok(pixels) => {
                let dims = pixels.dimensions();
                let channels = pixels.channel_count();
                let applied = set_once(&mut state.raster, InputState::Ready(pixels));
                if applied {
                    info!(
                        width = dims.width(),
                        height = dims.height(),
                        channels,
                        "Raster loaded"
                    );
                }
                applied
            }
            Err(e) => set_once(&mut state.raster, InputState::Failed(e)),
        });
    }

    /// Apply one input's outcome and publish the resulting readiness.
    ///
    /// Publishing happens under the write lock so subscribers see snapshots
    /// in transition order; the last value sent is always the current state.
    fn transition(&self, input: Input, apply: impl FnOnce(&mut GateState) -> bool) {
        let mut state = self.write();
        if !apply(&mut *state) {
            warn!(%input, "Input already settled, ignoring second outcome");
            return;
        }

        if let Some(e) = state.error_of(input) {
            error!(%input, error = %e, "Input failed to load");
        }

        if let Some(view) = state.derive() {
            info!(bbox = %view.bbox, "Raster ready for sampling");
        }

        self.tx.send_replace(state.readiness());
    }

    /// Current readiness snapshot.
    pub fn snapshot(&self) -> Readiness {
        self.read().readiness()
    }

    /// The derived view, once both inputs are ready.
    pub fn ready_view(&self) -> Option<ReadyView> {
        self.read().derived.clone()
    }

    /// Receiver notified on every input transition.
    pub fn subscribe(&self) -> watch::Receiver<Readiness> {
        self.tx.subscribe()
    }

    fn read(&self) -> RwLockReadGuard<'_, GateState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, GateState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Move `slot` out of `Pending`. Returns false if it had already settled.
fn set_once<T>(slot: &mut InputState<T>, next: InputState<T>) -> bool {
    if matches!(slot, InputState::Pending) {
        *slot = next;
        true
    } else {
        false
    }
}
