//! Looping animation shown while a submission is in flight.

use log::{debug, warn};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::error::AnimationError;

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

/// The subset of a Lottie document needed to drive playback.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnimationDefinition {
    #[serde(rename = "nm", default)]
    pub name: String,
    #[serde(rename = "fr")]
    pub frame_rate: f64,
    #[serde(rename = "ip")]
    pub in_point: f64,
    #[serde(rename = "op")]
    pub out_point: f64,
    #[serde(rename = "w")]
    pub width: u32,
    #[serde(rename = "h")]
    pub height: u32,
}

impl AnimationDefinition {
    pub fn load(path: &Path) -> Result<Self, AnimationError> {
        let content = fs::read_to_string(path).map_err(|source| AnimationError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let definition: Self =
            serde_json::from_str(&content).map_err(|source| AnimationError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        if definition.frame_count() <= 0.0 || definition.frame_rate <= 0.0 {
            return Err(AnimationError::Empty(path.to_path_buf()));
        }
        Ok(definition)
    }

    pub fn frame_count(&self) -> f64 {
        self.out_point - self.in_point
    }
}

/// A playing instance of an animation. Always looping and auto-playing.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationHandle {
    id: u64,
    definition: AnimationDefinition,
    frame: f64,
}

impl AnimationHandle {
    fn new(definition: AnimationDefinition) -> Self {
        Self {
            id: NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed),
            frame: definition.in_point,
            definition,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn definition(&self) -> &AnimationDefinition {
        &self.definition
    }

    pub fn frame(&self) -> f64 {
        self.frame
    }

    /// Move the playhead by `elapsed`, wrapping at the out point.
    pub fn advance(&mut self, elapsed: Duration) {
        let span = self.definition.frame_count();
        let offset = self.frame - self.definition.in_point + elapsed.as_secs_f64() * self.definition.frame_rate;
        self.frame = self.definition.in_point + offset.rem_euclid(span);
    }

    /// Playhead position in `0.0..1.0`.
    pub fn progress(&self) -> f64 {
        (self.frame - self.definition.in_point) / self.definition.frame_count()
    }
}

pub struct BusyIndicator {
    asset: PathBuf,
    handle: Option<AnimationHandle>,
}

impl BusyIndicator {
    pub fn new(asset: impl Into<PathBuf>) -> Self {
        Self {
            asset: asset.into(),
            handle: None,
        }
    }

    /// Start the animation, or return the one already running. A missing or
    /// broken asset leaves the indicator without animation.
    pub fn start(&mut self) -> Option<&AnimationHandle> {
        if self.handle.is_none() {
            match AnimationDefinition::load(&self.asset) {
                Ok(definition) => {
                    let handle = AnimationHandle::new(definition);
                    debug!("Started busy animation #{}", handle.id());
                    self.handle = Some(handle);
                }
                Err(e) => warn!("Busy animation unavailable: {}", e),
            }
        }
        self.handle.as_ref()
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!("Disposed busy animation #{}", handle.id());
        }
    }

    pub fn handle(&self) -> Option<&AnimationHandle> {
        self.handle.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}
