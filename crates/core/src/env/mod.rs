mod simulated;

use serde::{Deserialize, Serialize};

use crate::{error::LoadError, scene::Group};

pub use simulated::{Navigation, SimulatedEnvironment};

/// Viewport dimensions in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height. A zero height is treated as one pixel.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

macro_rules! handle_id {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
            pub struct $name(pub u64);
        )*
    };
}

handle_id!(
    /// Handle of a repeating timer.
    TimerId,
    /// Handle of a pending "next frame" request.
    FrameId,
    /// Handle of a registered scroll or resize listener.
    ListenerId,
    /// Handle of an outstanding model fetch.
    LoadId,
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    Scroll,
    Resize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigationTarget {
    /// Replace the current document.
    SameTab,
    /// Open a new browsing context; the current page keeps running.
    NewTab,
}

/// A callback delivery from the host to the mounted page.
#[derive(Debug, Clone)]
pub enum EnvEvent {
    Timer(TimerId),
    Frame(FrameId),
    Scroll(ListenerId),
    Resize(ListenerId),
    ModelProgress {
        id: LoadId,
        loaded: u64,
        total: u64,
    },
    ModelLoaded {
        id: LoadId,
        result: std::result::Result<Group, LoadError>,
    },
}

/// Host capability set consumed by the page controllers. Callbacks come
/// back as [`EnvEvent`] values the host hands to the mounted page.
pub trait Environment {
    fn viewport_size(&self) -> ViewportSize;
    fn scroll_y(&self) -> f32;
    /// Milliseconds since the host started.
    fn now(&self) -> f64;
    fn listen(&mut self, kind: ListenerKind) -> ListenerId;
    fn unlisten(&mut self, id: ListenerId);
    /// Requests a single [`EnvEvent::Frame`] at the next display refresh.
    fn schedule_frame(&mut self) -> FrameId;
    /// Starts a timer delivering [`EnvEvent::Timer`] every `period_ms` until
    /// cancelled.
    fn schedule_interval(&mut self, period_ms: u64) -> TimerId;
    fn cancel_timer(&mut self, id: TimerId);
    fn navigate(&mut self, url: &str, target: NavigationTarget);
    /// Starts fetching the model at the relative `path`; the outcome arrives
    /// as [`EnvEvent::ModelLoaded`].
    fn request_model(&mut self, path: &str) -> LoadId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_guards_zero_height() {
        assert_eq!(ViewportSize::new(800, 400).aspect(), 2.0);
        assert_eq!(ViewportSize::new(800, 0).aspect(), 800.0);
    }
}
