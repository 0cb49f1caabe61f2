use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{
    EnvEvent, Environment, FrameId, ListenerId, ListenerKind, LoadId, NavigationTarget, TimerId,
    ViewportSize,
};
use crate::{assets::ModelSource, page::Page};

const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;

/// A navigation recorded by [`SimulatedEnvironment`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Navigation {
    pub url: String,
    pub target: NavigationTarget,
    pub at_ms: u64,
}

#[derive(Debug, Clone, Copy)]
struct Interval {
    period_ms: u64,
    next_due_ms: u64,
}

/// Deterministic, single-threaded host with a virtual clock.
///
/// Time only moves when the driver asks it to (`run`, `run_frames`,
/// `poll_until`), so every callback ordering is reproducible.
#[derive(Debug)]
pub struct SimulatedEnvironment {
    clock_ms: u64,
    frame_interval_ms: u64,
    viewport: ViewportSize,
    scroll_y: f32,
    next_handle: u64,
    timers: BTreeMap<TimerId, Interval>,
    frames: BTreeMap<FrameId, u64>,
    listeners: Vec<(ListenerId, ListenerKind)>,
    pending_loads: Vec<(LoadId, String)>,
    location: String,
    navigations: Vec<Navigation>,
}

impl Default for SimulatedEnvironment {
    fn default() -> Self {
        Self::new(ViewportSize::default())
    }
}

impl SimulatedEnvironment {
    pub fn new(viewport: ViewportSize) -> Self {
        Self {
            clock_ms: 0,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            viewport,
            scroll_y: 0.0,
            next_handle: 1,
            timers: BTreeMap::new(),
            frames: BTreeMap::new(),
            listeners: Vec::new(),
            pending_loads: Vec::new(),
            location: "about:blank".to_string(),
            navigations: Vec::new(),
        }
    }

    pub fn with_frame_interval(mut self, frame_interval_ms: u64) -> Self {
        self.frame_interval_ms = frame_interval_ms.max(1);
        self
    }

    /// URL of the current document, updated by same-tab navigations.
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn navigations(&self) -> &[Navigation] {
        &self.navigations
    }

    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    pub fn active_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn listener_count(&self, kind: ListenerKind) -> usize {
        self.listeners.iter().filter(|(_, k)| *k == kind).count()
    }

    pub fn pending_loads(&self) -> usize {
        self.pending_loads.len()
    }

    /// Returns the next timer or frame event due at or before `deadline_ms`,
    /// moving the clock to its due time. When nothing is due the clock moves
    /// to the deadline and `None` is returned. Timers win ties with frames.
    pub fn poll_until(&mut self, deadline_ms: u64) -> Option<EnvEvent> {
        let timer = self
            .timers
            .iter()
            .map(|(id, interval)| (interval.next_due_ms, *id))
            .min();
        let frame = self.frames.iter().map(|(id, due)| (*due, *id)).min();

        match (timer, frame) {
            (Some((due, id)), frame)
                if due <= deadline_ms && frame.map_or(true, |(f_due, _)| due <= f_due) =>
            {
                self.clock_ms = self.clock_ms.max(due);
                if let Some(interval) = self.timers.get_mut(&id) {
                    interval.next_due_ms = due + interval.period_ms;
                }
                Some(EnvEvent::Timer(id))
            }
            (_, Some((due, id))) if due <= deadline_ms => {
                self.clock_ms = self.clock_ms.max(due);
                self.frames.remove(&id);
                Some(EnvEvent::Frame(id))
            }
            _ => {
                self.clock_ms = self.clock_ms.max(deadline_ms);
                None
            }
        }
    }

    /// Pumps timers and frames into `page` for `duration_ms` virtual ms.
    pub fn run<P: Page + ?Sized>(&mut self, page: &mut P, duration_ms: u64) {
        let deadline = self.clock_ms + duration_ms;
        while let Some(event) = self.poll_until(deadline) {
            page.handle(self, event);
        }
    }

    /// Pumps events until `count` frame callbacks have been delivered or no
    /// frame is pending any more. Returns the number of frames delivered.
    pub fn run_frames<P: Page + ?Sized>(&mut self, page: &mut P, count: usize) -> usize {
        let mut delivered = 0;
        while delivered < count {
            let Some(due) = self.frames.values().min().copied() else {
                break;
            };
            while let Some(event) = self.poll_until(due) {
                let is_frame = matches!(event, EnvEvent::Frame(_));
                page.handle(self, event);
                if is_frame {
                    delivered += 1;
                    break;
                }
            }
        }
        delivered
    }

    /// Moves the document scroll position and reports one event per scroll
    /// listener.
    pub fn scroll_to(&mut self, y: f32) -> Vec<EnvEvent> {
        self.scroll_y = y.max(0.0);
        self.events_for(ListenerKind::Scroll)
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Vec<EnvEvent> {
        self.viewport = ViewportSize::new(width, height);
        self.events_for(ListenerKind::Resize)
    }

    /// Completes every outstanding model request through `source`.
    pub fn resolve_loads(&mut self, source: &mut dyn ModelSource) -> Vec<EnvEvent> {
        let mut events = Vec::new();
        for (id, path) in std::mem::take(&mut self.pending_loads) {
            match source.fetch(&path) {
                Ok(fetched) => {
                    events.push(EnvEvent::ModelProgress {
                        id,
                        loaded: fetched.byte_len,
                        total: fetched.byte_len,
                    });
                    events.push(EnvEvent::ModelLoaded {
                        id,
                        result: Ok(fetched.root),
                    });
                }
                Err(err) => events.push(EnvEvent::ModelLoaded {
                    id,
                    result: Err(err),
                }),
            }
        }
        events
    }

    /// Hands a batch of events to `page` in order.
    pub fn deliver<P: Page + ?Sized>(&mut self, page: &mut P, events: Vec<EnvEvent>) {
        for event in events {
            page.handle(self, event);
        }
    }

    fn events_for(&self, kind: ListenerKind) -> Vec<EnvEvent> {
        self.listeners
            .iter()
            .filter(|(_, k)| *k == kind)
            .map(|(id, k)| match k {
                ListenerKind::Scroll => EnvEvent::Scroll(*id),
                ListenerKind::Resize => EnvEvent::Resize(*id),
            })
            .collect()
    }

    fn next_handle(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }
}

impl Environment for SimulatedEnvironment {
    fn viewport_size(&self) -> ViewportSize {
        self.viewport
    }

    fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    fn now(&self) -> f64 {
        self.clock_ms as f64
    }

    fn listen(&mut self, kind: ListenerKind) -> ListenerId {
        let id = ListenerId(self.next_handle());
        self.listeners.push((id, kind));
        id
    }

    fn unlisten(&mut self, id: ListenerId) {
        self.listeners.retain(|(existing, _)| *existing != id);
    }

    fn schedule_frame(&mut self) -> FrameId {
        let id = FrameId(self.next_handle());
        self.frames.insert(id, self.clock_ms + self.frame_interval_ms);
        id
    }

    fn schedule_interval(&mut self, period_ms: u64) -> TimerId {
        let id = TimerId(self.next_handle());
        let period_ms = period_ms.max(1);
        self.timers.insert(
            id,
            Interval {
                period_ms,
                next_due_ms: self.clock_ms + period_ms,
            },
        );
        id
    }

    fn cancel_timer(&mut self, id: TimerId) {
        self.timers.remove(&id);
    }

    fn navigate(&mut self, url: &str, target: NavigationTarget) {
        tracing::info!(url, ?target, "navigation");
        if target == NavigationTarget::SameTab {
            self.location = url.to_string();
        }
        self.navigations.push(Navigation {
            url: url.to_string(),
            target,
            at_ms: self.clock_ms,
        });
    }

    fn request_model(&mut self, path: &str) -> LoadId {
        let id = LoadId(self.next_handle());
        self.pending_loads.push((id, path.to_string()));
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_fires_every_period_until_cancelled() {
        let mut env = SimulatedEnvironment::default();
        let id = env.schedule_interval(1000);

        assert!(env.poll_until(999).is_none());
        assert!(matches!(env.poll_until(1000), Some(EnvEvent::Timer(t)) if t == id));
        assert!(matches!(env.poll_until(2500), Some(EnvEvent::Timer(_))));
        assert_eq!(env.clock_ms(), 2000);

        env.cancel_timer(id);
        assert!(env.poll_until(10_000).is_none());
        assert_eq!(env.clock_ms(), 10_000);
    }

    #[test]
    fn frames_are_one_shot() {
        let mut env = SimulatedEnvironment::default().with_frame_interval(10);
        let id = env.schedule_frame();

        assert!(matches!(env.poll_until(100), Some(EnvEvent::Frame(f)) if f == id));
        assert_eq!(env.clock_ms(), 10);
        assert!(env.poll_until(100).is_none());
    }

    #[test]
    fn timers_precede_frames_due_at_the_same_time() {
        let mut env = SimulatedEnvironment::default().with_frame_interval(20);
        env.schedule_frame();
        env.schedule_interval(20);

        assert!(matches!(env.poll_until(20), Some(EnvEvent::Timer(_))));
        assert!(matches!(env.poll_until(20), Some(EnvEvent::Frame(_))));
    }

    #[test]
    fn scroll_events_only_reach_registered_listeners() {
        let mut env = SimulatedEnvironment::default();
        assert!(env.scroll_to(10.0).is_empty());

        let id = env.listen(ListenerKind::Scroll);
        env.listen(ListenerKind::Resize);
        let events = env.scroll_to(20.0);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], EnvEvent::Scroll(l) if l == id));
        assert_eq!(env.scroll_y(), 20.0);

        env.unlisten(id);
        assert!(env.scroll_to(30.0).is_empty());
        assert_eq!(env.listener_count(ListenerKind::Resize), 1);
    }

    #[test]
    fn new_tab_navigation_keeps_location() {
        let mut env = SimulatedEnvironment::default();
        env.navigate("https://example.com/a", NavigationTarget::NewTab);
        assert_eq!(env.location(), "about:blank");

        env.navigate("https://example.com/b", NavigationTarget::SameTab);
        assert_eq!(env.location(), "https://example.com/b");
        assert_eq!(env.navigations().len(), 2);
    }
}
