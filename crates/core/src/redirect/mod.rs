use serde::{Deserialize, Serialize};

use crate::{
    config::RedirectConfig,
    env::{Environment, NavigationTarget, TimerId},
    view::Element,
};

/// Visible state of the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownState {
    pub remaining_seconds: u32,
    pub has_redirected: bool,
}

impl CountdownState {
    pub fn new(seconds: u32) -> Self {
        Self {
            remaining_seconds: seconds,
            has_redirected: false,
        }
    }

    /// Applies one tick. Returns `true` exactly when this tick triggers the
    /// redirect; a redirected state is frozen.
    pub fn tick(&mut self) -> bool {
        if self.has_redirected {
            return false;
        }
        if self.remaining_seconds > 1 {
            self.remaining_seconds -= 1;
            false
        } else {
            self.remaining_seconds = 0;
            self.has_redirected = true;
            true
        }
    }

    pub fn status_text(&self) -> String {
        if self.has_redirected {
            "Redirecting now...".to_string()
        } else {
            format!("Redirecting in {} seconds", self.remaining_seconds)
        }
    }
}

/// Drives [`CountdownState`] from a one-second interval and performs the
/// one-shot navigation when it runs out.
#[derive(Debug)]
pub struct CountdownTimer {
    config: RedirectConfig,
    state: CountdownState,
    timer: Option<TimerId>,
}

impl CountdownTimer {
    pub fn new(config: RedirectConfig) -> Self {
        let state = CountdownState::new(config.countdown_seconds);
        Self {
            config,
            state,
            timer: None,
        }
    }

    pub fn state(&self) -> CountdownState {
        self.state
    }

    pub fn target_url(&self) -> &str {
        &self.config.target_url
    }

    pub fn is_ticking(&self) -> bool {
        self.timer.is_some()
    }

    pub fn mount(&mut self, env: &mut dyn Environment) {
        if self.timer.is_some() || self.state.has_redirected {
            return;
        }
        let id = env.schedule_interval(self.config.tick_period_ms());
        tracing::debug!(timer = id.0, seconds = self.state.remaining_seconds, "countdown started");
        self.timer = Some(id);
    }

    /// Handles a timer delivery. Ticks for other timers are ignored.
    pub fn on_timer(&mut self, env: &mut dyn Environment, id: TimerId) {
        if self.timer != Some(id) {
            return;
        }
        if self.state.tick() {
            env.cancel_timer(id);
            self.timer = None;
            tracing::info!(url = %self.config.target_url, "countdown finished, redirecting");
            env.navigate(&self.config.target_url, NavigationTarget::SameTab);
        }
    }

    /// The always-available manual link; leaves the countdown untouched.
    pub fn follow_link(&self, env: &mut dyn Environment) {
        env.navigate(&self.config.target_url, NavigationTarget::NewTab);
    }

    pub fn unmount(&mut self, env: &mut dyn Environment) {
        if let Some(id) = self.timer.take() {
            env.cancel_timer(id);
            tracing::debug!(timer = id.0, "countdown cancelled");
        }
    }

    pub fn view(&self) -> Element {
        Element::new("div").class("redirect-container").child(
            Element::new("div")
                .class("spinner-container")
                .child(Element::new("div").class("spinner"))
                .child(
                    Element::new("h1")
                        .class("display-1 fade-in")
                        .child(Element::text("MOON RACCOON")),
                )
                .child(
                    Element::new("p")
                        .class("lead fade-in")
                        .child(Element::text("Redirecting to Spotify...")),
                )
                .child(
                    Element::new("div")
                        .class("countdown fade-in")
                        .child(Element::text(self.state.status_text())),
                )
                .child(
                    Element::new("div").class("mt-4 fade-in").child(
                        Element::new("a")
                            .attr("href", self.config.target_url.clone())
                            .class("btn btn-outline-light")
                            .attr("target", "_blank")
                            .attr("rel", "noopener noreferrer")
                            .child(Element::new("i").class("fab fa-spotify me-2"))
                            .child(Element::text("Go to Spotify Now")),
                    ),
                ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{EnvEvent, SimulatedEnvironment};

    fn tick(timer: &mut CountdownTimer, env: &mut SimulatedEnvironment) {
        let deadline = env.clock_ms() + 1000;
        while let Some(event) = env.poll_until(deadline) {
            if let EnvEvent::Timer(id) = event {
                timer.on_timer(env, id);
            }
        }
    }

    #[test]
    fn counts_down_one_per_tick() {
        let mut env = SimulatedEnvironment::default();
        let mut timer = CountdownTimer::new(RedirectConfig::default());
        timer.mount(&mut env);

        for n in 1..=4 {
            tick(&mut timer, &mut env);
            assert_eq!(timer.state(), CountdownState::new(5 - n));
        }
        assert!(env.navigations().is_empty());
    }

    #[test]
    fn fifth_tick_redirects_once() {
        let mut env = SimulatedEnvironment::default();
        let mut timer = CountdownTimer::new(RedirectConfig::default());
        timer.mount(&mut env);

        for _ in 0..5 {
            tick(&mut timer, &mut env);
        }
        assert_eq!(timer.state().remaining_seconds, 0);
        assert!(timer.state().has_redirected);
        assert!(!timer.is_ticking());
        assert_eq!(env.active_timers(), 0);
        assert_eq!(env.navigations().len(), 1);

        tick(&mut timer, &mut env);
        assert_eq!(env.navigations().len(), 1);
    }

    #[test]
    fn zero_tick_config_still_redirects() {
        let mut env = SimulatedEnvironment::default();
        let mut timer = CountdownTimer::new(RedirectConfig {
            tick_ms: 0,
            ..Default::default()
        });
        timer.mount(&mut env);

        while let Some(event) = env.poll_until(5) {
            if let EnvEvent::Timer(id) = event {
                timer.on_timer(&mut env, id);
            }
        }
        assert!(timer.state().has_redirected);
        assert_eq!(env.navigations()[0].at_ms, 5);
    }

    #[test]
    fn stale_tick_after_redirect_is_ignored() {
        let mut env = SimulatedEnvironment::default();
        let mut timer = CountdownTimer::new(RedirectConfig::default());
        timer.mount(&mut env);
        let id = TimerId(1);
        for _ in 0..5 {
            timer.on_timer(&mut env, id);
        }
        timer.on_timer(&mut env, id);
        assert_eq!(env.navigations().len(), 1);
    }

    #[test]
    fn frozen_state_does_not_tick() {
        let mut state = CountdownState::new(1);
        assert!(state.tick());
        assert!(!state.tick());
        assert_eq!(state.remaining_seconds, 0);
    }

    #[test]
    fn unmount_before_first_tick_cancels_everything() {
        let mut env = SimulatedEnvironment::default();
        let mut timer = CountdownTimer::new(RedirectConfig::default());
        timer.mount(&mut env);
        timer.unmount(&mut env);

        assert_eq!(env.active_timers(), 0);
        assert!(env.poll_until(60_000).is_none());
        assert!(env.navigations().is_empty());
        assert_eq!(timer.state(), CountdownState::new(5));
    }

    #[test]
    fn manual_link_does_not_touch_countdown() {
        let mut env = SimulatedEnvironment::default();
        let mut timer = CountdownTimer::new(RedirectConfig::default());
        timer.mount(&mut env);
        tick(&mut timer, &mut env);

        timer.follow_link(&mut env);
        assert_eq!(env.navigations()[0].target, NavigationTarget::NewTab);
        assert_eq!(env.location(), "about:blank");
        assert_eq!(timer.state().remaining_seconds, 4);
        assert!(timer.is_ticking());
    }

    #[test]
    fn view_reflects_state() {
        let mut env = SimulatedEnvironment::default();
        let mut timer = CountdownTimer::new(RedirectConfig::default());
        assert!(timer
            .view()
            .text_content()
            .contains("Redirecting in 5 seconds"));

        timer.mount(&mut env);
        for _ in 0..5 {
            tick(&mut timer, &mut env);
        }
        let view = timer.view();
        assert!(view.text_content().contains("Redirecting now..."));
        let links = view.find_all(&|e: &Element| e.tag() == Some("a"));
        assert_eq!(links[0].get_attr("href"), Some(timer.target_url()));
    }
}
