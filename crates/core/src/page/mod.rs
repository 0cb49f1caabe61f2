use crate::{
    config::SiteConfig,
    content,
    env::{EnvEvent, Environment},
    landing::AnimatedSceneController,
    redirect::CountdownTimer,
    render::RenderSurface,
    view::Element,
};

/// A page mounted into a host. The host delivers every [`EnvEvent`] it
/// produces to [`Page::handle`].
pub trait Page {
    fn mount(&mut self, env: &mut dyn Environment);
    fn handle(&mut self, env: &mut dyn Environment, event: EnvEvent);
    fn unmount(&mut self, env: &mut dyn Environment);
    /// Pure render of the current state.
    fn view(&self) -> Element;
}

/// Wraps a page body in a minimal HTML document.
pub fn document(title: &str, body: Element) -> String {
    let head = Element::new("head")
        .child(Element::new("meta").attr("charset", "utf-8"))
        .child(
            Element::new("meta")
                .attr("name", "viewport")
                .attr("content", "width=device-width, initial-scale=1"),
        )
        .child(Element::new("title").child(Element::text(title)));
    let html = Element::new("html")
        .attr("lang", "en")
        .child(head)
        .child(Element::new("body").child(body));
    format!("<!DOCTYPE html>{}", html.to_html())
}

/// Splash page that counts down and forwards to the streaming profile.
#[derive(Debug)]
pub struct RedirectPage {
    countdown: CountdownTimer,
}

impl RedirectPage {
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            countdown: CountdownTimer::new(config.redirect.clone()),
        }
    }

    pub fn countdown(&self) -> &CountdownTimer {
        &self.countdown
    }

    /// Click on the "Go to Spotify Now" link.
    pub fn click_link(&self, env: &mut dyn Environment) {
        self.countdown.follow_link(env);
    }
}

impl Page for RedirectPage {
    fn mount(&mut self, env: &mut dyn Environment) {
        self.countdown.mount(env);
    }

    fn handle(&mut self, env: &mut dyn Environment, event: EnvEvent) {
        if let EnvEvent::Timer(id) = event {
            self.countdown.on_timer(env, id);
        }
    }

    fn unmount(&mut self, env: &mut dyn Environment) {
        self.countdown.unmount(env);
    }

    fn view(&self) -> Element {
        Element::new("div")
            .attr("id", "root")
            .child(self.countdown.view())
    }
}

/// Promotional page: animated scene behind the static sections.
#[derive(Debug)]
pub struct LandingPage<S> {
    config: SiteConfig,
    scene: AnimatedSceneController<S>,
}

impl<S: RenderSurface> LandingPage<S> {
    pub fn new(config: SiteConfig, surface: S, env: &dyn Environment) -> Self {
        let scene = AnimatedSceneController::new(config.scene.clone(), surface, env.viewport_size());
        Self { config, scene }
    }

    pub fn scene(&self) -> &AnimatedSceneController<S> {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut AnimatedSceneController<S> {
        &mut self.scene
    }
}

impl<S: RenderSurface> Page for LandingPage<S> {
    fn mount(&mut self, env: &mut dyn Environment) {
        self.scene.mount(env);
    }

    fn handle(&mut self, env: &mut dyn Environment, event: EnvEvent) {
        if !self.scene.handle(env, event) {
            tracing::trace!("landing page ignored event");
        }
    }

    fn unmount(&mut self, env: &mut dyn Environment) {
        self.scene.unmount(env);
    }

    fn view(&self) -> Element {
        Element::new("div")
            .attr("id", "root")
            .children(content::sections(&self.config.content))
    }
}
