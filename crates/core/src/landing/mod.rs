use crate::{
    config::SceneConfig,
    env::{EnvEvent, Environment, FrameId, ListenerId, ListenerKind, LoadId, ViewportSize},
    error::LoadError,
    render::{Camera, Composer, RenderSurface},
    scene::{Group, Scene},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenePhase {
    Initializing,
    Running,
    TornDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSlot {
    Logo,
    Moon,
}

#[derive(Debug, Default)]
struct Registrations {
    scroll: Option<ListenerId>,
    resize: Option<ListenerId>,
    frame: Option<FrameId>,
    loads: Vec<(LoadId, ModelSlot)>,
}

/// Lifecycle of the animated landing-page scene. Unmounting is final.
pub struct AnimatedSceneController<S> {
    config: SceneConfig,
    phase: ScenePhase,
    scene: Scene,
    camera: Camera,
    composer: Composer,
    surface: S,
    last_scroll_y: f32,
    frames_rendered: u64,
    registrations: Registrations,
}

impl<S: RenderSurface> AnimatedSceneController<S> {
    /// Builds camera, composer, lights and starfield for the current
    /// viewport. Nothing is scheduled until [`Self::mount`].
    pub fn new(config: SceneConfig, mut surface: S, viewport: ViewportSize) -> Self {
        surface.set_size(viewport);
        Self {
            phase: ScenePhase::Initializing,
            scene: Scene::build(&config),
            camera: Camera::new(&config.camera, viewport),
            composer: Composer::new(&config.bloom, viewport),
            surface,
            last_scroll_y: 0.0,
            frames_rendered: 0,
            registrations: Registrations::default(),
            config,
        }
    }

    pub fn phase(&self) -> ScenePhase {
        self.phase
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Starts both model fetches, registers listeners and requests the first
    /// frame.
    pub fn mount(&mut self, env: &mut dyn Environment) {
        if self.phase != ScenePhase::Initializing {
            return;
        }

        let viewport = env.viewport_size();
        if viewport != self.composer.size() {
            self.apply_viewport(viewport);
        }
        self.last_scroll_y = env.scroll_y();

        let logo = env.request_model(&self.config.logo.path);
        let moon = env.request_model(&self.config.moon.path);
        self.registrations.loads = vec![(logo, ModelSlot::Logo), (moon, ModelSlot::Moon)];
        self.registrations.scroll = Some(env.listen(ListenerKind::Scroll));
        self.registrations.resize = Some(env.listen(ListenerKind::Resize));
        self.registrations.frame = Some(env.schedule_frame());

        self.phase = ScenePhase::Running;
        tracing::info!(
            width = viewport.width,
            height = viewport.height,
            "landing scene running"
        );
    }

    /// Routes a host event. Returns `false` when the event was not meant for
    /// this controller.
    pub fn handle(&mut self, env: &mut dyn Environment, event: EnvEvent) -> bool {
        if self.phase != ScenePhase::Running {
            return false;
        }
        match event {
            EnvEvent::Frame(id) if self.registrations.frame == Some(id) => self.on_frame(env),
            EnvEvent::Scroll(id) if self.registrations.scroll == Some(id) => {
                self.on_scroll(env.scroll_y())
            }
            EnvEvent::Resize(id) if self.registrations.resize == Some(id) => {
                self.on_resize(env.viewport_size())
            }
            EnvEvent::ModelProgress { id, loaded, total } => match self.slot_for(id) {
                Some(slot) => {
                    let percent = if total == 0 {
                        100.0
                    } else {
                        loaded as f64 / total as f64 * 100.0
                    };
                    tracing::debug!(?slot, percent = percent.round(), "model loading");
                }
                None => return false,
            },
            EnvEvent::ModelLoaded { id, result } => match self.take_slot(id) {
                Some(slot) => self.on_model_loaded(slot, result),
                None => return false,
            },
            _ => return false,
        }
        true
    }

    /// Removes listeners, drops the pending frame and refuses further
    /// events. Outstanding model loads are discarded when they resolve.
    pub fn unmount(&mut self, env: &mut dyn Environment) {
        if self.phase == ScenePhase::TornDown {
            return;
        }
        if let Some(id) = self.registrations.scroll.take() {
            env.unlisten(id);
        }
        if let Some(id) = self.registrations.resize.take() {
            env.unlisten(id);
        }
        self.registrations.frame = None;
        self.registrations.loads.clear();
        self.phase = ScenePhase::TornDown;
        tracing::info!(frames = self.frames_rendered, "landing scene torn down");
    }

    /// One display refresh: twinkle, spin, composite, then request the next
    /// frame.
    fn on_frame(&mut self, env: &mut dyn Environment) {
        self.scene.starfield.twinkle(env.now());
        self.scene.logo.spin();
        self.scene.moon.spin();

        match self
            .composer
            .render(&mut self.surface, &self.scene, &self.camera)
        {
            Ok(()) => self.frames_rendered += 1,
            Err(err) => tracing::error!(error = %err, "frame render failed"),
        }

        self.registrations.frame = Some(env.schedule_frame());
    }

    pub fn on_scroll(&mut self, scroll_y: f32) {
        let delta = (scroll_y - self.last_scroll_y) * self.config.scroll_delta_factor;
        self.last_scroll_y = scroll_y;

        self.scene
            .starfield
            .apply_scroll(delta, self.config.offset_wrap_limit);
        self.scene.logo.follow_scroll(scroll_y);
        self.scene.moon.follow_scroll(scroll_y);
    }

    pub fn on_resize(&mut self, viewport: ViewportSize) {
        self.apply_viewport(viewport);
        tracing::debug!(
            width = viewport.width,
            height = viewport.height,
            "viewport resized"
        );
    }

    fn apply_viewport(&mut self, viewport: ViewportSize) {
        self.camera.aspect = viewport.aspect();
        self.camera.update_projection();
        self.surface.set_size(viewport);
        self.composer.set_size(viewport);
    }

    fn on_model_loaded(&mut self, slot: ModelSlot, result: Result<Group, LoadError>) {
        match result {
            Ok(model) => {
                let container = match slot {
                    ModelSlot::Logo => &mut self.scene.logo,
                    ModelSlot::Moon => &mut self.scene.moon,
                };
                container.install(model);
                tracing::info!(?slot, "model loaded");
            }
            Err(err) => {
                tracing::warn!(
                    ?slot,
                    path = err.path(),
                    error = %err,
                    "model failed to load, leaving container empty"
                );
            }
        }
    }

    fn slot_for(&self, id: LoadId) -> Option<ModelSlot> {
        self.registrations
            .loads
            .iter()
            .find(|(load, _)| *load == id)
            .map(|(_, slot)| *slot)
    }

    fn take_slot(&mut self, id: LoadId) -> Option<ModelSlot> {
        let index = self
            .registrations
            .loads
            .iter()
            .position(|(load, _)| *load == id)?;
        Some(self.registrations.loads.remove(index).1)
    }
}

impl<S> std::fmt::Debug for AnimatedSceneController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimatedSceneController")
            .field("phase", &self.phase)
            .field("frames_rendered", &self.frames_rendered)
            .field("last_scroll_y", &self.last_scroll_y)
            .finish()
    }
}
