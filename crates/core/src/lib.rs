//! Core library for the Moon Raccoon web pages.
//!
//! Two independent pages live here: a redirect splash page that counts down
//! before forwarding to the artist's streaming profile, and a landing page
//! that pairs an animated 3D scene with static content sections. Host
//! capabilities (time, timers, frames, scroll, resize, navigation, model
//! fetches) are injected through [`Environment`], so every behaviour can be
//! driven deterministically with [`SimulatedEnvironment`].

pub mod assets;
pub mod config;
pub mod content;
pub mod env;
pub mod error;
pub mod landing;
pub mod page;
pub mod redirect;
pub mod render;
pub mod scene;
pub mod view;

pub use assets::{FetchedModel, ModelSource, StaticModelSource, StlModelSource};
pub use config::{SceneConfig, SiteConfig, SPOTIFY_ARTIST_URL};
pub use env::{EnvEvent, Environment, NavigationTarget, SimulatedEnvironment, ViewportSize};
pub use error::{LoadError, Result, SiteError};
pub use landing::{AnimatedSceneController, ModelSlot, ScenePhase};
pub use page::{document, LandingPage, Page, RedirectPage};
pub use redirect::{CountdownState, CountdownTimer};
pub use render::{
    Camera, Composer, FrameRecord, LayerRecord, Pass, RecordingSurface, RenderSurface,
};
pub use scene::{Group, ModelContainer, Scene, StarLayer, Starfield};
pub use view::Element;
