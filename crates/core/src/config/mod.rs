use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Spotify artist profile both the automatic redirect and the manual link
/// point at.
pub const SPOTIFY_ARTIST_URL: &str =
    "https://open.spotify.com/artist/2Zkj0a4p1ENEdQEUXCs8Ib?si=7lTmHAEKRXyHV9mcnqK04w";

/// Top-level configuration structure for both pages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub redirect: RedirectConfig,
    pub scene: SceneConfig,
    pub content: ContentConfig,
}

impl SiteConfig {
    /// Reads a JSON configuration file. Missing fields fall back to defaults.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Configuration of the redirect splash page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedirectConfig {
    pub target_url: String,
    pub countdown_seconds: u32,
    pub tick_ms: u64,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            target_url: SPOTIFY_ARTIST_URL.to_string(),
            countdown_seconds: 5,
            tick_ms: 1000,
        }
    }
}

impl RedirectConfig {
    /// Interval between countdown ticks; never zero.
    pub fn tick_period_ms(&self) -> u64 {
        self.tick_ms.max(1)
    }
}

/// Tunables of the animated landing scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub camera: CameraConfig,
    pub bloom: BloomConfig,
    pub stars: StarfieldConfig,
    pub logo: ModelConfig,
    pub moon: ModelConfig,
    /// Scroll distance is multiplied by this before reaching the star layers.
    pub scroll_delta_factor: f32,
    /// Star layer offsets snap back to zero once their magnitude exceeds this.
    pub offset_wrap_limit: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            bloom: BloomConfig::default(),
            stars: StarfieldConfig::default(),
            logo: ModelConfig::logo(),
            moon: ModelConfig::moon(),
            scroll_delta_factor: 0.01,
            offset_wrap_limit: 50.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            position: Vec3::new(0.0, 0.0, 10.0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BloomConfig {
    pub strength: f32,
    pub radius: f32,
    pub threshold: f32,
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            strength: 1.5,
            radius: 0.4,
            threshold: 0.85,
        }
    }
}

/// Parameters of one parallax star layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarLayerConfig {
    pub count: usize,
    pub depth: f32,
    pub speed: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StarfieldConfig {
    /// Side length of the square the X and Y coordinates are drawn from,
    /// centred on the origin.
    pub spread: f32,
    /// Far, mid and near layers.
    pub layers: Vec<StarLayerConfig>,
    pub opacity_base: f32,
    pub opacity_amplitude: f32,
    /// Fixed RNG seed; `None` draws from the operating system.
    pub seed: Option<u64>,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            spread: 100.0,
            layers: vec![
                StarLayerConfig {
                    count: 100,
                    depth: 20.0,
                    speed: 0.002,
                },
                StarLayerConfig {
                    count: 50,
                    depth: 40.0,
                    speed: 0.004,
                },
                StarLayerConfig {
                    count: 25,
                    depth: 60.0,
                    speed: 0.006,
                },
            ],
            opacity_base: 0.6,
            opacity_amplitude: 0.2,
            seed: None,
        }
    }
}

/// How a loaded model is normalised before it joins the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ModelFit {
    /// Uniform literal scale, no recentering.
    Scale { factor: f32 },
    /// Scale so the longest bounding-box axis equals `size`, then recenter.
    AutoFit { size: f32 },
}

/// Placement and material of one model container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub path: String,
    pub fit: ModelFit,
    pub position: Vec3,
    pub rotation: Vec3,
    /// Per-frame Y rotation step in radians.
    pub spin: f32,
    /// Base Y coordinate the scroll parallax is applied around.
    pub parallax_base: f32,
    /// Signed factor applied to scroll position for the Y coordinate.
    pub parallax_factor: f32,
    pub material: MaterialConfig,
}

impl ModelConfig {
    pub fn logo() -> Self {
        Self {
            path: "models/logo.stl".to_string(),
            fit: ModelFit::Scale { factor: 16.0 },
            position: Vec3::new(0.0, 2.0, 0.0),
            rotation: Vec3::new(0.0, 0.0, 0.0),
            spin: 0.003,
            parallax_base: 2.0,
            parallax_factor: -0.002,
            material: MaterialConfig {
                color: 0xffffff,
                emissive: 0x9b5de5,
                emissive_intensity: 0.6,
                metalness: 0.8,
                roughness: 0.2,
            },
        }
    }

    pub fn moon() -> Self {
        Self {
            path: "models/moon.stl".to_string(),
            fit: ModelFit::AutoFit { size: 3.0 },
            position: Vec3::new(-4.0, 4.0, -5.0),
            rotation: Vec3::new(0.2, 0.0, 0.1),
            spin: 0.001,
            parallax_base: 4.0,
            parallax_factor: 0.001,
            material: MaterialConfig {
                color: 0xd8d8e0,
                emissive: 0x4a4a70,
                emissive_intensity: 0.3,
                metalness: 0.1,
                roughness: 0.9,
            },
        }
    }
}

/// Literal glow material parameters. Colours are `0xRRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialConfig {
    pub color: u32,
    pub emissive: u32,
    pub emissive_intensity: f32,
    pub metalness: f32,
    pub roughness: f32,
}

/// A labelled outbound link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub label: String,
    pub href: String,
}

impl Link {
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
        }
    }
}

/// Static marketing content of the landing page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    pub artist: String,
    pub tagline: String,
    pub video_embed_url: String,
    pub music_embed_url: String,
    pub music_links: Vec<Link>,
    pub visuals: Vec<Link>,
    pub socials: Vec<Link>,
    pub copyright_year: u16,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            artist: "MOON RACCOON".to_string(),
            tagline: "Music from the dark side".to_string(),
            video_embed_url: "https://www.youtube.com/embed/videoseries?list=moonraccoon"
                .to_string(),
            music_embed_url: "https://open.spotify.com/embed/artist/2Zkj0a4p1ENEdQEUXCs8Ib"
                .to_string(),
            music_links: vec![Link::new("Spotify", SPOTIFY_ARTIST_URL)],
            visuals: vec![Link::new(
                "Instagram",
                "https://www.instagram.com/moonraccoon",
            )],
            socials: vec![
                Link::new("Spotify", SPOTIFY_ARTIST_URL),
                Link::new("Instagram", "https://www.instagram.com/moonraccoon"),
            ],
            copyright_year: 2025,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_page_constants() {
        let config = SiteConfig::default();
        assert_eq!(config.redirect.countdown_seconds, 5);
        assert_eq!(config.redirect.target_url, SPOTIFY_ARTIST_URL);

        let counts: Vec<_> = config.scene.stars.layers.iter().map(|l| l.count).collect();
        assert_eq!(counts, vec![100, 50, 25]);
        assert_eq!(config.scene.logo.fit, ModelFit::Scale { factor: 16.0 });
        assert_eq!(config.scene.moon.fit, ModelFit::AutoFit { size: 3.0 });
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            SiteConfig::from_json(r#"{ "redirect": { "countdown_seconds": 3 } }"#).unwrap();
        assert_eq!(config.redirect.countdown_seconds, 3);
        assert_eq!(config.redirect.tick_ms, 1000);
        assert_eq!(config.scene.offset_wrap_limit, 50.0);
    }

    #[test]
    fn zero_tick_is_clamped_to_one_millisecond() {
        let config = SiteConfig::from_json(r#"{ "redirect": { "tick_ms": 0 } }"#).unwrap();
        assert_eq!(config.redirect.tick_ms, 0);
        assert_eq!(config.redirect.tick_period_ms(), 1);
        assert_eq!(RedirectConfig::default().tick_period_ms(), 1000);
    }

    #[test]
    fn reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.json");
        std::fs::write(&path, r#"{ "scene": { "stars": { "seed": 7 } } }"#).unwrap();

        let config = SiteConfig::from_path(&path).unwrap();
        assert_eq!(config.scene.stars.seed, Some(7));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = SiteConfig::from_json("{ not json").unwrap_err();
        assert!(format!("{err}").contains("invalid configuration"));
    }
}
