use glam::{Mat4, Vec3};

use crate::{
    config::{BloomConfig, CameraConfig},
    env::ViewportSize,
    scene::{Scene, StarLayer},
    Result, SiteError,
};

/// Perspective camera looking down -Z.
#[derive(Debug, Clone)]
pub struct Camera {
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    projection: Mat4,
}

impl Camera {
    pub fn new(config: &CameraConfig, viewport: ViewportSize) -> Self {
        let mut camera = Self {
            fov_degrees: config.fov_degrees,
            aspect: viewport.aspect(),
            near: config.near,
            far: config.far,
            position: config.position,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection();
        camera
    }

    pub fn update_projection(&mut self) {
        self.projection =
            Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far);
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }
}

/// One stage of the post-processing chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pass {
    /// Plain scene render into the first buffer.
    Render,
    /// Bright-pass extraction and blur blended back over the frame.
    Bloom {
        strength: f32,
        radius: f32,
        threshold: f32,
        resolution: ViewportSize,
    },
    /// Screen-space anti-aliasing; needs the reciprocal resolution.
    AntiAlias { texel: (f32, f32) },
}

/// Rendering backend capability: a drawable context sized to the viewport.
pub trait RenderSurface {
    fn set_size(&mut self, size: ViewportSize);
    fn size(&self) -> ViewportSize;
    /// Runs `passes` in order and presents the result.
    fn draw(&mut self, scene: &Scene, camera: &Camera, passes: &[Pass]) -> Result<()>;
}

/// Ordered post-processing pipeline: render, bloom, anti-aliasing.
#[derive(Debug, Clone)]
pub struct Composer {
    passes: Vec<Pass>,
    size: ViewportSize,
}

impl Composer {
    pub fn new(bloom: &BloomConfig, size: ViewportSize) -> Self {
        Self {
            passes: vec![
                Pass::Render,
                Pass::Bloom {
                    strength: bloom.strength,
                    radius: bloom.radius,
                    threshold: bloom.threshold,
                    resolution: size,
                },
                Pass::AntiAlias {
                    texel: texel(size),
                },
            ],
            size,
        }
    }

    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    pub fn size(&self) -> ViewportSize {
        self.size
    }

    pub fn set_size(&mut self, size: ViewportSize) {
        self.size = size;
        for pass in &mut self.passes {
            match pass {
                Pass::Render => {}
                Pass::Bloom { resolution, .. } => *resolution = size,
                Pass::AntiAlias { texel: t } => *t = texel(size),
            }
        }
    }

    pub fn render(
        &self,
        surface: &mut dyn RenderSurface,
        scene: &Scene,
        camera: &Camera,
    ) -> Result<()> {
        if surface.size() != self.size {
            return Err(SiteError::Render(format!(
                "surface is {}x{} but composer expects {}x{}",
                surface.size().width,
                surface.size().height,
                self.size.width,
                self.size.height
            )));
        }
        surface.draw(scene, camera, &self.passes)
    }
}

fn texel(size: ViewportSize) -> (f32, f32) {
    (
        1.0 / size.width.max(1) as f32,
        1.0 / size.height.max(1) as f32,
    )
}

/// Star layer state as it was drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerRecord {
    pub stars: usize,
    pub offset_y: f32,
    pub opacity: f32,
    /// Average of the per-star `depth_layer` values.
    pub mean_depth: f32,
}

impl From<&StarLayer> for LayerRecord {
    fn from(layer: &StarLayer) -> Self {
        let mean_depth = if layer.depth_layer.is_empty() {
            0.0
        } else {
            layer.depth_layer.iter().sum::<f32>() / layer.depth_layer.len() as f32
        };
        Self {
            stars: layer.positions.len(),
            offset_y: layer.offset_y,
            opacity: layer.opacity,
            mean_depth,
        }
    }
}

/// Snapshot of one presented frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    pub size: ViewportSize,
    pub passes: usize,
    pub background: u32,
    pub lights: usize,
    pub camera_aspect: f32,
    pub star_layers: Vec<LayerRecord>,
    pub logo_rotation_y: f32,
    pub moon_rotation_y: f32,
}

/// Headless surface that records what it was asked to draw.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    size: ViewportSize,
    frames: Vec<FrameRecord>,
    fail_next: usize,
}

impl RecordingSurface {
    pub fn new(size: ViewportSize) -> Self {
        Self {
            size,
            ..Default::default()
        }
    }

    pub fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Makes the next `count` draws fail, as a lost context would.
    pub fn fail_next(&mut self, count: usize) {
        self.fail_next = count;
    }
}

impl RenderSurface for RecordingSurface {
    fn set_size(&mut self, size: ViewportSize) {
        self.size = size;
    }

    fn size(&self) -> ViewportSize {
        self.size
    }

    fn draw(&mut self, scene: &Scene, camera: &Camera, passes: &[Pass]) -> Result<()> {
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(SiteError::Render("context lost".to_string()));
        }
        self.frames.push(FrameRecord {
            size: self.size,
            passes: passes.len(),
            background: scene.background,
            lights: scene.lights.len(),
            camera_aspect: camera.aspect,
            star_layers: scene.starfield.layers.iter().map(LayerRecord::from).collect(),
            logo_rotation_y: scene.logo.rotation().y,
            moon_rotation_y: scene.moon.rotation().y,
        });
        Ok(())
    }
}
