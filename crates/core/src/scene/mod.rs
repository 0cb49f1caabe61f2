pub mod starfield;

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::{
    assets,
    config::{MaterialConfig, ModelConfig, SceneConfig},
};

pub use starfield::{StarLayer, Starfield};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    /// Euler angles in radians, applied X then Y then Z.
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.position)
    }
}

/// Emissive physically-based material applied to every model mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlowMaterial {
    pub color: u32,
    pub emissive: u32,
    pub emissive_intensity: f32,
    pub metalness: f32,
    pub roughness: f32,
}

impl From<&MaterialConfig> for GlowMaterial {
    fn from(config: &MaterialConfig) -> Self {
        Self {
            color: config.color,
            emissive: config.emissive,
            emissive_intensity: config.emissive_intensity,
            metalness: config.metalness,
            roughness: config.roughness,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Material {
    /// Flat colour as shipped with the asset.
    Basic { color: u32 },
    Glow(GlowMaterial),
}

impl Default for Material {
    fn default() -> Self {
        Self::Basic { color: 0xffffff }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub transform: Transform,
    pub vertices: Vec<Vec3>,
    pub material: Material,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl Mesh {
    pub fn new(name: impl Into<String>, vertices: Vec<Vec3>) -> Self {
        Self {
            name: name.into(),
            vertices,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Group(Group),
    Mesh(Mesh),
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_point(point: Vec3) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    pub fn extend(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn union(self, other: Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

/// Positionable node holding other nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    pub name: String,
    pub transform: Transform,
    pub children: Vec<Node>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn add(&mut self, node: Node) {
        self.children.push(node);
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Visits every mesh below this group, depth first.
    pub fn for_each_mesh_mut(&mut self, visit: &mut impl FnMut(&mut Mesh)) {
        for child in &mut self.children {
            match child {
                Node::Mesh(mesh) => visit(mesh),
                Node::Group(group) => group.for_each_mesh_mut(visit),
            }
        }
    }

    pub fn mesh_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| match child {
                Node::Mesh(_) => 1,
                Node::Group(group) => group.mesh_count(),
            })
            .sum()
    }

    /// Bounds of all descendant vertices in this group's own coordinate
    /// space (its transform is applied, ancestors' are not).
    pub fn bounding_box(&self) -> Option<Aabb> {
        self.bounds_with(self.transform.matrix())
    }

    fn bounds_with(&self, parent: Mat4) -> Option<Aabb> {
        let mut bounds: Option<Aabb> = None;
        for child in &self.children {
            let child_bounds = match child {
                Node::Mesh(mesh) => {
                    let matrix = parent * mesh.transform.matrix();
                    mesh.vertices.iter().fold(None, |acc: Option<Aabb>, v| {
                        let point = matrix.transform_point3(*v);
                        Some(match acc {
                            Some(mut aabb) => {
                                aabb.extend(point);
                                aabb
                            }
                            None => Aabb::from_point(point),
                        })
                    })
                }
                Node::Group(group) => group.bounds_with(parent * group.transform.matrix()),
            };
            bounds = match (bounds, child_bounds) {
                (Some(a), Some(b)) => Some(a.union(b)),
                (a, b) => a.or(b),
            };
        }
        bounds
    }
}

/// Group that stays empty until its model finishes loading.
#[derive(Debug, Clone)]
pub struct ModelContainer {
    group: Group,
    config: ModelConfig,
}

impl ModelContainer {
    pub fn new(name: impl Into<String>, config: ModelConfig) -> Self {
        let mut group = Group::new(name);
        group.transform.position = config.position;
        group.transform.rotation = config.rotation;
        Self { group, config }
    }

    pub fn group(&self) -> &Group {
        &self.group
    }

    pub fn is_loaded(&self) -> bool {
        self.group.has_children()
    }

    pub fn position(&self) -> Vec3 {
        self.group.transform.position
    }

    pub fn rotation(&self) -> Vec3 {
        self.group.transform.rotation
    }

    /// Normalises `model`, applies the glow material with shadows to every
    /// mesh and splices it into the container at its configured pose.
    pub fn install(&mut self, mut model: Group) {
        assets::fit_model(&mut model, self.config.fit);

        let material = Material::Glow(GlowMaterial::from(&self.config.material));
        model.for_each_mesh_mut(&mut |mesh: &mut Mesh| {
            mesh.material = material;
            mesh.cast_shadow = true;
            mesh.receive_shadow = true;
        });

        self.group.transform.position = self.config.position;
        self.group.transform.rotation = self.config.rotation;
        self.group.children.clear();
        self.group.add(Node::Group(model));
    }

    /// Advances the Y rotation by the configured per-frame step.
    pub fn spin(&mut self) {
        if self.is_loaded() {
            self.group.transform.rotation.y += self.config.spin;
        }
    }

    /// Parallax reposition for the given document scroll offset.
    pub fn follow_scroll(&mut self, scroll_y: f32) {
        if self.is_loaded() {
            self.group.transform.position.y =
                self.config.parallax_base + scroll_y * self.config.parallax_factor;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Light {
    Ambient {
        color: u32,
        intensity: f32,
    },
    Directional {
        color: u32,
        intensity: f32,
        position: Vec3,
        cast_shadow: bool,
    },
}

/// Everything the composer draws for the landing page.
#[derive(Debug, Clone)]
pub struct Scene {
    pub background: u32,
    pub lights: Vec<Light>,
    pub starfield: Starfield,
    pub logo: ModelContainer,
    pub moon: ModelContainer,
}

impl Scene {
    pub fn build(config: &SceneConfig) -> Self {
        Self {
            background: 0x000000,
            lights: vec![
                Light::Ambient {
                    color: 0x404060,
                    intensity: 0.6,
                },
                Light::Directional {
                    color: 0xffffff,
                    intensity: 1.0,
                    position: Vec3::new(5.0, 10.0, 7.5),
                    cast_shadow: true,
                },
            ],
            starfield: Starfield::generate(&config.stars),
            logo: ModelContainer::new("logo", config.logo.clone()),
            moon: ModelContainer::new("moon", config.moon.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube(half: f32) -> Vec<Vec3> {
        vec![Vec3::splat(-half), Vec3::splat(half)]
    }

    fn model(vertices: Vec<Vec3>) -> Group {
        let mut root = Group::new("model");
        let mut inner = Group::new("inner");
        inner.add(Node::Mesh(Mesh::new("a", vertices.clone())));
        root.add(Node::Group(inner));
        root.add(Node::Mesh(Mesh::new("b", vertices)));
        root
    }

    #[test]
    fn bounding_box_applies_child_transforms() {
        let mut root = Group::new("root");
        let mut mesh = Mesh::new("m", cube(1.0));
        mesh.transform.position = Vec3::new(10.0, 0.0, 0.0);
        root.add(Node::Mesh(mesh));

        let aabb = root.bounding_box().unwrap();
        assert_eq!(aabb.min, Vec3::new(9.0, -1.0, -1.0));
        assert_eq!(aabb.max, Vec3::new(11.0, 1.0, 1.0));
    }

    #[test]
    fn empty_group_has_no_bounds() {
        assert!(Group::new("empty").bounding_box().is_none());
    }

    #[test]
    fn install_replaces_every_material() {
        let mut container = ModelContainer::new("logo", ModelConfig::logo());
        assert!(!container.is_loaded());

        container.install(model(cube(0.5)));
        assert!(container.is_loaded());

        let expected = Material::Glow(GlowMaterial::from(&ModelConfig::logo().material));
        let mut group = container.group().clone();
        let mut seen = 0;
        group.for_each_mesh_mut(&mut |mesh: &mut Mesh| {
            assert_eq!(mesh.material, expected);
            assert!(mesh.cast_shadow && mesh.receive_shadow);
            seen += 1;
        });
        assert_eq!(seen, 2);
    }

    #[test]
    fn empty_container_ignores_spin_and_scroll() {
        let mut container = ModelContainer::new("moon", ModelConfig::moon());
        let before = container.group().transform;
        container.spin();
        container.follow_scroll(500.0);
        assert_eq!(container.group().transform, before);
    }

    #[test]
    fn loaded_container_spins_and_follows_scroll() {
        let mut container = ModelContainer::new("moon", ModelConfig::moon());
        container.install(model(cube(1.0)));
        let start = container.rotation().y;

        container.spin();
        assert!((container.rotation().y - start - 0.001).abs() < 1e-6);

        container.follow_scroll(1000.0);
        assert!((container.position().y - 5.0).abs() < 1e-5);
    }
}
