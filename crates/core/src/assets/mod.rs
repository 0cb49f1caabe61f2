use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use glam::Vec3;

use crate::{
    config::ModelFit,
    error::LoadError,
    scene::{Group, Mesh, Node},
};

const STL_HEADER_LEN: usize = 80;
const STL_TRIANGLE_LEN: usize = 50;

/// A model handed back by a [`ModelSource`].
#[derive(Debug, Clone)]
pub struct FetchedModel {
    pub root: Group,
    pub byte_len: u64,
}

/// External model-loading capability: relative path in, scene graph out.
pub trait ModelSource {
    fn fetch(&mut self, path: &str) -> Result<FetchedModel, LoadError>;
}

/// Loads STL meshes (binary or ASCII) relative to an asset directory.
#[derive(Debug, Clone)]
pub struct StlModelSource {
    root: PathBuf,
}

impl StlModelSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ModelSource for StlModelSource {
    fn fetch(&mut self, path: &str) -> Result<FetchedModel, LoadError> {
        let full = self.root.join(path);
        let bytes = std::fs::read(&full).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => LoadError::NotFound(path.to_string()),
            _ => LoadError::Io {
                path: path.to_string(),
                reason: err.to_string(),
            },
        })?;
        let vertices = parse_stl(path, &bytes)?;
        if vertices.is_empty() {
            return Err(LoadError::Empty(path.to_string()));
        }

        let mut root = Group::new(model_name(&full));
        root.add(Node::Mesh(Mesh::new(model_name(&full), vertices)));
        Ok(FetchedModel {
            root,
            byte_len: bytes.len() as u64,
        })
    }
}

/// In-memory source keyed by path; unknown paths report `NotFound`.
#[derive(Debug, Clone, Default)]
pub struct StaticModelSource {
    models: HashMap<String, Result<Group, LoadError>>,
}

impl StaticModelSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, path: impl Into<String>, model: Group) -> Self {
        self.models.insert(path.into(), Ok(model));
        self
    }

    pub fn with_failure(mut self, path: impl Into<String>, error: LoadError) -> Self {
        self.models.insert(path.into(), Err(error));
        self
    }
}

impl ModelSource for StaticModelSource {
    fn fetch(&mut self, path: &str) -> Result<FetchedModel, LoadError> {
        match self.models.get(path) {
            Some(Ok(root)) => Ok(FetchedModel {
                root: root.clone(),
                byte_len: (root.mesh_count() * STL_TRIANGLE_LEN) as u64,
            }),
            Some(Err(err)) => Err(err.clone()),
            None => Err(LoadError::NotFound(path.to_string())),
        }
    }
}

/// Applies the configured normalisation to a freshly loaded model.
///
/// `AutoFit` scales uniformly so the longest bounding-box axis equals the
/// target size and moves the box centre to the origin.
pub fn fit_model(model: &mut Group, fit: ModelFit) {
    match fit {
        ModelFit::Scale { factor } => {
            model.transform.scale = Vec3::splat(factor);
        }
        ModelFit::AutoFit { size } => {
            model.transform.scale = Vec3::ONE;
            model.transform.position = Vec3::ZERO;
            let Some(bounds) = model.bounding_box() else {
                return;
            };
            let longest = bounds.size().max_element();
            if longest <= f32::EPSILON {
                return;
            }
            let scale = size / longest;
            model.transform.scale = Vec3::splat(scale);
            model.transform.position = -bounds.center() * scale;
        }
    }
}

fn model_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string())
}

/// Parses STL bytes into a flat triangle vertex list.
pub fn parse_stl(path: &str, bytes: &[u8]) -> Result<Vec<Vec3>, LoadError> {
    if is_binary_stl(bytes) {
        parse_binary_stl(path, bytes)
    } else {
        parse_ascii_stl(path, bytes)
    }
}

fn is_binary_stl(bytes: &[u8]) -> bool {
    if bytes.len() < STL_HEADER_LEN + 4 {
        return !bytes.starts_with(b"solid");
    }
    let count = read_u32(bytes, STL_HEADER_LEN) as usize;
    let expected = STL_HEADER_LEN + 4 + count.saturating_mul(STL_TRIANGLE_LEN);
    expected == bytes.len() || !bytes.starts_with(b"solid")
}

fn parse_binary_stl(path: &str, bytes: &[u8]) -> Result<Vec<Vec3>, LoadError> {
    let parse_err = |reason: String| LoadError::Parse {
        path: path.to_string(),
        reason,
    };
    if bytes.len() < STL_HEADER_LEN + 4 {
        return Err(parse_err("truncated header".to_string()));
    }

    let count = read_u32(bytes, STL_HEADER_LEN) as usize;
    let body = &bytes[STL_HEADER_LEN + 4..];
    if body.len() < count.saturating_mul(STL_TRIANGLE_LEN) {
        return Err(parse_err(format!(
            "expected {count} triangles, found {} bytes",
            body.len()
        )));
    }

    let mut vertices = Vec::with_capacity(count * 3);
    for triangle in body.chunks_exact(STL_TRIANGLE_LEN).take(count) {
        // 12 bytes of facet normal precede the three vertices.
        for corner in 0..3 {
            let offset = 12 + corner * 12;
            vertices.push(Vec3::new(
                read_f32(triangle, offset),
                read_f32(triangle, offset + 4),
                read_f32(triangle, offset + 8),
            ));
        }
    }
    Ok(vertices)
}

fn parse_ascii_stl(path: &str, bytes: &[u8]) -> Result<Vec<Vec3>, LoadError> {
    let text = std::str::from_utf8(bytes).map_err(|err| LoadError::Parse {
        path: path.to_string(),
        reason: err.to_string(),
    })?;

    let mut vertices = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let mut parts = line.split_whitespace();
        if parts.next() != Some("vertex") {
            continue;
        }
        let coords = parts
            .map(str::parse::<f32>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| LoadError::Parse {
                path: path.to_string(),
                reason: format!("line {}: {err}", line_no + 1),
            })?;
        if coords.len() != 3 {
            return Err(LoadError::Parse {
                path: path.to_string(),
                reason: format!("line {}: expected 3 coordinates", line_no + 1),
            });
        }
        vertices.push(Vec3::new(coords[0], coords[1], coords[2]));
    }
    Ok(vertices)
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(buf)
}

fn read_f32(bytes: &[u8], offset: usize) -> f32 {
    f32::from_bits(read_u32(bytes, offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary_stl(triangles: &[[Vec3; 3]]) -> Vec<u8> {
        let mut bytes = vec![0u8; STL_HEADER_LEN];
        bytes.extend_from_slice(&(triangles.len() as u32).to_le_bytes());
        for triangle in triangles {
            bytes.extend_from_slice(&[0u8; 12]);
            for vertex in triangle {
                for value in vertex.to_array() {
                    bytes.extend_from_slice(&value.to_le_bytes());
                }
            }
            bytes.extend_from_slice(&[0u8; 2]);
        }
        bytes
    }

    fn unit_triangle() -> [Vec3; 3] {
        [Vec3::ZERO, Vec3::X, Vec3::Y]
    }

    #[test]
    fn loads_binary_stl_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("models")).unwrap();
        std::fs::write(
            dir.path().join("models/moon.stl"),
            binary_stl(&[unit_triangle(), unit_triangle()]),
        )
        .unwrap();

        let mut source = StlModelSource::new(dir.path());
        let fetched = source.fetch("models/moon.stl").unwrap();
        assert_eq!(fetched.root.name, "moon");
        assert_eq!(fetched.root.mesh_count(), 1);
        assert_eq!(fetched.byte_len, (84 + 2 * 50) as u64);
    }

    #[test]
    fn parses_ascii_stl() {
        let text = "solid tri\n facet normal 0 0 1\n  outer loop\n   vertex 0 0 0\n   vertex 1 0 0\n   vertex 0 2 0\n  endloop\n endfacet\nendsolid tri\n";
        let vertices = parse_stl("tri.stl", text.as_bytes()).unwrap();
        assert_eq!(vertices, vec![Vec3::ZERO, Vec3::X, Vec3::new(0.0, 2.0, 0.0)]);
    }

    #[test]
    fn reports_missing_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = StlModelSource::new(dir.path());
        assert_eq!(
            source.fetch("logo.stl").unwrap_err(),
            LoadError::NotFound("logo.stl".to_string())
        );

        std::fs::write(dir.path().join("bad.stl"), "solid x\n vertex 1 nope 3\n").unwrap();
        assert!(matches!(source.fetch("bad.stl"), Err(LoadError::Parse { .. })));

        std::fs::write(dir.path().join("empty.stl"), "solid x\nendsolid x\n").unwrap();
        assert_eq!(
            source.fetch("empty.stl").unwrap_err(),
            LoadError::Empty("empty.stl".to_string())
        );
    }

    #[test]
    fn truncated_binary_is_a_parse_error() {
        let mut bytes = binary_stl(&[unit_triangle()]);
        bytes[STL_HEADER_LEN] = 9;
        assert!(matches!(
            parse_stl("t.stl", &bytes),
            Err(LoadError::Parse { .. })
        ));
    }

    #[test]
    fn auto_fit_maps_longest_axis_to_target() {
        let mut model = Group::new("moon");
        model.add(Node::Mesh(Mesh::new(
            "m",
            vec![Vec3::new(10.0, 0.0, 0.0), Vec3::new(16.0, 2.0, 1.0)],
        )));

        fit_model(&mut model, ModelFit::AutoFit { size: 3.0 });
        assert_eq!(model.transform.scale, Vec3::splat(0.5));

        let bounds = model.bounding_box().unwrap();
        assert!((bounds.size().max_element() - 3.0).abs() < 1e-5);
        assert!(bounds.center().length() < 1e-5);
    }

    #[test]
    fn literal_scale_skips_recentering() {
        let mut model = Group::new("logo");
        model.add(Node::Mesh(Mesh::new("m", vec![Vec3::ONE, Vec3::splat(2.0)])));

        fit_model(&mut model, ModelFit::Scale { factor: 16.0 });
        assert_eq!(model.transform.scale, Vec3::splat(16.0));
        assert_eq!(model.transform.position, Vec3::ZERO);
    }
}
