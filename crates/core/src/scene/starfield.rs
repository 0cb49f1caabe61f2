use glam::Vec3;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::config::{StarLayerConfig, StarfieldConfig};

/// One parallax layer of point stars.
#[derive(Debug, Clone, PartialEq)]
pub struct StarLayer {
    pub positions: Vec<Vec3>,
    /// `|z| / depth` per star, parallel to `positions`.
    pub depth_layer: Vec<f32>,
    pub base_speed: f32,
    pub offset_y: f32,
    pub opacity: f32,
}

impl StarLayer {
    /// Scatters `config.count` stars over a `spread`-wide square centred on
    /// the origin, with Z in `(-depth, 0]`.
    pub fn generate(config: &StarLayerConfig, spread: f32, rng: &mut impl Rng) -> Self {
        let half = (spread * 0.5).max(f32::EPSILON);
        let depth = config.depth.max(f32::EPSILON);
        let mut positions = Vec::with_capacity(config.count);
        let mut depth_layer = Vec::with_capacity(config.count);

        for _ in 0..config.count {
            let x = rng.random_range(-half..half);
            let y = rng.random_range(-half..half);
            let distance: f32 = rng.random_range(0.0..depth);
            let z = -distance;
            positions.push(Vec3::new(x, y, z));
            depth_layer.push((z.abs() / depth).clamp(0.0, 1.0));
        }

        Self {
            positions,
            depth_layer,
            base_speed: config.speed,
            offset_y: 0.0,
            opacity: 1.0,
        }
    }

    /// Shifts the layer by `delta * base_speed`, snapping back to zero once
    /// the offset leaves `[-wrap_limit, wrap_limit]`.
    pub fn apply_scroll(&mut self, delta: f32, wrap_limit: f32) {
        self.offset_y += delta * self.base_speed;
        if self.offset_y.abs() > wrap_limit {
            self.offset_y = 0.0;
        }
    }
}

/// The far, mid and near star layers plus their shared twinkle.
#[derive(Debug, Clone)]
pub struct Starfield {
    pub layers: Vec<StarLayer>,
    opacity_base: f32,
    opacity_amplitude: f32,
}

impl Starfield {
    pub fn generate(config: &StarfieldConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let layers = config
            .layers
            .iter()
            .map(|layer| StarLayer::generate(layer, config.spread, &mut rng))
            .collect::<Vec<_>>();
        tracing::debug!(
            layers = layers.len(),
            stars = layers.iter().map(|l| l.positions.len()).sum::<usize>(),
            "generated starfield"
        );

        Self {
            layers,
            opacity_base: config.opacity_base,
            opacity_amplitude: config.opacity_amplitude,
        }
    }

    /// Opacity shared by all layers at host time `now_ms`.
    pub fn opacity_at(&self, now_ms: f64) -> f32 {
        let seconds = now_ms * 0.001;
        self.opacity_base + self.opacity_amplitude * seconds.sin() as f32
    }

    pub fn twinkle(&mut self, now_ms: f64) {
        let opacity = self.opacity_at(now_ms);
        for layer in &mut self.layers {
            layer.opacity = opacity;
        }
    }

    pub fn apply_scroll(&mut self, delta: f32, wrap_limit: f32) {
        for layer in &mut self.layers {
            layer.apply_scroll(delta, wrap_limit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Starfield {
        Starfield::generate(&StarfieldConfig {
            seed: Some(42),
            ..Default::default()
        })
    }

    #[test]
    fn layers_have_expected_counts_and_depths() {
        let field = seeded();
        let counts: Vec<_> = field.layers.iter().map(|l| l.positions.len()).collect();
        assert_eq!(counts, vec![100, 50, 25]);

        let depths = [20.0, 40.0, 60.0];
        for (layer, depth) in field.layers.iter().zip(depths) {
            assert_eq!(layer.depth_layer.len(), layer.positions.len());
            for (position, fraction) in layer.positions.iter().zip(&layer.depth_layer) {
                assert!((0.0..=1.0).contains(fraction));
                assert!(position.x >= -50.0 && position.x < 50.0);
                assert!(position.y >= -50.0 && position.y < 50.0);
                assert!(position.z <= 0.0 && position.z > -depth);
            }
        }
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        assert_eq!(seeded().layers, seeded().layers);
    }

    #[test]
    fn scroll_down_then_up_restores_offsets() {
        let mut field = seeded();
        field.apply_scroll(3.0, 50.0);
        assert!((field.layers[2].offset_y - 0.018).abs() < 1e-6);

        field.apply_scroll(-3.0, 50.0);
        for layer in &field.layers {
            assert!(layer.offset_y.abs() < 1e-6);
        }
    }

    #[test]
    fn offsets_never_exceed_wrap_limit() {
        let mut field = seeded();
        let deltas = [4000.0, 9000.0, -20000.0, 12345.0, -3.0, 8500.0, 8500.0];
        for delta in deltas {
            field.apply_scroll(delta, 50.0);
            for layer in &field.layers {
                assert!(layer.offset_y.abs() <= 50.0);
            }
        }
    }

    #[test]
    fn offset_snaps_to_zero_past_limit() {
        let mut field = seeded();
        // near layer: 9000 * 0.006 = 54
        field.apply_scroll(9000.0, 50.0);
        assert_eq!(field.layers[2].offset_y, 0.0);
        assert!((field.layers[0].offset_y - 18.0).abs() < 1e-4);
    }

    #[test]
    fn twinkle_stays_within_band() {
        let mut field = seeded();
        for step in 0..200 {
            field.twinkle(step as f64 * 97.0);
            for layer in &field.layers {
                assert!(layer.opacity >= 0.4 - 1e-6 && layer.opacity <= 0.8 + 1e-6);
            }
        }
        assert!((field.opacity_at(0.0) - 0.6).abs() < 1e-6);
    }
}
