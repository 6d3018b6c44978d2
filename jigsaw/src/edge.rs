//! The catalog of jigsaw edge silhouettes shared by every piece.

use std::f32::consts::PI;
use std::fs;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// One bump silhouette, as depths in `[0, 1]` sampled evenly along the edge.
///
/// Depth 1 reaches the full tab margin of the puzzle the shape is used in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeShape {
    #[serde(default)]
    pub name: String,
    pub profile: Vec<f32>,
}

impl EdgeShape {
    pub fn new(name: impl Into<String>, profile: Vec<f32>) -> Self {
        Self {
            name: name.into(),
            profile,
        }
    }

    /// A rounded knob centred at `center` (fraction of the edge) spanning `radius` on each side.
    pub fn knob(name: impl Into<String>, center: f32, radius: f32, height: f32) -> Self {
        const SAMPLES: usize = 33;
        let profile = (0..SAMPLES)
            .map(|i| {
                let t = i as f32 / (SAMPLES - 1) as f32;
                let u = (t - center) / radius;
                if u.abs() >= 1.0 {
                    0.0
                } else {
                    (0.5 + 0.5 * (PI * u).cos()) * height.clamp(0.0, 1.0)
                }
            })
            .collect();
        Self::new(name, profile)
    }

    /// Depth at `t` along the edge (`0.0` = start, `1.0` = end), linearly interpolated.
    pub fn depth_at(&self, t: f32) -> f32 {
        let last = self.profile.len().saturating_sub(1);
        if last == 0 {
            return self.profile.first().copied().unwrap_or(0.0);
        }
        let pos = t.clamp(0.0, 1.0) * last as f32;
        let i = (pos.floor() as usize).min(last - 1);
        let frac = pos - i as f32;
        self.profile[i] * (1.0 - frac) + self.profile[i + 1] * frac
    }

    fn validate(&self, index: usize) -> Result<(), LoadError> {
        if self.profile.len() < 2 {
            return Err(LoadError::Profile {
                index,
                reason: "needs at least two samples",
            });
        }
        if self
            .profile
            .iter()
            .any(|d| !d.is_finite() || !(0.0..=1.0).contains(d))
        {
            return Err(LoadError::Profile {
                index,
                reason: "depths must lie in 0..=1",
            });
        }
        if self.profile.first() != Some(&0.0) || self.profile.last() != Some(&0.0) {
            return Err(LoadError::Profile {
                index,
                reason: "must start and end at depth 0",
            });
        }
        Ok(())
    }
}

/// A reference to a catalog entry plus its orientation.
///
/// Unflipped shapes stick out of the piece (a tab); flipped shapes are cut into it (a socket).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeRef {
    pub index: usize,
    pub flipped: bool,
}

impl EdgeRef {
    /// The matching edge for the neighbouring piece: same silhouette, opposite orientation.
    pub fn complement(self) -> Self {
        Self {
            index: self.index,
            flipped: !self.flipped,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    /// Straight border edge.
    Flat,
    Shaped(EdgeRef),
}

impl Edge {
    pub fn shaped(self) -> Option<EdgeRef> {
        match self {
            Edge::Flat => None,
            Edge::Shaped(r) => Some(r),
        }
    }

    pub fn is_tab(self) -> bool {
        matches!(self, Edge::Shaped(r) if !r.flipped)
    }

    pub fn is_socket(self) -> bool {
        matches!(self, Edge::Shaped(r) if r.flipped)
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    edges: Vec<EdgeShape>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLibrary {
    shapes: Vec<EdgeShape>,
}

impl EdgeLibrary {
    pub fn from_shapes(shapes: Vec<EdgeShape>) -> Result<Self, LoadError> {
        if shapes.is_empty() {
            return Err(LoadError::EmptyCatalog);
        }
        for (index, shape) in shapes.iter().enumerate() {
            shape.validate(index)?;
        }
        Ok(Self { shapes })
    }

    /// Loads a JSON catalog of the form `{"edges": [{"name": "...", "profile": [...]}]}`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| LoadError::io(path, err))?;
        let library = Self::parse(&text)?;
        log::info!(
            "loaded {} edge shapes from {}",
            library.len(),
            path.display()
        );
        Ok(library)
    }

    pub fn parse(json: &str) -> Result<Self, LoadError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::from_shapes(file.edges)
    }

    /// Built-in knobs, used when no catalog file is configured.
    pub fn classic() -> Self {
        let shapes = vec![
            EdgeShape::knob("round", 0.5, 0.22, 1.0),
            EdgeShape::knob("round-left", 0.42, 0.2, 0.9),
            EdgeShape::knob("round-right", 0.58, 0.2, 0.9),
            EdgeShape::knob("wide", 0.5, 0.3, 0.75),
            EdgeShape::knob("narrow", 0.5, 0.15, 1.0),
            EdgeShape::knob("low", 0.46, 0.26, 0.6),
        ];
        Self { shapes }
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn shapes(&self) -> &[EdgeShape] {
        &self.shapes
    }

    pub fn shape(&self, edge: EdgeRef) -> &EdgeShape {
        &self.shapes[edge.index % self.shapes.len()]
    }

    /// Draws a uniformly random catalog entry with a uniformly random orientation.
    pub fn pick_random_edge<R: Rng + ?Sized>(&self, rng: &mut R) -> EdgeRef {
        EdgeRef {
            index: rng.random_range(0..self.shapes.len()),
            flipped: rng.random_bool(0.5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn depth_interpolates_between_samples() {
        let shape = EdgeShape::new("ramp", vec![0.0, 1.0, 0.0]);
        assert_eq!(shape.depth_at(0.0), 0.0);
        assert_eq!(shape.depth_at(0.25), 0.5);
        assert_eq!(shape.depth_at(0.5), 1.0);
        assert_eq!(shape.depth_at(1.0), 0.0);
        assert_eq!(shape.depth_at(7.0), 0.0);
    }

    #[test]
    fn knob_is_flat_at_the_corners() {
        let knob = EdgeShape::knob("k", 0.5, 0.2, 1.0);
        assert_eq!(knob.depth_at(0.0), 0.0);
        assert_eq!(knob.depth_at(1.0), 0.0);
        assert!((knob.depth_at(0.5) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn classic_catalog_is_valid() {
        let classic = EdgeLibrary::classic();
        assert!(!classic.is_empty());
        assert!(EdgeLibrary::from_shapes(classic.shapes().to_vec()).is_ok());
    }

    #[test]
    fn parse_rejects_empty_and_invalid_catalogs() {
        assert!(matches!(
            EdgeLibrary::parse(r#"{"edges": []}"#),
            Err(LoadError::EmptyCatalog)
        ));
        assert!(matches!(
            EdgeLibrary::parse(r#"{"edges": [{"profile": [0.0]}]}"#),
            Err(LoadError::Profile { index: 0, .. })
        ));
        assert!(matches!(
            EdgeLibrary::parse(r#"{"edges": [{"profile": [0, 1, 0]}, {"profile": [0, 2, 0]}]}"#),
            Err(LoadError::Profile { index: 1, .. })
        ));
        assert!(matches!(
            EdgeLibrary::parse("not json"),
            Err(LoadError::Catalog(_))
        ));
    }

    #[test]
    fn profiles_must_be_flat_at_both_ends() {
        for profile in [vec![1.0, 1.0], vec![0.0, 1.0, 0.5], vec![0.25, 1.0, 0.0]] {
            assert!(matches!(
                EdgeLibrary::from_shapes(vec![EdgeShape::new("bar", profile)]),
                Err(LoadError::Profile {
                    index: 0,
                    reason: "must start and end at depth 0"
                })
            ));
        }
        assert!(EdgeLibrary::from_shapes(vec![EdgeShape::new("bar", vec![0.0, 1.0, 1.0, 0.0])]).is_ok());
    }

    #[test]
    fn random_picks_cover_catalog_and_both_orientations() {
        let library = EdgeLibrary::classic();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut seen_index = vec![false; library.len()];
        let mut seen_flip = [false; 2];
        for _ in 0..500 {
            let pick = library.pick_random_edge(&mut rng);
            seen_index[pick.index] = true;
            seen_flip[pick.flipped as usize] = true;
        }
        assert!(seen_index.iter().all(|s| *s));
        assert!(seen_flip.iter().all(|s| *s));
    }

    #[test]
    fn complement_flips_orientation_only() {
        let edge = EdgeRef {
            index: 3,
            flipped: false,
        };
        assert_eq!(
            edge.complement(),
            EdgeRef {
                index: 3,
                flipped: true
            }
        );
        assert_eq!(edge.complement().complement(), edge);
        assert!(Edge::Shaped(edge).is_tab());
        assert!(Edge::Shaped(edge.complement()).is_socket());
        assert!(!Edge::Flat.is_tab() && !Edge::Flat.is_socket());
    }
}
