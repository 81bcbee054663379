// Geometry provider: loads the world-atlas TopoJSON once at startup and
// exposes an immutable collection of country boundary records.
//
// Decoding arcs into drawable outlines is the renderer's job; this layer
// only needs stable ids, display names, and the raw geometry to pass
// through.

use rand::Rng;
use serde_json::Value;
use tracing::{debug, info};

use mapstation_common::{CountryShape, MapStationError};

#[derive(Debug, Clone)]
pub struct WorldAtlas {
    shapes: Vec<CountryShape>,
    topology: Value,
}

impl WorldAtlas {
    /// Fetch and parse the topology document from `url`.
    pub async fn fetch(url: &str) -> Result<Self, MapStationError> {
        let response = reqwest::get(url)
            .await
            .map_err(|e| MapStationError::AtlasLoad(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MapStationError::AtlasLoad(format!(
                "atlas fetch returned {}",
                response.status()
            )));
        }

        let topology: Value = response
            .json()
            .await
            .map_err(|e| MapStationError::AtlasLoad(e.to_string()))?;

        Self::from_topology(topology)
    }

    /// Build an atlas from an already-parsed topology document.
    pub fn from_topology(topology: Value) -> Result<Self, MapStationError> {
        let geometries = topology
            .pointer("/objects/countries/geometries")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                MapStationError::AtlasLoad(
                    "topology has no objects.countries.geometries collection".to_string(),
                )
            })?;

        let mut shapes = Vec::with_capacity(geometries.len());
        let mut skipped = 0usize;
        for geometry in geometries {
            let id = match geometry.get("id") {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => {
                    skipped += 1;
                    continue;
                }
            };
            let Some(name) = geometry
                .pointer("/properties/name")
                .and_then(Value::as_str)
            else {
                skipped += 1;
                continue;
            };
            shapes.push(CountryShape {
                id,
                name: name.to_string(),
                boundary: geometry.clone(),
            });
        }

        if skipped > 0 {
            debug!(skipped, "skipped geometries without id or name");
        }
        info!(countries = shapes.len(), "world atlas loaded");

        Ok(Self { shapes, topology })
    }

    /// Build an atlas directly from shapes. Intended for fixtures.
    pub fn from_shapes(shapes: Vec<CountryShape>) -> Self {
        Self {
            shapes,
            topology: Value::Null,
        }
    }

    /// An atlas with no countries, used when the startup fetch fails.
    /// The map renders empty and selection is impossible.
    pub fn empty() -> Self {
        Self {
            shapes: Vec::new(),
            topology: Value::Null,
        }
    }

    pub fn shapes(&self) -> &[CountryShape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// All country display names, in topology order.
    pub fn names(&self) -> Vec<String> {
        self.shapes.iter().map(|s| s.name.clone()).collect()
    }

    /// A uniformly random country shape, or `None` if the atlas is empty.
    pub fn random_shape(&self) -> Option<&CountryShape> {
        if self.shapes.is_empty() {
            return None;
        }
        let index = rand::rng().random_range(0..self.shapes.len());
        self.shapes.get(index)
    }

    /// The raw topology document, for the renderer. `Null` when the atlas
    /// was built from fixtures or the startup fetch failed.
    pub fn topology(&self) -> &Value {
        &self.topology
    }
}
