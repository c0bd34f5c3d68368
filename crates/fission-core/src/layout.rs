//! Grid layouts and the factory that turns prefab ids into parts

use fission_simulation::{Materials, PartDefs};
use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::part::ReactorPart;

/// Builds and disposes of the part in one grid cell.
///
/// The engine only ever sees plain `ReactorPart` values; a host that tracks
/// its own objects per cell hooks in here.
pub trait GridCellFactory<G> {
    /// Build the part for `prefab`, or `None` if the id is unknown
    fn create(&mut self, position: IVec2, prefab: &str) -> Option<ReactorPart<G>>;

    /// Called for every part the reactor removes through the factory
    fn destroy(&mut self, _position: IVec2, _part: ReactorPart<G>) {}
}

/// Default factory backed by the built-in prefab and material tables
#[derive(Clone, Debug)]
pub struct PrefabFactory {
    pub parts: PartDefs,
    pub materials: Materials,
    /// Temperature new parts start at
    pub initial_temperature: f32,
}

impl PrefabFactory {
    pub fn new(initial_temperature: f32) -> Self {
        Self {
            parts: PartDefs::new(),
            materials: Materials::new(),
            initial_temperature,
        }
    }
}

impl Default for PrefabFactory {
    fn default() -> Self {
        Self::new(293.15)
    }
}

impl<G> GridCellFactory<G> for PrefabFactory {
    fn create(&mut self, _position: IVec2, prefab: &str) -> Option<ReactorPart<G>> {
        match self.parts.get(prefab) {
            Some(def) => Some(ReactorPart::from_def(
                def,
                &self.materials,
                self.initial_temperature,
            )),
            None => {
                log::warn!("Unknown reactor part prefab: {}", prefab);
                None
            }
        }
    }
}

/// One cell of a layout
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutCell {
    pub x: i32,
    pub y: i32,
    pub prefab: String,
}

/// Which prefab goes where
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub width: usize,
    pub height: usize,
    #[serde(default)]
    pub cells: Vec<LayoutCell>,
}

impl Layout {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: Vec::new(),
        }
    }

    pub fn from_ron_str(source: &str) -> Result<Self, LayoutError> {
        Ok(ron::from_str(source)?)
    }

    /// Builder-style cell placement
    pub fn with(mut self, x: i32, y: i32, prefab: &str) -> Self {
        self.cells.push(LayoutCell {
            x,
            y,
            prefab: prefab.to_string(),
        });
        self
    }

    /// Every cell holds the same prefab
    pub fn filled(width: usize, height: usize, prefab: &str) -> Self {
        let mut layout = Self::new(width, height);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                layout = layout.with(x, y, prefab);
            }
        }
        layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fission_simulation::{GasMixture, PartId};

    #[test]
    fn test_prefab_factory_builds_known_parts() {
        let mut factory = PrefabFactory::new(350.0);
        let part: Option<ReactorPart<GasMixture>> =
            factory.create(IVec2::ZERO, PartId::FUEL_ROD_URANIUM);
        let part = part.expect("known prefab");
        assert_eq!(part.temperature, 350.0);
        assert_eq!(part.prefab, PartId::FUEL_ROD_URANIUM);
    }

    #[test]
    fn test_prefab_factory_rejects_unknown() {
        let mut factory = PrefabFactory::default();
        let part: Option<ReactorPart<GasMixture>> = factory.create(IVec2::ZERO, "banana");
        assert!(part.is_none());
    }

    #[test]
    fn test_layout_from_ron() {
        let layout = Layout::from_ron_str(
            r#"(
                width: 3,
                height: 1,
                cells: [
                    (x: 0, y: 0, prefab: "fuel_rod_uranium"),
                    (x: 2, y: 0, prefab: "control_rod"),
                ],
            )"#,
        )
        .expect("valid layout");

        assert_eq!(layout.width, 3);
        assert_eq!(layout.cells.len(), 2);
        assert_eq!(layout.cells[1].prefab, "control_rod");
    }

    #[test]
    fn test_layout_parse_error() {
        let err = Layout::from_ron_str("(width: 3)").unwrap_err();
        assert!(matches!(err, LayoutError::Parse(_)));
    }

    #[test]
    fn test_filled_layout() {
        let layout = Layout::filled(2, 3, PartId::MODERATOR);
        assert_eq!(layout.cells.len(), 6);
        assert!(layout.cells.iter().all(|c| c.prefab == PartId::MODERATOR));
    }
}
