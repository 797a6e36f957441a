use serde::{Deserialize, Serialize};

use crate::layer::LayerId;

/// Smallest scale the save path will persist.
pub const MIN_SCALE: f64 = 0.01;
/// Largest scale the save path will persist.
pub const MAX_SCALE: f64 = 100.0;
pub const DEFAULT_SCALE: f64 = 1.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetKind {
    Kml,
    Dxf,
    Shapefile,
    #[serde(rename = "TILES_3D")]
    Tiles3d,
    PointCloud,
    Glb,
}

/// A project asset as persisted by the backend.
///
/// Only the fields the placement logic reads are modelled; unknown columns
/// in a backend row are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetLayer {
    pub id: LayerId,
    #[serde(rename = "type")]
    pub kind: AssetKind,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub height_offset: f64,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_scale() -> f64 {
    DEFAULT_SCALE
}

fn default_visible() -> bool {
    true
}

/// The committed `(heightOffset, scale)` pair of one visible tile layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TileTransform {
    pub layer_id: LayerId,
    pub height_offset: f64,
    pub scale: f64,
}

impl TileTransform {
    pub fn new(layer_id: impl Into<LayerId>, height_offset: f64, scale: f64) -> Self {
        Self {
            layer_id: layer_id.into(),
            height_offset,
            scale,
        }
    }
}

impl AssetLayer {
    pub fn new(id: impl Into<LayerId>, kind: AssetKind) -> Self {
        Self {
            id: id.into(),
            kind,
            name: String::new(),
            height_offset: 0.0,
            scale: DEFAULT_SCALE,
            visible: true,
        }
    }

    pub fn tiles(id: impl Into<LayerId>) -> Self {
        Self::new(id, AssetKind::Tiles3d)
    }

    pub fn with_transform(mut self, height_offset: f64, scale: f64) -> Self {
        self.height_offset = height_offset;
        self.scale = scale;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn is_tiles(&self) -> bool {
        self.kind == AssetKind::Tiles3d
    }

    /// `Some` only for visible 3D-tiles layers.
    pub fn tile_transform(&self) -> Option<TileTransform> {
        if !self.visible || !self.is_tiles() {
            return None;
        }
        Some(TileTransform {
            layer_id: self.id.clone(),
            height_offset: self.height_offset,
            scale: self.scale,
        })
    }

    /// The write performed by the "save" action. Scale is clamped here so
    /// nothing downstream ever sees a collapsed or inverted value.
    pub fn commit_transform(&mut self, height_offset: f64, scale: f64) {
        self.height_offset = if height_offset.is_finite() {
            height_offset
        } else {
            0.0
        };
        self.scale = clamp_scale(scale);
    }
}

pub fn clamp_scale(scale: f64) -> f64 {
    if scale.is_nan() {
        return DEFAULT_SCALE;
    }
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

/// Visible tile layers, in input order.
pub fn tile_transforms(layers: &[AssetLayer]) -> Vec<TileTransform> {
    layers.iter().filter_map(AssetLayer::tile_transform).collect()
}

pub fn parse_layers(json: &str) -> Result<Vec<AssetLayer>, serde_json::Error> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::{
        AssetKind, AssetLayer, MAX_SCALE, MIN_SCALE, TileTransform, clamp_scale, parse_layers,
        tile_transforms,
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn only_visible_tiles_are_selected() {
        let layers = vec![
            AssetLayer::tiles("a").with_transform(5.0, 2.0),
            AssetLayer::new("kml", AssetKind::Kml),
            AssetLayer::tiles("hidden").hidden(),
            AssetLayer::tiles("b"),
        ];

        assert_eq!(
            tile_transforms(&layers),
            vec![
                TileTransform::new("a", 5.0, 2.0),
                TileTransform::new("b", 0.0, 1.0),
            ]
        );
    }

    #[test]
    fn backend_rows_fill_defaults() {
        let json = r#"[
            {"id": "t1", "type": "TILES_3D", "name": "Bridge", "heightOffset": -3.5, "scale": 1.25},
            {"id": "p1", "type": "POINT_CLOUD", "visible": false, "status": "ready"},
            {"id": "t2", "type": "TILES_3D"}
        ]"#;
        let layers = parse_layers(json).unwrap();

        assert_eq!(layers[0].height_offset, -3.5);
        assert_eq!(layers[0].scale, 1.25);
        assert_eq!(layers[1].kind, AssetKind::PointCloud);
        assert!(!layers[1].visible);
        assert_eq!(layers[2].height_offset, 0.0);
        assert_eq!(layers[2].scale, 1.0);
        assert!(layers[2].visible);
    }

    #[test]
    fn kind_serializes_in_backend_spelling() {
        let json = serde_json::to_string(&AssetKind::Tiles3d).unwrap();
        assert_eq!(json, "\"TILES_3D\"");
    }

    #[test]
    fn commit_clamps_scale() {
        let mut layer = AssetLayer::tiles("t");
        layer.commit_transform(12.0, 0.0);
        assert_eq!(layer.scale, MIN_SCALE);
        layer.commit_transform(f64::INFINITY, -4.0);
        assert_eq!(layer.height_offset, 0.0);
        assert_eq!(layer.scale, MIN_SCALE);
        assert_eq!(clamp_scale(1e9), MAX_SCALE);
        assert_eq!(clamp_scale(f64::NAN), 1.0);
    }
}
