//! Serde model of the Tiled JSON map format (`.tmj` maps, `.tsj` tilesets).
//!
//! Only what the simulation needs is modelled: tile layers (nested in groups or not),
//! tileset tile classes and their custom properties. See
//! <https://doc.mapeditor.org/en/stable/reference/json-map-format/>.

use crate::{WorldError, WorldErrorExt};
use base64::{Engine as _, engine::general_purpose};
use serde::Deserialize;
use serde_json::Value;
use sim_domain::tile::TileProperties;
use std::collections::HashMap;
use std::path::Path;

/// Horizontal, vertical, diagonal and 120-degree hex rotation flags.
const FLIP_FLAGS: u32 = 0xF000_0000;

/// Strips the flip/rotation bits Tiled stores in the top of a gid.
#[must_use]
pub const fn clear_flip_flags(gid: u32) -> u32 {
    gid & !FLIP_FLAGS
}

#[derive(Debug, Clone, Deserialize)]
pub struct TiledMap {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub infinite: bool,
    #[serde(default)]
    pub orientation: String,
    #[serde(default)]
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub tilesets: Vec<TilesetRef>,
}

impl TiledMap {
    /// All tile layers in draw order, with groups flattened.
    #[must_use]
    pub fn tile_layers(&self) -> Vec<&TileLayer> {
        fn walk<'a>(layers: &'a [Layer], out: &mut Vec<&'a TileLayer>) {
            for layer in layers {
                match layer {
                    Layer::Tiles(tiles) => out.push(tiles),
                    Layer::Group(group) => walk(&group.layers, out),
                    Layer::Other => {},
                }
            }
        }

        let mut out = Vec::new();
        walk(&self.layers, &mut out);
        out
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Layer {
    #[serde(rename = "tilelayer")]
    Tiles(TileLayer),
    Group(GroupLayer),
    /// Object and image layers carry nothing the simulation uses.
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupLayer {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub layers: Vec<Layer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TileLayer {
    #[serde(default)]
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub data: Option<LayerData>,
    pub encoding: Option<String>,
    pub compression: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LayerData {
    Gids(Vec<u32>),
    Encoded(String),
}

impl TileLayer {
    /// Row-major gids of this layer, exactly `width * height` of them.
    ///
    /// # Errors
    /// [`WorldError::Unsupported`] for compressed data, [`WorldError::Base64`] for bad
    /// encodings and [`WorldError::InvalidMap`] when the cell count is off.
    pub fn gids(&self) -> Result<Vec<u32>, WorldError> {
        let gids = match &self.data {
            None => {
                return Err(WorldError::InvalidMap { message: "tile layer has no data".into(), context: None });
            },
            Some(LayerData::Gids(gids)) => gids.clone(),
            Some(LayerData::Encoded(encoded)) => self.decode(encoded)?,
        };

        let expected = u64::from(self.width) * u64::from(self.height);
        if gids.len() as u64 != expected {
            return Err(WorldError::InvalidMap {
                message: format!("expected {expected} cells, found {}", gids.len()).into(),
                context: None,
            });
        }
        Ok(gids)
    }

    fn decode(&self, encoded: &str) -> Result<Vec<u32>, WorldError> {
        if let Some(compression) = self.compression.as_deref().filter(|c| !c.is_empty()) {
            return Err(WorldError::Unsupported {
                message: format!("{compression} compressed layer data").into(),
                context: None,
            });
        }
        if self.encoding.as_deref() != Some("base64") {
            return Err(WorldError::InvalidMap {
                message: "string layer data must be base64 encoded".into(),
                context: None,
            });
        }

        let bytes = general_purpose::STANDARD.decode(encoded.trim()).context("layer data")?;
        if bytes.len() % 4 != 0 {
            return Err(WorldError::InvalidMap {
                message: format!("{} bytes of layer data is not a whole number of gids", bytes.len())
                    .into(),
                context: None,
            });
        }
        Ok(bytes
            .chunks_exact(4)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TilesetRef {
    External {
        firstgid: u32,
        source: String,
    },
    Embedded {
        firstgid: u32,
        #[serde(flatten)]
        tileset: Tileset,
    },
}

impl TilesetRef {
    #[must_use]
    pub const fn firstgid(&self) -> u32 {
        match self {
            Self::External { firstgid, .. } | Self::Embedded { firstgid, .. } => *firstgid,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Tileset {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tiles: Vec<TileDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TileDef {
    pub id: u32,
    /// `class` since Tiled 1.9, `type` before that.
    #[serde(default, alias = "type")]
    pub class: Option<String>,
    #[serde(default)]
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(default)]
    pub value: Value,
}

impl TileDef {
    /// Custom properties win over the tile's own class.
    #[must_use]
    pub fn tile_properties(&self) -> TileProperties {
        let lookup = |name: &str| self.properties.iter().find(|p| p.name == name).map(|p| &p.value);

        let class = lookup("class")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .or_else(|| self.class.clone().filter(|c| !c.is_empty()));
        let traversable = lookup("traversable").and_then(Value::as_bool).unwrap_or(false);
        let traversal_cost =
            lookup("traversal_cost").and_then(Value::as_u64).and_then(|c| u32::try_from(c).ok());

        TileProperties { class, traversable, traversal_cost }
    }
}

/// Gid to tile property lookup across every tileset of a map.
#[derive(Debug, Default)]
pub struct TilesetTable {
    /// Sorted by first gid.
    entries: Vec<(u32, HashMap<u32, TileProperties>)>,
}

impl TilesetTable {
    /// Resolves embedded and external tilesets; external sources are relative to `base_dir`.
    ///
    /// # Errors
    /// Fails when an external tileset cannot be read or parsed, or is in XML format.
    pub fn resolve(refs: &[TilesetRef], base_dir: &Path) -> Result<Self, WorldError> {
        let mut entries = Vec::with_capacity(refs.len());
        for tileset_ref in refs {
            let tileset = match tileset_ref {
                TilesetRef::Embedded { tileset, .. } => tileset.clone(),
                TilesetRef::External { source, .. } => load_external(&base_dir.join(source))?,
            };
            let tiles = tileset.tiles.iter().map(|t| (t.id, t.tile_properties())).collect();
            entries.push((tileset_ref.firstgid(), tiles));
        }
        entries.sort_by_key(|(firstgid, _)| *firstgid);
        Ok(Self { entries })
    }

    /// Properties for `gid` (flip flags are ignored), if its tileset defines the tile.
    #[must_use]
    pub fn lookup(&self, gid: u32) -> Option<&TileProperties> {
        let gid = clear_flip_flags(gid);
        let (firstgid, tiles) = self.entries.iter().rev().find(|(firstgid, _)| *firstgid <= gid)?;
        tiles.get(&(gid - firstgid))
    }
}

fn load_external(path: &Path) -> Result<Tileset, WorldError> {
    if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("tsx")) {
        return Err(WorldError::Unsupported {
            message: format!("XML tileset {}; export it as .tsj", path.display()).into(),
            context: None,
        });
    }
    let raw = std::fs::read_to_string(path).context(format!("reading tileset {}", path.display()))?;
    serde_json::from_str(&raw).context(format!("parsing tileset {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn layer(data: Value, extra: &Value) -> TileLayer {
        let mut raw = json!({ "type": "tilelayer", "name": "ground", "width": 2, "height": 1, "data": data });
        if let (Some(obj), Some(extra)) = (raw.as_object_mut(), extra.as_object()) {
            obj.extend(extra.clone());
        }
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn flip_flags_are_stripped() {
        assert_eq!(clear_flip_flags(0x8000_0003), 3);
        assert_eq!(clear_flip_flags(0x1000_0007), 7);
        assert_eq!(clear_flip_flags(5), 5);
    }

    #[test]
    fn array_data_is_read_as_is() {
        let l = layer(json!([1, 0]), &json!({}));
        assert_eq!(l.gids().unwrap(), vec![1, 0]);
    }

    #[test]
    fn base64_data_is_little_endian() {
        // gids [1, 0x80000002]
        let encoded = general_purpose::STANDARD.encode([1, 0, 0, 0, 2, 0, 0, 0x80]);
        let l = layer(json!(encoded), &json!({ "encoding": "base64" }));
        assert_eq!(l.gids().unwrap(), vec![1, 0x8000_0002]);
    }

    #[test]
    fn compressed_data_is_unsupported() {
        let l = layer(json!("eJxjYGBgAAAABAAB"), &json!({ "encoding": "base64", "compression": "zlib" }));
        assert!(matches!(l.gids(), Err(WorldError::Unsupported { .. })));
    }

    #[test]
    fn cell_count_must_match() {
        let l = layer(json!([1, 2, 3]), &json!({}));
        assert!(matches!(l.gids(), Err(WorldError::InvalidMap { .. })));
    }

    #[test]
    fn groups_are_flattened_and_objects_ignored() {
        let map: TiledMap = serde_json::from_value(json!({
            "width": 1, "height": 1,
            "layers": [
                { "type": "tilelayer", "name": "a", "width": 1, "height": 1, "data": [1] },
                { "type": "objectgroup", "name": "spawns", "objects": [] },
                { "type": "group", "name": "g", "layers": [
                    { "type": "tilelayer", "name": "b", "width": 1, "height": 1, "data": [2] }
                ]}
            ],
            "tilesets": []
        }))
        .unwrap();
        let names: Vec<_> = map.tile_layers().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn properties_prefer_custom_class() {
        let def: TileDef = serde_json::from_value(json!({
            "id": 4,
            "type": "grass",
            "properties": [
                { "name": "class", "type": "string", "value": "forest" },
                { "name": "traversable", "type": "bool", "value": true },
                { "name": "traversal_cost", "type": "int", "value": 3 }
            ]
        }))
        .unwrap();
        let props = def.tile_properties();
        assert_eq!(props.class.as_deref(), Some("forest"));
        assert!(props.traversable);
        assert_eq!(props.traversal_cost, Some(3));

        let bare: TileDef = serde_json::from_value(json!({ "id": 0, "class": "desert" })).unwrap();
        assert_eq!(bare.tile_properties().class.as_deref(), Some("desert"));
        assert!(!bare.tile_properties().traversable);
    }

    #[test]
    fn lookup_picks_the_owning_tileset() {
        let refs: Vec<TilesetRef> = serde_json::from_value(json!([
            { "firstgid": 1, "name": "terrain", "tiles": [{ "id": 0, "class": "grass" }] },
            { "firstgid": 10, "name": "buildings", "tiles": [{ "id": 2, "class": "house" }] }
        ]))
        .unwrap();
        let table = TilesetTable::resolve(&refs, Path::new(".")).unwrap();
        assert_eq!(table.lookup(1).and_then(|p| p.class.as_deref()), Some("grass"));
        assert_eq!(table.lookup(0x4000_000C).and_then(|p| p.class.as_deref()), Some("house"));
        assert!(table.lookup(5).is_none());
        assert!(table.lookup(0).is_none());
    }

    #[test]
    fn xml_tilesets_are_unsupported() {
        let refs = vec![TilesetRef::External { firstgid: 1, source: "terrain.tsx".to_owned() }];
        assert!(matches!(
            TilesetTable::resolve(&refs, Path::new(".")),
            Err(WorldError::Unsupported { .. })
        ));
    }
}
