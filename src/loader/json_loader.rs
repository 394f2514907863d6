//! JSON tilesets (.tsj) lowered into the same element shape as a `<tileset>`.

use crate::document::Element;
use crate::error::MapError;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::path::Path;

#[derive(Deserialize)]
struct JsonTileset {
    #[serde(default)]
    name: String,
    tilewidth: u32,
    tileheight: u32,
    tilecount: u32,
    columns: u32,
    #[serde(default)]
    spacing: u32,
    #[serde(default)]
    margin: u32,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    imagewidth: Option<u32>,
    #[serde(default)]
    imageheight: Option<u32>,
    #[serde(default)]
    transparentcolor: Option<String>,
    #[serde(default)]
    tileoffset: Option<JsonTileOffset>,
    #[serde(default)]
    terrains: Vec<JsonTerrain>,
    #[serde(default)]
    tiles: Vec<JsonTile>,
    #[serde(default)]
    properties: Vec<JsonProperty>,
}

#[derive(Deserialize)]
struct JsonTileOffset {
    x: i32,
    y: i32,
}

#[derive(Deserialize)]
struct JsonTerrain {
    name: String,
    tile: i64,
    #[serde(default)]
    properties: Vec<JsonProperty>,
}

#[derive(Deserialize)]
struct JsonTile {
    id: u32,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    class: Option<String>,
    #[serde(default)]
    probability: Option<f64>,
    #[serde(default)]
    terrain: Option<Vec<i64>>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    imagewidth: Option<u32>,
    #[serde(default)]
    imageheight: Option<u32>,
    #[serde(default)]
    animation: Vec<JsonFrame>,
    #[serde(default)]
    objectgroup: Option<JsonObjectGroup>,
    #[serde(default)]
    properties: Vec<JsonProperty>,
}

#[derive(Deserialize)]
struct JsonFrame {
    tileid: u32,
    duration: u32,
}

#[derive(Deserialize, Default)]
struct JsonObjectGroup {
    #[serde(default)]
    name: String,
    #[serde(default)]
    objects: Vec<JsonObject>,
}

#[derive(Deserialize)]
struct JsonObject {
    #[serde(default)]
    id: u32,
    #[serde(default)]
    name: String,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    class: String,
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
    #[serde(default)]
    width: f32,
    #[serde(default)]
    height: f32,
    #[serde(default)]
    rotation: f32,
    #[serde(default = "default_true")]
    visible: bool,
    #[serde(default)]
    point: bool,
    #[serde(default)]
    ellipse: bool,
    #[serde(default)]
    polygon: Vec<JsonObjectPoint>,
    #[serde(default)]
    polyline: Vec<JsonObjectPoint>,
    #[serde(default)]
    gid: Option<u32>,
    #[serde(default)]
    properties: Vec<JsonProperty>,
}

#[derive(Deserialize)]
struct JsonObjectPoint {
    x: f32,
    y: f32,
}

#[derive(Deserialize)]
struct JsonProperty {
    name: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    value: JsonValue,
}

fn default_true() -> bool {
    true
}

/// Parse a JSON tileset document into a `<tileset>` element tree.
pub fn parse_json_tileset(txt: &str, path: &Path) -> Result<Element, MapError> {
    let ts: JsonTileset = serde_json::from_str(txt).map_err(|source| MapError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(tileset_to_element(ts))
}

fn tileset_to_element(ts: JsonTileset) -> Element {
    let mut out = Element::new("tileset")
        .with_attr("name", ts.name)
        .with_attr("tilewidth", ts.tilewidth)
        .with_attr("tileheight", ts.tileheight)
        .with_attr("spacing", ts.spacing)
        .with_attr("margin", ts.margin)
        .with_attr("columns", ts.columns)
        .with_attr("tilecount", ts.tilecount);

    if let Some(offset) = ts.tileoffset {
        out.children.push(
            Element::new("tileoffset")
                .with_attr("x", offset.x)
                .with_attr("y", offset.y),
        );
    }

    if let Some(source) = ts.image {
        let mut image = image_element(source, ts.imagewidth, ts.imageheight);
        if let Some(trans) = ts.transparentcolor {
            image.set_attr("trans", trans);
        }
        out.children.push(image);
    }

    if !ts.terrains.is_empty() {
        let mut types = Element::new("terraintypes");
        for t in ts.terrains {
            let mut terrain = Element::new("terrain")
                .with_attr("name", t.name)
                .with_attr("tile", t.tile);
            push_properties(&mut terrain, t.properties);
            types.children.push(terrain);
        }
        out.children.push(types);
    }

    for tile in ts.tiles {
        out.children.push(tile_to_element(tile));
    }

    push_properties(&mut out, ts.properties);
    out
}

fn tile_to_element(tile: JsonTile) -> Element {
    let mut out = Element::new("tile").with_attr("id", tile.id);

    if let Some(class) = tile.class {
        out.set_attr("class", class);
    }
    if let Some(kind) = tile.kind {
        out.set_attr("type", kind);
    }
    if let Some(p) = tile.probability {
        out.set_attr("probability", p);
    }
    if let Some(corners) = tile.terrain {
        // JSON marks an absent corner with -1, TMX with an empty field
        let joined = corners
            .iter()
            .map(|&c| if c < 0 { String::new() } else { c.to_string() })
            .collect::<Vec<_>>()
            .join(",");
        out.set_attr("terrain", joined);
    }
    if let Some(source) = tile.image {
        out.children
            .push(image_element(source, tile.imagewidth, tile.imageheight));
    }
    if let Some(group) = tile.objectgroup {
        out.children.push(object_group_to_element(group));
    }
    if !tile.animation.is_empty() {
        let mut anim = Element::new("animation");
        for f in tile.animation {
            anim.children.push(
                Element::new("frame")
                    .with_attr("tileid", f.tileid)
                    .with_attr("duration", f.duration),
            );
        }
        out.children.push(anim);
    }
    push_properties(&mut out, tile.properties);
    out
}

fn image_element(source: String, width: Option<u32>, height: Option<u32>) -> Element {
    let mut image = Element::new("image").with_attr("source", source);
    if let Some(w) = width {
        image.set_attr("width", w);
    }
    if let Some(h) = height {
        image.set_attr("height", h);
    }
    image
}

fn object_group_to_element(group: JsonObjectGroup) -> Element {
    let mut out = Element::new("objectgroup").with_attr("name", group.name);
    for obj in group.objects {
        out.children.push(object_to_element(obj));
    }
    out
}

fn object_to_element(obj: JsonObject) -> Element {
    let mut out = Element::new("object")
        .with_attr("id", obj.id)
        .with_attr("name", obj.name)
        .with_attr("x", obj.x)
        .with_attr("y", obj.y)
        .with_attr("width", obj.width)
        .with_attr("height", obj.height)
        .with_attr("rotation", obj.rotation)
        .with_attr("visible", if obj.visible { 1 } else { 0 });

    if !obj.class.is_empty() {
        out.set_attr("class", obj.class);
    }
    if !obj.kind.is_empty() {
        out.set_attr("type", obj.kind);
    }
    if let Some(gid) = obj.gid {
        out.set_attr("gid", gid);
    }

    if obj.point {
        out.children.push(Element::new("point"));
    } else if obj.ellipse {
        out.children.push(Element::new("ellipse"));
    } else if !obj.polygon.is_empty() {
        out.children
            .push(Element::new("polygon").with_attr("points", points_attr(&obj.polygon)));
    } else if !obj.polyline.is_empty() {
        out.children
            .push(Element::new("polyline").with_attr("points", points_attr(&obj.polyline)));
    }

    push_properties(&mut out, obj.properties);
    out
}

fn points_attr(points: &[JsonObjectPoint]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn push_properties(parent: &mut Element, props: Vec<JsonProperty>) {
    if props.is_empty() {
        return;
    }
    let mut out = Element::new("properties");
    for p in props {
        out.children.push(property_to_element(p.name, p.kind, p.value));
    }
    parent.children.push(out);
}

fn property_to_element(name: String, kind: Option<String>, value: JsonValue) -> Element {
    let mut out = Element::new("property").with_attr("name", name);

    // Class values are objects of member values; everything else is scalar.
    if let JsonValue::Object(members) = value {
        out.set_attr("type", kind.unwrap_or_else(|| "class".to_owned()));
        let mut nested = Element::new("properties");
        for (member, v) in members {
            nested.children.push(property_to_element(member, None, v));
        }
        out.children.push(nested);
        return out;
    }

    let inferred = match &value {
        JsonValue::Bool(_) => Some("bool"),
        JsonValue::Number(n) if n.is_i64() || n.is_u64() => Some("int"),
        JsonValue::Number(_) => Some("float"),
        _ => None,
    };
    if let Some(kind) = kind.as_deref().or(inferred) {
        out.set_attr("type", kind);
    }

    let text = match value {
        JsonValue::String(s) => s,
        JsonValue::Null => String::new(),
        other => other.to_string(),
    };
    out.set_attr("value", text);
    out
}
