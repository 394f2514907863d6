use crate::color::color_attr;
use crate::document::Element;
use crate::error::MapError;
use crate::gid::decode_gid;
use crate::layer::LayerHeader;
use crate::properties::Properties;
use macroquad::color::Color;
use macroquad::math::{vec2, Vec2};

/// Geometry of a map object.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectShape {
    /// Plain rectangle, the default.
    Rectangle,
    /// Ellipse inscribed in the object's bounds.
    Ellipse,
    /// Single point at the object's position.
    Point,
    /// Points relative to the object's position.
    Polygon(Vec<Vec2>),
    /// Open path; points relative to the object's position.
    Polyline(Vec<Vec2>),
    /// Text object with its content.
    Text(String),
    /// Tile object; the gid is stored without flip flags.
    #[allow(missing_docs)]
    Tile {
        gid: u32,
        flip_h: bool,
        flip_v: bool,
        flip_d: bool,
    },
}

/// An `<object>`.
#[derive(Debug, Clone, PartialEq)]
pub struct MapObject {
    /// Unique object id.
    pub id: u32,
    /// Object name, empty if unset.
    pub name: String,
    /// `class`, or the legacy `type` attribute.
    pub class: String,
    /// X position in pixels.
    pub x: f32,
    /// Y position in pixels.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Rotation in degrees, clockwise.
    pub rotation: f32,
    /// Whether the object is shown.
    pub visible: bool,
    /// Geometry.
    pub shape: ObjectShape,
    /// Custom properties.
    pub properties: Properties,
}

impl MapObject {
    /// Read an `<object>` element.
    pub fn from_element(e: &Element) -> Result<Self, MapError> {
        let shape = if let Some(raw) = e.parse_attr::<u32>("gid")? {
            let (gid, flip_h, flip_v, flip_d) = decode_gid(raw);
            ObjectShape::Tile {
                gid,
                flip_h,
                flip_v,
                flip_d,
            }
        } else if e.child("point").is_some() {
            ObjectShape::Point
        } else if e.child("ellipse").is_some() {
            ObjectShape::Ellipse
        } else if let Some(p) = e.child("polygon") {
            ObjectShape::Polygon(parse_points(p)?)
        } else if let Some(p) = e.child("polyline") {
            ObjectShape::Polyline(parse_points(p)?)
        } else if let Some(t) = e.child("text") {
            ObjectShape::Text(t.text().to_owned())
        } else {
            ObjectShape::Rectangle
        };

        let class = e
            .attr("class")
            .or_else(|| e.attr("type"))
            .unwrap_or_default()
            .to_owned();

        Ok(MapObject {
            id: e.attr_or("id", 0)?,
            name: e.attr("name").unwrap_or_default().to_owned(),
            class,
            x: e.attr_or("x", 0.0)?,
            y: e.attr_or("y", 0.0)?,
            width: e.attr_or("width", 0.0)?,
            height: e.attr_or("height", 0.0)?,
            rotation: e.attr_or("rotation", 0.0)?,
            visible: e.bool_attr("visible", true)?,
            shape,
            properties: Properties::from_parent(e)?,
        })
    }

    /// `(x, y)` as a vector.
    pub fn position(&self) -> Vec2 {
        vec2(self.x, self.y)
    }
}

/// `points="0,0 16,0 16,16"`
fn parse_points(e: &Element) -> Result<Vec<Vec2>, MapError> {
    let raw = e.attr("points").unwrap_or_default();
    raw.split_whitespace()
        .map(|pair| {
            let (x, y) = pair.split_once(',').ok_or_else(|| e.invalid("points", raw))?;
            let x: f32 = x.parse().map_err(|_| e.invalid("points", raw))?;
            let y: f32 = y.parse().map_err(|_| e.invalid("points", raw))?;
            Ok(vec2(x, y))
        })
        .collect()
}

/// An `<objectgroup>`, either a map layer or a tile's collision shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectLayer {
    /// Shared layer attributes.
    pub header: LayerHeader,
    /// Editor display color.
    pub color: Option<Color>,
    /// `topdown` (default) or `index`.
    pub draw_order: String,
    /// Objects in document order.
    pub objects: Vec<MapObject>,
}

impl ObjectLayer {
    /// Read an `<objectgroup>` element.
    pub fn from_element(e: &Element) -> Result<Self, MapError> {
        Ok(ObjectLayer {
            header: LayerHeader::from_element(e)?,
            color: color_attr(e, "color")?,
            draw_order: e.attr("draworder").unwrap_or("topdown").to_owned(),
            objects: e
                .children_named("object")
                .map(MapObject::from_element)
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    /// First object named `name`.
    pub fn object_by_name(&self, name: &str) -> Option<&MapObject> {
        self.objects.iter().find(|o| o.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::xml_loader::parse_xml;

    #[test]
    fn object_shapes() {
        let xml = r##"<objectgroup name="spawns" color="#a0a0a4">
  <object id="1" name="box" type="spawn" x="1" y="2" width="3" height="4">
    <properties><property name="kind" value="player"/></properties>
  </object>
  <object id="2" x="0" y="0"><point/></object>
  <object id="3"><ellipse/></object>
  <object id="4" x="5" y="5"><polygon points="0,0 16,0 16,16"/></object>
  <object id="5"><polyline points="0,0 -4.5,2"/></object>
  <object id="6" class="sign" type="old"><text wrap="1">Hello</text></object>
  <object id="7" gid="2147483651" visible="0"/>
</objectgroup>"##;
        let layer = ObjectLayer::from_element(&parse_xml(xml).unwrap()).unwrap();
        assert_eq!(layer.header.name, "spawns");
        assert_eq!(layer.draw_order, "topdown");
        assert!(layer.color.is_some());
        assert_eq!(layer.objects.len(), 7);

        let boxed = layer.object_by_name("box").unwrap();
        assert_eq!(boxed.shape, ObjectShape::Rectangle);
        assert_eq!(boxed.class, "spawn");
        assert_eq!(boxed.position(), vec2(1.0, 2.0));
        assert_eq!(boxed.properties.get_string("kind"), Some("player"));

        let shapes: Vec<_> = layer.objects.iter().map(|o| o.shape.clone()).collect();
        assert_eq!(shapes[1], ObjectShape::Point);
        assert_eq!(shapes[2], ObjectShape::Ellipse);
        assert_eq!(
            shapes[3],
            ObjectShape::Polygon(vec![vec2(0.0, 0.0), vec2(16.0, 0.0), vec2(16.0, 16.0)])
        );
        assert_eq!(
            shapes[4],
            ObjectShape::Polyline(vec![vec2(0.0, 0.0), vec2(-4.5, 2.0)])
        );
        assert_eq!(shapes[5], ObjectShape::Text("Hello".into()));
        assert_eq!(layer.objects[5].class, "sign");
        assert_eq!(
            shapes[6],
            ObjectShape::Tile {
                gid: 3,
                flip_h: true,
                flip_v: false,
                flip_d: false
            }
        );
        assert!(!layer.objects[6].visible);
    }

    #[test]
    fn malformed_points_are_rejected() {
        let e = Element::new("object")
            .with_child(Element::new("polygon").with_attr("points", "0,0 1"));
        assert!(matches!(
            MapObject::from_element(&e),
            Err(MapError::InvalidAttribute { .. })
        ));
    }
}
