use crate::color::parse_color;
use crate::document::Element;
use crate::error::MapError;
use macroquad::color::Color;
use std::collections::HashMap;

/// A single custom property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// `bool`
    Bool(bool),
    /// `int`
    I64(i64),
    /// `float`
    F32(f32),
    /// `string`, the default type.
    String(String),
    /// `color`
    Color(Color),
    /// `file`, a path as written.
    File(String),
    /// Object reference by id; 0 means none.
    Object(u32),
    /// `class`: nested members.
    Class(Properties),
}

/// Custom properties keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    values: HashMap<String, PropertyValue>,
}

impl Properties {
    /// An empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the `<properties>` child of `parent`, empty if there is none.
    pub fn from_parent(parent: &Element) -> Result<Self, MapError> {
        match parent.child("properties") {
            Some(props) => Self::from_element(props),
            None => Ok(Self::new()),
        }
    }

    /// Read a `<properties>` element.
    pub fn from_element(props: &Element) -> Result<Self, MapError> {
        let mut out = Properties::new();
        for p in props.children_named("property") {
            let name = p.required_str("name")?.to_owned();
            let value = property_value(&name, p)?;
            out.insert(name, value);
        }
        Ok(out)
    }

    /// Set a property, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: PropertyValue) {
        self.values.insert(name.into(), value);
    }

    /// Raw value by name.
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.values.get(name)
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no properties.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Name/value pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// A `bool` property.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            PropertyValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// An `int` property.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            PropertyValue::I64(v) => Some(*v),
            PropertyValue::Object(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    /// An `int` property that fits in `i32`.
    pub fn get_i32(&self, name: &str) -> Option<i32> {
        self.get_i64(name).and_then(|v| i32::try_from(v).ok())
    }

    /// A `float` property; `int` values widen.
    pub fn get_f32(&self, name: &str) -> Option<f32> {
        match self.get(name)? {
            PropertyValue::F32(v) => Some(*v),
            _ => None,
        }
    }

    /// A `string` or `file` property.
    pub fn get_string(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            PropertyValue::String(v) | PropertyValue::File(v) => Some(v),
            _ => None,
        }
    }

    /// A `color` property.
    pub fn get_color(&self, name: &str) -> Option<Color> {
        match self.get(name)? {
            PropertyValue::Color(v) => Some(*v),
            _ => None,
        }
    }

    /// A `class` property's members.
    pub fn get_class(&self, name: &str) -> Option<&Properties> {
        match self.get(name)? {
            PropertyValue::Class(v) => Some(v),
            _ => None,
        }
    }
}

fn property_value(name: &str, p: &Element) -> Result<PropertyValue, MapError> {
    // Multi-line strings are written as element text instead of `value`.
    let raw = p.attr("value").unwrap_or_else(|| p.text());
    let invalid = || p.invalid("value", raw);

    let value = match p.attr("type").unwrap_or("string") {
        "string" => PropertyValue::String(raw.to_owned()),
        "file" => PropertyValue::File(raw.to_owned()),
        "bool" => match raw.trim() {
            "true" | "1" => PropertyValue::Bool(true),
            "false" | "0" => PropertyValue::Bool(false),
            _ => return Err(invalid()),
        },
        "int" => PropertyValue::I64(raw.trim().parse().map_err(|_| invalid())?),
        "float" => PropertyValue::F32(raw.trim().parse().map_err(|_| invalid())?),
        "object" => {
            PropertyValue::Object(if raw.trim().is_empty() {
                0
            } else {
                raw.trim().parse().map_err(|_| invalid())?
            })
        }
        "color" => {
            // Tiled writes an unset color as an empty string.
            if raw.trim().is_empty() {
                PropertyValue::Color(Color::from_rgba(0, 0, 0, 0))
            } else {
                PropertyValue::Color(parse_color(raw).ok_or_else(invalid)?)
            }
        }
        "class" => PropertyValue::Class(Properties::from_parent(p)?),
        other => {
            return Err(MapError::UnsupportedPropertyType {
                name: name.to_owned(),
                kind: other.to_owned(),
            })
        }
    };
    Ok(value)
}
