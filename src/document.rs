use crate::error::MapError;
use std::str::FromStr;

/// One node of a parsed TMX/TSX document.
///
/// Attributes keep document order. `text` holds the concatenated character
/// data directly inside this element (trimmed), which is where CSV and
/// base64 tile data live.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    /// Tag name.
    pub name: String,
    /// Attributes in document order.
    pub attributes: Vec<(String, String)>,
    /// Child elements in document order.
    pub children: Vec<Element>,
    /// Trimmed character data.
    pub text: String,
}

impl Element {
    /// An empty element named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder helper, mostly for tests and the JSON lowering.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Builder helper appending a child.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Builder helper setting the character data.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set or replace an attribute.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        let value = value.to_string();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Raw attribute value.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether `key` is present.
    pub fn has_attr(&self, key: &str) -> bool {
        self.attr(key).is_some()
    }

    /// Parse an optional attribute. Absent is `Ok(None)`, present but
    /// unparsable is an error.
    pub fn parse_attr<T: FromStr>(&self, key: &str) -> Result<Option<T>, MapError> {
        match self.attr(key) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|_| self.invalid(key, raw)),
        }
    }

    /// Parse an optional attribute, falling back to `default`.
    pub fn attr_or<T: FromStr>(&self, key: &str, default: T) -> Result<T, MapError> {
        Ok(self.parse_attr(key)?.unwrap_or(default))
    }

    /// Parse an attribute that must be present.
    pub fn required_attr<T: FromStr>(&self, key: &str) -> Result<T, MapError> {
        self.parse_attr(key)?.ok_or_else(|| self.missing(key))
    }

    /// A required attribute read verbatim. Names and paths go through here
    /// so their whitespace survives.
    pub fn required_str(&self, key: &str) -> Result<&str, MapError> {
        self.attr(key).ok_or_else(|| self.missing(key))
    }

    /// Tiled writes booleans as `0`/`1`; `true`/`false` shows up in
    /// hand-written files.
    pub fn bool_attr(&self, key: &str, default: bool) -> Result<bool, MapError> {
        match self.attr(key).map(str::trim) {
            None => Ok(default),
            Some("1") | Some("true") => Ok(true),
            Some("0") | Some("false") => Ok(false),
            Some(other) => Err(self.invalid(key, other)),
        }
    }

    /// First child named `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// First child named `name`, or `MissingElement`.
    pub fn required_child(&self, name: &str) -> Result<&Element, MapError> {
        self.child(name).ok_or_else(|| MapError::MissingElement {
            parent: self.name.clone(),
            child: name.to_owned(),
        })
    }

    /// Every child named `name`, in order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Character data inside this element.
    pub fn text(&self) -> &str {
        &self.text
    }

    fn missing(&self, key: &str) -> MapError {
        MapError::MissingAttribute {
            element: self.name.clone(),
            attribute: key.to_owned(),
        }
    }

    pub(crate) fn invalid(&self, key: &str, value: &str) -> MapError {
        MapError::InvalidAttribute {
            element: self.name.clone(),
            attribute: key.to_owned(),
            value: value.to_owned(),
        }
    }
}
