//! The site content document and its fill-defaults pass.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::validation::{MissingField, check_required_fields};

/// Top-level sections every normalized document carries.
pub const SECTIONS: [&str; 10] = [
    "brand",
    "contact",
    "social",
    "hero",
    "services",
    "solutions",
    "projects",
    "about",
    "testimonials",
    "footer",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("site document must be a JSON object")]
    NotAnObject,
    #[error("field path is empty")]
    EmptyPath,
    #[error("`{0}` is not an object")]
    NotAnObjectAt(String),
    #[error("`{0}` is not a list")]
    NotAListAt(String),
    #[error("index {index} is out of range for `{path}` ({len} items)")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },
    #[error("`{0}` has no item template")]
    NoTemplate(String),
}

/// The single JSON object holding all editable site content.
///
/// Only `brand.name` and the contact fields are required; every other key,
/// known or not, is carried as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteDocument(Map<String, Value>);

#[derive(Default, Serialize)]
struct Brand {
    name: String,
    tagline: String,
}

#[derive(Default, Serialize)]
struct Contact {
    phone: String,
    email: String,
    address: String,
}

#[derive(Default, Serialize)]
struct Social {
    facebook: String,
    instagram: String,
    whatsapp: String,
    x: String,
}

#[derive(Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct Hero {
    title: String,
    subtitle: String,
    cta_primary: String,
    cta_secondary: String,
    hero_image: String,
}

#[derive(Default, Serialize)]
struct About {
    text: String,
    stats: Vec<Value>,
}

#[derive(Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct Footer {
    copyright_text: String,
}

fn empty<T: Default + Serialize>() -> Value {
    serde_json::to_value(T::default()).unwrap_or_default()
}

fn empty_list() -> Value {
    Value::Array(Vec::new())
}

fn fill(map: &mut Map<String, Value>, key: &str, make: impl FnOnce() -> Value) {
    if matches!(map.get(key), None | Some(Value::Null)) {
        map.insert(key.to_string(), make());
    }
}

impl SiteDocument {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(DocumentError::NotAnObject),
        }
    }

    /// Fills every absent or `null` section with its empty default.
    ///
    /// Sections holding any other value are left alone, so running this
    /// twice changes nothing the second time.
    pub fn normalize(&mut self) {
        let map = &mut self.0;
        fill(map, "brand", empty::<Brand>);
        fill(map, "contact", empty::<Contact>);
        fill(map, "social", empty::<Social>);
        fill(map, "hero", empty::<Hero>);
        fill(map, "services", empty_list);
        fill(map, "solutions", empty_list);
        fill(map, "projects", empty_list);
        fill(map, "about", empty::<About>);
        if let Some(Value::Object(about)) = map.get_mut("about") {
            fill(about, "stats", empty_list);
        }
        fill(map, "testimonials", empty_list);
        fill(map, "footer", empty::<Footer>);
    }

    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    pub fn check_required_fields(&self) -> Result<(), MissingField> {
        check_required_fields(&self.0)
    }

    /// String value at a dotted path such as `contact.email` or
    /// `services.0.title`.
    pub fn text(&self, path: &str) -> Option<&str> {
        let mut parts = path.split('.');
        let mut current = self.0.get(parts.next()?)?;
        for part in parts {
            current = match current {
                Value::Object(map) => map.get(part)?,
                Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        current.as_str()
    }

    /// Sets a string at a dotted path, creating missing intermediate objects.
    ///
    /// Numeric segments index into lists; they never grow one.
    pub fn set_text(&mut self, path: &str, value: &str) -> Result<(), DocumentError> {
        let parts = split_path(path)?;
        let (leaf, parents) = parts.split_last().ok_or(DocumentError::EmptyPath)?;
        let value = Value::String(value.to_string());

        let Some((first, rest)) = parents.split_first() else {
            self.0.insert(leaf.to_string(), value);
            return Ok(());
        };

        let mut current = object_slot(&mut self.0, first);
        for (depth, part) in rest.iter().enumerate() {
            let at = &parents[..=depth];
            current = match current {
                Value::Object(map) => object_slot(map, part),
                Value::Array(items) => item_mut(items, part, at)?,
                _ => return Err(DocumentError::NotAnObjectAt(at.join("."))),
            };
        }

        match current {
            Value::Object(map) => {
                map.insert(leaf.to_string(), value);
            }
            Value::Array(items) => *item_mut(items, leaf, parents)? = value,
            _ => return Err(DocumentError::NotAnObjectAt(parents.join("."))),
        }
        Ok(())
    }

    /// The list at `path`. Nothing is created on the way.
    fn list_mut(&mut self, path: &str) -> Result<&mut Vec<Value>, DocumentError> {
        let parts = split_path(path)?;
        let not_a_list = || DocumentError::NotAListAt(path.to_string());

        let mut current = self.0.get_mut(parts[0]).ok_or_else(not_a_list)?;
        for (depth, part) in parts.iter().enumerate().skip(1) {
            current = match current {
                Value::Object(map) => map.get_mut(*part).ok_or_else(not_a_list)?,
                Value::Array(items) => item_mut(items, part, &parts[..depth])?,
                _ => return Err(not_a_list()),
            };
        }
        match current {
            Value::Array(items) => Ok(items),
            _ => Err(not_a_list()),
        }
    }

    /// Appends `item` to the list at `path` and returns its index.
    pub fn push_item(&mut self, path: &str, item: Value) -> Result<usize, DocumentError> {
        let items = self.list_mut(path)?;
        items.push(item);
        Ok(items.len() - 1)
    }

    /// Appends the blank item the editor offers for `path`, e.g. a new
    /// service or a new project stack tag.
    pub fn add_item(&mut self, path: &str) -> Result<usize, DocumentError> {
        let item = item_template(path).ok_or_else(|| DocumentError::NoTemplate(path.to_string()))?;
        self.push_item(path, item)
    }

    pub fn remove_item(&mut self, path: &str, index: usize) -> Result<Value, DocumentError> {
        let items = self.list_mut(path)?;
        check_index(items, path, index)?;
        Ok(items.remove(index))
    }

    /// Moves the item at `from` so it ends up at `to`, shifting the rest.
    pub fn move_item(&mut self, path: &str, from: usize, to: usize) -> Result<(), DocumentError> {
        let items = self.list_mut(path)?;
        check_index(items, path, from)?;
        check_index(items, path, to)?;
        let item = items.remove(from);
        items.insert(to, item);
        Ok(())
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.0)
    }

    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.0)
    }
}

fn split_path(path: &str) -> Result<Vec<&str>, DocumentError> {
    let parts: Vec<&str> = path.split('.').collect();
    if parts.iter().any(|part| part.is_empty()) {
        return Err(DocumentError::EmptyPath);
    }
    Ok(parts)
}

/// Entry under `key`, turning absent and `null` into an empty object.
fn object_slot<'a>(map: &'a mut Map<String, Value>, key: &str) -> &'a mut Value {
    let slot = map.entry(key.to_string()).or_insert(Value::Null);
    if slot.is_null() {
        *slot = Value::Object(Map::new());
    }
    slot
}

fn check_index(items: &[Value], path: &str, index: usize) -> Result<(), DocumentError> {
    if index < items.len() {
        Ok(())
    } else {
        Err(DocumentError::IndexOutOfRange {
            path: path.to_string(),
            index,
            len: items.len(),
        })
    }
}

/// Existing list item addressed by a numeric segment; `at` is the list's path.
fn item_mut<'a>(
    items: &'a mut [Value],
    part: &str,
    at: &[&str],
) -> Result<&'a mut Value, DocumentError> {
    let path = at.join(".");
    let index = part
        .parse::<usize>()
        .map_err(|_| DocumentError::NotAnObjectAt(path.clone()))?;
    check_index(items, &path, index)?;
    Ok(&mut items[index])
}

fn is_index(part: &str) -> bool {
    part.parse::<usize>().is_ok()
}

fn item_template(path: &str) -> Option<Value> {
    let parts: Vec<&str> = path.split('.').collect();
    let item = match parts.as_slice() {
        ["services"] => json!({"title": "New Service", "description": ""}),
        ["solutions"] => json!({"title": "New Solution", "bullets": ["Bullet 1"]}),
        ["solutions", index, "bullets"] if is_index(index) => json!("New bullet"),
        ["projects"] => json!({
            "title": "New Project",
            "outcome": "",
            "stack": ["Tag"],
            "image": ""
        }),
        ["projects", index, "stack"] if is_index(index) => json!("New Tag"),
        ["about", "stats"] => json!({"label": "New Stat", "value": "0"}),
        ["testimonials"] => json!({"name": "New Client", "role": "Role", "message": ""}),
        _ => return None,
    };
    Some(item)
}

impl TryFrom<Value> for SiteDocument {
    type Error = DocumentError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}
