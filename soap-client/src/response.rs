//! Output arguments of an invoked action

use std::collections::HashMap;
use xmltree::{Element, XMLNode};

/// Output arguments of a UPnP action, keyed by argument name
///
/// Values are kept as sent on the wire; typed getters convert on access
/// and return `None` for missing or malformed values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionResponse {
    arguments: HashMap<String, String>,
}

impl ActionResponse {
    pub(crate) fn from_element(element: &Element) -> Self {
        let arguments = element
            .children
            .iter()
            .filter_map(|node| match node {
                XMLNode::Element(child) => Some((
                    child.name.clone(),
                    child
                        .get_text()
                        .map(|t| t.trim().to_string())
                        .unwrap_or_default(),
                )),
                _ => None,
            })
            .collect();
        Self { arguments }
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        self.arguments.get(name).map(String::as_str)
    }

    /// UPnP booleans travel as `1`/`0`, `true`/`false` or `yes`/`no`
    pub fn bool(&self, name: &str) -> Option<bool> {
        match self.string(name)?.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Some(true),
            "0" | "false" | "no" => Some(false),
            _ => None,
        }
    }

    pub fn u16(&self, name: &str) -> Option<u16> {
        self.string(name)?.parse().ok()
    }

    pub fn u32(&self, name: &str) -> Option<u32> {
        self.string(name)?.parse().ok()
    }

    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ActionResponse {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            arguments: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
