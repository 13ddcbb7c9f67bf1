//! Ordered attribute bags attached to element nodes.
//!
//! Containers never notify anything themselves: every mutating method
//! returns whether it actually changed the value, and the tree-level
//! wrappers in [`crate::Arch`] turn `true` into one change notification.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fmt;

const CLASS: &str = "class";
const STYLE: &str = "style";

/// Space-separated class tokens
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassName {
    tokens: IndexSet<String>,
}

impl ClassName {
    pub fn parse(class_names: &str) -> Self {
        Self {
            tokens: class_names.split_whitespace().map(str::to_string).collect(),
        }
    }

    pub fn add(&mut self, class_names: &str) -> bool {
        let mut changed = false;
        for class_name in class_names.split_whitespace() {
            changed |= self.tokens.insert(class_name.to_string());
        }
        changed
    }

    pub fn remove(&mut self, class_names: &str) -> bool {
        let mut changed = false;
        for class_name in class_names.split_whitespace() {
            changed |= self.tokens.shift_remove(class_name);
        }
        changed
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.tokens.contains(class_name)
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    /// Set equality, ignoring blacklisted class names
    pub fn is_equal(&self, other: &ClassName, options: &EqualityOptions) -> bool {
        let ignored = |name: &&String| !options.black_list_class_names.contains(*name);
        self.tokens.iter().filter(ignored).all(|name| other.tokens.contains(name))
            && other.tokens.iter().filter(ignored).all(|name| self.tokens.contains(name))
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sorted: Vec<&str> = self.iter().collect();
        sorted.sort_unstable();
        f.write_str(&sorted.join(" "))
    }
}

/// Inline style declarations, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    properties: IndexMap<String, String>,
}

impl Style {
    pub fn parse(style: &str) -> Self {
        let mut parsed = Self::default();
        for declaration in style.trim().split(';') {
            if let Some((name, value)) = declaration.split_once(':') {
                parsed.add(name.trim(), value.trim());
            }
        }
        parsed
    }

    pub fn add(&mut self, name: &str, value: &str) -> bool {
        if value.trim().is_empty() {
            return self.remove(name);
        }
        match self.properties.get(name) {
            Some(current) if current == value => false,
            _ => {
                self.properties.insert(name.to_string(), value.to_string());
                true
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.properties.shift_remove(name).is_some()
    }

    pub fn update<'a>(&mut self, declarations: impl IntoIterator<Item = (&'a str, &'a str)>) -> bool {
        let mut changed = false;
        for (name, value) in declarations {
            changed |= self.add(name, value);
        }
        changed
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn is_equal(&self, other: &Style) -> bool {
        self.properties.len() == other.properties.len()
            && self.iter().all(|(name, value)| other.get(name) == Some(value))
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, value) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{}:{}", name, value)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Plain(String),
    Class(ClassName),
    Style(Style),
}

impl AttrValue {
    pub fn is_empty(&self) -> bool {
        match self {
            AttrValue::Plain(value) => value.is_empty(),
            AttrValue::Class(class_name) => class_name.is_empty(),
            AttrValue::Style(style) => style.is_empty(),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Plain(value) => f.write_str(value),
            AttrValue::Class(class_name) => class_name.fmt(f),
            AttrValue::Style(style) => style.fmt(f),
        }
    }
}

/// Keys and classes ignored when comparing two attribute bags
#[derive(Debug, Clone, Default)]
pub struct EqualityOptions {
    pub black_list: Vec<String>,
    pub black_list_class_names: Vec<String>,
}

/// Attribute map keyed by insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    entries: IndexMap<String, AttrValue>,
}

impl Attributes {
    pub fn from_pairs<N: AsRef<str>, V: AsRef<str>>(pairs: impl IntoIterator<Item = (N, V)>) -> Self {
        let mut attributes = Self::default();
        for (name, value) in pairs {
            attributes.add(name.as_ref(), value.as_ref());
        }
        attributes
    }

    /// Upsert; an empty value removes the attribute
    pub fn add(&mut self, name: &str, value: &str) -> bool {
        let name = name.to_ascii_lowercase();
        let value = match name.as_str() {
            CLASS => AttrValue::Class(ClassName::parse(value)),
            STYLE => AttrValue::Style(Style::parse(value)),
            _ => AttrValue::Plain(value.to_string()),
        };
        if value.is_empty() {
            return self.remove(&name);
        }
        if self.entries.get(&name) == Some(&value) {
            return false;
        }
        self.entries.insert(name, value);
        true
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.entries.shift_remove(&name.to_ascii_lowercase()).is_some()
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.entries.is_empty();
        self.entries.clear();
        changed
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.entries.get(name)
    }

    /// Plain string value of an attribute (class and style rendered)
    pub fn value(&self, name: &str) -> Option<String> {
        self.entries.get(name).map(ToString::to_string)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn class_name(&self) -> Option<&ClassName> {
        match self.entries.get(CLASS) {
            Some(AttrValue::Class(class_name)) => Some(class_name),
            _ => None,
        }
    }

    pub fn has_class(&self, class_name: &str) -> bool {
        self.class_name().is_some_and(|c| c.contains(class_name))
    }

    pub fn style(&self) -> Option<&Style> {
        match self.entries.get(STYLE) {
            Some(AttrValue::Style(style)) => Some(style),
            _ => None,
        }
    }

    pub fn add_class(&mut self, class_names: &str) -> bool {
        match self.entries.get_mut(CLASS) {
            Some(AttrValue::Class(class_name)) => class_name.add(class_names),
            _ => self.add(CLASS, class_names),
        }
    }

    pub fn remove_class(&mut self, class_names: &str) -> bool {
        let changed = match self.entries.get_mut(CLASS) {
            Some(AttrValue::Class(class_name)) => class_name.remove(class_names),
            _ => false,
        };
        if changed && self.class_name().is_some_and(ClassName::is_empty) {
            self.entries.shift_remove(CLASS);
        }
        changed
    }

    pub fn set_style(&mut self, name: &str, value: &str) -> bool {
        match self.entries.get_mut(STYLE) {
            Some(AttrValue::Style(style)) => {
                let changed = style.add(name, value);
                if style.is_empty() {
                    self.entries.shift_remove(STYLE);
                }
                changed
            }
            _ => {
                let mut style = Style::default();
                if !style.add(name, value) {
                    return false;
                }
                self.entries.insert(STYLE.to_string(), AttrValue::Style(style));
                true
            }
        }
    }

    pub fn remove_style(&mut self, name: &str) -> bool {
        self.set_style(name, "")
    }

    /// Structural equality; decides whether two neighbours may merge
    pub fn is_equal(&self, other: &Attributes, options: &EqualityOptions) -> bool {
        let empty_class = ClassName::default();
        let keys = self.entries.keys().chain(other.entries.keys());
        for name in keys {
            if options.black_list.iter().any(|b| b == name) {
                continue;
            }
            let equal = match name.as_str() {
                CLASS => self
                    .class_name()
                    .unwrap_or(&empty_class)
                    .is_equal(other.class_name().unwrap_or(&empty_class), options),
                STYLE => match (self.style(), other.style()) {
                    (Some(a), Some(b)) => a.is_equal(b),
                    (None, None) => true,
                    _ => false,
                },
                _ => self.entries.get(name) == other.entries.get(name),
            };
            if !equal {
                return false;
            }
        }
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Ordered `(name, value)` list, skipping empty values
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect()
    }
}

impl fmt::Display for Attributes {
    /// HTML attribute string: `name="value" name2="value2"`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, value) in self.to_pairs() {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            write!(f, "{}=\"{}\"", name, escape_attribute(&value))?;
        }
        Ok(())
    }
}

pub(crate) fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_is_preserved() {
        let attributes = Attributes::from_pairs([("title", "t"), ("href", "/x"), ("id", "a")]);
        let names: Vec<_> = attributes.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["title", "href", "id"]);
        assert_eq!(attributes.to_string(), r#"title="t" href="/x" id="a""#);
    }

    #[test]
    fn test_add_reports_changes_only() {
        let mut attributes = Attributes::default();
        assert!(attributes.add("title", "a"));
        assert!(!attributes.add("title", "a"));
        assert!(attributes.add("title", "b"));
        // Empty value delegates to remove
        assert!(attributes.add("title", ""));
        assert!(!attributes.contains("title"));
        assert!(!attributes.remove("title"));
    }

    #[test]
    fn test_class_and_style_are_specialized() {
        let mut attributes = Attributes::from_pairs([
            ("class", "b  a"),
            ("style", "color: red; font-weight:bold"),
        ]);
        assert!(attributes.has_class("a"));
        assert_eq!(attributes.class_name().unwrap().to_string(), "a b");
        assert_eq!(attributes.style().unwrap().get("color"), Some("red"));
        assert_eq!(attributes.style().unwrap().to_string(), "color:red; font-weight:bold");

        assert!(!attributes.add_class("a"));
        assert!(attributes.add_class("c"));
        assert!(attributes.remove_class("a b c"));
        assert!(attributes.class_name().is_none());

        assert!(attributes.remove_style("color"));
        assert!(attributes.remove_style("font-weight"));
        assert!(attributes.style().is_none());
    }

    #[test]
    fn test_equality_ignores_order_and_blacklist() {
        let a = Attributes::from_pairs([("class", "x y"), ("title", "t")]);
        let b = Attributes::from_pairs([("title", "t"), ("class", "y x")]);
        assert!(a.is_equal(&b, &EqualityOptions::default()));

        let c = Attributes::from_pairs([("title", "t"), ("class", "y x o_selected")]);
        assert!(!a.is_equal(&c, &EqualityOptions::default()));
        let options = EqualityOptions {
            black_list_class_names: vec!["o_selected".to_string()],
            ..Default::default()
        };
        assert!(a.is_equal(&c, &options));

        let d = Attributes::from_pairs([("class", "x y"), ("title", "other")]);
        let options = EqualityOptions {
            black_list: vec!["title".to_string()],
            ..Default::default()
        };
        assert!(a.is_equal(&d, &options));
    }

    #[test]
    fn test_attribute_string_is_escaped() {
        let attributes = Attributes::from_pairs([("title", r#"say "hi" & go"#)]);
        assert_eq!(attributes.to_string(), r#"title="say &quot;hi&quot; &amp; go""#);
    }
}
