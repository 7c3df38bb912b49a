use std::collections::BTreeMap;

use serde::Serialize;

use crate::UploadResult;

/// Flat string parameters of one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|s| s.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Add a value if it is not empty
    pub fn add_non_empty<K: Into<String>>(&mut self, key: K, value: &str) {
        if !value.is_empty() {
            self.insert(key, value);
        }
    }

    /// Add a boolean only when it is true
    pub fn add_bool<K: Into<String>>(&mut self, key: K, value: bool) {
        if value {
            self.insert(key, "true");
        }
    }

    /// Add a number only when it is not zero
    pub fn add_non_zero<K: Into<String>, N: Into<i64>>(&mut self, key: K, value: N) {
        let value = value.into();
        if value != 0 {
            self.insert(key, value.to_string());
        }
    }

    pub fn add_optional<K: Into<String>, T: ToString>(&mut self, key: K, value: Option<T>) {
        if let Some(value) = value {
            self.insert(key, value.to_string());
        }
    }

    /// JSON-encode a structured value. `null` is skipped.
    pub fn add_interface<K, T>(&mut self, key: K, value: &T) -> UploadResult<()>
    where
        K: Into<String>,
        T: Serialize + ?Sized,
    {
        let encoded = serde_json::to_string(value)?;
        if encoded != "null" {
            self.insert(key, encoded);
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl IntoIterator for Params {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
