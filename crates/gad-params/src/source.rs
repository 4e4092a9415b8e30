//! Ordered key/value input.

use serde::{Deserialize, Serialize};

/// An ordered list of `(KEY, value)` pairs.
///
/// Keys are case-insensitive. Cross-section samples travel as `CH<i>` and
/// `RL<i>` pairs numbered from 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSource {
    entries: Vec<(String, f64)>,
}

impl ParameterSource {
    /// Empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a key/value pair.
    pub fn push(&mut self, key: impl AsRef<str>, value: f64) {
        self.entries
            .push((key.as_ref().trim().to_ascii_uppercase(), value));
    }

    /// Builder form of [`ParameterSource::push`].
    pub fn with(mut self, key: impl AsRef<str>, value: f64) -> Self {
        self.push(key, value);
        self
    }

    /// Append the next cross-section sample as `CH<n>`/`RL<n>`.
    pub fn push_sample(&mut self, chainage: f64, level: f64) {
        let n = self.sample_count() + 1;
        self.push(format!("CH{n}"), chainage);
        self.push(format!("RL{n}"), level);
    }

    /// Replace the value of `key`, or append it when absent.
    pub fn set(&mut self, key: impl AsRef<str>, value: f64) {
        let key = key.as_ref().trim().to_ascii_uppercase();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Remove every entry for `key`.
    pub fn remove(&mut self, key: impl AsRef<str>) {
        let key = key.as_ref().trim().to_ascii_uppercase();
        self.entries.retain(|(k, _)| *k != key);
    }

    /// Last value given for `key`.
    pub fn get(&self, key: &str) -> Option<f64> {
        let key = key.to_ascii_uppercase();
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }

    /// Entries in input order.
    pub fn entries(&self) -> &[(String, f64)] {
        &self.entries
    }

    /// Entries other than cross-section samples.
    pub fn scalar_entries(&self) -> impl Iterator<Item = &(String, f64)> {
        self.entries.iter().filter(|(k, _)| sample_key(k).is_none())
    }

    /// Number of `CH<i>` keys present.
    pub fn sample_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| sample_key(k).is_some_and(|(kind, _)| kind == SampleKey::Chainage))
            .count()
    }
}

impl<K: AsRef<str>> FromIterator<(K, f64)> for ParameterSource {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut source = Self::new();
        for (k, v) in iter {
            source.push(k, v);
        }
        source
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SampleKey {
    Chainage,
    Level,
}

/// Split `CH12` / `RL12` into its kind and sample number.
pub(crate) fn sample_key(key: &str) -> Option<(SampleKey, usize)> {
    let (kind, digits) = if let Some(rest) = key.strip_prefix("CH") {
        (SampleKey::Chainage, rest)
    } else if let Some(rest) = key.strip_prefix("RL") {
        (SampleKey::Level, rest)
    } else {
        return None;
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // Too many digits for usize still names a sample; it is rejected as out
    // of range when loading.
    Some((kind, digits.parse().unwrap_or(usize::MAX)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_normalised() {
        let src = ParameterSource::new().with(" scale1 ", 100.0);
        assert_eq!(src.get("SCALE1"), Some(100.0));
        assert_eq!(src.entries()[0].0, "SCALE1");
    }

    #[test]
    fn test_push_sample_numbers_from_one() {
        let mut src = ParameterSource::new();
        src.push_sample(0.0, 100.5);
        src.push_sample(5.0, 100.2);
        assert_eq!(src.get("CH2"), Some(5.0));
        assert_eq!(src.get("RL1"), Some(100.5));
        assert_eq!(src.sample_count(), 2);
    }

    #[test]
    fn test_sample_key_parsing() {
        assert_eq!(sample_key("CH3"), Some((SampleKey::Chainage, 3)));
        assert_eq!(sample_key("RL10"), Some((SampleKey::Level, 10)));
        assert_eq!(sample_key("RTL"), None);
        assert_eq!(sample_key("CH"), None);
        assert_eq!(sample_key("CHX1"), None);
        assert_eq!(sample_key("CH01"), Some((SampleKey::Chainage, 1)));
        assert_eq!(
            sample_key("RL123456789012345678901234567890"),
            Some((SampleKey::Level, usize::MAX))
        );
    }

    #[test]
    fn test_scalar_entries_skip_samples() {
        let mut src = ParameterSource::new().with("RTL", 105.0);
        src.push_sample(0.0, 100.5);
        let keys: Vec<_> = src.scalar_entries().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["RTL"]);
    }

    #[test]
    fn test_set_replaces() {
        let mut src = ParameterSource::new().with("SKEW", 0.0);
        src.set("skew", 15.0);
        assert_eq!(src.entries().len(), 1);
        assert_eq!(src.get("SKEW"), Some(15.0));
        src.remove("SKEW");
        assert_eq!(src.get("SKEW"), None);
    }
}
