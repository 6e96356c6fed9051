//! Extension type registry.

use std::fmt;

use crate::{BoxError, Encoder, PackValue, RegistryError};

/// Highest extension tag an application may register.
pub const MAX_EXTENSION_TAG: u8 = 127;

/// Tag reserved for [`PackValue::BigInt`]. Encoding a bigint fails with
/// `MissingExtension` unless an entry is registered under this tag.
pub const BIGINT_TAG: u8 = 120;

type CheckFn = dyn Fn(&PackValue) -> bool;
type EncodeFn = dyn Fn(&PackValue, &Encoder) -> Result<Vec<u8>, BoxError>;

/// One registered extension: a tag, a predicate and a payload encoder.
pub struct ExtensionEntry {
    tag: u8,
    check: Box<CheckFn>,
    encode: Box<EncodeFn>,
}

impl ExtensionEntry {
    pub fn tag(&self) -> u8 {
        self.tag
    }

    pub fn matches(&self, value: &PackValue) -> bool {
        (self.check)(value)
    }

    /// Produces the extension payload. The callback gets the encoder so it
    /// can encode nested values with [`Encoder::encode`].
    pub fn encode(&self, value: &PackValue, encoder: &Encoder) -> Result<Vec<u8>, BoxError> {
        (self.encode)(value, encoder)
    }
}

impl fmt::Debug for ExtensionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionEntry")
            .field("tag", &self.tag)
            .finish_non_exhaustive()
    }
}

/// Ordered table of extensions, scanned in registration order.
///
/// When several predicates accept the same value, the entry registered
/// first wins.
#[derive(Debug, Default)]
pub struct ExtensionRegistry {
    entries: Vec<ExtensionEntry>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an extension. Tags must be in `0..=127` and unique.
    pub fn register<C, E>(&mut self, tag: u8, check: C, encode: E) -> Result<(), RegistryError>
    where
        C: Fn(&PackValue) -> bool + 'static,
        E: Fn(&PackValue, &Encoder) -> Result<Vec<u8>, BoxError> + 'static,
    {
        if tag > MAX_EXTENSION_TAG {
            return Err(RegistryError::InvalidTag(tag));
        }
        if self.get(tag).is_some() {
            return Err(RegistryError::DuplicateTag(tag));
        }
        self.entries.push(ExtensionEntry {
            tag,
            check: Box::new(check),
            encode: Box::new(encode),
        });
        Ok(())
    }

    /// Builder form of [`ExtensionRegistry::register`].
    pub fn with<C, E>(mut self, tag: u8, check: C, encode: E) -> Result<Self, RegistryError>
    where
        C: Fn(&PackValue) -> bool + 'static,
        E: Fn(&PackValue, &Encoder) -> Result<Vec<u8>, BoxError> + 'static,
    {
        self.register(tag, check, encode)?;
        Ok(self)
    }

    pub fn get(&self, tag: u8) -> Option<&ExtensionEntry> {
        self.entries.iter().find(|entry| entry.tag == tag)
    }

    /// First entry, in registration order, whose predicate accepts `value`.
    pub fn find(&self, value: &PackValue) -> Option<&ExtensionEntry> {
        self.entries.iter().find(|entry| entry.matches(value))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExtensionEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn always(_: &PackValue) -> bool {
        true
    }

    fn payload(byte: u8) -> impl Fn(&PackValue, &Encoder) -> Result<Vec<u8>, BoxError> {
        move |_, _| Ok(vec![byte])
    }

    #[test]
    fn rejects_tags_above_127() {
        let mut registry = ExtensionRegistry::new();
        assert_eq!(
            registry.register(128, always, payload(0)),
            Err(RegistryError::InvalidTag(128))
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn rejects_duplicate_tags() {
        let mut registry = ExtensionRegistry::new();
        registry.register(1, always, payload(0)).unwrap();
        assert_eq!(
            registry.register(1, always, payload(1)),
            Err(RegistryError::DuplicateTag(1))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn find_is_first_match_in_registration_order() {
        let registry = ExtensionRegistry::new()
            .with(9, always, payload(9))
            .unwrap()
            .with(2, always, payload(2))
            .unwrap();
        let entry = registry.find(&PackValue::Null).unwrap();
        assert_eq!(entry.tag(), 9);
        let tags: Vec<u8> = registry.iter().map(ExtensionEntry::tag).collect();
        assert_eq!(tags, [9, 2]);
    }

    #[test]
    fn find_skips_non_matching_entries() {
        let registry = ExtensionRegistry::new()
            .with(1, |v| matches!(v, PackValue::Bool(_)), payload(1))
            .unwrap()
            .with(2, |v| matches!(v, PackValue::Null), payload(2))
            .unwrap();
        assert_eq!(registry.find(&PackValue::Null).map(ExtensionEntry::tag), Some(2));
        assert!(registry.find(&PackValue::Undefined).is_none());
    }

    #[test]
    fn get_by_tag() {
        let registry = ExtensionRegistry::new()
            .with(BIGINT_TAG, always, payload(0))
            .unwrap();
        assert!(registry.get(BIGINT_TAG).is_some());
        assert!(registry.get(0).is_none());
    }
}
