//! Rendered metrics payload.

use bytes::Bytes;

/// One fully rendered metrics export.
///
/// The payload is opaque: nothing in the exporter interprets or validates it.
/// Backed by `Bytes`, so cloning shares the buffer instead of copying it and
/// a published snapshot can never be mutated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot(Bytes);

impl Snapshot {
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self(body.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl From<String> for Snapshot {
    fn from(s: String) -> Self {
        Self(Bytes::from(s))
    }
}

impl From<&'static str> for Snapshot {
    fn from(s: &'static str) -> Self {
        Self(Bytes::from_static(s.as_bytes()))
    }
}

impl From<Vec<u8>> for Snapshot {
    fn from(v: Vec<u8>) -> Self {
        Self(Bytes::from(v))
    }
}
