use super::{Body, BodyError};
use bytes::Bytes;
use http::HeaderValue;
use std::fmt;

/// An opaque byte payload with no content type of its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Raw(Bytes);

impl Raw {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self(data.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Bytes> for Raw {
    fn from(data: Bytes) -> Self {
        Self(data)
    }
}

impl From<Vec<u8>> for Raw {
    fn from(data: Vec<u8>) -> Self {
        Self(data.into())
    }
}

impl From<String> for Raw {
    fn from(data: String) -> Self {
        Self(data.into())
    }
}

impl From<&'static str> for Raw {
    fn from(data: &'static str) -> Self {
        Self(Bytes::from_static(data.as_bytes()))
    }
}

/// Valid UTF-8 prints as text, anything else as lowercase hex.
impl fmt::Display for Raw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.0) {
            Ok(text) => f.write_str(text),
            Err(_) => {
                for byte in &self.0 {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
        }
    }
}

impl Body for Raw {
    fn content_type(&self) -> Option<HeaderValue> {
        None
    }

    fn to_bytes(&self) -> Result<Bytes, BodyError> {
        Ok(self.0.clone())
    }
}
