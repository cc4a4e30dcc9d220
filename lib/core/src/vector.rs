use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

/// Embedding vector of a phrase
///
/// Persisted as base64 over the raw native-endian `f32` bytes, so a
/// decode of an encode yields the exact same bits (NaN payloads and
/// signed zeros included).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Embedding {
    data: Vec<f32>,
}

impl Embedding {
    #[inline]
    #[must_use]
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    #[inline]
    #[must_use]
    pub fn from_slice(data: &[f32]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    #[must_use]
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Raw bytes, 4 per element, native endian
    pub fn to_bytes(&self) -> Vec<u8> {
        self.data.iter().flat_map(|x| x.to_ne_bytes()).collect()
    }

    /// View raw bytes as `byte_len / 4` elements
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() % 4 != 0 {
            return Err(Error::InvalidEmbeddingLength { len: bytes.len() });
        }
        let data = bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();
        Ok(Self { data })
    }

    /// Base64 text of the raw bytes
    pub fn encode(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    pub fn decode(text: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(text.trim())
            .map_err(|e| Error::InvalidEmbedding(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Bitwise comparison; unlike `==`, NaN equals an identical NaN.
    pub fn bit_eq(&self, other: &Embedding) -> bool {
        self.dim() == other.dim()
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(data: Vec<f32>) -> Self {
        Self::new(data)
    }
}

impl Serialize for Embedding {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for Embedding {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Embedding::decode(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_roundtrip_exact() {
        let v = Embedding::new(vec![0.25, -0.5, 1.0]);
        let decoded = Embedding::decode(&v.encode()).unwrap();
        assert_eq!(decoded.as_slice(), &[0.25, -0.5, 1.0]);
        assert!(decoded.bit_eq(&v));
    }

    #[test]
    fn test_roundtrip_special_values() {
        let v = Embedding::new(vec![f32::NAN, -0.0, f32::INFINITY, f32::MIN_POSITIVE / 2.0]);
        let decoded = Embedding::decode(&v.encode()).unwrap();
        assert!(decoded.bit_eq(&v));
        assert_eq!(decoded.as_slice()[1].to_bits(), (-0.0f32).to_bits());
    }

    #[test]
    fn test_roundtrip_random_vectors() {
        let mut rng = rand::rng();
        for dim in [0usize, 1, 7, 384] {
            let v = Embedding::new((0..dim).map(|_| rng.random_range(-1.0f32..1.0f32)).collect());
            assert!(Embedding::decode(&v.encode()).unwrap().bit_eq(&v));
        }
    }

    #[test]
    fn test_slice_and_vec_access() {
        let data = [0.5f32, -0.0, 2.0];
        let v = Embedding::from_slice(&data);
        assert_eq!(v.dim(), 3);
        assert_eq!(v.to_bytes().len(), 12);
        let back = v.into_vec();
        assert_eq!(back, data.to_vec());
        assert!(back[1].is_sign_negative());
        assert!(Embedding::from_slice(&[]).is_empty());
    }

    #[test]
    fn test_rejects_partial_elements() {
        let text = STANDARD.encode([1u8, 2, 3, 4, 5]);
        assert_eq!(
            Embedding::decode(&text),
            Err(Error::InvalidEmbeddingLength { len: 5 })
        );
        assert!(matches!(
            Embedding::decode("not base64!"),
            Err(Error::InvalidEmbedding(_))
        ));
    }

    #[test]
    fn test_serde_as_string() {
        let v = Embedding::new(vec![1.0]);
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, format!("\"{}\"", v.encode()));
        let parsed: Embedding = serde_json::from_str(&json).unwrap();
        assert!(parsed.bit_eq(&v));
    }
}
