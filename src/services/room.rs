//! Room identifiers and shareable links

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, TimerError};

const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const GENERATED_LEN: usize = 6;
const MAX_LEN: usize = 64;

/// Opaque room token
///
/// Generated ids are short and not collision-checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Random six character base-36 token
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let id = (0..GENERATED_LEN)
            .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
            .collect();
        Self(id)
    }

    /// Validate a caller-supplied token
    ///
    /// Only ASCII letters, digits, `-` and `_` are accepted so the id can
    /// never step outside its store path.
    pub fn parse(raw: &str) -> Result<Self> {
        let valid = !raw.is_empty()
            && raw.len() <= MAX_LEN
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(TimerError::InvalidRoom(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Participant entry point: the public URL with `room` as its only query
pub fn participant_url(public_url: &Url, room: &RoomId) -> Url {
    let mut url = public_url.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.query_pairs_mut().append_pair("room", room.as_str());
    url
}

/// URL of a square QR code image encoding `target`
pub fn qr_image_url(endpoint: &Url, target: &Url, size: u32) -> Url {
    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .append_pair("size", &format!("{size}x{size}"))
        .append_pair("data", target.as_str());
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_short_base36() {
        for _ in 0..100 {
            let id = RoomId::generate();
            assert_eq!(id.as_str().len(), GENERATED_LEN);
            assert!(id
                .as_str()
                .bytes()
                .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase()));
            assert!(RoomId::parse(id.as_str()).is_ok());
        }
    }

    #[test]
    fn parse_rejects_path_characters() {
        assert!(RoomId::parse("").is_err());
        assert!(RoomId::parse("../etc").is_err());
        assert!(RoomId::parse("a/b").is_err());
        assert!(RoomId::parse("room?x=1").is_err());
        assert!(RoomId::parse(&"a".repeat(65)).is_err());
        assert!(RoomId::parse("Team_A-1").is_ok());
    }

    #[test]
    fn participant_url_replaces_query() {
        let public = Url::parse("https://timer.example.com/app?room=old#top").unwrap();
        let room = RoomId::parse("k3x9zq").unwrap();
        assert_eq!(
            participant_url(&public, &room).as_str(),
            "https://timer.example.com/app?room=k3x9zq"
        );
    }

    #[test]
    fn qr_url_encodes_participant_link() {
        let endpoint = Url::parse("https://api.qrserver.com/v1/create-qr-code/").unwrap();
        let target = Url::parse("http://localhost:20553/?room=abc").unwrap();
        assert_eq!(
            qr_image_url(&endpoint, &target, 180).as_str(),
            "https://api.qrserver.com/v1/create-qr-code/?size=180x180&data=http%3A%2F%2Flocalhost%3A20553%2F%3Froom%3Dabc"
        );
    }
}
