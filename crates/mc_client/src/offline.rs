use md5::{Digest, Md5};
use mc_protocol::Uuid;

const OFFLINE_PLAYER_NAMESPACE: &str = "OfflinePlayer:";

/// Derives the offline-mode player UUID: Java's `UUID.nameUUIDFromBytes`
/// over `OfflinePlayer:<username>`, i.e. an MD5 digest of that string with
/// the version nibble forced to 3 and the variant bits forced to the IETF
/// layout. There is no namespace UUID involved, despite "version 3" usually
/// implying one -- vanilla hashes the name bytes directly.
pub fn offline_uuid(username: &str) -> Uuid {
    let name = format!("{OFFLINE_PLAYER_NAMESPACE}{username}");

    let mut hasher = Md5::new();
    hasher.update(name.as_bytes());
    let mut digest: [u8; 16] = hasher.finalize().into();

    digest[6] &= 0x0f;
    digest[6] |= 0x30;
    digest[8] &= 0x3f;
    digest[8] |= 0x80;

    Uuid::from_bytes(digest)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn is_deterministic() {
        assert_eq!(offline_uuid("Notch"), offline_uuid("Notch"));
    }

    #[test]
    fn differs_by_username() {
        assert_ne!(offline_uuid("Notch"), offline_uuid("jeb_"));
    }

    #[test]
    fn is_a_version_3_uuid() {
        let uuid = offline_uuid("Notch");
        assert_eq!(uuid.get_version_num(), 3);
    }

    #[test]
    fn matches_md5_of_the_namespaced_name() {
        // MD5("OfflinePlayer:Notch") with the version/variant nibbles forced,
        // computed independently of this module.
        assert_eq!(
            offline_uuid("Notch").to_string(),
            "b50ad385-829d-3141-a216-7e7d7539ba7f"
        );
    }
}
