// ── Composite identity codec ──
//
// Multi-field natural keys ((user, vhost), (name, vhost), …) are
// carried across sessions as a single delimiter-joined token. The
// delimiter is reserved: encoding rejects key fields containing it,
// which keeps every token unambiguously reversible.

use crate::error::ReconcileError;
use crate::kind::ResourceKind;

/// Token delimiter. Not a legal character inside any managed key field.
pub const DELIMITER: char = '@';

/// Join natural-key fields into an import token.
///
/// Fails with `ConfigurationInvalid` if any field is empty or contains
/// the delimiter; a token built from such fields could not be decoded
/// back to the same fields.
pub fn encode(kind: ResourceKind, parts: &[&str]) -> Result<String, ReconcileError> {
    for part in parts {
        if part.is_empty() {
            return Err(ReconcileError::ConfigurationInvalid {
                kind,
                key: parts.join("+"),
                message: "natural key field is empty".into(),
            });
        }
        if part.contains(DELIMITER) {
            return Err(ReconcileError::ConfigurationInvalid {
                kind,
                key: parts.join("+"),
                message: format!("natural key field {part:?} contains reserved delimiter {DELIMITER:?}"),
            });
        }
    }
    Ok(parts.join(&DELIMITER.to_string()))
}

/// Split an import token back into its natural-key fields.
///
/// Fails with `MalformedIdentifier` unless the token splits into
/// exactly `kind.key_parts()` non-empty fields. Truncated or
/// partially-empty tokens are rejected outright, never guessed at.
pub fn decode(kind: ResourceKind, token: &str) -> Result<Vec<String>, ReconcileError> {
    let parts: Vec<&str> = token.split(DELIMITER).collect();
    if parts.len() != kind.key_parts() || parts.iter().any(|p| p.is_empty()) {
        return Err(ReconcileError::MalformedIdentifier {
            kind,
            expected: kind.import_format(),
            got: token.to_owned(),
        });
    }
    Ok(parts.into_iter().map(str::to_owned).collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ReconcileError;

    #[test]
    fn roundtrip_two_parts() {
        let token = encode(ResourceKind::Permission, &["svc", "staging"]).unwrap();
        assert_eq!(token, "svc@staging");
        let parts = decode(ResourceKind::Permission, &token).unwrap();
        assert_eq!(parts, vec!["svc", "staging"]);
    }

    #[test]
    fn roundtrip_three_parts() {
        let token = encode(ResourceKind::TopicPermission, &["svc", "/", "events"]).unwrap();
        let parts = decode(ResourceKind::TopicPermission, &token).unwrap();
        assert_eq!(parts, vec!["svc", "/", "events"]);
    }

    #[test]
    fn decode_rejects_wrong_part_count() {
        let err = decode(ResourceKind::TopicPermission, "a@b").unwrap_err();
        match err {
            ReconcileError::MalformedIdentifier { expected, got, .. } => {
                assert_eq!(expected, "user@vhost@exchange");
                assert_eq!(got, "a@b");
            }
            other => panic!("expected MalformedIdentifier, got {other}"),
        }
    }

    #[test]
    fn decode_rejects_empty_middle_part() {
        // "a@@c" has three parts but an empty one in the middle.
        assert!(matches!(
            decode(ResourceKind::TopicPermission, "a@@c"),
            Err(ReconcileError::MalformedIdentifier { .. })
        ));
    }

    #[test]
    fn decode_rejects_trailing_empty_part() {
        assert!(matches!(
            decode(ResourceKind::Permission, "svc@"),
            Err(ReconcileError::MalformedIdentifier { .. })
        ));
    }

    #[test]
    fn encode_rejects_delimiter_in_field() {
        assert!(matches!(
            encode(ResourceKind::Permission, &["user@host", "staging"]),
            Err(ReconcileError::ConfigurationInvalid { .. })
        ));
    }

    #[test]
    fn encode_rejects_empty_field() {
        assert!(matches!(
            encode(ResourceKind::Exchange, &["", "staging"]),
            Err(ReconcileError::ConfigurationInvalid { .. })
        ));
    }
}
