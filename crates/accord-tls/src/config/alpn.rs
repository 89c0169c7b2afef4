//! ALPN protocol-name wire encoding.
//!
//! Each protocol name is encoded as a one-byte length prefix followed
//! by its raw UTF-8 bytes, in preference order. Decoding is the exact
//! inverse and is total for any previously encoded value.

use accord_types::ConfigError;

/// Validate a protocol name: non-empty and short enough for the
/// single-byte length prefix.
pub fn validate_protocol(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() || name.len() > 255 {
        return Err(ConfigError::InvalidApplicationProtocol(name.to_string()));
    }
    Ok(())
}

/// Encode an ordered protocol-name list into ALPN wire format.
pub fn encode(protocols: &[String]) -> Result<Vec<u8>, ConfigError> {
    let mut out = Vec::with_capacity(protocols.iter().map(|p| p.len() + 1).sum());
    for name in protocols {
        validate_protocol(name)?;
        out.push(name.len() as u8);
        out.extend_from_slice(name.as_bytes());
    }
    Ok(out)
}

/// Decode ALPN wire format back into the ordered protocol-name list.
///
/// Fails only on truncated input or non-UTF-8 names, neither of which
/// a previous `encode` can produce.
pub fn decode(mut wire: &[u8]) -> Result<Vec<String>, ConfigError> {
    let mut out = Vec::new();
    while let Some((&len, rest)) = wire.split_first() {
        let len = len as usize;
        if len == 0 || rest.len() < len {
            return Err(ConfigError::InvalidApplicationProtocol(format!(
                "truncated record: length {len}, {} bytes remaining",
                rest.len()
            )));
        }
        let name = std::str::from_utf8(&rest[..len]).map_err(|_| {
            ConfigError::InvalidApplicationProtocol("non-UTF-8 protocol name".to_string())
        })?;
        out.push(name.to_string());
        wire = &rest[len..];
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_single() {
        let wire = encode(&["h2".to_string()]).unwrap();
        assert_eq!(wire, vec![2, b'h', b'2']);
    }

    #[test]
    fn test_encode_preserves_order() {
        let protos = vec!["h2".to_string(), "http/1.1".to_string()];
        let wire = encode(&protos).unwrap();
        let mut expected = vec![2u8];
        expected.extend_from_slice(b"h2");
        expected.push(8);
        expected.extend_from_slice(b"http/1.1");
        assert_eq!(wire, expected);
    }

    #[test]
    fn test_round_trip() {
        let protos = vec![
            "h2".to_string(),
            "http/1.1".to_string(),
            "spdy/3.1".to_string(),
        ];
        let wire = encode(&protos).unwrap();
        assert_eq!(decode(&wire).unwrap(), protos);
    }

    #[test]
    fn test_round_trip_max_length_name() {
        let long = "p".repeat(255);
        let protos = vec![long.clone(), "h2".to_string()];
        let wire = encode(&protos).unwrap();
        assert_eq!(wire.len(), 256 + 3);
        assert_eq!(decode(&wire).unwrap(), protos);
    }

    #[test]
    fn test_empty_list() {
        let wire = encode(&[]).unwrap();
        assert!(wire.is_empty());
        assert!(decode(&wire).unwrap().is_empty());
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(encode(&[String::new()]).is_err());
    }

    #[test]
    fn test_overlong_name_rejected() {
        let too_long = "p".repeat(256);
        let err = encode(&[too_long]).unwrap_err();
        assert!(format!("{err}").contains("1..=255"));
    }

    #[test]
    fn test_decode_truncated() {
        // Length byte claims 5, only 2 bytes follow.
        assert!(decode(&[5, b'h', b'2']).is_err());
    }

    #[test]
    fn test_decode_zero_length_record() {
        assert!(decode(&[0]).is_err());
    }
}
