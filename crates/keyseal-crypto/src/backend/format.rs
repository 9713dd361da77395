//! Payload layout shared by the backends
//!
//! ```text
//! CBC+HMAC: [0x01][16 IV][ciphertext][tag]
//! GCM:      [0x02][12 nonce][ciphertext][16 tag]
//! ```

use crate::error::{CryptoError, CryptoResult};
use crate::{IV_SIZE, NONCE_SIZE, TAG_SIZE};

pub(crate) const CBC_HMAC_VERSION: u8 = 0x01;
pub(crate) const GCM_VERSION: u8 = 0x02;

const AES_BLOCK_SIZE: usize = 16;

/// Borrowed view of a CBC+HMAC payload
pub(crate) struct CbcPayload<'a> {
    pub iv: &'a [u8],
    pub ciphertext: &'a [u8],
    pub tag: &'a [u8],
}

/// Split a CBC+HMAC payload. Only the structure is checked here; the tag is
/// verified by the caller.
pub(crate) fn parse_cbc(payload: &[u8], tag_len: usize) -> CryptoResult<CbcPayload<'_>> {
    let rest = strip_version(payload, CBC_HMAC_VERSION)?;
    // At least one padded block is always present.
    if rest.len() < IV_SIZE + AES_BLOCK_SIZE + tag_len {
        return Err(CryptoError::MalformedInput("payload too short"));
    }
    let (iv, rest) = rest.split_at(IV_SIZE);
    let (ciphertext, tag) = rest.split_at(rest.len() - tag_len);
    if ciphertext.len() % AES_BLOCK_SIZE != 0 {
        return Err(CryptoError::MalformedInput("ciphertext is not block aligned"));
    }
    Ok(CbcPayload {
        iv,
        ciphertext,
        tag,
    })
}

/// Bytes covered by the HMAC:
/// `version || IV || ciphertext || AAD || be64(|AAD|) || be64(|ciphertext|)`
pub(crate) fn mac_input(iv: &[u8], ciphertext: &[u8], aad: &[u8]) -> Vec<u8> {
    let mut input = Vec::with_capacity(1 + iv.len() + ciphertext.len() + aad.len() + 16);
    input.push(CBC_HMAC_VERSION);
    input.extend_from_slice(iv);
    input.extend_from_slice(ciphertext);
    input.extend_from_slice(aad);
    input.extend_from_slice(&(aad.len() as u64).to_be_bytes());
    input.extend_from_slice(&(ciphertext.len() as u64).to_be_bytes());
    input
}

pub(crate) fn assemble_cbc(iv: &[u8], ciphertext: &[u8], tag: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + iv.len() + ciphertext.len() + tag.len());
    out.push(CBC_HMAC_VERSION);
    out.extend_from_slice(iv);
    out.extend_from_slice(ciphertext);
    out.extend_from_slice(tag);
    out
}

/// Split a GCM payload into nonce and `ciphertext || tag`.
pub(crate) fn parse_gcm(payload: &[u8]) -> CryptoResult<(&[u8], &[u8])> {
    let rest = strip_version(payload, GCM_VERSION)?;
    if rest.len() < NONCE_SIZE + TAG_SIZE {
        return Err(CryptoError::MalformedInput("payload too short"));
    }
    Ok(rest.split_at(NONCE_SIZE))
}

/// AAD handed to GCM: the version byte is authenticated along with the
/// caller's context.
pub(crate) fn gcm_aad(aad: &[u8]) -> Vec<u8> {
    let mut bound = Vec::with_capacity(1 + aad.len());
    bound.push(GCM_VERSION);
    bound.extend_from_slice(aad);
    bound
}

/// A mismatched version byte is reported as tampering.
fn strip_version(payload: &[u8], expected: u8) -> CryptoResult<&[u8]> {
    match payload.split_first() {
        None => Err(CryptoError::MalformedInput("empty payload")),
        Some((&version, rest)) if version == expected => Ok(rest),
        Some(_) => Err(CryptoError::TamperDetected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cbc_splits_fields() {
        let payload = assemble_cbc(&[1u8; 16], &[2u8; 32], &[3u8; 32]);
        let parsed = parse_cbc(&payload, 32).unwrap();
        assert_eq!(parsed.iv, &[1u8; 16]);
        assert_eq!(parsed.ciphertext, &[2u8; 32]);
        assert_eq!(parsed.tag, &[3u8; 32]);
    }

    #[test]
    fn test_parse_cbc_rejects_short_and_misaligned() {
        let short = assemble_cbc(&[0u8; 16], &[], &[0u8; 32]);
        assert!(matches!(
            parse_cbc(&short, 32),
            Err(CryptoError::MalformedInput(_))
        ));

        let misaligned = assemble_cbc(&[0u8; 16], &[0u8; 17], &[0u8; 32]);
        assert!(matches!(
            parse_cbc(&misaligned, 32),
            Err(CryptoError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_wrong_version_rejected() {
        let mut payload = assemble_cbc(&[0u8; 16], &[0u8; 16], &[0u8; 32]);
        payload[0] = GCM_VERSION;
        assert!(matches!(
            parse_cbc(&payload, 32),
            Err(CryptoError::TamperDetected)
        ));
        assert!(matches!(
            parse_cbc(&[], 32),
            Err(CryptoError::MalformedInput(_))
        ));

        let mut gcm = vec![CBC_HMAC_VERSION];
        gcm.extend_from_slice(&[0u8; NONCE_SIZE + TAG_SIZE]);
        assert!(matches!(parse_gcm(&gcm), Err(CryptoError::TamperDetected)));
    }

    #[test]
    fn test_mac_input_length_prefixes_disambiguate() {
        // Moving a byte between ciphertext and AAD must change the MAC input.
        let a = mac_input(&[0u8; 16], &[1, 2], &[3]);
        let b = mac_input(&[0u8; 16], &[1], &[2, 3]);
        assert_ne!(a, b);
        assert_eq!(a.len(), 1 + 16 + 2 + 1 + 16);
    }

    #[test]
    fn test_parse_gcm() {
        let mut payload = vec![GCM_VERSION];
        payload.extend_from_slice(&[7u8; NONCE_SIZE]);
        payload.extend_from_slice(&[8u8; TAG_SIZE]);
        let (nonce, body) = parse_gcm(&payload).unwrap();
        assert_eq!(nonce, &[7u8; NONCE_SIZE]);
        assert_eq!(body.len(), TAG_SIZE);

        assert!(parse_gcm(&payload[..payload.len() - 1]).is_err());
    }
}
