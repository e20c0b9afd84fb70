//! Cleartext encoding
//!
//! Disclosed values travel as 32-byte big-endian words, the same shape an
//! EVM ABI encoder produces for a `uint256`.

use crate::{CommitteeError, CommitteeResult};

/// Size of an encoded cleartext word
pub const WORD_SIZE: usize = 32;

/// Encode an unsigned value as a big-endian word
pub fn encode_word(value: u64) -> [u8; WORD_SIZE] {
    let mut word = [0u8; WORD_SIZE];
    word[WORD_SIZE - 8..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Decode a word as a 32-bit unsigned amount
pub fn decode_u32(word: &[u8]) -> CommitteeResult<u32> {
    if word.len() != WORD_SIZE {
        return Err(CommitteeError::MalformedCleartext(format!(
            "expected {} bytes, got {}",
            WORD_SIZE,
            word.len()
        )));
    }

    let (high, low) = word.split_at(WORD_SIZE - 4);
    if high.iter().any(|&b| b != 0) {
        return Err(CommitteeError::MalformedCleartext("value exceeds 32 bits".into()));
    }

    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(low);
    Ok(u32::from_be_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let word = encode_word(0x0102);
        assert_eq!(word[30], 0x01);
        assert_eq!(word[31], 0x02);
        assert!(word[..30].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_decode_u32() {
        assert_eq!(decode_u32(&encode_word(1000)).unwrap(), 1000);
        assert_eq!(decode_u32(&encode_word(u64::from(u32::MAX))).unwrap(), u32::MAX);
    }

    #[test]
    fn test_decode_rejects_wide_values() {
        let word = encode_word(u64::from(u32::MAX) + 1);
        assert!(matches!(decode_u32(&word), Err(CommitteeError::MalformedCleartext(_))));
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        assert!(decode_u32(&[0u8; 4]).is_err());
        assert!(decode_u32(&[]).is_err());
    }
}
