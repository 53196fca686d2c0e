//! Frame checksum.
//!
//! The checksum covers the logical (unescaped) frame type and body bytes.
//! Adding the checksum to the sum of those bytes yields `0xFF` in the low
//! eight bits.

/// Compute the checksum of logical frame bytes.
pub fn checksum(data: &[u8]) -> u8 {
    0xFF - sum(data)
}

/// Verify `data` against a received checksum byte.
pub fn verify(data: &[u8], checksum: u8) -> bool {
    sum(data).wrapping_add(checksum) == 0xFF
}

fn sum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_local_at_response() {
        let body = [0x88, 0x01, 0x48, 0x56, 0x00, 0x1A, 0x46];
        assert_eq!(checksum(&body), 0x78);
        assert!(verify(&body, 0x78));
    }

    #[test]
    fn test_checksum_empty() {
        assert_eq!(checksum(&[]), 0xFF);
        assert!(verify(&[], 0xFF));
    }

    #[test]
    fn test_every_corrupted_checksum_fails() {
        let body = [0x08, 0x01, 0x4E, 0x4A, 0xFF];
        let good = checksum(&body);
        assert_eq!(good, 0x5F);
        for candidate in 0..=u8::MAX {
            assert_eq!(verify(&body, candidate), candidate == good);
        }
    }

    #[test]
    fn test_sum_wraps() {
        let body = [0xFF; 300];
        assert!(verify(&body, checksum(&body)));
    }
}
