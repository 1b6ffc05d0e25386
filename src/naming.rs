use rand::rngs::OsRng;
use rand::TryRngCore;

/// 64 symbols, so a masked byte indexes uniformly with no modulo bias.
const RANDOM_SOURCE: &[u8; 64] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ1234567890_+";

/// Returns a string of `n` random characters drawn from [`RANDOM_SOURCE`].
///
/// Uses the operating system's secure random source. Renamed upload
/// destinations depend on this being unpredictable, so if the OS source
/// is unavailable this panics instead of degrading to weak randomness.
pub fn random_name(n: usize) -> String {
    let mut buf = vec![0u8; n];
    OsRng
        .try_fill_bytes(&mut buf)
        .expect("OS secure random source unavailable");

    buf.iter()
        .map(|b| RANDOM_SOURCE[(b & 0x3f) as usize] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn returns_requested_length() {
        for n in [0, 1, 10, 32, 100] {
            assert_eq!(random_name(n).len(), n);
        }
    }

    #[test]
    fn only_uses_source_alphabet() {
        let s = random_name(256);
        assert!(s.bytes().all(|b| RANDOM_SOURCE.contains(&b)));
    }

    #[test]
    fn does_not_repeat_across_samples() {
        let names: HashSet<String> = (0..1000).map(|_| random_name(32)).collect();
        assert_eq!(names.len(), 1000);
    }
}
