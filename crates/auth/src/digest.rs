//! Dual-strategy SHA-256 digest engine
//!
//! The dashboard must authenticate even in contexts where the accelerated
//! digest provider is unavailable (the browser build gates it behind secure
//! contexts; constrained native environments may lack it too). The engine
//! therefore carries two interchangeable strategies:
//!
//! - **Platform**: delegate to the accelerated provider (`sha2`)
//! - **Software**: from-scratch FIPS 180-4 computation
//!
//! Selection happens once via a capability probe; the platform path is
//! always attempted first and falls back silently to the software path on
//! failure. Both paths are bit-exact against the standard test vectors.

use sha2::{Digest, Sha256};

/// Environment switch that disables the accelerated provider, forcing the
/// software path. Mirrors the capability gate of the browser build.
const FORCE_SOFT_ENV: &str = "ARENA_AUTH_FORCE_SOFT_DIGEST";

/// SHA-256 strategy, chosen once per flow by a capability probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestEngine {
    /// Accelerated digest provider.
    Platform,
    /// Pure-computation fallback.
    Software,
}

impl DigestEngine {
    /// Probe the execution context and select a strategy.
    #[must_use]
    pub fn select() -> Self {
        if platform_digest(&[]).is_some() {
            Self::Platform
        } else {
            Self::Software
        }
    }

    /// Compute the 32-byte SHA-256 digest of `message`.
    ///
    /// The platform strategy still degrades to the software computation if
    /// the provider fails at call time; the caller never observes the
    /// difference.
    #[must_use]
    pub fn digest(self, message: &[u8]) -> [u8; 32] {
        match self {
            Self::Platform => {
                platform_digest(message).unwrap_or_else(|| software_digest(message))
            }
            Self::Software => software_digest(message),
        }
    }
}

/// Attempt the accelerated provider.
///
/// Returns `None` when the provider is unavailable in this context, which
/// triggers the silent fallback.
fn platform_digest(message: &[u8]) -> Option<[u8; 32]> {
    if std::env::var_os(FORCE_SOFT_ENV).is_some() {
        return None;
    }
    let mut hasher = Sha256::new();
    hasher.update(message);
    Some(hasher.finalize().into())
}

// FIPS 180-4 round constants: fractional parts of the cube roots of the
// first 64 primes.
const K: [u32; 64] = [
    0x428a_2f98, 0x7137_4491, 0xb5c0_fbcf, 0xe9b5_dba5, 0x3956_c25b, 0x59f1_11f1, 0x923f_82a4,
    0xab1c_5ed5, 0xd807_aa98, 0x1283_5b01, 0x2431_85be, 0x550c_7dc3, 0x72be_5d74, 0x80de_b1fe,
    0x9bdc_06a7, 0xc19b_f174, 0xe49b_69c1, 0xefbe_4786, 0x0fc1_9dc6, 0x240c_a1cc, 0x2de9_2c6f,
    0x4a74_84aa, 0x5cb0_a9dc, 0x76f9_88da, 0x983e_5152, 0xa831_c66d, 0xb003_27c8, 0xbf59_7fc7,
    0xc6e0_0bf3, 0xd5a7_9147, 0x06ca_6351, 0x1429_2967, 0x27b7_0a85, 0x2e1b_2138, 0x4d2c_6dfc,
    0x5338_0d13, 0x650a_7354, 0x766a_0abb, 0x81c2_c92e, 0x9272_2c85, 0xa2bf_e8a1, 0xa81a_664b,
    0xc24b_8b70, 0xc76c_51a3, 0xd192_e819, 0xd699_0624, 0xf40e_3585, 0x106a_a070, 0x19a4_c116,
    0x1e37_6c08, 0x2748_774c, 0x34b0_bcb5, 0x391c_0cb3, 0x4ed8_aa4a, 0x5b9c_ca4f, 0x682e_6ff3,
    0x748f_82ee, 0x78a5_636f, 0x84c8_7814, 0x8cc7_0208, 0x90be_fffa, 0xa450_6ceb, 0xbef9_a3f7,
    0xc671_78f2,
];

// Initial hash words: fractional parts of the square roots of the first
// eight primes.
const H0: [u32; 8] = [
    0x6a09_e667, 0xbb67_ae85, 0x3c6e_f372, 0xa54f_f53a, 0x510e_527f, 0x9b05_688c, 0x1f83_d9ab,
    0x5be0_cd19,
];

/// Pure-computation SHA-256 per FIPS 180-4.
///
/// The message is padded with a single `1` bit, zero bits, and the 64-bit
/// big-endian bit length so the total is a multiple of 512 bits, then
/// processed in 64-byte blocks. Every addition wraps at 32 bits.
fn software_digest(message: &[u8]) -> [u8; 32] {
    let bit_len = (message.len() as u64).wrapping_mul(8);

    let mut padded = Vec::with_capacity(message.len() + 72);
    padded.extend_from_slice(message);
    padded.push(0x80);
    while padded.len() % 64 != 56 {
        padded.push(0);
    }
    padded.extend_from_slice(&bit_len.to_be_bytes());

    let mut state = H0;
    for block in padded.chunks_exact(64) {
        compress(&mut state, block);
    }

    let mut out = [0u8; 32];
    for (chunk, word) in out.chunks_exact_mut(4).zip(state.iter()) {
        chunk.copy_from_slice(&word.to_be_bytes());
    }
    out
}

/// One 64-round compression over a single 512-bit block.
fn compress(state: &mut [u32; 8], block: &[u8]) {
    // Expand the block into the 64-word message schedule.
    let mut w = [0u32; 64];
    for (word, chunk) in w.iter_mut().zip(block.chunks_exact(4)) {
        *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    for j in 16..64 {
        let s0 = w[j - 15].rotate_right(7) ^ w[j - 15].rotate_right(18) ^ (w[j - 15] >> 3);
        let s1 = w[j - 2].rotate_right(17) ^ w[j - 2].rotate_right(19) ^ (w[j - 2] >> 10);
        w[j] = w[j - 16]
            .wrapping_add(s0)
            .wrapping_add(w[j - 7])
            .wrapping_add(s1);
    }

    let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = *state;
    for j in 0..64 {
        let big_s1 = e.rotate_right(6) ^ e.rotate_right(11) ^ e.rotate_right(25);
        let ch = (e & f) ^ (!e & g);
        let t1 = h
            .wrapping_add(big_s1)
            .wrapping_add(ch)
            .wrapping_add(K[j])
            .wrapping_add(w[j]);
        let big_s0 = a.rotate_right(2) ^ a.rotate_right(13) ^ a.rotate_right(22);
        let maj = (a & b) ^ (a & c) ^ (b & c);
        let t2 = big_s0.wrapping_add(maj);

        h = g;
        g = f;
        f = e;
        e = d.wrapping_add(t1);
        d = c;
        c = b;
        b = a;
        a = t1.wrapping_add(t2);
    }

    state[0] = state[0].wrapping_add(a);
    state[1] = state[1].wrapping_add(b);
    state[2] = state[2].wrapping_add(c);
    state[3] = state[3].wrapping_add(d);
    state[4] = state[4].wrapping_add(e);
    state[5] = state[5].wrapping_add(f);
    state[6] = state[6].wrapping_add(g);
    state[7] = state[7].wrapping_add(h);
}

#[cfg(test)]
mod tests {
    //! Unit tests for digest. Both strategies are checked against the FIPS
    //! 180-4 example vectors independently.
    use super::*;

    const EMPTY: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
    const ABC: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";
    // Two-block message from the FIPS 180-4 appendix
    const TWO_BLOCK_MSG: &str = "abcdbcdecdefdefgefghfghighijhijkijkljklmklmnlmnomnopnopq";
    const TWO_BLOCK: &str = "248d6a61d20638b8e5c026930c3e6039a33ce45964ff2167f6ecedd419db06c1";

    /// Validates `software_digest` behavior for the standard vector scenario.
    ///
    /// Assertions:
    /// - Confirms the empty-string, "abc", and two-block digests match the
    ///   published SHA-256 values bit-for-bit.
    #[test]
    fn software_path_matches_standard_vectors() {
        assert_eq!(hex::encode(software_digest(b"")), EMPTY);
        assert_eq!(hex::encode(software_digest(b"abc")), ABC);
        assert_eq!(hex::encode(software_digest(TWO_BLOCK_MSG.as_bytes())), TWO_BLOCK);
    }

    /// Validates `DigestEngine::Platform` behavior for the standard vector
    /// scenario.
    #[test]
    fn platform_path_matches_standard_vectors() {
        let engine = DigestEngine::Platform;
        assert_eq!(hex::encode(engine.digest(b"")), EMPTY);
        assert_eq!(hex::encode(engine.digest(b"abc")), ABC);
    }

    /// Validates that the two strategies agree on arbitrary input lengths,
    /// including every padding boundary around one block.
    #[test]
    fn strategies_agree_across_padding_boundaries() {
        for len in [0usize, 1, 3, 54, 55, 56, 57, 63, 64, 65, 119, 120, 121, 128, 1000] {
            let message = vec![0xa5u8; len];
            assert_eq!(
                DigestEngine::Software.digest(&message),
                DigestEngine::Platform.digest(&message),
                "strategy divergence at message length {len}"
            );
        }
    }

    /// Validates `DigestEngine::select` behavior for the capability probe
    /// scenario: a selected engine always produces a correct digest.
    #[test]
    fn selected_engine_digests_correctly() {
        let engine = DigestEngine::select();
        assert_eq!(hex::encode(engine.digest(b"abc")), ABC);
    }
}
