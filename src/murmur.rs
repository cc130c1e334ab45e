//! MurmurHash3, x86 32-bit variant.
//!
//! Output is bit-exact with the reference algorithm: input is consumed in
//! little-endian 4-byte blocks, the 0..=3 tail bytes are folded into one
//! word, and the length is mixed in before the final avalanche. Tables that
//! share keys across processes or implementations depend on this exact
//! sequence, so nothing here may be "improved".

/// Seed used by the default strategy.
pub const DEFAULT_SEED: u32 = 2019;

const C1: u32 = 0xcc9e_2d51;
const C2: u32 = 0x1b87_3593;

#[inline]
fn scramble(mut k: u32) -> u32 {
    k = k.wrapping_mul(C1);
    k = k.rotate_left(15);
    k.wrapping_mul(C2)
}

#[inline]
fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

/// Hash `key` with MurmurHash3 x86-32 using `seed`.
pub fn murmur3_32(key: &[u8], seed: u32) -> u32 {
    let mut h = seed;

    let mut blocks = key.chunks_exact(4);
    for block in &mut blocks {
        let k = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
        h ^= scramble(k);
        h = h.rotate_left(13);
        h = h.wrapping_mul(5).wrapping_add(0xe654_6b64);
    }

    let tail = blocks.remainder();
    if !tail.is_empty() {
        let k = tail
            .iter()
            .rev()
            .fold(0u32, |acc, &b| (acc << 8) | u32::from(b));
        h ^= scramble(k);
    }

    // Only the low 32 bits of the length take part, as in the reference.
    h ^= key.len() as u32;
    fmix32(h)
}

/// The conventional default hash: [`murmur3_32`] with [`DEFAULT_SEED`].
#[inline]
pub fn default_hash(key: &[u8]) -> u32 {
    murmur3_32(key, DEFAULT_SEED)
}
