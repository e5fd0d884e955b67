//! Deterministic fingerprints for classifier artefacts.
//!
//! The fingerprint only identifies which artefact bytes were loaded in logs;
//! it is not an integrity check.

/// Small FNV-1a style hash over artefact bytes.
#[derive(Copy, Clone, Debug)]
pub struct Fingerprint(u32);

impl Fingerprint {
    /// Create a new hash state with the FNV offset basis.
    pub fn new() -> Self {
        Self(2_166_136_261)
    }

    /// Feed bytes into the hash function.
    pub fn update(&mut self, bytes: &[u8]) {
        for b in bytes {
            self.0 = (self.0 ^ (*b as u32)).wrapping_mul(16_777_619);
        }
    }

    /// Hash a complete byte slice in one go.
    pub fn of(bytes: &[u8]) -> Self {
        let mut fp = Self::new();
        fp.update(bytes);
        fp
    }

    pub fn finish32(&self) -> u32 {
        self.0
    }

    /// 8-character lowercase hex rendering.
    pub fn finish_hex(&self) -> String {
        format!("{:08x}", self.0)
    }
}

impl Default for Fingerprint {
    fn default() -> Self {
        Self::new()
    }
}
