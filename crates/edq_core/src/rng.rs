use edq_common::PAYLOAD_CHARSET;

/// Seedable xorshift64* generator.
///
/// Small and fast enough to sit inside actor loops without measurable
/// overhead. Identical seeds produce identical streams, which keeps stress
/// runs reproducible across machines.
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    /// Creates a generator from `seed`. A zero seed is remapped, since the
    /// all-zero state is a fixed point of the xorshift step.
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 0x2545F4914F6CDD1D } else { seed },
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state >> 12;
        self.state ^= self.state << 25;
        self.state ^= self.state >> 27;
        self.state.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Uniform value in `[0, bound)`. `bound` must be non-zero.
    pub fn next_below(&mut self, bound: u64) -> u64 {
        debug_assert!(bound > 0);
        self.next_u64() % bound
    }

    /// Fills `buf` with printable payload bytes.
    pub fn fill_payload(&mut self, buf: &mut [u8]) {
        for byte in buf.iter_mut() {
            let key = self.next_below(PAYLOAD_CHARSET.len() as u64) as usize;
            *byte = PAYLOAD_CHARSET[key];
        }
    }
}
