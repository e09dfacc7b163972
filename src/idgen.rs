use rand::Rng;
use rand::rngs::ThreadRng;

pub const DISPLAY_ID_LEN: usize = 6;

// Digits 1-9 plus A-Z; 0 is left out so it can't be confused with O.
const ALPHABET: &[u8] = b"123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Produces the short human-readable trade code. The random source is
/// injected so callers (and tests) decide where entropy comes from.
pub struct DisplayIdGenerator<R: Rng> {
    rng: R,
}

impl<R: Rng> DisplayIdGenerator<R> {
    pub fn new(rng: R) -> Self {
        DisplayIdGenerator { rng }
    }

    pub fn execute(&mut self) -> String {
        (0..DISPLAY_ID_LEN)
            .map(|_| ALPHABET[self.rng.gen_range(0..ALPHABET.len())] as char)
            .collect()
    }
}

impl Default for DisplayIdGenerator<ThreadRng> {
    fn default() -> Self {
        DisplayIdGenerator::new(rand::thread_rng())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn codes_are_six_chars_from_the_alphabet() {
        let mut generator = DisplayIdGenerator::new(StdRng::seed_from_u64(7));
        for _ in 0..500 {
            let code = generator.execute();
            assert_eq!(code.len(), DISPLAY_ID_LEN);
            for c in code.chars() {
                assert!(ALPHABET.contains(&(c as u8)), "unexpected char {c:?}");
            }
        }
    }

    #[test]
    fn never_emits_ambiguous_characters() {
        let mut generator = DisplayIdGenerator::new(StdRng::seed_from_u64(99));
        for _ in 0..500 {
            let code = generator.execute();
            assert!(!code.contains('0'));
            assert!(!code.contains('O'));
            assert_eq!(code, code.to_uppercase());
        }
    }

    #[test]
    fn seeded_source_is_deterministic() {
        let mut a = DisplayIdGenerator::new(StdRng::seed_from_u64(42));
        let mut b = DisplayIdGenerator::new(StdRng::seed_from_u64(42));
        for _ in 0..20 {
            assert_eq!(a.execute(), b.execute());
        }
    }
}
