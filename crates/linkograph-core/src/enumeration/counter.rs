//! Modular counter driving labeling sweeps

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};
use crate::linkograph::InverseLabeling;

/// Fixed-width little-endian counter with digits in `[0, base)`
///
/// Each digit is read as the class index of the node at that position, so
/// stepping the counter through all `base^len` states visits every labeling.
#[derive(Debug, Clone)]
pub struct ModularCounter {
    digits: Vec<usize>,
    base: usize,
    rng: StdRng,
}

impl ModularCounter {
    /// Counter at zero; `seed` makes [`randomize`](Self::randomize) reproducible
    pub fn new(len: usize, base: usize, seed: Option<u64>) -> Self {
        Self {
            digits: vec![0; len],
            base,
            rng: seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64),
        }
    }

    pub fn digits(&self) -> &[usize] {
        &self.digits
    }

    pub fn base(&self) -> usize {
        self.base
    }

    /// Add one with carry; returns `true` when the counter wraps to zero
    pub fn increment(&mut self) -> bool {
        if self.base == 0 {
            return true;
        }
        for digit in &mut self.digits {
            *digit += 1;
            if *digit < self.base {
                return false;
            }
            *digit = 0;
        }
        true
    }

    /// Replace every digit with a uniformly drawn one
    pub fn randomize(&mut self) {
        if self.base == 0 {
            return;
        }
        for digit in &mut self.digits {
            *digit = self.rng.gen_range(0..self.base);
        }
    }

    fn class<'a>(classes: &'a [String], digit: usize) -> Result<&'a String> {
        classes.get(digit).ok_or(Error::ClassOutOfRange {
            digit,
            available: classes.len(),
        })
    }

    /// Class of each position, in order
    pub fn to_labeling(&self, classes: &[String]) -> Result<Vec<String>> {
        self.digits
            .iter()
            .map(|&digit| Self::class(classes, digit).cloned())
            .collect()
    }

    /// Positions grouped by class
    pub fn to_inverse_labeling(&self, classes: &[String]) -> Result<InverseLabeling> {
        let mut inverse = InverseLabeling::new();
        for (index, &digit) in self.digits.iter().enumerate() {
            inverse
                .entry(Self::class(classes, digit)?.clone())
                .or_default()
                .push(index);
        }
        Ok(inverse)
    }
}
