//! SequenceGenerator - Linear Congruential Randomness
//!
//! TigerStyle: The only source of randomness in a simulation run.
//!
//! Values follow the recurrence `x(n+1) = (multiplier * x(n) + increment) mod modulus`.
//! Parameters are validated once, at construction; afterwards every operation
//! is infallible.

// =============================================================================
// Types
// =============================================================================

/// A deterministic linear-congruential pseudorandom generator.
///
/// TigerStyle:
/// - `0 < multiplier < modulus`, `0 <= increment < modulus`, `0 <= seed < modulus`
/// - `next` is the sole state mutator
/// - Products are computed in 128 bits, so no overflow for any valid modulus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceGenerator {
    modulus: u64,
    multiplier: u64,
    increment: u64,
    seed: u64,
    /// Last value produced (starts at the seed)
    current: u64,
}

impl SequenceGenerator {
    /// Create a generator, validating all four recurrence parameters.
    ///
    /// # Errors
    /// Returns a [`GeneratorError`] naming the first parameter out of range,
    /// checked in the order modulus, multiplier, increment, seed.
    ///
    /// # Example
    /// ```
    /// use queuesim::SequenceGenerator;
    /// let mut rng = SequenceGenerator::new(3, 7, 7, 11).unwrap();
    /// assert_eq!(rng.next(), 6);
    /// assert_eq!(rng.next(), 5);
    /// ```
    #[allow(clippy::cast_sign_loss)]
    pub fn new(
        seed: i64,
        multiplier: i64,
        increment: i64,
        modulus: i64,
    ) -> Result<Self, GeneratorError> {
        if modulus <= 0 {
            return Err(GeneratorError::ModulusNotPositive { modulus });
        }
        if multiplier <= 0 || multiplier >= modulus {
            return Err(GeneratorError::MultiplierOutOfRange {
                multiplier,
                modulus,
            });
        }
        if increment < 0 || increment >= modulus {
            return Err(GeneratorError::IncrementOutOfRange { increment, modulus });
        }
        if seed < 0 || seed >= modulus {
            return Err(GeneratorError::SeedOutOfRange { seed, modulus });
        }

        let generator = Self {
            modulus: modulus as u64,
            multiplier: multiplier as u64,
            increment: increment as u64,
            seed: seed as u64,
            current: seed as u64,
        };

        // Postcondition
        assert_eq!(generator.current, generator.seed, "first value is the seed");

        tracing::debug!(
            seed,
            multiplier,
            increment,
            modulus,
            "sequence generator created"
        );

        Ok(generator)
    }

    /// Recurrence modulus.
    #[must_use]
    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    /// Recurrence multiplier.
    #[must_use]
    pub fn multiplier(&self) -> u64 {
        self.multiplier
    }

    /// Recurrence increment.
    #[must_use]
    pub fn increment(&self) -> u64 {
        self.increment
    }

    /// Initial value.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Most recent value (the seed before the first `next`).
    #[must_use]
    pub fn current(&self) -> u64 {
        self.current
    }

    /// Value the next call to [`next`](Self::next) will return, without advancing.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn peek(&self) -> u64 {
        let product = u128::from(self.multiplier) * u128::from(self.current);
        let value = (product + u128::from(self.increment)) % u128::from(self.modulus);

        // Remainder of a u64 modulus always fits.
        value as u64
    }

    /// Advance the recurrence one step and return the new value.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> u64 {
        self.current = self.peek();

        // Postcondition
        debug_assert!(self.current < self.modulus, "value must stay below modulus");

        self.current
    }

    /// Return `count` values: the current value, then `count - 1` successive
    /// results of [`next`](Self::next).
    ///
    /// Advances state by `count - 1` steps (none when `count` is zero).
    pub fn generate_batch(&mut self, count: usize) -> Vec<u64> {
        let mut values = Vec::with_capacity(count);
        if count == 0 {
            return values;
        }

        values.push(self.current);
        for _ in 1..count {
            values.push(self.next());
        }

        // Postcondition
        assert_eq!(values.len(), count, "batch must hold exactly count values");
        values
    }

    /// Advance and map the new value onto `[-0.5, 0.5]`.
    ///
    /// Computed as `next / (modulus - 1) - 0.5`. A valid generator always has
    /// `modulus >= 2`, so the divisor is never zero.
    #[allow(clippy::cast_precision_loss)]
    pub fn normalized(&mut self) -> f64 {
        let divisor = (self.modulus - 1) as f64;
        self.next() as f64 / divisor - 0.5
    }

    /// Draw a duration perturbed by up to ±50% around `base_secs`, rounded up.
    ///
    /// For `base_secs >= 1` the result lies in
    /// `[ceil(base_secs * 0.5), ceil(base_secs * 1.5)]` and is never zero.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn random_time(&mut self, base_secs: u64) -> u64 {
        let factor = 1.0 + self.normalized();

        // Postcondition of normalized()
        debug_assert!((0.5..=1.5).contains(&factor), "factor out of range: {factor}");

        (base_secs as f64 * factor).ceil() as u64
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Generator parameters outside their required ranges.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeneratorError {
    /// `modulus <= 0`
    #[error("mod should be greater than 0, got {modulus}")]
    ModulusNotPositive {
        /// Supplied modulus
        modulus: i64,
    },

    /// Multiplier outside `(0, modulus)`
    #[error("multiplier should be in range (0, mod), got {multiplier} with mod {modulus}")]
    MultiplierOutOfRange {
        /// Supplied multiplier
        multiplier: i64,
        /// Supplied modulus
        modulus: i64,
    },

    /// Increment outside `[0, modulus)`
    #[error("increment should be in range [0, mod), got {increment} with mod {modulus}")]
    IncrementOutOfRange {
        /// Supplied increment
        increment: i64,
        /// Supplied modulus
        modulus: i64,
    },

    /// Seed outside `[0, modulus)`
    #[error("seed should be in range [0, mod), got {seed} with mod {modulus}")]
    SeedOutOfRange {
        /// Supplied seed
        seed: i64,
        /// Supplied modulus
        modulus: i64,
    },
}

// =============================================================================
// Tests
// =============================================================================
