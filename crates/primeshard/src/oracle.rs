//! Trial-division primality test.
//!
//! This is deliberately the naive algorithm: every candidate divisor in
//! `[2, n)` is tried, with no square-root bound, wheel or sieve. It exists to
//! keep every core busy, so making it faster would defeat its purpose.

/// How the oracle classifies values that have no divisor in `[2, n)` for
/// trivial reasons.
///
/// Plain trial division finds no divisor for `0` and `1` either, and would
/// report them prime. [`PrimalityRule::Strict`] rejects them;
/// [`PrimalityRule::Lenient`] keeps the plain trial-division answer so runs can
/// reproduce older output files byte for byte.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimalityRule {
    /// `0` and `1` are not prime.
    #[default]
    Strict,
    /// `0` and `1` are reported prime.
    Lenient,
}

impl PrimalityRule {
    /// Tests `n` under this rule.
    #[inline]
    pub fn is_prime(self, n: usize) -> bool {
        match self {
            Self::Strict => is_prime(n),
            Self::Lenient => !has_divisor_below(n),
        }
    }
}

/// Returns `true` if `n` is prime.
///
/// # Example
///
/// ```
/// assert!(primeshard::is_prime(97));
/// assert!(!primeshard::is_prime(91));
/// assert!(!primeshard::is_prime(1));
/// ```
#[inline]
pub fn is_prime(n: usize) -> bool {
    n >= 2 && !has_divisor_below(n)
}

#[inline]
fn has_divisor_below(n: usize) -> bool {
    (2..n).any(|d| n % d == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sieve(limit: usize) -> Vec<bool> {
        let mut primes = vec![true; limit + 1];
        primes[0] = false;
        primes[1] = false;
        let mut p = 2;
        while p * p <= limit {
            if primes[p] {
                for multiple in (p * p..=limit).step_by(p) {
                    primes[multiple] = false;
                }
            }
            p += 1;
        }
        primes
    }

    #[test]
    fn matches_sieve_up_to_1000() {
        let expected = sieve(1000);
        for n in 2..=1000 {
            assert_eq!(is_prime(n), expected[n], "mismatch at {n}");
            assert_eq!(PrimalityRule::Lenient.is_prime(n), expected[n]);
        }
    }

    #[test]
    fn known_values() {
        assert!(is_prime(2));
        assert!(is_prime(3));
        assert!(is_prime(97));
        assert!(!is_prime(91)); // 7 * 13
        assert!(!is_prime(4));
        assert!(is_prime(7919));
    }

    #[test]
    fn rules_only_differ_on_zero_and_one() {
        assert!(!PrimalityRule::Strict.is_prime(0));
        assert!(!PrimalityRule::Strict.is_prime(1));
        assert!(PrimalityRule::Lenient.is_prime(0));
        assert!(PrimalityRule::Lenient.is_prime(1));

        for n in 2..200 {
            assert_eq!(
                PrimalityRule::Strict.is_prime(n),
                PrimalityRule::Lenient.is_prime(n)
            );
        }
    }

    #[test]
    fn default_rule_is_strict() {
        assert_eq!(PrimalityRule::default(), PrimalityRule::Strict);
    }
}
