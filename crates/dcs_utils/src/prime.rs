//! Prime helpers for sizing open-addressing tables.

/// Returns `true` if `n` is a prime number.
///
/// # Examples
///
/// ```
/// use dcs_utils::is_prime;
///
/// assert!(is_prime(2));
/// assert!(is_prime(31));
/// assert!(!is_prime(1));
/// assert!(!is_prime(33));
/// ```
pub const fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }
    let mut divisor = 5;
    while divisor <= n / divisor {
        if n % divisor == 0 || n % (divisor + 2) == 0 {
            return false;
        }
        divisor += 6;
    }
    true
}

/// Returns the smallest prime that is greater than or equal to `n`.
///
/// # Examples
///
/// ```
/// use dcs_utils::next_prime;
///
/// assert_eq!(next_prime(0), 2);
/// assert_eq!(next_prime(14), 17);
/// assert_eq!(next_prime(17), 17);
/// ```
pub const fn next_prime(n: usize) -> usize {
    let mut candidate = if n < 2 { 2 } else { n };
    while !is_prime(candidate) {
        candidate += 1;
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_primes() {
        let primes: Vec<usize> = (0..30).filter(|n| is_prime(*n)).collect();
        assert_eq!(primes, [2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
    }

    #[test]
    fn next_prime_doubles() {
        assert_eq!(next_prime(2 * 31), 67);
        assert_eq!(next_prime(2 * 67), 137);
        assert_eq!(next_prime(25), 29);
    }
}
