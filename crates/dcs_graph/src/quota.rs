use crate::SerializationError;

/// The budget of nodes one call may visit.
///
/// Every value element, dictionary entry and captured unknown element
/// costs one unit. Running out is fatal for the call.
///
/// # Examples
///
/// ```
/// use dcs_graph::QuotaGuard;
///
/// let mut quota = QuotaGuard::new(2);
/// assert!(quota.consume("shop::Order").is_ok());
/// assert!(quota.consume("shop::Order").is_ok());
/// assert!(quota.consume("shop::Order").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct QuotaGuard {
    limit: usize,
    remaining: usize,
}

impl QuotaGuard {
    #[inline]
    pub const fn new(limit: usize) -> Self {
        Self {
            limit,
            remaining: limit,
        }
    }

    #[inline]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    #[inline]
    pub const fn remaining(&self) -> usize {
        self.remaining
    }

    /// Takes one unit, charged to `type_path` in the error.
    #[inline]
    pub fn consume(&mut self, type_path: &str) -> Result<(), SerializationError> {
        self.consume_n(1, type_path)
    }

    /// Takes `count` units at once.
    pub fn consume_n(&mut self, count: usize, type_path: &str) -> Result<(), SerializationError> {
        match self.remaining.checked_sub(count) {
            Some(remaining) => {
                self.remaining = remaining;
                Ok(())
            }
            None => {
                self.remaining = 0;
                Err(self.exceeded(type_path))
            }
        }
    }

    /// Fails if `size` items could never fit in what is left. Checked
    /// before allocating room for a declared array size.
    pub fn check_allocation(&self, size: usize, type_path: &str) -> Result<(), SerializationError> {
        if size > self.remaining {
            return Err(self.exceeded(type_path));
        }
        Ok(())
    }

    fn exceeded(&self, type_path: &str) -> SerializationError {
        SerializationError::GraphTooLarge {
            limit: self.limit,
            type_path: type_path.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::QuotaGuard;
    use crate::SerializationError;

    #[test]
    fn exact_budget() {
        let mut quota = QuotaGuard::new(3);
        quota.consume_n(2, "a").unwrap();
        quota.consume("a").unwrap();
        assert_eq!(quota.remaining(), 0);
        assert!(matches!(
            quota.consume("b"),
            Err(SerializationError::GraphTooLarge { limit: 3, type_path }) if &*type_path == "b"
        ));
    }

    #[test]
    fn overdraw_is_rejected_whole() {
        let mut quota = QuotaGuard::new(5);
        assert!(quota.consume_n(6, "a").is_err());
        assert_eq!(quota.remaining(), 0);
    }

    #[test]
    fn allocation_check() {
        let mut quota = QuotaGuard::new(10);
        quota.consume_n(4, "a").unwrap();
        assert!(quota.check_allocation(6, "a").is_ok());
        assert!(quota.check_allocation(7, "a").is_err());
        assert_eq!(quota.remaining(), 6);
    }
}
