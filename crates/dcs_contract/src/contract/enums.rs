use std::sync::Arc;

/// A name ↔ value table.
///
/// Values are stored as `i64`; unsigned members above `i64::MAX` keep
/// their bit pattern.
///
/// # Examples
///
/// ```
/// use dcs_contract::info::{EnumInfo, TypeInfo};
/// use dcs_contract::registry::TypeRegistry;
///
/// let mut registry = TypeRegistry::new();
/// registry.register(TypeInfo::enumeration(
///     "paint::Color",
///     EnumInfo::new()
///         .with_member("Red", 1)
///         .with_member("Green", 2)
///         .with_member("Blue", 4)
///         .with_flags(true),
/// ));
///
/// let contract = registry.contract("paint::Color").unwrap();
/// let color = contract.as_enum().unwrap();
///
/// assert_eq!(color.format(5).as_deref(), Some("Red Blue"));
/// assert_eq!(color.parse("Red Blue"), Some(5));
/// assert_eq!(color.format(8), None);
/// ```
#[derive(Debug)]
pub struct EnumContract {
    pub(crate) names: Box<[Arc<str>]>,
    pub(crate) values: Box<[i64]>,
    pub(crate) is_flags: bool,
}

impl EnumContract {
    #[inline]
    pub fn is_flags(&self) -> bool {
        self.is_flags
    }

    /// Member names and values in declaration order.
    pub fn members(&self) -> impl ExactSizeIterator<Item = (&str, i64)> {
        self.names
            .iter()
            .zip(self.values.iter())
            .map(|(name, value)| (&**name, *value))
    }

    /// Renders `bits` as wire text, or `None` if it cannot be represented.
    ///
    /// Flags values consume member bits in declaration order; any bit left
    /// over makes the value unrepresentable. A flags value of zero is the
    /// zero-valued member if one exists, otherwise the empty string.
    pub fn format(&self, bits: i64) -> Option<String> {
        if !self.is_flags {
            return self
                .values
                .iter()
                .position(|value| *value == bits)
                .map(|index| self.names[index].to_string());
        }

        let mut remaining = bits;
        let mut zero_index = None;
        let mut text = String::new();
        for (index, value) in self.values.iter().copied().enumerate() {
            if value == 0 {
                zero_index.get_or_insert(index);
                continue;
            }
            if remaining == 0 {
                break;
            }
            if value & remaining == value {
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(&self.names[index]);
                remaining &= !value;
            }
        }

        if remaining != 0 {
            return None;
        }
        if text.is_empty()
            && let Some(index) = zero_index
        {
            text.push_str(&self.names[index]);
        }
        Some(text)
    }

    /// Parses wire text back into bits, or `None` if a token is unknown.
    ///
    /// Tokens are matched exactly. Flags values OR their tokens together and
    /// accept the empty string as zero; other enums take exactly one name.
    pub fn parse(&self, text: &str) -> Option<i64> {
        if self.is_flags {
            return text
                .split_ascii_whitespace()
                .try_fold(0_i64, |bits, token| Some(bits | self.value_of(token)?));
        }
        let token = text.trim();
        if token.is_empty() {
            return None;
        }
        self.value_of(token)
    }

    fn value_of(&self, token: &str) -> Option<i64> {
        self.names
            .iter()
            .position(|name| &**name == token)
            .map(|index| self.values[index])
    }
}
