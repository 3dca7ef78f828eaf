//! XML local name encoding.
//!
//! Characters that cannot appear in an NCName are written as `_xHHHH_`
//! (or `_xHHHHHHHH_` outside the basic plane). An underscore that would
//! otherwise start such a sequence is itself escaped as `_x005F_`.

use core::fmt::Write;

fn is_name_start_char(c: char) -> bool {
    matches!(c,
        'A'..='Z' | '_' | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}'
    )
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}'
            | '\u{300}'..='\u{36F}'
            | '\u{203F}'..='\u{2040}'
        )
}

/// Returns `true` if `name` is a valid non-colonized XML name.
///
/// # Examples
///
/// ```
/// use dcs_xml::is_ncname;
///
/// assert!(is_ncname("ArrayOfint"));
/// assert!(!is_ncname("1st"));
/// assert!(!is_ncname("a:b"));
/// assert!(!is_ncname(""));
/// ```
pub fn is_ncname(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_name_start_char(first) => chars.all(is_name_char),
        _ => false,
    }
}

/// Length in bytes of an escape sequence starting at `s`, if any.
fn escape_len(s: &str) -> Option<(usize, u32)> {
    let rest = s.strip_prefix("_x")?;
    for digits in [4, 8] {
        let Some(hex) = rest.get(..digits) else {
            continue;
        };
        if rest[digits..].starts_with('_') && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            let code = u32::from_str_radix(hex, 16).ok()?;
            return Some((digits + 3, code));
        }
    }
    None
}

/// Encodes `name` so it is a valid NCName.
///
/// # Examples
///
/// ```
/// use dcs_xml::encode_local_name;
///
/// assert_eq!(encode_local_name("Order"), "Order");
/// assert_eq!(encode_local_name("Key Value"), "Key_x0020_Value");
/// assert_eq!(encode_local_name("1st"), "_x0031_st");
/// assert_eq!(encode_local_name("_x0041_"), "_x005F_x0041_");
/// ```
pub fn encode_local_name(name: &str) -> String {
    let mut encoded = String::with_capacity(name.len());
    for (index, c) in name.char_indices() {
        let valid = if index == 0 {
            is_name_start_char(c)
        } else {
            is_name_char(c)
        };
        if c == '_' && escape_len(&name[index..]).is_some() {
            encoded.push_str("_x005F_");
        } else if valid {
            encoded.push(c);
        } else if (c as u32) > 0xFFFF {
            let _ = write!(encoded, "_x{:08X}_", c as u32);
        } else {
            let _ = write!(encoded, "_x{:04X}_", c as u32);
        }
    }
    encoded
}

/// Reverses [`encode_local_name`].
///
/// Sequences that do not decode to a valid `char` are kept verbatim.
///
/// # Examples
///
/// ```
/// use dcs_xml::decode_local_name;
///
/// assert_eq!(decode_local_name("Key_x0020_Value"), "Key Value");
/// assert_eq!(decode_local_name("_x005F_x0041_"), "_x0041_");
/// ```
pub fn decode_local_name(name: &str) -> String {
    let mut decoded = String::with_capacity(name.len());
    let mut index = 0;
    while index < name.len() {
        let rest = &name[index..];
        if let Some((len, code)) = escape_len(rest)
            && let Some(c) = char::from_u32(code)
        {
            decoded.push(c);
            index += len;
            continue;
        }
        let Some(c) = rest.chars().next() else {
            break;
        };
        decoded.push(c);
        index += c.len_utf8();
    }
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_round_trip() {
        for name in ["plain", "with space", "a:b", "9lives", "_x0020_", "naïve", "🦀crab"] {
            let encoded = encode_local_name(name);
            assert!(is_ncname(&encoded), "{encoded} is not an NCName");
            assert_eq!(decode_local_name(&encoded), name);
        }
    }

    #[test]
    fn supplementary_plane_uses_long_form() {
        assert_eq!(encode_local_name("\u{F0000}"), "_x000F0000_");
        assert_eq!(decode_local_name("_x000F0000_"), "\u{F0000}");
    }

    #[test]
    fn lone_underscore_is_kept() {
        assert_eq!(encode_local_name("_id"), "_id");
        assert_eq!(encode_local_name("a_xb"), "a_xb");
    }
}
