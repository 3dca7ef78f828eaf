use dcs_xml::{QualifiedName, encode_local_name, ns};

/// The stable name a type path gets when none is given explicitly.
///
/// The local name is the last path segment with generic arguments folded in
/// as `{Name}Of{Arg}…`; the namespace is the data contract namespace
/// followed by the remaining segments joined with dots.
///
/// # Examples
///
/// ```
/// use dcs_contract::contract::default_stable_name;
///
/// let name = default_stable_name("shop::orders::Order");
/// assert_eq!(name.name(), "Order");
/// assert_eq!(name.namespace(), "http://schemas.datacontract.org/2004/07/shop.orders");
///
/// let name = default_stable_name("shop::Pair<i32, shop::Item>");
/// assert_eq!(name.name(), "PairOfi32Item");
/// ```
pub fn default_stable_name(type_path: &str) -> QualifiedName {
    let (base, _) = split_generics(type_path);
    let namespace = match base.rsplit_once("::") {
        Some((module, _)) => format!("{}{}", ns::DATA_CONTRACT, module.replace("::", ".")),
        None => ns::DATA_CONTRACT.to_owned(),
    };
    QualifiedName::new(encode_local_name(&local_name(type_path)), namespace)
}

/// Name of a sequence of `item`: `ArrayOf{Item}`.
///
/// Builtin items live in the arrays namespace; any other item lends its
/// own namespace to the collection.
pub fn collection_name(item: &QualifiedName) -> QualifiedName {
    QualifiedName::new(
        format!("ArrayOf{}", item.name()),
        collection_namespace(&[item]),
    )
}

/// Name of a dictionary and of its pair element:
/// `ArrayOfKeyValueOf{Key}{Value}` and `KeyValueOf{Key}{Value}`.
pub fn dictionary_name(key: &QualifiedName, value: &QualifiedName) -> (QualifiedName, String) {
    let pair = format!("KeyValueOf{}{}", key.name(), value.name());
    let name = QualifiedName::new(format!("ArrayOf{pair}"), collection_namespace(&[key, value]));
    (name, pair)
}

fn collection_namespace(parts: &[&QualifiedName]) -> String {
    parts
        .iter()
        .map(|part| part.namespace())
        .find(|namespace| !ns::is_builtin(namespace))
        .unwrap_or(ns::SERIALIZATION_ARRAYS)
        .to_owned()
}

fn local_name(type_path: &str) -> String {
    let (base, arguments) = split_generics(type_path);
    let mut name = base.rsplit("::").next().unwrap_or(base).trim().to_owned();
    if !arguments.is_empty() {
        name.push_str("Of");
        for argument in arguments {
            name.push_str(&local_name(argument));
        }
    }
    name
}

/// Splits `a::B<C, D<E>>` into `a::B` and `[C, D<E>]`.
fn split_generics(type_path: &str) -> (&str, Vec<&str>) {
    let type_path = type_path.trim();
    let Some(open) = type_path.find('<') else {
        return (type_path, Vec::new());
    };
    let inner = type_path[open + 1..].strip_suffix('>').unwrap_or(&type_path[open + 1..]);

    let mut arguments = Vec::new();
    let mut depth = 0_usize;
    let mut start = 0;
    for (index, c) in inner.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                arguments.push(inner[start..index].trim());
                start = index + 1;
            }
            _ => {}
        }
    }
    let last = inner[start..].trim();
    if !last.is_empty() {
        arguments.push(last);
    }
    (&type_path[..open], arguments)
}

#[cfg(test)]
mod tests {
    use dcs_xml::{QualifiedName, ns};

    use super::{collection_name, default_stable_name, dictionary_name};

    #[test]
    fn plain_paths() {
        let name = default_stable_name("Point");
        assert_eq!(name.name(), "Point");
        assert_eq!(name.namespace(), ns::DATA_CONTRACT);

        let name = default_stable_name("geo::shapes::Point");
        assert_eq!(name.namespace(), "http://schemas.datacontract.org/2004/07/geo.shapes");
    }

    #[test]
    fn nested_generics() {
        let name = default_stable_name("geo::Wrapper<geo::Pair<i32, u8>>");
        assert_eq!(name.name(), "WrapperOfPairOfi32u8");
        assert_eq!(name.namespace(), "http://schemas.datacontract.org/2004/07/geo");
    }

    #[test]
    fn collections() {
        let int = QualifiedName::new("int", ns::XSD);
        let point = QualifiedName::new("Point", "urn:geo");

        let ints = collection_name(&int);
        assert_eq!(ints.name(), "ArrayOfint");
        assert_eq!(ints.namespace(), ns::SERIALIZATION_ARRAYS);

        let points = collection_name(&point);
        assert_eq!(points.name(), "ArrayOfPoint");
        assert_eq!(points.namespace(), "urn:geo");

        let (map, pair) = dictionary_name(&int, &point);
        assert_eq!(map.name(), "ArrayOfKeyValueOfintPoint");
        assert_eq!(map.namespace(), "urn:geo");
        assert_eq!(pair, "KeyValueOfintPoint");
    }
}
