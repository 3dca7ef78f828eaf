use serde::{Deserialize, Serialize};

/// Options of a [`DataContractSerializer`](crate::DataContractSerializer).
///
/// Every field has a default, so settings can be loaded from a partial
/// document.
///
/// # Examples
///
/// ```
/// use dcs_graph::SerializerSettings;
///
/// let settings: SerializerSettings =
///     serde_json::from_str(r#"{ "max_items_in_object_graph": 100 }"#).unwrap();
///
/// assert_eq!(settings.max_items_in_object_graph, 100);
/// assert!(settings.preserve_object_references);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializerSettings {
    /// Nodes one call may visit before failing with `GraphTooLarge`.
    pub max_items_in_object_graph: usize,
    /// Deepest nesting one call may reach.
    pub max_depth: usize,
    /// Write shared objects once and refer to them with `z:Ref`.
    /// Without it, shared objects are written repeatedly and cycles fail.
    pub preserve_object_references: bool,
    /// Skip unknown members on read instead of keeping them as extension
    /// data, and do not write extension data back.
    pub ignore_extension_data: bool,
    /// Type paths accepted as runtime types anywhere in the graph.
    pub known_types: Vec<String>,
    /// Root element name; the root contract's name if unset.
    pub root_name: Option<String>,
    /// Root element namespace; the root contract's namespace if unset.
    pub root_namespace: Option<String>,
}

impl Default for SerializerSettings {
    fn default() -> Self {
        Self {
            max_items_in_object_graph: i32::MAX as usize,
            max_depth: 512,
            preserve_object_references: true,
            ignore_extension_data: false,
            known_types: Vec::new(),
            root_name: None,
            root_namespace: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SerializerSettings;

    #[test]
    fn from_ron() {
        let settings: SerializerSettings = ron::from_str(
            r#"(
                preserve_object_references: false,
                known_types: ["zoo::Dog", "zoo::Cat"],
                root_name: Some("Animals"),
            )"#,
        )
        .unwrap();

        assert!(!settings.preserve_object_references);
        assert_eq!(settings.known_types, ["zoo::Dog", "zoo::Cat"]);
        assert_eq!(settings.root_name.as_deref(), Some("Animals"));
        assert_eq!(settings.max_depth, 512);
    }

    #[test]
    fn json_round_trip() {
        let settings = SerializerSettings {
            max_items_in_object_graph: 42,
            ignore_extension_data: true,
            ..SerializerSettings::default()
        };
        let text = serde_json::to_string(&settings).unwrap();
        let back: SerializerSettings = serde_json::from_str(&text).unwrap();
        assert_eq!(back, settings);
    }
}
