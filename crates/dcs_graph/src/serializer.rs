use std::sync::Arc;

use dcs_contract::SerializationSurrogate;
use dcs_contract::registry::TypeRegistry;
use dcs_contract::value::Value;
use dcs_xml::{XmlReader, XmlTextReader, XmlTextWriter, XmlWriter};

use crate::context::SerializationContext;
use crate::{GraphReader, GraphWriter, SerializationError, SerializerSettings};

// -----------------------------------------------------------------------------
// DataContractSerializer

/// Writes and reads object graphs rooted at one declared type.
///
/// The serializer itself is immutable and can be shared; every call builds
/// its own identity table, known-type scope and quota, so concurrent calls
/// do not interfere.
///
/// # Examples
///
/// ```
/// use dcs_contract::info::{EnumInfo, TypeInfo};
/// use dcs_contract::registry::TypeRegistry;
/// use dcs_contract::value::{EnumValue, Value};
/// use dcs_graph::DataContractSerializer;
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
/// let serializer = DataContractSerializer::with_registry("paint::Color", &registry);
/// let purple = Value::Enum(EnumValue::new("paint::Color", 5));
///
/// let xml = serializer.to_xml_string(&purple).unwrap();
/// assert!(xml.ends_with(">Red Blue</Color>"));
/// assert_eq!(serializer.from_xml_str(&xml).unwrap(), purple);
/// ```
pub struct DataContractSerializer<'a> {
    root_type: Arc<str>,
    registry: &'a TypeRegistry,
    settings: SerializerSettings,
    surrogate: Option<Arc<dyn SerializationSurrogate>>,
}

impl DataContractSerializer<'static> {
    /// A serializer for `root_type` over [`TypeRegistry::global`].
    pub fn new(root_type: impl Into<Arc<str>>) -> Self {
        Self::with_registry(root_type, TypeRegistry::global())
    }
}

impl<'a> DataContractSerializer<'a> {
    /// A serializer for `root_type` over `registry`.
    pub fn with_registry(root_type: impl Into<Arc<str>>, registry: &'a TypeRegistry) -> Self {
        Self {
            root_type: root_type.into(),
            registry,
            settings: SerializerSettings::default(),
            surrogate: None,
        }
    }

    /// Replaces the settings.
    pub fn with_settings(mut self, settings: SerializerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Installs a surrogate consulted for every type in the graph.
    pub fn with_surrogate(mut self, surrogate: Arc<dyn SerializationSurrogate>) -> Self {
        self.surrogate = Some(surrogate);
        self
    }

    #[inline]
    pub fn root_type(&self) -> &str {
        &self.root_type
    }

    #[inline]
    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    #[inline]
    pub fn settings(&self) -> &SerializerSettings {
        &self.settings
    }

    fn context(&self) -> Result<SerializationContext<'_>, SerializationError> {
        SerializationContext::new(
            self.registry,
            &self.settings,
            self.surrogate.as_deref(),
            &self.root_type,
        )
    }

    /// Writes `value` as one root element.
    ///
    /// On error the writer holds a partial document that must be discarded.
    pub fn write_object<W: XmlWriter + ?Sized>(
        &self,
        writer: &mut W,
        value: &Value,
    ) -> Result<(), SerializationError> {
        log::debug!("writing `{}`", self.root_type);
        let mut graph = GraphWriter::new(self.context()?, writer);
        match graph.write_top_level(value) {
            Ok(()) => {
                log::debug!("wrote `{}`", self.root_type);
                Ok(())
            }
            Err(error) => {
                graph.context_ref().log_failure("writing", &error);
                Err(error)
            }
        }
    }

    /// Reads the root element the reader sits on.
    pub fn read_object<R: XmlReader + ?Sized>(&self, reader: &mut R) -> Result<Value, SerializationError> {
        log::debug!("reading `{}`", self.root_type);
        let mut graph = GraphReader::new(self.context()?, reader);
        match graph.read_top_level() {
            Ok(value) => {
                log::debug!("read `{}`", self.root_type);
                Ok(value)
            }
            Err(error) => {
                graph.context_ref().log_failure("reading", &error);
                Err(error)
            }
        }
    }

    /// Whether the reader sits on the root element this serializer expects.
    pub fn is_start_object<R: XmlReader + ?Sized>(&self, reader: &mut R) -> Result<bool, SerializationError> {
        GraphReader::new(self.context()?, reader).is_start_object()
    }

    /// Writes `value` to a compact XML string.
    pub fn to_xml_string(&self, value: &Value) -> Result<String, SerializationError> {
        let mut writer = XmlTextWriter::new();
        self.write_object(&mut writer, value)?;
        Ok(writer.into_string()?)
    }

    /// Reads a value from an XML string.
    pub fn from_xml_str(&self, xml: &str) -> Result<Value, SerializationError> {
        let mut reader = XmlTextReader::new(xml)?;
        self.read_object(&mut reader)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use dcs_contract::info::{ClassInfo, CollectionInfo, EnumInfo, MemberInfo, TypeInfo};
    use dcs_contract::registry::TypeRegistry;
    use dcs_contract::value::{EnumValue, Object, ObjectRef, Value, graph_eq};
    use dcs_contract::{ContractError, SerializationSurrogate};
    use dcs_xml::XmlTextReader;

    use super::DataContractSerializer;
    use crate::{SerializationError, SerializerSettings};

    const SHOP: &str = "http://schemas.datacontract.org/2004/07/shop";
    const GRAPH: &str = "http://schemas.datacontract.org/2004/07/graph";
    const ZOO: &str = "http://schemas.datacontract.org/2004/07/zoo";
    const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";
    const Z: &str = "http://schemas.microsoft.com/2003/10/Serialization/";

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.register(TypeInfo::class(
            "shop::Order",
            ClassInfo::new()
                .with_member(MemberInfo::new("Id", "i32"))
                .with_member(MemberInfo::new("Customer", "String")),
        ));
        registry.register(TypeInfo::class(
            "shop::Ticket",
            ClassInfo::new().with_member(MemberInfo::new("Code", "String").required()),
        ));
        registry.register(TypeInfo::class(
            "graph::Node",
            ClassInfo::new()
                .with_member(MemberInfo::new("Name", "String"))
                .with_member(MemberInfo::new("Next", "graph::Node")),
        ));
        registry.register(TypeInfo::class(
            "graph::Shared",
            ClassInfo::new()
                .with_member(MemberInfo::new("Name", "String"))
                .with_member(MemberInfo::new("Next", "graph::Shared"))
                .with_reference(true),
        ));
        registry.register(TypeInfo::class(
            "graph::Pair",
            ClassInfo::new()
                .with_member(MemberInfo::new("First", "graph::Node"))
                .with_member(MemberInfo::new("Second", "graph::Node")),
        ));
        registry.register(
            TypeInfo::class(
                "zoo::Animal",
                ClassInfo::new().with_member(MemberInfo::new("Name", "String")),
            )
            .with_known_type("zoo::Dog"),
        );
        registry.register(TypeInfo::class(
            "zoo::Dog",
            ClassInfo::new()
                .with_base("zoo::Animal")
                .with_member(MemberInfo::new("Breed", "String")),
        ));
        registry.register(TypeInfo::class(
            "zoo::Cat",
            ClassInfo::new().with_base("zoo::Animal"),
        ));
        registry.register(TypeInfo::class(
            "zoo::Pen",
            ClassInfo::new().with_member(MemberInfo::new("Resident", "zoo::Animal")),
        ));
        registry.register(TypeInfo::class(
            "zoo::Keeper",
            ClassInfo::new()
                .with_member(MemberInfo::new("Pet", "zoo::Animal").with_known_type("zoo::Cat"))
                .with_member(MemberInfo::new("Spare", "zoo::Animal")),
        ));
        registry.register(TypeInfo::class(
            "graph::Link",
            ClassInfo::new()
                .with_member(MemberInfo::new("Node", "graph::Node"))
                .with_member(MemberInfo::new("Order", "shop::Order")),
        ));
        registry.register(TypeInfo::class(
            "shop::Envelope",
            ClassInfo::new().with_member(MemberInfo::new("Payload", "XmlElement")),
        ));
        registry.register(TypeInfo::enumeration(
            "paint::Color",
            EnumInfo::new()
                .with_member("Red", 1)
                .with_member("Green", 2)
                .with_member("Blue", 4)
                .with_flags(true),
        ));
        registry.register(TypeInfo::collection("num::Ints", CollectionInfo::list("i32")));
        registry.register(TypeInfo::collection("num::IntArray", CollectionInfo::array("i32")));
        registry.register(TypeInfo::collection(
            "num::Scores",
            CollectionInfo::dictionary("String", "i32"),
        ));
        registry.register(TypeInfo::class(
            "num::Both",
            ClassInfo::new()
                .with_member(MemberInfo::new("List", "num::Ints"))
                .with_member(MemberInfo::new("Array", "num::IntArray")),
        ));
        registry.register(TypeInfo::class(
            "geo::Point",
            ClassInfo::new()
                .with_member(MemberInfo::new("X", "i32"))
                .with_member(MemberInfo::new("Y", "i32")),
        ));
        registry.register(TypeInfo::class(
            "geo::PointText",
            ClassInfo::new().with_member(MemberInfo::new("Text", "String")),
        ));
        registry.register(TypeInfo::class(
            "geo::Segment",
            ClassInfo::new()
                .with_member(MemberInfo::new("From", "geo::Point"))
                .with_member(MemberInfo::new("To", "geo::Point")),
        ));
        registry
    }

    fn order(id: i32, customer: &str) -> Value {
        Value::object(
            Object::new_class("shop::Order")
                .with_field("Id", Value::I32(id))
                .with_field("Customer", Value::from(customer)),
        )
    }

    fn node(name: &str) -> ObjectRef {
        ObjectRef::new(
            Object::new_class("graph::Node")
                .with_field("Name", Value::from(name))
                .with_field("Next", Value::Null),
        )
    }

    fn chain(length: usize) -> Value {
        let head = node("0");
        let mut tail = head.clone();
        for index in 1..length {
            let next = node(&index.to_string());
            tail.borrow_mut()
                .set_field("Next", Value::Object(next.clone()));
            tail = next;
        }
        Value::Object(head)
    }

    fn ints(count: i32) -> Value {
        let mut list = Object::new_collection("num::Ints");
        for value in 0..count {
            list.push_item(Value::I32(value));
        }
        Value::object(list)
    }

    fn without_references() -> SerializerSettings {
        SerializerSettings {
            preserve_object_references: false,
            ..SerializerSettings::default()
        }
    }

    fn field(value: &Value, name: &str) -> Value {
        value
            .as_object()
            .and_then(|object| object.borrow().field(name).cloned())
            .unwrap_or_default()
    }

    #[test]
    fn class_layout() {
        let registry = registry();
        let serializer = DataContractSerializer::with_registry("shop::Order", &registry);

        let xml = serializer.to_xml_string(&order(7, "Ann")).unwrap();
        assert_eq!(
            xml,
            format!(
                r#"<Order xmlns="{SHOP}" xmlns:i="{XSI}" xmlns:z="{Z}" z:Id="i1"><Customer>Ann</Customer><Id>7</Id></Order>"#
            )
        );
    }

    #[test]
    fn round_trips() {
        let registry = registry();

        let value = order(42, "Bo & Co <ltd>");
        let serializer = DataContractSerializer::with_registry("shop::Order", &registry);
        let back = serializer
            .from_xml_str(&serializer.to_xml_string(&value).unwrap())
            .unwrap();
        assert!(graph_eq(&value, &back));

        let value = ints(3);
        let serializer = DataContractSerializer::with_registry("num::Ints", &registry);
        let xml = serializer.to_xml_string(&value).unwrap();
        assert!(xml.contains("<int>0</int><int>1</int><int>2</int>"));
        assert!(graph_eq(&value, &serializer.from_xml_str(&xml).unwrap()));

        let value = Value::object(
            Object::new_dictionary("num::Scores")
                .with_entry(Value::from("a"), Value::I32(1))
                .with_entry(Value::from("b"), Value::I32(2)),
        );
        let serializer = DataContractSerializer::with_registry("num::Scores", &registry);
        let xml = serializer.to_xml_string(&value).unwrap();
        assert!(xml.contains("<KeyValueOfstringint><Key>a</Key><Value>1</Value></KeyValueOfstringint>"));
        assert!(graph_eq(&value, &serializer.from_xml_str(&xml).unwrap()));

        let value = Value::I64(-5);
        let serializer = DataContractSerializer::with_registry("i64", &registry);
        let xml = serializer.to_xml_string(&value).unwrap();
        assert_eq!(serializer.from_xml_str(&xml).unwrap(), value);
    }

    #[test]
    fn flags_enum() {
        let registry = registry();
        let serializer = DataContractSerializer::with_registry("paint::Color", &registry);

        let purple = Value::Enum(EnumValue::new("paint::Color", 5));
        let xml = serializer.to_xml_string(&purple).unwrap();
        assert_eq!(
            xml,
            format!(
                r#"<Color xmlns="http://schemas.datacontract.org/2004/07/paint" xmlns:i="{XSI}">Red Blue</Color>"#
            )
        );
        assert_eq!(serializer.from_xml_str(&xml).unwrap(), purple);

        let error = serializer
            .to_xml_string(&Value::Enum(EnumValue::new("paint::Color", 8)))
            .unwrap_err();
        assert!(matches!(error, SerializationError::InvalidEnumValue { .. }));

        let xml = xml.replace("Red Blue", "Red Purple");
        let error = serializer.from_xml_str(&xml).unwrap_err();
        assert!(matches!(error, SerializationError::InvalidEnumValue { .. }));
    }

    #[test]
    fn cycle_comes_back_as_cycle() {
        let registry = registry();
        let serializer = DataContractSerializer::with_registry("graph::Node", &registry);

        let a = node("a");
        a.borrow_mut().set_field("Next", Value::Object(a.clone()));
        let xml = serializer.to_xml_string(&Value::Object(a)).unwrap();
        assert!(xml.contains(r#"<Next z:Ref="i1" i:nil="true"/>"#));

        let back = serializer.from_xml_str(&xml).unwrap();
        let next = field(&back, "Next");
        assert!(back.as_object().unwrap().ptr_eq(next.as_object().unwrap()));
    }

    #[test]
    fn shared_objects_are_written_once() {
        let registry = registry();
        let serializer = DataContractSerializer::with_registry("graph::Pair", &registry);

        let shared = Value::Object(node("s"));
        let pair = Value::object(
            Object::new_class("graph::Pair")
                .with_field("First", shared.clone())
                .with_field("Second", shared),
        );
        let xml = serializer.to_xml_string(&pair).unwrap();
        assert_eq!(xml.matches("<Name>s</Name>").count(), 1);

        let back = serializer.from_xml_str(&xml).unwrap();
        assert!(graph_eq(&pair, &back));
        let (first, second) = (field(&back, "First"), field(&back, "Second"));
        assert!(first.as_object().unwrap().ptr_eq(second.as_object().unwrap()));

        // Without preservation the object is written twice and read back as two.
        let serializer = serializer.with_settings(without_references());
        let xml = serializer.to_xml_string(&pair).unwrap();
        assert_eq!(xml.matches("<Name>s</Name>").count(), 2);
        assert!(!xml.contains("z:Id"));
        let back = serializer.from_xml_str(&xml).unwrap();
        let (first, second) = (field(&back, "First"), field(&back, "Second"));
        assert!(!first.as_object().unwrap().ptr_eq(second.as_object().unwrap()));
    }

    #[test]
    fn cycle_without_references_fails() {
        let registry = registry();
        let serializer = DataContractSerializer::with_registry("graph::Node", &registry)
            .with_settings(without_references());

        let a = node("a");
        a.borrow_mut().set_field("Next", Value::Object(a.clone()));
        let error = serializer.to_xml_string(&Value::Object(a)).unwrap_err();
        assert!(matches!(error, SerializationError::CycleDetected { .. }));
    }

    #[test]
    fn reference_classes_always_track() {
        let registry = registry();
        let serializer = DataContractSerializer::with_registry("graph::Shared", &registry)
            .with_settings(without_references());

        let a = ObjectRef::new(
            Object::new_class("graph::Shared").with_field("Name", Value::from("a")),
        );
        a.borrow_mut().set_field("Next", Value::Object(a.clone()));
        let xml = serializer.to_xml_string(&Value::Object(a)).unwrap();
        assert!(xml.contains(r#"z:Ref="i1""#));

        let back = serializer.from_xml_str(&xml).unwrap();
        let next = field(&back, "Next");
        assert!(back.as_object().unwrap().ptr_eq(next.as_object().unwrap()));
    }

    #[test]
    fn item_quota() {
        let registry = registry();
        let limited = |limit| {
            DataContractSerializer::with_registry("num::Ints", &registry).with_settings(SerializerSettings {
                max_items_in_object_graph: limit,
                ..SerializerSettings::default()
            })
        };

        // The list element itself plus one per item.
        let xml = limited(11).to_xml_string(&ints(10)).unwrap();
        assert!(limited(11).from_xml_str(&xml).is_ok());

        let error = limited(10).to_xml_string(&ints(10)).unwrap_err();
        assert!(matches!(error, SerializationError::GraphTooLarge { limit: 10, .. }));
        let error = limited(10).from_xml_str(&xml).unwrap_err();
        assert!(matches!(error, SerializationError::GraphTooLarge { limit: 10, .. }));
    }

    #[test]
    fn declared_size_is_checked_before_allocating() {
        let registry = registry();
        let serializer = DataContractSerializer::with_registry("num::IntArray", &registry).with_settings(
            SerializerSettings {
                max_items_in_object_graph: 100,
                ..SerializerSettings::default()
            },
        );
        let arrays = "http://schemas.microsoft.com/2003/10/Serialization/Arrays";

        let xml = format!(r#"<ArrayOfint xmlns="{arrays}" xmlns:z="{Z}" z:Id="i1" z:Size="1000000"/>"#);
        let error = serializer.from_xml_str(&xml).unwrap_err();
        assert!(matches!(error, SerializationError::GraphTooLarge { .. }));

        let xml = format!(r#"<ArrayOfint xmlns="{arrays}" xmlns:z="{Z}" z:Id="i1" z:Size="2"><int>1</int></ArrayOfint>"#);
        let error = serializer.from_xml_str(&xml).unwrap_err();
        assert!(matches!(error, SerializationError::MalformedInput { .. }));

        let array = Value::object(
            Object::new_collection("num::IntArray")
                .with_item(Value::I32(1))
                .with_item(Value::I32(2)),
        );
        let xml = serializer.to_xml_string(&array).unwrap();
        assert!(xml.contains(r#"z:Size="2""#));
        assert!(graph_eq(&array, &serializer.from_xml_str(&xml).unwrap()));
    }

    #[test]
    fn depth_limit() {
        let registry = registry();
        let serializer = DataContractSerializer::with_registry("graph::Node", &registry).with_settings(
            SerializerSettings {
                max_depth: 8,
                ..SerializerSettings::default()
            },
        );

        // Every node is one level and its name another.
        assert!(serializer.to_xml_string(&chain(3)).is_ok());
        let error = serializer.to_xml_string(&chain(20)).unwrap_err();
        assert!(matches!(error, SerializationError::MaxDepthExceeded { limit: 8 }));

        let deep = DataContractSerializer::with_registry("graph::Node", &registry)
            .to_xml_string(&chain(20))
            .unwrap();
        let error = serializer.from_xml_str(&deep).unwrap_err();
        assert!(matches!(error, SerializationError::MaxDepthExceeded { limit: 8 }));
    }

    #[test]
    fn derived_types_carry_their_name() {
        let registry = registry();
        let serializer = DataContractSerializer::with_registry("zoo::Pen", &registry);

        let dog = Value::object(
            Object::new_class("zoo::Dog")
                .with_field("Name", Value::from("Rex"))
                .with_field("Breed", Value::from("Lab")),
        );
        let pen = Value::object(Object::new_class("zoo::Pen").with_field("Resident", dog));
        let xml = serializer.to_xml_string(&pen).unwrap();
        assert!(xml.contains(r#"i:type="d2p1:Dog""#));
        assert!(xml.contains("<Name>Rex</Name><Breed>Lab</Breed>"));

        let back = serializer.from_xml_str(&xml).unwrap();
        assert!(graph_eq(&pen, &back));
        assert_eq!(&*field(&back, "Resident").type_path().unwrap(), "zoo::Dog");
    }

    #[test]
    fn unexpected_types_are_rejected() {
        let registry = registry();
        let serializer = DataContractSerializer::with_registry("zoo::Pen", &registry);

        let cat = Value::object(Object::new_class("zoo::Cat").with_field("Name", Value::from("Tom")));
        let pen = Value::object(Object::new_class("zoo::Pen").with_field("Resident", cat));
        let error = serializer.to_xml_string(&pen).unwrap_err();
        assert!(matches!(error, SerializationError::UnknownType { .. }));

        let known = serializer.with_settings(SerializerSettings {
            known_types: vec![String::from("zoo::Cat")],
            ..SerializerSettings::default()
        });
        let xml = known.to_xml_string(&pen).unwrap();
        assert!(graph_eq(&pen, &known.from_xml_str(&xml).unwrap()));

        let serializer = DataContractSerializer::with_registry("zoo::Pen", &registry);
        let error = serializer.from_xml_str(&xml).unwrap_err();
        assert!(matches!(error, SerializationError::UnknownType { .. }));

        let pen = Value::object(Object::new_class("zoo::Pen").with_field("Resident", Value::Object(node("n"))));
        let error = serializer.to_xml_string(&pen).unwrap_err();
        assert!(matches!(error, SerializationError::UnsupportedPolymorphism { .. }));
    }

    #[test]
    fn member_known_types_stay_in_their_member() {
        let registry = registry();
        let serializer = DataContractSerializer::with_registry("zoo::Keeper", &registry);
        let cat = || Value::object(Object::new_class("zoo::Cat").with_field("Name", Value::from("Tom")));

        let keeper = Value::object(
            Object::new_class("zoo::Keeper")
                .with_field("Pet", cat())
                .with_field("Spare", Value::Null),
        );
        let xml = serializer.to_xml_string(&keeper).unwrap();
        assert!(graph_eq(&keeper, &serializer.from_xml_str(&xml).unwrap()));

        let keeper = Value::object(
            Object::new_class("zoo::Keeper")
                .with_field("Pet", Value::Null)
                .with_field("Spare", cat()),
        );
        let error = serializer.to_xml_string(&keeper).unwrap_err();
        assert!(matches!(error, SerializationError::UnknownType { .. }));

        let xml = format!(
            r#"<Keeper xmlns="{ZOO}" xmlns:i="{XSI}" xmlns:a="{ZOO}"><Pet i:type="a:Cat"><Name>Tom</Name></Pet><Spare i:type="a:Cat"><Name>Tom</Name></Spare></Keeper>"#
        );
        let error = serializer.from_xml_str(&xml).unwrap_err();
        assert!(matches!(error, SerializationError::UnknownType { .. }));
    }

    #[test]
    fn references_must_fit_the_declared_type() {
        let registry = registry();
        let serializer = DataContractSerializer::with_registry("graph::Link", &registry);

        let xml = format!(
            r#"<Link xmlns="{GRAPH}" xmlns:i="{XSI}" xmlns:z="{Z}"><Node z:Id="i1"><Name>a</Name><Next i:nil="true"/></Node><Order z:Ref="i1" i:nil="true"/></Link>"#
        );
        let error = serializer.from_xml_str(&xml).unwrap_err();
        assert!(matches!(
            error,
            SerializationError::UnsupportedPolymorphism { ref declared, ref actual }
                if &**declared == "shop::Order" && &**actual == "graph::Node"
        ));
    }

    #[test]
    fn raw_xml_members_round_trip() {
        let registry = registry();
        let serializer = DataContractSerializer::with_registry("shop::Envelope", &registry);
        let xml = format!(r#"<Envelope xmlns="{SHOP}"><Payload><x xmlns="urn:q" k="v">t</x></Payload></Envelope>"#);

        let value = serializer.from_xml_str(&xml).unwrap();
        assert!(matches!(field(&value, "Payload"), Value::Xml(ref nodes) if nodes.len() == 1));

        let written = serializer.to_xml_string(&value).unwrap();
        assert!(written.contains(r#"<Payload><x xmlns="urn:q" k="v">t</x></Payload>"#));
        assert_eq!(field(&serializer.from_xml_str(&written).unwrap(), "Payload"), field(&value, "Payload"));
    }

    #[test]
    fn unknown_members_count_against_the_same_quota() {
        let registry = registry();
        let limited = |limit| {
            DataContractSerializer::with_registry("shop::Order", &registry).with_settings(SerializerSettings {
                max_items_in_object_graph: limit,
                ..SerializerSettings::default()
            })
        };
        let xml = format!(r#"<Order xmlns="{SHOP}"><Customer>Ann</Customer><Note><a/><b/><c/></Note><Id>7</Id></Order>"#);
        let value = limited(100).from_xml_str(&xml).unwrap();

        // Order, Customer and Id, plus the four elements of Note.
        let written = limited(7).to_xml_string(&value).unwrap();
        assert!(limited(7).from_xml_str(&written).is_ok());

        let error = limited(6).to_xml_string(&value).unwrap_err();
        assert!(matches!(error, SerializationError::GraphTooLarge { limit: 6, .. }));
        let error = limited(6).from_xml_str(&written).unwrap_err();
        assert!(matches!(error, SerializationError::GraphTooLarge { limit: 6, .. }));
    }

    #[test]
    fn unknown_members_survive_a_round_trip() {
        let registry = registry();
        let serializer = DataContractSerializer::with_registry("shop::Order", &registry);
        let xml = format!(
            r#"<Order xmlns="{SHOP}"><Customer>Ann</Customer><Note lang="en">hi <b>there</b></Note><Id>7</Id></Order>"#
        );

        let value = serializer.from_xml_str(&xml).unwrap();
        let written = serializer.to_xml_string(&value).unwrap();
        assert!(written.contains(r#"<Customer>Ann</Customer><Note lang="en">hi <b>there</b></Note><Id>7</Id>"#));

        let ignoring = DataContractSerializer::with_registry("shop::Order", &registry).with_settings(
            SerializerSettings {
                ignore_extension_data: true,
                ..SerializerSettings::default()
            },
        );
        let value = ignoring.from_xml_str(&xml).unwrap();
        assert!(value.as_object().unwrap().borrow().extension_data().is_none());
        assert!(graph_eq(&value, &order(7, "Ann")));
    }

    #[test]
    fn malformed_documents() {
        let registry = registry();

        let serializer = DataContractSerializer::with_registry("graph::Node", &registry);
        let xml = format!(
            r#"<Node xmlns="{GRAPH}" xmlns:i="{XSI}" xmlns:z="{Z}"><Name>a</Name><Next z:Ref="i9" i:nil="true"/></Node>"#
        );
        let error = serializer.from_xml_str(&xml).unwrap_err();
        assert!(matches!(error, SerializationError::DanglingReference { ref id, .. } if id == "i9"));

        let xml = format!(r#"<Node xmlns="{GRAPH}"><Name>a</Name><Name>b</Name></Node>"#);
        let error = serializer.from_xml_str(&xml).unwrap_err();
        assert!(matches!(error, SerializationError::MalformedInput { .. }));

        let serializer = DataContractSerializer::with_registry("shop::Ticket", &registry);
        let error = serializer.from_xml_str(&format!(r#"<Ticket xmlns="{SHOP}"/>"#)).unwrap_err();
        assert!(matches!(
            error,
            SerializationError::RequiredMemberMissing { ref member, .. } if &**member == "Code"
        ));

        let serializer = DataContractSerializer::with_registry("shop::Order", &registry);
        let xml = format!(r#"<Order xmlns="{SHOP}"><Id>seven</Id></Order>"#);
        let error = serializer.from_xml_str(&xml).unwrap_err();
        assert!(matches!(error, SerializationError::MalformedInput { .. }));
    }

    #[test]
    fn root_element_is_verified() {
        let registry = registry();
        let serializer = DataContractSerializer::with_registry("shop::Order", &registry);

        let mut reader = XmlTextReader::new(r#"<Invoice xmlns="urn:billing"/>"#).unwrap();
        assert!(!serializer.is_start_object(&mut reader).unwrap());
        let error = serializer.read_object(&mut reader).unwrap_err();
        assert!(matches!(error, SerializationError::MalformedInput { .. }));

        let renamed = serializer.with_settings(SerializerSettings {
            root_name: Some(String::from("Purchase")),
            root_namespace: Some(String::from("urn:shop")),
            ..SerializerSettings::default()
        });
        let xml = renamed.to_xml_string(&order(1, "Cy")).unwrap();
        assert!(xml.starts_with(r#"<Purchase xmlns="urn:shop""#));
        let mut reader = XmlTextReader::new(&xml).unwrap();
        assert!(renamed.is_start_object(&mut reader).unwrap());
        assert!(graph_eq(&order(1, "Cy"), &renamed.read_object(&mut reader).unwrap()));
    }

    #[test]
    fn names_must_be_unique_per_call() {
        let registry = registry();
        let serializer = DataContractSerializer::with_registry("num::Both", &registry);

        let both = Value::object(
            Object::new_class("num::Both")
                .with_field("List", ints(1))
                .with_field("Array", Value::object(Object::new_collection("num::IntArray"))),
        );
        let error = serializer.to_xml_string(&both).unwrap_err();
        assert!(matches!(
            error,
            SerializationError::InvalidContract(ContractError::DuplicateName { .. })
        ));
    }

    #[test]
    fn value_members_are_not_nullable() {
        let registry = registry();
        let serializer = DataContractSerializer::with_registry("shop::Order", &registry);

        let value = Value::object(
            Object::new_class("shop::Order")
                .with_field("Id", Value::Null)
                .with_field("Customer", Value::Null),
        );
        let error = serializer.to_xml_string(&value).unwrap_err();
        assert!(matches!(
            error,
            SerializationError::InvalidContract(ContractError::NotNullable { .. })
        ));

        let xml = format!(r#"<Order xmlns="{SHOP}" xmlns:i="{XSI}"><Id i:nil="true"/></Order>"#);
        let error = serializer.from_xml_str(&xml).unwrap_err();
        assert!(matches!(error, SerializationError::MalformedInput { .. }));
    }

    /// Sends `geo::Point` as `geo::PointText { Text: "x,y" }`.
    struct PointAsText;

    impl SerializationSurrogate for PointAsText {
        fn surrogate_type(&self, type_path: &str) -> Option<Arc<str>> {
            (type_path == "geo::Point").then(|| Arc::from("geo::PointText"))
        }

        fn to_serializable(&self, value: &Value, _surrogate_type: &str) -> Value {
            let coordinate = |name| match field(value, name) {
                Value::I32(v) => v,
                _ => 0,
            };
            let text = format!("{},{}", coordinate("X"), coordinate("Y"));
            Value::object(Object::new_class("geo::PointText").with_field("Text", Value::from(text)))
        }

        fn from_serializable(&self, value: Value, _original_type: &str) -> Value {
            let Value::String(text) = field(&value, "Text") else {
                return Value::Null;
            };
            let (x, y) = text.split_once(',').unwrap_or(("0", "0"));
            Value::object(
                Object::new_class("geo::Point")
                    .with_field("X", Value::I32(x.parse().unwrap_or(0)))
                    .with_field("Y", Value::I32(y.parse().unwrap_or(0))),
            )
        }
    }

    #[test]
    fn surrogates_keep_shared_references() {
        let registry = registry();
        let serializer = DataContractSerializer::with_registry("geo::Segment", &registry)
            .with_surrogate(Arc::new(PointAsText));

        let point = Value::object(
            Object::new_class("geo::Point")
                .with_field("X", Value::I32(3))
                .with_field("Y", Value::I32(-4)),
        );
        let segment = Value::object(
            Object::new_class("geo::Segment")
                .with_field("From", point.clone())
                .with_field("To", point),
        );

        let xml = serializer.to_xml_string(&segment).unwrap();
        assert!(xml.contains(r#"<From z:Id="i2"><Text>3,-4</Text></From>"#));
        assert!(xml.contains(r#"<To z:Ref="i2" i:nil="true"/>"#));

        let back = serializer.from_xml_str(&xml).unwrap();
        assert!(graph_eq(&segment, &back));
        let (from, to) = (field(&back, "From"), field(&back, "To"));
        assert!(from.as_object().unwrap().ptr_eq(to.as_object().unwrap()));
    }
}
