use std::sync::Arc;

use dcs_contract::ContractError;
use dcs_contract::contract::{ClassContract, CollectionContract, Contract, ContractKind, DataMember};
use dcs_contract::info::{CollectionShape, PrimitiveType};
use dcs_contract::value::{EnumValue, ExtensionData, ObjectRef, Value};
use dcs_xml::{NodeKind, Position, QualifiedName, XmlReader, ns};

use crate::context::{SerializationContext, Substitution, Traversal};
use crate::{ReferenceTable, SerializationError};

// -----------------------------------------------------------------------------
// Header

/// The serialization attributes of one start tag.
#[derive(Debug, Default)]
struct Header {
    id: Option<String>,
    reference: Option<String>,
    type_name: Option<String>,
    nil: bool,
    size: Option<String>,
}

impl Header {
    fn read<R: XmlReader + ?Sized>(reader: &R) -> Result<Self, SerializationError> {
        let nil = match reader.attribute("nil", ns::XSI).map(str::trim) {
            None | Some("false" | "0") => false,
            Some("true" | "1") => true,
            Some(other) => {
                return Err(SerializationError::malformed(
                    format!("`{other}` is not a valid value of i:nil"),
                    reader.position(),
                ));
            }
        };
        Ok(Self {
            id: reader.attribute("Id", ns::SERIALIZATION).map(str::to_owned),
            reference: reader.attribute("Ref", ns::SERIALIZATION).map(str::to_owned),
            type_name: reader.attribute("type", ns::XSI).map(str::to_owned),
            nil,
            size: reader.attribute("Size", ns::SERIALIZATION).map(str::to_owned),
        })
    }
}

// -----------------------------------------------------------------------------
// GraphReader

/// Rebuilds one object graph.
///
/// Every element goes through the same steps: charge the quota, resolve
/// `z:Ref` against the objects read so far, return `Null` for `i:nil`, pick
/// the contract named by `i:type` (or the declared one), then read the
/// content. Objects are registered under their `z:Id` before their members
/// are read, so references back to an ancestor resolve.
///
/// A reader is good for a single call; see
/// [`DataContractSerializer::read_object`](crate::DataContractSerializer::read_object).
pub struct GraphReader<'a, R: XmlReader + ?Sized> {
    context: SerializationContext<'a>,
    reader: &'a mut R,
    refs: ReferenceTable,
}

impl<'a, R: XmlReader + ?Sized> Traversal<'a> for GraphReader<'a, R> {
    #[inline]
    fn context(&mut self) -> &mut SerializationContext<'a> {
        &mut self.context
    }
}

impl<'a, R: XmlReader + ?Sized> GraphReader<'a, R> {
    pub(crate) fn new(context: SerializationContext<'a>, reader: &'a mut R) -> Self {
        Self {
            context,
            reader,
            refs: ReferenceTable::new(),
        }
    }

    pub(crate) fn context_ref(&self) -> &SerializationContext<'a> {
        &self.context
    }

    /// Whether the reader sits on the expected root element.
    pub fn is_start_object(&mut self) -> Result<bool, SerializationError> {
        let name = self.context.root_name();
        Ok(self
            .reader
            .is_start_element_named(name.name(), name.namespace())?)
    }

    /// Reads the root element and everything below it.
    pub fn read_top_level(&mut self) -> Result<Value, SerializationError> {
        if !self.is_start_object()? {
            let expected = self.context.root_name();
            let found = match self.reader.move_to_content()? {
                NodeKind::Element => QualifiedName::new(
                    self.reader.local_name(),
                    self.reader.namespace_uri(),
                )
                .to_string(),
                other => format!("{other:?}"),
            };
            return Err(SerializationError::malformed(
                format!("expected root element {expected}, found {found}"),
                self.reader.position(),
            ));
        }
        let root = self.context.root().clone();
        let value = self.read_value(&root)?;
        log::trace!("read {} object ids", self.refs.len());
        Ok(value)
    }

    fn position(&self) -> Option<Position> {
        self.reader.position()
    }

    /// Reads the element the reader sits on as a value declared `declared`.
    fn read_value(&mut self, declared: &Arc<Contract>) -> Result<Value, SerializationError> {
        self.context.consume(declared.type_path())?;
        let header = Header::read(&*self.reader)?;

        if let Some(id) = &header.reference {
            let position = self.position();
            let value = self.refs.get(id).cloned().ok_or_else(|| {
                SerializationError::DanglingReference {
                    id: id.clone(),
                    position,
                }
            })?;
            self.check_reference(&value, declared)?;
            self.reader.skip()?;
            return Ok(value);
        }
        if header.nil {
            self.reader.skip()?;
            return Ok(Value::Null);
        }

        let mut contract = match &header.type_name {
            Some(type_name) => self.resolve_type(type_name, declared)?,
            None => declared.clone(),
        };
        if contract.type_path() != declared.type_path()
            && self.context.substitution(declared, &contract)? == Substitution::Equivalent
        {
            contract = declared.clone();
        }

        self.context.enter(&contract)?;
        let value = self.read_content(&contract, &header)?;
        self.context.exit();
        Ok(value)
    }

    /// A referenced object must fit where it is referenced from, as it would
    /// have to when written there.
    fn check_reference(&mut self, value: &Value, declared: &Arc<Contract>) -> Result<(), SerializationError> {
        let Some(type_path) = value.type_path() else {
            return Ok(());
        };
        // Surrogate values still being read are registered in their wire form.
        if declared
            .as_surrogate()
            .is_some_and(|surrogate| surrogate.substitute().type_path() == &*type_path)
        {
            return Ok(());
        }
        let actual = self.context.contract(&type_path)?;
        self.context.substitution(declared, &actual)?;
        Ok(())
    }

    /// Maps an `i:type` value to a contract from the known types in scope.
    fn resolve_type(
        &mut self,
        type_name: &str,
        declared: &Arc<Contract>,
    ) -> Result<Arc<Contract>, SerializationError> {
        let (prefix, local) = match type_name.trim().split_once(':') {
            Some((prefix, local)) => (prefix, local),
            None => ("", type_name.trim()),
        };
        let Some(namespace) = self.reader.lookup_namespace(prefix) else {
            return Err(SerializationError::malformed(
                format!("namespace prefix `{prefix}` of type `{type_name}` is not declared"),
                self.position(),
            ));
        };
        let name = QualifiedName::new(local, namespace);
        if declared.stable_name() == &name {
            return Ok(declared.clone());
        }
        self.context
            .lookup_known_type(&name)
            .ok_or_else(|| SerializationError::UnknownType {
                name: name.to_string(),
                declared: declared.type_path_arc().clone(),
                position: self.reader.position(),
            })
    }

    fn register(&mut self, header: &Header, value: &Value) {
        if let Some(id) = &header.id
            && !self.refs.insert(id, value.clone())
        {
            log::warn!("object id `{id}` is defined more than once; the last definition wins");
        }
    }

    fn read_content(&mut self, contract: &Arc<Contract>, header: &Header) -> Result<Value, SerializationError> {
        match contract.kind() {
            ContractKind::Primitive(PrimitiveType::Object) => {
                let value = Value::object(self.context.registry().construct(contract.type_path())?);
                self.register(header, &value);
                self.reader.skip()?;
                Ok(value)
            }
            ContractKind::Primitive(primitive) => {
                let position = self.position();
                let text = self.reader.read_element_content_as_string()?;
                primitive.parse(&text).ok_or_else(|| {
                    SerializationError::malformed(
                        format!("`{text}` is not a valid {}", primitive.stable_name()),
                        position,
                    )
                })
            }
            ContractKind::Enum(enumeration) => {
                let position = self.position();
                let text = self.reader.read_element_content_as_string()?;
                match enumeration.parse(&text) {
                    Some(bits) => Ok(Value::Enum(EnumValue::new(contract.type_path_arc().clone(), bits))),
                    None => Err(SerializationError::InvalidEnumValue {
                        type_path: contract.type_path_arc().clone(),
                        value: text,
                        position,
                    }),
                }
            }
            ContractKind::XmlAny => Ok(Value::Xml(self.reader.read_subtree()?.children)),
            ContractKind::Class(class) => self.read_class(contract, class, header),
            ContractKind::Collection(collection) => self.read_collection(contract, collection, header),
            ContractKind::Surrogate(surrogate) => {
                let substitute = surrogate.substitute().clone();
                let value = self.read_content(&substitute, header)?;
                let Some(surrogate) = self.context.surrogate() else {
                    return Ok(value);
                };
                let original = surrogate.from_serializable(value, contract.type_path());
                if let Some(id) = &header.id {
                    self.refs.replace(id, original.clone());
                }
                Ok(original)
            }
        }
    }

    /// Advances to the next child start tag, or consumes the end tag and
    /// returns `false`.
    fn next_child(&mut self, owner: &Contract) -> Result<bool, SerializationError> {
        match self.reader.move_to_content()? {
            NodeKind::Element => Ok(true),
            NodeKind::EndElement => {
                self.reader.read_end_element()?;
                Ok(false)
            }
            NodeKind::Text => Err(SerializationError::malformed(
                format!("unexpected text in `{}`", owner.type_path()),
                self.position(),
            )),
            NodeKind::Eof => Err(SerializationError::malformed(
                "unexpected end of document",
                self.position(),
            )),
        }
    }

    fn read_class(
        &mut self,
        contract: &Arc<Contract>,
        class: &ClassContract,
        header: &Header,
    ) -> Result<Value, SerializationError> {
        if class.is_abstract() {
            return Err(ContractError::Abstract {
                type_path: contract.type_path_arc().clone(),
            }
            .into());
        }
        let registry = self.context.registry();
        let object = ObjectRef::new(registry.construct(contract.type_path())?);
        let value = Value::Object(object.clone());
        self.register(header, &value);

        let mut members: Vec<(Arc<Contract>, &DataMember)> = Vec::new();
        let hierarchy = contract.class_hierarchy(registry)?;
        for level in &hierarchy {
            if let Some(class) = level.as_class() {
                members.extend(class.members().iter().map(|member| (level.clone(), member)));
            }
        }

        let mut seen = vec![false; members.len()];
        let mut extension = ExtensionData::new();
        let mut next = 0;

        self.reader.read_start_element()?;
        while self.next_child(contract)? {
            let found = members.iter().position(|(_, member)| {
                self.reader.local_name() == member.name() && self.reader.namespace_uri() == member.namespace()
            });
            let Some(index) = found else {
                self.read_unknown(contract, next, &mut extension)?;
                continue;
            };
            if seen[index] {
                return Err(SerializationError::malformed(
                    format!(
                        "member `{}` of `{}` appears more than once",
                        members[index].1.name(),
                        contract.type_path()
                    ),
                    self.position(),
                ));
            }
            seen[index] = true;
            next = index + 1;

            let member = members[index].1;
            let declared = self.context.contract(member.type_path())?;
            let member_value = self.with_known_types(&declared, member.known_types(), |this| {
                this.read_value(&declared)
            })?;
            if member_value.is_null() && !member.is_nullable() {
                return Err(SerializationError::malformed(
                    format!(
                        "member `{}` of `{}` is not nullable",
                        member.name(),
                        contract.type_path()
                    ),
                    self.position(),
                ));
            }
            member.accessor().set(&mut object.borrow_mut(), member_value);
        }

        if let Some(missing) = members
            .iter()
            .zip(&seen)
            .find(|((_, member), seen)| member.is_required() && !**seen)
        {
            let ((owner, member), _) = missing;
            return Err(SerializationError::RequiredMemberMissing {
                type_path: owner.type_path_arc().clone(),
                member: member.name_arc().clone(),
                position: self.position(),
            });
        }
        if !extension.is_empty() {
            object.borrow_mut().set_extension_data(Some(extension));
        }
        Ok(value)
    }

    /// Keeps or skips a child element no member matches.
    fn read_unknown(
        &mut self,
        contract: &Contract,
        position: usize,
        extension: &mut ExtensionData,
    ) -> Result<(), SerializationError> {
        log::trace!(
            "unknown member `{}` in `{}`",
            self.reader.local_name(),
            contract.type_path()
        );
        if self.context.settings().ignore_extension_data {
            self.context.consume(contract.type_path())?;
            self.reader.skip()?;
            return Ok(());
        }
        let element = self.reader.read_subtree()?;
        self.context
            .consume_n(element.element_count(), contract.type_path())?;
        extension.push(position, element);
        Ok(())
    }

    fn read_collection(
        &mut self,
        contract: &Arc<Contract>,
        collection: &CollectionContract,
        header: &Header,
    ) -> Result<Value, SerializationError> {
        let size = match &header.size {
            Some(size) => {
                let size = size.trim().parse::<usize>().map_err(|_| {
                    SerializationError::malformed(
                        format!("`{size}` is not a valid collection size"),
                        self.position(),
                    )
                })?;
                self.context.check_allocation(size, contract.type_path())?;
                Some(size)
            }
            None => None,
        };

        let object = ObjectRef::new(self.context.registry().construct(contract.type_path())?);
        if let Some(size) = size {
            object.borrow_mut().reserve(size);
        }
        let value = Value::Object(object.clone());
        self.register(header, &value);

        let item = self.context.contract(collection.item_type())?;
        let key = match collection.key_type() {
            Some(key) => Some(self.context.contract(key)?),
            None => None,
        };

        let mut count = 0;
        self.reader.read_start_element()?;
        while self.next_child(contract)? {
            if !self
                .reader
                .is_start_element_named(collection.item_name(), collection.namespace())?
            {
                return Err(SerializationError::malformed(
                    format!(
                        "expected element `{}` in `{}`, found `{}`",
                        collection.item_name(),
                        contract.type_path(),
                        self.reader.local_name()
                    ),
                    self.position(),
                ));
            }
            match &key {
                Some(key) => {
                    let (key_value, item_value) = self.read_entry(contract, collection, key, &item)?;
                    object.borrow_mut().push_entry(key_value, item_value);
                }
                None => {
                    let item_value = self.with_known_types(&item, &[], |this| this.read_value(&item))?;
                    object.borrow_mut().push_item(item_value);
                }
            }
            count += 1;
        }

        if let Some(size) = size
            && size != count
            && collection.shape() == CollectionShape::Array
        {
            return Err(SerializationError::malformed(
                format!(
                    "`{}` declares {size} items but contains {count}",
                    contract.type_path()
                ),
                self.position(),
            ));
        }
        Ok(value)
    }

    fn read_entry(
        &mut self,
        contract: &Contract,
        collection: &CollectionContract,
        key: &Arc<Contract>,
        item: &Arc<Contract>,
    ) -> Result<(Value, Value), SerializationError> {
        self.context.consume(contract.type_path())?;
        self.reader.read_start_element()?;

        let mut key_value = None;
        let mut item_value = None;
        while self.next_child(contract)? {
            let namespace = collection.namespace();
            if key_value.is_none() && self.reader.is_start_element_named(collection.key_name(), namespace)? {
                key_value = Some(self.with_known_types(key, &[], |this| this.read_value(key))?);
            } else if item_value.is_none()
                && self.reader.is_start_element_named(collection.value_name(), namespace)?
            {
                item_value = Some(self.with_known_types(item, &[], |this| this.read_value(item))?);
            } else {
                return Err(SerializationError::malformed(
                    format!(
                        "unexpected element `{}` in an entry of `{}`",
                        self.reader.local_name(),
                        contract.type_path()
                    ),
                    self.position(),
                ));
            }
        }

        match (key_value, item_value) {
            (Some(key_value), Some(item_value)) => Ok((key_value, item_value)),
            _ => Err(SerializationError::malformed(
                format!(
                    "an entry of `{}` needs both `{}` and `{}`",
                    contract.type_path(),
                    collection.key_name(),
                    collection.value_name()
                ),
                self.position(),
            )),
        }
    }
}
