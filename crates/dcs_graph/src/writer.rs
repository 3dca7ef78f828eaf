use std::sync::Arc;

use dcs_contract::ContractError;
use dcs_contract::contract::{ClassContract, CollectionContract, Contract, ContractKind, DataMember};
use dcs_contract::info::{CollectionShape, PrimitiveType};
use dcs_contract::value::{ExtensionMember, Object, ObjectBody, ObjectRef, Value};
use dcs_xml::{XmlWriter, ns, write_element, write_node};

use crate::context::{SerializationContext, Substitution, Traversal};
use crate::{IdentityTable, SerializationError};

// -----------------------------------------------------------------------------
// GraphWriter

/// Writes one object graph.
///
/// Every node goes through the same steps: charge the quota, write `i:nil`
/// for `Null`, pick the contract of the runtime type (naming it with
/// `i:type` when it differs from the declared one), write `z:Ref` for an
/// object already written or `z:Id` for a new one, then the content.
/// Primitives and enums never take part in reference tracking.
///
/// A writer is good for a single call; see
/// [`DataContractSerializer::write_object`](crate::DataContractSerializer::write_object).
pub struct GraphWriter<'a, W: XmlWriter + ?Sized> {
    context: SerializationContext<'a>,
    writer: &'a mut W,
    ids: IdentityTable<ObjectRef>,
    in_progress: IdentityTable<ObjectRef>,
}

impl<'a, W: XmlWriter + ?Sized> Traversal<'a> for GraphWriter<'a, W> {
    #[inline]
    fn context(&mut self) -> &mut SerializationContext<'a> {
        &mut self.context
    }
}

impl<'a, W: XmlWriter + ?Sized> GraphWriter<'a, W> {
    pub(crate) fn new(context: SerializationContext<'a>, writer: &'a mut W) -> Self {
        Self {
            context,
            writer,
            ids: IdentityTable::new(),
            in_progress: IdentityTable::new(),
        }
    }

    pub(crate) fn context_ref(&self) -> &SerializationContext<'a> {
        &self.context
    }

    /// Writes `value` as the root element.
    pub fn write_top_level(&mut self, value: &Value) -> Result<(), SerializationError> {
        let root = self.context.root().clone();
        let name = self.context.root_name();

        self.writer
            .write_start_element(None, name.name(), name.namespace())?;
        self.writer
            .write_namespace_declaration(ns::XSI_PREFIX, ns::XSI)?;
        if self.context.settings().preserve_object_references && root.can_contain_references() {
            self.writer
                .write_namespace_declaration(ns::SERIALIZATION_PREFIX, ns::SERIALIZATION)?;
        }
        self.write_value(value, &root)?;
        self.writer.write_end_element()?;
        Ok(())
    }

    fn write_element(
        &mut self,
        name: &str,
        namespace: &str,
        value: &Value,
        declared: &Arc<Contract>,
    ) -> Result<(), SerializationError> {
        self.writer.write_start_element(None, name, namespace)?;
        self.write_value(value, declared)?;
        self.writer.write_end_element()?;
        Ok(())
    }

    /// Writes the attributes and content of the open element.
    fn write_value(&mut self, value: &Value, declared: &Arc<Contract>) -> Result<(), SerializationError> {
        self.context.consume(declared.type_path())?;

        let Some(type_path) = value.type_path() else {
            return self.write_nil();
        };
        let mut contract = self.context.contract(&type_path)?;
        match self.context.substitution(declared, &contract)? {
            Substitution::Same => {}
            Substitution::Equivalent => contract = declared.clone(),
            Substitution::Derived => self.write_type(declared, &contract)?,
        }

        self.context.enter(&contract)?;
        self.write_content(value, &contract)?;
        self.context.exit();
        Ok(())
    }

    fn write_nil(&mut self) -> Result<(), SerializationError> {
        self.writer
            .write_attribute(Some(ns::XSI_PREFIX), "nil", ns::XSI, "true")?;
        Ok(())
    }

    /// Writes `i:type` naming `actual`, which must be resolvable by a reader
    /// from the known types in scope.
    fn write_type(&mut self, declared: &Contract, actual: &Contract) -> Result<(), SerializationError> {
        let name = actual.stable_name();
        let known = self
            .context
            .lookup_known_type(name)
            .is_some_and(|found| found.type_path() == actual.type_path());
        if !known {
            return Err(SerializationError::UnknownType {
                name: name.to_string(),
                declared: declared.type_path_arc().clone(),
                position: None,
            });
        }

        let prefix = match self.writer.lookup_prefix(name.namespace()) {
            Some(prefix) => prefix,
            None => {
                let prefix = format!("d{}p1", self.writer.depth());
                self.writer
                    .write_namespace_declaration(&prefix, name.namespace())?;
                prefix
            }
        };
        self.writer.write_attribute(
            Some(ns::XSI_PREFIX),
            "type",
            ns::XSI,
            &format!("{prefix}:{}", name.name()),
        )?;
        Ok(())
    }

    fn write_reference(&mut self, id: u32) -> Result<(), SerializationError> {
        log::trace!("write reference to i{id}");
        self.writer.write_attribute(
            Some(ns::SERIALIZATION_PREFIX),
            "Ref",
            ns::SERIALIZATION,
            &format!("i{id}"),
        )?;
        self.write_nil()
    }

    fn write_id(&mut self, id: u32) -> Result<(), SerializationError> {
        self.writer.write_attribute(
            Some(ns::SERIALIZATION_PREFIX),
            "Id",
            ns::SERIALIZATION,
            &format!("i{id}"),
        )?;
        Ok(())
    }

    fn write_content(&mut self, value: &Value, contract: &Arc<Contract>) -> Result<(), SerializationError> {
        match contract.kind() {
            ContractKind::Primitive(PrimitiveType::Object) | ContractKind::Class(_) | ContractKind::Collection(_) => {
                let object = value.as_object().ok_or_else(|| shape_mismatch(contract, value))?;
                self.write_object(object, contract)
            }
            ContractKind::Surrogate(surrogate) => self.write_surrogate(value, contract, surrogate.substitute()),
            ContractKind::Primitive(primitive) => {
                let text = primitive
                    .format(value)
                    .ok_or_else(|| shape_mismatch(contract, value))?;
                self.writer.write_string(&text)?;
                Ok(())
            }
            ContractKind::Enum(enumeration) => {
                let Value::Enum(value) = value else {
                    return Err(shape_mismatch(contract, value));
                };
                let text = enumeration.format(value.bits()).ok_or_else(|| {
                    SerializationError::InvalidEnumValue {
                        type_path: contract.type_path_arc().clone(),
                        value: value.bits().to_string(),
                        position: None,
                    }
                })?;
                self.writer.write_string(&text)?;
                Ok(())
            }
            ContractKind::XmlAny => {
                let Value::Xml(nodes) = value else {
                    return Err(shape_mismatch(contract, value));
                };
                for node in nodes {
                    write_node(self.writer, node)?;
                }
                Ok(())
            }
        }
    }

    fn write_object(&mut self, object: &ObjectRef, contract: &Arc<Contract>) -> Result<(), SerializationError> {
        if self.context.tracks_references(contract) {
            let (id, is_new) = self.ids.get_or_assign_id(object);
            if !is_new {
                return self.write_reference(id);
            }
            self.write_id(id)?;
            return self.write_body(object, contract);
        }

        let (_, is_new) = self.in_progress.get_or_assign_id(object);
        if !is_new {
            return Err(SerializationError::CycleDetected {
                type_path: contract.type_path_arc().clone(),
            });
        }
        self.write_body(object, contract)?;
        self.in_progress.remove(object);
        Ok(())
    }

    /// Writes a value through its surrogate. The original object and its
    /// replacement share one id, so later occurrences of either become
    /// references.
    fn write_surrogate(
        &mut self,
        value: &Value,
        contract: &Arc<Contract>,
        substitute: &Arc<Contract>,
    ) -> Result<(), SerializationError> {
        let original = value
            .as_object()
            .filter(|_| self.context.tracks_references(substitute));
        if let Some(original) = original
            && let Some(id) = self.ids.get_id(original)
        {
            return self.write_reference(id);
        }

        let Some(surrogate) = self.context.surrogate() else {
            return self.write_content(value, substitute);
        };
        let replaced = surrogate.to_serializable(value, substitute.type_path());
        if replaced.is_null() {
            return self.write_nil();
        }

        let Some(original) = original else {
            return self.write_content(&replaced, substitute);
        };
        match replaced.as_object() {
            Some(replacement) => {
                if let Some(previous) = self.ids.get_id(replacement) {
                    self.ids.reassign_id(previous, replacement, original);
                    return self.write_reference(previous);
                }
                let (id, _) = self.ids.get_or_assign_id(original);
                self.ids.reassign_id(id, original, replacement);
                self.write_id(id)?;
                self.write_body(replacement, substitute)
            }
            None => {
                log::trace!("`{}` replaced by a value without identity", contract.type_path());
                let (id, _) = self.ids.get_or_assign_id(original);
                self.write_id(id)?;
                self.write_content(&replaced, substitute)
            }
        }
    }

    fn write_body(&mut self, object: &ObjectRef, contract: &Arc<Contract>) -> Result<(), SerializationError> {
        let object = object.borrow();
        match contract.kind() {
            ContractKind::Class(class) => self.write_class(&object, contract, class),
            ContractKind::Collection(collection) => self.write_collection(&object, contract, collection),
            ContractKind::Primitive(PrimitiveType::Object) => Ok(()),
            _ => Err(body_mismatch(contract, &object)),
        }
    }

    fn write_class(
        &mut self,
        object: &Object,
        contract: &Arc<Contract>,
        class: &ClassContract,
    ) -> Result<(), SerializationError> {
        if class.is_abstract() {
            return Err(ContractError::Abstract {
                type_path: contract.type_path_arc().clone(),
            }
            .into());
        }
        let registry = self.context.registry();
        let extension = object
            .extension_data()
            .filter(|_| !self.context.settings().ignore_extension_data);

        let mut position = 0;
        for level in contract.class_hierarchy(registry)? {
            let Some(class) = level.as_class() else {
                continue;
            };
            for member in class.members() {
                if let Some(extension) = extension {
                    for unknown in extension.at_position(position) {
                        self.write_extension(contract, unknown)?;
                    }
                }
                self.write_member(object, &level, member)?;
                position += 1;
            }
        }
        if let Some(extension) = extension {
            for unknown in extension.from_position(position) {
                self.write_extension(contract, unknown)?;
            }
        }
        Ok(())
    }

    fn write_member(
        &mut self,
        object: &Object,
        owner: &Contract,
        member: &DataMember,
    ) -> Result<(), SerializationError> {
        let value = member.accessor().get(object);
        if value.is_null() && !member.is_nullable() {
            return Err(ContractError::NotNullable {
                type_path: owner.type_path_arc().clone(),
                member: member.name_arc().clone(),
            }
            .into());
        }
        if !member.emit_default() && value == self.context.registry().default_value(member) {
            return Ok(());
        }

        let declared = self.context.contract(member.type_path())?;
        self.with_known_types(&declared, member.known_types(), |this| {
            this.write_element(member.name(), member.namespace(), &value, &declared)
        })
    }

    fn write_extension(
        &mut self,
        owner: &Contract,
        unknown: &ExtensionMember,
    ) -> Result<(), SerializationError> {
        self.context
            .consume_n(unknown.element.element_count(), owner.type_path())?;
        write_element(self.writer, &unknown.element)?;
        Ok(())
    }

    fn write_collection(
        &mut self,
        object: &Object,
        contract: &Arc<Contract>,
        collection: &CollectionContract,
    ) -> Result<(), SerializationError> {
        let item = self.context.contract(collection.item_type())?;
        match object.body() {
            ObjectBody::Items(items) if !collection.is_dictionary() => {
                if collection.shape() == CollectionShape::Array
                    && self.context.settings().preserve_object_references
                {
                    self.writer.write_attribute(
                        Some(ns::SERIALIZATION_PREFIX),
                        "Size",
                        ns::SERIALIZATION,
                        &items.len().to_string(),
                    )?;
                }
                self.with_known_types(&item, &[], |this| {
                    for value in items {
                        this.write_element(collection.item_name(), collection.namespace(), value, &item)?;
                    }
                    Ok(())
                })
            }
            ObjectBody::Entries(entries) if collection.is_dictionary() => {
                let Some(key) = collection.key_type() else {
                    return Err(body_mismatch(contract, object));
                };
                let key = self.context.contract(key)?;
                for (key_value, value) in entries {
                    self.context.consume(contract.type_path())?;
                    self.writer
                        .write_start_element(None, collection.item_name(), collection.namespace())?;
                    self.with_known_types(&key, &[], |this| {
                        this.write_element(collection.key_name(), collection.namespace(), key_value, &key)
                    })?;
                    self.with_known_types(&item, &[], |this| {
                        this.write_element(collection.value_name(), collection.namespace(), value, &item)
                    })?;
                    self.writer.write_end_element()?;
                }
                Ok(())
            }
            _ => Err(body_mismatch(contract, object)),
        }
    }
}

fn shape_mismatch(contract: &Contract, value: &Value) -> SerializationError {
    ContractError::ShapeMismatch {
        type_path: contract.type_path_arc().clone(),
        kind: contract.data_kind(),
        actual: value
            .type_path()
            .map_or_else(|| String::from("null"), |path| path.to_string()),
    }
    .into()
}

fn body_mismatch(contract: &Contract, object: &Object) -> SerializationError {
    ContractError::ShapeMismatch {
        type_path: contract.type_path_arc().clone(),
        kind: contract.data_kind(),
        actual: object.type_path().to_owned(),
    }
    .into()
}
