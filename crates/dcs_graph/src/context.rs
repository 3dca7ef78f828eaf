use std::sync::Arc;

use dcs_contract::contract::Contract;
use dcs_contract::registry::TypeRegistry;
use dcs_contract::{ContractError, SerializationSurrogate};
use dcs_utils::hash::{HashMap, HashSet};
use dcs_xml::QualifiedName;

use crate::{KnownTypeFrame, KnownTypeScope, QuotaGuard, SerializationError, SerializerSettings};

// -----------------------------------------------------------------------------
// Substitution

/// How a runtime type relates to the declared type it stands in for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Substitution {
    /// The declared type itself.
    Same,
    /// A different type that must be named with `i:type`.
    Derived,
    /// A collection of the same shape and items, written as the declared one.
    Equivalent,
}

// -----------------------------------------------------------------------------
// SerializationContext

/// Per-call state shared by [`GraphWriter`](crate::GraphWriter) and
/// [`GraphReader`](crate::GraphReader).
///
/// Contracts are resolved through the context so that surrogates apply and
/// so that two types claiming the same stable name in one call are caught.
pub(crate) struct SerializationContext<'a> {
    registry: &'a TypeRegistry,
    settings: &'a SerializerSettings,
    surrogate: Option<&'a dyn SerializationSurrogate>,
    contracts: HashMap<Arc<str>, Arc<Contract>>,
    names: HashMap<QualifiedName, Arc<str>>,
    frames: HashMap<Arc<str>, Option<KnownTypeFrame>>,
    pub(crate) known_types: KnownTypeScope,
    quota: QuotaGuard,
    depth: usize,
    root: Arc<Contract>,
    /// Type paths of the contracts being visited, outermost first.
    #[cfg(feature = "debug")]
    visiting: Vec<Arc<str>>,
}

impl<'a> SerializationContext<'a> {
    pub(crate) fn new(
        registry: &'a TypeRegistry,
        settings: &'a SerializerSettings,
        surrogate: Option<&'a dyn SerializationSurrogate>,
        root_type: &str,
    ) -> Result<Self, SerializationError> {
        let mut context = Self {
            registry,
            settings,
            surrogate,
            contracts: HashMap::default(),
            names: HashMap::default(),
            frames: HashMap::default(),
            known_types: KnownTypeScope::default(),
            quota: QuotaGuard::new(settings.max_items_in_object_graph),
            depth: 0,
            root: registry.contract(root_type)?,
            #[cfg(feature = "debug")]
            visiting: Vec::new(),
        };
        context.root = context.contract(root_type)?;

        let mut global = Vec::new();
        for type_path in &settings.known_types {
            let contract = context.contract(type_path)?;
            global.extend(context.transitive_known_types(&contract)?);
            global.push(contract);
        }

        let root = context.root.clone();
        let mut root_types = context.transitive_known_types(&root)?;
        let mut visited: HashSet<Arc<str>> = HashSet::default();
        let mut current = root;
        while let Some(collection) = current.as_collection() {
            let item = context.contract(collection.item_type())?;
            if !visited.insert(item.type_path_arc().clone()) {
                break;
            }
            root_types.extend(context.transitive_known_types(&item)?);
            root_types.push(item.clone());
            current = item;
        }

        context.known_types =
            KnownTypeScope::new(KnownTypeFrame::new(global), KnownTypeFrame::new(root_types));
        Ok(context)
    }

    #[inline]
    pub(crate) fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    #[inline]
    pub(crate) fn settings(&self) -> &'a SerializerSettings {
        self.settings
    }

    #[inline]
    pub(crate) fn surrogate(&self) -> Option<&'a dyn SerializationSurrogate> {
        self.surrogate
    }

    #[inline]
    pub(crate) fn root(&self) -> &Arc<Contract> {
        &self.root
    }

    /// Name of the root element.
    pub(crate) fn root_name(&self) -> QualifiedName {
        let name = self.root.stable_name();
        QualifiedName::new(
            self.settings.root_name.as_deref().unwrap_or(name.name()),
            self.settings
                .root_namespace
                .as_deref()
                .unwrap_or(name.namespace()),
        )
    }

    /// Whether objects of `contract` get `z:Id`/`z:Ref` handling.
    #[inline]
    pub(crate) fn tracks_references(&self, contract: &Contract) -> bool {
        self.settings.preserve_object_references || contract.is_reference()
    }

    /// The contract used for `type_path` in this call.
    pub(crate) fn contract(&mut self, type_path: &str) -> Result<Arc<Contract>, SerializationError> {
        if let Some(contract) = self.contracts.get(type_path) {
            return Ok(contract.clone());
        }

        let contract = self.registry.contract(type_path)?;
        let key = contract.type_path_arc().clone();
        let contract = match self.surrogate.and_then(|s| s.surrogate_type(type_path)) {
            Some(substitute_path) => {
                let substitute = self.registry.contract(&substitute_path)?;
                self.claim_name(&substitute)?;
                log::trace!("`{type_path}` travels as `{substitute_path}`");
                Arc::new(Contract::surrogate(&contract, substitute))
            }
            None => {
                self.claim_name(&contract)?;
                contract
            }
        };
        self.contracts.insert(key, contract.clone());
        Ok(contract)
    }

    fn claim_name(&mut self, contract: &Contract) -> Result<(), SerializationError> {
        let name = contract.stable_name();
        match self.names.get(name) {
            Some(first) if first != contract.type_path_arc() => Err(ContractError::DuplicateName {
                name: name.clone(),
                first: first.clone(),
                second: contract.type_path_arc().clone(),
            }
            .into()),
            Some(_) => Ok(()),
            None => {
                self.names
                    .insert(name.clone(), contract.type_path_arc().clone());
                Ok(())
            }
        }
    }

    fn transitive_known_types(
        &mut self,
        contract: &Contract,
    ) -> Result<Vec<Arc<Contract>>, SerializationError> {
        contract
            .known_types(self.registry)
            .iter()
            .map(|type_path| self.contract(type_path))
            .collect()
    }

    /// The frame to push while a value declared as `declared` is visited,
    /// `None` if it would be empty.
    pub(crate) fn frame_for(
        &mut self,
        declared: &Arc<Contract>,
        member_known_types: &[Arc<str>],
    ) -> Result<Option<KnownTypeFrame>, SerializationError> {
        if member_known_types.is_empty()
            && let Some(frame) = self.frames.get(declared.type_path())
        {
            return Ok(frame.clone());
        }

        let mut contracts = Vec::new();
        for type_path in member_known_types {
            let contract = self.contract(type_path)?;
            contracts.extend(self.transitive_known_types(&contract)?);
            contracts.push(contract);
        }
        contracts.extend(self.transitive_known_types(declared)?);

        let frame = (!contracts.is_empty()).then(|| KnownTypeFrame::new(contracts));
        if member_known_types.is_empty() {
            self.frames
                .insert(declared.type_path_arc().clone(), frame.clone());
        }
        Ok(frame)
    }

    /// Finds the contract named `name` among the known types in scope, then
    /// among the builtin primitives.
    pub(crate) fn lookup_known_type(&self, name: &QualifiedName) -> Option<Arc<Contract>> {
        self.known_types
            .lookup(name)
            .cloned()
            .or_else(|| self.registry.builtin_by_name(name))
    }

    /// Checks that `actual` may stand where `declared` is expected.
    pub(crate) fn substitution(
        &self,
        declared: &Arc<Contract>,
        actual: &Arc<Contract>,
    ) -> Result<Substitution, SerializationError> {
        if declared.type_path() == actual.type_path() {
            return Ok(Substitution::Same);
        }
        if declared.is_any_type() {
            return Ok(Substitution::Derived);
        }
        if declared.as_class().is_some()
            && actual
                .class_hierarchy(self.registry)?
                .iter()
                .any(|level| level.type_path() == declared.type_path())
        {
            return Ok(Substitution::Derived);
        }
        if let (Some(declared), Some(actual)) = (declared.as_collection(), actual.as_collection())
            && declared.shape() == actual.shape()
            && declared.item_type() == actual.item_type()
            && declared.key_type() == actual.key_type()
        {
            return Ok(Substitution::Equivalent);
        }
        Err(SerializationError::UnsupportedPolymorphism {
            declared: declared.type_path_arc().clone(),
            actual: actual.type_path_arc().clone(),
        })
    }

    #[inline]
    pub(crate) fn consume(&mut self, type_path: &str) -> Result<(), SerializationError> {
        self.quota.consume(type_path)
    }

    #[inline]
    pub(crate) fn consume_n(&mut self, count: usize, type_path: &str) -> Result<(), SerializationError> {
        self.quota.consume_n(count, type_path)
    }

    #[inline]
    pub(crate) fn check_allocation(&self, size: usize, type_path: &str) -> Result<(), SerializationError> {
        self.quota.check_allocation(size, type_path)
    }

    /// Goes one level deeper into the graph.
    pub(crate) fn enter(&mut self, contract: &Contract) -> Result<(), SerializationError> {
        if self.depth >= self.settings.max_depth {
            return Err(SerializationError::MaxDepthExceeded {
                limit: self.settings.max_depth,
            });
        }
        self.depth += 1;
        #[cfg(feature = "debug")]
        self.visiting.push(contract.type_path_arc().clone());
        #[cfg(not(feature = "debug"))]
        let _ = contract;
        Ok(())
    }

    pub(crate) fn exit(&mut self) {
        self.depth -= 1;
        #[cfg(feature = "debug")]
        self.visiting.pop();
    }

    /// Logs a failed call, with the contracts being visited when the
    /// `debug` feature is on.
    pub(crate) fn log_failure(&self, action: &str, error: &SerializationError) {
        #[cfg(feature = "debug")]
        log::debug!(
            "{action} `{}` failed: {error} (at {})",
            self.root.type_path(),
            self.visiting.join(" -> ")
        );
        #[cfg(not(feature = "debug"))]
        log::debug!("{action} `{}` failed: {error}", self.root.type_path());
    }
}

// -----------------------------------------------------------------------------
// Traversal

/// Shared plumbing of the writer and reader state machines.
pub(crate) trait Traversal<'a>: Sized {
    fn context(&mut self) -> &mut SerializationContext<'a>;

    /// Runs `f` with the known types of `declared` (and of the member being
    /// visited) in scope. The frame is popped whatever `f` returns.
    fn with_known_types<T>(
        &mut self,
        declared: &Arc<Contract>,
        member_known_types: &[Arc<str>],
        f: impl FnOnce(&mut Self) -> Result<T, SerializationError>,
    ) -> Result<T, SerializationError> {
        let Some(frame) = self.context().frame_for(declared, member_known_types)? else {
            return f(self);
        };
        self.context().known_types.push(frame);
        let result = f(self);
        self.context().known_types.pop();
        result
    }
}
