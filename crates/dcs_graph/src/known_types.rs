use std::rc::Rc;
use std::sync::Arc;

use dcs_contract::contract::Contract;
use dcs_xml::QualifiedName;

// -----------------------------------------------------------------------------
// KnownTypeFrame

/// A set of contracts acceptable as runtime types at one scope.
///
/// Cheap to clone; frames for the same declared type are shared within a call.
#[derive(Debug, Clone, Default)]
pub struct KnownTypeFrame {
    contracts: Rc<[Arc<Contract>]>,
}

impl KnownTypeFrame {
    pub fn new(contracts: impl IntoIterator<Item = Arc<Contract>>) -> Self {
        Self {
            contracts: contracts.into_iter().collect(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    #[inline]
    pub fn contracts(&self) -> &[Arc<Contract>] {
        &self.contracts
    }

    pub fn find(&self, name: &QualifiedName) -> Option<&Arc<Contract>> {
        self.contracts
            .iter()
            .find(|contract| contract.stable_name() == name)
    }
}

// -----------------------------------------------------------------------------
// KnownTypeScope

/// The stack of known-type frames of one call.
///
/// Lookup goes from the innermost pushed frame outwards, then to the global
/// frame (known types given to the serializer), then to the root frame
/// (known types of the root contract and of the item types of a root
/// collection). The stack is small, so lookups are linear.
///
/// # Examples
///
/// ```
/// use dcs_contract::registry::TypeRegistry;
/// use dcs_graph::{KnownTypeFrame, KnownTypeScope};
///
/// let registry = TypeRegistry::new();
/// let int = registry.contract("i32").unwrap();
/// let name = int.stable_name().clone();
///
/// let mut scope = KnownTypeScope::default();
/// assert!(scope.lookup(&name).is_none());
///
/// let found = scope.with_frame(KnownTypeFrame::new([int]), |scope| scope.lookup(&name).is_some());
/// assert!(found);
/// assert!(scope.lookup(&name).is_none());
/// ```
#[derive(Debug, Default)]
pub struct KnownTypeScope {
    frames: Vec<KnownTypeFrame>,
    global: KnownTypeFrame,
    root: KnownTypeFrame,
}

impl KnownTypeScope {
    pub fn new(global: KnownTypeFrame, root: KnownTypeFrame) -> Self {
        Self {
            frames: Vec::new(),
            global,
            root,
        }
    }

    #[inline]
    pub fn push(&mut self, frame: KnownTypeFrame) {
        log::trace!("push known type frame of {} contracts", frame.contracts.len());
        self.frames.push(frame);
    }

    #[inline]
    pub fn pop(&mut self) {
        log::trace!("pop known type frame");
        self.frames.pop();
    }

    /// Number of pushed frames.
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Runs `f` with `frame` pushed, popping it afterwards whatever `f`
    /// returns.
    pub fn with_frame<T>(&mut self, frame: KnownTypeFrame, f: impl FnOnce(&mut Self) -> T) -> T {
        self.push(frame);
        let result = f(self);
        self.pop();
        result
    }

    pub fn lookup(&self, name: &QualifiedName) -> Option<&Arc<Contract>> {
        self.frames
            .iter()
            .rev()
            .chain([&self.global, &self.root])
            .find_map(|frame| frame.find(name))
    }
}

#[cfg(test)]
mod tests {
    use dcs_contract::info::{ClassInfo, TypeInfo};
    use dcs_contract::registry::TypeRegistry;

    use super::{KnownTypeFrame, KnownTypeScope};

    #[test]
    fn inner_frames_win() {
        let mut registry = TypeRegistry::new();
        registry.register(TypeInfo::class("a::Cat", ClassInfo::new()).with_contract_namespace("urn:z"));
        registry.register(
            TypeInfo::class("b::Cat", ClassInfo::new()).with_contract_namespace("urn:z"),
        );
        let outer = registry.contract("a::Cat").unwrap();
        let inner = registry.contract("b::Cat").unwrap();
        let name = outer.stable_name().clone();

        let mut scope = KnownTypeScope::new(KnownTypeFrame::new([outer]), KnownTypeFrame::default());
        assert_eq!(scope.lookup(&name).unwrap().type_path(), "a::Cat");

        scope.push(KnownTypeFrame::new([inner]));
        assert_eq!(scope.depth(), 1);
        assert_eq!(scope.lookup(&name).unwrap().type_path(), "b::Cat");
        scope.pop();
        assert_eq!(scope.lookup(&name).unwrap().type_path(), "a::Cat");
    }

    #[test]
    fn with_frame_pops_on_error() {
        let registry = TypeRegistry::new();
        let frame = KnownTypeFrame::new([registry.contract("String").unwrap()]);
        let mut scope = KnownTypeScope::default();

        let result: Result<(), &str> = scope.with_frame(frame, |scope| {
            assert_eq!(scope.depth(), 1);
            Err("failed")
        });
        assert!(result.is_err());
        assert_eq!(scope.depth(), 0);
    }

    #[test]
    fn root_frame_is_last() {
        let registry = TypeRegistry::new();
        let string = registry.contract("String").unwrap();
        let name = string.stable_name().clone();
        let scope = KnownTypeScope::new(KnownTypeFrame::default(), KnownTypeFrame::new([string]));
        assert!(scope.lookup(&name).is_some());
    }
}
