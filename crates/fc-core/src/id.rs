//! Entity handles.
//!
//! An `EntityId` names one entity for the life of the process. Names are
//! interned (`process_3`, `connector_7`) so handles are `Copy` and compare
//! in O(1), and the shared counter means a deleted entity's name is never
//! handed out again: a connector still holding it simply fails lookup.

use crate::model::ShapeKind;
use lasso::{Spur, ThreadedRodeo};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

static NAMES: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

static NEXT: AtomicU64 = AtomicU64::new(0);

const CONNECTOR: &str = "connector";

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(Spur);

impl EntityId {
    fn fresh(kind: &str) -> Self {
        let n = NEXT.fetch_add(1, Ordering::Relaxed);
        EntityId(NAMES.get_or_intern(format!("{kind}_{n}")))
    }

    /// A new handle for a shape of `kind`.
    pub fn for_shape(kind: ShapeKind) -> Self {
        Self::fresh(kind.prefix())
    }

    /// A new handle for a connector.
    pub fn for_connector() -> Self {
        Self::fresh(CONNECTOR)
    }

    pub fn name(&self) -> &str {
        NAMES.resolve(&self.0)
    }

    /// The kind part of the name (`process`, `io`, `connector`, ...).
    pub fn kind_name(&self) -> &str {
        let name = self.name();
        name.rsplit_once('_').map_or(name, |(kind, _)| kind)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.name())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.name())
    }
}
