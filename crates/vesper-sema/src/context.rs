//! Shared state for one compilation's worth of binding.

use dashmap::DashMap;

use vesper_core::{ConstantValue, Conversion, SymbolId, TypeId};
use vesper_registry::SymbolRegistry;

use crate::conv::ConvContext;

/// Everything binding reads: the frozen symbol registry plus the caches
/// that make repeated queries cheap.
///
/// The registry is never mutated after construction, and both caches are
/// concurrent maps, so a single context can serve binds from many threads.
/// Cached answers are insert-once: whichever thread computes a result first
/// wins, and every later computation of the same key produces an equal
/// value anyway.
pub struct BindingContext {
    registry: SymbolRegistry,
    /// Conversion classifications keyed by source type, target type, and
    /// context. Only conversions whose source is a plain type land here;
    /// sources that depend on expression shape (null literals, lambdas,
    /// method groups, constants) are classified fresh each time.
    pub(crate) conversions: DashMap<(TypeId, TypeId, ConvContext), Conversion>,
    /// Memoized constant values per symbol. `None` records that evaluation
    /// failed, so cycles and overflow are only discovered once.
    pub(crate) constants: DashMap<SymbolId, Option<ConstantValue>>,
}

impl BindingContext {
    pub fn new(registry: SymbolRegistry) -> Self {
        Self {
            registry,
            conversions: DashMap::new(),
            constants: DashMap::new(),
        }
    }

    #[inline]
    pub fn registry(&self) -> &SymbolRegistry {
        &self.registry
    }
}
