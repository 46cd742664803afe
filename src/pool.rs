//! The program pool: maps `(object-name, method-name)` to a `Program`, with
//! fallback lookup under the universal base name `"Object"`.
//!
//! Keyed on the literal string pair in an `rustc_hash::FxHashMap` — the
//! hasher this lineage of embeddable scripting engines already reaches for
//! instead of std's SipHash — so a hash collision falls back to an exact
//! `==` compare instead of ever aliasing two distinct `(object, method)`
//! pairs.

use crate::error::{VmError, fatal};
use crate::program::Program;
use rustc_hash::FxHashMap;

/// The type-name every object implicitly falls back to when it has no
/// binding of its own for a method.
pub const BASE_OBJECT_NAME: &str = "Object";

pub struct ProgramPool {
    programs: FxHashMap<(String, String), Program>,
    /// Per object-name, the ordered set of method names it defines under
    /// its own (non-fallback) name — a secondary index for introspection
    /// and whole-object purging.
    methods_by_object: FxHashMap<String, Vec<String>>,
}

impl ProgramPool {
    pub fn new() -> Self {
        ProgramPool {
            programs: FxHashMap::default(),
            methods_by_object: FxHashMap::default(),
        }
    }

    /// # Panics (fatal)
    /// If the exact `(object, method)` pair is already registered.
    pub fn put(&mut self, object: &str, method: &str, program: Program) {
        let key = (object.to_string(), method.to_string());
        if self.programs.contains_key(&key) {
            fatal(VmError::DuplicateDefinition {
                object: object.to_string(),
                method: method.to_string(),
            });
        }
        self.methods_by_object
            .entry(object.to_string())
            .or_default()
            .push(method.to_string());
        self.programs.insert(key, program);
    }

    /// Exact match first; on miss, retries under the literal base name
    /// `"Object"`.
    pub fn get(&self, object: &str, method: &str) -> Option<&Program> {
        self.programs
            .get(&(object.to_string(), method.to_string()))
            .or_else(|| {
                if object == BASE_OBJECT_NAME {
                    None
                } else {
                    self.programs
                        .get(&(BASE_OBJECT_NAME.to_string(), method.to_string()))
                }
            })
    }

    /// Exact match only, no base-name fallback.
    pub fn shallow_check(&self, object: &str, method: &str) -> bool {
        self.programs
            .contains_key(&(object.to_string(), method.to_string()))
    }

    /// Destroys the prior program for `(object, method)` if any, then
    /// inserts `program` (no duplicate-definition check — this is the
    /// explicit "replace" path, unlike `put`).
    pub fn replace(&mut self, object: &str, method: &str, program: Program) {
        let key = (object.to_string(), method.to_string());
        let existed = self.programs.insert(key, program).is_some();
        if !existed {
            self.methods_by_object
                .entry(object.to_string())
                .or_default()
                .push(method.to_string());
        }
    }

    pub fn delete(&mut self, object: &str, method: &str) {
        let key = (object.to_string(), method.to_string());
        if self.programs.remove(&key).is_some() {
            if let Some(methods) = self.methods_by_object.get_mut(object) {
                methods.retain(|m| m != method);
            }
        }
    }

    /// Removes all methods registered under `object`'s exact name.
    pub fn purge(&mut self, object: &str) {
        if let Some(methods) = self.methods_by_object.remove(object) {
            for method in methods {
                self.programs.remove(&(object.to_string(), method));
            }
        }
    }

    /// True iff at least one method is registered under the exact name.
    pub fn is_compiled(&self, object: &str) -> bool {
        self.methods_by_object
            .get(object)
            .is_some_and(|methods| !methods.is_empty())
    }

    /// Iterates method names registered under `object`'s exact name, not
    /// including inherited (`"Object"`-fallback) methods.
    pub fn for_each(&self, object: &str, mut callback: impl FnMut(&str)) {
        if let Some(methods) = self.methods_by_object.get(object) {
            for method in methods {
                callback(method);
            }
        }
    }
}

impl Default for ProgramPool {
    fn default() -> Self {
        Self::new()
    }
}
