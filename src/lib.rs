//! Runtime core for a small embeddable tree-of-objects scripting language.
//!
//! - [`value`] — the tagged value cell every script-visible datum lives in.
//! - [`heap`] — an object's private free-list-backed cell store.
//! - [`stack`] — the shared, frame-sliced call stack.
//! - [`program`] — a callable registered under a (type, method) key.
//! - [`pool`] — the (object-name, method-name) → program registry.
//! - [`object`] / [`manager`] — live objects and their authoritative registry.
//! - [`runtime_env`] — the transient bundle threaded through one program.
//! - [`builtins`] — the `Array` and `Dictionary` exemplar native types.
//! - [`vm`] — the embedder-facing façade.
//! - [`error`] — fatal VM error taxonomy.

pub mod builtins;
pub mod error;
pub mod heap;
pub mod manager;
pub mod object;
pub mod pool;
pub mod program;
pub mod runtime_env;
pub mod stack;
pub mod value;
pub mod vm;

pub use error::VmError;
pub use heap::{Heap, HeapPtr};
pub use manager::ObjectManager;
pub use object::{Handle, Object};
pub use pool::ProgramPool;
pub use program::{NativeFn, Program};
pub use runtime_env::RuntimeEnv;
pub use stack::Stack;
pub use value::ValueCell;
pub use vm::Vm;
