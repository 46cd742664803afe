//! The two canonical built-in objects: exemplar native
//! types exercising the value cell, heap, and program pool contracts.

pub mod array;
pub mod dictionary;

use crate::pool::ProgramPool;

/// Binds every built-in type's methods into `pool`. Called once at VM
/// startup (`vm::Vm::create`).
pub fn register_all(pool: &mut ProgramPool) {
    array::register_into(pool);
    dictionary::register_into(pool);
}
