//! Fatal VM errors.
//!
//! A two-tier policy: conditions that indicate a compiler/VM bug are
//! represented here and raised with `panic!`, never threaded through as a
//! `Result`. Conditions a script can legitimately trigger (missing method,
//! empty array, unparseable number) are instead encoded as a sentinel
//! `ValueCell` and returned normally — see `value::ValueCell` and
//! `builtins`.

use std::fmt;

/// A program-integrity error. Fatal: the current tick (and the VM) aborts
/// when one of these is raised.
#[derive(Debug, Clone, PartialEq)]
pub enum VmError {
    /// `Stack::pop`/`Stack::pop_frame` was asked to cross the frame base.
    StackUnderflow { detail: String },
    /// `Heap::at` was given a pointer that was never allocated, or was freed.
    BadHeapPointer { ptr: usize },
    /// `ProgramPool::put` collided with an existing exact (object, method) pair.
    DuplicateDefinition { object: String, method: String },
    /// Array `get`/`set` index out of bounds (get) or runaway (set).
    ArrayIndexOutOfRange { index: i64, length: usize },
    ArrayIndexTooFar { index: i64, length: usize },
    /// Bytecode domain only; the core never produces this itself, but a
    /// native method implementing a decoder can raise it through this type.
    UnknownOpcode { opcode: u8 },
    /// Backing allocator exhausted (heap or stack vector could not grow).
    AllocationFailure { detail: String },
}

impl VmError {
    /// One-line human message with enough context for the embedder's
    /// diagnostic to be actionable without a backtrace.
    pub fn message(&self) -> String {
        match self {
            VmError::StackUnderflow { detail } => format!("stack underflow: {detail}"),
            VmError::BadHeapPointer { ptr } => {
                format!("heap: pointer {ptr} is not a live allocation")
            }
            VmError::DuplicateDefinition { object, method } => {
                format!("program pool: duplicate definition for {object}::{method}")
            }
            VmError::ArrayIndexOutOfRange { index, length } => {
                format!("Array.get: index {index} out of range (length {length})")
            }
            VmError::ArrayIndexTooFar { index, length } => {
                format!(
                    "Array.set: index {index} is too far past length {length} (bounded growth exceeded)"
                )
            }
            VmError::UnknownOpcode { opcode } => format!("unknown opcode 0x{opcode:02x}"),
            VmError::AllocationFailure { detail } => format!("allocation failure: {detail}"),
        }
    }
}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for VmError {}

/// Raise a fatal error as a descriptive panic, not a `Result` unwind.
///
/// # Panics
/// Always panics with `err`'s one-line message.
pub fn fatal(err: VmError) -> ! {
    panic!("{err}");
}
