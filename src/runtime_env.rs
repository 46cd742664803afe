//! The transient bundle threaded through one executing program: the owning
//! object plus shared references to the stack, program pool, and object
//! manager, plus a scratch bank of temporary cells private to the current
//! call.

use crate::heap::Heap;
use crate::manager::ObjectManager;
use crate::object::Handle;
use crate::pool::ProgramPool;
use crate::stack::Stack;
use crate::value::ValueCell;

/// Fixed small count of scratch cells reserved per activation.
pub const TEMPORARY_COUNT: usize = 4;

pub struct RuntimeEnv<'a> {
    owner: Handle,
    stack: &'a mut Stack,
    pool: &'a ProgramPool,
    manager: &'a mut ObjectManager,
    temporaries: [ValueCell; TEMPORARY_COUNT],
}

impl<'a> RuntimeEnv<'a> {
    pub fn new(
        owner: Handle,
        stack: &'a mut Stack,
        pool: &'a ProgramPool,
        manager: &'a mut ObjectManager,
    ) -> Self {
        RuntimeEnv {
            owner,
            stack,
            pool,
            manager,
            temporaries: std::array::from_fn(|_| ValueCell::null()),
        }
    }

    pub fn owner(&self) -> Handle {
        self.owner
    }

    pub fn stack(&mut self) -> &mut Stack {
        self.stack
    }

    pub fn stack_ref(&self) -> &Stack {
        self.stack
    }

    pub fn pool(&self) -> &ProgramPool {
        self.pool
    }

    pub fn manager(&self) -> &ObjectManager {
        self.manager
    }

    pub fn manager_mut(&mut self) -> &mut ObjectManager {
        self.manager
    }

    /// The owning object's private heap.
    ///
    /// # Panics
    /// If the owner's handle is no longer live — should not happen while
    /// that object's own program is executing.
    pub fn owner_heap(&self) -> &Heap {
        self.manager
            .get(self.owner)
            .expect("owner handle must be live while its program runs")
            .heap()
    }

    pub fn owner_heap_mut(&mut self) -> &mut Heap {
        self.manager
            .get_mut(self.owner)
            .expect("owner handle must be live while its program runs")
            .heap_mut()
    }

    pub fn temp(&self, index: usize) -> &ValueCell {
        &self.temporaries[index]
    }

    pub fn temp_mut(&mut self, index: usize) -> &mut ValueCell {
        &mut self.temporaries[index]
    }

    /// Dispatches `method` on `handle`, for native methods that call back
    /// into another scripted object (e.g. invoking a user-supplied callback
    /// during iteration). Returns `null` if no program resolves.
    pub fn call_method(&mut self, handle: Handle, method: &str, args: &[ValueCell]) -> ValueCell {
        self.manager.call_method(self.pool, self.stack, handle, method, args)
    }

    /// Reborrows every shared reference for a nested call into `new_owner`,
    /// with a fresh temporary bank. Not copied per tick; only created here,
    /// at each nested call boundary.
    pub fn reborrow(&mut self, new_owner: Handle) -> RuntimeEnv<'_> {
        RuntimeEnv {
            owner: new_owner,
            stack: self.stack,
            pool: self.pool,
            manager: self.manager,
            temporaries: std::array::from_fn(|_| ValueCell::null()),
        }
    }
}
