//! The embedder-facing façade: owns every subsystem and exposes
//! the handful of operations a hosting application drives a tick loop
//! with. Ordinary methods on a Rust struct, not an `extern "C"` surface —
//! this runtime is meant to be embedded from other Rust code, so a safe
//! Rust API is the idiomatic boundary (a C ABI can be layered on top by a
//! separate FFI crate if ever needed, outside this core's scope).

use crate::builtins;
use crate::manager::ObjectManager;
use crate::object::{Handle, OnInit, OnRelease};
use crate::pool::ProgramPool;
use crate::program::{NativeFn, Program};
use crate::stack::Stack;
use crate::value::ValueCell;
use std::any::Any;

/// The type-name the embedder API spawns as the tree's root.
pub const APPLICATION_TYPE_NAME: &str = "Application";

pub struct Vm {
    pool: ProgramPool,
    manager: ObjectManager,
    stack: Stack,
}

impl Vm {
    /// `vm_create()`. Registers the built-in `Array` and
    /// `Dictionary` types; the root is not spawned until `launch`.
    pub fn create() -> Self {
        let mut pool = ProgramPool::new();
        builtins::register_all(&mut pool);
        Vm {
            pool,
            manager: ObjectManager::new(),
            stack: Stack::new(),
        }
    }

    /// `vm_launch(vm)`: spawns the root object named `"Application"`.
    pub fn launch(&mut self) -> Handle {
        self.manager.spawn(
            &self.pool,
            &mut self.stack,
            APPLICATION_TYPE_NAME,
            Handle::NULL,
            None,
            None,
            None,
        )
    }

    /// `vm_is_active(vm)`: true iff the root still exists.
    pub fn is_active(&self) -> bool {
        !self.manager.root().is_null()
    }

    /// `vm_update(vm)`: runs one tick (tree dispatch, then sweep), and
    /// returns whether the VM is still active afterwards.
    pub fn update(&mut self) -> bool {
        self.manager.update(&self.pool, &mut self.stack);
        self.manager.sweep(&self.pool, &mut self.stack);
        self.is_active()
    }

    /// `vm_kill(vm)`: marks the root for destruction, which terminates the
    /// VM at the next sweep.
    pub fn kill(&mut self) {
        let root = self.manager.root();
        if let Some(obj) = self.manager.get_mut(root) {
            obj.kill();
        }
    }

    /// `vm_spawn_object(vm, parent, name, user-data, on_init, on_release)`.
    #[allow(clippy::too_many_arguments)]
    pub fn spawn_object(
        &mut self,
        parent: Handle,
        type_name: &str,
        user_data: Option<Box<dyn Any>>,
        on_init: Option<OnInit>,
        on_release: Option<OnRelease>,
    ) -> Handle {
        self.manager.spawn(
            &self.pool,
            &mut self.stack,
            type_name,
            parent,
            user_data,
            on_init,
            on_release,
        )
    }

    /// `vm_bind(vm, object-name, method-name, native-function, arity)`:
    /// registers a native program.
    pub fn bind(&mut self, object_name: &str, method_name: &str, func: NativeFn, arity: usize) {
        self.pool.put(object_name, method_name, Program::native(arity, func));
    }

    pub fn call_method(&mut self, handle: Handle, method: &str, args: &[ValueCell]) -> ValueCell {
        self.manager.call_method(&self.pool, &mut self.stack, handle, method, args)
    }

    pub fn pool(&self) -> &ProgramPool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut ProgramPool {
        &mut self.pool
    }

    pub fn manager(&self) -> &ObjectManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut ObjectManager {
        &mut self.manager
    }

    pub fn root(&self) -> Handle {
        self.manager.root()
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self::create()
    }
}
