//! The object manager: authoritative registry of live objects, handle
//! allocator, spawner/destroyer, and tree-walk driver.
//!
//! Objects reference each other only by `Handle` — never by pointer — so
//! the manager is the single owner of every object record. That keeps every
//! parent/child reference stable across the manager's own `HashMap`
//! reallocating, with no `unsafe` required: a raw-pointer node chain would
//! buy back nothing here since this runtime is single-threaded and has no
//! need for objects to migrate across independent execution contexts.

use crate::object::{Handle, OnInit, OnRelease, Object};
use crate::pool::ProgramPool;
use crate::runtime_env::RuntimeEnv;
use crate::stack::Stack;
use crate::value::ValueCell;
use rustc_hash::FxHashMap;
use std::any::Any;

pub struct ObjectManager {
    objects: FxHashMap<Handle, Object>,
    next_handle: u32,
    root: Option<Handle>,
}

impl ObjectManager {
    pub fn new() -> Self {
        ObjectManager {
            objects: FxHashMap::default(),
            next_handle: 0,
            root: None,
        }
    }

    fn allocate_handle(&mut self) -> Handle {
        self.next_handle += 1;
        Handle::from_u32(self.next_handle)
    }

    /// Allocates a handle, constructs the object record, runs
    /// `__constructor` (if bound) with no parameters, then `on_init`. If
    /// `on_init` returns `false` the half-built object is destroyed and
    /// `Handle::NULL` is returned.
    #[allow(clippy::too_many_arguments)]
    pub fn spawn(
        &mut self,
        pool: &ProgramPool,
        stack: &mut Stack,
        type_name: &str,
        parent: Handle,
        user_data: Option<Box<dyn Any>>,
        on_init: Option<OnInit>,
        on_release: Option<OnRelease>,
    ) -> Handle {
        let handle = self.allocate_handle();
        let object = Object::new(handle, type_name, parent, user_data, on_init, on_release);
        self.objects.insert(handle, object);

        if !parent.is_null() {
            if let Some(parent_obj) = self.objects.get_mut(&parent) {
                parent_obj.add_child(handle);
            }
        }
        if parent.is_null() && self.root.is_none() {
            self.root = Some(handle);
        }

        if let Some(ctor) = pool.get(type_name, "__constructor") {
            stack.push_frame();
            {
                let mut env = RuntimeEnv::new(handle, stack, pool, self);
                let _ = ctor.invoke(&mut env, &[]);
            }
            stack.pop_frame();
        }

        let init_ok = self
            .objects
            .get_mut(&handle)
            .map(Object::run_on_init)
            .unwrap_or(true);
        if !init_ok {
            self.destroy(pool, stack, handle);
            return Handle::NULL;
        }

        handle
    }

    /// Convenience wrapper for spawning a child directly under `parent`.
    #[allow(clippy::too_many_arguments)]
    pub fn spawn_temporary(
        &mut self,
        pool: &ProgramPool,
        stack: &mut Stack,
        parent: Handle,
        type_name: &str,
        user_data: Option<Box<dyn Any>>,
        on_init: Option<OnInit>,
        on_release: Option<OnRelease>,
    ) -> Handle {
        self.spawn(pool, stack, type_name, parent, user_data, on_init, on_release)
    }

    pub fn get(&self, handle: Handle) -> Option<&Object> {
        self.objects.get(&handle)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut Object> {
        self.objects.get_mut(&handle)
    }

    pub fn exists(&self, handle: Handle) -> bool {
        self.objects.contains_key(&handle)
    }

    pub fn root(&self) -> Handle {
        self.root.unwrap_or(Handle::NULL)
    }

    /// Runs `on_release`, then `__destructor`, detaches from the parent's
    /// child list, and destroys the heap and record. Children are
    /// recursively destroyed first, in reverse insertion order.
    pub fn destroy(&mut self, pool: &ProgramPool, stack: &mut Stack, handle: Handle) {
        if !self.exists(handle) {
            return;
        }

        let children: Vec<Handle> = self.objects[&handle].children().to_vec();
        for child in children.into_iter().rev() {
            self.destroy(pool, stack, child);
        }

        if let Some(on_release) = self.objects[&handle].take_on_release() {
            if let Some(obj) = self.objects.get_mut(&handle) {
                on_release(obj);
            }
        }

        let type_name = self.objects[&handle].name().to_string();
        if let Some(dtor) = pool.get(&type_name, "__destructor") {
            stack.push_frame();
            {
                let mut env = RuntimeEnv::new(handle, stack, pool, self);
                let _ = dtor.invoke(&mut env, &[]);
            }
            stack.pop_frame();
        }

        let parent = self.objects[&handle].parent();
        if !parent.is_null() {
            if let Some(parent_obj) = self.objects.get_mut(&parent) {
                parent_obj.remove_child(handle);
            }
        }

        self.objects.remove(&handle);
        if self.root == Some(handle) {
            self.root = None;
        }
    }

    /// Removes every object whose killed flag is set, bottom-up. Since
    /// `destroy` always recurses into children first, destroying each
    /// currently-killed handle (in any order) already yields bottom-up
    /// removal; a handle may disappear as a side effect of destroying an
    /// ancestor earlier in this same sweep, so each is re-checked with
    /// `exists` before destroying it.
    pub fn sweep(&mut self, pool: &ProgramPool, stack: &mut Stack) {
        let killed: Vec<Handle> = self
            .objects
            .iter()
            .filter(|(_, obj)| obj.is_killed())
            .map(|(&h, _)| h)
            .collect();
        for handle in killed {
            if self.exists(handle) {
                self.destroy(pool, stack, handle);
            }
        }
    }

    /// Runs one tick: pre-order dispatch of `state:<current>` starting from
    /// the root. Each node's children are snapshotted before that node's
    /// own program runs, so a child spawned during the visit begins
    /// updating at the next tick, while a child killed during the visit
    /// still gets its own dispatch this tick — it remains observable until
    /// the sweep at the end of the tick. See DESIGN.md for how this
    /// reconciles with `traverse_tree`'s stricter "killed children are
    /// skipped immediately" rule below.
    pub fn update(&mut self, pool: &ProgramPool, stack: &mut Stack) {
        if let Some(root) = self.root {
            self.update_node(pool, stack, root);
        }
    }

    fn update_node(&mut self, pool: &ProgramPool, stack: &mut Stack, handle: Handle) {
        if !self.exists(handle) {
            return;
        }
        let children_snapshot = self.objects[&handle].children().to_vec();
        self.dispatch_state(pool, stack, handle);
        for child in children_snapshot {
            self.update_node(pool, stack, child);
        }
    }

    fn dispatch_state(&mut self, pool: &ProgramPool, stack: &mut Stack, handle: Handle) {
        let Some(obj) = self.objects.get(&handle) else {
            return;
        };
        let type_name = obj.name().to_string();
        let method_name = obj.state_method_name();
        let Some(program) = pool.get(&type_name, &method_name) else {
            return;
        };
        stack.push_frame();
        {
            let mut env = RuntimeEnv::new(handle, stack, pool, self);
            let _ = program.invoke(&mut env, &[]);
        }
        stack.pop_frame();
    }

    /// Dispatches `method` on `handle` under its own type-name (with
    /// `"Object"` fallback via the pool). Returns `null` silently if no
    /// program resolves — states may legitimately be unimplemented for
    /// some types.
    pub fn call_method(
        &mut self,
        pool: &ProgramPool,
        stack: &mut Stack,
        handle: Handle,
        method: &str,
        args: &[ValueCell],
    ) -> ValueCell {
        let Some(obj) = self.objects.get(&handle) else {
            return ValueCell::null();
        };
        let type_name = obj.name().to_string();
        let Some(program) = pool.get(&type_name, method) else {
            return ValueCell::null();
        };

        stack.push_frame();
        for arg in args {
            stack.push(arg.clone());
        }
        let produced = {
            let mut env = RuntimeEnv::new(handle, stack, pool, self);
            program.invoke(&mut env, args)
        };
        stack.pop_frame();
        produced.unwrap_or_else(ValueCell::null)
    }

    /// Pre-order, read-only traversal: a child currently flagged killed is
    /// skipped (its subtree included). Distinct from `update`'s
    /// tick-dispatch semantics — see `update`'s doc comment.
    pub fn traverse_tree(&self, start: Handle, visitor: &mut dyn FnMut(&Object)) {
        let Some(obj) = self.objects.get(&start) else {
            return;
        };
        if obj.is_killed() {
            return;
        }
        visitor(obj);
        for &child in obj.children() {
            self.traverse_tree(child, visitor);
        }
    }
}

impl Default for ObjectManager {
    fn default() -> Self {
        Self::new()
    }
}
