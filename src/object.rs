//! A live object: one node in the tree the VM walks each tick.

use crate::heap::Heap;
use std::any::Any;
use std::fmt;

/// Stable 32-bit reference to a live object, non-owning. Handle 0
/// is reserved as the null handle and is never allocated to a real object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u32);

impl Handle {
    pub const NULL: Handle = Handle(0);

    pub fn from_u32(raw: u32) -> Self {
        Handle(raw)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl Default for Handle {
    fn default() -> Self {
        Handle::NULL
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Runs once after `__constructor`, before the object is considered alive.
/// Returning `false` aborts the spawn: the manager destroys the half-built
/// object and `ObjectManager::spawn` returns `Handle::NULL`.
pub type OnInit = fn(&mut Object) -> bool;

/// Runs once before `__destructor`, while the object is still reachable
/// through its handle.
pub type OnRelease = fn(&mut Object);

/// The default state every newly spawned object starts in.
pub const DEFAULT_STATE: &str = "main";

/// A live instance of some scripted type.
pub struct Object {
    handle: Handle,
    type_name: String,
    parent: Handle,
    children: Vec<Handle>,
    heap: Heap,
    state: String,
    user_data: Option<Box<dyn Any>>,
    on_init: Option<OnInit>,
    on_release: Option<OnRelease>,
    killed: bool,
}

impl Object {
    pub(crate) fn new(
        handle: Handle,
        type_name: impl Into<String>,
        parent: Handle,
        user_data: Option<Box<dyn Any>>,
        on_init: Option<OnInit>,
        on_release: Option<OnRelease>,
    ) -> Self {
        Object {
            handle,
            type_name: type_name.into(),
            parent,
            children: Vec::new(),
            heap: Heap::new(),
            state: DEFAULT_STATE.to_string(),
            user_data,
            on_init,
            on_release,
            killed: false,
        }
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn name(&self) -> &str {
        &self.type_name
    }

    pub fn parent(&self) -> Handle {
        self.parent
    }

    pub fn children(&self) -> &[Handle] {
        &self.children
    }

    pub(crate) fn add_child(&mut self, child: Handle) {
        self.children.push(child);
    }

    pub(crate) fn remove_child(&mut self, child: Handle) {
        self.children.retain(|&h| h != child);
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    /// Switching state changes which program runs on the next `update`.
    /// Invalid state names are tolerated — they simply fail to resolve a
    /// program at lookup time.
    pub fn set_state(&mut self, name: impl Into<String>) {
        self.state = name.into();
    }

    pub fn user_data(&self) -> Option<&dyn Any> {
        self.user_data.as_deref()
    }

    pub fn user_data_mut(&mut self) -> Option<&mut (dyn Any + 'static)> {
        self.user_data.as_deref_mut()
    }

    pub fn set_user_data(&mut self, data: Box<dyn Any>) {
        self.user_data = Some(data);
    }

    pub fn is_killed(&self) -> bool {
        self.killed
    }

    /// Marks for deletion; takes effect at the next sweep.
    pub fn kill(&mut self) {
        self.killed = true;
    }

    pub(crate) fn take_on_release(&self) -> Option<OnRelease> {
        self.on_release
    }

    pub(crate) fn run_on_init(&mut self) -> bool {
        match self.on_init {
            Some(f) => f(self),
            None => true,
        }
    }

    /// The method name the program pool keys `update` under.
    pub fn state_method_name(&self) -> String {
        format!("state:{}", self.state)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("handle", &self.handle)
            .field("type_name", &self.type_name)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("state", &self.state)
            .field("killed", &self.killed)
            .finish()
    }
}
