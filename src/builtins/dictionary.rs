//! The dictionary built-in: a string-keyed mapping backed by
//! the object's own heap, iterated in insertion order.
//!
//! Layout mirrors `Array`'s heap discipline: slot 0 holds the entry count;
//! entry i occupies the pair of slots `(1 + 2*i, 2 + 2*i)` — key then
//! value. Deleting an entry shifts every later pair down by one pair,
//! the same O(n) move `Array::shift` already performs for single slots.

use crate::heap::Heap;
use crate::pool::ProgramPool;
use crate::program::Program;
use crate::runtime_env::RuntimeEnv;
use crate::value::ValueCell;

pub const TYPE_NAME: &str = "Dictionary";

fn count_ptr() -> usize {
    0
}

fn key_ptr(index: usize) -> usize {
    1 + 2 * index
}

fn value_ptr(index: usize) -> usize {
    2 + 2 * index
}

fn count(heap: &Heap) -> usize {
    heap.at(count_ptr()).get_number() as usize
}

fn set_count(heap: &mut Heap, new_count: usize) {
    heap.at_mut(count_ptr()).set_number(new_count as f64);
}

fn find(heap: &Heap, key: &str) -> Option<usize> {
    (0..count(heap)).find(|&i| heap.at(key_ptr(i)).get_string() == key)
}

fn constructor(env: &mut RuntimeEnv, _params: &[ValueCell]) -> Option<ValueCell> {
    let heap = env.owner_heap_mut();
    let ptr = heap.malloc();
    debug_assert_eq!(ptr, count_ptr(), "count must occupy slot 0");
    heap.at_mut(ptr).set_number(0.0);
    None
}

fn get(env: &mut RuntimeEnv, params: &[ValueCell]) -> Option<ValueCell> {
    let key = params[0].get_string();
    let heap = env.owner_heap();
    match find(heap, &key) {
        Some(i) => Some(heap.at(value_ptr(i)).clone()),
        None => Some(ValueCell::null()),
    }
}

fn set(env: &mut RuntimeEnv, params: &[ValueCell]) -> Option<ValueCell> {
    let key = params[0].get_string();
    let value = params[1].clone();
    let heap = env.owner_heap_mut();
    match find(heap, &key) {
        Some(i) => {
            heap.at_mut(value_ptr(i)).copy_from(&value);
        }
        None => {
            let n = count(heap);
            let kp = heap.malloc();
            let vp = heap.malloc();
            debug_assert_eq!(kp, key_ptr(n));
            debug_assert_eq!(vp, value_ptr(n));
            heap.at_mut(kp).set_string(key);
            heap.at_mut(vp).copy_from(&value);
            set_count(heap, n + 1);
        }
    }
    Some(value)
}

fn has(env: &mut RuntimeEnv, params: &[ValueCell]) -> Option<ValueCell> {
    let key = params[0].get_string();
    let found = find(env.owner_heap(), &key).is_some();
    Some(ValueCell::boolean(found))
}

fn delete(env: &mut RuntimeEnv, params: &[ValueCell]) -> Option<ValueCell> {
    let key = params[0].get_string();
    let heap = env.owner_heap_mut();
    let Some(i) = find(heap, &key) else {
        return Some(ValueCell::boolean(false));
    };
    let n = count(heap);
    for j in i + 1..n {
        let moved_key = heap.at(key_ptr(j)).clone();
        let moved_value = heap.at(value_ptr(j)).clone();
        heap.at_mut(key_ptr(j - 1)).copy_from(&moved_key);
        heap.at_mut(value_ptr(j - 1)).copy_from(&moved_value);
    }
    heap.free(value_ptr(n - 1));
    heap.free(key_ptr(n - 1));
    set_count(heap, n - 1);
    Some(ValueCell::boolean(true))
}

fn count_method(env: &mut RuntimeEnv, _params: &[ValueCell]) -> Option<ValueCell> {
    Some(ValueCell::number(count(env.owner_heap()) as f64))
}

/// `each(callback)`: invokes `callback`'s `"call"` method once per entry, in
/// insertion order, with `(key, value)` as arguments. The scripted
/// counterpart to `for_each` below, which is host-side introspection only.
fn each(env: &mut RuntimeEnv, params: &[ValueCell]) -> Option<ValueCell> {
    let callback = params[0].get_objecthandle();
    let pairs: Vec<(String, ValueCell)> = {
        let heap = env.owner_heap();
        (0..count(heap))
            .map(|i| (heap.at(key_ptr(i)).get_string(), heap.at(value_ptr(i)).clone()))
            .collect()
    };
    for (key, value) in pairs {
        env.call_method(callback, "call", &[ValueCell::string(key), value]);
    }
    None
}

/// Embedder-facing iteration in insertion order. Not itself a scripted
/// method — analogous to `ProgramPool::for_each` and
/// `Object::traverse_tree`, which are likewise host-side introspection
/// rather than bindings callable from a script. `each` above is the
/// pool-dispatchable counterpart scripts use.
pub fn for_each(heap: &Heap, mut visitor: impl FnMut(&str, &ValueCell)) {
    for i in 0..count(heap) {
        visitor(&heap.at(key_ptr(i)).get_string(), heap.at(value_ptr(i)));
    }
}

/// Binds every `Dictionary` method into `pool`.
pub fn register_into(pool: &mut ProgramPool) {
    pool.put(TYPE_NAME, "__constructor", Program::native(0, constructor));
    pool.put(TYPE_NAME, "get", Program::native(1, get));
    pool.put(TYPE_NAME, "set", Program::native(2, set));
    pool.put(TYPE_NAME, "has", Program::native(1, has));
    pool.put(TYPE_NAME, "delete", Program::native(1, delete));
    pool.put(TYPE_NAME, "count", Program::native(0, count_method));
    pool.put(TYPE_NAME, "each", Program::native(1, each));
}
