//! The resizable array built-in: a heap-backed exemplar of the
//! native-method contract. Slot 0 holds the length; slots 1..n hold the
//! elements, kept contiguous by relying on the heap's bump-allocation
//! policy never leaving a gap between pushes.

use crate::error::{VmError, fatal};
use crate::heap::Heap;
use crate::pool::ProgramPool;
use crate::program::Program;
use crate::runtime_env::RuntimeEnv;
use crate::value::ValueCell;
use std::cmp::Ordering;

pub const TYPE_NAME: &str = "Array";

/// Runaway-index guard for `set` past the current length.
const MAX_GROWTH: i64 = 1024;

fn length_ptr() -> usize {
    0
}

fn element_ptr(index: usize) -> usize {
    index + 1
}

fn length(heap: &Heap) -> i64 {
    heap.at(length_ptr()).get_number() as i64
}

fn set_length(heap: &mut Heap, new_length: i64) {
    heap.at_mut(length_ptr()).set_number(new_length as f64);
}

fn get_elem(heap: &Heap, index: usize) -> ValueCell {
    heap.at(element_ptr(index)).clone()
}

fn set_elem(heap: &mut Heap, index: usize, value: &ValueCell) {
    heap.at_mut(element_ptr(index)).copy_from(value);
}

fn constructor(env: &mut RuntimeEnv, _params: &[ValueCell]) -> Option<ValueCell> {
    let heap = env.owner_heap_mut();
    let ptr = heap.malloc();
    debug_assert_eq!(ptr, length_ptr(), "length must occupy slot 0");
    heap.at_mut(ptr).set_number(0.0);
    None
}

fn length_method(env: &mut RuntimeEnv, _params: &[ValueCell]) -> Option<ValueCell> {
    Some(ValueCell::number(length(env.owner_heap()) as f64))
}

fn get(env: &mut RuntimeEnv, params: &[ValueCell]) -> Option<ValueCell> {
    let index = params[0].get_number() as i64;
    let len = length(env.owner_heap());
    if index < 0 || index >= len {
        fatal(VmError::ArrayIndexOutOfRange {
            index,
            length: len as usize,
        });
    }
    Some(get_elem(env.owner_heap(), index as usize))
}

fn set(env: &mut RuntimeEnv, params: &[ValueCell]) -> Option<ValueCell> {
    let index = params[0].get_number() as i64;
    let value = params[1].clone();
    if index < 0 {
        fatal(VmError::ArrayIndexOutOfRange {
            index,
            length: length(env.owner_heap()) as usize,
        });
    }
    let heap = env.owner_heap_mut();
    let len = length(heap);
    if index < len {
        set_elem(heap, index as usize, &value);
    } else {
        let growth = index - len;
        if growth >= MAX_GROWTH {
            fatal(VmError::ArrayIndexTooFar {
                index,
                length: len as usize,
            });
        }
        for _ in 0..growth {
            heap.malloc();
        }
        let ptr = heap.malloc();
        heap.at_mut(ptr).copy_from(&value);
        set_length(heap, index + 1);
    }
    Some(value)
}

fn push(env: &mut RuntimeEnv, params: &[ValueCell]) -> Option<ValueCell> {
    let value = &params[0];
    let heap = env.owner_heap_mut();
    let ptr = heap.malloc();
    heap.at_mut(ptr).copy_from(value);
    let len = length(heap);
    set_length(heap, len + 1);
    None
}

fn pop(env: &mut RuntimeEnv, _params: &[ValueCell]) -> Option<ValueCell> {
    let heap = env.owner_heap_mut();
    let len = length(heap);
    if len == 0 {
        return Some(ValueCell::null());
    }
    let last = (len - 1) as usize;
    let value = get_elem(heap, last);
    heap.free(element_ptr(last));
    set_length(heap, len - 1);
    Some(value)
}

fn shift(env: &mut RuntimeEnv, _params: &[ValueCell]) -> Option<ValueCell> {
    let heap = env.owner_heap_mut();
    let len = length(heap);
    if len == 0 {
        return Some(ValueCell::null());
    }
    let first = get_elem(heap, 0);
    for i in 1..len as usize {
        let moved = get_elem(heap, i);
        set_elem(heap, i - 1, &moved);
    }
    heap.free(element_ptr((len - 1) as usize));
    set_length(heap, len - 1);
    Some(first)
}

fn unshift(env: &mut RuntimeEnv, params: &[ValueCell]) -> Option<ValueCell> {
    let value = params[0].clone();
    let heap = env.owner_heap_mut();
    let len = length(heap);
    heap.malloc(); // extend the tail by one slot before shifting up into it
    let mut i = len as usize;
    while i > 0 {
        let moved = get_elem(heap, i - 1);
        set_elem(heap, i, &moved);
        i -= 1;
    }
    set_elem(heap, 0, &value);
    set_length(heap, len + 1);
    None
}

fn reverse(env: &mut RuntimeEnv, _params: &[ValueCell]) -> Option<ValueCell> {
    let heap = env.owner_heap_mut();
    let len = length(heap) as usize;
    for i in 0..len / 2 {
        let a = get_elem(heap, i);
        let b = get_elem(heap, len - 1 - i);
        set_elem(heap, i, &b);
        set_elem(heap, len - 1 - i, &a);
    }
    None
}

fn index_of(env: &mut RuntimeEnv, params: &[ValueCell]) -> Option<ValueCell> {
    let needle = &params[0];
    let heap = env.owner_heap();
    let len = length(heap) as usize;
    for i in 0..len {
        if get_elem(heap, i).compare(needle) == Ordering::Equal {
            return Some(ValueCell::number(i as f64));
        }
    }
    Some(ValueCell::number(-1.0))
}

fn sort(env: &mut RuntimeEnv, _params: &[ValueCell]) -> Option<ValueCell> {
    let heap = env.owner_heap_mut();
    let len = length(heap) as usize;
    if len > 1 {
        quicksort(heap, 0, len - 1);
    }
    None
}

/// Median-of-three quicksort (first, middle, last) over element indexes
/// `[lo, hi]`, in place on the heap slots. Not required to be
/// stable.
fn quicksort(heap: &mut Heap, lo: usize, hi: usize) {
    if lo >= hi {
        return;
    }
    let pivot = median_of_three(heap, lo, hi);
    let mut i = lo;
    let mut j = hi;
    loop {
        while i <= hi && get_elem(heap, i).compare(&pivot) == Ordering::Less {
            i += 1;
        }
        while j > lo && get_elem(heap, j).compare(&pivot) == Ordering::Greater {
            j -= 1;
        }
        if i >= j {
            break;
        }
        let a = get_elem(heap, i);
        let b = get_elem(heap, j);
        set_elem(heap, i, &b);
        set_elem(heap, j, &a);
        i += 1;
        j -= 1;
    }
    if j > lo {
        quicksort(heap, lo, j);
    }
    if j + 1 < hi {
        quicksort(heap, j + 1, hi);
    }
}

fn median_of_three(heap: &Heap, lo: usize, hi: usize) -> ValueCell {
    let mid = lo + (hi - lo) / 2;
    let mut candidates = [get_elem(heap, lo), get_elem(heap, mid), get_elem(heap, hi)];
    candidates.sort_by(|a, b| a.compare(b));
    candidates[1].clone()
}

/// Binds every `Array` method into `pool`.
pub fn register_into(pool: &mut ProgramPool) {
    pool.put(TYPE_NAME, "__constructor", Program::native(0, constructor));
    pool.put(TYPE_NAME, "length", Program::native(0, length_method));
    pool.put(TYPE_NAME, "get", Program::native(1, get));
    pool.put(TYPE_NAME, "set", Program::native(2, set));
    pool.put(TYPE_NAME, "push", Program::native(1, push));
    pool.put(TYPE_NAME, "pop", Program::native(0, pop));
    pool.put(TYPE_NAME, "shift", Program::native(0, shift));
    pool.put(TYPE_NAME, "unshift", Program::native(1, unshift));
    pool.put(TYPE_NAME, "reverse", Program::native(0, reverse));
    pool.put(TYPE_NAME, "indexOf", Program::native(1, index_of));
    pool.put(TYPE_NAME, "sort", Program::native(0, sort));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::ObjectManager;
    use crate::object::Handle;
    use crate::stack::Stack;

    fn spawn_array(pool: &ProgramPool, stack: &mut Stack, manager: &mut ObjectManager) -> Handle {
        manager.spawn(pool, stack, TYPE_NAME, Handle::NULL, None, None, None)
    }

    #[test]
    fn basics_push_pop_shift() {
        let mut pool = ProgramPool::new();
        register_into(&mut pool);
        let mut stack = Stack::new();
        let mut manager = ObjectManager::new();
        let h = spawn_array(&pool, &mut stack, &mut manager);

        for n in [10.0, 20.0, 30.0] {
            manager.call_method(&pool, &mut stack, h, "push", &[ValueCell::number(n)]);
        }
        let len = manager.call_method(&pool, &mut stack, h, "length", &[]);
        assert_eq!(len.get_number(), 3.0);
        let first = manager.call_method(&pool, &mut stack, h, "get", &[ValueCell::number(0.0)]);
        assert_eq!(first.get_number(), 10.0);
        let last = manager.call_method(&pool, &mut stack, h, "get", &[ValueCell::number(2.0)]);
        assert_eq!(last.get_number(), 30.0);

        let popped = manager.call_method(&pool, &mut stack, h, "pop", &[]);
        assert_eq!(popped.get_number(), 30.0);
        assert_eq!(
            manager
                .call_method(&pool, &mut stack, h, "length", &[])
                .get_number(),
            2.0
        );

        let shifted = manager.call_method(&pool, &mut stack, h, "shift", &[]);
        assert_eq!(shifted.get_number(), 10.0);
        assert_eq!(
            manager
                .call_method(&pool, &mut stack, h, "get", &[ValueCell::number(0.0)])
                .get_number(),
            20.0
        );
        assert_eq!(
            manager
                .call_method(&pool, &mut stack, h, "length", &[])
                .get_number(),
            1.0
        );
    }

    #[test]
    fn sort_matches_the_reference_ordering() {
        let mut pool = ProgramPool::new();
        register_into(&mut pool);
        let mut stack = Stack::new();
        let mut manager = ObjectManager::new();
        let h = spawn_array(&pool, &mut stack, &mut manager);

        for n in [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0, 5.0, 3.0] {
            manager.call_method(&pool, &mut stack, h, "push", &[ValueCell::number(n)]);
        }
        manager.call_method(&pool, &mut stack, h, "sort", &[]);

        let expected = [1.0, 1.0, 2.0, 3.0, 3.0, 4.0, 5.0, 5.0, 6.0, 9.0];
        for (i, &e) in expected.iter().enumerate() {
            let v = manager.call_method(&pool, &mut stack, h, "get", &[ValueCell::number(i as f64)]);
            assert_eq!(v.get_number(), e, "index {i}");
        }
    }

    #[test]
    fn index_of_finds_or_reports_absent() {
        let mut pool = ProgramPool::new();
        register_into(&mut pool);
        let mut stack = Stack::new();
        let mut manager = ObjectManager::new();
        let h = spawn_array(&pool, &mut stack, &mut manager);
        for n in [10.0, 20.0, 30.0] {
            manager.call_method(&pool, &mut stack, h, "push", &[ValueCell::number(n)]);
        }
        assert_eq!(
            manager
                .call_method(&pool, &mut stack, h, "indexOf", &[ValueCell::number(20.0)])
                .get_number(),
            1.0
        );
        assert_eq!(
            manager
                .call_method(&pool, &mut stack, h, "indexOf", &[ValueCell::number(40.0)])
                .get_number(),
            -1.0
        );
    }

    #[test]
    fn reverse_is_its_own_inverse() {
        let mut pool = ProgramPool::new();
        register_into(&mut pool);
        let mut stack = Stack::new();
        let mut manager = ObjectManager::new();
        let h = spawn_array(&pool, &mut stack, &mut manager);
        for n in [1.0, 2.0, 3.0] {
            manager.call_method(&pool, &mut stack, h, "push", &[ValueCell::number(n)]);
        }
        manager.call_method(&pool, &mut stack, h, "reverse", &[]);
        manager.call_method(&pool, &mut stack, h, "reverse", &[]);
        for (i, &e) in [1.0, 2.0, 3.0].iter().enumerate() {
            let v = manager.call_method(&pool, &mut stack, h, "get", &[ValueCell::number(i as f64)]);
            assert_eq!(v.get_number(), e);
        }
    }

    #[test]
    #[should_panic(expected = "too far")]
    fn set_past_bounded_growth_is_fatal() {
        let mut pool = ProgramPool::new();
        register_into(&mut pool);
        let mut stack = Stack::new();
        let mut manager = ObjectManager::new();
        let h = spawn_array(&pool, &mut stack, &mut manager);
        manager.call_method(
            &pool,
            &mut stack,
            h,
            "set",
            &[ValueCell::number(2000.0), ValueCell::number(1.0)],
        );
    }

    #[test]
    fn pop_and_shift_on_empty_return_null() {
        let mut pool = ProgramPool::new();
        register_into(&mut pool);
        let mut stack = Stack::new();
        let mut manager = ObjectManager::new();
        let h = spawn_array(&pool, &mut stack, &mut manager);
        assert!(manager.call_method(&pool, &mut stack, h, "pop", &[]).is_null());
        assert!(manager.call_method(&pool, &mut stack, h, "shift", &[]).is_null());
    }
}
