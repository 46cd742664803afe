//! End-to-end scenarios exercising the full stack (Vm + ObjectManager +
//! ProgramPool together) rather than any single module in isolation.

use scriptree_runtime::object::Handle;
use scriptree_runtime::runtime_env::RuntimeEnv;
use scriptree_runtime::value::ValueCell;
use scriptree_runtime::vm::Vm;
use std::cell::RefCell;

thread_local! {
    static LOG: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

fn clear_log() {
    LOG.with(|log| log.borrow_mut().clear());
}

fn read_log() -> Vec<String> {
    LOG.with(|log| log.borrow().clone())
}

fn log_own_name(env: &mut RuntimeEnv, _params: &[ValueCell]) -> Option<ValueCell> {
    let name = env.manager().get(env.owner()).unwrap().name().to_string();
    LOG.with(|log| log.borrow_mut().push(name));
    None
}

#[test]
fn scenario_1_array_basics() {
    let mut vm = Vm::create();
    let array = vm.spawn_object(Handle::NULL, "Array", None, None, None);

    vm.call_method(array, "push", &[ValueCell::number(10.0)]);
    vm.call_method(array, "push", &[ValueCell::number(20.0)]);
    vm.call_method(array, "push", &[ValueCell::number(30.0)]);

    assert_eq!(vm.call_method(array, "length", &[]).get_number(), 3.0);
    assert_eq!(
        vm.call_method(array, "get", &[ValueCell::number(0.0)]).get_number(),
        10.0
    );
    assert_eq!(
        vm.call_method(array, "get", &[ValueCell::number(2.0)]).get_number(),
        30.0
    );

    assert_eq!(vm.call_method(array, "pop", &[]).get_number(), 30.0);
    assert_eq!(vm.call_method(array, "length", &[]).get_number(), 2.0);

    assert_eq!(vm.call_method(array, "shift", &[]).get_number(), 10.0);
    assert_eq!(
        vm.call_method(array, "get", &[ValueCell::number(0.0)]).get_number(),
        20.0
    );
    assert_eq!(vm.call_method(array, "length", &[]).get_number(), 1.0);
}

#[test]
fn scenario_2_array_sort() {
    let mut vm = Vm::create();
    let array = vm.spawn_object(Handle::NULL, "Array", None, None, None);
    for n in [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0, 5.0, 3.0] {
        vm.call_method(array, "push", &[ValueCell::number(n)]);
    }

    vm.call_method(array, "sort", &[]);

    let expected = [1.0, 1.0, 2.0, 3.0, 3.0, 4.0, 5.0, 5.0, 6.0, 9.0];
    for (i, &e) in expected.iter().enumerate() {
        assert_eq!(
            vm.call_method(array, "get", &[ValueCell::number(i as f64)]).get_number(),
            e,
            "index {i}"
        );
    }
}

#[test]
fn scenario_3_array_index_of() {
    let mut vm = Vm::create();
    let array = vm.spawn_object(Handle::NULL, "Array", None, None, None);
    for n in [10.0, 20.0, 30.0] {
        vm.call_method(array, "push", &[ValueCell::number(n)]);
    }

    assert_eq!(
        vm.call_method(array, "indexOf", &[ValueCell::number(20.0)]).get_number(),
        1.0
    );
    assert_eq!(
        vm.call_method(array, "indexOf", &[ValueCell::number(40.0)]).get_number(),
        -1.0
    );
}

#[test]
fn scenario_4_tree_walk_ordering() {
    clear_log();
    let mut vm = Vm::create();
    vm.bind("Application", "state:main", log_own_name, 0);
    vm.bind("A", "state:main", log_own_name, 0);
    vm.bind("B", "state:main", log_own_name, 0);
    vm.bind("C", "state:main", log_own_name, 0);

    let root = vm.launch();
    let a = vm.spawn_object(root, "A", None, None, None);
    vm.spawn_object(root, "B", None, None, None);
    vm.spawn_object(a, "C", None, None, None);

    vm.update();

    assert_eq!(read_log(), vec!["Application", "A", "C", "B"]);
}

#[test]
fn scenario_5_kill_semantics() {
    fn kill_c_then_log(env: &mut RuntimeEnv, _params: &[ValueCell]) -> Option<ValueCell> {
        let name = env.manager().get(env.owner()).unwrap().name().to_string();
        LOG.with(|log| log.borrow_mut().push(name.clone()));
        if name == "A" {
            let children: Vec<Handle> = env.manager().get(env.owner()).unwrap().children().to_vec();
            for child in children {
                if env.manager().get(child).unwrap().name() == "C" {
                    env.manager_mut().get_mut(child).unwrap().kill();
                }
            }
        }
        None
    }

    clear_log();
    let mut vm = Vm::create();
    vm.bind("Application", "state:main", log_own_name, 0);
    vm.bind("A", "state:main", kill_c_then_log, 0);
    vm.bind("C", "state:main", log_own_name, 0);

    let root = vm.launch();
    let a = vm.spawn_object(root, "A", None, None, None);
    vm.spawn_object(a, "C", None, None, None);

    vm.update();
    assert_eq!(
        read_log(),
        vec!["Application", "A", "C"],
        "C was visited before A's kill took effect"
    );

    clear_log();
    vm.update();
    assert_eq!(read_log(), vec!["Application", "A"], "C is gone by tick T+1");
    assert!(vm.manager().get(a).unwrap().children().is_empty());
}

#[test]
fn scenario_6_pool_fallback() {
    fn anonymous(_env: &mut RuntimeEnv, _params: &[ValueCell]) -> Option<ValueCell> {
        Some(ValueCell::string("anonymous"))
    }
    fn specific(_env: &mut RuntimeEnv, _params: &[ValueCell]) -> Option<ValueCell> {
        Some(ValueCell::string("specific"))
    }

    let mut vm = Vm::create();
    vm.bind("Object", "toString", anonymous, 0);
    let t = vm.spawn_object(Handle::NULL, "T", None, None, None);

    assert_eq!(vm.call_method(t, "toString", &[]).get_string(), "anonymous");

    vm.bind("T", "toString", specific, 0);
    assert_eq!(vm.call_method(t, "toString", &[]).get_string(), "specific");
}
