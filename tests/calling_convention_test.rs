// This file contains integration tests for register catalogs and calling conventions across
// both supported architectures. It checks the allocatable register arithmetic with and
// without compressed references, the caller-saved closure property, register assignment
// for signatures that fit in the parameter pools, overflow to strictly increasing word
// aligned stack slots, and the concrete x86-64 managed-call scenarios for mixed signatures.

use jitci::core::calling_convention::Location;
use jitci::core::register::RegisterSet;
use jitci::core::signature::Signature;
use jitci::runtime::backend::find_factory;
use jitci::runtime::{Backend, BackendFactory, ServiceRegistry};
use jitci::{CallingConventionType, RegisterConfig, ValueKind, VmConfig};

const ARCHITECTURES: [(&str, usize, usize); 2] = [
    // (name, register count, reserved count)
    ("amd64", 32, 2),
    ("aarch64", 65, 7),
];

fn make_backend(arch: &str, compressed: bool, windows: bool) -> Backend {
    let config = VmConfig::for_architecture(arch)
        .with_compressed_oops(compressed)
        .with_windows_os(windows);
    let services = ServiceRegistry::with_builtin_backends();
    find_factory(services.backend_factories(), arch)
        .unwrap()
        .create_backend(&config, None)
        .unwrap()
}

fn parameter_pool_len(cfg: &dyn RegisterConfig, ty: CallingConventionType) -> usize {
    cfg.calling_convention_registers(ty, ValueKind::Int).len()
}

#[test]
fn test_allocatable_count_arithmetic() {
    let _ = env_logger::builder().is_test(true).try_init();

    for (arch, total, reserved) in ARCHITECTURES {
        for compressed in [false, true] {
            let backend = make_backend(arch, compressed, false);
            let cfg = backend.register_config();
            assert_eq!(cfg.architecture().registers.len(), total);
            let expected = total - reserved - usize::from(compressed);
            assert_eq!(
                cfg.allocatable_registers().len(),
                expected,
                "{} compressed={}",
                arch,
                compressed
            );
        }
    }
}

#[test]
fn test_caller_saved_closure() {
    for (arch, _, _) in ARCHITECTURES {
        for windows in [false, true] {
            let backend = make_backend(arch, true, windows);
            let cfg = backend.register_config();
            let mut pools = RegisterSet::from_registers(cfg.allocatable_registers());
            for ty in [
                CallingConventionType::ManagedCall,
                CallingConventionType::ManagedCallee,
                CallingConventionType::NativeCall,
            ] {
                for kind in [ValueKind::Int, ValueKind::Double] {
                    pools.union(&RegisterSet::from_registers(cfg.calling_convention_registers(ty, kind)));
                }
            }
            let saved = RegisterSet::from_registers(cfg.caller_save_registers());
            assert!(saved.is_subset(&pools), "{}", arch);
            assert!(RegisterSet::from_registers(cfg.allocatable_registers()).is_subset(&saved));
        }
    }
}

#[test]
fn test_signatures_within_pool_use_no_stack() {
    for (arch, _, _) in ARCHITECTURES {
        let backend = make_backend(arch, false, false);
        let cfg = backend.register_config();
        for ty in [CallingConventionType::ManagedCall, CallingConventionType::NativeCall] {
            let pool = parameter_pool_len(cfg, ty);
            for n in 0..=pool {
                let params = vec![ValueKind::Long; n];
                let cc = cfg.calling_convention(ty, ValueKind::Void, &params);
                assert_eq!(cc.stack_size(), 0, "{} {:?} n={}", arch, ty, n);
                assert!(cc.arguments().iter().all(|l| l.register().is_some()));
            }
        }
    }
}

#[test]
fn test_overflow_offsets_strictly_increase() {
    for (arch, _, _) in ARCHITECTURES {
        let backend = make_backend(arch, false, false);
        let cfg = backend.register_config();
        let ty = CallingConventionType::ManagedCall;
        let pool = cfg.calling_convention_registers(ty, ValueKind::Int).to_vec();
        let params = [ValueKind::Int, ValueKind::Object, ValueKind::Long, ValueKind::Short]
            .iter()
            .copied()
            .cycle()
            .take(pool.len() + 5)
            .collect::<Vec<_>>();
        let cc = cfg.calling_convention(ty, ValueKind::Object, &params);

        for (i, reg) in pool.iter().enumerate() {
            assert_eq!(cc.argument(i).register(), Some(*reg));
        }
        let offsets: Vec<_> = cc.arguments()[pool.len()..]
            .iter()
            .map(|l| l.stack_slot().unwrap().offset)
            .collect();
        assert_eq!(offsets[0], 0);
        for pair in offsets.windows(2) {
            assert!(pair[1] >= pair[0] + 8, "{}: {:?}", arch, offsets);
        }
        assert!(cc.stack_size() >= offsets[offsets.len() - 1] + 8);
    }
}

#[test]
fn test_amd64_mixed_signature_scenario() {
    let backend = make_backend("amd64", false, false);
    let cfg = backend.register_config();
    let signature = Signature::parse("(IJLjava/lang/Object;IIID)V").unwrap();
    let cc = cfg.calling_convention(
        CallingConventionType::ManagedCall,
        signature.return_kind(),
        signature.parameters(),
    );
    let names: Vec<_> = cc.arguments().iter().map(|l| l.register().unwrap().name).collect();
    assert_eq!(names, ["rsi", "rdx", "rcx", "r8", "r9", "rdi", "xmm0"]);
    assert_eq!(cc.stack_size(), 0);
    assert!(cc.return_location().is_none());
}

#[test]
fn test_amd64_seventh_integer_on_stack() {
    let backend = make_backend("amd64", false, false);
    let cfg = backend.register_config();
    let cc = cfg.calling_convention(CallingConventionType::ManagedCall, ValueKind::Void, &[ValueKind::Int; 7]);
    match cc.argument(6) {
        Location::Stack(slot) => {
            assert_eq!(slot.offset, 0);
            assert_eq!(slot.size, 8);
            assert!(!slot.add_frame_size);
        }
        other => panic!("expected a stack slot, got {}", other),
    }
}

#[test]
fn test_callee_view_adds_frame_size() {
    let backend = make_backend("amd64", false, false);
    let cfg = backend.register_config();
    let cc = cfg.calling_convention(CallingConventionType::ManagedCallee, ValueKind::Int, &[ValueKind::Int; 7]);
    assert!(cc.argument(6).stack_slot().unwrap().add_frame_size);
    let managed = cfg.calling_convention_registers(CallingConventionType::ManagedCall, ValueKind::Int);
    assert_eq!(cc.argument(0).register(), managed.first().copied());
}

#[test]
fn test_attributes_map_covers_every_register() {
    for (arch, total, _) in ARCHITECTURES {
        let backend = make_backend(arch, false, false);
        let cfg = backend.register_config();
        let map = cfg.attributes_map();
        assert_eq!(map.len(), total);
        assert!(map.iter().all(|a| !a.callee_save));
        assert_eq!(
            map.iter().filter(|a| a.allocatable).count(),
            cfg.allocatable_registers().len()
        );
    }
}

#[test]
fn test_filter_allocatable_by_kind() {
    let backend = make_backend("aarch64", false, false);
    let cfg = backend.register_config();
    let floats = cfg.filter_allocatable_registers(ValueKind::Float, cfg.allocatable_registers());
    assert_eq!(floats.len(), 32);
    let ints = cfg.filter_allocatable_registers(ValueKind::Object, cfg.allocatable_registers());
    assert_eq!(ints.len(), 26);
    assert!(ints.iter().all(|r| r.is_general_purpose()));
}

#[test]
fn test_factory_word_size_check() {
    let mut config = VmConfig::for_architecture("amd64");
    config.word_size = 4;
    let services = ServiceRegistry::with_builtin_backends();
    let factory = find_factory(services.backend_factories(), "amd64").unwrap();
    let err = factory.create_backend(&config, None).err().unwrap();
    assert!(err.to_string().contains("amd64"));
}
