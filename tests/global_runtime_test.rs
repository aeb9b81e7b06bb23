// This file tests the process-wide runtime instance. It lives in its own test binary because
// the global can be installed only once per process. Several threads race to install it;
// exactly one build must happen and every caller must observe the same instance.

use jitci::runtime::{CompilerFactory, Options, Runtime, RuntimeBuilder, ServiceRegistry};
use jitci::VmConfig;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

static BUILDS: AtomicUsize = AtomicUsize::new(0);

struct CountedStub;

impl CompilerFactory for CountedStub {
    fn compiler_name(&self) -> &str {
        "counted"
    }

    fn on_selection(&self) {
        BUILDS.fetch_add(1, Ordering::SeqCst);
    }

    fn create_compiler(&self, _runtime: &Runtime) -> jitci::CiResult<Arc<dyn jitci::runtime::Compiler>> {
        Ok(Arc::new(jitci::runtime::compiler::StubCompiler))
    }
}

fn builder() -> RuntimeBuilder {
    let mut services = ServiceRegistry::with_builtin_backends();
    services.register_compiler_factory(Arc::new(CountedStub));
    RuntimeBuilder::new(services)
        .config(VmConfig::for_architecture("amd64"))
        .options(Options::from_properties([("jitci.Compiler", "counted")]))
}

#[test]
fn test_global_runtime_is_initialized_once() {
    let _ = env_logger::builder().is_test(true).try_init();
    assert!(Runtime::global().is_none());

    let runtimes: Vec<&'static Runtime> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| Runtime::init_global(builder()).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(BUILDS.load(Ordering::SeqCst), 1);
    let global = Runtime::global().unwrap();
    assert!(runtimes.iter().all(|r| std::ptr::eq(*r, global)));

    // Later calls return the installed instance without building.
    let again = Runtime::init_global(builder()).unwrap();
    assert!(std::ptr::eq(again, global));
    assert_eq!(BUILDS.load(Ordering::SeqCst), 1);
    assert_eq!(
        global.resolve_compiler_factory().unwrap().compiler_name(),
        "counted"
    );
}
