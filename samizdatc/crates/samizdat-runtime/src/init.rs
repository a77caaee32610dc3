//! Leaf-first module-init dependency graph (spec section 2's "process-
//! wide init via a module-init dependency graph; each module declares
//! its dependencies and is run exactly once, leaf-first").
//!
//! The reference has no real analogue for this at the core level — its
//! `pbInit` (spec 9, `original_source`'s `pb/init.c`) is a single hand-
//! ordered sequence of `pbBindX()` calls, commented with *why* each one
//! has to come before the next ("the initialization of the type system
//! has to come first, because all the other initializers create types").
//! [`ModuleGraph`] generalizes that hand-ordering into a declared
//! dependency set so the order is checked rather than merely commented,
//! while still only ever running leaf-first and each node exactly once.

use rustc_hash::FxHashMap;

use crate::error::RuntimeError;

/// One node in the init graph: a name, the names it depends on, and the
/// thunk to run once every dependency has run.
struct Module<'a> {
    depends_on: Vec<&'static str>,
    run: Box<dyn FnOnce() + 'a>,
}

/// Collects `(name, depends_on, thunk)` triples and runs them leaf-first,
/// exactly once each, the first time [`ModuleGraph::run_all`] is called.
///
/// Mirrors `samizdat_gc`'s own single-threaded, non-reentrant setup
/// philosophy: this is not a general-purpose scheduler, just enough of a
/// topological runner to make the bootstrap order a checked invariant
/// instead of a hand-maintained comment.
#[derive(Default)]
pub struct ModuleGraph<'a> {
    modules: FxHashMap<&'static str, Module<'a>>,
    order: Vec<&'static str>,
}

impl<'a> ModuleGraph<'a> {
    pub fn new() -> Self {
        Self { modules: FxHashMap::default(), order: Vec::new() }
    }

    /// Declares a module. `depends_on` names modules that must run
    /// before this one. Re-declaring the same name replaces its thunk
    /// (idempotent declaration, matching `pbInit`'s own "if already
    /// initialized, return" guard at the top of the function).
    pub fn declare(&mut self, name: &'static str, depends_on: Vec<&'static str>, run: impl FnOnce() + 'a) {
        if !self.modules.contains_key(name) {
            self.order.push(name);
        }
        self.modules.insert(name, Module { depends_on, run: Box::new(run) });
    }

    /// Runs every declared module exactly once, leaf-first. Errors on an
    /// unresolvable dependency (named module never declared) or a
    /// dependency cycle; both are bad-input conditions per spec section
    /// 7 ("malformed executable node, undefined variable" analogues at
    /// the module-graph level), not panics.
    pub fn run_all(mut self) -> Result<(), RuntimeError> {
        let declared = self.order.clone();
        for name in &declared {
            for dep in &self.modules[name].depends_on {
                if !self.modules.contains_key(dep) {
                    return Err(RuntimeError::bad_input(format!(
                        "module '{name}' depends on undeclared module '{dep}'"
                    )));
                }
            }
        }

        let mut done: FxHashMap<&'static str, bool> = FxHashMap::default();
        let mut in_progress: FxHashMap<&'static str, bool> = FxHashMap::default();
        let mut ready: Vec<(&'static str, Box<dyn FnOnce() + 'a>)> = Vec::new();

        fn visit<'a>(
            name: &'static str,
            modules: &mut FxHashMap<&'static str, Module<'a>>,
            done: &mut FxHashMap<&'static str, bool>,
            in_progress: &mut FxHashMap<&'static str, bool>,
            ready: &mut Vec<(&'static str, Box<dyn FnOnce() + 'a>)>,
        ) -> Result<(), RuntimeError> {
            if *done.get(name).unwrap_or(&false) {
                return Ok(());
            }
            if *in_progress.get(name).unwrap_or(&false) {
                return Err(RuntimeError::bad_input(format!("module-init dependency cycle at '{name}'")));
            }
            in_progress.insert(name, true);

            let deps = modules[name].depends_on.clone();
            for dep in deps {
                visit(dep, modules, done, in_progress, ready)?;
            }

            in_progress.insert(name, false);
            done.insert(name, true);
            let module = modules.remove(name).expect("declared above");
            ready.push((name, module.run));
            Ok(())
        }

        for name in &declared {
            visit(name, &mut self.modules, &mut done, &mut in_progress, &mut ready)?;
        }

        for (_, run) in ready {
            run();
        }
        Ok(())
    }
}
