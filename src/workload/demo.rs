//! Demo application that produces random but well-nested traces.
//!
//! Three functions call each other at random. Every call picks an argument
//! from the application's pool, and each call has a small chance of
//! returning without calling deeper.

use crate::tree::{CallSite, CallTree, SymbolTable};
use crate::utils::config::{MAX_WORKLOAD_DEPTH, STOP_PROBABILITY};
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Owner type recorded for every demo call
pub const OWNER_TYPE: &str = "calltree_studio::workload::DemoApplication";

/// Parameter type of the single argument every demo method takes
pub const ARG_TYPE: &str = "String";

/// The three traced demo methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoMethod {
    Abc,
    Def,
    Xyz,
}

impl DemoMethod {
    pub const ALL: [DemoMethod; 3] = [DemoMethod::Abc, DemoMethod::Def, DemoMethod::Xyz];

    pub fn name(self) -> &'static str {
        match self {
            DemoMethod::Abc => "abc",
            DemoMethod::Def => "def",
            DemoMethod::Xyz => "xyz",
        }
    }

    /// The two methods this one may call next
    fn others(self) -> [DemoMethod; 2] {
        match self {
            DemoMethod::Abc => [DemoMethod::Def, DemoMethod::Xyz],
            DemoMethod::Def => [DemoMethod::Abc, DemoMethod::Xyz],
            DemoMethod::Xyz => [DemoMethod::Abc, DemoMethod::Def],
        }
    }

    pub fn call_site(self) -> CallSite {
        CallSite::new(OWNER_TYPE, self.name(), [ARG_TYPE])
    }
}

/// Randomized workload driving one call tree
///
/// **Public** - used by the `generate` command
#[derive(Debug)]
pub struct DemoApplication {
    args: Vec<String>,
    rng: StdRng,
    symbols: SymbolTable,
}

impl DemoApplication {
    /// Create an application drawing arguments from `args`
    ///
    /// The same seed and arguments always produce the same trace.
    pub fn new(args: Vec<String>, seed: u64) -> Self {
        Self {
            args,
            rng: StdRng::seed_from_u64(seed),
            symbols: Self::symbols(),
        }
    }

    /// Symbols for every demo method, as needed to record or decode traces
    pub fn symbols() -> SymbolTable {
        DemoMethod::ALL
            .iter()
            .fold(SymbolTable::new(), |table, method| table.with(method.call_site()))
    }

    /// Trace one run, starting at `abc`, under the current entry of `tree`
    pub fn run(&mut self, tree: &mut CallTree) {
        let arg = self.next_arg();
        self.call(tree, DemoMethod::Abc, arg);
        debug!(
            "Demo run finished: {} entries, max depth {}",
            tree.node_count(),
            tree.max_depth()
        );
    }

    fn call(&mut self, tree: &mut CallTree, method: DemoMethod, arg: String) {
        let mut scope = tree.step_in_resolved(
            &self.symbols,
            OWNER_TYPE,
            method.name(),
            &[Some(ARG_TYPE)],
            [&arg],
        );

        if self.stop() || scope.current().depth() >= MAX_WORKLOAD_DEPTH {
            return;
        }

        let [first, second] = method.others();
        let next = if self.rng.gen_bool(0.5) { first } else { second };
        let next_arg = self.next_arg();
        self.call(&mut scope, next, next_arg);
    }

    fn stop(&mut self) -> bool {
        self.rng.gen_bool(STOP_PROBABILITY)
    }

    fn next_arg(&mut self) -> String {
        self.args.choose(&mut self.rng).cloned().unwrap_or_default()
    }
}
