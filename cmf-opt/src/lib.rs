//! C-minus-f Compiler - IR Analyses and Optimization Passes
//!
//! Every transformation implements [`Pass`] and mutates a
//! [`Module`](cmf_frontend::ir::Module) in place. A [`PassManager`] runs an
//! ordered pipeline of passes once over a module.

pub mod dead_code;
pub mod func_info;

pub use dead_code::DeadCode;
pub use func_info::FuncInfo;

use cmf_frontend::ir::Module;
use log::debug;

/// A transformation over a whole module
pub trait Pass {
    /// Name of this pass (for diagnostics)
    fn name(&self) -> &'static str;

    /// Run the pass; returns whether the module changed
    fn run(&mut self, module: &mut Module) -> bool;
}

/// Runs a sequence of passes in order
pub struct PassManager {
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Create a manager with the default pipeline
    pub fn new() -> Self {
        Self {
            passes: vec![Box::new(DeadCode::new())],
        }
    }

    /// Create a manager without any passes
    pub fn empty() -> Self {
        Self { passes: Vec::new() }
    }

    pub fn add_pass(&mut self, pass: Box<dyn Pass>) {
        self.passes.push(pass);
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Run every pass once; returns whether any of them changed the module
    pub fn run(&mut self, module: &mut Module) -> bool {
        let mut changed = false;
        for pass in &mut self.passes {
            let pass_changed = pass.run(module);
            debug!("Pass '{}' {}", pass.name(), if pass_changed { "changed the module" } else { "made no changes" });
            changed |= pass_changed;
        }
        changed
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}
