// Mode resolver
//
// Selects the single action of this process from the startup arguments and
// the host. Priority: help > version > clear > cli > headless > gui.

use crate::args::StartupArguments;
use crate::environment::HostEnvironment;

/// Which stores a maintenance run resets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearTargets {
    pub cache: bool,
    pub data: bool,
}

/// The action selected for this process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionDecision {
    PrintHelp,
    PrintVersion,
    ClearData(ClearTargets),
    RunCli,
    RunGuiHeadlessRefused,
    RunGui,
}

impl ExecutionDecision {
    /// Whether the process exits right after acting on the decision
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ExecutionDecision::RunCli | ExecutionDecision::RunGui)
    }
}

pub struct ModeResolver;

impl ModeResolver {
    pub fn resolve(args: &StartupArguments, host: &dyn HostEnvironment) -> ExecutionDecision {
        if args.help {
            ExecutionDecision::PrintHelp
        } else if args.version {
            ExecutionDecision::PrintVersion
        } else if args.clear_requested() {
            ExecutionDecision::ClearData(ClearTargets {
                cache: args.clear_cache,
                data: args.clear_data,
            })
        } else if args.run_cli() {
            ExecutionDecision::RunCli
        } else if host.headless() {
            ExecutionDecision::RunGuiHeadlessRefused
        } else {
            ExecutionDecision::RunGui
        }
    }
}
