//! Hook-mode entry points: what this binary does when the build
//! orchestrator invokes it in place of the real compiler or linker via
//! `-toolexec` (spec §2 "Hook mode / driver mode", §4.5, §4.6).

pub mod compile;
pub mod link;
