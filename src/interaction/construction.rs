//! The Wind Gap shelter. Logs go in one at a time, and only while the
//! hub fire beside the site is burning.

use bevy::prelude::*;

use crate::environment::EnvironmentState;
use crate::shared::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    Deposited { state: u8, completed: bool },
    FireOut,
    AlreadyComplete,
    NoLogs,
}

impl BuildOutcome {
    pub fn notice(&self) -> Option<(&'static str, ToastSeverity)> {
        match self {
            BuildOutcome::Deposited { completed: true, .. } => {
                Some(("THE SHELTER IS COMPLETE!", ToastSeverity::Success))
            }
            BuildOutcome::Deposited { .. } => Some(("+1 LOG TO THE SHELTER", ToastSeverity::Info)),
            BuildOutcome::FireOut => Some(("LIGHT THE FIRE TO WORK", ToastSeverity::Warning)),
            BuildOutcome::AlreadyComplete => None,
            BuildOutcome::NoLogs => Some(("NEED LOGS TO BUILD", ToastSeverity::Warning)),
        }
    }
}

pub fn deposit_at_site(run: &mut RunState, env: &EnvironmentState) -> BuildOutcome {
    if !env.linked_fire().is_some_and(|fire| fire.is_lit()) {
        return BuildOutcome::FireOut;
    }
    if run.shack_progress.is_complete() {
        return BuildOutcome::AlreadyComplete;
    }
    if !run.remove_logs(1) {
        return BuildOutcome::NoLogs;
    }
    run.shack_progress.add_log();
    let state = run.shack_progress.state;
    let completed = run.shack_progress.is_complete();
    if completed {
        info!("[Interaction] Shelter complete after {} logs", run.shack_progress.logs);
    }
    BuildOutcome::Deposited { state, completed }
}
