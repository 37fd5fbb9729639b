//! Configuration rules: the order slots must be filled in
//!
//! Shells fill inside out, starting with the innermost Primary group. Within a
//! shell (the innermost one included), every Primary slot must be filled
//! before any Secondary one, and a Secondary slot that has already been filled
//! once (then knocked out) only reopens after every Secondary slot of its shell
//! has had an electron: spread before pack.

use serde::{Deserialize, Serialize};

use super::slot::Slot;
use super::state::ParticleKind;

/// Which ordering rule a capture would break
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleViolation {
    /// A Primary slot of the previous shell is still empty
    PreviousShellIncomplete { shell: usize },
    /// A Primary slot of the target's own shell is still empty
    PrimaryGroupIncomplete { shell: usize },
    /// Some Secondary slot of the shell has never been entered
    SpreadBeforePack { shell: usize },
}

fn primaries_filled(slots: &[Slot], shell: usize) -> bool {
    slots
        .iter()
        .filter(|s| s.shell == shell && s.kind == ParticleKind::Primary)
        .all(Slot::occupied)
}

fn secondaries_spread(slots: &[Slot], shell: usize) -> bool {
    slots
        .iter()
        .filter(|s| s.shell == shell && s.kind == ParticleKind::Secondary)
        .all(|s| s.entries > 0)
}

/// Check whether `slots[target]` may be filled now
pub fn check(slots: &[Slot], target: usize) -> Result<(), RuleViolation> {
    let Some(slot) = slots.get(target) else {
        return Ok(());
    };
    let innermost = slots.iter().map(|s| s.shell).min().unwrap_or(0);

    match slot.kind {
        // The innermost Primary group has no prerequisite
        ParticleKind::Primary if slot.shell == innermost => Ok(()),
        ParticleKind::Primary => {
            // Previous shell = nearest smaller shell present in this level
            let previous = slots
                .iter()
                .map(|s| s.shell)
                .filter(|&shell| shell < slot.shell)
                .max()
                .unwrap_or(innermost);
            if primaries_filled(slots, previous) {
                Ok(())
            } else {
                Err(RuleViolation::PreviousShellIncomplete { shell: previous })
            }
        }
        ParticleKind::Secondary => {
            if !primaries_filled(slots, slot.shell) {
                return Err(RuleViolation::PrimaryGroupIncomplete { shell: slot.shell });
            }
            if slot.entries > 0 && !secondaries_spread(slots, slot.shell) {
                return Err(RuleViolation::SpreadBeforePack { shell: slot.shell });
            }
            Ok(())
        }
    }
}

/// Shorthand for [`check`] succeeding
pub fn allows(slots: &[Slot], target: usize) -> bool {
    check(slots, target).is_ok()
}
