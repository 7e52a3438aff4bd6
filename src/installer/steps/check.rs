//! Step 0: environment verification.
//!
//! Carries no form fields and derives no parameters; the render directive
//! surfaces the requirement and optional-setting probes so the operator can
//! fix the environment before continuing.

use super::{InstallStep, StepKind};

pub(super) fn step(index: usize) -> InstallStep {
    InstallStep {
        index,
        key: "check",
        title: "Environment Check",
        template: "install/check.html",
        kind: StepKind::Check,
        fields: Vec::new(),
    }
}
