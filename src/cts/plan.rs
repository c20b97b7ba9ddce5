use anyhow::{Result, bail};

use crate::cts::scheme::{DepthMode, PathStep, SchemeDescriptor, SchemeId};

/// A validated descent plan. The scheme table already stores steps in compiled
/// form, so compiling only checks that the plan is walkable.
#[derive(Debug, Clone, Copy)]
pub struct DescentPlan {
    descriptor: &'static SchemeDescriptor,
}

impl DescentPlan {
    pub fn compile(descriptor: &'static SchemeDescriptor) -> Result<Self> {
        validate_steps(descriptor.steps)?;
        Ok(Self { descriptor })
    }

    pub fn scheme(&self) -> SchemeId {
        self.descriptor.id
    }

    pub fn descriptor(&self) -> &'static SchemeDescriptor {
        self.descriptor
    }

    pub fn steps(&self) -> &'static [PathStep] {
        self.descriptor.steps
    }

    /// Number of dot-separated components in every identifier this plan yields.
    pub fn capture_count(&self) -> usize {
        self.steps()
            .iter()
            .filter(|step| step.captures_number)
            .count()
    }

    /// Renders the plan relative to `body`, e.g. `div/div[@n]//l[@n]`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (index, step) in self.steps().iter().enumerate() {
            match step.depth_mode {
                DepthMode::Child if index > 0 => out.push('/'),
                DepthMode::Child => {}
                DepthMode::ArbitraryDescendant => out.push_str("//"),
            }
            out.push_str(step.element_name);
            if step.captures_number {
                out.push_str("[@n]");
            }
        }
        out
    }
}

pub fn validate_steps(steps: &[PathStep]) -> Result<()> {
    let Some((last, leading)) = steps.split_last() else {
        bail!("descent plan has no steps");
    };

    if !last.is_terminal {
        bail!("final step <{}> is not terminal", last.element_name);
    }

    for step in leading {
        if step.is_terminal {
            bail!("terminal step <{}> is followed by further steps", step.element_name);
        }
        if step.depth_mode == DepthMode::ArbitraryDescendant {
            bail!(
                "arbitrary-depth step <{}> must be the content terminal",
                step.element_name
            );
        }
    }

    if let Some(step) = steps.iter().find(|step| step.element_name.trim().is_empty()) {
        bail!("step with empty element name ({:?})", step.depth_mode);
    }

    if !steps.iter().any(|step| step.captures_number) {
        bail!("descent plan captures no numbering attribute");
    }

    Ok(())
}
