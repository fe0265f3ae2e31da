//! A validated search problem: register layout, catalogue, target and oracle

use crate::error::Result;
use crate::ir::RegisterLayout;
use crate::isa::Catalogue;
use crate::validation::{Oracle, Target, TrialInputs};

/// Everything the engine reads during a search. Immutable once built, so it
/// can be shared between worker threads.
#[derive(Debug, Clone)]
pub struct Problem {
    layout: RegisterLayout,
    catalogue: Catalogue,
    target: Target,
    oracle: Oracle,
}

impl Problem {
    /// Validate the configuration and compute the oracle.
    pub fn new(
        layout: RegisterLayout,
        catalogue: Catalogue,
        target: Target,
        trials: &TrialInputs,
    ) -> Result<Self> {
        catalogue.validate(&layout)?;
        let oracle = Oracle::build(&target, trials, &layout)?;
        Ok(Self {
            layout,
            catalogue,
            target,
            oracle,
        })
    }

    /// Default layout (sized for the target's arity), default catalogue and
    /// default trial inputs.
    pub fn with_defaults(target: Target) -> Result<Self> {
        let layout = RegisterLayout::default().with_num_args(target.arity())?;
        Self::new(layout, Catalogue::default(), target, &TrialInputs::default())
    }

    pub fn layout(&self) -> &RegisterLayout {
        &self.layout
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn oracle(&self) -> &Oracle {
        &self.oracle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::isa::{InstructionDescriptor, OperandFloor, Operation};

    #[test]
    fn test_with_defaults_sizes_layout() {
        let problem = Problem::with_defaults(Target::binary("and", |x, y| x & y)).unwrap();
        assert_eq!(problem.layout().num_args(), 2);
        assert_eq!(problem.oracle().num_args(), 2);
        assert_eq!(
            problem.oracle().len(),
            TrialInputs::default().x.len() * TrialInputs::default().y.len()
        );
    }

    #[test]
    fn test_bad_catalogue_is_rejected_before_oracle() {
        let catalogue = Catalogue::new(vec![InstructionDescriptor::new(
            Operation::Sub,
            vec![OperandFloor::Absolute(2)],
        )]);
        // The target is undefined everywhere; the catalogue error must win
        let target = Target::partial("never", 1, |_| None);
        let err = Problem::new(
            RegisterLayout::default(),
            catalogue,
            target,
            &TrialInputs::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::FloorCountMismatch { .. }));
    }
}
