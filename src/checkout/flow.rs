//! Checkout flow
//!
//! Tracks the current step and which steps have been completed. A step can be visited
//! when it is the current step, comes before it, or has been completed; there is no way
//! to jump forward past a step that has not been completed. Review is never completed
//! itself and is open once contact, shipping and payment all are.

use smallvec::SmallVec;

use crate::checkout::{StepError, steps::CheckoutStep};

/// Position in the checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutFlow {
    current: CheckoutStep,
    completed: SmallVec<[CheckoutStep; 4]>,
}

impl Default for CheckoutFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutFlow {
    /// Start at the contact step with nothing completed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: CheckoutStep::Contact,
            completed: SmallVec::new(),
        }
    }

    /// The step being shown.
    pub fn current_step(&self) -> CheckoutStep {
        self.current
    }

    /// Completed steps, in completion order.
    pub fn completed_steps(&self) -> &[CheckoutStep] {
        &self.completed
    }

    /// Whether `step` has been completed at least once.
    pub fn is_completed(&self, step: CheckoutStep) -> bool {
        self.completed.contains(&step)
    }

    /// Whether the customer may move to `step`.
    pub fn can_go_to(&self, step: CheckoutStep) -> bool {
        if step == CheckoutStep::Review {
            return self.prerequisites_completed();
        }

        step <= self.current || self.is_completed(step)
    }

    /// Move to `step`.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::NotReachable`] when `step` is ahead of the current step and
    /// has not been completed.
    pub fn go_to(&mut self, step: CheckoutStep) -> Result<(), StepError> {
        if !self.can_go_to(step) {
            return Err(StepError::NotReachable {
                from: self.current,
                to: step,
            });
        }

        self.current = step;

        Ok(())
    }

    /// Move to the previous step, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::AtFirstStep`] on the contact step.
    pub fn go_back(&mut self) -> Result<CheckoutStep, StepError> {
        let previous = self.current.previous().ok_or(StepError::AtFirstStep)?;

        self.current = previous;

        Ok(previous)
    }

    /// Number of completed steps.
    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    /// Progress through the checkout as a whole percentage, based on the current step.
    pub fn progress(&self) -> u8 {
        let steps = CheckoutStep::ALL.len();
        let position = usize::from(self.current.number());

        u8::try_from(position * 100 / steps).unwrap_or(100)
    }

    /// Mark `step` completed and advance to the step after it.
    ///
    /// Completing a step the customer went back to still advances from that step, so
    /// editing shipping from the review step returns to payment.
    pub(crate) fn complete(&mut self, step: CheckoutStep) -> CheckoutStep {
        if !self.is_completed(step) {
            self.completed.push(step);
        }

        self.current = step.next().unwrap_or(step);

        self.current
    }

    fn prerequisites_completed(&self) -> bool {
        [
            CheckoutStep::Contact,
            CheckoutStep::Shipping,
            CheckoutStep::Payment,
        ]
        .iter()
        .all(|step| self.is_completed(*step))
    }
}
