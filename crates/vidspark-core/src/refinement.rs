//! Conversational context for refining the current idea.

use tracing::debug;

use crate::error::RefinementError;
use crate::request::{GenerationRequest, IdeaForm, Refinement};

/// Holds the single current idea document of a session.
///
/// Empty until the first successful generation; afterwards every successful
/// generate or refine response replaces it whole.
#[derive(Debug, Clone, Default)]
pub struct RefinementContext {
    current: Option<String>,
}

impl RefinementContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the held idea with `raw`.
    pub fn record_idea(&mut self, raw: &str) {
        debug!(len = raw.len(), replaced = self.current.is_some(), "recording current idea");
        self.current = Some(raw.to_string());
    }

    pub fn current_idea(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Build a refine request against the held idea.
    ///
    /// A blank instruction is rejected before the held state is looked at.
    /// The held idea is left untouched; only a later [`record_idea`] with the
    /// refinement's response replaces it.
    ///
    /// [`record_idea`]: RefinementContext::record_idea
    pub fn request_refinement(
        &self,
        form: &IdeaForm,
        instruction: &str,
    ) -> Result<GenerationRequest, RefinementError> {
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return Err(RefinementError::EmptyInstruction);
        }
        let previous_idea = self.current.as_ref().ok_or(RefinementError::NoActiveIdea)?;

        // The form is sent as it stands; the held idea is the context that matters.
        let request = GenerationRequest::from_form(form);

        Ok(request.with_refinement(Refinement {
            instruction: instruction.to_string(),
            previous_idea: previous_idea.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> IdeaForm {
        IdeaForm {
            business_type: "barber shop".to_string(),
            ..IdeaForm::default()
        }
    }

    #[test]
    fn test_refine_before_any_idea_fails() {
        let context = RefinementContext::new();
        for instruction in ["make it shorter", "x", "add a dance"] {
            assert_eq!(
                context.request_refinement(&form(), instruction),
                Err(RefinementError::NoActiveIdea)
            );
        }
    }

    #[test]
    fn test_blank_instruction_checked_first() {
        let mut context = RefinementContext::new();
        assert_eq!(
            context.request_refinement(&form(), "   \t"),
            Err(RefinementError::EmptyInstruction)
        );
        context.record_idea("THE BIG IDEA\nFresh fade");
        assert_eq!(
            context.request_refinement(&form(), ""),
            Err(RefinementError::EmptyInstruction)
        );
    }

    #[test]
    fn test_refine_carries_held_idea_without_clearing_it() {
        let mut context = RefinementContext::new();
        context.record_idea("THE BIG IDEA\nFresh fade");

        let request = context
            .request_refinement(&form(), "  make it funnier ")
            .unwrap();
        let refinement = request.refinement().unwrap();
        assert_eq!(refinement.instruction, "make it funnier");
        assert_eq!(refinement.previous_idea, "THE BIG IDEA\nFresh fade");
        assert_eq!(request.business_type, "barber shop");
        assert_eq!(context.current_idea(), Some("THE BIG IDEA\nFresh fade"));
    }

    #[test]
    fn test_refine_uses_most_recent_idea() {
        let mut context = RefinementContext::new();
        context.record_idea("first");
        context.record_idea("second");

        let first = context.request_refinement(&form(), "a").unwrap();
        let second = context.request_refinement(&form(), "b").unwrap();
        assert_eq!(first.refinement().unwrap().previous_idea, "second");
        assert_eq!(second.refinement().unwrap().previous_idea, "second");
    }
}
