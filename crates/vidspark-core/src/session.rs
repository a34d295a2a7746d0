//! Request orchestration for one client session.
//!
//! Each user action goes `Idle -> Submitting -> Idle`. The `begin_*` methods
//! validate and build the request and mark the action as submitting; the
//! `complete_*` methods take the backend's result, update the session state and
//! tell the UI what to show. The split lets a UI run the request on a task of
//! its own, while [`Session::generate`] and friends drive a backend directly.

use tracing::{info, warn};

use crate::backend::{GenerateReply, IdeaBackend};
use crate::entitlement::{DisplayTier, EntitlementState, EntitlementStatus};
use crate::error::{BackendError, FormError, RefinementError};
use crate::refinement::RefinementContext;
use crate::render::{render, DisplayBlock};
use crate::request::{GenerationRequest, IdeaForm};
use crate::sections::{parse, ParsedIdea};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Generate,
    Refine,
    Subscribe,
}

impl Action {
    pub fn busy_label(&self) -> &'static str {
        match self {
            Action::Generate => "Generating Your Strategy",
            Action::Refine => "Refining Your Strategy",
            Action::Subscribe => "Activating Premium",
        }
    }

    /// Shown when the request failed without a usable error from the backend.
    fn failure_message(&self) -> &'static str {
        match self {
            Action::Generate => "Something went wrong generating content.",
            Action::Refine => "Error refining content.",
            Action::Subscribe => "Subscription failed. Please try again.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Submitting,
}

/// Something the UI should tell the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    MissingBusinessType,
    NoActiveIdea,
    /// Free allowance used up; offer the upgrade path.
    LimitReached,
    Failed { action: Action, message: String },
    Subscribed,
    Busy(Action),
}

impl Notice {
    pub fn title(&self) -> &'static str {
        match self {
            Notice::MissingBusinessType => "Missing Info",
            Notice::NoActiveIdea => "No Idea Yet",
            Notice::LimitReached => "Free Limit Reached",
            Notice::Failed { .. } => "Error",
            Notice::Subscribed => "Welcome to Premium",
            Notice::Busy(_) => "Please Wait",
        }
    }

    pub fn text(&self) -> String {
        match self {
            Notice::MissingBusinessType => "Please tell us about your business first!".to_string(),
            Notice::NoActiveIdea => "Generate an idea first before refining!".to_string(),
            Notice::LimitReached => "Upgrade to Premium for unlimited generations!".to_string(),
            Notice::Failed { message, .. } => message.clone(),
            Notice::Subscribed => "Subscription active! You have unlimited access.".to_string(),
            Notice::Busy(_) => "Please wait for the current request to finish.".to_string(),
        }
    }

    pub fn is_upsell(&self) -> bool {
        matches!(self, Notice::LimitReached)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Idea(ParsedIdea),
    Notice(Notice),
    /// Nothing to do, e.g. a blank refinement instruction.
    Ignored,
}

/// All client state of one session.
#[derive(Debug, Default)]
pub struct Session {
    refinement: RefinementContext,
    entitlement: EntitlementState,
    generate: RequestState,
    refine: RequestState,
    subscribe: RequestState,
    current: Option<ParsedIdea>,
    blocks: Vec<DisplayBlock>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, action: Action) -> RequestState {
        match action {
            Action::Generate => self.generate,
            Action::Refine => self.refine,
            Action::Subscribe => self.subscribe,
        }
    }

    fn state_mut(&mut self, action: Action) -> &mut RequestState {
        match action {
            Action::Generate => &mut self.generate,
            Action::Refine => &mut self.refine,
            Action::Subscribe => &mut self.subscribe,
        }
    }

    pub fn is_busy(&self, action: Action) -> bool {
        self.state(action) == RequestState::Submitting
    }

    /// The first action currently submitting, for the busy overlay.
    pub fn busy_action(&self) -> Option<Action> {
        [Action::Generate, Action::Refine, Action::Subscribe]
            .into_iter()
            .find(|a| self.is_busy(*a))
    }

    pub fn tier(&self) -> DisplayTier {
        self.entitlement.tier()
    }

    pub fn current_idea(&self) -> Option<&ParsedIdea> {
        self.current.as_ref()
    }

    pub fn raw_idea(&self) -> Option<&str> {
        self.refinement.current_idea()
    }

    pub fn blocks(&self) -> &[DisplayBlock] {
        &self.blocks
    }

    fn submit(&mut self, action: Action) -> Result<(), Notice> {
        if self.is_busy(action) {
            return Err(Notice::Busy(action));
        }
        *self.state_mut(action) = RequestState::Submitting;
        Ok(())
    }

    pub fn begin_generate(&mut self, form: &IdeaForm) -> Result<GenerationRequest, Notice> {
        if self.is_busy(Action::Generate) {
            return Err(Notice::Busy(Action::Generate));
        }
        let request = GenerationRequest::generate(form).map_err(|e| match e {
            FormError::MissingBusinessType => Notice::MissingBusinessType,
        })?;
        self.submit(Action::Generate)?;
        Ok(request)
    }

    /// `Ok(None)` means the instruction was blank and nothing is sent.
    pub fn begin_refine(
        &mut self,
        form: &IdeaForm,
        instruction: &str,
    ) -> Result<Option<GenerationRequest>, Notice> {
        if self.is_busy(Action::Refine) {
            return Err(Notice::Busy(Action::Refine));
        }
        let request = match self.refinement.request_refinement(form, instruction) {
            Ok(request) => request,
            Err(RefinementError::EmptyInstruction) => return Ok(None),
            Err(RefinementError::NoActiveIdea) => return Err(Notice::NoActiveIdea),
        };
        self.submit(Action::Refine)?;
        Ok(Some(request))
    }

    pub fn begin_subscribe(&mut self) -> Result<(), Notice> {
        self.submit(Action::Subscribe)
    }

    /// Apply the result of a generate or refine call.
    pub fn complete_generation(
        &mut self,
        action: Action,
        result: Result<GenerateReply, BackendError>,
    ) -> Outcome {
        *self.state_mut(action) = RequestState::Idle;

        match result {
            Ok(GenerateReply::Idea { idea }) => {
                let parsed = parse(&idea);
                info!(
                    ?action,
                    steps = parsed.steps.len(),
                    fell_back = parsed.fell_back_to_raw,
                    "idea received"
                );
                self.refinement.record_idea(&idea);
                self.blocks = render(&parsed);
                self.current = Some(parsed.clone());
                Outcome::Idea(parsed)
            }
            Ok(reply) if reply.is_limit_reached() => {
                self.entitlement.apply_limit_reached();
                Outcome::Notice(Notice::LimitReached)
            }
            Ok(GenerateReply::Error { error, .. }) => Outcome::Notice(Notice::Failed {
                action,
                message: error,
            }),
            Err(e) => {
                warn!(?action, error = %e, "request failed");
                Outcome::Notice(Notice::Failed {
                    action,
                    message: action.failure_message().to_string(),
                })
            }
        }
    }

    pub fn complete_subscribe(&mut self, result: Result<(), BackendError>) -> Outcome {
        self.subscribe = RequestState::Idle;
        match result {
            Ok(()) => {
                self.entitlement.apply_subscription();
                Outcome::Notice(Notice::Subscribed)
            }
            Err(e) => {
                warn!(error = %e, "subscribe failed");
                Outcome::Notice(Notice::Failed {
                    action: Action::Subscribe,
                    message: Action::Subscribe.failure_message().to_string(),
                })
            }
        }
    }

    pub fn apply_status(&mut self, result: Result<EntitlementStatus, BackendError>) -> DisplayTier {
        match result {
            Ok(status) => self.entitlement.apply_status(&status),
            Err(e) => {
                warn!(error = %e, "status fetch failed, keeping current tier");
                self.entitlement.apply_status_failure()
            }
        }
    }

    pub async fn generate<B: IdeaBackend + ?Sized>(
        &mut self,
        backend: &B,
        form: &IdeaForm,
    ) -> Outcome {
        match self.begin_generate(form) {
            Ok(request) => {
                let result = backend.generate(&request).await;
                self.complete_generation(Action::Generate, result)
            }
            Err(notice) => Outcome::Notice(notice),
        }
    }

    pub async fn refine<B: IdeaBackend + ?Sized>(
        &mut self,
        backend: &B,
        form: &IdeaForm,
        instruction: &str,
    ) -> Outcome {
        match self.begin_refine(form, instruction) {
            Ok(Some(request)) => {
                let result = backend.generate(&request).await;
                self.complete_generation(Action::Refine, result)
            }
            Ok(None) => Outcome::Ignored,
            Err(notice) => Outcome::Notice(notice),
        }
    }

    pub async fn subscribe<B: IdeaBackend + ?Sized>(&mut self, backend: &B) -> Outcome {
        match self.begin_subscribe() {
            Ok(()) => {
                let result = backend.subscribe().await;
                self.complete_subscribe(result)
            }
            Err(notice) => Outcome::Notice(notice),
        }
    }

    pub async fn refresh_status<B: IdeaBackend + ?Sized>(&mut self, backend: &B) -> DisplayTier {
        let result = backend.status().await;
        self.apply_status(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> IdeaForm {
        IdeaForm {
            business_type: "tailor".to_string(),
            ..IdeaForm::default()
        }
    }

    fn idea(text: &str) -> Result<GenerateReply, BackendError> {
        Ok(GenerateReply::Idea {
            idea: text.to_string(),
        })
    }

    #[test]
    fn test_generate_marks_submitting_until_complete() {
        let mut session = Session::new();
        session.begin_generate(&form()).unwrap();
        assert_eq!(session.state(Action::Generate), RequestState::Submitting);
        assert_eq!(session.busy_action(), Some(Action::Generate));
        assert_eq!(
            session.begin_generate(&form()),
            Err(Notice::Busy(Action::Generate))
        );

        session.complete_generation(Action::Generate, idea("THE BIG IDEA\nA"));
        assert_eq!(session.state(Action::Generate), RequestState::Idle);
        assert_eq!(session.busy_action(), None);
    }

    #[test]
    fn test_missing_business_type_stays_idle() {
        let mut session = Session::new();
        let notice = session.begin_generate(&IdeaForm::default()).unwrap_err();
        assert_eq!(notice, Notice::MissingBusinessType);
        assert!(!session.is_busy(Action::Generate));
    }

    #[test]
    fn test_success_records_parses_and_renders() {
        let mut session = Session::new();
        session.begin_generate(&form()).unwrap();
        let outcome = session.complete_generation(
            Action::Generate,
            idea("THE BIG IDEA\nHem live\nCAPTION\nSew cool"),
        );

        let parsed = match outcome {
            Outcome::Idea(parsed) => parsed,
            other => panic!("expected an idea, got {other:?}"),
        };
        assert_eq!(parsed.big_idea, "Hem live");
        assert_eq!(session.current_idea(), Some(&parsed));
        assert_eq!(
            session.raw_idea(),
            Some("THE BIG IDEA\nHem live\nCAPTION\nSew cool")
        );
        assert_eq!(session.blocks().len(), 2);
    }

    #[test]
    fn test_limit_reached_is_upsell() {
        let mut session = Session::new();
        session.begin_generate(&form()).unwrap();
        let outcome = session.complete_generation(
            Action::Generate,
            Ok(GenerateReply::Error {
                error: "LIMIT_REACHED".to_string(),
                message: Some("Free trial expired.".to_string()),
            }),
        );
        assert_eq!(outcome, Outcome::Notice(Notice::LimitReached));
        assert!(Notice::LimitReached.is_upsell());
        assert_eq!(session.tier(), DisplayTier::TrialExpired);
        assert!(!session.is_busy(Action::Generate));
    }

    #[test]
    fn test_backend_error_surfaced_verbatim() {
        let mut session = Session::new();
        session.begin_generate(&form()).unwrap();
        let outcome = session.complete_generation(
            Action::Generate,
            Ok(GenerateReply::Error {
                error: "Server Error".to_string(),
                message: None,
            }),
        );
        assert_eq!(
            outcome,
            Outcome::Notice(Notice::Failed {
                action: Action::Generate,
                message: "Server Error".to_string(),
            })
        );
    }

    #[test]
    fn test_transport_failure_is_generic_and_keeps_idea() {
        let mut session = Session::new();
        session.begin_generate(&form()).unwrap();
        session.complete_generation(Action::Generate, idea("THE BIG IDEA\nA"));

        session.begin_refine(&form(), "shorter").unwrap();
        let outcome = session.complete_generation(
            Action::Refine,
            Err(BackendError::UnexpectedBody("<html>".to_string())),
        );
        assert_eq!(
            outcome,
            Outcome::Notice(Notice::Failed {
                action: Action::Refine,
                message: "Error refining content.".to_string(),
            })
        );
        assert_eq!(session.raw_idea(), Some("THE BIG IDEA\nA"));
        assert!(!session.is_busy(Action::Refine));
    }

    #[test]
    fn test_refine_gating() {
        let mut session = Session::new();
        assert_eq!(session.begin_refine(&form(), "  "), Ok(None));
        assert_eq!(
            session.begin_refine(&form(), "funnier"),
            Err(Notice::NoActiveIdea)
        );
        assert!(!session.is_busy(Action::Refine));
    }

    #[test]
    fn test_subscribe_is_optimistic_premium() {
        let mut session = Session::new();
        session.apply_status(Ok(EntitlementStatus {
            subscribed: false,
            trial_used: true,
        }));
        assert_eq!(session.tier(), DisplayTier::TrialExpired);

        session.begin_subscribe().unwrap();
        assert_eq!(session.begin_subscribe(), Err(Notice::Busy(Action::Subscribe)));
        let outcome = session.complete_subscribe(Ok(()));
        assert_eq!(outcome, Outcome::Notice(Notice::Subscribed));
        assert_eq!(session.tier(), DisplayTier::Premium);
    }

    #[test]
    fn test_failed_subscribe_keeps_tier() {
        let mut session = Session::new();
        session.begin_subscribe().unwrap();
        let outcome = session.complete_subscribe(Err(BackendError::Unauthenticated));
        assert!(matches!(
            outcome,
            Outcome::Notice(Notice::Failed {
                action: Action::Subscribe,
                ..
            })
        ));
        assert_eq!(session.tier(), DisplayTier::FreeTrialAvailable);
    }

    #[test]
    fn test_status_failure_keeps_tier() {
        let mut session = Session::new();
        session.apply_status(Ok(EntitlementStatus {
            subscribed: true,
            trial_used: false,
        }));
        let tier = session.apply_status(Err(BackendError::Unauthenticated));
        assert_eq!(tier, DisplayTier::Premium);
    }
}
