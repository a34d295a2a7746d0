use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use vidspark_core::{
    Action, BackendError, DisplayTier, EntitlementStatus, GenerateReply, GenerationRequest,
    IdeaBackend, IdeaForm, Notice, Outcome, Section, Session,
};

/// Backend that replays canned generate replies and records what it was sent.
#[derive(Default)]
struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<GenerateReply, BackendError>>>,
    sent: Mutex<Vec<GenerationRequest>>,
    status: Option<EntitlementStatus>,
    subscribe_ok: bool,
}

impl ScriptedBackend {
    fn with_replies(replies: Vec<Result<GenerateReply, BackendError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Self::default()
        }
    }

    fn sent(&self) -> Vec<GenerationRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdeaBackend for ScriptedBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerateReply, BackendError> {
        self.sent.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(BackendError::UnexpectedBody(String::new())))
    }

    async fn status(&self) -> Result<EntitlementStatus, BackendError> {
        self.status.ok_or(BackendError::Unauthenticated)
    }

    async fn subscribe(&self) -> Result<(), BackendError> {
        if self.subscribe_ok {
            Ok(())
        } else {
            Err(BackendError::Server {
                status: 500,
                body: "boom".to_string(),
            })
        }
    }
}

fn idea(text: &str) -> Result<GenerateReply, BackendError> {
    Ok(GenerateReply::Idea {
        idea: text.to_string(),
    })
}

fn form() -> IdeaForm {
    IdeaForm {
        business_type: "small chops".to_string(),
        ..IdeaForm::default()
    }
}

const FIRST: &str = "THE BIG IDEA\nMake a reel\nSTEP-BY-STEP PLAN\n1. Shoot b-roll\n2. Add captions\nPRO TIP\nPost vertically\nCAPTION\nCheck this out!\nHASHTAGS\n#reels #smallbiz\nBEST TIME TO POST\n6pm weekdays";
const SECOND: &str = "THE BIG IDEA\nMake a funnier reel\nSTEP-BY-STEP\n1. Add a blooper";

#[tokio::test]
async fn generate_then_refine_carries_latest_idea() {
    let backend = ScriptedBackend::with_replies(vec![idea(FIRST), idea(SECOND)]);
    let mut session = Session::new();

    let outcome = session.generate(&backend, &form()).await;
    let Outcome::Idea(parsed) = outcome else {
        panic!("expected idea");
    };
    assert_eq!(parsed.big_idea, "Make a reel");
    assert_eq!(parsed.steps, vec!["Shoot b-roll", "Add captions"]);
    assert_eq!(parsed.best_time.as_deref(), Some("6pm weekdays"));
    assert_eq!(session.blocks().len(), 6);

    let outcome = session.refine(&backend, &form(), "make it funnier").await;
    assert!(matches!(outcome, Outcome::Idea(ref p) if p.big_idea == "Make a funnier reel"));
    assert_eq!(session.raw_idea(), Some(SECOND));

    let sent = backend.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent[0].refinement().is_none());
    let refinement = sent[1].refinement().unwrap();
    assert_eq!(refinement.instruction, "make it funnier");
    assert_eq!(refinement.previous_idea, FIRST);
}

#[tokio::test]
async fn refine_before_generate_sends_nothing() {
    let backend = ScriptedBackend::default();
    let mut session = Session::new();

    let outcome = session.refine(&backend, &form(), "shorter please").await;
    assert_eq!(outcome, Outcome::Notice(Notice::NoActiveIdea));
    assert_eq!(session.refine(&backend, &form(), "  ").await, Outcome::Ignored);
    assert!(backend.sent().is_empty());
}

#[tokio::test]
async fn limit_reached_drives_upsell_path() {
    let backend = ScriptedBackend::with_replies(vec![Ok(GenerateReply::Error {
        error: "LIMIT_REACHED".to_string(),
        message: Some("Free trial expired. Please upgrade.".to_string()),
    })]);
    let mut session = Session::new();

    let outcome = session.generate(&backend, &form()).await;
    assert_eq!(outcome, Outcome::Notice(Notice::LimitReached));
    assert_eq!(session.tier(), DisplayTier::TrialExpired);
    assert!(!session.is_busy(Action::Generate));
    assert!(session.current_idea().is_none());
}

#[tokio::test]
async fn failed_refine_keeps_previous_idea_for_next_attempt() {
    let backend = ScriptedBackend::with_replies(vec![
        idea(FIRST),
        Err(BackendError::UnexpectedBody("<html>".to_string())),
        idea(SECOND),
    ]);
    let mut session = Session::new();

    session.generate(&backend, &form()).await;
    let failed = session.refine(&backend, &form(), "again").await;
    assert!(matches!(
        failed,
        Outcome::Notice(Notice::Failed {
            action: Action::Refine,
            ..
        })
    ));
    session.refine(&backend, &form(), "again").await;

    let sent = backend.sent();
    assert_eq!(sent[1].refinement().unwrap().previous_idea, FIRST);
    assert_eq!(sent[2].refinement().unwrap().previous_idea, FIRST);
}

#[tokio::test]
async fn unstructured_reply_falls_back_to_raw() {
    let backend = ScriptedBackend::with_replies(vec![idea(
        "A fun video showcasing your shop. (Backup: AI service temporarily unavailable)",
    )]);
    let mut session = Session::new();

    let Outcome::Idea(parsed) = session.generate(&backend, &form()).await else {
        panic!("expected idea");
    };
    assert!(parsed.fell_back_to_raw);
    assert_eq!(session.blocks().len(), 1);
    assert_eq!(session.blocks()[0].section, Section::BigIdea);
}

#[tokio::test]
async fn status_then_subscribe() {
    let backend = ScriptedBackend {
        status: Some(EntitlementStatus {
            subscribed: false,
            trial_used: true,
        }),
        subscribe_ok: true,
        ..ScriptedBackend::default()
    };
    let mut session = Session::new();

    assert_eq!(
        session.refresh_status(&backend).await,
        DisplayTier::TrialExpired
    );
    assert_eq!(
        session.subscribe(&backend).await,
        Outcome::Notice(Notice::Subscribed)
    );
    assert_eq!(session.tier(), DisplayTier::Premium);
}

#[tokio::test]
async fn status_failure_defaults_to_free_trial() {
    let backend = ScriptedBackend::default();
    let mut session = Session::new();
    assert_eq!(
        session.refresh_status(&backend).await,
        DisplayTier::FreeTrialAvailable
    );
    assert!(matches!(
        session.subscribe(&backend).await,
        Outcome::Notice(Notice::Failed {
            action: Action::Subscribe,
            ..
        })
    ));
}
