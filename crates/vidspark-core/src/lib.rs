pub mod backend;
pub mod config;
pub mod entitlement;
pub mod error;
pub mod refinement;
pub mod render;
pub mod request;
pub mod sections;
pub mod session;

// Re-export main types for convenience
pub use backend::{GenerateReply, HttpBackend, IdeaBackend, LIMIT_REACHED};
pub use config::{Config, Theme};
pub use entitlement::{reduce, DisplayTier, EntitlementState, EntitlementStatus};
pub use error::{BackendError, ConfigError, FormError, RefinementError};
pub use refinement::RefinementContext;
pub use render::{render, to_plain_text, BlockBody, DisplayBlock};
pub use request::{GenerationRequest, IdeaForm, Language, Platform};
pub use sections::{parse, ParsedIdea, Section};
pub use session::{Action, Notice, Outcome, RequestState, Session};
