//! The agent loop: conversation state, the two steps, the router and the
//! executor that alternates between them.
//!
//! ```text
//! Start -> ModelTurn -> route -> ToolTurn -> ModelTurn -> ... -> Done
//! ```

pub mod events;
pub mod executor;
pub mod model_step;
pub mod router;
pub mod state;
pub mod tool_step;

pub use events::{GraphEvent, GraphEventPayload, GraphEventSink};
pub use executor::{AgentGraph, InvokeConfig, InvokeOutcome, Phase};
pub use model_step::ModelStep;
pub use router::{route, Route};
pub use state::{ConversationState, StateDelta};
pub use tool_step::ToolStep;
