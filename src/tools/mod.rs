//! Tool system: trait, registry, argument validation and demo tools.

pub mod arguments;
pub mod builtin;
pub mod registry;
pub mod tool;
pub mod types;
pub mod validation;

pub use arguments::ToolArguments;
pub use registry::ToolRegistry;
pub use tool::{FnTool, Tool, ToolContext};
pub use types::{render_output, ToolDescriptor, ToolParameters};
pub use validation::validate_arguments;
