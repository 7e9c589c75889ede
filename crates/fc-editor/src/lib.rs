pub mod caret;
pub mod connector;
pub mod editor;
pub mod input;
pub mod interaction;
pub mod shortcuts;
pub mod tools;

pub use connector::{BindError, Trim, TrimOutcome};
pub use editor::Editor;
pub use input::{InputEvent, Key, MouseButton};
pub use tools::ToolMode;
