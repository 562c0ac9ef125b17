mod invoke;

pub use invoke::{handle_invocation, invoke_router};
