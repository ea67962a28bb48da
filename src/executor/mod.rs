mod executor;
mod default_executor;
mod redirect;
mod session;

pub use executor::{ChildError, ExecError, ExecStatus, Executor};
pub use default_executor::DefaultExecutor;
pub use session::ForegroundSession;
