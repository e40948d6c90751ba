//! Task executor extension point.

use std::fmt::Debug;

use async_trait::async_trait;
use ig_model::{Attributes, TaskDefinition, TaskResult};

use crate::context::TaskContext;
use crate::error::SpiResult;

/// Runs the work described by a [`TaskDefinition`].
///
/// Executors report progress by adding messages and attributes to the
/// [`TaskResult`] they are given. Returning an error records it on the
/// result; the run still completes.
#[async_trait]
pub trait TaskExecutor: Send + Sync + Debug {
    /// Runs the task.
    ///
    /// `args` are the definition's arguments merged with any launch-time
    /// overrides.
    ///
    /// ## Errors
    ///
    /// Returns an error if the task cannot finish.
    async fn execute(
        &self,
        ctx: &TaskContext,
        definition: &TaskDefinition,
        args: &Attributes,
        result: &mut TaskResult,
    ) -> SpiResult<()>;

    /// Asks a running task to stop. Returns whether the executor supports
    /// termination.
    fn terminate(&self) -> bool {
        false
    }
}
