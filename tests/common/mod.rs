#![allow(dead_code)]

pub use lazydag_test_utils::builders;
pub use lazydag_test_utils::faulty_executor::{Fault, FaultyExecutor};
pub use lazydag_test_utils::recording_executor::{batch_of, RecordingExecutor};
pub use lazydag_test_utils::{init_tracing, with_timeout};

use lazydag::exec::InlineExecutor;
use lazydag::session::Session;

/// Session over the synchronous executor, with batch recording.
pub fn recorded_inline_session() -> (
    Session<i64, RecordingExecutor<InlineExecutor>>,
    lazydag_test_utils::recording_executor::BatchLog,
) {
    let executor = RecordingExecutor::new(InlineExecutor);
    let log = executor.log();
    (Session::new(executor), log)
}
