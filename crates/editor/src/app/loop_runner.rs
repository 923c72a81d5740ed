use std::process::ExitCode;

use engine::run_app;
use tracing::error;

use super::bootstrap::EditorWiring;

pub(crate) fn run(app: EditorWiring) -> ExitCode {
    if let Err(err) = run_app(app.config, app.images, app.scene) {
        error!(error = %err, "event_loop_failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
