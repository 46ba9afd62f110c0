pub mod restart;
pub mod services;
pub mod status;

use crate::config::Settings;
use stack_orchestration::ComposeStack;

/// Build the compose backend for the configured stack
pub fn backend(settings: &Settings) -> ComposeStack {
    ComposeStack::new(settings.compose_file.clone(), settings.project.clone())
}
