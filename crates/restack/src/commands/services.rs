use crate::commands;
use crate::config::Settings;
use anyhow::Result;
use stack_orchestration::StackBackend;

pub async fn run(settings: &Settings) -> Result<()> {
    let backend = commands::backend(settings);
    let catalog = backend.list_services().await?;

    for service in catalog {
        println!("{service}");
    }
    Ok(())
}
