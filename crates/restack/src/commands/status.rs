use crate::commands;
use crate::config::Settings;
use anyhow::Result;
use comfy_table::{Cell, Color, Table};
use stack_orchestration::{Health, ServiceState, StackBackend};
use std::collections::BTreeMap;

pub async fn run(settings: &Settings, format: &str) -> Result<()> {
    if format != "table" && format != "json" {
        anyhow::bail!("Invalid format: {}. Must be 'table' or 'json'", format);
    }

    let backend = commands::backend(settings);
    let catalog = backend.list_services().await?;

    let mut states: BTreeMap<String, ServiceState> = BTreeMap::new();
    for service in &catalog {
        let state = backend.service_state(service).await?;
        states.insert(service.clone(), state);
    }

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&states)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["SERVICE", "STATE", "HEALTH"]);

    // Display in catalog order, not alphabetical.
    for service in &catalog {
        let state = states[service];

        let (state_str, state_color) = if state.running {
            ("running", Color::Green)
        } else {
            ("stopped", Color::DarkGrey)
        };

        let (health_str, health_color) = match state.health {
            Some(Health::Healthy) => ("healthy", Color::Green),
            Some(Health::Unhealthy) => ("unhealthy", Color::Red),
            Some(Health::Starting) => ("starting", Color::Yellow),
            None => ("-", Color::DarkGrey),
        };

        table.add_row(vec![
            Cell::new(service),
            Cell::new(state_str).fg(state_color),
            Cell::new(health_str).fg(health_color),
        ]);
    }

    println!("{table}");
    Ok(())
}
