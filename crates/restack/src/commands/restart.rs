use crate::commands;
use crate::config::Settings;
use anyhow::{Context, Result};
use clap::Args;
use command_runner::LocalRunner;
use stack_orchestration::{
    CancelToken, ExecutionMode, FilterSpec, RestartModifiers, RestartStrategy, WaitOptions,
    check_required_mount, execute_strategy, select_targets, wait_ready,
};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Args)]
pub struct RestartArgs {
    /// Services to restart (empty means all declared services)
    pub services: Vec<String>,

    /// Services to leave untouched; wins over the positional list
    #[arg(short = 'x', long = "exclude", value_name = "SERVICE")]
    pub exclude: Vec<String>,

    /// Only restart services that currently have a running container
    #[arg(long)]
    pub running_only: bool,

    /// Stop the entire stack and start it again instead of a rolling recreate
    #[arg(long)]
    pub full: bool,

    /// Replace containers even if their configuration is unchanged
    #[arg(long)]
    pub force_recreate: bool,

    /// Pull the targets' images before restarting
    #[arg(long)]
    pub pull: bool,

    /// Storage mount that must be present before anything is touched
    #[arg(long, value_name = "PATH")]
    pub mount: Option<PathBuf>,

    /// Skip the required-mount check for this run
    #[arg(long)]
    pub skip_mount_check: bool,

    /// Seconds to wait for services to become ready
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Seconds between readiness polls
    #[arg(long, value_name = "SECS")]
    pub poll_interval: Option<u64>,

    /// Do not wait for services to become ready
    #[arg(long)]
    pub no_wait: bool,

    /// Show what would be done without touching the stack
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn run(settings: &Settings, args: RestartArgs) -> Result<()> {
    let runner = LocalRunner::new("restack");

    // Precondition first: never touch the stack with the data mount absent.
    let mount = if args.skip_mount_check {
        None
    } else {
        args.mount.clone().or_else(|| settings.required_mount.clone())
    };
    check_required_mount(mount.as_deref(), &runner)
        .await
        .context("precondition check failed")?;

    let backend = commands::backend(settings);

    let spec = FilterSpec {
        include: args.services.iter().cloned().collect(),
        exclude: args.exclude.iter().cloned().collect(),
        running_only: args.running_only,
    };
    let targets = select_targets(&backend, &spec).await?;

    let strategy = if args.full {
        RestartStrategy::Full
    } else {
        RestartStrategy::Rolling
    };
    let modifiers = RestartModifiers {
        force_recreate: args.force_recreate,
        refresh_images: args.pull,
    };
    let mode = if args.dry_run {
        ExecutionMode::DryRun
    } else {
        ExecutionMode::Live
    };

    println!(
        "{} restart of {} service(s): {}",
        if args.full { "Full" } else { "Rolling" },
        targets.len(),
        targets.join(", ")
    );

    let plan = execute_strategy(&backend, &targets, strategy, modifiers, mode).await?;

    if args.dry_run {
        println!("\nPlanned actions (dry run, nothing was changed):");
        for action in plan.actions() {
            println!("  - {}", action);
        }
        // Nothing was mutated, so there is nothing to wait on.
        return Ok(());
    }

    if args.no_wait {
        println!("Restart issued; skipping readiness wait");
        return Ok(());
    }

    let opts = WaitOptions {
        timeout: args
            .timeout
            .map(Duration::from_secs)
            .unwrap_or(settings.wait_timeout),
        poll_interval: args
            .poll_interval
            .map(Duration::from_secs)
            .unwrap_or(settings.poll_interval),
    };

    println!(
        "Waiting up to {}s for {} service(s) to become ready...",
        opts.timeout.as_secs(),
        targets.len()
    );

    let (_canceller, token) = CancelToken::pair();
    let outcome = wait_ready(&backend, &targets, opts, &token).await;

    for (name, record) in &outcome.records {
        let mark = if record.state.is_ready() { "✓" } else { "✗" };
        println!("  {} {}: {}", mark, name, record.state);
    }

    outcome.ensure_ready()?;
    println!("All services ready");
    Ok(())
}
