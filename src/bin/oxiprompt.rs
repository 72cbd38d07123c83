// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use oxiprompt::{
    config::Config,
    duration::{from_micros, to_micros},
    hook::init_script,
    path::default_config_path,
    Clock, DurationTracker, GitCli, PromptSession, RepoStatusProbe, Shell, SystemClock,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::{
    env::{current_dir, current_exe},
    io::{stdout, Write},
    path::PathBuf,
    process::exit,
};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "oxiprompt [options] <command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    async fn run(self) -> Result<()> {
        let config = load_config(self.config)?;
        match self.command {
            Command::Init(opts) => run_init(opts, &config),
            Command::Now => run_now(),
            Command::Prompt(opts) => run_prompt(opts, config).await,
            Command::Status(opts) => run_status(opts, &config).await,
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Print initialization script for target shell.
    #[command(override_usage = "oxiprompt init [options] <shell>")]
    Init(InitOptions),

    /// Print current timestamp in microseconds.
    #[command(override_usage = "oxiprompt now")]
    Now,

    /// Print prompt for current working directory.
    #[command(override_usage = "oxiprompt prompt [options]")]
    Prompt(PromptOptions),

    /// Show repository status of current working directory.
    #[command(override_usage = "oxiprompt status [options]")]
    Status(StatusOptions),
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct InitOptions {
    /// Shell to initialize.
    #[arg(value_enum, value_name = "shell")]
    pub shell: Shell,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct PromptOptions {
    /// Start timestamp of last command in microseconds.
    #[arg(short, long, value_name = "micros")]
    pub start: Option<u64>,

    /// Working directory to render prompt for.
    #[arg(long, value_name = "path")]
    pub cwd: Option<PathBuf>,

    /// Escape prompt for target shell.
    #[arg(long, value_enum, value_name = "shell")]
    pub shell: Option<Shell>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct StatusOptions {
    /// Working directory to probe.
    #[arg(long, value_name = "path")]
    pub cwd: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // INVARIANT: Log to stderr, because stdout carries the prompt itself.
    let layer = fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .unwrap_or_default();
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run().await {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

async fn run() -> Result<()> {
    Cli::parse().run().await
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load(path, true)?,
        None => Config::load(default_config_path()?, false)?,
    };

    Ok(config)
}

fn run_init(opts: InitOptions, config: &Config) -> Result<()> {
    let exe = current_exe().context("cannot locate oxiprompt binary")?;
    print!("{}", init_script(opts.shell, &exe, config));

    Ok(())
}

fn run_now() -> Result<()> {
    println!("{}", to_micros(SystemClock.now()));

    Ok(())
}

async fn run_prompt(opts: PromptOptions, config: Config) -> Result<()> {
    let cwd = match opts.cwd {
        Some(cwd) => cwd,
        None => current_dir()?,
    };

    let backend = GitCli::new(config.git.program.clone(), config.git.timeout());
    let tracker = DurationTracker::resume(SystemClock, opts.start.map(from_micros));
    let mut session = PromptSession::new(backend, tracker, config.prompt).with_shell(opts.shell);

    let prompt = session.pre_prompt(&cwd).await;
    let mut out = stdout().lock();
    out.write_all(prompt.as_bytes())?;
    out.flush()?;

    Ok(())
}

async fn run_status(opts: StatusOptions, config: &Config) -> Result<()> {
    let cwd = match opts.cwd {
        Some(cwd) => cwd,
        None => current_dir()?,
    };

    let probe = RepoStatusProbe::new(GitCli::new(config.git.program.clone(), config.git.timeout()));
    let status = probe.compute(&cwd).await;
    println!("label: {}", status.label);
    println!("dirty: {}", status.is_dirty);
    println!("in_repo: {}", status.in_repo);

    Ok(())
}
