//! CLI struct definitions for the Pulsecheck command-line interface.
//!
//! All clap-derived types live here. Dispatch logic lives in `lib.rs`.

use crate::plugins::{analysis, directory, report, survey};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "pulsecheck",
    version = env!("CARGO_PKG_VERSION"),
    about = "Pulsecheck is the daemonless, local-first control plane for multi-tenant employee sentiment surveys: isolated company directories, atomic submissions, completion detection, and AI analysis orchestration with proof-backed status. 🦀",
    disable_version_flag = true
)]
pub(crate) struct Cli {
    /// Caller identity supplied by the credential layer: `root` or an
    /// employee id. Falls back to $PULSECHECK_ACTOR, then `root`.
    #[clap(long, global = true)]
    pub actor: Option<String>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(clap::Args, Debug)]
pub(crate) struct InitCli {
    /// Target directory (defaults to the current directory).
    pub dir: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub(crate) struct SchemaCli {
    /// Show one subsystem's schema instead of all of them.
    #[clap(long)]
    pub subsystem: Option<String>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Bootstrap a Pulsecheck project (store, schema, default config)
    #[clap(name = "init", visible_alias = "i")]
    Init(InitCli),

    /// Manage client companies
    #[clap(name = "company", visible_alias = "c")]
    Company(directory::CompanyCli),

    /// Manage company employees
    #[clap(name = "employee", visible_alias = "e")]
    Employee(directory::EmployeeCli),

    /// Manage survey forms
    #[clap(name = "form", visible_alias = "f")]
    Form(survey::FormCli),

    /// Submit surveys and inspect completion state
    #[clap(name = "survey", visible_alias = "s")]
    Survey(survey::SurveyCli),

    /// Drive and inspect analysis runs
    #[clap(name = "analyze", visible_alias = "a")]
    Analyze(analysis::AnalyzeCli),

    /// Retrieve reports and reset survey cycles
    #[clap(name = "report", visible_alias = "r")]
    Report(report::ReportCli),

    /// Show subsystem schemas (for collaborator discovery)
    #[clap(name = "schema")]
    Schema(SchemaCli),

    /// Show version information
    #[clap(name = "version")]
    Version,
}
