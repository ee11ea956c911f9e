// Single field access evaluation
//
// Exit codes: 0 allowed, 1 denied, 2 rule error.

use anyhow::{bail, Context, Result};
use clap::Args;
use gatehouse_authorization::{AccessError, ShieldConfig};
use gatehouse_events::{policy, EventContext, EventStore};
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

/// Outcome of a single check, mapped onto the process exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Access allowed
    Allow,
    /// Access denied
    Deny,
    /// A rule could not be evaluated
    Error,
}

impl Verdict {
    /// Process exit code for this verdict
    pub fn exit_code(self) -> ExitCode {
        match self {
            Verdict::Allow => ExitCode::SUCCESS,
            Verdict::Deny => ExitCode::from(1),
            Verdict::Error => ExitCode::from(2),
        }
    }
}

/// Arguments of `gatehouse check`
#[derive(Args)]
pub struct CheckArgs {
    /// Field to check, as Type.field
    #[arg(long)]
    pub field: String,

    /// Caller user id; omit for an anonymous request
    #[arg(long)]
    pub caller: Option<String>,

    /// Field arguments as JSON
    #[arg(long, default_value = "{}")]
    pub args: String,

    /// Object the field is resolved on, as JSON
    #[arg(long, default_value = "null")]
    pub parent: String,

    /// JSON store fixture to evaluate against
    #[arg(long)]
    pub store: Option<PathBuf>,
}

fn parse_json(flag: &str, raw: &str) -> Result<Value> {
    serde_json::from_str(raw).with_context(|| format!("--{flag} is not valid JSON"))
}

/// Evaluate one access and print the verdict
pub async fn run(args: &CheckArgs, config: ShieldConfig) -> Result<Verdict> {
    if !args.field.contains('.') {
        bail!("--field must look like Type.field, got `{}`", args.field);
    }
    let field_args = parse_json("args", &args.args)?;
    let parent = parse_json("parent", &args.parent)?;

    let store = match &args.store {
        Some(path) => EventStore::load_from_file(path)?,
        None => EventStore::new(),
    };
    let store = Arc::new(store);
    let ctx = match &args.caller {
        Some(caller) => EventContext::new(caller.clone(), store),
        None => EventContext::anonymous(store),
    };

    let shield = policy::shield(config)?;
    info!(field = %args.field, caller = ?args.caller, "Checking access");

    match shield.check_path(&args.field, &parent, &field_args, &ctx).await {
        Ok(()) => {
            println!("Allow");
            Ok(Verdict::Allow)
        }
        Err(err @ AccessError::Denied { .. }) => {
            println!("Deny: {err}");
            Ok(Verdict::Deny)
        }
        Err(err @ AccessError::Rule { .. }) => {
            println!("Error: {err}");
            Ok(Verdict::Error)
        }
    }
}
