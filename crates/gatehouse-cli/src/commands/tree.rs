// Tree inspection command
//
// Prints either the role-gated tree the shield serves or the ungated policy
// of a single tier.

use anyhow::Result;
use clap::Args;
use gatehouse_events::{permissions, role_policy, Role};

/// Arguments of `gatehouse tree`
#[derive(Args)]
pub struct TreeArgs {
    /// Show only what this tier may do, before gating
    #[arg(long)]
    pub role: Option<Role>,
}

/// Print the selected tree and its rule count
pub fn run(args: &TreeArgs) -> Result<()> {
    let tree = match args.role {
        Some(role) => role_policy(role)?,
        None => permissions()?,
    };
    print!("{tree}");
    println!("{} rules", tree.leaf_count());
    Ok(())
}
