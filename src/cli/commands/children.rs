//! Nested symbols command

use anyhow::Result;
use clap::Args;

use crate::app::App;
use crate::cli::parse_request;
use crate::models::ChildDepth;

#[derive(Args, Debug)]
pub struct ChildrenArgs {
    /// file:line:character, file#name, file:line:character#name, or a JSON request
    pub reference: String,

    /// How many levels to descend: 1, 2, 3 or all (default from config)
    #[arg(long)]
    pub depth: Option<ChildDepth>,
}

pub async fn execute(args: ChildrenArgs, app: &App) -> Result<()> {
    let ctx = &app.output;
    let request = parse_request(&args.reference, app.root())?;

    match app.facade.children(&request, args.depth).await {
        Ok(table) => ctx.print_table(&table),
        Err(e) => ctx.print_error(&e.to_string()),
    }
    Ok(())
}
