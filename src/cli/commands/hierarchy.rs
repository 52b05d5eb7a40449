//! Call and type hierarchy commands

use anyhow::Result;
use clap::Args;

use crate::app::App;
use crate::cli::parse_request;
use crate::models::HierarchyKind;

#[derive(Args, Debug)]
pub struct HierarchyArgs {
    /// file:line:character, file#name, file:line:character#name, or a JSON request
    pub reference: String,
}

pub async fn execute(kind: HierarchyKind, args: HierarchyArgs, app: &App) -> Result<()> {
    let ctx = &app.output;
    let request = parse_request(&args.reference, app.root())?;

    let tables = match kind {
        HierarchyKind::Call => app.facade.call_hierarchy(&request).await,
        HierarchyKind::Type => app.facade.type_hierarchy(&request).await,
    };

    match tables {
        Ok(tables) => ctx.print_tables(&tables),
        Err(e) => ctx.print_error(&e.to_string()),
    }
    Ok(())
}
