//! Document symbols command

use anyhow::Result;
use clap::Args;

use crate::app::App;
use crate::cli::parse_document;

#[derive(Args, Debug)]
pub struct SymbolsArgs {
    /// File path or file:// uri
    pub file: String,
}

pub async fn execute(args: SymbolsArgs, app: &App) -> Result<()> {
    let ctx = &app.output;
    let uri = parse_document(&args.file, app.root())?;

    match app.facade.document_symbols(&uri).await {
        Ok(table) => ctx.print_table(&table),
        Err(e) => ctx.print_error(&e.to_string()),
    }
    Ok(())
}
