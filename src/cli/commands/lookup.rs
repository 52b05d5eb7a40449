//! Single-reference commands: resolve, refs, def, decl, typedef, impl, hover

use anyhow::Result;
use clap::Args;

use crate::app::App;
use crate::cli::parse_request;

#[derive(Args, Debug)]
pub struct LookupArgs {
    /// file:line:character, file#name, file:line:character#name, or a JSON request
    pub reference: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupCommand {
    Resolve,
    References,
    Definition,
    Declaration,
    TypeDefinition,
    Implementation,
    Hover,
}

pub async fn execute(command: LookupCommand, args: LookupArgs, app: &App) -> Result<()> {
    let ctx = &app.output;
    let request = parse_request(&args.reference, app.root())?;
    let facade = &app.facade;

    let table = match command {
        LookupCommand::Resolve => {
            match facade.resolve(&request).await {
                Ok(result) => ctx.print_success_flat(result),
                Err(e) => ctx.print_error(&e.to_string()),
            }
            return Ok(());
        }
        LookupCommand::References => facade.references(&request).await,
        LookupCommand::Definition => facade.definition(&request).await,
        LookupCommand::Declaration => facade.declaration(&request).await,
        LookupCommand::TypeDefinition => facade.type_definition(&request).await,
        LookupCommand::Implementation => facade.implementation(&request).await,
        LookupCommand::Hover => facade.hover(&request).await,
    };

    match table {
        Ok(table) => ctx.print_table(&table),
        Err(e) => ctx.print_error(&e.to_string()),
    }
    Ok(())
}
