use nexus_provider::NexusProvider;

use crate::cli::args::SchemaArgs;
use crate::exit_codes::SUCCESS;

/// Print every advertised resource and data source type name.
pub fn list() -> anyhow::Result<i32> {
    let provider = NexusProvider::new();
    println!("Resources:");
    for name in provider.resource_type_names() {
        println!("  {name}");
    }
    println!("Data sources:");
    for name in provider.data_source_names() {
        println!("  {name}");
    }
    Ok(SUCCESS)
}

pub fn show(args: SchemaArgs) -> anyhow::Result<i32> {
    let schema = NexusProvider::new().resource_schema(&args.type_name)?;
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(SUCCESS)
}
