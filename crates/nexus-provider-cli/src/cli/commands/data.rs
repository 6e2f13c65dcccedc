use serde_json::{json, Value};

use super::{configured_provider, interruptible_context, read_json, report};
use crate::cli::args::{ConnectionArgs, DataArgs};

pub async fn run(connection: &ConnectionArgs, args: DataArgs) -> anyhow::Result<i32> {
    let config: Value = match &args.config {
        Some(path) => read_json(path)?,
        None => json!({}),
    };
    let provider = configured_provider(connection)?;
    let source = provider.data_source(&args.type_name)?;
    report(&source.read(&interruptible_context(), &config).await)
}
