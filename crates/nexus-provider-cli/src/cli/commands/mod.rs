use std::io::Read;
use std::path::Path;

use anyhow::Context;
use nexus_provider::{CallContext, NexusProvider, ResourceResponse, Severity};
use serde_json::Value;

use super::args::*;
use crate::exit_codes::{DIAGNOSTIC_ERRORS, SUCCESS};

pub mod data;
pub mod resource;
pub mod schema;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Resources => schema::list(),
        Command::Schema(args) => schema::show(args),
        Command::Validate(args) => resource::validate(args),
        Command::Create(args) => resource::create(&cli.connection, args).await,
        Command::Read(args) => resource::read(&cli.connection, args).await,
        Command::Update(args) => resource::update(&cli.connection, args).await,
        Command::Delete(args) => resource::delete(&cli.connection, args).await,
        Command::Import(args) => resource::import(&cli.connection, args).await,
        Command::Data(args) => data::run(&cli.connection, args).await,
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(SUCCESS)
        }
    }
}

/// Build a configured provider from the connection flags.
pub(crate) fn configured_provider(connection: &ConnectionArgs) -> anyhow::Result<NexusProvider> {
    let mut provider = NexusProvider::new();
    provider
        .configure(connection.to_config())
        .context("failed to configure provider")?;
    Ok(provider)
}

/// Call context cancelled on Ctrl-C.
pub(crate) fn interruptible_context() -> CallContext {
    let ctx = CallContext::new();
    let handle = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling in-flight request");
            handle.cancel();
        }
    });
    ctx
}

/// Read a JSON document from `path`, or stdin for "-".
pub(crate) fn read_json(path: &Path) -> anyhow::Result<Value> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?
    };
    serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", path.display()))
}

/// Print the response as JSON on stdout and diagnostics on stderr.
pub(crate) fn report(response: &ResourceResponse) -> anyhow::Result<i32> {
    for diagnostic in response.diagnostics.iter() {
        let label = match diagnostic.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        eprintln!("{label}: {}", diagnostic.summary);
        if !diagnostic.detail.is_empty() {
            eprintln!("  {}", diagnostic.detail.replace('\n', "\n  "));
        }
    }
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(exit_code(response))
}

pub(crate) fn exit_code(response: &ResourceResponse) -> i32 {
    if response.has_errors() {
        DIAGNOSTIC_ERRORS
    } else {
        SUCCESS
    }
}
