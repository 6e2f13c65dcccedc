use nexus_provider::resource::content_selector::TYPE_NAME as CONTENT_SELECTOR;
use nexus_provider::{
    CallContext, CapabilityResource, ContentSelectorResource, Diagnostics, NexusProvider,
    ProviderResult, ResourceResponse,
};
use serde_json::Value;

use super::{configured_provider, interruptible_context, read_json, report};
use crate::cli::args::{ConnectionArgs, ImportArgs, PlanArgs, StateArgs, UpdateArgs};
use crate::exit_codes::{DIAGNOSTIC_ERRORS, SUCCESS};

/// Either resource family, picked by type name.
enum Target {
    Capability(CapabilityResource),
    ContentSelector(ContentSelectorResource),
}

impl Target {
    fn resolve(provider: &NexusProvider, type_name: &str) -> ProviderResult<Self> {
        if type_name == CONTENT_SELECTOR {
            provider.content_selector_resource().map(Self::ContentSelector)
        } else {
            provider.capability_resource(type_name).map(Self::Capability)
        }
    }

    async fn create(&self, ctx: &CallContext, plan: &Value) -> ResourceResponse {
        match self {
            Self::Capability(r) => r.create(ctx, plan).await,
            Self::ContentSelector(r) => r.create(ctx, plan).await,
        }
    }

    async fn read(&self, ctx: &CallContext, state: &Value) -> ResourceResponse {
        match self {
            Self::Capability(r) => r.read(ctx, state).await,
            Self::ContentSelector(r) => r.read(ctx, state).await,
        }
    }

    async fn update(&self, ctx: &CallContext, plan: &Value, state: &Value) -> ResourceResponse {
        match self {
            Self::Capability(r) => r.update(ctx, plan, state).await,
            Self::ContentSelector(r) => r.update(ctx, plan, state).await,
        }
    }

    async fn delete(&self, ctx: &CallContext, state: &Value) -> ResourceResponse {
        match self {
            Self::Capability(r) => r.delete(ctx, state).await,
            Self::ContentSelector(r) => r.delete(ctx, state).await,
        }
    }

    async fn import(&self, ctx: &CallContext, id: &str) -> ResourceResponse {
        match self {
            Self::Capability(r) => r.import(ctx, id).await,
            Self::ContentSelector(r) => r.import(ctx, id).await,
        }
    }
}

fn target(connection: &ConnectionArgs, type_name: &str) -> anyhow::Result<Target> {
    let provider = configured_provider(connection)?;
    Ok(Target::resolve(&provider, type_name)?)
}

/// Offline plan check. Needs no credentials.
pub fn validate(args: PlanArgs) -> anyhow::Result<i32> {
    let plan = read_json(&args.plan)?;
    let diagnostics = validate_plan(&args.type_name, &plan)?;
    for diagnostic in diagnostics.iter() {
        eprintln!("error: {}\n  {}", diagnostic.summary, diagnostic.detail);
    }
    if diagnostics.has_errors() {
        Ok(DIAGNOSTIC_ERRORS)
    } else {
        eprintln!("{}: plan is valid", args.type_name);
        Ok(SUCCESS)
    }
}

fn validate_plan(type_name: &str, plan: &Value) -> anyhow::Result<Diagnostics> {
    // Offline: these credentials are never sent.
    let mut provider = NexusProvider::new();
    provider.configure(
        nexus_provider::ProviderConfig::default().with_credentials("offline", "offline"),
    )?;
    Ok(match Target::resolve(&provider, type_name)? {
        Target::Capability(r) => r.validate(plan),
        Target::ContentSelector(r) => r.validate(plan),
    })
}

pub async fn create(connection: &ConnectionArgs, args: PlanArgs) -> anyhow::Result<i32> {
    let plan = read_json(&args.plan)?;
    let target = target(connection, &args.type_name)?;
    report(&target.create(&interruptible_context(), &plan).await)
}

pub async fn read(connection: &ConnectionArgs, args: StateArgs) -> anyhow::Result<i32> {
    let state = read_json(&args.state)?;
    let target = target(connection, &args.type_name)?;
    report(&target.read(&interruptible_context(), &state).await)
}

pub async fn update(connection: &ConnectionArgs, args: UpdateArgs) -> anyhow::Result<i32> {
    let plan = read_json(&args.plan)?;
    let state = read_json(&args.state)?;
    let target = target(connection, &args.type_name)?;
    report(&target.update(&interruptible_context(), &plan, &state).await)
}

pub async fn delete(connection: &ConnectionArgs, args: StateArgs) -> anyhow::Result<i32> {
    let state = read_json(&args.state)?;
    let target = target(connection, &args.type_name)?;
    report(&target.delete(&interruptible_context(), &state).await)
}

pub async fn import(connection: &ConnectionArgs, args: ImportArgs) -> anyhow::Result<i32> {
    let target = target(connection, &args.type_name)?;
    report(&target.import(&interruptible_context(), &args.id).await)
}
