//! When steps for directory activation scenarios.

use super::world::{DirectoryWorld, build_request, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;
use transit_exchange::directory::domain::CapabilityTag;

#[when(r#"the agent "{id}" is activated"#)]
fn activate_agent(world: &mut DirectoryWorld, id: String) -> Result<(), eyre::Report> {
    run_async(world.service.activate(&id)).wrap_err("activate agent")?;
    Ok(())
}

#[when(r#"the agent "{id}" is deactivated"#)]
fn deactivate_agent(world: &mut DirectoryWorld, id: String) -> Result<(), eyre::Report> {
    run_async(world.service.deactivate(&id)).wrap_err("deactivate agent")?;
    Ok(())
}

#[when(r#"the agent "{id}" registers again serving "{capability}""#)]
fn register_again(
    world: &mut DirectoryWorld,
    id: String,
    capability: String,
) -> Result<(), eyre::Report> {
    run_async(world.service.register(build_request(&id, &capability)))
        .wrap_err("re-register agent")?;
    Ok(())
}

#[when(r#"a fast query for "{capability}" is routed"#)]
fn route_fast_query(world: &mut DirectoryWorld, capability: String) -> Result<(), eyre::Report> {
    let tag = CapabilityTag::new(capability)?;
    world.last_query = Some(run_async(world.router.dispatch(&tag, "test query", "trace-bdd")));
    Ok(())
}
