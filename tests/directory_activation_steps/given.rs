//! Given steps for directory activation scenarios.

use super::world::{DirectoryWorld, build_request, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given(r#"an agent "{id}" serving "{capability}" is registered"#)]
fn agent_registered(
    world: &mut DirectoryWorld,
    id: String,
    capability: String,
) -> Result<(), eyre::Report> {
    run_async(world.service.register(build_request(&id, &capability)))
        .wrap_err("register agent for scenario")?;
    Ok(())
}

#[given(r#"the agent "{id}" is activated"#)]
fn agent_already_active(world: &mut DirectoryWorld, id: String) -> Result<(), eyre::Report> {
    run_async(world.service.activate(&id)).wrap_err("activate agent for scenario")?;
    Ok(())
}
