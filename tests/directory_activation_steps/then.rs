//! Then steps for directory activation scenarios.

use super::world::{DirectoryWorld, run_async};
use rstest_bdd_macros::then;
use transit_exchange::exchange::domain::ExchangeError;

#[then(r#"the live listing for "{capability}" is empty"#)]
fn live_listing_empty(world: &mut DirectoryWorld, capability: String) -> Result<(), eyre::Report> {
    let live = world.live_ids(&capability)?;
    if !live.is_empty() {
        return Err(eyre::eyre!("expected no live agents, found {live:?}"));
    }
    Ok(())
}

#[then(r#"the live listing for "{capability}" contains "{id}""#)]
fn live_listing_contains(
    world: &mut DirectoryWorld,
    capability: String,
    id: String,
) -> Result<(), eyre::Report> {
    let live = world.live_ids(&capability)?;
    if !live.contains(&id) {
        return Err(eyre::eyre!("expected '{id}' in live listing, found {live:?}"));
    }
    Ok(())
}

#[then(r#"activating "{id}" again is rejected"#)]
fn reactivation_rejected(world: &mut DirectoryWorld, id: String) -> Result<(), eyre::Report> {
    if run_async(world.service.activate(&id)).is_ok() {
        return Err(eyre::eyre!("expected activation of '{id}' to fail"));
    }
    Ok(())
}

#[then(r#"the query fails with "{code}""#)]
fn query_fails_with(world: &mut DirectoryWorld, code: String) -> Result<(), eyre::Report> {
    let result = world
        .last_query
        .take()
        .ok_or_else(|| eyre::eyre!("no query was routed in this scenario"))?;
    let Err(err) = result else {
        return Err(eyre::eyre!("expected the query to fail"));
    };
    let actual = ExchangeError::from(err).code();
    if actual != code {
        return Err(eyre::eyre!("expected error code '{code}', got '{actual}'"));
    }
    Ok(())
}
