//! Resolves every request of a fixture in order.

use serde::Serialize;
use tracing::{info, warn};

use slugscope_core::config::ResolverConfig;
use slugscope_service::entity::{EntityObject, ExtensibleObject};
use slugscope_service::index::MemoryPathIndex;
use slugscope_service::path::ProjectedPath;
use slugscope_service::scope::{MapConfigLookup, StaticScopeRegistry};
use slugscope_service::token::TokenSource;
use slugscope_service::{Generated, ScopedSlugResolver, ServiceError};

use crate::error::AppResult;
use crate::fixture::{Fixture, Request};

/// Times a persist conflict triggers a fresh resolution before giving up.
const PERSIST_RETRIES: u32 = 3;

/// Result line for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub request: usize,
    pub value: String,
    pub attempts: u32,
    pub available: bool,
    pub paths: Vec<ProjectedPath>,
}

type FixtureResolver<'a, T> =
    ScopedSlugResolver<&'a MemoryPathIndex, StaticScopeRegistry, MapConfigLookup, T>;

fn resolve_one<T: TokenSource>(
    resolver: &FixtureResolver<'_, T>,
    request: &Request,
) -> AppResult<Generated> {
    let generated = if request.extensible {
        let object = ExtensibleObject {
            id: request.entity.id(),
            data: request.entity.data.clone(),
        };
        resolver.generate_projected(&object, &request.attribute)?
    } else {
        resolver.generate_projected(&request.entity, &request.attribute)?
    };
    Ok(generated)
}

/// ## Summary
/// Resolves each fixture request against the fixture's stores and paths.
///
/// Requests marked `persist` record their accepted paths, so later requests
/// for the same value collide with them. A persist that loses its slot is
/// resolved again.
///
/// ## Errors
/// Returns the first lookup, index or config error, or a conflict that
/// outlasts the persist retries.
pub fn run<T: TokenSource>(
    config: &ResolverConfig,
    fixture: &Fixture,
    index: &MemoryPathIndex,
    tokens: T,
) -> AppResult<Vec<Resolution>> {
    let resolver = ScopedSlugResolver::from_config(
        config,
        index,
        fixture.registry(),
        fixture.config_lookup(),
        tokens,
    )?;

    let mut resolutions = Vec::with_capacity(fixture.requests.len());
    for (position, request) in fixture.requests.iter().enumerate() {
        let mut generated = resolve_one(&resolver, request)?;

        if request.persist {
            let mut retries = 0;
            loop {
                match index.persist(&generated.paths) {
                    Ok(ids) => {
                        info!(request = position, records = ?ids, "Recorded request paths");
                        break;
                    }
                    Err(ServiceError::Conflict(reason)) if retries < PERSIST_RETRIES => {
                        retries += 1;
                        warn!(request = position, reason = %reason, "Path taken while persisting, resolving again");
                        generated = resolve_one(&resolver, request)?;
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        }

        info!(
            request = position,
            value = %generated.value,
            attempts = generated.attempts,
            available = generated.available,
            "Resolved request"
        );
        resolutions.push(Resolution {
            request: position,
            value: generated.value,
            attempts: generated.attempts,
            available: generated.available,
            paths: generated.paths,
        });
    }

    Ok(resolutions)
}
