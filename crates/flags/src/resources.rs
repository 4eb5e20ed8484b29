//! Resource bundle readers with a default for missing ids.

use crate::platform::{AppContext, ResourceId};
use tracing::debug;

/// Boolean resource `id`, or `default` if the bundle has no such resource.
pub fn res_boolean(ctx: &dyn AppContext, id: ResourceId, default: bool) -> bool {
    match ctx.resources().boolean(id) {
        Ok(value) => value,
        Err(err) => {
            debug!(%id, error = %err, "Boolean resource unavailable, using default");
            default
        },
    }
}

/// Integer resource `id`, or `default` if the bundle has no such resource.
pub fn res_integer(ctx: &dyn AppContext, id: ResourceId, default: i32) -> i32 {
    match ctx.resources().integer(id) {
        Ok(value) => value,
        Err(err) => {
            debug!(%id, error = %err, "Integer resource unavailable, using default");
            default
        },
    }
}
