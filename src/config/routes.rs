//! Declarative routes.
//!
//! Turns `[[routes]]` entries into committed routes bound to static
//! responders, and installs them into a route table in file order.

use std::sync::Arc;

use crate::config::schema::RouteConfig;
use crate::http::response::StaticResponder;
use crate::routing::{Route, RouteBuilder, RouteError, RouteTable, SharedHandler};

/// Compile one configured route and its responder.
pub fn build_route(
    table: &Arc<RouteTable>,
    config: &RouteConfig,
) -> Result<(Route, SharedHandler), RouteError> {
    let mut builder = RouteBuilder::new(table.clone());
    builder
        .name(config.name.clone())
        .path(&config.path)?
        .method(&config.method)?
        .ext(&config.ext)?
        .host(&config.host)?
        .query(&config.query)?
        .header(&config.header)?;

    let handler: SharedHandler = Arc::new(StaticResponder::from_config(&config.response)?);
    Ok((builder.snapshot(), handler))
}

/// Replace every route in `table` with the configured ones.
///
/// Nothing is swapped in unless every route compiles.
pub fn install_routes(
    table: &Arc<RouteTable>,
    routes: &[RouteConfig],
) -> Result<usize, RouteError> {
    let built = routes
        .iter()
        .map(|route| build_route(table, route))
        .collect::<Result<Vec<_>, _>>()?;
    let count = built.len();
    table.replace(built);
    Ok(count)
}
