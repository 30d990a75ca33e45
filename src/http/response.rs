//! Static responses for declarative routes.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::config::ResponseConfig;
use crate::routing::{Args, Ctx, Handler, HandlerFuture, RouteError};

/// Handler that answers with a fixed status, content type and body template.
#[derive(Debug, Clone)]
pub struct StaticResponder {
    status: StatusCode,
    content_type: HeaderValue,
    body: String,
}

impl StaticResponder {
    pub fn from_config(config: &ResponseConfig) -> Result<Self, RouteError> {
        let status = StatusCode::from_u16(config.status).map_err(|_| {
            RouteError::Argument(format!("{} is not a valid HTTP status", config.status))
        })?;
        let content_type = HeaderValue::from_str(&config.content_type).map_err(|_| {
            RouteError::Argument(format!("invalid content type `{}`", config.content_type))
        })?;

        Ok(Self {
            status,
            content_type,
            body: config.body.clone(),
        })
    }

    fn respond(&self, args: &Args) -> Response {
        let body = render(&self.body, args);
        (self.status, [(header::CONTENT_TYPE, self.content_type.clone())], body).into_response()
    }
}

impl Handler for StaticResponder {
    fn call(&self, ctx: Ctx) -> HandlerFuture {
        let response = self.respond(&ctx.args);
        Box::pin(async move { Ok(response) })
    }
}

/// Replace `{name}` with the capture `name`. Unknown placeholders stay verbatim.
pub fn render(template: &str, args: &Args) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find(|c| c == '{' || c == '}') {
            Some(close) if after.as_bytes()[close] == b'}' => {
                let key = &after[..close];
                match args.get(key) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            // No placeholder starts here; keep the brace literally.
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
