//! Opens a fresh `RequestContext` for every request.
//!
//! The handle is placed in request extensions and the rest of the request runs
//! inside `context::scope`, which clears the store on every exit path.

use axum::{
    Router,
    body::Body,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::context::{self, RequestContext, keys};
use crate::middleware::http::REQUEST_ID_HEADER;

pub fn apply(router: Router) -> Router {
    router.layer(middleware::from_fn(context_middleware))
}

async fn context_middleware(mut req: Request<Body>, next: Next) -> Response {
    let ctx = RequestContext::new();

    if let Some(id) = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        ctx.set(keys::REQUEST_ID, id);
    }
    ctx.set(keys::METHOD, req.method().as_str());
    ctx.set(keys::PATH, req.uri().path());

    req.extensions_mut().insert(ctx.clone());

    context::scope(ctx, next.run(req)).await
}
