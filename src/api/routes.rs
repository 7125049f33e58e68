//! Route table: one pipeline per route.
//!
//! Every pipeline starts with the same outer layers (CORS, client key, rate
//! gate) and adds payload validation and session authentication where the
//! route needs them. `OPTIONS` is routed into the pipeline so the CORS layer
//! can answer preflights.

use axum::Router;
use axum::extract::{Path, Request};
use axum::routing::{MethodFilter, MethodRouter, on};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;

use crate::api::dto::{CheckAliasPayload, CreateUrlPayload, CreateUserPayload, Validatable};
use crate::api::handlers::{
    CheckAlias, CreateUrl, DeleteUrl, DeleteUrls, DeleteUser, GetUrl, GetUser, ListUrls, Logout,
    RedirectAlias, SignIn,
};
use crate::api::middleware::rate_gate::{BROWSE, STANDARD, STRICT};
use crate::api::middleware::{Authenticate, ClientKey, Cors, PayloadValidation, RateGate};
use crate::api::pipeline::{Handler, Pipeline, PipelineBuilder};
use crate::error::AppError;
use crate::infrastructure::rate_limit::RateLimit;
use crate::state::AppState;

/// Layers shared by every route, in outermost-first order.
struct Layers {
    cors: Arc<Cors>,
    client_key: Arc<ClientKey>,
    state: AppState,
}

impl Layers {
    fn new(state: &AppState) -> Result<Self, AppError> {
        Ok(Self {
            cors: Arc::new(Cors::new(state.settings.cors_origin.clone())),
            client_key: Arc::new(ClientKey::new(&state.settings.client_key)?),
            state: state.clone(),
        })
    }

    /// Starts a pipeline with CORS, the client key check and a rate gate.
    fn base<P: Send + 'static>(
        &self,
        terminal: impl Handler<P> + 'static,
        limit: RateLimit,
    ) -> PipelineBuilder<P> {
        Pipeline::builder(terminal)
            .layer(self.cors.clone())
            .layer(self.client_key.clone())
            .layer(Arc::new(RateGate::new(
                self.state.rate_limiter.clone(),
                limit,
                self.state.settings.behind_proxy,
            )))
    }

    fn authenticated<P: Send + 'static>(
        &self,
        terminal: impl Handler<P> + 'static,
        limit: RateLimit,
    ) -> Pipeline<P> {
        self.base(terminal, limit)
            .layer(Arc::new(Authenticate::new(self.state.sessions.clone())))
            .build()
    }

    fn validated<P>(&self, terminal: impl Handler<P> + 'static, limit: RateLimit) -> Pipeline<P>
    where
        P: DeserializeOwned + Validatable + Send + 'static,
    {
        self.base(terminal, limit)
            .layer(Arc::new(PayloadValidation::<P>::new()))
            .build()
    }
}

fn with_options(filter: MethodFilter) -> MethodFilter {
    filter.or(MethodFilter::OPTIONS)
}

/// Routes `filter` to a pipeline on a path without parameters.
fn endpoint<P: Send + 'static>(filter: MethodFilter, pipeline: Pipeline<P>) -> MethodRouter {
    on(filter, move |request: Request| {
        let pipeline = pipeline.clone();
        async move { pipeline.serve(request, HashMap::new()).await }
    })
}

/// Routes `filter` to a pipeline on a path with `{name}` segments.
fn endpoint_with_params<P: Send + 'static>(
    filter: MethodFilter,
    pipeline: Pipeline<P>,
) -> MethodRouter {
    on(
        filter,
        move |Path(params): Path<HashMap<String, String>>, request: Request| {
            let pipeline = pipeline.clone();
            async move { pipeline.serve(request, params).await }
        },
    )
}

/// `/url/*` routes.
///
/// - `POST   /url/create_url`           - create an owned link
/// - `POST   /url/guest`                - create an ownerless link
/// - `POST   /url/check_alias`          - alias availability
/// - `GET    /url/get_url/{urlId}`      - one owned link
/// - `GET    /url/get_urls`             - owned links, filtered and paged
/// - `DELETE /url/delete_url/{urlId}`   - delete one owned link
/// - `DELETE /url/delete_urls?url=a,b`  - delete several owned links
/// - `GET    /url/redirect?alias=`      - 307 to the original URL
pub fn url_routes(state: &AppState) -> Result<Router, AppError> {
    let layers = Layers::new(state)?;
    let links = &state.links;

    let create_url = layers
        .base(CreateUrl::new(links.clone()), STRICT)
        .layer(Arc::new(PayloadValidation::<CreateUrlPayload>::new()))
        .layer(Arc::new(Authenticate::new(state.sessions.clone())))
        .build();

    let router = Router::new()
        .route(
            "/url/create_url",
            endpoint(with_options(MethodFilter::POST), create_url),
        )
        .route(
            "/url/guest",
            endpoint(
                with_options(MethodFilter::POST),
                layers.validated::<CreateUrlPayload>(CreateUrl::new(links.clone()), STRICT),
            ),
        )
        .route(
            "/url/check_alias",
            endpoint(
                with_options(MethodFilter::POST),
                layers.validated::<CheckAliasPayload>(CheckAlias::new(links.clone()), STRICT),
            ),
        )
        .route(
            "/url/get_url/{urlId}",
            endpoint_with_params(
                with_options(MethodFilter::GET),
                layers.authenticated(GetUrl::new(links.clone()), STANDARD),
            ),
        )
        .route(
            "/url/get_urls",
            endpoint(
                with_options(MethodFilter::GET),
                layers.authenticated(ListUrls::new(links.clone()), BROWSE),
            ),
        )
        .route(
            "/url/delete_url/{urlId}",
            endpoint_with_params(
                with_options(MethodFilter::DELETE),
                layers.authenticated(DeleteUrl::new(links.clone()), STANDARD),
            ),
        )
        .route(
            "/url/delete_urls",
            endpoint(
                with_options(MethodFilter::DELETE),
                layers.authenticated(DeleteUrls::new(links.clone()), STRICT),
            ),
        )
        .route(
            "/url/redirect",
            endpoint(
                with_options(MethodFilter::GET),
                layers.base(RedirectAlias::new(links.clone()), BROWSE).build(),
            ),
        );

    Ok(router)
}

/// `/user` routes.
///
/// - `POST   /user`         - sign in, sets the session cookie
/// - `GET    /user`         - profile of the signed-in user
/// - `DELETE /user`         - delete the account and its links
/// - `DELETE /user/logout`  - clear the session cookie
pub fn user_routes(state: &AppState) -> Result<Router, AppError> {
    let layers = Layers::new(state)?;
    let secure = state.settings.secure_cookies;

    let sign_in = layers.validated::<CreateUserPayload>(
        SignIn::new(state.users.clone(), state.sessions.clone(), secure),
        STRICT,
    );
    let get_user = layers.authenticated(GetUser::new(state.users.clone()), STANDARD);
    let delete_user = layers.authenticated(DeleteUser::new(state.users.clone(), secure), STANDARD);
    let logout = layers.base(Logout::new(secure), STRICT).build();

    // One preflight route per path; the sign-in pipeline answers it.
    let user = endpoint(with_options(MethodFilter::POST), sign_in)
        .merge(endpoint(MethodFilter::GET, get_user))
        .merge(endpoint(MethodFilter::DELETE, delete_user));

    let router = Router::new().route("/user", user).route(
        "/user/logout",
        endpoint(with_options(MethodFilter::DELETE), logout),
    );

    Ok(router)
}
