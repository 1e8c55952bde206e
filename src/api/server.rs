use crate::api::routes;
use crate::Certifier;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub(super) struct AppState {
    pub certifier: Arc<Certifier>,
    pub timeout: Duration,
}

pub fn new(
    addr: SocketAddr,
    certifier: Arc<Certifier>,
) -> impl Future<Output = hyper::Result<()>> {
    let timeout = certifier.config().api_timeout;
    axum::Server::bind(&addr)
        .serve(routes::new(AppState { certifier, timeout }).into_make_service())
}
