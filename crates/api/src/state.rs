use std::sync::Arc;

use authgate_db::CredentialStore;
use authgate_mail::Mailer;

use crate::auth::gate::{AuthGate, RouteTable};
use crate::auth::jwt::TokenSigner;
use crate::auth::session::SessionRegistry;
use crate::config::ServerConfig;
use crate::error::AppResult;
use crate::middleware::throttle::Throttle;
use crate::proxy::Forwarders;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub store: Arc<dyn CredentialStore>,
    pub mailer: Arc<dyn Mailer>,
    pub signer: Arc<TokenSigner>,
    pub sessions: SessionRegistry,
    pub gate: AuthGate,
    pub forwarders: Arc<Forwarders>,
    pub throttle: Arc<Throttle>,
}

impl AppState {
    /// Wire every component from configuration and the two collaborators.
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn CredentialStore>,
        mailer: Arc<dyn Mailer>,
    ) -> AppResult<Self> {
        let signer = Arc::new(TokenSigner::new(&config.jwt));
        let sessions = SessionRegistry::new(Arc::clone(&store));
        let gate = AuthGate::new(RouteTable::standard(), Arc::clone(&signer), sessions.clone());
        let forwarders = Arc::new(Forwarders::from_config(&config)?);
        let throttle = Arc::new(Throttle::new(config.throttle_limit, config.throttle_window));

        Ok(Self {
            config: Arc::new(config),
            store,
            mailer,
            signer,
            sessions,
            gate,
            forwarders,
            throttle,
        })
    }
}
