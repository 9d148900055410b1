use std::sync::Arc;

use crate::{config::Config, gateway::Gateway, services::Dispatcher, stores::Stores};

#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Ephemeral in-process stores.
    pub stores: Stores,
    /// Live email or mock delivery, fixed at startup.
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn contact_gateway(&self) -> Gateway<'_> {
        Gateway::new(
            "contact",
            self.stores.contact_limiter.as_ref(),
            &self.dispatcher,
            &self.config.contact_from,
        )
    }

    pub fn join_gateway(&self) -> Gateway<'_> {
        Gateway::new(
            "join",
            self.stores.join_limiter.as_ref(),
            &self.dispatcher,
            &self.config.join_from,
        )
    }
}
