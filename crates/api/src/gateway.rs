//! One pass of a form submission: rate check, intake, delivery.
//!
//! Both forms run through the same gateway. The intake future parses and
//! validates the request body; it is only polled after the client has passed
//! the rate check, and delivery only happens when it succeeds.

use std::future::Future;

use crate::{
    error::AppError,
    middleware::client_key::ClientKey,
    services::{Delivery, Dispatcher, Notification},
    stores::{RateLimitResult, RateLimiter},
};

pub struct Gateway<'a> {
    form: &'static str,
    limiter: &'a dyn RateLimiter,
    dispatcher: &'a Dispatcher,
    sender: &'a str,
}

impl<'a> Gateway<'a> {
    pub fn new(
        form: &'static str,
        limiter: &'a dyn RateLimiter,
        dispatcher: &'a Dispatcher,
        sender: &'a str,
    ) -> Self {
        Self {
            form,
            limiter,
            dispatcher,
            sender,
        }
    }

    pub async fn submit<N, F>(&self, client: &ClientKey, intake: F) -> Result<Delivery, AppError>
    where
        N: Notification,
        F: Future<Output = Result<N, AppError>>,
    {
        if let RateLimitResult::Exceeded(count) = self.limiter.check(client.as_str()).await {
            tracing::warn!(form = self.form, client = %client, count, "submission rate limited");
            return Err(AppError::RateLimited);
        }

        let notification = intake.await?;

        let delivery = self
            .dispatcher
            .dispatch(self.sender, &notification)
            .await
            .map_err(AppError::Delivery)?;

        tracing::info!(
            form = self.form,
            client = %client,
            mocked = delivery.is_mocked(),
            "submission delivered"
        );

        Ok(delivery)
    }
}
