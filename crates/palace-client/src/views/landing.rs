use tracing::{debug, warn};

use super::{Route, ViewError, gateway_failure};
use crate::gateway::{BackendGateway, GatewayError};
use crate::models::ExternalIdentity;
use crate::session::SessionContext;

/// `/` dispatcher: decides where a visitor belongs right now.
pub async fn dispatch(session: &SessionContext, gateway: &BackendGateway) -> Route {
    if session.current_token().is_none() {
        return Route::SignIn;
    }
    resolve_onboarding_route(session, gateway).await
}

/// Completed onboarding goes to the dashboard, pending to the wizard.
///
/// A status check that cannot complete is treated as pending; only a 401
/// sends the user back to sign-in.
pub async fn resolve_onboarding_route(session: &SessionContext, gateway: &BackendGateway) -> Route {
    let Some(token) = session.current_token() else {
        return Route::SignIn;
    };

    match gateway.onboarding_status(&token).await {
        Ok(status) if status.completed => Route::Dashboard,
        Ok(_) => Route::Onboarding,
        Err(err @ GatewayError::Unauthorized { .. }) => {
            gateway_failure(session, err).redirect().unwrap_or(Route::SignIn)
        }
        Err(err) => {
            warn!("onboarding status unavailable, treating as pending: {err}");
            Route::Onboarding
        }
    }
}

/// `/auth/signin` completion: exchange the provider identity, then dispatch.
pub async fn sign_in(
    session: &SessionContext,
    gateway: &BackendGateway,
    identity: &ExternalIdentity,
) -> Result<Route, ViewError> {
    let signed_in = session.authenticate(gateway, identity).await?;
    debug!("sign-in complete for {}", signed_in.user.id);

    Ok(resolve_onboarding_route(session, gateway).await)
}
