//! Client-side session commands: log in, log out, and ask the guards where
//! the current session may go.
//!
//! # Usage
//!
//! ```bash
//! gatehouse-cli login -e admin@gmail.com -p admin
//! gatehouse-cli landing
//! gatehouse-cli access --allow admin
//! gatehouse-cli logout
//! ```
//!
//! # Environment Variables
//!
//! - `GATEHOUSE_URL` - Server base URL (default: `http://127.0.0.1:5000`)
//! - `GATEHOUSE_SESSION_FILE` - Where the session is kept (default: `.gatehouse/session.json`)

use std::path::Path;

use chrono::Utc;
use gatehouse_client::{
    AuthContext, ClientError, FileStorage, GuardMachine, GuardState, History, HttpTransport,
    LandingGuard, RoleGuard, RouteGuard,
};
use gatehouse_core::{LoginRequest, Role};
use url::Url;

type Context = AuthContext<HttpTransport, FileStorage>;

fn context(server: &Url, session_file: &Path) -> Result<Context, ClientError> {
    let mut ctx = AuthContext::init(HttpTransport::new(server)?, FileStorage::new(session_file));
    ctx.expire_if_stale(Utc::now())?;
    Ok(ctx)
}

/// Log in and persist the session.
///
/// # Errors
///
/// Returns `ClientError` if the server rejects the credentials, is
/// unreachable, or the session cannot be saved.
pub async fn login(
    server: &Url,
    session_file: &Path,
    email: &str,
    password: &str,
) -> Result<(), ClientError> {
    let mut ctx = context(server, session_file)?;
    let user = ctx.login(&LoginRequest::new(email, password)).await?;

    #[allow(clippy::print_stdout)]
    {
        println!("Logged in as {} ({}), id {}", user.email, user.role, user.id);
    }

    print_state(&evaluate(&ctx, LandingGuard));
    ctx.teardown();
    Ok(())
}

/// Forget the persisted session.
///
/// # Errors
///
/// Returns `ClientError::Storage` if the session file cannot be removed.
pub fn logout(server: &Url, session_file: &Path) -> Result<(), ClientError> {
    let mut ctx = context(server, session_file)?;
    ctx.logout()?;

    #[allow(clippy::print_stdout)]
    {
        println!("Logged out");
    }
    Ok(())
}

/// Print where the landing guard sends the current session.
///
/// # Errors
///
/// Returns `ClientError` if the base URL is invalid or a stale session
/// cannot be removed.
pub fn landing(server: &Url, session_file: &Path) -> Result<(), ClientError> {
    let ctx = context(server, session_file)?;
    print_state(&evaluate(&ctx, LandingGuard));
    Ok(())
}

/// Print whether the current session may enter a route open to `allowed`.
///
/// # Errors
///
/// Returns `ClientError` if the base URL is invalid or a stale session
/// cannot be removed.
pub fn access(server: &Url, session_file: &Path, allowed: &[Role]) -> Result<(), ClientError> {
    let ctx = context(server, session_file)?;
    print_state(&evaluate(&ctx, RoleGuard::new(allowed.iter().copied())));
    Ok(())
}

fn evaluate<G: RouteGuard>(ctx: &Context, guard: G) -> GuardState {
    let mut machine = GuardMachine::new(guard);
    let mut history = History::new();
    machine.observe(ctx.session().as_ref(), &mut history).clone()
}

#[allow(clippy::print_stdout)]
fn print_state(state: &GuardState) {
    match state {
        GuardState::Authorized => println!("authorized"),
        GuardState::Redirecting(redirect) => {
            println!("redirect {} ({:?})", redirect.to, redirect.reason);
        }
        GuardState::Unknown => println!("unknown"),
    }
}
