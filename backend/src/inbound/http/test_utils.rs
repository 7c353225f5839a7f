//! Session helpers for HTTP tests.
//!
//! The middleware uses a fixed key so cookies minted by
//! [`session_cookie_for`] are accepted by any app wrapped with
//! [`test_session_middleware`].

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::{App, HttpResponse, test, web};

use crate::domain::{Error, UserId};
use crate::inbound::http::session::SessionContext;

const TEST_KEY: [u8; 64] = [0x5a; 64];

/// Cookie session middleware matching production settings except for the
/// `Secure` flag, which is off for plain-HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::from(&TEST_KEY[..]))
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Mint a session cookie for `user_id`, as the login service would.
///
/// # Panics
/// Panics if the session middleware fails to issue a cookie.
pub async fn session_cookie_for(user_id: &UserId) -> Cookie<'static> {
    let user_id = user_id.clone();
    let app = test::init_service(App::new().wrap(test_session_middleware()).route(
        "/login",
        web::post().to(move |session: SessionContext| {
            let user_id = user_id.clone();
            async move {
                session.persist_user(&user_id)?;
                Ok::<_, Error>(HttpResponse::NoContent().finish())
            }
        }),
    ))
    .await;
    let res = test::call_service(&app, test::TestRequest::post().uri("/login").to_request()).await;
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie issued")
}
