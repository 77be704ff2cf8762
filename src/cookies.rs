// src/cookies.rs
//! Cookies: [`Cookie`], [`CookieJar`], [`CookieStore`] and the in-memory backends
//! used by the native cookie facility.

mod cookie;
mod cookie_jar;
mod store;

pub use cookie::Cookie;
pub use cookie_jar::CookieJar;
pub use cookie_jar::CookieJarHandle;
pub use cookie_jar::DefaultCookieJar;

pub use store::CookieStore;
pub use store::CookieStoreHandle;
pub use store::JsonCookieStore;
