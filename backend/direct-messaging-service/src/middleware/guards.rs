//! Request guards that make the caller identity a typed handler argument

use std::future::{ready, Ready};

use actix_web::{dev::Payload, Error, FromRequest, HttpRequest};
use uuid::Uuid;

use super::auth::caller_id;

/// The authenticated caller
#[derive(Debug, Clone, Copy)]
pub struct User {
    pub id: Uuid,
}

impl FromRequest for User {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(caller_id(req).map(|id| User { id }).map_err(Error::from))
    }
}
