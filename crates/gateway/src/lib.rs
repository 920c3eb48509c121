//! RPC surface for driving setup wizards remotely.
//!
//! The method handlers are transport-independent: a server loop feeds
//! [`methods::MethodContext`]s into the [`methods::MethodRegistry`] and
//! writes back the returned `ResponseFrame`s. Session state lives in
//! [`state::GatewayState`].

pub mod methods;
pub mod state;

pub use {
    methods::{MethodContext, MethodRegistry, MethodResult},
    state::GatewayState,
};
