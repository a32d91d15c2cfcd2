//! Discord: REST for channel lookup and message delivery, the gateway for
//! the login/ready lifecycle.

mod embed;
pub mod gateway;
mod rest;

pub use embed::{Embed, EmbedField, EmbedFooter, MessagePayload};
pub use gateway::{GatewaySession, GATEWAY_URL};
pub use rest::{DiscordClient, API_BASE};
