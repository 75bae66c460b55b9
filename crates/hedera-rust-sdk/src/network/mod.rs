//! Node selection and channels.
//!
//! [`Network`] owns the address book, a lazily filled cache of one
//! [`Channel`] per node, and the health table used to skip failing nodes.
//! Channels come from a [`ChannelFactory`]; [`HttpChannelFactory`] is the one
//! used by [`Hedera::new`](crate::Hedera::new).

mod channel;
mod http;
mod node;
mod selector;

pub use channel::{Channel, ChannelFactory, PrecheckResponse};
pub use http::{HttpChannel, HttpChannelFactory};
pub use node::NodeDescriptor;
pub use selector::Network;
