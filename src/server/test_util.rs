//! Test helpers shared across server modules.

use std::{
    net::{Ipv4Addr, SocketAddr, TcpListener as StdTcpListener},
    sync::Arc,
};

use rstest::fixture;

use super::{Bound, ReassemblyServer, connection::StreamContext};
use crate::{
    framing::{FramingConfig, HeaderFrameParser},
    reassembly::ReassemblyLimits,
};

#[fixture]
/// Returns a bound [`StdTcpListener`] on a free port for use in tests.
///
/// Keeping the listener bound prevents race conditions where another
/// process could claim the port between discovery and use.
pub fn free_listener() -> StdTcpListener {
    let addr = SocketAddr::new(Ipv4Addr::LOCALHOST.into(), 0);
    StdTcpListener::bind(addr).expect("Failed to bind free port listener")
}

/// Connection context with default framing and no sink or error hook.
#[fixture]
pub fn stream_context() -> Arc<StreamContext> {
    Arc::new(StreamContext {
        parser: HeaderFrameParser::new(&FramingConfig::default()).expect("default framing"),
        limits: ReassemblyLimits::default(),
        sink: None,
        on_error: None,
    })
}

/// Bind a server with default framing to `listener`.
pub fn bind_server(listener: StdTcpListener) -> ReassemblyServer<Bound> {
    ReassemblyServer::new(FramingConfig::default())
        .bind_existing_listener(listener)
        .expect("Failed to bind")
}
