//! File-based configuration for the `wirestitch` binary.
//!
//! Settings come from three layers, highest precedence first: command-line
//! [`Overrides`], a TOML file, and built-in defaults. A complete file looks
//! like this:
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 4210
//! workers = 4
//!
//! [framing]
//! enabled = true
//! open = "<header>"
//! close = "</header>"
//!
//! [limits]
//! max_pending_chunks = 1024
//! max_message_bytes = 1048576
//! unindexed = "reject"
//! ```

use std::{
    fs,
    io,
    net::{SocketAddr, ToSocketAddrs},
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    framing::FramingConfig,
    reassembly::{ReassemblyLimits, UnindexedPolicy},
    server::{ReassemblyServer, Unbound},
};

/// Host the server binds when none is configured.
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Port the server binds when none is configured.
pub const DEFAULT_PORT: u16 = 4210;

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The settings file is not valid TOML for [`Settings`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// Settings could not be rendered as TOML.
    #[error("failed to serialise config: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// The configured host and port do not resolve to a socket address.
    #[error("cannot resolve listen address {host}:{port}")]
    Address {
        /// Configured host.
        host: String,
        /// Configured port.
        port: u16,
        /// Resolver failure, if one was reported.
        #[source]
        source: Option<io::Error>,
    },
}

/// Listener settings, the `[server]` table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSettings {
    /// Interface to listen on.
    pub host: String,
    /// TCP port to listen on.
    pub port: u16,
    /// Accept workers; defaults to the available parallelism.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<NonZeroUsize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            workers: None,
        }
    }
}

impl ServerSettings {
    /// Resolve `host:port` to the first matching socket address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Address`] if the host does not resolve.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let address_error = |source| ConfigError::Address {
            host: self.host.clone(),
            port: self.port,
            source,
        };
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| address_error(Some(e)))?
            .next()
            .ok_or_else(|| address_error(None))
    }
}

/// Complete runtime configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Listener settings.
    pub server: ServerSettings,
    /// Header delimiters.
    pub framing: FramingConfig,
    /// Per-connection reassembly bounds.
    pub limits: ReassemblyLimits,
}

/// Values supplied on the command line. `None` keeps the lower layer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Listen host.
    pub host: Option<String>,
    /// Listen port.
    pub port: Option<u16>,
    /// Accept workers.
    pub workers: Option<NonZeroUsize>,
    /// Opening delimiter. Without [`close`](Self::close) the closing
    /// delimiter is derived from it again.
    pub open: Option<String>,
    /// Closing delimiter.
    pub close: Option<String>,
    /// Treat streams as plain text.
    pub no_header: bool,
    /// Pending chunk bound.
    pub max_pending: Option<NonZeroUsize>,
    /// Message size bound.
    pub max_message_bytes: Option<NonZeroUsize>,
    /// Handling for chunks without an index.
    pub unindexed: Option<UnindexedPolicy>,
}

impl Settings {
    /// Parse settings from TOML text. Missing tables and keys take defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use wirestitch::settings::{DEFAULT_HOST, Settings};
    ///
    /// let settings = Settings::from_toml_str("[server]\nport = 9000\n").expect("valid toml");
    /// assert_eq!(settings.server.port, 9000);
    /// assert_eq!(settings.server.host, DEFAULT_HOST);
    /// assert!(settings.framing.enabled);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for invalid TOML or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> { Ok(toml::from_str(text)?) }

    /// Read settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is not valid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Load `path` when given, otherwise start from defaults, then apply
    /// `overrides`.
    ///
    /// # Errors
    ///
    /// Propagates [`Settings::load`] failures.
    pub fn resolve(path: Option<&Path>, overrides: Overrides) -> Result<Self, ConfigError> {
        let mut settings = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        settings.apply(overrides);
        Ok(settings)
    }

    /// Render the settings as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialize`] if rendering fails.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Layer command-line values over the current settings.
    pub fn apply(&mut self, overrides: Overrides) {
        let Overrides {
            host,
            port,
            workers,
            open,
            close,
            no_header,
            max_pending,
            max_message_bytes,
            unindexed,
        } = overrides;

        if let Some(host) = host {
            self.server.host = host;
        }
        if let Some(port) = port {
            self.server.port = port;
        }
        if workers.is_some() {
            self.server.workers = workers;
        }

        if no_header {
            self.framing.enabled = false;
        }
        if let Some(open) = open {
            self.framing.open_delimiter = Some(open);
            if close.is_none() {
                self.framing.close_delimiter = None;
            }
        }
        if close.is_some() {
            self.framing.close_delimiter = close;
        }

        if let Some(limit) = max_pending {
            self.limits.max_pending_chunks = limit;
        }
        if max_message_bytes.is_some() {
            self.limits.max_message_bytes = max_message_bytes;
        }
        if let Some(policy) = unindexed {
            self.limits.unindexed = policy;
        }
    }

    /// Build an unbound server from these settings.
    #[must_use]
    pub fn server(&self) -> ReassemblyServer<Unbound> {
        let server = ReassemblyServer::new(self.framing.clone()).limits(self.limits);
        match self.server.workers {
            Some(workers) => server.workers(workers.get()),
            None => server,
        }
    }
}

#[cfg(test)]
mod tests;
