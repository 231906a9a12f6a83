//! Gateway - TCP/TLS listener that accepts incoming connections.
//!
//! The Gateway binds a socket and spawns a Connection task for each
//! incoming client. When TLS is configured the listener is TLS-only.

use crate::config::TlsConfig;
use crate::network::Connection;
use crate::state::client::{ClientHandle, ClientId};
use crate::state::coordinator::CoordinatorHandle;
use rustls_pemfile::{certs, private_key};
use std::io::{BufReader, Cursor};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use tokio_rustls::rustls::ServerConfig;
use tokio_rustls::rustls::pki_types::CertificateDer;
use tracing::{error, info, instrument, warn};

/// The Gateway accepts incoming TCP/TLS connections and spawns handlers.
pub struct Gateway {
    listener: TcpListener,
    tls: Option<TlsAcceptor>,
    coordinator: CoordinatorHandle,
    hostname: Arc<str>,
}

impl Gateway {
    /// Bind the gateway to the specified address.
    pub async fn bind(
        addr: SocketAddr,
        tls_config: Option<&TlsConfig>,
        coordinator: CoordinatorHandle,
        hostname: Arc<str>,
    ) -> anyhow::Result<Self> {
        let tls = tls_config.map(Self::load_tls).transpose()?;
        let listener = TcpListener::bind(addr).await?;
        let local = listener.local_addr()?;
        if tls.is_some() {
            info!(address = %local, "TLS listener bound");
        } else {
            info!(address = %local, "Plaintext listener bound");
        }

        Ok(Self {
            listener,
            tls,
            coordinator,
            hostname,
        })
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Load TLS certificates and create TlsAcceptor.
    fn load_tls(config: &TlsConfig) -> anyhow::Result<TlsAcceptor> {
        let cert_file = std::fs::read(&config.cert_path)?;
        let cert_reader = &mut BufReader::new(Cursor::new(cert_file));
        let certs: Vec<CertificateDer> = certs(cert_reader).collect::<Result<Vec<_>, _>>()?;

        if certs.is_empty() {
            anyhow::bail!("No certificates found in {}", config.cert_path.display());
        }

        let key_file = std::fs::read(&config.key_path)?;
        let key_reader = &mut BufReader::new(Cursor::new(key_file));
        let Some(key) = private_key(key_reader)? else {
            anyhow::bail!("No private keys found in {}", config.key_path.display());
        };

        let tls_config = ServerConfig::builder()
            .with_no_client_auth()
            .with_single_cert(certs, key)?;

        Ok(TlsAcceptor::from(Arc::new(tls_config)))
    }

    /// Run the gateway, accepting connections forever.
    #[instrument(skip(self), name = "gateway")]
    pub async fn run(self) -> anyhow::Result<()> {
        let mut next_id: ClientId = 0;
        loop {
            let (stream, addr) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                    continue;
                }
            };
            next_id += 1;
            let id = next_id;
            info!(client = id, %addr, "Connection accepted");

            let (handle, outbound) = ClientHandle::new(id, addr, Arc::clone(&self.hostname));
            let coordinator = self.coordinator.clone();

            match &self.tls {
                Some(acceptor) => {
                    let acceptor = acceptor.clone();
                    tokio::spawn(async move {
                        match acceptor.accept(stream).await {
                            Ok(tls_stream) => {
                                Connection::new(handle, outbound, tls_stream, coordinator)
                                    .run()
                                    .await;
                            }
                            Err(e) => {
                                warn!(client = id, %addr, error = %e, "TLS handshake failed");
                            }
                        }
                    });
                }
                None => {
                    tokio::spawn(Connection::new(handle, outbound, stream, coordinator).run());
                }
            }
        }
    }
}
