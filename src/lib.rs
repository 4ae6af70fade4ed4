pub mod check;
pub mod config;
mod error;

use check::Probe;
use config::RunConfig;
use reqwest::{Certificate, Client, ClientBuilder};
use tracing::{debug, warn};

pub use error::{CheckError, ConfigError};

fn client_builder() -> ClientBuilder {
    Client::builder().pool_max_idle_per_host(0)
}

/// Builds the client trusting the given DER roots.
///
/// Unusable certificates never fail the check: a plain `http` target does not need them.
fn build_client<'a>(
    certificates: impl IntoIterator<Item = &'a [u8]>,
) -> Result<Client, CheckError> {
    let mut http_builder = client_builder();
    for cert in certificates {
        match Certificate::from_der(cert) {
            Ok(cert) => http_builder = http_builder.add_root_certificate(cert),
            Err(error) => warn!(reason = %error, "Skipping unparsable system certificate"),
        }
    }
    match http_builder.build() {
        Ok(client) => Ok(client),
        Err(error) => {
            warn!(reason = %error, "Could not use system certificates, continuing without them");
            client_builder()
                .build()
                .map_err(|source| CheckError::Client { source })
        }
    }
}

/// Plain client for a single request: no pooling, library default timeouts
/// and redirects, operating system trust roots.
pub fn setup_client() -> Result<Client, CheckError> {
    let certificates = match rustls_native_certs::load_native_certs() {
        Ok(certificates) => certificates,
        Err(error) => {
            warn!(reason = %error, "Could not load system certificates");
            Vec::new()
        }
    };
    build_client(certificates.iter().map(|cert| cert.as_ref()))
}

/// Runs one health check. `Ok` means the endpoint answered with the expected status.
pub async fn run(config: RunConfig) -> Result<(), CheckError> {
    let probe: Probe = config.plan()?;
    let http = setup_client()?;
    let result = probe.execute(&http).await;
    if let Err(err) = &result {
        debug!(pre_flight = err.is_pre_flight(), reason = ?err, "Health check failed");
    }
    result
}
