use healthcheck::{config::RunConfig, run};
use std::process::exit;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let config = match RunConfig::try_parse_args(std::env::args_os()) {
        Ok(config) => config,
        Err(err) => {
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            exit(code);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .compact()
        .init();

    if let Err(err) = run(config).await {
        eprintln!("{:#}", anyhow::Error::from(err));
        exit(1);
    }
}
