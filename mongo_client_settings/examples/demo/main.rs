use std::path::PathBuf;

use mongo_client_settings::{driver, ClientNamespace};
use tracing::subscriber::set_global_default;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_tracing();

    let path = std::env::args().nth(1).map(PathBuf::from).unwrap_or_else(|| {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/client-namespace.json")
    });
    let namespace = ClientNamespace::from_path(&path)?;

    for id in namespace.client_ids() {
        let Some(factory) = namespace.client_factory(id) else {
            continue;
        };
        let settings = match factory.compute_client_settings() {
            Ok(settings) => settings,
            Err(e) => {
                tracing::error!("Client `{}` is misconfigured: {}", id, &e);
                continue;
            }
        };

        let options = driver::to_client_options(&settings).await?;
        println!("{}:", id);
        println!("  hosts:             {:?}", options.hosts);
        println!("  replica set:       {:?}", options.repl_set_name);
        println!("  direct connection: {:?}", options.direct_connection);
        println!("  max pool size:     {:?}", options.max_pool_size);
        println!(
            "  credential user:   {:?}",
            settings.credential().and_then(|c| c.user_name())
        );
    }

    Ok(())
}

fn setup_tracing() {
    // Redirect all `log`'s events to the subscriber
    LogTracer::init().expect("Failed to set logger");
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let formatting_layer =
        BunyanFormattingLayer::new("mongo-client-settings-demo".into(), std::io::stdout);
    let subscriber = Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer);
    set_global_default(subscriber).expect("Failed to set subscriber");
}
