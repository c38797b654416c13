/*!
Hands assembled [`ClientSettings`] to the official MongoDB driver.

The driver has no knob for some of the settings this crate models, such as socket buffer
sizes, the minimum heartbeat frequency or wait queue sizes. Those are logged at `debug` and
left to the driver's own behavior.
*/
use std::time::Duration;

use mongodb::{
    bson::Document,
    options::{
        Acknowledgment, AuthMechanism, ClientOptions, Credential, ReadConcern, ReadPreference,
        ReadPreferenceOptions, SelectionCriteria, Tls, TlsOptions, WriteConcern,
    },
    Client,
};
use tracing::instrument;

use crate::{error_chain_fmt, ClientSettings, ClusterConnectionMode, MongoCredential, TlsVersion};

const SCHEME: &str = "mongodb://";
const SRV_SCHEME: &str = "mongodb+srv://";

#[derive(thiserror::Error)]
pub enum DriverError {
    #[error("The driver doesn't support the `{0}` authentication mechanism")]
    UnsupportedAuthMechanism(String),
    #[error("The driver rejected the client options")]
    InvalidOptions(#[source] mongodb::error::Error),
}
impl std::fmt::Debug for DriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Converts `settings` into the driver's [`ClientOptions`].
///
/// An SRV host is resolved through the driver's own URI parser, so this needs network access
/// whenever one is configured.
#[instrument(level = "debug", name = "Convert ClientSettings to ClientOptions", skip_all)]
pub async fn to_client_options(settings: &ClientSettings) -> Result<ClientOptions, DriverError> {
    let cluster = settings.cluster_settings();
    let uri = match &cluster.srv_host {
        Some(srv_host) => format!("{}{}", SRV_SCHEME, srv_host),
        None => format!(
            "{}{}",
            SCHEME,
            cluster
                .hosts
                .iter()
                .map(|address| address.to_string())
                .collect::<Vec<_>>()
                .join(",")
        ),
    };
    tracing::trace!("Base URI: {}", &uri);

    let mut options = ClientOptions::parse(uri.as_str()).await.map_err(|e| {
        let err = DriverError::InvalidOptions(e);
        tracing::error!("{}", &err);
        err
    })?;

    options.app_name = settings.application_name().map(str::to_string);
    options.credential = settings.credential().map(to_credential).transpose()?;
    options.selection_criteria = Some(SelectionCriteria::ReadPreference(to_read_preference(
        settings.read_preference(),
    )));
    options.read_concern = to_read_concern(settings.read_concern());
    options.write_concern = Some(to_write_concern(settings.write_concern()));
    options.retry_reads = Some(settings.retry_reads());
    options.retry_writes = Some(settings.retry_writes());

    options.repl_set_name = cluster.required_replica_set_name.clone();
    if cluster.srv_host.is_none() && cluster.mode == ClusterConnectionMode::Single {
        options.direct_connection = Some(true);
    }
    options.local_threshold = Some(cluster.local_threshold);
    options.server_selection_timeout = Some(cluster.server_selection_timeout);

    let socket = settings.socket_settings();
    options.connect_timeout = non_zero(socket.connect_timeout);

    options.heartbeat_freq = Some(settings.server_settings().heartbeat_frequency);

    let pool = settings.connection_pool_settings();
    options.max_pool_size = Some(pool.max_size);
    options.min_pool_size = Some(pool.min_size);
    options.max_idle_time = non_zero(pool.max_connection_idle_time);

    let ssl = settings.ssl_settings();
    options.tls = Some(if ssl.enabled {
        Tls::Enabled(TlsOptions::default())
    } else {
        Tls::Disabled
    });

    log_unsupported(settings);

    Ok(options)
}

/// Creates a driver client from `settings`.
///
/// The driver connects lazily, so this succeeds without a reachable deployment.
#[instrument(level = "debug", name = "Create MongoDB client", skip_all)]
pub async fn create_client(settings: &ClientSettings) -> Result<Client, DriverError> {
    let options = to_client_options(settings).await?;
    Client::with_options(options).map_err(|e| {
        let err = DriverError::InvalidOptions(e);
        tracing::error!("{}", &err);
        err
    })
}

fn to_credential(credential: &MongoCredential) -> Result<Credential, DriverError> {
    let mechanism = credential
        .mechanism()
        .map(|mechanism| {
            mechanism.as_str().parse::<AuthMechanism>().map_err(|_| {
                let err = DriverError::UnsupportedAuthMechanism(mechanism.to_string());
                tracing::error!("{}", &err);
                err
            })
        })
        .transpose()?;

    let mut properties = Document::new();
    for (key, value) in credential.mechanism_properties() {
        properties.insert(key.clone(), value.clone());
    }

    let mut driver_credential = Credential::default();
    driver_credential.username = credential.user_name().map(str::to_string);
    driver_credential.source = Some(credential.source().to_string());
    driver_credential.password = credential.password().map(str::to_string);
    driver_credential.mechanism = mechanism;
    if !properties.is_empty() {
        driver_credential.mechanism_properties = Some(properties);
    }
    Ok(driver_credential)
}

fn to_read_preference(read_preference: crate::ReadPreference) -> ReadPreference {
    let options = ReadPreferenceOptions::default();
    match read_preference {
        crate::ReadPreference::Primary => ReadPreference::Primary,
        crate::ReadPreference::PrimaryPreferred => ReadPreference::PrimaryPreferred { options },
        crate::ReadPreference::Secondary => ReadPreference::Secondary { options },
        crate::ReadPreference::SecondaryPreferred => {
            ReadPreference::SecondaryPreferred { options }
        }
        crate::ReadPreference::Nearest => ReadPreference::Nearest { options },
    }
}

fn to_read_concern(read_concern: crate::ReadConcern) -> Option<ReadConcern> {
    match read_concern {
        crate::ReadConcern::Default => None,
        crate::ReadConcern::Local => Some(ReadConcern::local()),
        crate::ReadConcern::Majority => Some(ReadConcern::majority()),
        crate::ReadConcern::Linearizable => Some(ReadConcern::linearizable()),
        crate::ReadConcern::Snapshot => Some(ReadConcern::snapshot()),
        crate::ReadConcern::Available => Some(ReadConcern::available()),
    }
}

fn to_write_concern(write_concern: &crate::WriteConcern) -> WriteConcern {
    let mut driver_write_concern = WriteConcern::default();
    driver_write_concern.w = write_concern.w.as_ref().map(|w| match w {
        crate::Acknowledgment::Nodes(count) => Acknowledgment::Nodes(*count),
        crate::Acknowledgment::Majority => Acknowledgment::Majority,
        crate::Acknowledgment::Custom(tag) => Acknowledgment::Custom(tag.clone()),
    });
    driver_write_concern.w_timeout = write_concern.w_timeout;
    driver_write_concern.journal = write_concern.journal;
    driver_write_concern
}

fn non_zero(duration: Duration) -> Option<Duration> {
    if duration.is_zero() {
        None
    } else {
        Some(duration)
    }
}

fn log_unsupported(settings: &ClientSettings) {
    for skipped in unsupported_settings(settings) {
        tracing::debug!("{} has no driver equivalent, skipping", skipped);
    }
}

/// Names of the configured values that differ from the defaults but can't be expressed as
/// driver options.
fn unsupported_settings(settings: &ClientSettings) -> Vec<&'static str> {
    let defaults = ClientSettings::default();
    let socket = (settings.socket_settings(), defaults.socket_settings());
    let server = (settings.server_settings(), defaults.server_settings());
    let cluster = (settings.cluster_settings(), defaults.cluster_settings());
    let pool = (
        settings.connection_pool_settings(),
        defaults.connection_pool_settings(),
    );
    let ssl = settings.ssl_settings();

    let checks = [
        (
            socket.0.read_timeout != socket.1.read_timeout,
            "Socket read timeout",
        ),
        (
            socket.0.receive_buffer_size != socket.1.receive_buffer_size
                || socket.0.send_buffer_size != socket.1.send_buffer_size,
            "Socket buffer size",
        ),
        (
            server.0.min_heartbeat_frequency != server.1.min_heartbeat_frequency,
            "Min heartbeat frequency",
        ),
        (
            cluster.0.required_cluster_type != cluster.1.required_cluster_type,
            "Required cluster type",
        ),
        (
            cluster.0.max_wait_queue_size != cluster.1.max_wait_queue_size,
            "Cluster wait queue size",
        ),
        (
            pool.0.max_wait_queue_size != pool.1.max_wait_queue_size,
            "Pool wait queue size",
        ),
        (
            pool.0.max_wait_time != pool.1.max_wait_time,
            "Pool max wait time",
        ),
        (
            pool.0.max_connection_lifetime != pool.1.max_connection_lifetime,
            "Pool max connection lifetime",
        ),
        (
            pool.0.maintenance_initial_delay != pool.1.maintenance_initial_delay
                || pool.0.maintenance_frequency != pool.1.maintenance_frequency,
            "Pool maintenance schedule",
        ),
        (
            ssl.enabled
                && ssl.context.as_ref().map_or(false, |context| {
                    context.protocol_versions() != [TlsVersion::Tls12, TlsVersion::Tls13]
                }),
            "Pinned TLS protocol version",
        ),
        (
            ssl.invalid_hostname_allowed,
            "Allowing invalid hostnames",
        ),
        (
            settings.codec_registry() != defaults.codec_registry(),
            "Custom codec registry",
        ),
        (settings.stream_factory().is_some(), "Stream factory"),
        (
            settings.auto_encryption_settings().is_some(),
            "Auto encryption",
        ),
    ];

    checks
        .into_iter()
        .filter(|(unsupported, _)| *unsupported)
        .map(|(_, name)| name)
        .collect()
}
