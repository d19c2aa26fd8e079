use crate::di::build_dispatcher;
use splitroute_application::use_cases::DispatcherHandle;
use splitroute_domain::{CliOverrides, Config};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Rebuilds the dispatcher from the config file on every SIGHUP. A failed
/// reload keeps the running dispatcher.
pub fn spawn_reload_on_sighup(
    dispatcher: Arc<DispatcherHandle>,
    config_path: Option<String>,
    overrides: CliOverrides,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            let mut hangup = match signal(SignalKind::hangup()) {
                Ok(hangup) => hangup,
                Err(e) => {
                    error!(error = %e, "Failed to install SIGHUP handler, reload disabled");
                    return;
                }
            };

            while hangup.recv().await.is_some() {
                info!("SIGHUP received, reloading configuration");
                match reload(config_path.as_deref(), overrides.clone()) {
                    Ok(next) => {
                        dispatcher.replace(next);
                        info!("Dispatcher reloaded");
                    }
                    Err(e) => error!(error = %e, "Reload failed, keeping current dispatcher"),
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = (dispatcher, config_path, overrides);
        }
    })
}

fn reload(
    path: Option<&str>,
    overrides: CliOverrides,
) -> anyhow::Result<splitroute_application::use_cases::Dispatcher> {
    let config = Config::load(path, overrides)?;
    config.validate()?;
    build_dispatcher(&config)
}
