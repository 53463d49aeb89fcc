mod logpin;

use std::future::Future;

use anyhow::Context;
use heat_alert_common::{
    CircuitDigestGateway, Config, DryRunGateway, DummySensor, Indicators, Monitor, SmsGateway,
};
use logpin::LogPin;

/// Values that let the simulator start without any environment.
fn sim_default(key: &str) -> Option<String> {
    match key {
        "HEAT_ALERT_API_KEY" => Some("dry-run".into()),
        "HEAT_ALERT_MOBILE" => Some("910000000000".into()),
        _ => None,
    }
}

/// Completes on Ctrl+C. The handler is installed before this returns, so an
/// interrupt during the first reading still goes through the release path.
#[cfg(unix)]
fn shutdown_signal() -> std::io::Result<impl Future<Output = ()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    Ok(async move {
        interrupt.recv().await;
    })
}

#[cfg(windows)]
fn shutdown_signal() -> std::io::Result<impl Future<Output = ()>> {
    let mut interrupt = tokio::signal::windows::ctrl_c()?;
    Ok(async move {
        interrupt.recv().await;
    })
}

async fn run<G: SmsGateway>(config: Config, gateway: G) -> anyhow::Result<()> {
    let sensor = DummySensor::new().context("failed to load the dummy readings")?;
    let indicators = Indicators::new(LogPin::new("green"), LogPin::new("red"));
    let shutdown = shutdown_signal().context("failed to install the Ctrl+C handler")?;

    Monitor::new(config, sensor, indicators, gateway)
        .run(shutdown)
        .await;
    Ok(())
}

/// Runs the monitor loop against a scripted sensor and console indicators.
///
/// If `HEAT_ALERT_API_KEY` is set, alerts go to the real gateway, otherwise
/// they are only logged.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let live = std::env::var("HEAT_ALERT_API_KEY").is_ok();
    // A live run needs a real mobile number, so the fallbacks only apply to dry runs
    let config = Config::from_lookup(|key| {
        std::env::var(key)
            .ok()
            .or_else(|| if live { None } else { sim_default(key) })
    })
    .context("invalid configuration")?;

    if live {
        let gateway =
            CircuitDigestGateway::new(&config).context("failed to build the HTTP client")?;
        run(config, gateway).await
    } else {
        log::info!("HEAT_ALERT_API_KEY is not set, alerts will not be sent");
        run(config, DryRunGateway).await
    }
}
