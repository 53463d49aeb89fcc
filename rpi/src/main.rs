mod dht;

use std::future::Future;

use anyhow::Context;
use heat_alert_common::{CircuitDigestGateway, Config, Indicators, Monitor};
use rppal::gpio::Gpio;

/// Completes on SIGINT (Ctrl+C) or SIGTERM.
///
/// The handlers are installed right away, so a signal that arrives while the
/// first reading or an HTTP request is in progress is not lost.
fn shutdown_signal() -> std::io::Result<impl Future<Output = ()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    Ok(async move {
        tokio::select! {
            _ = interrupt.recv() => {}
            _ = terminate.recv() => {}
        }
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().context("invalid configuration")?;
    log::info!(
        "{} on GPIO{}, alerting above {}C from {:?} (poll every {:?}, cooldown {:?})",
        config.sensor_model,
        config.pins.sensor,
        config.threshold_celsius,
        config.location,
        config.poll_interval,
        config.cooldown
    );
    if config.poll_interval < config.sensor_model.min_read_interval() {
        log::warn!(
            "Poll interval {:?} is shorter than the {} minimum of {:?}, reads will be throttled",
            config.poll_interval,
            config.sensor_model,
            config.sensor_model.min_read_interval()
        );
    }

    // Hardware first: without the lines there is nothing to monitor
    let gpio = Gpio::new().context("failed to open the GPIO controller")?;
    let sensor = dht::Dht::new(&gpio, config.pins.sensor, config.sensor_model)
        .with_context(|| format!("failed to claim sensor pin GPIO{}", config.pins.sensor))?;
    let success = gpio
        .get(config.pins.success)
        .with_context(|| format!("failed to claim success pin GPIO{}", config.pins.success))?
        .into_output_low();
    let failure = gpio
        .get(config.pins.failure)
        .with_context(|| format!("failed to claim failure pin GPIO{}", config.pins.failure))?
        .into_output_low();
    let indicators = Indicators::new(success, failure);

    let gateway = CircuitDigestGateway::new(&config).context("failed to build the HTTP client")?;
    let shutdown = shutdown_signal().context("failed to install signal handlers")?;

    Monitor::new(config, sensor, indicators, gateway)
        .run(shutdown)
        .await;

    Ok(())
}
