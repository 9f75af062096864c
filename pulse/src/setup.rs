use pulse_config::Config;

/// Initializes logging from the configuration.
pub fn init_logging(config: &Config) {
    pulse_log::init(config.logging());
}

/// Print spawn infos to the log.
pub fn dump_spawn_infos(config: &Config) {
    if config.path().as_os_str().is_empty() {
        pulse_log::info!("launching pulse without config file");
    } else {
        pulse_log::info!("launching pulse from config {}", config.path().display());
    }

    pulse_log::info!("  topic: {}", config.metrics().topic);
    pulse_log::info!("  max attempts: {}", config.metrics().retry.attempts());
    pulse_log::info!("  log level: {}", config.logging().level);
}
