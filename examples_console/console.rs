use tracing::{error, info, warn};
use tracing_log_layout::{LayoutConfig, LayoutFormat};

fn main() {
    let config = LayoutConfig::with_pattern("%d{%H:%M:%S%.3f} %p [%c] %m");
    let layout = match config.build() {
        Ok(layout) => layout,
        Err(e) => {
            eprintln!("invalid log layout: {}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt().event_format(LayoutFormat::new(layout)).init();

    info!("console example started");
    warn!(attempt = 2, "retrying connection");
    error!(db = "primary", "connection refused");
}
