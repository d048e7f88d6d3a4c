use tracing::Level;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

pub fn tracing_init(level: Level) {
    let subscriber = tracing_subscriber::fmt()
        .with_file(false)
        .with_line_number(false)
        .with_thread_names(false)
        .with_thread_ids(true)
        .with_target(false)
        .with_max_level(level)
        .with_timer(ShortTime)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("a global tracing subscriber is already installed");
    }
}

/// Wall-clock time of day, without the date.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct ShortTime;

impl FormatTime for ShortTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%H:%M:%S%.3f"))
    }
}
