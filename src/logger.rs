use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::Context;
use time::{format_description, OffsetDateTime, UtcOffset};
use tracing::{subscriber::set_global_default, Level};
use tracing_subscriber::{
    fmt::{time::OffsetTime, writer::BoxMakeWriter},
    FmtSubscriber,
};

/// Installs a global file logger writing to a timestamped file in `dir` (working directory if
/// `None`). Returns the path of the log file.
pub fn init_logger(dir: Option<&Path>) -> anyhow::Result<PathBuf> {
    let file_name = log_file_name()?;
    let path = match dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("could not create log directory {}", dir.display()))?;
            dir.join(file_name)
        }
        None => PathBuf::from(file_name),
    };
    let file = File::create(&path)
        .with_context(|| format!("could not create log file {}", path.display()))?;
    let writer = BoxMakeWriter::new(file);

    let local_offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let timer = OffsetTime::new(
        local_offset,
        format_description::parse("[year]-[month]-[day] [hour]:[minute]:[second]")?,
    );

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::TRACE)
        .with_ansi(false)
        .with_timer(timer)
        .with_writer(writer)
        .finish();

    set_global_default(subscriber).context(
        "could not set global default tracing subscriber, consider disabling logs if you are already setting one",
    )?;
    Ok(path)
}

fn log_file_name() -> anyhow::Result<String> {
    let format = format_description::parse("[year]-[month]-[day]_[hour]:[minute]:[second]_log.txt")?;
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    Ok(now.format(&format)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_name_is_timestamped() {
        let name = log_file_name().unwrap();
        assert!(name.ends_with("_log.txt"), "{name}");
        // 2025-01-31_12:00:00_log.txt
        assert_eq!(name.len(), "2025-01-31_12:00:00_log.txt".len());
    }
}
