use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Initialise logging. Without `debug` the level is forced to `info` even if
/// `RUST_LOG` is set; with `debug` the default is `debug` and `RUST_LOG` can
/// override it. When `log_file` is given, output goes to that file instead of
/// stdout.
pub fn init(debug: bool, log_file: Option<PathBuf>) {
    let level = if debug { "debug" } else { "info" };

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log_file.as_deref().and_then(split_log_path) {
        Some((dir, file_name)) => {
            if let Err(err) = std::fs::create_dir_all(&dir) {
                eprintln!("failed to create log directory {}: {err}", dir.display());
            }
            let appender = tracing_appender::rolling::never(dir, file_name);
            let _ = builder.with_ansi(false).with_writer(appender).try_init();
        }
        None => {
            let _ = builder.try_init();
        }
    }
}

fn split_log_path(path: &std::path::Path) -> Option<(PathBuf, std::ffi::OsString)> {
    let file_name = path.file_name()?.to_os_string();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Some((dir, file_name))
}

#[cfg(test)]
mod tests {
    use super::split_log_path;
    use std::path::{Path, PathBuf};

    #[test]
    fn bare_file_name_logs_into_working_directory() {
        let (dir, name) = split_log_path(Path::new("pets.log")).expect("split");
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(name, "pets.log");
    }

    #[test]
    fn directory_only_path_has_no_file() {
        assert!(split_log_path(Path::new("/")).is_none());
    }
}
