use std::{io::IsTerminal, sync::OnceLock};

use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

/// Maps `-v`/`-q` counts onto a level; warnings show by default.
pub fn level_for(verbose: u8, quiet: u8) -> Level {
    match i16::from(verbose) - i16::from(quiet) {
        i16::MIN..=-1 => Level::ERROR,
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Installs the stderr subscriber. `RUST_LOG` wins over `level`.
pub fn init(level: Level) {
    static INITIALISED: OnceLock<()> = OnceLock::new();

    INITIALISED.get_or_init(|| {
        let use_ansi = std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));
        let subscriber = fmt::fmt()
            .with_env_filter(filter)
            .with_ansi(use_ansi)
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

#[cfg(test)]
mod tests {
    use tracing::Level;

    use super::level_for;

    #[test]
    fn verbosity_levels() {
        assert_eq!(level_for(0, 0), Level::WARN);
        assert_eq!(level_for(1, 0), Level::INFO);
        assert_eq!(level_for(2, 0), Level::DEBUG);
        assert_eq!(level_for(5, 0), Level::TRACE);
        assert_eq!(level_for(0, 1), Level::ERROR);
        assert_eq!(level_for(1, 1), Level::WARN);
    }
}
