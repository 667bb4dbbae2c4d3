//! Logging setup for the `log` facade.
//!
//! Level and per-module filters come from the SR_LOG environment variable, using
//! env_logger's filter syntax (e.g. `SR_LOG=debug`, `SR_LOG=split_review::git=trace`).
//! Defaults to `warn`. Output goes to stderr so it never mixes with rows on stdout.

pub const ENV_VAR: &str = "SR_LOG";

/// Install the stderr logger. Calling it twice is harmless.
pub fn init() {
    let _ = env_logger::Builder::from_env(env_logger::Env::new().filter_or(ENV_VAR, "warn"))
        .format_timestamp(None)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_is_harmless() {
        init();
        init();
        log::debug!("still fine");
    }
}
