/// Debug record through a provider's logger, dropped unless `config.debug` is set
macro_rules! debug {
    ($provider:expr, $($arg:tt)+) => {
        $provider.debug(format_args!($($arg)+))
    };
}

/// Warning record through a provider's logger
macro_rules! warn {
    ($provider:expr, $($arg:tt)+) => {
        $provider.warn(format_args!($($arg)+))
    };
}
