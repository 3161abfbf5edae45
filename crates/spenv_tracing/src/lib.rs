//! Tracing subscriber setup shared by the spenv binaries.

/// Install the global tracing subscriber.
///
/// Events go to stderr so they never mix with the generated
/// script confirmations on stdout. Level defaults to INFO and
/// is overridable through `RUST_LOG`.
pub fn init_tracing_subscriber() {

    use tracing_subscriber::prelude::*;
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::filter::LevelFilter;

    use std::io::IsTerminal;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer( std::io::stderr )
        .with_ansi( std::io::stderr().is_terminal() )
        .with_target( false )
        .compact()
    ;

    let filter_layer = EnvFilter::builder()
        .with_default_directive( LevelFilter::INFO.into() )
        .from_env_lossy()
    ;

    tracing_subscriber::registry()
        .with( fmt_layer )
        .with( filter_layer )
        .init();

    tracing::trace!( "tracing subscriber installed" );

}
