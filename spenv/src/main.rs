use spenv::exec::ShellExecutor;
use spenv::script;
use spenv::spack::SpackExe;
use spenv::spack::SpackFindParser;

use anyhow::Context;
use anyhow::Result as AnyResult;
use tracing::debug;
use tracing::trace;

use std::path::PathBuf;

/// Generate a sourceable shell script that puts the bin
/// directories of spack packages on PATH.
///
/// For people having bad luck with `spack load`: source one
/// inspectable file instead.
#[ derive( clap::Parser, Debug ) ]
struct CliOpts {
    /// Spack package names to put on PATH, in order.
    packages: Vec<String>,

    /// Explicit spack base directory containing bin/spack.
    /// Skips the candidate probing.
    #[ arg( long, value_name="DIR" ) ]
    spack_root: Option<PathBuf>,

    /// Directory whose spack checkouts are probed when no
    /// --spack-root is given.
    #[ arg( long, value_name="DIR", default_value="." ) ]
    search_root: PathBuf,

    /// Where to write the generated script.
    #[ arg( long, short,
        value_name="FILE",
        default_value=script::DEFAULT_SCRIPT_NAME ) ]
    output: PathBuf,

    /// Don't echo the spack commands being executed.
    #[ arg( long, short ) ]
    quiet: bool,
}

impl CliOpts {
    fn parse() -> Self {
        <Self as clap::Parser>::parse()
    }

    fn print_usage() {
        use clap::CommandFactory;
        let _ = Self::command().print_help();
    }
}


struct App;

impl App {

    #[ tracing::instrument( name="app_run_with", skip_all ) ]
    fn run_with( cliopts: CliOpts ) -> AnyResult<()> {
        trace!( ?cliopts );

        let spack = match &cliopts.spack_root {
            Some( base ) => SpackExe::from_base( base )?,
            None => SpackExe::locate( &cliopts.search_root )?,
        };

        debug!( exe = ?spack.path() );

        let executor = ShellExecutor { echo: ! cliopts.quiet };
        let parser = SpackFindParser;

        // Sequential on purpose. The first failed lookup aborts
        // the run before anything is written.
        let mut pkgs = Vec::with_capacity( cliopts.packages.len() );
        for name in &cliopts.packages {
            let record = spack.find_package( &executor, &parser, name )?;
            pkgs.push( record );
        }

        script::write_env_script( &pkgs, &cliopts.output )
            .context( "Failed to write the env script" )?;

        Ok(())
    }

}


fn main() {
    spenv_tracing::init_tracing_subscriber();

    trace!( "Parse command line options" );
    let cliopts = CliOpts::parse();

    if cliopts.packages.is_empty() {
        CliOpts::print_usage();
        return;
    }

    let _ = App::run_with( cliopts )
        .inspect_err( |err| {
            println!( "[ERROR: {err:#}]" );
            std::process::exit( 1 )
        } )
    ;
}
