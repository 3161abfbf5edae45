use std::process::Command;
use std::process::ExitStatus;

use anyhow::Context;
use anyhow::Result as AnyResult;
use tap::Pipe;
use tracing::debug;
use tracing::trace;

/// Runs command lines through the system shell.
///
/// Command text is passed to `sh -c` verbatim. No quoting or
/// escaping happens on this side, the caller is trusted.
#[ derive( Debug, Clone, Copy ) ]
pub struct ShellExecutor {
    /// Print an `[exe: ..]` trail before running each command.
    pub echo: bool,
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self { echo: true }
    }
}

impl ShellExecutor {

    fn shell_command( cmd: &str ) -> Command {
        let mut shell = Command::new( "sh" );
        shell.arg( "-c" ).arg( cmd );
        shell
    }

    /// Run `cmd` with inherited stdio.
    ///
    /// Returns the exit status without judging it. Whether a
    /// non zero status is an error is up to the caller.
    #[ tracing::instrument( skip_all ) ]
    pub fn run( &self, cmd: &str ) -> AnyResult<ExitStatus> {
        debug!( cmd, "run shell command" );

        if self.echo {
            println!( "[exe: {cmd}]" );
        }

        let status = Self::shell_command( cmd )
            .status()
            .with_context( || format!( r#"Failed to run "{cmd}""# ) )?;

        trace!( ?status );

        Ok( status )
    }

    /// Run `cmd` capturing its output.
    ///
    /// Returns the exit status plus the captured output decoded
    /// as UTF-8, stdout followed by stderr.
    #[ tracing::instrument( skip_all ) ]
    pub fn run_captured( &self, cmd: &str )
        -> AnyResult<( ExitStatus, String )>
    {
        debug!( cmd, "run shell command capturing output" );

        if self.echo {
            println!( "[exe: {cmd}]" );
        }

        let output = Self::shell_command( cmd )
            .output()
            .with_context( || format!( r#"Failed to run "{cmd}""# ) )?;

        let mut text = String::from_utf8_lossy( &output.stdout )
            .into_owned();
        text.push_str( &String::from_utf8_lossy( &output.stderr ) );

        trace!( status = ?output.status, text = %text );

        ( output.status, text ).pipe( Ok )
    }

}


#[ cfg( test ) ]
mod test {
    #![ allow( clippy::unwrap_used ) ]

    use super::*;

    #[ test ]
    fn capture_decoded_output() {
        let executor = ShellExecutor { echo: false };
        let ( status, text ) = executor
            .run_captured( "echo hello" )
            .unwrap();
        assert!( status.success() );
        assert_eq!( text, "hello\n" );
    }

    #[ test ]
    fn capture_includes_stderr() {
        let executor = ShellExecutor { echo: false };
        let ( _, text ) = executor
            .run_captured( "echo out; echo err >&2" )
            .unwrap();
        assert!( text.contains( "out" ) );
        assert!( text.contains( "err" ) );
    }

    #[ test ]
    fn nonzero_status_is_not_an_error() {
        let executor = ShellExecutor { echo: false };
        let status = executor.run( "exit 3" ).unwrap();
        assert!( ! status.success() );
    }

}
