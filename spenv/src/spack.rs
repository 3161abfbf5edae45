use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use itertools::Itertools;
use tap::Pipe;
use tracing::debug;
use tracing::trace;

use crate::exec::ShellExecutor;

/// Subdirectories probed for a spack checkout, in priority
/// order. The uberenv staging layout wins over a plain
/// top-level checkout.
const SPACK_CANDIDATES: &[ &str ] = &[ "uberenv_libs/spack", "spack" ];

/// Prefixes of spack banner and separator lines, which never
/// carry an install path.
const BANNER_PREFIXES: &[ &str ] = &[ "==>", "--" ];


#[ derive( thiserror::Error, Debug ) ]
pub enum LocateError {
    #[ error( "failed to find spack directory, probed: {probed}" ) ]
    ToolNotFound { probed: String },

    #[ error( r#"failed to find package named "{name}""# ) ]
    PackageNotFound { name: String },

    #[ error( transparent ) ]
    Exec( #[ from ] anyhow::Error ),
}


/// A package name paired with the install path spack
/// reported for it. The path is taken at face value and
/// never checked for existence.
#[ derive( Debug, Clone, PartialEq, Eq ) ]
pub struct PackageRecord {
    pub name: String,
    pub path: String,
}


/// Strategy for digging an install path out of the package
/// manager's query output. Swap the implementation if the
/// output layout ever changes.
pub trait FindParser {
    /// The install path found in `output`, or None when no
    /// line qualifies as a data line.
    fn install_path<'o>( &self, output: &'o str ) -> Option<&'o str>;
}

/// Parser for the `spack find -p` layout: any number of
/// banner and separator lines, then one row per package whose
/// last column is the install prefix.
#[ derive( Debug, Default, Clone, Copy ) ]
pub struct SpackFindParser;

impl FindParser for SpackFindParser {
    fn install_path<'o>( &self, output: &'o str ) -> Option<&'o str> {
        output.lines()
            .map( str::trim )
            .filter( |line| ! line.is_empty() )
            .find( |line| {
                ! BANNER_PREFIXES.iter()
                    .any( |prefix| line.starts_with( prefix ) )
            } )
            .and_then( |line| line.split_whitespace().last() )
    }
}


/// A located spack executable.
#[ derive( Debug, Clone ) ]
pub struct SpackExe {
    exe: PathBuf,
}

impl SpackExe {

    /// Use the executable under an explicit spack base
    /// directory, which must contain `bin/spack`.
    #[ tracing::instrument ]
    pub fn from_base( base: &Path ) -> Result<Self, LocateError> {
        let exe = base.join( "bin" ).join( "spack" )
            .pipe( std::path::absolute )
            .context( "Failed to resolve the spack executable path" )?;

        debug!( ?exe );

        if ! exe.is_file() {
            return Err( LocateError::ToolNotFound {
                probed: exe.display().to_string()
            } )
        }

        Ok( Self { exe } )
    }

    /// Probe the candidate checkouts under `search_root` in
    /// fixed order. The first existing directory wins.
    #[ tracing::instrument ]
    pub fn locate( search_root: &Path ) -> Result<Self, LocateError> {
        for candidate in SPACK_CANDIDATES {
            let dir = search_root.join( candidate )
                .pipe( std::path::absolute )
                .context( "Failed to resolve a candidate directory" )?;

            println!( "[looking for spack directory at: {}]", dir.display() );

            if dir.is_dir() {
                println!( "[FOUND spack directory at: {}]", dir.display() );
                let exe = dir.join( "bin" ).join( "spack" );
                return Ok( Self { exe } )
            }
        }

        let probed = SPACK_CANDIDATES.iter()
            .map( |candidate| search_root.join( candidate )
                .display()
                .to_string() )
            .join( ", " );

        Err( LocateError::ToolNotFound { probed } )
    }

    pub fn path( &self ) -> &Path {
        &self.exe
    }

    /// Query `spack find -p` for one package and extract its
    /// install path with `parser`.
    #[ tracing::instrument( skip( executor, parser ) ) ]
    pub fn find_package(
        &self,
        executor: &ShellExecutor,
        parser: &impl FindParser,
        name: &str,
    )
        -> Result<PackageRecord, LocateError>
    {
        let cmd = format!( "{} find -p {name}", self.exe.display() );

        let ( status, output ) = executor.run_captured( &cmd )?;
        trace!( ?status, output = %output );

        match parser.install_path( &output ) {
            Some( path ) => {
                let record = PackageRecord {
                    name: name.to_owned(),
                    path: path.to_owned(),
                };
                debug!( ?record, "package resolved" );
                Ok( record )
            }
            None => Err( LocateError::PackageNotFound {
                name: name.to_owned()
            } ),
        }
    }

}


#[ cfg( test ) ]
mod test {
    #![ allow( clippy::unwrap_used ) ]

    use super::*;

    use assert_fs::prelude::*;
    use assert_fs::TempDir;

    #[ test ]
    fn parse_skips_banners() {
        let output = "\
            ==> 1 installed package\n\
            -- linux-ubuntu22.04-x86_64 / gcc@11.4.0 --------\n\
            foo@1.0   /opt/foo\n";
        let path = SpackFindParser.install_path( output );
        assert_eq!( path, Some( "/opt/foo" ) );
    }

    #[ test ]
    fn parse_skips_blank_lines() {
        let output = "\n   \n==> banner\n\nbar@2.1 /opt/bar\n";
        let path = SpackFindParser.install_path( output );
        assert_eq!( path, Some( "/opt/bar" ) );
    }

    #[ test ]
    fn parse_banner_only_output_is_none() {
        let output = "==> 0 installed packages\n--\n";
        assert_eq!( SpackFindParser.install_path( output ), None );
    }

    #[ test ]
    fn locate_prefers_uberenv_layout() {
        let top = TempDir::new().unwrap();
        top.child( "uberenv_libs/spack" ).create_dir_all().unwrap();
        top.child( "spack" ).create_dir_all().unwrap();

        let found = SpackExe::locate( top.path() ).unwrap();

        assert_eq! (
            found.path(),
            top.path().join( "uberenv_libs/spack/bin/spack" )
        );
    }

    #[ test ]
    fn locate_falls_back_to_top_level() {
        let top = TempDir::new().unwrap();
        top.child( "spack" ).create_dir_all().unwrap();

        let found = SpackExe::locate( top.path() ).unwrap();

        assert_eq!( found.path(), top.path().join( "spack/bin/spack" ) );
    }

    #[ test ]
    fn locate_without_any_candidate_fails() {
        let top = TempDir::new().unwrap();
        let result = SpackExe::locate( top.path() );
        assert!( matches! (
            result,
            Err( LocateError::ToolNotFound { .. } )
        ) );
    }

    #[ test ]
    fn explicit_base_needs_the_executable() {
        let top = TempDir::new().unwrap();

        let missing = SpackExe::from_base( top.path() );
        assert!( matches! (
            missing,
            Err( LocateError::ToolNotFound { .. } )
        ) );

        top.child( "bin/spack" ).touch().unwrap();
        let found = SpackExe::from_base( top.path() ).unwrap();
        assert_eq!( found.path(), top.path().join( "bin/spack" ) );
    }

}
