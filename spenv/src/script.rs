use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result as AnyResult;
use tracing::debug;

use crate::spack::PackageRecord;

/// Default name of the generated script, written into the
/// current directory unless overridden on the command line.
pub const DEFAULT_SCRIPT_NAME: &str = "s_env.sh";

/// Render the script body. One `# name` comment plus one PATH
/// export per record, preserving input order.
fn render( pkgs: &[ PackageRecord ] ) -> String {
    let mut body = String::new();
    for pkg in pkgs {
        body.push_str( &format!( "# {}\n", pkg.name ) );
        body.push_str (
            &format!( "export PATH={}/bin:$PATH\n", pkg.path )
        );
    }
    body
}

/// Write the PATH setup script for `pkgs` to `output`,
/// overwriting whatever was there before.
///
/// Returns the absolute path of the written file.
#[ tracing::instrument( skip( pkgs ) ) ]
pub fn write_env_script( pkgs: &[ PackageRecord ], output: &Path )
    -> AnyResult<PathBuf>
{
    debug!( packages = pkgs.len(), "write env script" );

    for pkg in pkgs {
        println!( "[found {} at {}]", pkg.name, pkg.path );
    }

    std::fs::write( output, render( pkgs ) )
        .with_context( || format! (
            "Failed to write {}", output.display()
        ) )?;

    let written = std::path::absolute( output )
        .context( "Failed to resolve the path of the written script" )?;

    println!( "[created {}]", written.display() );

    Ok( written )
}


#[ cfg( test ) ]
mod test {
    #![ allow( clippy::unwrap_used ) ]

    use super::*;

    use assert_fs::prelude::*;
    use assert_fs::TempDir;

    fn record( name: &str, path: &str ) -> PackageRecord {
        PackageRecord {
            name: name.to_owned(),
            path: path.to_owned(),
        }
    }

    #[ test ]
    fn one_comment_and_one_export_per_package() {
        let top = TempDir::new().unwrap();
        let script = top.child( "s_env.sh" );

        let pkgs = [
            record( "zlib", "/opt/zlib" ),
            record( "cmake", "/opt/cmake" ),
        ];

        write_env_script( &pkgs, script.path() ).unwrap();

        script.assert( "\
            # zlib\n\
            export PATH=/opt/zlib/bin:$PATH\n\
            # cmake\n\
            export PATH=/opt/cmake/bin:$PATH\n" );
    }

    #[ test ]
    fn existing_file_is_overwritten() {
        let top = TempDir::new().unwrap();
        let script = top.child( "s_env.sh" );
        script.write_str( "stale contents\n" ).unwrap();

        let pkgs = [ record( "p", "/a/b" ) ];
        write_env_script( &pkgs, script.path() ).unwrap();

        script.assert( "# p\nexport PATH=/a/b/bin:$PATH\n" );
    }

    #[ test ]
    fn returns_the_absolute_path() {
        let top = TempDir::new().unwrap();
        let script = top.child( "out.sh" );

        let pkgs = [ record( "p", "/a/b" ) ];
        let written = write_env_script( &pkgs, script.path() ).unwrap();

        assert!( written.is_absolute() );
        assert_eq!( written, script.path() );
    }

}
