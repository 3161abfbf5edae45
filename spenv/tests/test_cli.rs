#![ allow( clippy::unwrap_used ) ]
#![ allow( clippy::expect_used ) ]

use assert_fs::prelude::*;
use assert_fs::TempDir;

use std::process::Command;

/// A stand-in spack that answers `find -p <name>` with the
/// usual banner noise and one data row.
const FAKE_SPACK: &str = "\
#!/bin/sh
echo \"==> 1 installed package\"
echo \"-- linux-ubuntu22.04-x86_64 / gcc@11.4.0 --------\"
echo \"$3@1.0   /opt/fake/$3\"
";

/// A stand-in spack that never finds anything.
const EMPTY_SPACK: &str = "\
#!/bin/sh
echo \"==> 0 installed packages\"
";

fn make_main_program() -> Command {
    let exe = std::env!( "CARGO_BIN_EXE_spenv" );
    std::process::Command::new( exe )
}

macro_rules! make_tempdir {
    () => { {
        TempDir::new().expect( "Failed to setup tempdir" )
    } };
}

fn install_fake_spack( top: &TempDir, body: &str ) {
    use std::os::unix::fs::PermissionsExt;

    let spack = top.child( "spack/bin/spack" );
    spack.write_str( body ).unwrap();

    let perm = std::fs::Permissions::from_mode( 0o755 );
    std::fs::set_permissions( spack.path(), perm ).unwrap();
}

fn stdout_of( output: &std::process::Output ) -> String {
    String::from_utf8_lossy( &output.stdout ).into_owned()
}


#[ test ]
fn no_arguments_prints_usage_and_writes_nothing() {
    let top = make_tempdir!();

    let output = make_main_program()
        .current_dir( top.path() )
        .output().unwrap();

    assert!( output.status.success() );
    assert!( stdout_of( &output ).contains( "Usage" ) );
    assert!( ! top.child( "s_env.sh" ).path().exists() );
}


#[ test ]
fn generates_the_env_script() {
    let top = make_tempdir!();
    install_fake_spack( &top, FAKE_SPACK );

    let output = make_main_program()
        .current_dir( top.path() )
        .arg( "zlib" ).arg( "cmake" )
        .output().unwrap();

    assert!( output.status.success() );

    top.child( "s_env.sh" ).assert( "\
        # zlib\n\
        export PATH=/opt/fake/zlib/bin:$PATH\n\
        # cmake\n\
        export PATH=/opt/fake/cmake/bin:$PATH\n" );

    let stdout = stdout_of( &output );
    assert!( stdout.contains( "[exe: " ) );
    assert!( stdout.contains( "[found zlib at /opt/fake/zlib]" ) );
    assert!( stdout.contains( "[found cmake at /opt/fake/cmake]" ) );
    assert!( stdout.contains( "[created " ) );
}


#[ test ]
fn quiet_suppresses_the_exe_trail() {
    let top = make_tempdir!();
    install_fake_spack( &top, FAKE_SPACK );

    let output = make_main_program()
        .current_dir( top.path() )
        .arg( "--quiet" )
        .arg( "zlib" )
        .output().unwrap();

    assert!( output.status.success() );
    assert!( ! stdout_of( &output ).contains( "[exe: " ) );
}


#[ test ]
fn output_flag_redirects_the_script() {
    let top = make_tempdir!();
    install_fake_spack( &top, FAKE_SPACK );

    let output = make_main_program()
        .current_dir( top.path() )
        .arg( "--output" ).arg( "paths.sh" )
        .arg( "zlib" )
        .output().unwrap();

    assert!( output.status.success() );
    assert!( top.child( "paths.sh" ).path().exists() );
    assert!( ! top.child( "s_env.sh" ).path().exists() );
}


#[ test ]
fn unknown_package_aborts_without_a_script() {
    let top = make_tempdir!();
    install_fake_spack( &top, EMPTY_SPACK );

    let output = make_main_program()
        .current_dir( top.path() )
        .arg( "no-such-package" )
        .output().unwrap();

    assert!( ! output.status.success() );
    assert!( stdout_of( &output ).contains( "[ERROR: " ) );
    assert!( ! top.child( "s_env.sh" ).path().exists() );
}


#[ test ]
fn explicit_spack_root_skips_probing() {
    let top = make_tempdir!();
    install_fake_spack( &top, FAKE_SPACK );

    let workdir = top.child( "elsewhere" );
    workdir.create_dir_all().unwrap();

    let output = make_main_program()
        .current_dir( workdir.path() )
        .arg( "--spack-root" ).arg( top.child( "spack" ).path() )
        .arg( "zlib" )
        .output().unwrap();

    assert!( output.status.success() );
    assert!( workdir.child( "s_env.sh" ).path().exists() );
    assert!( ! stdout_of( &output ).contains( "[looking for" ) );
}


// Sourcing the script really does put <path>/bin first.
#[ test ]
fn sourced_script_prepends_to_path() {
    let top = make_tempdir!();
    install_fake_spack( &top, FAKE_SPACK );

    let status = make_main_program()
        .current_dir( top.path() )
        .arg( "zlib" )
        .status().unwrap();
    assert!( status.success() );

    let probe = Command::new( "sh" )
        .current_dir( top.path() )
        .arg( "-c" ).arg( ". ./s_env.sh; printf %s \"$PATH\"" )
        .output().unwrap();

    let path = String::from_utf8_lossy( &probe.stdout );
    assert!( path.starts_with( "/opt/fake/zlib/bin:" ) );
}
