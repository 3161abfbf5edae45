//! Query spack for the install paths of named packages and
//! generate a sourceable script that puts their bin
//! directories on PATH.

pub mod exec;
pub mod script;
pub mod spack;
