//! Symbol tables and name resolution.
//!
//! This module binds every identifier reference of a parsed program to the
//! node that declares it. It contains:
//!
//! - `table`: name to declaration maps and the program environment
//! - `scope`: the four scope kinds and the resolution stack
//! - `resolver`: the resolution pass and its result

pub mod resolver;
pub mod scope;
pub mod table;
