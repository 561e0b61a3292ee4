//! Helpers shared by the tests and the command line tool
