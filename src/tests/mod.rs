mod config_tests;
mod report_writer_tests;
mod support;
