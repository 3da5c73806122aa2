//! CSV interface: reads settlement scenario files and writes the resulting
//! ledger as a report table.

pub mod command_reader;
pub mod report_writer;
