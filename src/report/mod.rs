//! Result files and console output.

pub mod csv_output;
pub mod generator;

pub use csv_output::{write_csv, ConsolidatedRow, ReasonCountRow};
pub use generator::{
    generate_compensation_report, generate_delivery_summary, generate_json_report, render_table,
    write_text_report,
};
