pub mod csv_export;
pub mod target_list;

pub use target_list::TargetListSink;
