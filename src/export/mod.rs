mod csv_writer;

pub use csv_writer::{
    read_stances, read_targets, write_targets, StanceRow, StanceWriter, TargetRow, TargetsWriter,
    STANCE_COLUMNS, TARGET_COLUMNS,
};
