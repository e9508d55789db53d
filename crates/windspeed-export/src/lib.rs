//! Windspeed export deployment
//!
//! Example deployment package for the depkit lifecycle: structured input
//! naming a SharePoint folder (`spFolderpath`) and file (`spFilename`),
//! structured output with a single `output` field.

pub mod action;
pub mod deployment;

pub use action::Action;
pub use deployment::WindspeedExport;

/// Dataset bundled in the deployment package's base directory.
pub const DATASET_FILE: &str = "rws_windspeed_example.csv";

/// Optional dataset in split orientation; replaces the bundled one on upload.
pub const FIELD_INPUT: &str = "input";
pub const FIELD_FOLDER: &str = "spFolderpath";
pub const FIELD_FILE: &str = "spFilename";
pub const FIELD_ACTION: &str = "action";

pub const OUTPUT_FIELD: &str = "output";

/// Rows echoed back in the `preview` part of the output.
pub const PREVIEW_ROWS: usize = 1;

/// Input fields every request must carry.
pub const INPUT_FIELDS: [&str; 2] = [FIELD_FOLDER, FIELD_FILE];
