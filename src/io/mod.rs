pub mod autosave;
pub mod csv_export;
pub mod csv_import;
pub mod file;

pub use autosave::{Autosave, AutosaveTimer};
pub use csv_export::export_csv;
pub use csv_import::{import_csv, CsvImport};
pub use file::{apply_document, load_document, save_workspace, LoadMode, LoadedDocument};
