use std::fs;
use tempfile::{Builder, NamedTempFile};

#[derive(Debug)]
pub struct TestFile {
    filebinary: &'static [u8],
    suffix: &'static str,
}

impl TestFile {
    /// BindingDB-style export: 10 clean rows plus 6 rows that the default
    /// filter drops (missing fields, unparseable Ki, Ki at or above 10000).
    pub fn bindingdb_01() -> Self {
        Self {
            filebinary: include_bytes!("../data/bindingdb/affinities.csv"),
            suffix: "csv",
        }
    }

    /// Same shape as `bindingdb_01` but without the `Ki (nM)` column.
    pub fn bindingdb_missing_ki() -> Self {
        Self {
            filebinary: include_bytes!("../data/bindingdb/missing_ki.csv"),
            suffix: "csv",
        }
    }

    pub fn create_temp(&self) -> std::io::Result<(String, NamedTempFile)> {
        let temp = Builder::new()
            .suffix(&format!(".{}", self.suffix))
            .tempfile()?;

        fs::write(&temp, self.filebinary)?;
        let path = temp.path().to_string_lossy().into_owned();

        Ok((path, temp))
    }
}
