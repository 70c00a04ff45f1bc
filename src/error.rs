use quick_error::quick_error;
use std::io::Error as IOError;

quick_error! {
    /// Error type for all error variants originated by this crate.
    #[derive(Debug)]
    pub enum YeonetsError {
        /// Invalid NIfTI file: header size or magic does not match.
        InvalidNiftiFormat {
            display("Invalid NIfTI file")
        }

        /// Valid NIfTI, but a variant we do not read (e.g., separate .hdr/.img pair).
        UnsupportedNiftiFormat(magic: String) {
            display("Unsupported NIfTI variant with magic '{}', only single-file NIfTI-1 (n+1) is supported", magic)
        }

        UnsupportedNiftiDatatype(code: i16) {
            display("Unsupported NIfTI datatype code {}", code)
        }

        ShapeMismatch(expected: Vec<usize>, found: Vec<usize>) {
            display("Volume shapes differ: expected {:?}, found {:?}", expected, found)
        }

        AtlasFileNotFound(description: String) {
            display("No atlas file found: {}", description)
        }

        InvalidLabelValue(value: f64) {
            display("Invalid atlas label value {}", value)
        }

        MissingNetwork(label: usize) {
            display("Network {} has no voxels in the atlas volume", label)
        }

        EmptyNetwork(label: usize) {
            display("Network {} has no finite values in the brain map", label)
        }

        /// Drawing or PNG encoding failed.
        Plot(msg: String) {
            display("Plotting failed: {}", msg)
        }

        Csv(err: csv::Error) {
            from()
            source(err)
            display("CSV error: {}", err)
        }

        /// I/O Error
        Io(err: IOError) {
            from()
            source(err)
            display("I/O error: {}", err)
        }
    }
}

/// Alias type for results originated from this crate.
pub type Result<T> = ::std::result::Result<T, YeonetsError>;
