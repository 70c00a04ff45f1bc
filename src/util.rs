//! Utility functions used in all other yeonets modules.

use std::io::{self, Read};
use std::path::Path;

use crate::error::{Result, YeonetsError};

use byteordered::byteorder::ReadBytesExt;

/// Check whether the file extension ends with ".gz".
pub fn is_gz_file<P>(path: P) -> bool
where
    P: AsRef<Path>,
{
    path.as_ref()
        .file_name()
        .map(|a| a.to_string_lossy().ends_with(".gz"))
        .unwrap_or(false)
}


/// Read a fixed length zero-terminated byte string of the given length from the input. Embedded '\0' chars are allowed, but not added to the returned String.
pub fn read_fixed_length_string<S>(input: &mut S, len: usize) -> Result<String>
where
    S: Read,
{
    let mut info_line = String::with_capacity(len);
    for _  in 0..len   {
        let cur_char = input.read_u8()? as char;
        if cur_char != '\0'  {
            info_line.push(cur_char);
        }
    }
    Ok(info_line)
}


/// Consume and discard `len` bytes. Used instead of seeking, because we cannot seek in a GZ stream.
pub fn skip_bytes<S>(input: &mut S, len: u64) -> Result<()>
where
    S: Read,
{
    let skipped = io::copy(&mut input.by_ref().take(len), &mut io::sink())?;
    if skipped != len {
        return Err(YeonetsError::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("expected to skip {} bytes, but stream ended after {}", len, skipped),
        )));
    }
    Ok(())
}


#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn gz_files_are_detected_by_name() {
        assert!(is_gz_file("/data/atlas_yeo_7.nii.gz"));
        assert!(!is_gz_file("/data/atlas_yeo_7.nii"));
        assert!(!is_gz_file("/"));
    }

    #[test]
    fn fixed_length_strings_drop_nul_padding() {
        let mut input = Cursor::new(b"n+1\0rest".to_vec());
        let magic = read_fixed_length_string(&mut input, 4).unwrap();
        assert_eq!("n+1", magic);
        assert_eq!(4, input.position());
    }

    #[test]
    fn skipping_past_the_end_is_an_error() {
        let mut input = Cursor::new(vec![0u8; 3]);
        assert!(skip_bytes(&mut input, 2).is_ok());
        assert!(skip_bytes(&mut input, 2).is_err());
    }
}
