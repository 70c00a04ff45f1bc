//! Functions for reading and writing brain volumes in NIfTI-1 files.
//!
//! Only the single-file variant (`.nii`, magic `n+1`) is supported, optionally GZip
//! compressed (`.nii.gz`). Both byte orders are detected from the header size field.
//! Voxel values are always returned as `f64`, with the scaling from the header already applied.

use byteordered::{ByteOrdered, Endianness};
use flate2::bufread::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::{debug, warn};
use ndarray::{Array3, ShapeBuilder};

use std::convert::TryFrom;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Write};
use std::path::Path;

use crate::error::{Result, YeonetsError};
use crate::util::{is_gz_file, read_fixed_length_string, skip_bytes};

pub const NIFTI1_HEADER_SIZE: i32 = 348;
pub const NIFTI2_HEADER_SIZE: i32 = 540;
pub const NIFTI1_MAGIC_SINGLE_FILE: &str = "n+1";
pub const NIFTI1_MAGIC_PAIR: &str = "ni1";
pub const NIFTI1_DEFAULT_VOX_OFFSET: f32 = 352.0; // Header plus the 4 byte extension flag.

pub const DT_UINT8: i16 = 2;
pub const DT_INT16: i16 = 4;
pub const DT_INT32: i16 = 8;
pub const DT_FLOAT32: i16 = 16;
pub const DT_FLOAT64: i16 = 64;
pub const DT_INT8: i16 = 256;
pub const DT_UINT16: i16 = 512;
pub const DT_UINT32: i16 = 768;
pub const DT_INT64: i16 = 1024;
pub const DT_UINT64: i16 = 1280;

/// Models the header of a NIfTI-1 file. Fields which are irrelevant for reading the voxel data are skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct NiftiHeader {
    pub sizeof_hdr: i32,
    pub dim: [i16; 8],
    pub intent_code: i16,
    pub datatype: i16,
    pub bitpix: i16,
    pub pixdim: [f32; 8],
    pub vox_offset: f32,
    pub scl_slope: f32,
    pub scl_inter: f32,
    pub descrip: String,
    pub qform_code: i16,
    pub sform_code: i16,
    pub srow_x: [f32; 4],
    pub srow_y: [f32; 4],
    pub srow_z: [f32; 4],
    pub magic: String,
    pub endianness: Endianness, // Not stored in the file, detected from `sizeof_hdr`.
}


impl Default for NiftiHeader {
    fn default() -> NiftiHeader {
        NiftiHeader {
            sizeof_hdr: NIFTI1_HEADER_SIZE,
            dim: [3, 1, 1, 1, 1, 1, 1, 1],
            intent_code: 0,
            datatype: DT_FLOAT32,
            bitpix: 32,
            pixdim: [1.0; 8],
            vox_offset: NIFTI1_DEFAULT_VOX_OFFSET,
            scl_slope: 1.0,
            scl_inter: 0.0,
            descrip: String::new(),
            qform_code: 0,
            sform_code: 0,
            srow_x: [1.0, 0.0, 0.0, 0.0],
            srow_y: [0.0, 1.0, 0.0, 0.0],
            srow_z: [0.0, 0.0, 1.0, 0.0],
            magic: String::from(NIFTI1_MAGIC_SINGLE_FILE),
            endianness: Endianness::Little,
        }
    }
}


impl NiftiHeader {

    /// Read a NIfTI header from a file.
    /// If the file's name ends with ".gz", the file is assumed to need GZip decoding.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<NiftiHeader> {
        let gz = is_gz_file(&path);
        let mut file = BufReader::new(File::open(path)?);
        if gz {
            NiftiHeader::from_reader(&mut GzDecoder::new(file))
        } else {
            NiftiHeader::from_reader(&mut file)
        }
    }


    /// Read a NIfTI header from the given byte stream.
    /// It is assumed that the input is currently at the start of the header.
    /// Exactly 348 bytes are consumed.
    pub fn from_reader<S>(input: &mut S) -> Result<NiftiHeader>
    where
        S: Read,
    {
        let mut raw = [0u8; NIFTI1_HEADER_SIZE as usize];
        input.read_exact(&mut raw)?;

        let size_bytes = [raw[0], raw[1], raw[2], raw[3]];
        let endianness = if i32::from_le_bytes(size_bytes) == NIFTI1_HEADER_SIZE {
            Endianness::Little
        } else if i32::from_be_bytes(size_bytes) == NIFTI1_HEADER_SIZE {
            Endianness::Big
        } else if i32::from_le_bytes(size_bytes) == NIFTI2_HEADER_SIZE
            || i32::from_be_bytes(size_bytes) == NIFTI2_HEADER_SIZE
        {
            return Err(YeonetsError::UnsupportedNiftiFormat(String::from("n+2")));
        } else {
            return Err(YeonetsError::InvalidNiftiFormat);
        };

        let mut hdr = NiftiHeader::default();
        hdr.endianness = endianness;

        let mut input = ByteOrdered::runtime(Cursor::new(&raw[..]), endianness);

        hdr.sizeof_hdr = input.read_i32()?;
        skip_bytes(&mut input, 36)?; // data_type, db_name, extents, session_error, regular, dim_info

        for idx in 0..8 { hdr.dim[idx] = input.read_i16()?; }
        skip_bytes(&mut input, 12)?; // intent_p1 to intent_p3

        hdr.intent_code = input.read_i16()?;
        hdr.datatype = input.read_i16()?;
        hdr.bitpix = input.read_i16()?;
        skip_bytes(&mut input, 2)?; // slice_start

        for idx in 0..8 { hdr.pixdim[idx] = input.read_f32()?; }
        hdr.vox_offset = input.read_f32()?;
        hdr.scl_slope = input.read_f32()?;
        hdr.scl_inter = input.read_f32()?;
        skip_bytes(&mut input, 28)?; // slice_end, slice_code, xyzt_units, cal_max, cal_min, slice_duration, toffset, glmax, glmin

        hdr.descrip = read_fixed_length_string(&mut input, 80)?;
        skip_bytes(&mut input, 24)?; // aux_file

        hdr.qform_code = input.read_i16()?;
        hdr.sform_code = input.read_i16()?;
        skip_bytes(&mut input, 24)?; // quaternion parameters and offsets

        for idx in 0..4 { hdr.srow_x[idx] = input.read_f32()?; }
        for idx in 0..4 { hdr.srow_y[idx] = input.read_f32()?; }
        for idx in 0..4 { hdr.srow_z[idx] = input.read_f32()?; }
        skip_bytes(&mut input, 16)?; // intent_name

        hdr.magic = read_fixed_length_string(&mut input, 4)?;

        if hdr.magic == NIFTI1_MAGIC_PAIR {
            return Err(YeonetsError::UnsupportedNiftiFormat(hdr.magic));
        }
        if hdr.magic != NIFTI1_MAGIC_SINGLE_FILE {
            return Err(YeonetsError::InvalidNiftiFormat);
        }
        if hdr.dim[0] < 1 || hdr.dim[0] > 7 {
            return Err(YeonetsError::InvalidNiftiFormat);
        }
        for idx in 1..=hdr.dim[0] as usize {
            if hdr.dim[idx] < 1 {
                return Err(YeonetsError::InvalidNiftiFormat);
            }
        }
        if !hdr.vox_offset.is_finite() || hdr.vox_offset < NIFTI1_HEADER_SIZE as f32 {
            return Err(YeonetsError::InvalidNiftiFormat);
        }

        Ok(hdr)
    }


    /// Write the header in NIfTI-1 layout, using the byte order stored in the `endianness` field.
    /// Exactly 348 bytes are written. Skipped fields are written as zeros.
    pub fn to_writer<W>(&self, output: &mut W) -> Result<()>
    where
        W: Write,
    {
        let mut output = ByteOrdered::runtime(output, self.endianness);

        output.write_i32(self.sizeof_hdr)?;
        output.write_all(&[0u8; 36])?;
        for v in self.dim.iter() { output.write_i16(*v)?; }
        output.write_all(&[0u8; 12])?;
        output.write_i16(self.intent_code)?;
        output.write_i16(self.datatype)?;
        output.write_i16(self.bitpix)?;
        output.write_all(&[0u8; 2])?;
        for v in self.pixdim.iter() { output.write_f32(*v)?; }
        output.write_f32(self.vox_offset)?;
        output.write_f32(self.scl_slope)?;
        output.write_f32(self.scl_inter)?;
        output.write_all(&[0u8; 28])?;
        output.write_all(&fixed_length_bytes::<80>(&self.descrip))?;
        output.write_all(&[0u8; 24])?;
        output.write_i16(self.qform_code)?;
        output.write_i16(self.sform_code)?;
        output.write_all(&[0u8; 24])?;
        for v in self.srow_x.iter().chain(self.srow_y.iter()).chain(self.srow_z.iter()) {
            output.write_f32(*v)?;
        }
        output.write_all(&[0u8; 16])?;
        output.write_all(&fixed_length_bytes::<4>(&self.magic))?;
        Ok(())
    }


    /// The number of spatial dimensions in use, at most 3. Missing dimensions have length 1.
    pub fn volume_shape(&self) -> (usize, usize, usize) {
        let ndim = self.dim[0].max(0) as usize;
        let len = |idx: usize| if idx <= ndim { self.dim[idx].max(1) as usize } else { 1 };
        (len(1), len(2), len(3))
    }


    /// The number of 3D volumes (frames) stored in the file.
    pub fn num_frames(&self) -> usize {
        let ndim = self.dim[0].max(0) as usize;
        (4..=ndim.min(7)).map(|idx| self.dim[idx].max(1) as usize).product()
    }


    /// Returns the scaling as `(slope, intercept)`. A zero or non-finite slope means no scaling.
    pub fn scaling(&self) -> (f64, f64) {
        if self.scl_slope == 0.0 || !self.scl_slope.is_finite() {
            (1.0, 0.0)
        } else {
            let inter = if self.scl_inter.is_finite() { self.scl_inter as f64 } else { 0.0 };
            (self.scl_slope as f64, inter)
        }
    }
}


/// Pad or truncate a string to `N` bytes, zero-filled.
fn fixed_length_bytes<const N: usize>(value: &str) -> [u8; N] {
    let mut bytes = [0u8; N];
    for (dst, src) in bytes.iter_mut().zip(value.bytes()) {
        *dst = src;
    }
    bytes
}


impl fmt::Display for NiftiHeader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (nx, ny, nz) = self.volume_shape();
        write!(f, "NIfTI-1 header for {}x{}x{} volume with datatype {}.", nx, ny, nz, self.datatype)
    }
}


/// Models a NIfTI-1 brain volume. The `data` has shape `(nx, ny, nz)`, indexed as `data[[x, y, z]]`.
#[derive(Debug, Clone, PartialEq)]
pub struct NiftiVolume {
    pub header: NiftiHeader,
    pub data: Array3<f64>,
}


impl NiftiVolume {

    /// Read a NIfTI volume from a file.
    /// If the file's name ends with ".gz", the file is assumed to need GZip decoding.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<NiftiVolume> {
        let gz = is_gz_file(&path);
        debug!("Reading NIfTI volume from '{}' (gzip: {}).", path.as_ref().display(), gz);
        let file = BufReader::new(File::open(path)?);
        if gz {
            NiftiVolume::from_reader(GzDecoder::new(file))
        } else {
            NiftiVolume::from_reader(file)
        }
    }


    /// Read a NIfTI volume from the given byte stream, which must be at the start of the header.
    /// Only the first frame of 4D images is read.
    pub fn from_reader<S>(mut input: S) -> Result<NiftiVolume>
    where
        S: Read,
    {
        let hdr = NiftiHeader::from_reader(&mut input)?;

        // This is only read because we cannot seek in a GZ stream.
        skip_bytes(&mut input, hdr.vox_offset as u64 - NIFTI1_HEADER_SIZE as u64)?;

        if hdr.num_frames() > 1 {
            warn!("NIfTI image contains {} frames, only the first one is used.", hdr.num_frames());
        }

        let (nx, ny, nz) = hdr.volume_shape();
        let num_voxels = nx
            .checked_mul(ny)
            .and_then(|n| n.checked_mul(nz))
            .ok_or(YeonetsError::InvalidNiftiFormat)?;
        let (slope, inter) = hdr.scaling();

        let mut input = ByteOrdered::runtime(input, hdr.endianness);
        // Not preallocated, the dimensions come from an unchecked header.
        let mut values: Vec<f64> = Vec::new();
        for _ in 0..num_voxels {
            let raw: f64 = match hdr.datatype {
                DT_UINT8 => input.read_u8()? as f64,
                DT_INT8 => input.read_i8()? as f64,
                DT_INT16 => input.read_i16()? as f64,
                DT_UINT16 => input.read_u16()? as f64,
                DT_INT32 => input.read_i32()? as f64,
                DT_UINT32 => input.read_u32()? as f64,
                DT_INT64 => input.read_i64()? as f64,
                DT_UINT64 => input.read_u64()? as f64,
                DT_FLOAT32 => input.read_f32()? as f64,
                DT_FLOAT64 => input.read_f64()?,
                other => return Err(YeonetsError::UnsupportedNiftiDatatype(other)),
            };
            values.push(raw * slope + inter);
        }

        // NIfTI stores x fastest, which is Fortran order for an (nx, ny, nz) array.
        let data = Array3::from_shape_vec((nx, ny, nz).f(), values)
            .map_err(|_| YeonetsError::InvalidNiftiFormat)?;

        Ok(NiftiVolume { header: hdr, data })
    }


    /// Write the volume as float32 data, in the byte order of the header.
    /// The data is written unscaled, i.e., the written header has slope 1 and intercept 0.
    pub fn to_writer<W>(&self, output: &mut W) -> Result<()>
    where
        W: Write,
    {
        let (nx, ny, nz) = self.data.dim();
        let dim_len = |len: usize| i16::try_from(len).map_err(|_| YeonetsError::InvalidNiftiFormat);
        let mut hdr = self.header.clone();
        hdr.sizeof_hdr = NIFTI1_HEADER_SIZE;
        hdr.dim = [3, dim_len(nx)?, dim_len(ny)?, dim_len(nz)?, 1, 1, 1, 1];
        hdr.datatype = DT_FLOAT32;
        hdr.bitpix = 32;
        hdr.vox_offset = NIFTI1_DEFAULT_VOX_OFFSET;
        hdr.scl_slope = 1.0;
        hdr.scl_inter = 0.0;
        hdr.magic = String::from(NIFTI1_MAGIC_SINGLE_FILE);
        hdr.to_writer(output)?;

        let mut output = ByteOrdered::runtime(output, hdr.endianness);
        output.write_all(&[0u8; 4])?; // No extensions.
        // Reversing the axes and iterating in logical order visits x fastest.
        for v in self.data.t().iter() {
            output.write_f32(*v as f32)?;
        }
        Ok(())
    }


    /// Write the volume to a file, GZip compressed if the file name ends with ".gz".
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let gz = is_gz_file(&path);
        let mut file = BufWriter::new(File::create(path)?);
        if gz {
            let mut encoder = GzEncoder::new(file, Compression::default());
            self.to_writer(&mut encoder)?;
            encoder.finish()?.flush()?;
        } else {
            self.to_writer(&mut file)?;
            file.flush()?;
        }
        Ok(())
    }


    /// The shape of the volume as a vector, `[nx, ny, nz]`.
    pub fn shape(&self) -> Vec<usize> {
        self.data.shape().to_vec()
    }
}


impl fmt::Display for NiftiVolume {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (nx, ny, nz) = self.data.dim();
        write!(f, "NIfTI volume with {}x{}x{} voxels.", nx, ny, nz)
    }
}


/// Read a 3D brain volume from a NIfTI-1 file.
///
/// # Examples
///
/// ```no_run
/// let vol = yeonets::read_nifti("/path/to/Data/stat_map.nii").unwrap();
/// println!("Read brain map with shape {:?}.", vol.shape());
/// ```
pub fn read_nifti<P: AsRef<Path>>(path: P) -> Result<NiftiVolume> {
    NiftiVolume::from_file(path)
}


/// Write a 3D array as a little endian float32 NIfTI-1 file with the given voxel sizes.
pub fn write_nifti<P: AsRef<Path>>(path: P, data: &Array3<f64>, voxel_size: [f32; 3]) -> Result<()> {
    let mut header = NiftiHeader::default();
    header.pixdim[1..4].copy_from_slice(&voxel_size);
    let vol = NiftiVolume { header, data: data.clone() };
    vol.to_file(path)
}
