//! A C ABI shim for sequential record reading.
//!
//! Exported symbols use an opaque per-reader handle rather than a
//! process-wide singleton, so that two handles opened over two different
//! files read independent streams — `riegeli_init`/a leaked global reader in
//! the source this crate is modeled on was a defect, not a contract worth
//! preserving (see `DESIGN.md`). Diagnostic text on failure goes to the
//! process's standard error stream, matching the behavior callers of a shim
//! like this expect.

use std::ffi::{c_char, CStr};

use crate::io::FileReader;
use crate::record;

/// An opaque handle to an open sequential record stream. Exactly one
/// [`riegeli_close`] must follow every successful [`riegeli_open`]; distinct
/// handles over distinct files are fully independent of one another.
pub struct RiegeliReader {
    inner: FileReader,
}

/// Opens `path` (a NUL-terminated C string) for sequential record reading.
///
/// Returns null on failure (null/non-UTF-8 path, file-open failure), having
/// written a diagnostic to stderr first.
///
/// # Safety
///
/// `path` must be either null or a valid pointer to a NUL-terminated C
/// string, readable for the duration of this call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn riegeli_open(path: *const c_char) -> *mut RiegeliReader {
    if path.is_null() {
        eprintln!("riegeli_open: path is null");
        return core::ptr::null_mut();
    }
    let c_str = unsafe { CStr::from_ptr(path) };
    let path_str = match c_str.to_str() {
        Ok(s) => s,
        Err(_) => {
            eprintln!("riegeli_open: path is not valid UTF-8");
            return core::ptr::null_mut();
        }
    };
    match FileReader::open(path_str) {
        Ok(inner) => Box::into_raw(Box::new(RiegeliReader { inner })),
        Err(e) => {
            eprintln!("riegeli_open: failed to open {path_str}: {e}");
            core::ptr::null_mut()
        }
    }
}

/// Reads the next record from `reader`, LEB128-length-prefixed as written by
/// [`record::write_record`].
///
/// On success, returns a newly heap-allocated buffer of `*out_len` bytes;
/// ownership passes to the caller, who must release it with
/// [`riegeli_free`]. Returns null (with `*out_len` set to 0) on clean EOF or
/// on error; a diagnostic is written to stderr for the error case.
///
/// # Safety
///
/// `reader` must be a live handle returned by [`riegeli_open`] and not yet
/// passed to [`riegeli_close`]. `out_len` must be a valid pointer to a
/// writable `usize`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn riegeli_read_record(
    reader: *mut RiegeliReader,
    out_len: *mut usize,
) -> *mut u8 {
    if reader.is_null() || out_len.is_null() {
        eprintln!("riegeli_read_record: null argument");
        return core::ptr::null_mut();
    }
    let reader = unsafe { &mut *reader };
    match record::read_record(&mut reader.inner) {
        Ok(Some(chain)) => {
            let bytes = chain.to_vec().into_boxed_slice();
            let len = bytes.len();
            let ptr = Box::into_raw(bytes) as *mut u8;
            unsafe {
                *out_len = len;
            }
            ptr
        }
        Ok(None) => {
            unsafe {
                *out_len = 0;
            }
            core::ptr::null_mut()
        }
        Err(e) => {
            eprintln!("riegeli_read_record: {e}");
            unsafe {
                *out_len = 0;
            }
            core::ptr::null_mut()
        }
    }
}

/// Releases a buffer previously returned by [`riegeli_read_record`].
///
/// # Safety
///
/// `ptr` must be null, or a pointer previously returned by
/// [`riegeli_read_record`] together with its matching `len`, not yet freed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn riegeli_free(ptr: *mut u8, len: usize) {
    if ptr.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(core::slice::from_raw_parts_mut(ptr, len)));
    }
}

/// Releases a handle returned by [`riegeli_open`].
///
/// # Safety
///
/// `reader` must be null, or a pointer previously returned by
/// [`riegeli_open`] and not yet passed to `riegeli_close`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn riegeli_close(reader: *mut RiegeliReader) {
    if reader.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(reader));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{FileWriter, Writer};
    use std::ffi::CString;

    fn write_records(path: &std::path::Path, payloads: &[&[u8]]) {
        let mut writer = FileWriter::create(path).unwrap();
        for payload in payloads {
            record::write_record(&mut writer, payload).unwrap();
        }
        writer.flush().unwrap();
    }

    #[test]
    fn round_trips_a_file_through_the_c_abi() {
        let path = std::env::temp_dir().join("spindle_ffi_test_single.bin");
        write_records(&path, &[b"alpha", b"beta", b""]);

        let c_path = CString::new(path.to_str().unwrap()).unwrap();
        unsafe {
            let handle = riegeli_open(c_path.as_ptr());
            assert!(!handle.is_null());

            let mut len = 0usize;
            let ptr = riegeli_read_record(handle, &mut len);
            assert_eq!(std::slice::from_raw_parts(ptr, len), b"alpha");
            riegeli_free(ptr, len);

            let ptr = riegeli_read_record(handle, &mut len);
            assert_eq!(std::slice::from_raw_parts(ptr, len), b"beta");
            riegeli_free(ptr, len);

            let ptr = riegeli_read_record(handle, &mut len);
            assert_eq!(len, 0);
            assert!(ptr.is_null());

            let ptr = riegeli_read_record(handle, &mut len);
            assert!(ptr.is_null());

            riegeli_close(handle);
        }
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn two_handles_over_two_files_are_independent() {
        let path_a = std::env::temp_dir().join("spindle_ffi_test_a.bin");
        let path_b = std::env::temp_dir().join("spindle_ffi_test_b.bin");
        write_records(&path_a, &[b"a-one", b"a-two"]);
        write_records(&path_b, &[b"b-one"]);

        let c_a = CString::new(path_a.to_str().unwrap()).unwrap();
        let c_b = CString::new(path_b.to_str().unwrap()).unwrap();
        unsafe {
            let handle_a = riegeli_open(c_a.as_ptr());
            let handle_b = riegeli_open(c_b.as_ptr());
            assert!(!handle_a.is_null());
            assert!(!handle_b.is_null());

            let mut len = 0usize;
            let ptr_b = riegeli_read_record(handle_b, &mut len);
            assert_eq!(std::slice::from_raw_parts(ptr_b, len), b"b-one");
            riegeli_free(ptr_b, len);

            let ptr_a = riegeli_read_record(handle_a, &mut len);
            assert_eq!(std::slice::from_raw_parts(ptr_a, len), b"a-one");
            riegeli_free(ptr_a, len);

            let ptr_a = riegeli_read_record(handle_a, &mut len);
            assert_eq!(std::slice::from_raw_parts(ptr_a, len), b"a-two");
            riegeli_free(ptr_a, len);

            riegeli_close(handle_a);
            riegeli_close(handle_b);
        }
        let _ = std::fs::remove_file(&path_a);
        let _ = std::fs::remove_file(&path_b);
    }

    #[test]
    fn open_rejects_null_and_missing_file() {
        unsafe {
            assert!(riegeli_open(core::ptr::null()).is_null());
        }
        let missing = CString::new("/nonexistent/path/spindle-ffi-test").unwrap();
        unsafe {
            assert!(riegeli_open(missing.as_ptr()).is_null());
        }
    }
}
