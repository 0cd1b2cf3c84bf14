mod error;
mod types;

pub use error::*;
pub use types::*;

use std::ffi::{c_void, CStr, CString};
use std::os::raw::c_char;
use std::slice;

use lr_layout::{DType, FormatTag, LayoutDesc};
use lr_reorder::{Element, Reorder, ReorderConfig, ReorderError};

/// Execute a closure that returns an `LRStatus`, catching any panics
/// and converting them into `LRStatus::Internal`.
fn catch_panic<F: FnOnce() -> LRStatus + std::panic::UnwindSafe>(f: F) -> LRStatus {
    match std::panic::catch_unwind(f) {
        Ok(status) => status,
        Err(_) => {
            set_last_error("internal panic".to_string());
            LRStatus::Internal
        }
    }
}

/// Describe a tensor of rank `ndims` stored in the named `format`.
///
/// On success, writes a heap-allocated `LRLayout` pointer into `*layout_out`.
/// The caller must later call `lr_layout_destroy` to free it.
#[no_mangle]
pub unsafe extern "C" fn lr_layout_create(
    dims: *const usize,
    ndims: usize,
    dtype: LRDataType,
    format: *const c_char,
    layout_out: *mut *mut LRLayout,
) -> LRStatus {
    catch_panic(|| {
        if dims.is_null() || format.is_null() || layout_out.is_null() {
            set_last_error("null argument".to_string());
            return LRStatus::InvalidArguments;
        }
        let dims = unsafe { slice::from_raw_parts(dims, ndims) };
        let name = match unsafe { CStr::from_ptr(format) }.to_str() {
            Ok(s) => s,
            Err(e) => {
                set_last_error(format!("invalid format name: {}", e));
                return LRStatus::InvalidArguments;
            }
        };
        let tag: FormatTag = match name.parse() {
            Ok(t) => t,
            Err(e) => return fail(e),
        };
        let desc = match LayoutDesc::new(dims, DType::from(dtype), tag) {
            Ok(d) => d,
            Err(e) => return fail(e),
        };
        unsafe {
            *layout_out = Box::into_raw(Box::new(LRLayout { desc }));
        }
        LRStatus::Success
    })
}

/// Destroy a layout previously created by `lr_layout_create`.
///
/// Passing a null pointer is a no-op and returns `LRStatus::Success`.
#[no_mangle]
pub unsafe extern "C" fn lr_layout_destroy(layout: *mut LRLayout) -> LRStatus {
    if layout.is_null() {
        return LRStatus::Success;
    }
    drop(Box::from_raw(layout));
    LRStatus::Success
}

/// Number of element slots a buffer for `layout` must hold, padding included.
#[no_mangle]
pub unsafe extern "C" fn lr_layout_physical_size(
    layout: *const LRLayout,
    size_out: *mut usize,
) -> LRStatus {
    catch_panic(|| {
        let layout = match unsafe { layout.as_ref() } {
            Some(l) if !size_out.is_null() => l,
            _ => {
                set_last_error("null argument".to_string());
                return LRStatus::InvalidArguments;
            }
        };
        unsafe { *size_out = layout.desc.physical_size() };
        LRStatus::Success
    })
}

/// Physical slot of the element at row-major logical `index`.
#[no_mangle]
pub unsafe extern "C" fn lr_layout_offset_of(
    layout: *const LRLayout,
    index: usize,
    offset_out: *mut usize,
) -> LRStatus {
    catch_panic(|| {
        let layout = match unsafe { layout.as_ref() } {
            Some(l) if !offset_out.is_null() => l,
            _ => {
                set_last_error("null argument".to_string());
                return LRStatus::InvalidArguments;
            }
        };
        if index >= layout.desc.logical_size() {
            set_last_error(format!(
                "index {} outside tensor of {} elements",
                index,
                layout.desc.logical_size()
            ));
            return LRStatus::InvalidArguments;
        }
        unsafe { *offset_out = layout.desc.offset_of(index) };
        LRStatus::Success
    })
}

/// Reorder `src_len` elements at `src` into `dst_len` elements at `dst`.
///
/// Each buffer holds elements of its layout's type and must cover the
/// layout's physical size. Overlapping buffers are rejected unless both
/// sides are the same buffer with the same layout, which is a no-op. On
/// any error the destination is left untouched.
#[no_mangle]
pub unsafe extern "C" fn lr_reorder(
    src_layout: *const LRLayout,
    src: *const c_void,
    src_len: usize,
    dst_layout: *const LRLayout,
    dst: *mut c_void,
    dst_len: usize,
    params: LRReorderParams,
) -> LRStatus {
    catch_panic(|| {
        let (src_layout, dst_layout) = match unsafe { (src_layout.as_ref(), dst_layout.as_ref()) } {
            (Some(s), Some(d)) if !src.is_null() && !dst.is_null() => (&s.desc, &d.desc),
            _ => {
                set_last_error("null argument".to_string());
                return LRStatus::InvalidArguments;
            }
        };
        let config = ReorderConfig::from(&params);
        let reorder = match Reorder::with_config(src_layout, dst_layout, config) {
            Ok(r) => r,
            Err(e) => return fail(e),
        };

        let src_bytes = src_len.saturating_mul(src_layout.dtype().size_in_bytes());
        let dst_bytes = dst_len.saturating_mul(dst_layout.dtype().size_in_bytes());
        if overlaps(src as usize, src_bytes, dst as usize, dst_bytes) {
            if src as usize == dst as usize && src_layout == dst_layout {
                return LRStatus::Success;
            }
            return fail(ReorderError::AliasedBuffers);
        }

        let result = unsafe {
            match src_layout.dtype() {
                DType::F32 => execute_from::<f32>(&reorder, src, src_len, dst, dst_len),
                DType::S32 => execute_from::<i32>(&reorder, src, src_len, dst, dst_len),
                DType::S16 => execute_from::<i16>(&reorder, src, src_len, dst, dst_len),
                DType::S8 => execute_from::<i8>(&reorder, src, src_len, dst, dst_len),
            }
        };
        match result {
            Ok(()) => LRStatus::Success,
            Err(e) => fail(e),
        }
    })
}

fn overlaps(a: usize, a_bytes: usize, b: usize, b_bytes: usize) -> bool {
    a < b.saturating_add(b_bytes) && b < a.saturating_add(a_bytes)
}

/// # Safety
/// `src` must point to `src_len` valid `S` values and `dst` to `dst_len`
/// writable elements of the destination layout's type, not overlapping.
unsafe fn execute_from<S: Element>(
    reorder: &Reorder,
    src: *const c_void,
    src_len: usize,
    dst: *mut c_void,
    dst_len: usize,
) -> lr_reorder::Result<()> {
    let src = slice::from_raw_parts(src.cast::<S>(), src_len);
    match reorder.dst().dtype() {
        DType::F32 => reorder.execute_slices(src, slice::from_raw_parts_mut(dst.cast::<f32>(), dst_len)),
        DType::S32 => reorder.execute_slices(src, slice::from_raw_parts_mut(dst.cast::<i32>(), dst_len)),
        DType::S16 => reorder.execute_slices(src, slice::from_raw_parts_mut(dst.cast::<i16>(), dst_len)),
        DType::S8 => reorder.execute_slices(src, slice::from_raw_parts_mut(dst.cast::<i8>(), dst_len)),
    }
}

/// Default reorder parameters.
#[no_mangle]
pub extern "C" fn lr_reorder_params_default() -> LRReorderParams {
    LRReorderParams::default()
}

/// Retrieve the last error message.
///
/// Returns a pointer to a C string describing the most recent error, or
/// null if no error has occurred. The caller must free the returned string
/// with `lr_free_string`.
#[no_mangle]
pub extern "C" fn lr_last_error() -> *const c_char {
    match error::take_last_error() {
        Some(e) => e.into_raw(),
        None => std::ptr::null(),
    }
}

/// Free a string previously returned by `lr_last_error`.
#[no_mangle]
pub unsafe extern "C" fn lr_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    fn create(dims: &[usize], dtype: LRDataType, format: &str) -> (LRStatus, *mut LRLayout) {
        let name = CString::new(format).unwrap();
        let mut out = ptr::null_mut();
        let status =
            unsafe { lr_layout_create(dims.as_ptr(), dims.len(), dtype, name.as_ptr(), &mut out) };
        (status, out)
    }

    fn last_error() -> String {
        let p = lr_last_error() as *mut c_char;
        assert!(!p.is_null());
        let msg = unsafe { CStr::from_ptr(p) }.to_string_lossy().into_owned();
        unsafe { lr_free_string(p) };
        msg
    }

    #[test]
    fn test_layout_lifecycle() {
        let (status, l) = create(&[2, 20, 3, 3], LRDataType::F32, "nChw16c");
        assert_eq!(status, LRStatus::Success);
        unsafe {
            let mut size = 0usize;
            assert_eq!(lr_layout_physical_size(l, &mut size), LRStatus::Success);
            assert_eq!(size, 2 * 32 * 3 * 3);
            let mut off = usize::MAX;
            assert_eq!(lr_layout_offset_of(l, 1, &mut off), LRStatus::Success);
            // w = 1 is one 16-wide channel block further on
            assert_eq!(off, 16);
            assert_eq!(
                lr_layout_offset_of(l, 2 * 20 * 9, &mut off),
                LRStatus::InvalidArguments
            );
            assert_eq!(lr_layout_destroy(l), LRStatus::Success);
            assert_eq!(lr_layout_destroy(ptr::null_mut()), LRStatus::Success);
            assert_eq!(
                lr_layout_physical_size(ptr::null(), &mut size),
                LRStatus::InvalidArguments
            );
        }
    }

    #[test]
    fn test_create_rejects_overflowing_size() {
        let (status, l) = create(&[usize::MAX / 8, 9, 1, 1], LRDataType::F32, "nChw8c");
        assert_eq!(status, LRStatus::InvalidShape);
        assert!(l.is_null());
        assert!(last_error().contains("nChw8c"));

        let (status, l) = create(&[1, usize::MAX, 1, 1], LRDataType::S8, "nChw16c");
        assert_eq!(status, LRStatus::InvalidShape);
        assert!(l.is_null());
    }

    #[test]
    fn test_create_errors() {
        let (status, l) = create(&[2, 32, 3], LRDataType::F32, "oihw");
        assert_eq!(status, LRStatus::InvalidShape);
        assert!(l.is_null());
        assert!(last_error().contains("oihw"));

        let (status, _) = create(&[2, 32, 3, 3], LRDataType::F32, "nchw42c");
        assert_eq!(status, LRStatus::InvalidShape);

        let (status, _) = create(&[64, 64, 3, 3], LRDataType::F32, "OIhw8i16o2i");
        assert_eq!(status, LRStatus::InvalidShape);
    }

    #[test]
    fn test_reorder_nchw_to_blocked() {
        let dims = [1, 16, 2, 2];
        let (_, src_l) = create(&dims, LRDataType::F32, "nchw");
        let (_, dst_l) = create(&dims, LRDataType::S32, "nChw8c");
        let src: Vec<f32> = (0..64).map(|i| i as f32).collect();
        let mut dst = vec![-1i32; 64];

        let status = unsafe {
            lr_reorder(
                src_l,
                src.as_ptr().cast(),
                src.len(),
                dst_l,
                dst.as_mut_ptr().cast(),
                dst.len(),
                lr_reorder_params_default(),
            )
        };
        assert_eq!(status, LRStatus::Success);
        for i in 0..64 {
            let off = unsafe { (*dst_l).desc.offset_of(i) };
            assert_eq!(dst[off], i as i32);
        }
        unsafe {
            lr_layout_destroy(src_l);
            lr_layout_destroy(dst_l);
        }
    }

    #[test]
    fn test_reorder_rejections_write_nothing() {
        let (_, a) = create(&[0, 16, 8, 8], LRDataType::F32, "nchw");
        let (_, b) = create(&[0, 16, 8, 8], LRDataType::F32, "nChw16c");
        let src = [0.0f32; 4];
        let mut dst = [7.0f32; 4];
        let status = unsafe {
            lr_reorder(a, src.as_ptr().cast(), 4, b, dst.as_mut_ptr().cast(), 4, LRReorderParams::default())
        };
        assert_eq!(status, LRStatus::InvalidArguments);
        assert_eq!(dst, [7.0; 4]);

        let (_, c) = create(&[1, 16, 1, 1], LRDataType::F32, "nchw");
        let (_, d) = create(&[1, 16, 1, 1], LRDataType::F32, "nhwc");
        let mut buf = [1.0f32; 16];
        let p = buf.as_mut_ptr();
        let status = unsafe { lr_reorder(c, p.cast(), 16, d, p.cast(), 16, LRReorderParams::default()) };
        assert_eq!(status, LRStatus::InvalidArguments);
        assert!(last_error().contains("alias"));

        let status = unsafe { lr_reorder(c, p.cast(), 16, c, p.cast(), 16, LRReorderParams::default()) };
        assert_eq!(status, LRStatus::Success);

        let short = [0.0f32; 8];
        let status = unsafe {
            lr_reorder(c, short.as_ptr().cast(), 8, d, buf.as_mut_ptr().cast(), 16, LRReorderParams::default())
        };
        assert_eq!(status, LRStatus::InvalidArguments);
        assert_eq!(buf, [1.0; 16]);

        unsafe {
            for l in [a, b, c, d] {
                lr_layout_destroy(l);
            }
        }
    }

    #[test]
    fn test_params_default() {
        let p = LRReorderParams::default();
        assert_eq!(p.round_mode, LRRoundMode::Nearest);
        assert_eq!(p.chunk_len, 4096);
        let config = ReorderConfig::from(&LRReorderParams {
            round_mode: LRRoundMode::Down,
            chunk_len: 8,
        });
        assert_eq!(config.round_mode, lr_reorder::RoundMode::Down);
        assert_eq!(config.chunk_len, 8);
    }
}
