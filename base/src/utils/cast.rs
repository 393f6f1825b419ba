
use crate::vkchar;

use std::ffi::{ CStr, CString };

/// Helper function to convert [c_char; SIZE] to string.
///
/// Invalid UTF-8 sequences are replaced rather than rejected.
pub fn chars2string(raw_string_array: &[vkchar]) -> String {

    let raw_string = unsafe {
        let pointer = raw_string_array.as_ptr();
        CStr::from_ptr(pointer)
    };

    raw_string.to_string_lossy().into_owned()
}

pub fn chars2cstring(raw_string_array: &[vkchar]) -> CString {

    let raw_string = unsafe {
        let pointer = raw_string_array.as_ptr();
        CStr::from_ptr(pointer)
    };

    raw_string.to_owned()
}

pub fn cstrings2ptrs(raw_string_array: &[CString]) -> Vec<*const vkchar> {

    raw_string_array.iter()
        .map(|l| l.as_ptr()).collect()
}

/// View a plain-old-data value as its raw bytes.
///
/// `T` must be `#[repr(C)]` without padding for the bytes to be meaningful.
pub fn bytes_of<T: Copy>(value: &T) -> &[u8] {

    unsafe {
        std::slice::from_raw_parts(value as *const T as *const u8, std::mem::size_of::<T>())
    }
}

/// View a slice of plain-old-data values as raw bytes.
pub fn slice_bytes<T: Copy>(values: &[T]) -> &[u8] {

    unsafe {
        std::slice::from_raw_parts(values.as_ptr() as *const u8, std::mem::size_of_val(values))
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn vulkan_chars_stop_at_nul() {

        let mut raw = [0 as vkchar; 16];
        for (i, c) in b"VK_KHR".iter().enumerate() {
            raw[i] = *c as vkchar;
        }

        assert_eq!(chars2string(&raw), "VK_KHR");
        assert_eq!(chars2cstring(&raw).as_bytes(), b"VK_KHR");
    }

    #[test]
    fn slice_bytes_covers_every_element() {

        let values = [1.0_f32, 2.0];
        let bytes = slice_bytes(&values);

        assert_eq!(bytes.len(), 8);
        assert_eq!(&bytes[4..8], &2.0_f32.to_ne_bytes());
        assert_eq!(bytes_of(&values[0]), &1.0_f32.to_ne_bytes());
    }
}
