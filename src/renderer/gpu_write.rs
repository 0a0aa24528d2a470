/// A marker for generated types that get written to GPU memory
///
/// # Safety
///
/// An implementing type must be `repr(C)` with every padding byte spelled out
/// as an explicit field, so that its whole byte image is initialized.
/// Generated uniform and push constant structs are `repr(C, align(16))`
/// with `_padding_N` fields; generated vertices contain only 4-byte fields.
pub unsafe trait GPUWrite {}

unsafe impl GPUWrite for u8 {} // image bytes
unsafe impl GPUWrite for u32 {} // index buffer

/// the bytes to copy into a mapped buffer or pass as push constants
pub fn as_gpu_bytes<T: GPUWrite>(elements: &[T]) -> &[u8] {
    let len = std::mem::size_of_val(elements);

    // SAFETY: GPUWrite types have no uninitialized padding
    unsafe { std::slice::from_raw_parts(elements.as_ptr().cast::<u8>(), len) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_bytes_are_little_endian_words() {
        let indices: [u32; 2] = [1, 0x0102_0304];

        let bytes = as_gpu_bytes(&indices);

        assert_eq!(bytes.len(), 8);
        assert_eq!(&bytes[..4], &1u32.to_ne_bytes());
        assert_eq!(&bytes[4..], &0x0102_0304u32.to_ne_bytes());
    }

    #[test]
    fn empty_slices_have_no_bytes() {
        let empty: [u32; 0] = [];

        assert!(as_gpu_bytes(&empty).is_empty());
    }
}
