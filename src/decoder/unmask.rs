/// Unmask QR code by applying the mask pattern
use crate::decoder::function_mask::FunctionMask;
use crate::models::{Bitmap, MaskPattern};

/// XOR every data module with the mask pattern; function modules are untouched.
/// Applying the same mask twice restores the grid, so this also masks.
pub fn unmask(grid: &mut Bitmap, mask_pattern: MaskPattern, func: &FunctionMask) {
    let size = func.size();
    for y in 0..size {
        for x in 0..size {
            if !func.is_function(x, y) && mask_pattern.is_masked(y, x) {
                grid.toggle(x, y);
            }
        }
    }
}
