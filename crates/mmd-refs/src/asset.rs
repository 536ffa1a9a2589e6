//! Asset path generation for transcluded/non-textual resources (spec.md
//! §4.8), grounded on the original implementation's `uuid.c`: every
//! extracted asset gets a fresh random name so concurrent runs over the
//! same source tree never collide on a path.

use uuid::Uuid;

/// A collision-free relative path for an extracted asset, e.g.
/// `assets/3fa85f64-5717-4562-b3fc-2c963f66afa6.png`.
pub fn new_asset_path(extension: &str) -> String {
    let id = Uuid::new_v4();
    if extension.is_empty() {
        format!("assets/{id}")
    } else {
        format!("assets/{id}.{extension}")
    }
}
