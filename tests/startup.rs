//! Start-up path as the firmware runs it, against the compiled-in bundle.

use sensor_board::display::BACKBUFFER_LEN;
use sensor_board::validate::required_buffer_size;
use sensor_board::{load, validate};

#[test]
fn compiled_in_bundle_is_stable() {
    let first = load();
    let second = load();

    assert!(core::ptr::eq(first, second));
    assert_eq!(validate(first), validate(second));
}

#[test]
fn backbuffer_matches_compiled_in_policy() {
    let bundle = load();
    assert_eq!(BACKBUFFER_LEN, bundle.frame_buffer.size_bytes);

    if validate(bundle).is_ok() {
        if let Some(size) = required_buffer_size(bundle) {
            assert_eq!(size, BACKBUFFER_LEN);
        }
    }
}

#[test]
fn collaborator_slices_share_the_bundle() {
    let bundle = load();
    let display = bundle.display();

    assert_eq!(display.geometry.width, bundle.geometry.width);
    assert_eq!(display.frame_buffer, &bundle.frame_buffer);
    assert_eq!(bundle.https().identity, &bundle.identity);
}
