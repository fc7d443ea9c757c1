#![no_main]

use gnfit::Measurements;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|txt: &str| {
    if let Ok(data) = txt.parse::<Measurements>() {
        assert_eq!(data.x().len(), data.y().len());
    }
});
