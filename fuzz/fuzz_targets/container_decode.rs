#![no_main]
use huffpack::{compress, decompress, Entry};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // arbitrary bytes must be rejected cleanly, never panic
    let _ = decompress(data);

    if data.is_empty() {
        return;
    }

    let split = data[0] as usize % data.len();
    let files = vec![
        Entry::new("head", data[..split].to_vec()),
        Entry::new("tail", data[split..].to_vec()),
    ];
    let container = compress(&files).expect("non-empty input compresses");
    let restored = decompress(&container).expect("fresh container decodes");
    assert_eq!(restored, files);
});
