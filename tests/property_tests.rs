use huffpack::archive::{pack, unpack};
use huffpack::bits::{decode, encode};
use huffpack::tree_codec::{deserialize, serialize};
use huffpack::{compress, decompress, Config, Entry, FrequencyTable, HuffmanTree};
use proptest::prelude::*;

fn file_set() -> impl Strategy<Value = Vec<Entry>> {
    prop::collection::vec(prop::collection::vec(any::<u8>(), 0..300), 1..6).prop_map(|blobs| {
        blobs
            .into_iter()
            .enumerate()
            .map(|(i, data)| Entry::new(format!("file_{i}.dat"), data))
            .collect()
    })
}

fn counts() -> impl Strategy<Value = [u64; 256]> {
    prop::collection::vec(0..1000u64, 256).prop_map(|v| {
        let mut counts = [0u64; 256];
        counts.copy_from_slice(&v);
        counts
    })
}

proptest! {
    #[test]
    fn test_container_roundtrip(files in file_set()) {
        prop_assume!(files.iter().any(|f| !f.data.is_empty()));

        let container = compress(&files).unwrap();
        let restored = decompress(&container).unwrap();
        prop_assert_eq!(restored, files);
    }

    #[test]
    fn test_roundtrip_for_every_alphabet_size(k in 1..=256usize, len in 1..2000usize, seed in any::<u64>()) {
        // k distinct byte values, each present at least once
        let mut data: Vec<u8> = (0..k).map(|b| b as u8).collect();
        let mut x = seed | 1;
        while data.len() < len.max(k) {
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            data.push((x % k as u64) as u8);
        }

        let files = vec![Entry::new("blob", data)];
        let restored = decompress(&compress(&files).unwrap()).unwrap();
        prop_assert_eq!(restored, files);
    }

    #[test]
    fn test_tree_roundtrip(counts in counts()) {
        let freqs = FrequencyTable::from_counts(counts);
        prop_assume!(freqs.distinct() > 0);

        let tree = HuffmanTree::build(&freqs).unwrap();
        let bytes = serialize(&tree);
        let back = deserialize(&bytes, Config::default().max_tree_depth).unwrap();

        prop_assert_eq!(serialize(&back), bytes);
        prop_assert_eq!(back.codes(), tree.codes());
    }

    #[test]
    fn test_padding_invariant(data in prop::collection::vec(any::<u8>(), 1..500)) {
        let tree = HuffmanTree::from_bytes(&data).unwrap();
        let codes = tree.codes();
        let packed = encode(&data, &codes).unwrap();

        let payload = codes.encoded_bits(&FrequencyTable::from_bytes(&data)) as usize;
        prop_assert!(packed.padding <= 7);
        prop_assert_eq!((payload + packed.padding as usize) % 8, 0);
        prop_assert_eq!(packed.bit_len(), payload);
        prop_assert_eq!(decode(&packed.bytes, packed.padding, &tree).unwrap(), data);
    }

    #[test]
    fn test_pack_boundaries(files in file_set()) {
        prop_assume!(files.iter().any(|f| !f.data.is_empty()));

        let (buffer, boundaries) = pack(&files, &Config::default()).unwrap();
        let mut expected_start = 0;
        for b in &boundaries {
            prop_assert_eq!(b.start, expected_start);
            expected_start = b.end();
        }
        prop_assert_eq!(expected_start, buffer.len() as u64);
        prop_assert_eq!(unpack(&buffer, &boundaries).unwrap(), files);
    }

    #[test]
    fn test_arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..200)) {
        let _ = decompress(&bytes);
    }
}
