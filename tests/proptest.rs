//! Property-based tests for the bitstream packer

use lsb::{binary, BitWidth, Error};
use proptest::prelude::*;

fn width_strategy() -> impl Strategy<Value = BitWidth> {
    prop::sample::select(BitWidth::ALL.to_vec())
}

/// A payload together with a cover that is at least large enough to hold it.
fn case_strategy() -> impl Strategy<Value = (BitWidth, Vec<u8>, Vec<u8>)> {
    (
        width_strategy(),
        prop::collection::vec(any::<u8>(), 0..256),
        0usize..64,
    )
        .prop_flat_map(|(width, payload, slack)| {
            let len = binary::required_len(payload.len(), width) as usize + slack;
            (
                Just(width),
                Just(payload),
                prop::collection::vec(any::<u8>(), len),
            )
        })
}

proptest! {
    // -------------------------------------------------------------
    // 1. Anything concealed is revealed unchanged.
    // -------------------------------------------------------------
    #[test]
    fn prop_round_trip((width, payload, cover) in case_strategy()) {
        let mut package = cover;

        lsb::encode(&payload, &mut package, width).unwrap();

        prop_assert_eq!(lsb::decode(&package, width).unwrap(), payload);
    }

    // -------------------------------------------------------------
    // 2. High bits and bytes past the packed range never change.
    // -------------------------------------------------------------
    #[test]
    fn prop_preserves_high_bits((width, payload, cover) in case_strategy()) {
        let mut package = cover.clone();

        let touched = lsb::encode(&payload, &mut package, width).unwrap();
        let mask = !((1u8 << width.get()) - 1);

        for (before, after) in cover.iter().zip(&package) {
            prop_assert_eq!(before & mask, after & mask);
        }
        prop_assert_eq!(&cover[touched..], &package[touched..]);
    }

    // -------------------------------------------------------------
    // 3. A cover one byte short is rejected and left untouched.
    // -------------------------------------------------------------
    #[test]
    fn prop_capacity_boundary(
        width in width_strategy(),
        payload in prop::collection::vec(any::<u8>(), 0..128),
        fill in any::<u8>(),
    ) {
        let required = binary::required_len(payload.len(), width) as usize;

        let mut short = vec![fill; required - 1];
        let result = lsb::encode(&payload, &mut short, width);
        prop_assert!(
            matches!(result, Err(Error::Capacity { .. })),
            "expected a capacity error, got {:?}",
            result
        );
        prop_assert!(short.iter().all(|&b| b == fill));

        let mut exact = vec![fill; required];
        prop_assert_eq!(lsb::encode(&payload, &mut exact, width).unwrap(), required);
        prop_assert_eq!(lsb::decode(&exact, width).unwrap(), payload);
    }

    // -------------------------------------------------------------
    // 4. Decoding arbitrary bytes with any width never panics.
    // -------------------------------------------------------------
    #[test]
    fn prop_decode_is_total(
        width in width_strategy(),
        container in prop::collection::vec(any::<u8>(), 0..512),
    ) {
        match lsb::decode(&container, width) {
            Ok(payload) => {
                prop_assert!(binary::required_len(payload.len(), width) <= container.len() as u64);
            }
            Err(e) => prop_assert!(
                matches!(e, Error::TruncatedContainer { .. }),
                "expected a truncation error, got {:?}",
                e
            ),
        }
    }

    // -------------------------------------------------------------
    // 5. The advertised capacity is exactly what fits.
    // -------------------------------------------------------------
    #[test]
    fn prop_capacity_fits(width in width_strategy(), len in 32usize..2048) {
        let fits = binary::capacity(len, width);
        let mut cover = vec![0u8; len];

        prop_assert!(lsb::encode(&vec![0xA5; fits], &mut cover, width).is_ok());
        prop_assert!(lsb::encode(&vec![0xA5; fits + 1], &mut cover, width).is_err());
    }
}
