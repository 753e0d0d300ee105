use crate::fixtures::TestFixtures;
use exifstrip::{strip_exif, Completion, DegradedReason, SegmentKind, SegmentRewriter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough_on_wrong_media_type() {
        let rewriter = SegmentRewriter::default();
        for media_type in ["image/png", "image/webp", "image/gif", "application/octet-stream", ""] {
            for input in [TestFixtures::camera_jpeg(), TestFixtures::png_header(), Vec::new()] {
                let outcome = rewriter.strip(&input, media_type);
                assert_eq!(outcome.cleaned, input);
                assert!(!outcome.stripped);
                assert_eq!(outcome.original_size, outcome.cleaned_size);
            }
        }
    }

    #[test]
    fn test_passthrough_on_non_jpeg_bytes() {
        let mut shifted = vec![0x00];
        shifted.extend_from_slice(&TestFixtures::camera_jpeg());
        for input in [TestFixtures::png_header(), shifted, vec![0xFF, 0xD9], vec![0xFF], Vec::new()] {
            let outcome = strip_exif(&input, "image/jpeg");
            assert_eq!(outcome.cleaned, input);
            assert!(!outcome.stripped);
        }
    }

    #[test]
    fn test_removes_single_app1_span() {
        // FFD8 | FFE1 len=0x0010 + 14 bytes | FFC0 len=0x0008 + 6 bytes | SOS... | FFD9
        // The elided span is the whole segment: 2 marker bytes + 16 counted by the length.
        let app1 = TestFixtures::segment(0xE1, &[0x5A; 14]);
        let sof = TestFixtures::segment(0xC0, &[8, 0, 1, 0, 1, 0]);
        let sos = [0xFF, 0xDA, 0x00, 0x03, 0x01, 0x99, 0x98, 0xFF, 0xD9];
        assert_eq!(&app1[..4], &[0xFF, 0xE1, 0x00, 0x10]);
        assert_eq!(&sof[..4], &[0xFF, 0xC0, 0x00, 0x08]);

        let input = TestFixtures::concat(&[&TestFixtures::SOI, &app1, &sof, &sos]);
        let outcome = strip_exif(&input, "image/jpeg");

        assert_eq!(outcome.cleaned, TestFixtures::concat(&[&TestFixtures::SOI, &sof, &sos]));
        assert!(outcome.stripped);
        assert_eq!(app1.len(), 18);
        assert_eq!(outcome.cleaned_size, outcome.original_size - 18);
        assert_eq!(outcome.removed.len(), 1);
        assert_eq!(outcome.removed[0].offset, 2);
        assert_eq!(outcome.removed[0].length, 18);
        assert_eq!(outcome.removed[0].kind, SegmentKind::Other);
    }

    #[test]
    fn test_removes_every_app1_and_keeps_app0_in_order() {
        let app0 = TestFixtures::app0_jfif();
        let exif = TestFixtures::app1_exif();
        let xmp = TestFixtures::app1_xmp();
        let input = TestFixtures::concat(&[
            &TestFixtures::SOI,
            &exif,
            &app0,
            &xmp,
            &TestFixtures::dqt(),
            &TestFixtures::scan_with_eoi(),
        ]);

        let outcome = strip_exif(&input, "image/jpeg");

        let expected = TestFixtures::concat(&[
            &TestFixtures::SOI,
            &app0,
            &TestFixtures::dqt(),
            &TestFixtures::scan_with_eoi(),
        ]);
        assert_eq!(outcome.cleaned, expected);
        let kinds: Vec<_> = outcome.removed.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![SegmentKind::Exif, SegmentKind::Xmp]);
        assert_eq!(outcome.bytes_removed(), exif.len() + xmp.len());
    }

    #[test]
    fn test_scan_data_is_never_interpreted() {
        let outcome = strip_exif(&TestFixtures::camera_jpeg(), "image/jpeg");
        assert_eq!(outcome.cleaned, TestFixtures::camera_jpeg_clean());
        assert_eq!(outcome.completion, Completion::ScanData);
        assert!(outcome.cleaned.ends_with(&TestFixtures::scan_with_eoi()));
    }

    #[test]
    fn test_truncation_is_tolerated() {
        let mut input = TestFixtures::concat(&[&TestFixtures::SOI, &TestFixtures::app0_jfif()]);
        input.extend_from_slice(&[0xFF, 0xE1, 0xFF, 0xFF, b'E', b'x', b'i', b'f']);

        let outcome = strip_exif(&input, "image/jpeg");

        assert!(outcome.cleaned.len() <= input.len());
        assert_eq!(outcome.cleaned, input);
        assert_eq!(
            outcome.completion,
            Completion::Degraded {
                offset: 2 + TestFixtures::app0_jfif().len(),
                reason: DegradedReason::Truncated,
            }
        );
    }

    #[test]
    fn test_truncation_after_a_dropped_segment_keeps_earlier_removal() {
        let mut input = TestFixtures::concat(&[&TestFixtures::SOI, &TestFixtures::app1_exif()]);
        input.extend_from_slice(&[0xFF, 0xDB, 0x00, 0x43, 0x00]);

        let outcome = strip_exif(&input, "image/jpeg");

        assert!(outcome.stripped);
        assert!(outcome.is_degraded());
        assert_eq!(outcome.cleaned, vec![0xFF, 0xD8, 0xFF, 0xDB, 0x00, 0x43, 0x00]);
    }

    #[test]
    fn test_idempotence() {
        let inputs = [
            TestFixtures::camera_jpeg(),
            TestFixtures::camera_jpeg_clean(),
            TestFixtures::concat(&[&TestFixtures::SOI, &TestFixtures::app1_xmp(), &[0xFF, 0xE1, 0x00]]),
            vec![0xFF, 0xD8, 0xFF, 0xFF, 0xE1, 0x00, 0x02, 0xE1, 0x00, 0x02],
            vec![
                0xFF, 0xD8, 0xFF, 0xFF, 0xE1, 0x00, 0x03, 0x41, 0xE1, 0x00, 0x04, 0x47, 0x50, 0xFF,
                0xD9,
            ],
        ];
        for input in inputs {
            let once = strip_exif(&input, "image/jpeg");
            let twice = strip_exif(&once.cleaned, "image/jpeg");
            assert_eq!(once.cleaned, twice.cleaned);
            assert!(!twice.stripped);
        }
    }

    #[test]
    fn test_structural_preservation() {
        let input = TestFixtures::camera_jpeg();
        let outcome = strip_exif(&input, "image/jpeg");

        assert!(outcome.cleaned.starts_with(&TestFixtures::SOI));
        assert!(outcome.cleaned.ends_with(&TestFixtures::EOI));
        assert!(outcome.cleaned_size <= outcome.original_size);

        // The kept segments appear in the same relative order.
        let mut cursor = 0;
        for part in [TestFixtures::dqt(), TestFixtures::sof0(), TestFixtures::dht()] {
            let found = outcome.cleaned[cursor..]
                .windows(part.len())
                .position(|w| w == part.as_slice())
                .expect("kept segment missing");
            cursor += found + part.len();
        }
    }

    #[test]
    fn test_arbitrary_bytes_never_panic() {
        // Deterministic pseudo-random streams behind a valid SOI.
        let mut state: u32 = 0x1234_5678;
        for len in 0..512usize {
            let mut input = TestFixtures::SOI.to_vec();
            for _ in 0..len {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                let byte = if state % 5 == 0 { 0xFF } else { (state >> 8) as u8 };
                input.push(byte);
            }
            let outcome = strip_exif(&input, "image/jpeg");
            assert!(outcome.cleaned_size <= outcome.original_size);
            assert_eq!(outcome.cleaned_size, outcome.original_size - outcome.bytes_removed());
            let removed: usize = outcome.removed.iter().map(|r| r.length).sum();
            assert_eq!(removed, outcome.bytes_removed());
            assert_eq!(outcome.stripped, !outcome.removed.is_empty());

            let twice = strip_exif(&outcome.cleaned, "image/jpeg");
            assert_eq!(twice.cleaned, outcome.cleaned);
            assert!(!twice.stripped);
        }
    }
}
