use struk_core::{KeywordSet, LineItem};
use struk_ocr::{normalize_amount, parse, Extractor};

const MINIMARKET: &str = "\
INDOMARET CABANG SUDIRMAN
Jl. Sudirman No. 12
2024-05-01 19:22
Indomie Goreng 3.500
Teh Botol Sosro 4.000
Roti Tawar 15.500
SUBTOTAL 23.000
PPN 11% 2.530
TOTAL 25.530
TUNAI 50.000
KEMBALI 24.470
Terima kasih";

const CAFE_NO_TOTAL: &str = "\
KEDAI KOPI
Kopi Susu 15.000
Roti Bakar 20.000
Pisang Goreng 12.000";

fn names(items: &[LineItem]) -> Vec<&str> {
    items.iter().map(|i| i.name.as_str()).collect()
}

#[test]
fn example_with_total_line() {
    let r = parse("Kopi Susu 15.000\nRoti Bakar 20.000\nTOTAL 35.000");
    assert_eq!(
        r.items,
        vec![LineItem::new("Kopi Susu", 15000), LineItem::new("Roti Bakar", 20000)]
    );
    assert_eq!(r.total, 35000);
}

#[test]
fn example_fallback_to_largest_item() {
    let r = parse("Kopi Susu 15.000\nRoti Bakar 20.000");
    assert_eq!(r.items.len(), 2);
    assert_eq!(r.total, 20000);
}

#[test]
fn example_noise_only() {
    let r = parse("Terima kasih\nSelamat datang");
    assert!(r.items.is_empty());
    assert_eq!(r.total, 0);
    assert!(r.is_empty_extraction());
}

#[test]
fn minimarket_receipt() {
    let r = parse(MINIMARKET);
    // Address line "Jl. Sudirman No. 12" ends in a number and is kept: a known
    // limitation of trailing-number classification.
    assert_eq!(
        names(&r.items),
        vec!["Jl. Sudirman No.", "Indomie Goreng", "Teh Botol Sosro", "Roti Tawar"]
    );
    assert_eq!(r.total, 25530);
}

#[test]
fn parse_is_idempotent() {
    for text in [MINIMARKET, CAFE_NO_TOTAL, "", "TOTAL 1"] {
        assert_eq!(parse(text), parse(text));
    }
}

#[test]
fn fallback_law() {
    let r = parse(CAFE_NO_TOTAL);
    let max = r.items.iter().map(|i| i.price).max().unwrap();
    assert_eq!(r.total, max);
    assert_eq!(r.total, 20000);
}

#[test]
fn last_total_line_in_document_order_wins() {
    let text = "Nasi 10.000\nTAGIHAN 10.000\nEs Jeruk 6.000\nTOTAL 16.000\nJumlah: 17.000";
    assert_eq!(parse(text).total, 17000);
}

#[test]
fn exclusion_law() {
    let keywords = KeywordSet::default();
    let r = parse(MINIMARKET);
    for item in &r.items {
        let upper = item.name.to_uppercase();
        for k in &keywords.exclusions {
            assert!(!upper.contains(k.as_str()), "{} contains {}", item.name, k);
        }
    }
}

#[test]
fn prices_are_positive_and_names_non_numeric() {
    let text = "12 5000\nGratis 0\n007 Agent 1.000\nSabun 8.900";
    let r = parse(text);
    assert_eq!(r.items, vec![LineItem::new("Sabun", 8900)]);
    for item in &r.items {
        assert!(item.price > 0);
        assert!(!item.name.starts_with(|c: char| c.is_ascii_digit()));
    }
}

#[test]
fn normalization_examples() {
    assert_eq!(normalize_amount("12.500"), 12500);
    assert_eq!(normalize_amount("1,234"), 1234);
    assert_eq!(normalize_amount(""), 0);
    assert_eq!(normalize_amount("abc"), 0);
}

#[test]
fn extractor_is_shareable_across_threads() {
    let extractor = std::sync::Arc::new(Extractor::new(&KeywordSet::default()).unwrap());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let x = std::sync::Arc::clone(&extractor);
            std::thread::spawn(move || x.extract(MINIMARKET))
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(results.windows(2).all(|w| w[0] == w[1]));
}
