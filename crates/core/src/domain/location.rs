// Location canonicalization

/// Canonical place name followed by the spellings that collapse onto it.
///
/// Order matters: the first entry whose variant occurs in the input wins.
const LOCATION_MAPPING: &[(&str, &[&str])] = &[
    ("Hà Nội", &["Hanoi", "Ha Noi", "Hà Nội"]),
    ("Hồ Chí Minh", &["Ho Chi Minh", "Hồ Chí Minh", "Thu Đuc"]),
    ("Đà Nẵng", &["Danang", "Đà Nẵng", "Da Nang"]),
    ("Hải Dương", &["Hai Duong", "Hải Dương"]),
    ("Hà Nam", &["Ha Nam", "Hà Nam"]),
    ("Đồng Tháp", &["Dong Thap", "Đồng Tháp"]),
    ("Bến Tre", &["Ben Tre", "Bến Tre"]),
    ("Tuyên Quang", &["Tuyen Quang", "Tuyên Quang"]),
    ("Nghệ An", &["Nghe An", "Nghệ An"]),
    ("Đồng Nai", &["Dong Nai", "Đồng Nai"]),
    ("Long An", &["Long An"]),
    ("Cần Thơ", &["Can Tho", "Cần Thơ"]),
    ("Bình Dương", &["Binh Duong", "Bình Dương", "Thu Dau Mot"]),
    ("Vũng Tàu", &["Vung Tau", "Vũng Tàu"]),
    ("Ninh Thuận", &["Ninh Thuan", "Ninh Thuận"]),
    ("Bắc Ninh", &["Bac Ninh", "Bắc Ninh"]),
    ("Quãng Ngãi", &["Quang Ngai", "Quãng Ngãi"]),
    ("Hải Phòng", &["Hai Phong", "Hải Phòng"]),
    ("An Giang", &["An Giang"]),
    ("Hưng Yên", &["Hung Yen", "Hưng Yên"]),
    ("Hà Tĩnh", &["Ha Tinh", "Hà Tĩnh"]),
    ("Nam Định", &["Nam Dinh", "Nam Định"]),
    ("Huế", &["Hue", "Huế", "Thua Thien Hue", "Thừa Thiên Huế"]),
];

/// Collapse spelling variants of a place onto its canonical name
///
/// Matching is case-insensitive containment, so `"Ho Chi Minh City, Vietnam"` maps to
/// `"Hồ Chí Minh"`. Unknown places pass through trimmed; blank input becomes `None`.
pub fn standardize_location(location: Option<&str>) -> Option<String> {
    let location = location?.trim();
    if location.is_empty() {
        return None;
    }

    let lowered = location.to_lowercase();
    let canonical = LOCATION_MAPPING.iter().find_map(|(canonical, variants)| {
        variants
            .iter()
            .any(|variant| lowered.contains(&variant.to_lowercase()))
            .then_some(*canonical)
    });

    Some(canonical.unwrap_or(location).to_string())
}
